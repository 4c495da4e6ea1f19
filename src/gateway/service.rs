//! The gateway trait, voice selectors and a deterministic mock.

use crate::error::ServiceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// Voice selector for speech synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    #[default]
    Alloy,
    Female,
    Male,
}

impl Voice {
    pub const ALL: [Voice; 3] = [Voice::Alloy, Voice::Female, Voice::Male];

    pub fn as_str(self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Female => "female",
            Voice::Male => "male",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Voice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alloy" => Ok(Voice::Alloy),
            "female" => Ok(Voice::Female),
            "male" => Ok(Voice::Male),
            other => Err(format!(
                "unknown voice '{other}' (expected alloy, female or male)"
            )),
        }
    }
}

/// Boundary over the three generative capabilities.
///
/// Every call is a single blocking request with no retry. Implementations
/// must be swappable (HTTP client vs mock).
pub trait ServiceGateway: Send + Sync {
    /// Generate text for a user prompt under a system instruction.
    ///
    /// Returns the generated text with surrounding whitespace trimmed.
    fn complete(&self, prompt: &str, system: &str) -> Result<String, ServiceError>;

    /// Synthesize speech for `text` as uncompressed WAV bytes.
    fn synthesize(&self, text: &str, voice: Voice) -> Result<Vec<u8>, ServiceError>;

    /// Transcribe audio bytes into newline-delimited utterances.
    fn transcribe(&self, audio: &[u8]) -> Result<String, ServiceError>;

    /// Short description for status output
    fn describe(&self) -> String;
}

/// Implement ServiceGateway for Arc<T> so tests can keep a handle on a mock
/// that the pipeline owns.
impl<T: ServiceGateway + ?Sized> ServiceGateway for Arc<T> {
    fn complete(&self, prompt: &str, system: &str) -> Result<String, ServiceError> {
        (**self).complete(prompt, system)
    }

    fn synthesize(&self, text: &str, voice: Voice) -> Result<Vec<u8>, ServiceError> {
        (**self).synthesize(text, voice)
    }

    fn transcribe(&self, audio: &[u8]) -> Result<String, ServiceError> {
        (**self).transcribe(audio)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// A completion request recorded by [`MockGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCompletion {
    pub prompt: String,
    pub system: String,
}

#[derive(Debug, Default)]
struct MockLog {
    completions: Vec<RecordedCompletion>,
    syntheses: Vec<(String, Voice)>,
    transcriptions: usize,
}

/// Deterministic gateway for tests and offline dry runs.
///
/// Completions echo the prompt unless a fixed response is configured.
#[derive(Debug)]
pub struct MockGateway {
    completion: Option<String>,
    audio: Vec<u8>,
    transcript: String,
    fail_completion_at: Option<usize>,
    fail_synthesis: bool,
    fail_transcription: bool,
    log: Mutex<MockLog>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            completion: None,
            audio: b"RIFF-mock-audio".to_vec(),
            transcript: "mock transcription".to_string(),
            fail_completion_at: None,
            fail_synthesis: false,
            fail_transcription: false,
            log: Mutex::new(MockLog::default()),
        }
    }

    /// Return `text` (trimmed) from every completion call.
    pub fn with_completion(mut self, text: &str) -> Self {
        self.completion = Some(text.to_string());
        self
    }

    /// Return these bytes from synthesis.
    pub fn with_audio(mut self, audio: &[u8]) -> Self {
        self.audio = audio.to_vec();
        self
    }

    /// Return this text from transcription.
    pub fn with_transcript(mut self, transcript: &str) -> Self {
        self.transcript = transcript.to_string();
        self
    }

    /// Fail the n-th completion call (1-based), counted over the mock's lifetime.
    pub fn fail_completion_at(mut self, call: usize) -> Self {
        self.fail_completion_at = Some(call.max(1));
        self
    }

    /// Fail every completion call.
    pub fn with_completion_failure(mut self) -> Self {
        // 0 never matches a 1-based call number, so it is reserved for "always".
        self.fail_completion_at = Some(0);
        self
    }

    pub fn with_synthesis_failure(mut self) -> Self {
        self.fail_synthesis = true;
        self
    }

    pub fn with_transcription_failure(mut self) -> Self {
        self.fail_transcription = true;
        self
    }

    /// Completion requests seen so far, in call order.
    pub fn completions(&self) -> Vec<RecordedCompletion> {
        self.lock().completions.clone()
    }

    /// Synthesis requests seen so far, in call order.
    pub fn syntheses(&self) -> Vec<(String, Voice)> {
        self.lock().syntheses.clone()
    }

    pub fn transcription_calls(&self) -> usize {
        self.lock().transcriptions
    }

    /// Number of calls across all three capabilities.
    pub fn total_calls(&self) -> usize {
        let log = self.lock();
        log.completions.len() + log.syntheses.len() + log.transcriptions
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockLog> {
        // A poisoned log only means another test thread panicked mid-record.
        self.log.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn mock_failure(what: &str) -> ServiceError {
        ServiceError::Status {
            status: 503,
            message: format!("mock {what} failure"),
        }
    }
}

impl ServiceGateway for MockGateway {
    fn complete(&self, prompt: &str, system: &str) -> Result<String, ServiceError> {
        let call = {
            let mut log = self.lock();
            log.completions.push(RecordedCompletion {
                prompt: prompt.to_string(),
                system: system.to_string(),
            });
            log.completions.len()
        };

        match self.fail_completion_at {
            Some(0) => return Err(Self::mock_failure("completion")),
            Some(n) if n == call => return Err(Self::mock_failure("completion")),
            _ => {}
        }

        let text = match &self.completion {
            Some(fixed) => fixed.clone(),
            None => format!("mock: {prompt}"),
        };
        Ok(text.trim().to_string())
    }

    fn synthesize(&self, text: &str, voice: Voice) -> Result<Vec<u8>, ServiceError> {
        self.lock().syntheses.push((text.to_string(), voice));
        if self.fail_synthesis {
            return Err(Self::mock_failure("synthesis"));
        }
        Ok(self.audio.clone())
    }

    fn transcribe(&self, _audio: &[u8]) -> Result<String, ServiceError> {
        self.lock().transcriptions += 1;
        if self.fail_transcription {
            return Err(Self::mock_failure("transcription"));
        }
        Ok(self.transcript.clone())
    }

    fn describe(&self) -> String {
        "mock gateway".to_string()
    }
}
