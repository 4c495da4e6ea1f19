//! OpenAI-compatible HTTP gateway.
//!
//! Speaks the chat completions, audio speech and audio transcription
//! endpoints. Any server implementing the same routes (local proxies,
//! compatible providers) works by pointing `service.base_url` at it.

use crate::config::{ServiceConfig, VoiceConfig};
use crate::defaults;
use crate::error::ServiceError;
use crate::gateway::service::{ServiceGateway, Voice};
use reqwest::blocking::{Client, Response, multipart};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

/// Longest error body echoed back to the user.
const MAX_ERROR_CHARS: usize = 300;

pub struct OpenAiGateway {
    client: Client,
    base_url: String,
    api_key: String,
    completion_model: String,
    speech_model: String,
    transcription_model: String,
    voices: VoiceConfig,
}

impl OpenAiGateway {
    /// Build a gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::MissingApiKey`] when no key is configured.
    pub fn new(service: &ServiceConfig, voices: &VoiceConfig) -> Result<Self, ServiceError> {
        let api_key = service
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ServiceError::MissingApiKey)?
            .to_string();

        // The blocking client defaults to a 30s timeout; no timeout unless configured.
        let client = Client::builder()
            .user_agent(concat!("tldr-studio/", env!("CARGO_PKG_VERSION")))
            .timeout(service.timeout())
            .build()
            .map_err(|e| ServiceError::Network {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: service.base_url.trim_end_matches('/').to_string(),
            api_key,
            completion_model: service.completion_model.clone(),
            speech_model: service.speech_model.clone(),
            transcription_model: service.transcription_model.clone(),
            voices: voices.clone(),
        })
    }

    fn endpoint(&self, route: &str) -> String {
        join_endpoint(&self.base_url, route)
    }
}

impl ServiceGateway for OpenAiGateway {
    fn complete(&self, prompt: &str, system: &str) -> Result<String, ServiceError> {
        let body = completion_request(&self.completion_model, prompt, system);
        debug!(model = %self.completion_model, prompt_chars = prompt.len(), "chat completion request");

        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(network_error)?;
        let text = check_status(response)?.text().map_err(network_error)?;
        parse_completion(&text)
    }

    fn synthesize(&self, text: &str, voice: Voice) -> Result<Vec<u8>, ServiceError> {
        let body = speech_request(&self.speech_model, text, self.voices.provider_id(voice));
        debug!(model = %self.speech_model, %voice, text_chars = text.len(), "speech request");

        let response = self
            .client
            .post(self.endpoint("audio/speech"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(network_error)?;
        let bytes = check_status(response)?.bytes().map_err(network_error)?;
        if bytes.is_empty() {
            return Err(ServiceError::MalformedResponse {
                message: "speech endpoint returned no audio".to_string(),
            });
        }
        Ok(bytes.to_vec())
    }

    fn transcribe(&self, audio: &[u8]) -> Result<String, ServiceError> {
        let (extension, mime) = sniff_audio_format(audio);
        debug!(model = %self.transcription_model, bytes = audio.len(), mime, "transcription request");

        let file = multipart::Part::bytes(audio.to_vec())
            .file_name(format!("audio.{extension}"))
            .mime_str(mime)
            .map_err(|e| ServiceError::MalformedResponse {
                message: format!("invalid audio mime type: {e}"),
            })?;
        let form = multipart::Form::new()
            .text("model", self.transcription_model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment")
            .part("file", file);

        let response = self
            .client
            .post(self.endpoint("audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .map_err(network_error)?;
        let text = check_status(response)?.text().map_err(network_error)?;
        parse_transcription(&text)
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.base_url, self.completion_model)
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
    #[serde(default)]
    segments: Vec<TranscriptionSegment>,
}

#[derive(Deserialize)]
struct TranscriptionSegment {
    text: String,
}

fn join_endpoint(base_url: &str, route: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        route.trim_start_matches('/')
    )
}

fn completion_request(model: &str, prompt: &str, system: &str) -> Value {
    json!({
        "model": model,
        "messages": [
            {"role": "system", "content": system},
            {"role": "user", "content": prompt},
        ],
        "temperature": defaults::TEMPERATURE,
    })
}

fn speech_request(model: &str, text: &str, voice_id: &str) -> Value {
    json!({
        "model": model,
        "input": text,
        "voice": voice_id,
        "response_format": defaults::SPEECH_FORMAT,
    })
}

fn network_error(e: reqwest::Error) -> ServiceError {
    ServiceError::Network {
        message: e.to_string(),
    }
}

fn check_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(classify_status(status.as_u16(), &body))
}

/// Map a non-success HTTP status and body onto the error taxonomy.
fn classify_status(status: u16, body: &str) -> ServiceError {
    let message = error_message(body);
    match status {
        401 | 403 => ServiceError::Auth { message },
        429 => ServiceError::Quota { message },
        _ => ServiceError::Status { status, message },
    }
}

/// Pull `error.message` out of an API error body, or fall back to the raw text.
fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        v.get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
    });
    let message = from_json.unwrap_or_else(|| body.trim().to_string());
    if message.is_empty() {
        return "no response body".to_string();
    }
    if message.chars().count() > MAX_ERROR_CHARS {
        let cut: String = message.chars().take(MAX_ERROR_CHARS).collect();
        format!("{cut}…")
    } else {
        message
    }
}

fn parse_completion(body: &str) -> Result<String, ServiceError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| ServiceError::MalformedResponse {
            message: format!("completion body: {e}"),
        })?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| ServiceError::MalformedResponse {
            message: "completion has no message content".to_string(),
        })
}

/// One line per transcribed segment; plain `text` when no segments came back.
fn parse_transcription(body: &str) -> Result<String, ServiceError> {
    let response: TranscriptionResponse =
        serde_json::from_str(body).map_err(|e| ServiceError::MalformedResponse {
            message: format!("transcription body: {e}"),
        })?;
    if response.segments.is_empty() {
        return Ok(response.text.trim().to_string());
    }
    Ok(response
        .segments
        .iter()
        .map(|segment| segment.text.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Guess file extension and mime type from the container magic bytes.
fn sniff_audio_format(audio: &[u8]) -> (&'static str, &'static str) {
    match audio {
        [b'R', b'I', b'F', b'F', ..] => ("wav", "audio/wav"),
        [b'I', b'D', b'3', ..] | [0xFF, 0xFB | 0xF3 | 0xF2, ..] => ("mp3", "audio/mpeg"),
        [b'O', b'g', b'g', b'S', ..] => ("ogg", "audio/ogg"),
        [b'f', b'L', b'a', b'C', ..] => ("flac", "audio/flac"),
        [_, _, _, _, b'f', b't', b'y', b'p', ..] => ("m4a", "audio/mp4"),
        [0x1A, 0x45, 0xDF, 0xA3, ..] => ("webm", "audio/webm"),
        _ => ("wav", "audio/wav"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_with_key(key: Option<&str>) -> ServiceConfig {
        ServiceConfig {
            api_key: key.map(str::to_string),
            ..ServiceConfig::default()
        }
    }

    #[test]
    fn new_without_api_key_fails() {
        let result = OpenAiGateway::new(&service_with_key(None), &VoiceConfig::default());
        assert!(matches!(result, Err(ServiceError::MissingApiKey)));
    }

    #[test]
    fn new_with_blank_api_key_fails() {
        let result = OpenAiGateway::new(&service_with_key(Some("  ")), &VoiceConfig::default());
        assert!(matches!(result, Err(ServiceError::MissingApiKey)));
    }

    #[test]
    fn new_with_key_describes_endpoint() {
        let mut service = service_with_key(Some("sk-test"));
        service.base_url = "http://localhost:9999/v1/".to_string();
        let gateway = OpenAiGateway::new(&service, &VoiceConfig::default()).unwrap();
        assert_eq!(gateway.describe(), "http://localhost:9999/v1 (gpt-4o-mini)");
        assert_eq!(
            gateway.endpoint("chat/completions"),
            "http://localhost:9999/v1/chat/completions"
        );
    }

    #[test]
    fn join_endpoint_normalizes_slashes() {
        assert_eq!(join_endpoint("http://h/v1/", "/audio/speech"), "http://h/v1/audio/speech");
        assert_eq!(join_endpoint("http://h/v1", "audio/speech"), "http://h/v1/audio/speech");
    }

    #[test]
    fn completion_request_has_roles_and_temperature() {
        let body = completion_request("gpt-4o-mini", "Why is the sky blue?", "be brief");
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be brief");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Why is the sky blue?");
        let temperature = body["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }

    #[test]
    fn speech_request_asks_for_wav() {
        let body = speech_request("tts-1", "hello", "nova");
        assert_eq!(body["voice"], "nova");
        assert_eq!(body["input"], "hello");
        assert_eq!(body["response_format"], "wav");
    }

    #[test]
    fn parse_completion_trims_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  Rayleigh scattering.\n"}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "Rayleigh scattering.");
    }

    #[test]
    fn parse_completion_without_choices_is_malformed() {
        let result = parse_completion(r#"{"choices":[]}"#);
        assert!(matches!(result, Err(ServiceError::MalformedResponse { .. })));
    }

    #[test]
    fn parse_completion_with_null_content_is_malformed() {
        let result = parse_completion(r#"{"choices":[{"message":{"content":null}}]}"#);
        assert!(matches!(result, Err(ServiceError::MalformedResponse { .. })));
    }

    #[test]
    fn parse_completion_rejects_non_json() {
        let result = parse_completion("<html>bad gateway</html>");
        assert!(matches!(result, Err(ServiceError::MalformedResponse { .. })));
    }

    #[test]
    fn parse_transcription_joins_segments_by_line() {
        let body = r#"{"text":"Hello there. Welcome back.","segments":[
            {"id":0,"start":0.0,"end":1.2,"text":" Hello there."},
            {"id":1,"start":1.2,"end":2.5,"text":" Welcome back."}
        ]}"#;
        assert_eq!(
            parse_transcription(body).unwrap(),
            "Hello there.\nWelcome back."
        );
    }

    #[test]
    fn parse_transcription_falls_back_to_text() {
        let body = r#"{"text":" Just one line. "}"#;
        assert_eq!(parse_transcription(body).unwrap(), "Just one line.");
    }

    #[test]
    fn classify_auth_quota_and_other() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        assert_eq!(
            classify_status(401, body),
            ServiceError::Auth {
                message: "Incorrect API key provided".to_string()
            }
        );
        assert!(matches!(classify_status(429, "slow down"), ServiceError::Quota { .. }));
        assert_eq!(
            classify_status(502, ""),
            ServiceError::Status {
                status: 502,
                message: "no response body".to_string()
            }
        );
    }

    #[test]
    fn error_message_truncates_long_bodies() {
        let long = "x".repeat(1000);
        let message = error_message(&long);
        assert_eq!(message.chars().count(), MAX_ERROR_CHARS + 1);
        assert!(message.ends_with('…'));
    }

    #[test]
    fn sniff_detects_common_containers() {
        assert_eq!(sniff_audio_format(b"RIFF\0\0\0\0WAVE").0, "wav");
        assert_eq!(sniff_audio_format(b"ID3\x04\0").0, "mp3");
        assert_eq!(sniff_audio_format(&[0xFF, 0xFB, 0x90, 0x00]).0, "mp3");
        assert_eq!(sniff_audio_format(b"OggS\0\x02").0, "ogg");
        assert_eq!(sniff_audio_format(b"fLaC\0\0").0, "flac");
        assert_eq!(sniff_audio_format(b"\0\0\0\x20ftypM4A ").0, "m4a");
        assert_eq!(sniff_audio_format(b"??").0, "wav");
    }
}
