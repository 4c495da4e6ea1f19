//! Session artifact store.
//!
//! Holds the six artifacts the pipeline stages exchange. Everything lives in
//! memory for the duration of one session; binary artifacts are references to
//! files in the session scratch directory.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Names of the six session artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    ScriptText,
    AudioPath,
    Timestamps,
    Storyboard,
    Metadata,
    VideoPath,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 6] = [
        ArtifactKind::ScriptText,
        ArtifactKind::AudioPath,
        ArtifactKind::Timestamps,
        ArtifactKind::Storyboard,
        ArtifactKind::Metadata,
        ArtifactKind::VideoPath,
    ];

    /// Session key, as shown by `status` and accepted by `show`.
    pub fn key(self) -> &'static str {
        match self {
            ArtifactKind::ScriptText => "script_text",
            ArtifactKind::AudioPath => "audio_path",
            ArtifactKind::Timestamps => "timestamps_json",
            ArtifactKind::Storyboard => "storyboard_json",
            ArtifactKind::Metadata => "metadata_json",
            ArtifactKind::VideoPath => "video_path",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ArtifactKind::ScriptText => "Script",
            ArtifactKind::AudioPath => "Audio",
            ArtifactKind::Timestamps => "Timestamps",
            ArtifactKind::Storyboard => "Storyboard",
            ArtifactKind::Metadata => "Metadata",
            ArtifactKind::VideoPath => "Video",
        }
    }

    /// What the user has to do to produce this artifact.
    pub fn hint(self) -> &'static str {
        match self {
            ArtifactKind::ScriptText => "generate a script first",
            ArtifactKind::AudioPath => "create or upload audio first",
            ArtifactKind::Timestamps => "run transcription first",
            ArtifactKind::Storyboard => "create the storyboard first",
            ArtifactKind::Metadata => "generate metadata first",
            ArtifactKind::VideoPath => "assemble the video first",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ArtifactKind::ALL
            .into_iter()
            .find(|kind| {
                kind.key() == wanted
                    || kind.label().to_ascii_lowercase() == wanted
                    || kind.key().split('_').next() == Some(wanted.as_str())
            })
            .ok_or_else(|| {
                format!(
                    "unknown artifact '{}' (expected one of: {})",
                    s.trim(),
                    ArtifactKind::ALL.map(ArtifactKind::key).join(", ")
                )
            })
    }
}

/// One transcribed utterance with a synthetic time window (seconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// A segment augmented with a generated visual prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryboardEntry {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub prompt: String,
}

impl StoryboardEntry {
    pub fn from_segment(segment: &Segment, prompt: String) -> Self {
        Self {
            start: segment.start,
            end: segment.end,
            text: segment.text.clone(),
            prompt,
        }
    }
}

/// In-memory artifact store for one pipeline session.
///
/// Every artifact starts absent. Setters replace the whole value; there is no
/// way to append to or partially edit an artifact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    script_text: Option<String>,
    audio_path: Option<PathBuf>,
    timestamps_json: Option<Vec<Segment>>,
    storyboard_json: Option<Vec<StoryboardEntry>>,
    metadata_json: Option<String>,
    video_path: Option<PathBuf>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_text(&self) -> Option<&str> {
        self.script_text.as_deref()
    }

    pub fn audio_path(&self) -> Option<&Path> {
        self.audio_path.as_deref()
    }

    pub fn timestamps(&self) -> Option<&[Segment]> {
        self.timestamps_json.as_deref()
    }

    pub fn storyboard(&self) -> Option<&[StoryboardEntry]> {
        self.storyboard_json.as_deref()
    }

    pub fn metadata(&self) -> Option<&str> {
        self.metadata_json.as_deref()
    }

    pub fn video_path(&self) -> Option<&Path> {
        self.video_path.as_deref()
    }

    pub fn set_script_text(&mut self, script: String) {
        self.script_text = Some(script);
    }

    pub fn set_audio_path(&mut self, path: PathBuf) {
        self.audio_path = Some(path);
    }

    pub fn set_timestamps(&mut self, segments: Vec<Segment>) {
        self.timestamps_json = Some(segments);
    }

    pub fn set_storyboard(&mut self, entries: Vec<StoryboardEntry>) {
        self.storyboard_json = Some(entries);
    }

    pub fn set_metadata(&mut self, metadata: String) {
        self.metadata_json = Some(metadata);
    }

    pub fn set_video_path(&mut self, path: PathBuf) {
        self.video_path = Some(path);
    }

    /// Whether an artifact is present for gating purposes.
    ///
    /// Blank text and empty sequences count as absent.
    pub fn has(&self, kind: ArtifactKind) -> bool {
        match kind {
            ArtifactKind::ScriptText => self.script_text.as_deref().is_some_and(is_filled),
            ArtifactKind::AudioPath => self
                .audio_path
                .as_deref()
                .is_some_and(|p| !p.as_os_str().is_empty()),
            ArtifactKind::Timestamps => self.timestamps_json.as_ref().is_some_and(|v| !v.is_empty()),
            ArtifactKind::Storyboard => self.storyboard_json.as_ref().is_some_and(|v| !v.is_empty()),
            ArtifactKind::Metadata => self.metadata_json.as_deref().is_some_and(is_filled),
            ArtifactKind::VideoPath => self
                .video_path
                .as_deref()
                .is_some_and(|p| !p.as_os_str().is_empty()),
        }
    }

    /// Fail with a blocking notice when `kind` is absent.
    pub fn require(&self, kind: ArtifactKind) -> Result<(), ValidationError> {
        if self.has(kind) {
            Ok(())
        } else {
            Err(ValidationError::MissingArtifact { artifact: kind })
        }
    }

    pub fn require_script(&self) -> Result<&str, ValidationError> {
        self.require(ArtifactKind::ScriptText)?;
        Ok(self.script_text.as_deref().unwrap_or_default())
    }

    pub fn require_audio(&self) -> Result<&Path, ValidationError> {
        match self.audio_path.as_deref() {
            Some(path) if self.has(ArtifactKind::AudioPath) => Ok(path),
            _ => Err(ValidationError::MissingArtifact {
                artifact: ArtifactKind::AudioPath,
            }),
        }
    }

    pub fn require_timestamps(&self) -> Result<&[Segment], ValidationError> {
        self.require(ArtifactKind::Timestamps)?;
        Ok(self.timestamps_json.as_deref().unwrap_or_default())
    }

    pub fn require_storyboard(&self) -> Result<&[StoryboardEntry], ValidationError> {
        self.require(ArtifactKind::Storyboard)?;
        Ok(self.storyboard_json.as_deref().unwrap_or_default())
    }

    /// Artifacts currently present, in pipeline order.
    pub fn present(&self) -> Vec<ArtifactKind> {
        ArtifactKind::ALL
            .into_iter()
            .filter(|kind| self.has(*kind))
            .collect()
    }
}

fn is_filled(text: &str) -> bool {
    !text.trim().is_empty()
}
