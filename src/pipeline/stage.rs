//! Stage identities, prerequisites and run requests.
//!
//! Stages have no fixed visit order. Each is gated only by the artifacts it
//! reads, so any stage whose inputs exist may run (or re-run) at any time.

use crate::artifacts::{ArtifactKind, Session};
use crate::error::ValidationError;
use crate::gateway::Voice;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Script,
    Audio,
    Transcription,
    Storyboard,
    Metadata,
    Video,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Script,
        Stage::Audio,
        Stage::Transcription,
        Stage::Storyboard,
        Stage::Metadata,
        Stage::Video,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Script => "script",
            Stage::Audio => "audio",
            Stage::Transcription => "transcription",
            Stage::Storyboard => "storyboard",
            Stage::Metadata => "metadata",
            Stage::Video => "video",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Stage::Script => "Script Generation",
            Stage::Audio => "Audio Creation",
            Stage::Transcription => "Timestamped Transcription",
            Stage::Storyboard => "Storyboard Creation",
            Stage::Metadata => "Metadata Generation",
            Stage::Video => "Video Assembly",
        }
    }

    /// Artifact this stage overwrites.
    pub fn output(self) -> ArtifactKind {
        match self {
            Stage::Script => ArtifactKind::ScriptText,
            Stage::Audio => ArtifactKind::AudioPath,
            Stage::Transcription => ArtifactKind::Timestamps,
            Stage::Storyboard => ArtifactKind::Storyboard,
            Stage::Metadata => ArtifactKind::Metadata,
            Stage::Video => ArtifactKind::VideoPath,
        }
    }

    /// Artifacts that must be present before the stage's generate action.
    ///
    /// For audio this is the synthesis path; uploading needs nothing.
    pub fn prerequisites(self) -> &'static [ArtifactKind] {
        match self {
            Stage::Script => &[],
            Stage::Audio => &[ArtifactKind::ScriptText],
            Stage::Transcription => &[ArtifactKind::AudioPath],
            Stage::Storyboard => &[ArtifactKind::Timestamps],
            Stage::Metadata => &[ArtifactKind::ScriptText],
            Stage::Video => &[ArtifactKind::Storyboard, ArtifactKind::AudioPath],
        }
    }

    /// The "can I run?" predicate: first missing prerequisite, if any.
    pub fn check(self, session: &Session) -> Result<(), ValidationError> {
        check_all(self.prerequisites(), session)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One user-triggered stage action with its stage-specific input.
#[derive(Debug, Clone, PartialEq)]
pub enum StageRequest {
    /// `None` reuses the current script as the prompt.
    Script { prompt: Option<String> },
    SynthesizeAudio { voice: Voice },
    UploadAudio { path: PathBuf },
    Transcribe,
    Storyboard,
    Metadata,
    Video,
}

impl StageRequest {
    pub fn stage(&self) -> Stage {
        match self {
            StageRequest::Script { .. } => Stage::Script,
            StageRequest::SynthesizeAudio { .. } | StageRequest::UploadAudio { .. } => Stage::Audio,
            StageRequest::Transcribe => Stage::Transcription,
            StageRequest::Storyboard => Stage::Storyboard,
            StageRequest::Metadata => Stage::Metadata,
            StageRequest::Video => Stage::Video,
        }
    }

    /// Artifacts this particular action reads.
    pub fn prerequisites(&self) -> &'static [ArtifactKind] {
        match self {
            StageRequest::UploadAudio { .. } => &[],
            other => other.stage().prerequisites(),
        }
    }

    pub fn check(&self, session: &Session) -> Result<(), ValidationError> {
        check_all(self.prerequisites(), session)
    }
}

fn check_all(kinds: &[ArtifactKind], session: &Session) -> Result<(), ValidationError> {
    kinds.iter().try_for_each(|kind| session.require(*kind))
}
