//! Error types for tldr-studio.
//!
//! Three families map onto how a failed stage is reported:
//! [`ValidationError`] is a blocking notice raised before any external call,
//! [`ServiceError`] comes from the generative services, and
//! [`AssemblyError`] from the video encoder. None of them leave a partially
//! updated session behind.

use crate::artifacts::ArtifactKind;
use thiserror::Error;

/// A stage was asked to run without its inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{} is missing; {}", .artifact.label(), .artifact.hint())]
    MissingArtifact { artifact: ArtifactKind },

    #[error("{field} must not be empty")]
    EmptyInput { field: &'static str },

    #[error("Uploaded audio is not usable: {message}")]
    InvalidUpload { message: String },
}

/// The generative service call failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("No API key configured (set OPENAI_API_KEY or service.api_key)")]
    MissingApiKey,

    #[error("Service unreachable: {message}")]
    Network { message: String },

    #[error("Service rejected credentials: {message}")]
    Auth { message: String },

    #[error("Service quota exceeded: {message}")]
    Quota { message: String },

    #[error("Service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed service response: {message}")]
    MalformedResponse { message: String },
}

/// The video assembly collaborator failed.
#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("Encoder not found: {binary}")]
    EncoderNotFound { binary: String },

    #[error("Encoder failed ({status}): {stderr}")]
    EncoderFailed { status: String, stderr: String },

    #[error("Nothing to assemble: the slide list is empty")]
    EmptyPlan,

    #[error("Audio resource unavailable: {path}")]
    AudioUnavailable { path: String },

    #[error("Assembly I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum StudioError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    // Configuration errors
    #[error("Failed to render configuration: {message}")]
    ConfigRender { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Session resource errors
    #[error("Failed to read {path}: {source}")]
    ResourceRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StudioError {
    /// True for blocking notices that should be shown as guidance, not failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, StudioError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;
