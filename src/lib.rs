//! tldr-studio - topic to narrated explainer video
//!
//! Six stages (script, audio, transcription, storyboard, metadata, video)
//! over an in-memory session, gated by the artifacts each one reads.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod artifacts;
pub mod config;
pub mod defaults;
pub mod error;
pub mod gateway;
pub mod media;
pub mod pipeline;

#[cfg(feature = "cli")]
pub mod app;
#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod diagnostics;
#[cfg(feature = "cli")]
pub mod output;
#[cfg(feature = "cli")]
pub mod repl;

// Session and artifacts
pub use artifacts::{ArtifactKind, Segment, Session, StoryboardEntry};

// Collaborator seams (gateway in, assembler out)
pub use gateway::{MockGateway, OpenAiGateway, ServiceGateway, Voice};
pub use media::{FfmpegAssembler, MockAssembler, ResourceStore, VideoAssembler, VideoPlan};

// Pipeline
pub use pipeline::{Pipeline, Stage, StageRequest};

// Error handling
pub use error::{AssemblyError, Result, ServiceError, StudioError, ValidationError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
