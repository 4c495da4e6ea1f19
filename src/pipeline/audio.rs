//! Audio creation: synthesize the script or take an uploaded file.
//!
//! Both paths overwrite `audio_path`; whichever ran last wins.

use crate::artifacts::Session;
use crate::error::Result;
use crate::gateway::{ServiceGateway, Voice};
use crate::media::ResourceStore;
use crate::media::wav;
use std::path::{Path, PathBuf};
use tracing::info;

/// Narrate the current script with `voice`.
///
/// # Errors
///
/// Missing script (no call made), the synthesis `ServiceError`, or an I/O
/// error writing the resource. The session is untouched on error.
pub fn synthesize(
    session: &mut Session,
    gateway: &dyn ServiceGateway,
    resources: &ResourceStore,
    voice: Voice,
) -> Result<PathBuf> {
    let script = session.require_script()?.to_string();

    let audio = gateway.synthesize(&script, voice)?;
    let path = resources.persist("narration-", "wav", &audio)?;

    match wav::inspect_bytes(&audio) {
        Some(info) => info!(
            %voice,
            bytes = audio.len(),
            seconds = info.duration.as_secs_f64(),
            path = %path.display(),
            "narration synthesized"
        ),
        None => info!(%voice, bytes = audio.len(), path = %path.display(), "narration synthesized"),
    }

    session.set_audio_path(path.clone());
    Ok(path)
}

/// Use a user-provided audio file as the narration, byte for byte.
///
/// # Errors
///
/// Validation error for a blank, unreadable or empty source file.
pub fn upload(session: &mut Session, resources: &ResourceStore, source: &Path) -> Result<PathBuf> {
    let path = resources.import(source, "upload-")?;
    info!(source = %source.display(), path = %path.display(), "audio uploaded");
    session.set_audio_path(path.clone());
    Ok(path)
}
