//! Video assembly from the storyboard and the session audio.

use crate::artifacts::Session;
use crate::error::Result;
use crate::media::{ResourceStore, VideoAssembler, VideoPlan, wav};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Assemble label-only slides over the narration and overwrite `video_path`.
///
/// The video lasts exactly five seconds per storyboard entry. The audio is
/// not stretched or trimmed to match; a mismatch is only logged.
pub fn assemble(
    session: &mut Session,
    assembler: &dyn VideoAssembler,
    resources: &ResourceStore,
) -> Result<PathBuf> {
    let entries = session.require_storyboard()?;
    let audio = session.require_audio()?;

    let plan = VideoPlan::from_storyboard(entries, audio);
    let output = resources.allocate("video-", "mp4")?;

    if let Err(e) = assembler.assemble(&plan, &output) {
        if let Err(cleanup) = fs::remove_file(&output) {
            warn!(path = %output.display(), error = %cleanup, "failed to remove unfinished video");
        }
        return Err(e.into());
    }

    let nominal = plan.nominal_duration();
    if let Some(info) = wav::inspect_file(&plan.audio)
        && info.duration != nominal
    {
        warn!(
            audio_secs = info.duration.as_secs_f64(),
            video_secs = nominal.as_secs_f64(),
            "narration length differs from slide length"
        );
    }
    info!(
        slides = plan.slides.len(),
        seconds = nominal.as_secs(),
        path = %output.display(),
        "video assembled"
    );

    session.set_video_path(output.clone());
    Ok(output)
}
