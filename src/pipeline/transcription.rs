//! Timestamped transcription.
//!
//! Timestamps are synthetic: every kept transcript line gets the next fixed
//! window, regardless of where it actually falls in the audio.

use crate::artifacts::{Segment, Session};
use crate::defaults::SEGMENT_SECS;
use crate::error::Result;
use crate::gateway::ServiceGateway;
use crate::media::ResourceStore;
use tracing::info;

/// Transcribe the session audio and overwrite `timestamps_json`.
///
/// Returns the number of segments written.
pub fn transcribe(session: &mut Session, gateway: &dyn ServiceGateway) -> Result<usize> {
    let audio_path = session.require_audio()?;
    let audio = ResourceStore::read(audio_path)?;

    let transcript = gateway.transcribe(&audio)?;
    let segments = segment_transcript(&transcript);
    info!(
        bytes = audio.len(),
        segments = segments.len(),
        "audio transcribed"
    );

    let count = segments.len();
    session.set_timestamps(segments);
    Ok(count)
}

/// Split a transcript into fixed-window segments, one per non-blank line.
///
/// Blank lines are dropped without consuming a window.
pub fn segment_transcript(transcript: &str) -> Vec<Segment> {
    let window = f64::from(SEGMENT_SECS);
    transcript
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| {
            let i = i as f64;
            Segment::new(i * window, (i + 1.0) * window, line)
        })
        .collect()
}
