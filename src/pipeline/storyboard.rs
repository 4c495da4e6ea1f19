//! Storyboard creation: one visual prompt per transcript segment.

use crate::artifacts::{Session, StoryboardEntry};
use crate::defaults::{STORYBOARD_REQUEST_PREFIX, STORYBOARD_SYSTEM_PROMPT};
use crate::error::{Result, ServiceError};
use crate::gateway::ServiceGateway;
use tracing::{debug, info};

/// Build the storyboard and overwrite `storyboard_json`.
///
/// Segments are prompted one by one, in order, with no shared context. The
/// first failure aborts the stage and nothing is written.
pub fn create(session: &mut Session, gateway: &dyn ServiceGateway) -> Result<usize> {
    let segments = session.require_timestamps()?;

    let entries = segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            let prompt = gateway.complete(&scene_request(&segment.text), STORYBOARD_SYSTEM_PROMPT)?;
            debug!(segment = i, prompt_chars = prompt.len(), "scene prompt generated");
            Ok(StoryboardEntry::from_segment(segment, prompt))
        })
        .collect::<std::result::Result<Vec<_>, ServiceError>>()?;

    info!(entries = entries.len(), "storyboard created");
    let count = entries.len();
    session.set_storyboard(entries);
    Ok(count)
}

/// User prompt for one segment's visual.
pub fn scene_request(text: &str) -> String {
    format!("{STORYBOARD_REQUEST_PREFIX}{text}")
}
