//! Script generation.

use crate::artifacts::Session;
use crate::defaults::SCRIPT_SYSTEM_PROMPT;
use crate::error::{Result, ValidationError};
use crate::gateway::ServiceGateway;
use tracing::info;

/// Generate a narration script and overwrite `script_text`.
///
/// `prompt` of `None` feeds the current script back in verbatim, which is
/// how a user asks for a rewrite.
///
/// # Errors
///
/// `EmptyInput` when the resolved prompt is blank (nothing is called), or
/// the completion's `ServiceError`. The session is untouched on error.
pub fn generate(
    session: &mut Session,
    gateway: &dyn ServiceGateway,
    prompt: Option<&str>,
) -> Result<()> {
    let prompt = match prompt {
        Some(p) => p,
        None => session.script_text().unwrap_or_default(),
    };
    if prompt.trim().is_empty() {
        return Err(ValidationError::EmptyInput { field: "prompt" }.into());
    }
    let prompt = prompt.to_string();

    let script = gateway.complete(&prompt, SCRIPT_SYSTEM_PROMPT)?;
    info!(
        prompt_chars = prompt.len(),
        script_chars = script.len(),
        "script generated"
    );
    session.set_script_text(script);
    Ok(())
}
