//! Publishing metadata: title, description and thumbnail prompt.

use crate::artifacts::Session;
use crate::defaults::METADATA_SYSTEM_PROMPT;
use crate::error::Result;
use crate::gateway::ServiceGateway;
use tracing::info;

/// Generate metadata from the script and overwrite `metadata_json`.
///
/// The response is stored as-is; it is not parsed into fields.
pub fn generate(session: &mut Session, gateway: &dyn ServiceGateway) -> Result<()> {
    let script = session.require_script()?.to_string();

    let metadata = gateway.complete(&script, METADATA_SYSTEM_PROMPT)?;
    info!(chars = metadata.len(), "metadata generated");
    session.set_metadata(metadata);
    Ok(())
}
