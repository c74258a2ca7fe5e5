//! Device identification

use anyhow::Result;
use tracing::info;

use crate::commands::IdentifyArgs;
use crate::error::CliError;
use crate::output;

/// Execute identify command
pub fn execute(args: &IdentifyArgs, json: bool) -> Result<()> {
    let identity = alps_protocol::identify(args.e7, args.ec)
        .map_err(|e| CliError::Alps(e.into()))?;
    info!("identified {} touchpad", identity.descriptor.version);
    output::print_identity(&identity, json);
    Ok(())
}
