//! Stamp retry queue commands

use clap::Subcommand;

use crate::display::format_pending_stamps;
use crate::error::RegisterResult;

use super::RegisterApp;

/// Stamp queue subcommands
#[derive(Subcommand)]
pub enum StampsCommands {
    /// Show records still waiting for their derived code
    List,
    /// Retry every pending stamp
    Retry,
}

/// Handle a stamps command
pub async fn handle_stamps_command(app: &RegisterApp, cmd: StampsCommands) -> RegisterResult<()> {
    match cmd {
        StampsCommands::List => {
            print!("{}", format_pending_stamps(&app.store().pending_stamps()));
        }

        StampsCommands::Retry => {
            let report = app.store().retry_pending_stamps().await?;
            println!(
                "Applied {} stamp(s), {} still pending.",
                report.applied, report.remaining
            );
        }
    }

    Ok(())
}
