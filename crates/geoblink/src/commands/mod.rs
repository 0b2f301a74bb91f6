//! Command handlers, one module per top-level command group.

pub mod auth;
pub mod devices;
pub mod notifications;
pub mod sync_cmd;
pub mod watch;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a parsed command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Login { phone } => auth::login(phone, global).await,
        Command::Logout => auth::logout(global),
        Command::Devices(args) => devices::handle(args, global).await,
        Command::Sync => sync_cmd::handle(global).await,
        Command::Watch { interval } => watch::handle(interval, global).await,
        Command::Notifications { limit } => notifications::handle(limit, global).await,
        // Handled in main before dispatch; no connection needed.
        Command::Completions(_) => Ok(()),
    }
}
