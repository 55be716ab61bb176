//! Command dispatch: bridges CLI args -> reconciler lifecycle -> output.

pub mod apply;
pub mod config_cmd;
pub mod destroy;
pub mod plan;
pub mod show;
pub mod util;
pub mod validate;

use tokio_util::sync::CancellationToken;

use lvslb_core::Endpoint;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command that needs an endpoint to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    endpoint: &Endpoint,
    global: &GlobalOpts,
    cancel: CancellationToken,
) -> Result<(), CliError> {
    match cmd {
        Command::Apply(args) => apply::handle(endpoint, args, global, cancel).await,
        Command::Show(args) => show::handle(endpoint, args, global, cancel).await,
        Command::Destroy(args) => destroy::handle(endpoint, args, global, cancel).await,
        // Handled before an endpoint is resolved
        Command::Plan(_) | Command::Validate(_) | Command::Config(_) | Command::Completions(_) => {
            unreachable!("offline commands are dispatched in main")
        }
    }
}
