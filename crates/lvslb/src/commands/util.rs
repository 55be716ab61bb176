//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use lvslb_core::VirtualServer;

use crate::cli::StateArgs;
use crate::error::CliError;
use crate::state;

/// Read a virtual-server definition. `.json` is JSON, anything else TOML.
pub fn load_definition(path: &Path) -> Result<VirtualServer, CliError> {
    let contents = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let parsed = if is_json {
        serde_json::from_str(&contents).map_err(|e| e.to_string())
    } else {
        toml::from_str(&contents).map_err(|e| e.to_string())
    };
    parsed.map_err(|reason| CliError::Definition {
        path: path.display().to_string(),
        reason,
    })
}

/// Resolve the state file for a command, or explain why there is none.
pub fn state_file(definition: Option<&Path>, args: &StateArgs) -> Result<PathBuf, CliError> {
    state::state_path(definition, args.state.as_deref()).ok_or_else(|| CliError::Validation {
        field: "state".into(),
        reason: "pass a definition FILE or --state".into(),
    })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so `--yes` becomes mandatory.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}
