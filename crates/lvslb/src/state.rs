//! Local state file: the tracked identity plus the last applied record.
//!
//! JSON on disk, `{ "id": ..., "applied": ... }`. A missing file reads as
//! empty state.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use lvslb_core::{TrackedState, VirtualServer};

use crate::error::CliError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(flatten)]
    pub tracked: TrackedState,
    #[serde(default)]
    pub applied: Option<VirtualServer>,
}

impl StateFile {
    /// Drop `applied` once tracking is gone so the pair stays consistent.
    pub fn settle(&mut self) {
        if !self.tracked.is_tracked() {
            self.applied = None;
        }
    }
}

/// `<FILE>.state.json` next to the definition, unless overridden.
pub fn state_path(definition: Option<&Path>, explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    definition.map(|file| {
        let mut name = file.as_os_str().to_owned();
        name.push(".state.json");
        PathBuf::from(name)
    })
}

pub fn load(path: &Path) -> Result<StateFile, CliError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StateFile::default()),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&raw).map_err(|e| CliError::Definition {
        path: path.display().to_string(),
        reason: format!("corrupt state file: {e}"),
    })
}

pub fn save(path: &Path, state: &StateFile) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state).map_err(std::io::Error::other)?;
    std::fs::write(path, json + "\n")?;
    Ok(())
}
