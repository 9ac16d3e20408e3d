//! Persisted tunnel state.
//!
//! The generator's only external artifact: the `next_port` counter, the
//! adjacency table, and the pair-keyed port table, written as a single
//! YAML document. The file is read once at startup and overwritten once
//! after derivation and allocation have both succeeded, so a failed run
//! leaves the previous state untouched.

use crate::adjacency::AdjacencyTable;
use crate::ports::PortTable;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Port the allocator starts from when no state file exists yet
pub const START_PORT: u16 = 55000;

/// Header line written at the top of the generated state file
const GENERATED_HEADER: &str = "# Generated by igp-tunnels, do not edit!\n";

/// Errors raised while reading or writing the persisted state file
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Failed to read state file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("State file '{path}' is malformed: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize state: {source}")]
    Serialize { source: serde_yaml::Error },

    #[error("Failed to write state file '{path}': {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// The tuple persisted between runs.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct TunnelState {
    /// Next unused port number, strictly greater than every allocated port
    pub next_port: u16,
    /// Per-router IGP neighbour sets, rebuilt wholesale each run
    pub igp_neighbours: AdjacencyTable,
    /// Pair-keyed WireGuard port allocations, extended incrementally
    pub igp_wg_ports: PortTable,
}

impl Default for TunnelState {
    fn default() -> Self {
        Self {
            next_port: START_PORT,
            igp_neighbours: AdjacencyTable::new(),
            igp_wg_ports: PortTable::new(),
        }
    }
}

impl TunnelState {
    /// Render the state as the YAML document written to disk.
    pub fn to_yaml(&self) -> Result<String, PersistenceError> {
        let body = serde_yaml::to_string(self)
            .map_err(|source| PersistenceError::Serialize { source })?;
        Ok(format!("{}{}", GENERATED_HEADER, body))
    }

    /// Write the state file, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        let rendered = self.to_yaml()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| PersistenceError::Write {
                    path: path.display().to_string(),
                    source,
                })?;
            }
        }

        fs::write(path, rendered).map_err(|source| PersistenceError::Write {
            path: path.display().to_string(),
            source,
        })?;

        info!("Wrote state file {:?}", path);
        Ok(())
    }
}

/// Load the previously generated state, or the default template when the
/// file does not exist yet.
///
/// A file that exists but cannot be read or parsed is an error. It is
/// never silently replaced with defaults, since that would reallocate
/// every port from scratch.
pub fn load(path: &Path) -> Result<TunnelState, PersistenceError> {
    if !path.exists() {
        info!(
            "No previous state at {:?}, starting from port {}",
            path, START_PORT
        );
        return Ok(TunnelState::default());
    }

    let content = fs::read_to_string(path).map_err(|source| PersistenceError::Read {
        path: path.display().to_string(),
        source,
    })?;

    serde_yaml::from_str(&content).map_err(|source| PersistenceError::Parse {
        path: path.display().to_string(),
        source,
    })
}
