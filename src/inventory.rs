//! Router inventory loading and validation.
//!
//! This module defines the inventory document that enumerates every router
//! in the AS together with the `meshrouters` group, and validates cross
//! references eagerly so later stages can assume a consistent router set.

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::Path;

/// Errors raised while validating the inventory or deriving adjacency
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Duplicate shortname {shortname}: {first}, {second}")]
    DuplicateShortname {
        shortname: String,
        first: String,
        second: String,
    },

    #[error("{router} must either define igp_upstreams or be part of meshrouters group (and not both)")]
    AdjacencyConstraint { router: String },

    #[error("{context} references unknown router {reference}")]
    UnknownRouter { context: String, reference: String },
}

/// A single router entry in the inventory.
#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    /// Globally unique short name, used in generated peer and interface names
    pub shortname: String,
    /// Routers this node tunnels to when it is not part of the mesh
    #[serde(default)]
    pub igp_upstreams: BTreeSet<String>,
}

/// Declarative inventory of every router in the AS.
#[derive(Debug, Deserialize)]
pub struct Inventory {
    /// All routers, keyed by identifier
    pub routers: BTreeMap<String, RouterConfig>,
    /// Identifiers of the routers that form the full mesh
    #[serde(default)]
    pub meshrouters: BTreeSet<String>,
}

impl Inventory {
    /// Check that every mesh entry and every upstream names a known router.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for id in &self.meshrouters {
            if !self.routers.contains_key(id) {
                return Err(ConfigError::UnknownRouter {
                    context: "meshrouters".to_string(),
                    reference: id.clone(),
                });
            }
        }
        for (id, router) in &self.routers {
            for upstream in &router.igp_upstreams {
                if !self.routers.contains_key(upstream) {
                    return Err(ConfigError::UnknownRouter {
                        context: format!("{}.igp_upstreams", id),
                        reference: upstream.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Whether a router belongs to the meshrouters group
    pub fn is_mesh_member(&self, id: &str) -> bool {
        self.meshrouters.contains(id)
    }
}

/// Load and validate the router inventory from a YAML file
pub fn load_inventory(path: &Path) -> Result<Inventory> {
    info!("Loading router inventory from: {:?}", path);

    let file = File::open(path)
        .wrap_err_with(|| format!("Failed to open inventory file '{}'", path.display()))?;

    let inventory: Inventory = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse inventory file '{}'", path.display()))?;

    inventory.validate()?;

    info!(
        "Loaded {} routers ({} in mesh)",
        inventory.routers.len(),
        inventory.meshrouters.len()
    );

    Ok(inventory)
}
