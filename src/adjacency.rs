//! IGP adjacency derivation.
//!
//! This module rebuilds the full neighbour table from the inventory on
//! every run: mesh routers form a clique, leaf routers connect to their
//! declared upstreams, and every upstream edge is mirrored back so the
//! table stays symmetric.

use crate::inventory::{ConfigError, Inventory};
use log::info;
use std::collections::{BTreeMap, BTreeSet};

/// Mapping from router identifier to its set of IGP neighbours.
pub type AdjacencyTable = BTreeMap<String, BTreeSet<String>>;

/// Derive the complete adjacency table for the inventory.
///
/// The previous table is never consulted: adjacency is recomputed from
/// scratch so that removed links actually disappear. Every router must
/// either belong to the meshrouters group or declare `igp_upstreams`,
/// and never both: a mesh router reachable through the clique must not
/// also carry manual upstream edges.
///
/// A mesh router can still *receive* reverse edges from leaves that name
/// it as an upstream; those contributions are unioned into its clique
/// neighbours.
///
/// # Returns
/// A fresh table with one entry per router, or a `ConfigError` naming the
/// offending router(s).
pub fn derive(inventory: &Inventory) -> Result<AdjacencyTable, ConfigError> {
    // Shortnames end up in generated peer names, so duplicates are
    // rejected before any adjacency is built.
    let mut seen_shortnames: BTreeMap<&str, &str> = BTreeMap::new();
    for (id, router) in &inventory.routers {
        if let Some(first) = seen_shortnames.insert(&router.shortname, id) {
            return Err(ConfigError::DuplicateShortname {
                shortname: router.shortname.clone(),
                first: first.to_string(),
                second: id.clone(),
            });
        }
    }

    let mut table: AdjacencyTable = inventory
        .routers
        .keys()
        .map(|id| (id.clone(), BTreeSet::new()))
        .collect();

    for (id, router) in &inventory.routers {
        let in_mesh = inventory.is_mesh_member(id);
        let has_upstreams = !router.igp_upstreams.is_empty();

        // Strict either-or: mesh membership and upstream declarations are
        // mutually exclusive, and one of the two is required.
        if in_mesh == has_upstreams {
            return Err(ConfigError::AdjacencyConstraint { router: id.clone() });
        }

        if in_mesh {
            // Mesh routers peer with every other mesh router.
            let peers = inventory
                .meshrouters
                .iter()
                .filter(|peer| peer.as_str() != id)
                .cloned();
            table.entry(id.clone()).or_default().extend(peers);
        }

        for upstream in &router.igp_upstreams {
            table.entry(id.clone()).or_default().insert(upstream.clone());
            // Mirror the edge: the upstream may never list us itself.
            table.entry(upstream.clone()).or_default().insert(id.clone());
        }
    }

    info!("Derived IGP adjacency for {} routers", table.len());
    Ok(table)
}
