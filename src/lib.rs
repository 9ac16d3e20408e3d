//! # igp-tunnels - Intra-AS tunnel enumeration
//!
//! This library generates the IGP neighbour table and the WireGuard port
//! allocation for every router pair in an autonomous system, starting from
//! a declarative router inventory.
//!
//! ## Overview
//!
//! The tool is a one-shot generator: it reads the inventory and the
//! previously generated state, rebuilds the adjacency table from scratch,
//! extends the port allocation incrementally, and writes the merged result
//! back to a single YAML state file. Once a router pair has been assigned a
//! port, that number is never reused or renumbered, even if the pair later
//! stops being adjacent. Ports are pre-reserved for every pair so links
//! can be activated without renumbering anything.
//!
//! ## Architecture
//!
//! The library is organized into four modules:
//!
//! - `inventory`: Type-safe inventory structures, YAML parsing and validation
//! - `adjacency`: Neighbour derivation (mesh clique plus explicit upstream edges)
//! - `ports`: Symmetric, monotonic port allocation over router pairs
//! - `state`: The persisted state file and its load/save cycle
//!
//! ## Inventory Format
//!
//! Inventories use YAML format:
//!
//! ```yaml
//! routers:
//!   core1:
//!     shortname: c1
//!   core2:
//!     shortname: c2
//!   leaf1:
//!     shortname: l1
//!     igp_upstreams: [core1]
//!
//! meshrouters:
//!   - core1
//!   - core2
//! ```
//!
//! Every router must either belong to the `meshrouters` group or declare
//! `igp_upstreams`, exactly one of the two.
//!
//! ## Error Handling
//!
//! Domain failures are typed (`inventory::ConfigError`,
//! `state::PersistenceError`); the binary wraps them with `color_eyre` for
//! contextual reporting. All validation runs before the state file is
//! touched, so a failed run never leaves a partially updated file behind.

pub mod adjacency;
pub mod inventory;
pub mod ports;
pub mod state;
