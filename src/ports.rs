//! WireGuard port allocation for router pairs.
//!
//! Every unordered pair of routers gets a port, whether or not the pair is
//! currently adjacent. This pre-reserves ports for links that may become
//! active later, so nothing is ever renumbered when the inventory changes.

use log::{debug, info};
use std::collections::BTreeMap;

/// Mapping from `"id1,id2"` pair keys to allocated port numbers.
///
/// Both orderings of every allocated pair are present and carry the same
/// value, so consumers can look up a link from either endpoint's view.
pub type PortTable = BTreeMap<String, u16>;

/// Join a router pair into the string key used in the persisted table.
pub fn pair_key(a: &str, b: &str) -> String {
    format!("{},{}", a, b)
}

/// Look up the port for a pair under either key ordering.
///
/// Checking both orderings keeps lookups working against a table that has
/// lost one of its two redundant keys (manual edits, truncated writes).
pub fn lookup(table: &PortTable, a: &str, b: &str) -> Option<u16> {
    table
        .get(&pair_key(a, b))
        .or_else(|| table.get(&pair_key(b, a)))
        .copied()
}

/// Allocate ports for every unordered pair of distinct routers.
///
/// Pairs already present in `prior` keep their port; a pair recorded under
/// only one key ordering is healed by copying the surviving value to the
/// other ordering. New pairs take consecutive numbers starting from
/// `next_port`, one per pair.
///
/// # Arguments
/// * `routers` - The full router identifier set, not just adjacent pairs
/// * `prior` - The previously persisted port table
/// * `next_port` - The first port number free for new allocations
///
/// # Returns
/// The merged port table and the next unused port number.
pub fn allocate(routers: &[String], prior: &PortTable, next_port: u16) -> (PortTable, u16) {
    let mut table = prior.clone();
    let mut next_port = next_port;

    for (i, a) in routers.iter().enumerate() {
        for b in &routers[i + 1..] {
            match lookup(&table, a, b) {
                Some(port) => {
                    debug!("Using existing port {} for IGP link {},{}", port, a, b);
                    table.insert(pair_key(a, b), port);
                    table.insert(pair_key(b, a), port);
                }
                None => {
                    info!("Adding port {} for IGP link {},{}", next_port, a, b);
                    table.insert(pair_key(a, b), next_port);
                    table.insert(pair_key(b, a), next_port);
                    next_port += 1;
                }
            }
        }
    }

    (table, next_port)
}
