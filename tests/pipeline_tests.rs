#[cfg(test)]
mod pipeline_tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use igp_tunnels::inventory::load_inventory;
    use igp_tunnels::ports::lookup;
    use igp_tunnels::state::TunnelState;
    use igp_tunnels::{adjacency, ports, state};

    /// Run the same load → derive → allocate → save cycle the binary runs.
    fn run(hosts: &Path, state_path: &Path) -> color_eyre::Result<TunnelState> {
        let inventory = load_inventory(hosts)?;
        let mut data = state::load(state_path)?;

        data.igp_neighbours = adjacency::derive(&inventory)?;

        let router_ids: Vec<String> = inventory.routers.keys().cloned().collect();
        let (igp_wg_ports, next_port) =
            ports::allocate(&router_ids, &data.igp_wg_ports, data.next_port);
        data.igp_wg_ports = igp_wg_ports;
        data.next_port = next_port;

        data.save(state_path)?;
        Ok(data)
    }

    const MESH_XYZ: &str = r#"
routers:
  x: { shortname: x }
  y: { shortname: y }
  z: { shortname: z }
meshrouters: [x, y, z]
"#;

    const MESH_XYZ_PLUS_LEAF_W: &str = r#"
routers:
  x: { shortname: x }
  y: { shortname: y }
  z: { shortname: z }
  w:
    shortname: w
    igp_upstreams: [x]
meshrouters: [x, y, z]
"#;

    fn write_inventory(dir: &TempDir, yaml: &str) -> std::path::PathBuf {
        let path = dir.path().join("hosts.yml");
        fs::write(&path, yaml).unwrap();
        path
    }

    /// Fresh three-router mesh: clique adjacency, ports from 55000.
    #[test]
    fn test_fresh_mesh_run() {
        let dir = TempDir::new().unwrap();
        let hosts = write_inventory(&dir, MESH_XYZ);
        let state_path = dir.path().join("igp-tunnels.yml");

        let data = run(&hosts, &state_path).unwrap();

        for (a, neighbours) in [("x", ["y", "z"]), ("y", ["x", "z"]), ("z", ["x", "y"])] {
            let expected: std::collections::BTreeSet<String> =
                neighbours.iter().map(|s| s.to_string()).collect();
            assert_eq!(data.igp_neighbours[a], expected);
        }

        // Three pairs under both key orderings, numbered from 55000.
        assert_eq!(data.igp_wg_ports.len(), 6);
        let mut ports: Vec<u16> = [("x", "y"), ("x", "z"), ("y", "z")]
            .iter()
            .map(|(a, b)| lookup(&data.igp_wg_ports, a, b).unwrap())
            .collect();
        ports.sort();
        assert_eq!(ports, vec![55000, 55001, 55002]);
        assert_eq!(data.next_port, 55003);
    }

    /// A second run over unchanged inputs must reproduce the file byte for byte.
    #[test]
    fn test_idempotent_rerun() {
        let dir = TempDir::new().unwrap();
        let hosts = write_inventory(&dir, MESH_XYZ);
        let state_path = dir.path().join("igp-tunnels.yml");

        run(&hosts, &state_path).unwrap();
        let first = fs::read(&state_path).unwrap();

        run(&hosts, &state_path).unwrap();
        let second = fs::read(&state_path).unwrap();

        assert_eq!(first, second);
    }

    /// Adding a leaf extends the tables without renumbering existing links.
    #[test]
    fn test_incremental_leaf_addition() {
        let dir = TempDir::new().unwrap();
        let state_path = dir.path().join("igp-tunnels.yml");

        let hosts = write_inventory(&dir, MESH_XYZ);
        let before = run(&hosts, &state_path).unwrap();

        let hosts = write_inventory(&dir, MESH_XYZ_PLUS_LEAF_W);
        let after = run(&hosts, &state_path).unwrap();

        // Adjacency gains the leaf on both sides.
        let w_neighbours: std::collections::BTreeSet<String> =
            ["x".to_string()].into_iter().collect();
        assert_eq!(after.igp_neighbours["w"], w_neighbours);
        assert!(after.igp_neighbours["x"].contains("w"));
        assert!(!after.igp_neighbours["y"].contains("w"));

        // Every prior port survives unchanged.
        for (key, port) in &before.igp_wg_ports {
            assert_eq!(after.igp_wg_ports[key], *port);
        }

        // The leaf is paired with every router, using the next free numbers.
        for peer in ["x", "y", "z"] {
            let port = lookup(&after.igp_wg_ports, "w", peer).unwrap();
            assert!(port >= before.next_port && port < after.next_port);
        }
        assert_eq!(after.next_port, before.next_port + 3);
    }

    /// Symmetry and monotonicity of the persisted port table.
    #[test]
    fn test_port_table_invariants() {
        let dir = TempDir::new().unwrap();
        let hosts = write_inventory(&dir, MESH_XYZ_PLUS_LEAF_W);
        let state_path = dir.path().join("igp-tunnels.yml");

        let data = run(&hosts, &state_path).unwrap();

        for (key, port) in &data.igp_wg_ports {
            let (a, b) = key.split_once(',').unwrap();
            let reverse = format!("{},{}", b, a);
            assert_eq!(data.igp_wg_ports[&reverse], *port);
            assert!(data.next_port > *port);
        }
    }

    /// A duplicate shortname aborts the run and leaves the state file alone.
    #[test]
    fn test_duplicate_shortname_leaves_state_untouched() {
        let dir = TempDir::new().unwrap();
        let state_path = dir.path().join("igp-tunnels.yml");

        let hosts = write_inventory(&dir, MESH_XYZ);
        run(&hosts, &state_path).unwrap();
        let before = fs::read(&state_path).unwrap();

        let hosts = write_inventory(
            &dir,
            r#"
routers:
  x: { shortname: abc }
  y: { shortname: abc }
  z: { shortname: z }
meshrouters: [x, y, z]
"#,
        );
        let result = run(&hosts, &state_path);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Duplicate shortname abc"));

        let after = fs::read(&state_path).unwrap();
        assert_eq!(before, after);
    }

    /// The state file is loaded, never defaulted, when it already exists.
    #[test]
    fn test_corrupt_state_file_aborts() {
        let dir = TempDir::new().unwrap();
        let hosts = write_inventory(&dir, MESH_XYZ);
        let state_path = dir.path().join("igp-tunnels.yml");

        fs::write(&state_path, "igp_wg_ports: definitely not a mapping\n").unwrap();

        assert!(run(&hosts, &state_path).is_err());
    }

    /// Ports persist for pairs that stop being adjacent.
    #[test]
    fn test_ports_survive_adjacency_removal() {
        let dir = TempDir::new().unwrap();
        let state_path = dir.path().join("igp-tunnels.yml");

        let hosts = write_inventory(&dir, MESH_XYZ_PLUS_LEAF_W);
        let before = run(&hosts, &state_path).unwrap();
        let w_x = lookup(&before.igp_wg_ports, "w", "x").unwrap();

        // w moves its upstream from x to y; the w,x port must not change.
        let hosts = write_inventory(
            &dir,
            r#"
routers:
  x: { shortname: x }
  y: { shortname: y }
  z: { shortname: z }
  w:
    shortname: w
    igp_upstreams: [y]
meshrouters: [x, y, z]
"#,
        );
        let after = run(&hosts, &state_path).unwrap();

        assert!(!after.igp_neighbours["x"].contains("w"));
        assert!(after.igp_neighbours["y"].contains("w"));
        assert_eq!(lookup(&after.igp_wg_ports, "w", "x"), Some(w_x));
        assert_eq!(after.next_port, before.next_port);
    }
}
