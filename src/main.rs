use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use igp_tunnels::{adjacency, inventory, ports, state};

/// Enumerates intra-AS IGP tunnel adjacencies and WireGuard port allocations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the router inventory YAML file
    #[arg(long, default_value = "hosts.yml")]
    hosts: PathBuf,

    /// Path to the generated tunnel state YAML file
    #[arg(short, long, default_value = "global-config/igp-tunnels.yml")]
    output: PathBuf,

    /// Run the full pipeline but print the result instead of writing it
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Starting IGP tunnel enumeration");
    info!("Inventory file: {:?}", args.hosts);
    info!("State file: {:?}", args.output);

    let inventory = inventory::load_inventory(&args.hosts)?;
    let mut data = state::load(&args.output).wrap_err_with(|| {
        format!(
            "Failed to load previous state from '{}'",
            args.output.display()
        )
    })?;

    // Adjacency is rebuilt wholesale; stale neighbours must not survive.
    data.igp_neighbours = adjacency::derive(&inventory)?;

    let router_ids: Vec<String> = inventory.routers.keys().cloned().collect();
    let (igp_wg_ports, next_port) =
        ports::allocate(&router_ids, &data.igp_wg_ports, data.next_port);
    let newly_allocated = next_port - data.next_port;
    data.igp_wg_ports = igp_wg_ports;
    data.next_port = next_port;

    if args.dry_run {
        info!("Dry run, not writing {:?}", args.output);
        print!("{}", data.to_yaml()?);
    } else {
        data.save(&args.output)?;
    }

    info!(
        "Allocated {} new ports across {} IGP links",
        newly_allocated,
        data.igp_wg_ports.len() / 2
    );
    info!("Tunnel enumeration completed successfully");
    Ok(())
}
