//! ev-route — plan a range-constrained EV trip over a CSV road network.
//!
//! ```text
//! ev-route --nodes data/nodes.csv --edges data/edges.csv \
//!          --from 1 --to 6 --range 20 --charge-hours 0.5
//! ```
//!
//! `--from` / `--to` accept either a node id or a `lat,lon` pair, which is
//! snapped to the nearest road node.  Set `RUST_LOG=debug` to see search and
//! loading diagnostics on stderr.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ev_core::{GeoPoint, NodeKey};
use ev_planner::{ChargingAdvice, PlannerConfig, RouteRequest, RoutePlanner, TripPlan};
use ev_spatial::{LoadOptions, RoadNetwork, load_network_csv};


/// Snaps further than this from the requested coordinate are logged as a
/// warning.
const SNAP_WARN_M: f64 = 500.0;

#[derive(Parser, Debug)]
#[command(version, about = "Shortest EV route with range feasibility and charging advice")]
struct Args {
    /// Node CSV: id,lat,lon[,charging_station]
    #[arg(long)]
    nodes: PathBuf,

    /// Edge CSV: from,to,length[,oneway][,max_speed]
    #[arg(long)]
    edges: PathBuf,

    /// Start node id, or "lat,lon"
    #[arg(long)]
    from: String,

    /// End node id, or "lat,lon"
    #[arg(long)]
    to: String,

    /// Range available at departure
    #[arg(long)]
    range: f64,

    /// Hours spent charging before departure
    #[arg(long, default_value_t = 0.0)]
    charge_hours: f64,

    /// Multiplier applied to every edge length in the CSV
    #[arg(long, default_value_t = 1.0)]
    length_scale: f64,

    /// Planner configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the plan as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PlannerConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PlannerConfig::default(),
    };
    let planner = RoutePlanner::new(config).context("invalid planner configuration")?;

    let options = LoadOptions { length_scale: args.length_scale };
    let network = load_network_csv(&args.nodes, &args.edges, &options).with_context(|| {
        format!("loading network from {} and {}", args.nodes.display(), args.edges.display())
    })?;
    info!(
        nodes = network.node_count(),
        edges = network.edge_count(),
        stations = network.station_count(),
        "network loaded"
    );

    let start = resolve_endpoint(&network, &args.from).context("--from")?;
    let end = resolve_endpoint(&network, &args.to).context("--to")?;

    let request = RouteRequest::new(start, end, args.range, args.charge_hours);
    let plan = planner
        .plan_trip(&network, &request)
        .with_context(|| format!("planning {start} -> {end}"))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_summary(&plan);
    }
    Ok(())
}

/// A node id, or a `lat,lon` pair snapped to the nearest node.
///
/// Anything containing a comma is read as a coordinate; everything else,
/// negative ids included, as a node key.
fn resolve_endpoint(network: &RoadNetwork, raw: &str) -> Result<NodeKey> {
    if !raw.contains(',') {
        return NodeKey::from_str(raw).with_context(|| format!("invalid node id {raw:?}"));
    }

    let pos = GeoPoint::from_str(raw).map_err(|e| anyhow!(e))?;
    let node = network
        .snap_to_node(pos)
        .ok_or_else(|| anyhow!("cannot snap {pos}: network is empty"))?;
    let key = network.key_of(node);
    let offset_m = pos.distance_m(network.position(node));
    if offset_m > SNAP_WARN_M {
        warn!(%pos, node = %key, offset_m, "coordinate is far from the nearest road node");
    } else {
        info!(%pos, node = %key, offset_m, "snapped coordinate to node");
    }
    Ok(key)
}

fn print_summary(plan: &TripPlan) {
    let route = &plan.route;
    let path: Vec<String> = route.path.iter().map(ToString::to_string).collect();

    println!("Route:           {}", path.join(" -> "));
    println!("Distance:        {:.3}", route.total_distance);
    println!("Effective range: {:.3}", route.effective_range);
    if let Some(hours) = route.drive_time_hours {
        println!("Drive time:      {hours:.2} h");
    }

    if route.feasible {
        println!("Feasible:        yes");
        return;
    }
    println!("Feasible:        no (short by {:.3})", route.shortfall());

    match &plan.charging {
        Some(ChargingAdvice::Nearest(adv)) => println!(
            "Nearest charger: node {} at {} ({:.3} from node {})",
            adv.station, adv.position, adv.distance, adv.reference
        ),
        Some(ChargingAdvice::Unavailable { reason, .. }) => {
            println!("Nearest charger: none ({reason})");
        }
        None => {}
    }
}
