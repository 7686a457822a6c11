//! Bhumi mapper daemon.
//!
//! Replays a recorded pose and scan stream into the mapping pipeline and
//! exports the final occupancy grid.
//!
//! ## Threads
//!
//! - **Replay thread**: Delivers poses and scans at their recorded times
//! - **Mapping thread**: Waits out the stability window, integrates accepted scans
//! - **Publisher thread** (~1Hz): Hands changed cells to the sink, clears the delta grid

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bhumi_grid::MapLayers;
use bhumi_mapper::{
    LogSink, MapSource, MapperError, NodeConfig, Result, Scenario, SharedState, StaticMapSource,
    spawn_replay, spawn_threads,
};
use clap::Parser;
use crossbeam_channel::bounded;
use parking_lot::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Scans buffered between the transport and the mapping thread.
const SCAN_CHANNEL_CAPACITY: usize = 16;

/// Default node configuration file, used when present.
const DEFAULT_CONFIG: &str = "bhumi.toml";

#[derive(Parser, Debug)]
#[command(name = "bhumi-mapper", version, about = "Incremental occupancy grid mapper")]
struct Args {
    /// Node configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scenario to replay (YAML)
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Override the grid downsampling scale
    #[arg(long)]
    scale: Option<u32>,

    /// Override the exported map base path
    #[arg(short, long)]
    output: Option<String>,

    /// Replay speed multiplier
    #[arg(long, default_value_t = 1.0)]
    rate: f64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bhumi_mapper=info,bhumi_grid=info")),
        )
        .init();

    if let Err(e) = run(Args::parse()) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(scale) = args.scale {
        info!("Using scale override: {}", scale);
        config.mapper.grid.scale = scale;
    }
    if let Some(output) = args.output {
        config.output.map_path = output;
    }
    config.validate()?;

    info!("Bhumi mapper v{}", env!("CARGO_PKG_VERSION"));

    let scenario_path = args
        .scenario
        .or_else(|| config.replay.scenario.clone())
        .ok_or_else(|| MapperError::Config("no scenario given (--scenario)".into()))?;
    info!("Loading scenario from {:?}", scenario_path);
    let scenario = Scenario::load(&scenario_path)?;
    info!(
        "Scenario '{}': {} poses, {} scans over {:.1}s",
        scenario.name,
        scenario.poses.len(),
        scenario.scans.len(),
        scenario.duration()
    );

    // The served map is required before anything else can start
    let info = StaticMapSource::new(scenario.map.clone()).map_info()?;
    let geometry = config.mapper.grid.to_geometry(&info);
    info!(
        "Grid: {}x{} cells of {:.3}m (scale {})",
        geometry.width(),
        geometry.height(),
        geometry.cell_size(),
        geometry.scale()
    );

    let shared_state = Arc::new(SharedState::new());
    let shared_map = Arc::new(Mutex::new(MapLayers::new(geometry)));
    let (scan_tx, scan_rx) = bounded(SCAN_CHANNEL_CAPACITY);

    let handles = spawn_threads(
        &config.mapper,
        config.publish.period(),
        Arc::clone(&shared_state),
        Arc::clone(&shared_map),
        scan_rx,
        LogSink::from_output(&config.output),
    )?;
    let replay = spawn_replay(&scenario, args.rate, Arc::clone(&shared_state), scan_tx)?;

    // Replay ends, then the mapping thread drains the gate
    if let Err(e) = replay.join() {
        error!("Replay thread panicked: {:?}", e);
    }
    if let Err(e) = handles.mapping.join() {
        error!("Mapping thread panicked: {:?}", e);
    }

    // Publisher does a final publish and exports the map
    shared_state.signal_shutdown();
    if let Err(e) = handles.publisher.join() {
        error!("Publisher thread panicked: {:?}", e);
    }

    let counters = shared_state.counters();
    let counts = shared_map.lock().grid.count_by_state();
    info!(
        "Scans: {} received, {} accepted, {} rejected, {} superseded, {} changed the map",
        counters.scans_received,
        counters.scans_accepted,
        counters.scans_rejected,
        counters.scans_superseded,
        counters.scans_changed
    );
    info!(
        "Map statistics: {:.1}% explored, {} free cells, {} occupied cells",
        counts.explored_fraction() * 100.0,
        counts.free,
        counts.occupied
    );

    info!("Bhumi mapper finished");
    Ok(())
}

/// Explicit `--config`, else `bhumi.toml` if present, else defaults.
fn load_config(path: Option<&Path>) -> Result<NodeConfig> {
    match path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            NodeConfig::load(path)
        }
        None if Path::new(DEFAULT_CONFIG).exists() => {
            info!("Loading configuration from {}", DEFAULT_CONFIG);
            NodeConfig::load(Path::new(DEFAULT_CONFIG))
        }
        None => {
            info!("Using default configuration");
            Ok(NodeConfig::default())
        }
    }
}
