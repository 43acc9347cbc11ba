#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Streaming
//!
//! A voxel world that streams fixed-size cubic chunks around a moving
//! observer. Chunks are generated from layered Perlin noise, meshed with
//! hidden-face culling and evicted once they fall out of view range.
//!
//! ## Key Modules
//!
//! * `config` - World configuration, loadable from JSON
//! * `core` - Shared resource containers used between threads
//! * `engine_state` - The world, its chunks, terrain, camera and meshing
//! * `error` - Errors surfaced by world construction and ticking
//!
//! ## Architecture
//!
//! Two threads cooperate on one world:
//! * The owner ticks `World::update` once per frame. It admits queued chunks
//!   nearest-first, evicts distant ones and rebuilds stale meshes.
//! * A background updater thread reads a periodically published camera
//!   snapshot and proposes the chunk keys that should exist but do not.
//!
//! ## Usage
//!
//! ```rust,no_run
//! fn main() {
//!     if let Err(err) = voxel_streaming::run() {
//!         eprintln!("{err}");
//!     }
//! }
//! ```

use log::info;
use web_time::{Duration, Instant};

pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

pub use config::WorldConfig;
pub use engine_state::voxels::world::{World, WorldStats};
pub use engine_state::EngineState;
pub use error::WorldError;

/// Environment variable naming a JSON world configuration file.
pub const CONFIG_ENV_VAR: &str = "VOXEL_WORLD_CONFIG";

/// Number of ticks the headless driver runs for.
const DEMO_TICKS: u32 = 300;

/// Target duration of one tick.
const TICK: Duration = Duration::from_millis(16);

/// Ticks between two stats log lines.
const STATS_INTERVAL: u32 = 60;

/// Streams a world around a camera flying over it for a fixed number of
/// ticks, logging progress.
///
/// The configuration is read from the file named by `VOXEL_WORLD_CONFIG`,
/// or the defaults are used.
///
/// # Errors
/// Returns an error if the configuration cannot be loaded or the background
/// updater stops.
pub fn run() -> Result<(), WorldError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::default(),
    };

    let mut engine = EngineState::new(config)?;
    let mut last = Instant::now();
    for tick in 0..DEMO_TICKS {
        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32();
        last = now;

        engine.advance(dt)?;
        if tick % STATS_INTERVAL == 0 {
            engine.log_stats();
        }
        std::thread::sleep(TICK);
    }
    engine.log_stats();
    Ok(())
}
