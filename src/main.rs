//! # Voxel Streaming Entry Point
//!
//! Runs the headless streaming demo from the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! VOXEL_WORLD_CONFIG=world.json RUST_LOG=debug cargo run --release
//! ```

use log::error;

fn main() {
    if let Err(err) = voxel_streaming::run() {
        error!("{err}");
        std::process::exit(1);
    }
}
