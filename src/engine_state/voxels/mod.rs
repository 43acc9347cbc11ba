//! # Voxel World
//!
//! This module contains the streamed voxel world and everything it is built
//! from.
//!
//! ## Architecture
//!
//! * **Block**: Voxel types, the voxel itself and its six face directions
//! * **Chunk**: Fixed-size voxel grids, the arena recycling them and the spatial index locating them
//! * **Terrain**: Deterministic layered-noise height maps
//! * **World**: Admission, eviction and world-space queries over live chunks
//! * **Tasks**: The background updater proposing chunks around the camera
//!
//! ## Data Flow
//!
//! 1. The world publishes a camera snapshot every few ticks
//! 2. The updater turns it into missing chunk keys and merges them into the backlog
//! 3. The world admits the nearest keys, generating terrain into recycled chunks
//! 4. Dirty chunks get their hidden faces and meshes rebuilt
//! 5. Chunks beyond view distance are periodically evicted back into the arena

pub mod block;
pub mod chunk;
pub mod tasks;
pub mod terrain;
pub mod world;
