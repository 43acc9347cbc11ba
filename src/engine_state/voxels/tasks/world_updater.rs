//! # World Updater Task
//!
//! This module defines the `WorldUpdater`, the producer half of chunk
//! streaming. Each pass it:
//! 1. copies the latest camera snapshot out of the world state
//! 2. computes, without holding the lock, every chunk key inside the world
//!    that is within view distance and touches the frustum
//! 3. locks again and merges the keys the world does not know yet into the
//!    creation backlog
//!
//! The updater never creates, touches or evicts chunks. It runs on its own
//! thread for as long as the world exists; `WorldUpdaterHandle` lets the world
//! notice if that thread dies.

use std::thread::JoinHandle;

use log::{debug, error, info};
use web_time::Duration;

use crate::config::WorldConfig;
use crate::core::MtResource;
use crate::engine_state::camera_state::CameraSnapshot;
use crate::engine_state::rendering::ChunkMesh;
use crate::engine_state::voxels::chunk::chunk_index::{snap_to_chunk_origin, ChunkKey};
use crate::engine_state::voxels::world::WorldState;
use crate::error::WorldError;

/// Name of the background updater thread.
pub const UPDATER_THREAD_NAME: &str = "WorldUpdater";

/// Proposes missing chunk keys to a world.
pub struct WorldUpdater<M: ChunkMesh> {
    /// Shared with the world that owns this updater
    state: MtResource<WorldState<M>>,
    /// Copy of the world's configuration, for chunk size and extent
    config: WorldConfig,
    /// Keys found missing in the current pass
    pending: Vec<ChunkKey>,
}

impl<M: ChunkMesh> WorldUpdater<M> {
    /// Creates a new updater for the world owning `state`.
    pub fn new(state: MtResource<WorldState<M>>, config: &WorldConfig) -> Self {
        WorldUpdater {
            state,
            config: config.clone(),
            pending: Vec::new(),
        }
    }

    /// Runs one pass.
    ///
    /// # Returns
    /// The number of keys added to the world's backlog. Zero if no snapshot
    /// has been published yet.
    pub fn step(&mut self) -> usize {
        let Some(snapshot) = self.state.lock().snapshot() else {
            return 0;
        };

        self.pending.clear();
        let pending = &mut self.pending;
        for_each_desired_chunk(&snapshot, &self.config, |key| pending.push(key));
        if self.pending.is_empty() {
            return 0;
        }

        self.state.lock().merge_proposals(self.pending.drain(..))
    }

    /// Loops `step` until the world is dropped.
    ///
    /// # Arguments
    /// * `interval` - Pause between passes
    pub fn run(mut self, interval: Duration) {
        info!("World updater started");
        while self.state.handle_count() > 1 {
            let added = self.step();
            if added > 0 {
                debug!("World updater proposed {added} chunks");
            }
            std::thread::sleep(interval);
        }
        info!("World updater stopped: world dropped");
    }
}

/// Calls `visit` with the key of every chunk inside the world extent that
/// `snapshot` wants to exist.
pub fn for_each_desired_chunk(
    snapshot: &CameraSnapshot,
    config: &WorldConfig,
    mut visit: impl FnMut(ChunkKey),
) {
    let size = config.chunk_size;
    let radius = snapshot.max_view_distance;
    let position = snapshot.position;

    for y in axis_range(position.y, radius, config.height, size) {
        for x in axis_range(position.x, radius, config.width, size) {
            for z in axis_range(position.z, radius, config.depth, size) {
                let key = ChunkKey::new(x, y, z);
                if config.contains_chunk(&key) && snapshot.wants_chunk(&key, size) {
                    visit(key);
                }
            }
        }
    }
}

/// Chunk origins along one axis whose chunks may lie within `radius` of
/// `center`, clipped to `0..extent`.
fn axis_range(center: f32, radius: f32, extent: i32, chunk_size: i32) -> impl Iterator<Item = i32> {
    let low = snap_to_chunk_origin(center - radius, chunk_size).max(0);
    let high = snap_to_chunk_origin(center + radius, chunk_size).min(extent - 1);
    (low..=high).step_by(chunk_size as usize)
}

/// The running updater thread.
pub struct WorldUpdaterHandle {
    thread: Option<JoinHandle<()>>,
}

impl WorldUpdaterHandle {
    /// Starts `updater` on a new named thread.
    ///
    /// # Errors
    /// Returns `WorldError::UpdaterSpawn` if the thread could not be created.
    pub fn spawn<M: ChunkMesh>(updater: WorldUpdater<M>, interval: Duration) -> Result<Self, WorldError> {
        let thread = std::thread::Builder::new()
            .name(UPDATER_THREAD_NAME.to_string())
            .spawn(move || updater.run(interval))
            .map_err(WorldError::UpdaterSpawn)?;
        Ok(WorldUpdaterHandle {
            thread: Some(thread),
        })
    }

    /// Wraps an already running thread.
    #[cfg(test)]
    pub(crate) fn from_thread(thread: JoinHandle<()>) -> Self {
        WorldUpdaterHandle {
            thread: Some(thread),
        }
    }

    /// Whether the thread is still running.
    pub fn is_alive(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    /// Reports whether streaming can still make progress.
    ///
    /// The first call after the thread ended joins it and logs how it ended.
    ///
    /// # Errors
    /// Returns `WorldError::UpdaterStalled` once the thread has ended.
    pub fn check(&mut self) -> Result<(), WorldError> {
        if self.is_alive() {
            return Ok(());
        }
        if let Some(thread) = self.thread.take() {
            match thread.join() {
                Ok(()) => error!("World updater exited while the world is still alive"),
                Err(payload) => {
                    let message = payload
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    error!("World updater panicked: {message}");
                }
            }
        }
        Err(WorldError::UpdaterStalled)
    }
}
