//! # Chunk Index Module
//!
//! The spatial index maps a chunk's quantized origin to the arena slot holding
//! the live chunk, and keeps a separate insertion-ordered list of the same
//! entries for full-world iteration.
//!
//! ## Keys
//!
//! A `ChunkKey` is the literal triple of quantized origin coordinates. Two
//! distinct chunks can never share a key, so a lookup can never land on an
//! unrelated chunk.
//!
//! ## Consistency
//!
//! The map and the ordered list are only mutated together, through
//! `insert` and `sweep`, so they always hold the same set of entries.

use std::collections::HashMap;

use cgmath::{Point3, Vector3};

/// Snaps a world coordinate to the origin of the chunk containing it.
///
/// Uses floor division, so negative coordinates snap downward
/// (`-1.0` with chunk size 16 snaps to `-16`).
pub fn snap_to_chunk_origin(value: f32, chunk_size: i32) -> i32 {
    snap_int_to_chunk_origin(value.floor() as i32, chunk_size)
}

/// Integer form of `snap_to_chunk_origin`.
pub fn snap_int_to_chunk_origin(value: i32, chunk_size: i32) -> i32 {
    value.div_euclid(chunk_size) * chunk_size
}

/// Snaps a world coordinate to the center of the chunk containing it.
pub fn snap_to_chunk_center(value: f32, chunk_size: i32) -> f32 {
    snap_to_chunk_origin(value, chunk_size) as f32 + chunk_size as f32 / 2.0
}

/// Identity of a chunk: the world-space origin of its grid.
///
/// Every component is a multiple of the chunk size.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey {
    /// Origin X, in voxels.
    pub x: i32,
    /// Origin Y, in voxels.
    pub y: i32,
    /// Origin Z, in voxels.
    pub z: i32,
}

impl ChunkKey {
    /// Creates a key from already-quantized origin coordinates.
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        ChunkKey { x, y, z }
    }

    /// Key of the chunk containing the given world point.
    pub fn containing(x: f32, y: f32, z: f32, chunk_size: i32) -> Self {
        ChunkKey {
            x: snap_to_chunk_origin(x, chunk_size),
            y: snap_to_chunk_origin(y, chunk_size),
            z: snap_to_chunk_origin(z, chunk_size),
        }
    }

    /// Key of the chunk containing the given integer voxel position.
    pub fn containing_voxel(x: i32, y: i32, z: i32, chunk_size: i32) -> Self {
        ChunkKey {
            x: snap_int_to_chunk_origin(x, chunk_size),
            y: snap_int_to_chunk_origin(y, chunk_size),
            z: snap_int_to_chunk_origin(z, chunk_size),
        }
    }

    /// World-space origin of the chunk.
    pub fn origin(&self) -> Point3<i32> {
        Point3::new(self.x, self.y, self.z)
    }

    /// World-space center of the chunk.
    pub fn center(&self, chunk_size: i32) -> Point3<f32> {
        let half = chunk_size as f32 / 2.0;
        Point3::new(
            self.x as f32 + half,
            self.y as f32 + half,
            self.z as f32 + half,
        )
    }

    /// Squared distance from the chunk center to a point.
    pub fn center_distance2(&self, chunk_size: i32, point: Point3<f32>) -> f32 {
        let center = self.center(chunk_size);
        let d = Vector3::new(center.x - point.x, center.y - point.y, center.z - point.z);
        d.x * d.x + d.y * d.y + d.z * d.z
    }
}

/// Spatial index over live chunks.
///
/// Values are arena slot ids. The index never owns chunks itself.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    /// Key to slot lookup, for existence checks and point queries.
    by_key: HashMap<ChunkKey, usize>,
    /// The same entries in insertion order, for iteration.
    ordered: Vec<(ChunkKey, usize)>,
}

impl SpatialIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        SpatialIndex::default()
    }

    /// Adds a chunk to both the map and the ordered list.
    ///
    /// # Panics
    /// Panics if the key is already indexed. Admitting the same coordinate
    /// twice is a bug in backlog bookkeeping.
    pub fn insert(&mut self, key: ChunkKey, slot: usize) {
        let previous = self.by_key.insert(key, slot);
        assert!(
            previous.is_none(),
            "chunk {key:?} indexed twice (slots {previous:?} and {slot})"
        );
        self.ordered.push((key, slot));
    }

    /// Whether a chunk with this key is live.
    pub fn contains(&self, key: &ChunkKey) -> bool {
        self.by_key.contains_key(key)
    }

    /// Slot of the chunk with this key.
    pub fn get(&self, key: &ChunkKey) -> Option<usize> {
        self.by_key.get(key).copied()
    }

    /// Removes every entry for which `evict` returns true, in one pass over
    /// the ordered list. Each entry is visited exactly once, even while
    /// earlier entries are being removed.
    ///
    /// # Returns
    /// The removed entries, in the order they were visited.
    pub fn sweep(&mut self, mut evict: impl FnMut(ChunkKey, usize) -> bool) -> Vec<(ChunkKey, usize)> {
        let mut removed = Vec::new();
        let by_key = &mut self.by_key;
        self.ordered.retain(|&(key, slot)| {
            if evict(key, slot) {
                by_key.remove(&key);
                removed.push((key, slot));
                false
            } else {
                true
            }
        });
        removed
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkKey, usize)> + '_ {
        self.ordered.iter().copied()
    }

    /// Number of live chunks.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Whether no chunk is live.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_handles_negative_coordinates() {
        assert_eq!(snap_to_chunk_origin(0.0, 16), 0);
        assert_eq!(snap_to_chunk_origin(15.99, 16), 0);
        assert_eq!(snap_to_chunk_origin(16.0, 16), 16);
        assert_eq!(snap_to_chunk_origin(-0.5, 16), -16);
        assert_eq!(snap_to_chunk_origin(-16.0, 16), -16);
        assert_eq!(snap_to_chunk_origin(-16.5, 16), -32);
        assert_eq!(snap_to_chunk_center(20.0, 16), 24.0);
        assert_eq!(snap_to_chunk_origin(7.0, 3), 6);
    }

    #[test]
    fn test_key_geometry() {
        let key = ChunkKey::containing(17.5, 3.0, -2.0, 16);
        assert_eq!(key, ChunkKey::new(16, 0, -16));
        assert_eq!(key.center(16), Point3::new(24.0, 8.0, -8.0));
        assert_eq!(key.center_distance2(16, Point3::new(24.0, 8.0, -5.0)), 9.0);
        assert_eq!(ChunkKey::containing_voxel(-1, 31, 32, 16), ChunkKey::new(-16, 16, 32));
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut index = SpatialIndex::new();
        index.insert(ChunkKey::new(0, 0, 0), 3);
        index.insert(ChunkKey::new(16, 0, 0), 1);
        assert_eq!(index.len(), 2);
        assert!(index.contains(&ChunkKey::new(0, 0, 0)));
        assert_eq!(index.get(&ChunkKey::new(16, 0, 0)), Some(1));
        assert_eq!(index.get(&ChunkKey::new(32, 0, 0)), None);
        let order: Vec<usize> = index.iter().map(|(_, slot)| slot).collect();
        assert_eq!(order, vec![3, 1]);
    }

    #[test]
    #[should_panic(expected = "indexed twice")]
    fn test_double_insert_panics() {
        let mut index = SpatialIndex::new();
        index.insert(ChunkKey::new(0, 0, 0), 0);
        index.insert(ChunkKey::new(0, 0, 0), 1);
    }

    #[test]
    fn test_sweep_visits_every_entry_once() {
        let mut index = SpatialIndex::new();
        for i in 0..10 {
            index.insert(ChunkKey::new(i * 16, 0, 0), i as usize);
        }
        let mut visited = Vec::new();
        let removed = index.sweep(|_, slot| {
            visited.push(slot);
            slot % 2 == 0
        });
        assert_eq!(visited, (0..10).collect::<Vec<usize>>());
        assert_eq!(removed.len(), 5);
        assert_eq!(index.len(), 5);
        for (key, _) in removed {
            assert!(!index.contains(&key));
        }
        assert!(index.iter().all(|(key, slot)| index.get(&key) == Some(slot)));
    }
}
