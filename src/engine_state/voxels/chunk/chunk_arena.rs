//! # Chunk Arena Module
//!
//! Owns every allocated chunk. Evicted chunks are not dropped: their slot goes
//! onto a stack of free slots and the chunk, grid and mesh buffers included,
//! is reinitialized for the next coordinate that needs one.
//!
//! Slot ids are stable for as long as the chunk is live, which lets the
//! spatial index store plain `usize` values.

use super::chunk_index::ChunkKey;
use super::Chunk;
use crate::engine_state::rendering::ChunkMesh;

/// Allocation counters of a `ChunkArena`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Chunks ever allocated. Equal to the arena capacity.
    pub created: usize,
    /// Successful `obtain` calls, reuse included.
    pub obtained: usize,
    /// `free` calls.
    pub freed: usize,
    /// Slots currently waiting for reuse.
    pub free: usize,
}

/// Slot storage for chunks with a free-slot stack.
pub struct ChunkArena<M: ChunkMesh> {
    chunk_size: i32,
    /// `None` only while a chunk is checked out.
    slots: Vec<Option<Chunk<M>>>,
    /// Parallel to `slots`: whether the slot is on the free stack.
    is_free: Vec<bool>,
    free_slots: Vec<usize>,
    obtained: usize,
    freed: usize,
}

impl<M: ChunkMesh> ChunkArena<M> {
    /// Creates an empty arena for chunks of the given edge length.
    pub fn new(chunk_size: i32) -> Self {
        ChunkArena {
            chunk_size,
            slots: Vec::new(),
            is_free: Vec::new(),
            free_slots: Vec::new(),
            obtained: 0,
            freed: 0,
        }
    }

    /// Hands out a chunk positioned at `key`, reusing a freed one if possible.
    ///
    /// The returned chunk is cleared and marked dirty. Its grid holds no
    /// solid voxels until terrain is applied.
    ///
    /// # Returns
    /// The slot id of the chunk.
    pub fn obtain(&mut self, key: ChunkKey) -> usize {
        self.obtained += 1;
        if let Some(slot) = self.free_slots.pop() {
            self.is_free[slot] = false;
            if let Some(chunk) = self.slots[slot].as_mut() {
                chunk.reinit(key);
                return slot;
            }
            panic!("free chunk slot {slot} is checked out");
        }
        self.slots.push(Some(Chunk::new(key, self.chunk_size)));
        self.is_free.push(false);
        self.slots.len() - 1
    }

    /// Returns a slot to the free stack.
    ///
    /// # Panics
    /// Panics if the slot was never handed out or is already free.
    pub fn free(&mut self, slot: usize) {
        assert!(slot < self.slots.len(), "chunk slot {slot} was never allocated");
        assert!(!self.is_free[slot], "chunk slot {slot} freed twice");
        self.is_free[slot] = true;
        self.freed += 1;
        self.free_slots.push(slot);
    }

    /// The chunk in `slot`.
    pub fn get(&self, slot: usize) -> Option<&Chunk<M>> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// The chunk in `slot`, mutably.
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Chunk<M>> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    /// Takes the chunk out of its slot so it can be mutated while the rest of
    /// the arena is borrowed. Must be followed by `check_in`.
    ///
    /// # Panics
    /// Panics if the slot is empty or already checked out.
    pub fn check_out(&mut self, slot: usize) -> Chunk<M> {
        match self.slots.get_mut(slot).and_then(Option::take) {
            Some(chunk) => chunk,
            None => panic!("chunk slot {slot} is empty or already checked out"),
        }
    }

    /// Puts a checked-out chunk back into its slot.
    pub fn check_in(&mut self, slot: usize, chunk: Chunk<M>) {
        let previous = self.slots[slot].replace(chunk);
        assert!(previous.is_none(), "chunk slot {slot} was not checked out");
    }

    /// Number of chunks ever allocated.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots waiting for reuse.
    pub fn free_count(&self) -> usize {
        self.free_slots.len()
    }

    /// Allocation counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            created: self.slots.len(),
            obtained: self.obtained,
            freed: self.freed,
            free: self.free_slots.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point3;

    use super::*;
    use crate::engine_state::rendering::FaceMesh;
    use crate::engine_state::voxels::block::block_type::VoxelType;

    #[test]
    fn test_freed_slots_are_reused() {
        let mut arena: ChunkArena<FaceMesh> = ChunkArena::new(4);
        let a = arena.obtain(ChunkKey::new(0, 0, 0));
        let b = arena.obtain(ChunkKey::new(4, 0, 0));
        assert_ne!(a, b);
        assert_eq!(arena.capacity(), 2);

        arena.free(a);
        assert_eq!(arena.free_count(), 1);

        let c = arena.obtain(ChunkKey::new(8, 0, 0));
        assert_eq!(c, a);
        assert_eq!(arena.capacity(), 2);
        assert_eq!(arena.free_count(), 0);
        assert_eq!(
            arena.stats(),
            PoolStats {
                created: 2,
                obtained: 3,
                freed: 1,
                free: 0
            }
        );
    }

    #[test]
    fn test_reused_chunk_is_reset() {
        let mut arena: ChunkArena<FaceMesh> = ChunkArena::new(4);
        let slot = arena.obtain(ChunkKey::new(0, 0, 0));
        {
            let chunk = arena.get_mut(slot).unwrap();
            chunk.grid_mut().voxel_at_mut(1, 1, 1).voxel_type = VoxelType::DIRT;
        }
        arena.free(slot);

        let slot = arena.obtain(ChunkKey::new(0, 4, 0));
        let chunk = arena.get(slot).unwrap();
        assert_eq!(chunk.key(), ChunkKey::new(0, 4, 0));
        assert_eq!(chunk.grid().origin(), Point3::new(0, 4, 0));
        assert!(!chunk.grid().has_solid());
        assert!(chunk.is_dirty());
    }

    #[test]
    fn test_check_out_and_in() {
        let mut arena: ChunkArena<FaceMesh> = ChunkArena::new(2);
        let slot = arena.obtain(ChunkKey::new(0, 0, 0));
        let chunk = arena.check_out(slot);
        assert!(arena.get(slot).is_none());
        arena.check_in(slot, chunk);
        assert!(arena.get(slot).is_some());
    }

    #[test]
    fn test_slot_can_be_freed_again_after_reuse() {
        let mut arena: ChunkArena<FaceMesh> = ChunkArena::new(2);
        let slots: Vec<usize> = (0..4)
            .map(|i| arena.obtain(ChunkKey::new(2 * i, 0, 0)))
            .collect();
        for &slot in &slots {
            arena.free(slot);
        }
        assert_eq!(arena.free_count(), 4);

        let reused = arena.obtain(ChunkKey::new(0, 2, 0));
        assert_eq!(reused, slots[3]);
        arena.free(reused);
        assert_eq!(arena.stats().freed, 5);
        assert_eq!(arena.free_count(), 4);
    }

    #[test]
    #[should_panic(expected = "freed twice")]
    fn test_double_free_panics() {
        let mut arena: ChunkArena<FaceMesh> = ChunkArena::new(2);
        let slot = arena.obtain(ChunkKey::new(0, 0, 0));
        arena.free(slot);
        arena.free(slot);
    }
}
