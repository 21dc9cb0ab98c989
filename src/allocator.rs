use std::collections::VecDeque;
use std::num::NonZeroU8;

use crate::entity::{Entity, MAX_INDEX};

/// Free-ring occupancy below which fresh indices are minted instead of
/// recycled. Keeping a deallocated index parked for a while makes stale
/// handles with a wrapped generation far less likely to collide.
pub const DEFAULT_FREE_MINIMUM: usize = 64;

/// Issues and recycles generational entity handles.
///
/// The allocator is the sole authority on handle validity: a handle is valid
/// iff the generation recorded for its slot equals the handle's generation.
/// Generations start at 1, are bumped on every deallocation, and wrap around
/// zero (zero is reserved as the "never recorded" sentinel).
pub struct EntityAllocator {
    /// Recorded generation per slot index, grown lazily.
    generations: Vec<NonZeroU8>,
    /// FIFO ring of recycled slot indices.
    free_indices: VecDeque<u32>,
    free_minimum: usize,
    next_unused: u32,
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::with_free_minimum(DEFAULT_FREE_MINIMUM)
    }
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator with a custom recycling threshold. A threshold of
    /// zero recycles indices as soon as they are freed.
    pub fn with_free_minimum(free_minimum: usize) -> Self {
        Self {
            generations: Vec::new(),
            free_indices: VecDeque::new(),
            free_minimum,
            next_unused: 0,
        }
    }

    /// Returns a fresh or recycled handle.
    ///
    /// # Panics
    /// Panics if the 24-bit index space is exhausted and no freed index is
    /// available.
    pub fn allocate(&mut self) -> Entity {
        let index = self.acquire_index();
        let slot = index as usize;

        if slot >= self.generations.len() {
            self.generations.resize(slot + 1, NonZeroU8::MIN);
        }

        Entity::new(index, self.generations[slot])
    }

    /// Invalidates a handle and queues its index for recycling.
    ///
    /// Returns `false`, with no side effects, if the handle is already
    /// invalid.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_valid(entity) {
            log::warn!("deallocate of invalid handle {:?}", entity);
            return false;
        }

        let slot = entity.index() as usize;

        // Bump the generation so every outstanding copy of this handle goes
        // stale, skipping the reserved zero value on wraparound.
        let bumped = self.generations[slot].get().wrapping_add(1).max(1);
        self.generations[slot] = NonZeroU8::new(bumped).expect("generation bumped to zero");

        self.free_indices.push_back(entity.index());
        true
    }

    /// Checks whether a handle refers to a live entity.
    #[inline]
    pub fn is_valid(&self, entity: Entity) -> bool {
        self.generations
            .get(entity.index() as usize)
            .map(|gen| *gen == entity.generation())
            .unwrap_or(false)
    }

    /// Number of indices currently parked in the free ring.
    #[inline]
    pub fn free_count(&self) -> usize {
        self.free_indices.len()
    }

    // Only consume from the free ring once it holds enough entries, so a
    // just-freed index stays unused for a while.
    fn acquire_index(&mut self) -> u32 {
        if self.free_indices.len() >= self.free_minimum {
            if let Some(index) = self.free_indices.pop_front() {
                return index;
            }
        }

        if self.next_unused <= MAX_INDEX {
            let index = self.next_unused;
            self.next_unused += 1;
            return index;
        }

        // Index space exhausted; recycle even below the threshold.
        self.free_indices
            .pop_front()
            .expect("entity index space exhausted")
    }
}
