//! Entity identifiers with generational indices

use core::fmt;
use serde::{Deserialize, Serialize};

/// Identity of an object in the simulated world.
///
/// Lower 32 bits hold the slot index, upper 32 bits the generation. A slot
/// is reused only after its generation has been bumped, so components that
/// still hold the id of a destroyed entity can detect it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId {
    bits: u64,
}

impl EntityId {
    /// Create an id from index and generation
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self {
            bits: (generation as u64) << 32 | index as u64,
        }
    }

    /// Slot index
    #[inline]
    pub const fn index(&self) -> u32 {
        self.bits as u32
    }

    /// Generation of the slot when this id was handed out
    #[inline]
    pub const fn generation(&self) -> u32 {
        (self.bits >> 32) as u32
    }

    /// Raw bits
    #[inline]
    pub const fn to_bits(&self) -> u64 {
        self.bits
    }

    /// Rebuild from raw bits
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self { bits }
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({}v{})", self.index(), self.generation())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

/// Hands out entity ids and tracks which are alive
#[derive(Debug, Default)]
pub struct IdAllocator {
    /// Current generation of each slot
    generations: Vec<u32>,
    /// Whether each slot is currently handed out
    alive: Vec<bool>,
    /// Freed slots available for reuse
    free_list: Vec<u32>,
}

impl IdAllocator {
    /// Create an empty allocator
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id
    pub fn allocate(&mut self) -> EntityId {
        if let Some(index) = self.free_list.pop() {
            let slot = index as usize;
            self.alive[slot] = true;
            EntityId::new(index, self.generations[slot])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.alive.push(true);
            EntityId::new(index, 0)
        }
    }

    /// Release an id. Returns false if it was already released or stale.
    pub fn free(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let slot = id.index() as usize;
        self.alive[slot] = false;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.free_list.push(id.index());
        true
    }

    /// Check whether an id still refers to a live entity
    pub fn is_alive(&self, id: EntityId) -> bool {
        let slot = id.index() as usize;
        slot < self.generations.len()
            && self.alive[slot]
            && self.generations[slot] == id.generation()
    }

    /// Number of live ids
    pub fn len(&self) -> usize {
        self.alive.iter().filter(|alive| **alive).count()
    }

    /// True when nothing is allocated
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
