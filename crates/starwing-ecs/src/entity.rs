//! Entity identifiers and allocation.
//!
//! An [`Entity`] is an opaque 32-bit handle. Destroyed ids go onto a LIFO
//! free list and are handed back out before any fresh id is issued, so the
//! numeric value of an id is not stable across destruction and recreation.
//! Code that needs to detect staleness checks pool membership instead.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// An opaque entity identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(pub(crate) u32);

impl Entity {
    /// Sentinel meaning "no entity".
    pub const INVALID: Entity = Entity(u32::MAX);

    /// The raw 32-bit value.
    #[inline]
    pub fn id(self) -> u32 {
        self.0
    }

    /// Reconstruct from a raw 32-bit value.
    #[inline]
    pub fn from_id(id: u32) -> Self {
        Entity(id)
    }

    /// Whether this handle is the [`INVALID`](Self::INVALID) sentinel.
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Entity({})", self.0)
        } else {
            write!(f, "Entity(INVALID)")
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// EntityManager
// ---------------------------------------------------------------------------

/// Allocates and recycles [`Entity`] ids.
///
/// Ids come from an incrementing counter; destroyed ids are pushed onto a
/// free list and popped LIFO, so the most recently destroyed id is the next
/// one created.
#[derive(Debug, Default)]
pub struct EntityManager {
    next: u32,
    alive: usize,
    free: Vec<u32>,
    /// Liveness flag per issued id, so a stale destroy cannot corrupt the
    /// free list.
    live: Vec<bool>,
}

impl EntityManager {
    /// Create a new, empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an entity id, preferring recycled ids over fresh ones.
    pub fn create(&mut self) -> Entity {
        self.alive += 1;
        if let Some(id) = self.free.pop() {
            self.live[id as usize] = true;
            Entity(id)
        } else {
            let id = self.next;
            self.next += 1;
            self.live.push(true);
            Entity(id)
        }
    }

    /// Return `e`'s id to the free list.
    ///
    /// The caller (the registry) is responsible for stripping components
    /// first; the manager only tracks id liveness. Returns `false` when `e`
    /// was not alive, in which case nothing changes.
    pub fn destroy(&mut self, e: Entity) -> bool {
        debug_assert!(e.is_valid(), "destroying the INVALID sentinel");
        if !self.is_alive(e) {
            return false;
        }
        self.live[e.0 as usize] = false;
        self.free.push(e.0);
        self.alive -= 1;
        true
    }

    /// Whether `e` refers to a currently alive entity.
    pub fn is_alive(&self, e: Entity) -> bool {
        self.live.get(e.0 as usize).copied().unwrap_or(false)
    }

    /// Number of currently alive entities.
    pub fn alive(&self) -> usize {
        self.alive
    }

    /// Pre-size the free list.
    pub fn reserve(&mut self, capacity: usize) {
        self.free.reserve(capacity);
    }

    /// Forget every entity and start the counter over.
    pub fn clear(&mut self) {
        self.next = 0;
        self.alive = 0;
        self.free.clear();
        self.live.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
