//! Player session slots.
//!
//! The server holds exactly four slots. A slot binds a UDP endpoint to a
//! player id and to the player's authoritative ECS entity; the table itself
//! never owns entities -- entity lifecycle stays with the registry.
//!
//! All scans are linear: with four slots that beats any map.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use starwing_ecs::prelude::Entity;

/// Number of player slots.
pub const MAX_PLAYERS: usize = 4;

/// Slot is reclaimed after this long without a datagram from its endpoint.
pub const PLAYER_TIMEOUT: Duration = Duration::from_secs(5);

/// Player id sent to a client when every slot is taken.
pub const SERVER_FULL_ID: u8 = 255;

// ---------------------------------------------------------------------------
// PlayerSlot
// ---------------------------------------------------------------------------

/// One player slot.
#[derive(Debug, Clone)]
pub struct PlayerSlot {
    pub in_use: bool,
    pub player_id: u8,
    pub endpoint: Option<SocketAddr>,
    pub username: String,
    pub last_seen: Instant,
    /// The player's ECS entity; [`Entity::INVALID`] while the slot is free.
    pub entity: Entity,
}

impl PlayerSlot {
    fn free(player_id: u8) -> Self {
        PlayerSlot {
            in_use: false,
            player_id,
            endpoint: None,
            username: String::new(),
            last_seen: Instant::now(),
            entity: Entity::INVALID,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionTable
// ---------------------------------------------------------------------------

/// Result of a join attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A fresh slot was allocated.
    Assigned(u8),
    /// The endpoint already holds this slot; re-send its id.
    AlreadyJoined(u8),
    /// All four slots are taken.
    Full,
}

/// The four-slot player table.
#[derive(Debug)]
pub struct SessionTable {
    slots: [PlayerSlot; MAX_PLAYERS],
}

impl Default for SessionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTable {
    pub fn new() -> Self {
        SessionTable {
            slots: std::array::from_fn(|i| PlayerSlot::free(i as u8)),
        }
    }

    /// Number of slots currently in use.
    pub fn active_players(&self) -> usize {
        self.slots.iter().filter(|s| s.in_use).count()
    }

    /// Shared view of a slot.
    pub fn slot(&self, player_id: u8) -> Option<&PlayerSlot> {
        self.slots.get(player_id as usize)
    }

    /// Player id bound to `endpoint`, if any.
    pub fn find_by_endpoint(&self, endpoint: SocketAddr) -> Option<u8> {
        self.slots
            .iter()
            .find(|s| s.in_use && s.endpoint == Some(endpoint))
            .map(|s| s.player_id)
    }

    /// Player id owning `entity`, if any.
    pub fn find_by_entity(&self, entity: Entity) -> Option<u8> {
        self.slots
            .iter()
            .find(|s| s.in_use && s.entity == entity)
            .map(|s| s.player_id)
    }

    /// Handle a JOIN from `endpoint`.
    ///
    /// Idempotent per endpoint; allocates the lowest-index free slot. The
    /// caller is expected to create the player entity afterwards and bind it
    /// with [`set_entity`](Self::set_entity).
    pub fn join(&mut self, endpoint: SocketAddr, username: &str, now: Instant) -> JoinOutcome {
        if let Some(player_id) = self.find_by_endpoint(endpoint) {
            self.slots[player_id as usize].last_seen = now;
            return JoinOutcome::AlreadyJoined(player_id);
        }
        match self.slots.iter_mut().find(|s| !s.in_use) {
            Some(slot) => {
                slot.in_use = true;
                slot.endpoint = Some(endpoint);
                slot.username = username.to_owned();
                slot.last_seen = now;
                slot.entity = Entity::INVALID;
                JoinOutcome::Assigned(slot.player_id)
            }
            None => JoinOutcome::Full,
        }
    }

    /// Bind the player's ECS entity to its slot.
    pub fn set_entity(&mut self, player_id: u8, entity: Entity) {
        if let Some(slot) = self.slots.get_mut(player_id as usize) {
            slot.entity = entity;
        }
    }

    /// Refresh a slot's liveness timestamp.
    pub fn touch(&mut self, player_id: u8, now: Instant) {
        if let Some(slot) = self.slots.get_mut(player_id as usize) {
            if slot.in_use {
                slot.last_seen = now;
            }
        }
    }

    /// Free a slot, returning its final state for the caller to act on
    /// (entity to destroy, username to announce).
    pub fn release(&mut self, player_id: u8) -> Option<PlayerSlot> {
        let slot = self.slots.get_mut(player_id as usize)?;
        if !slot.in_use {
            return None;
        }
        let taken = slot.clone();
        *slot = PlayerSlot::free(player_id);
        Some(taken)
    }

    /// Player ids whose endpoints have been silent past the timeout.
    pub fn timed_out(&self, now: Instant) -> Vec<u8> {
        self.slots
            .iter()
            .filter(|s| s.in_use && now.duration_since(s.last_seen) > PLAYER_TIMEOUT)
            .map(|s| s.player_id)
            .collect()
    }

    /// Endpoints of every live client, for broadcasting.
    pub fn endpoints(&self) -> Vec<SocketAddr> {
        self.slots
            .iter()
            .filter(|s| s.in_use)
            .filter_map(|s| s.endpoint)
            .collect()
    }

    /// Free every slot.
    pub fn clear(&mut self) {
        self.slots = std::array::from_fn(|i| PlayerSlot::free(i as u8));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
