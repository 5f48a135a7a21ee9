//! Snapshot serialisation.
//!
//! Collects every positioned entity into the wire format broadcast at
//! 20 Hz: one byte of count, then per entity the low 8 bits of the id, the
//! big-endian position, and 16 reserved bytes (written as zero until their
//! schema is fixed).

use starwing_ecs::prelude::Registry;
use starwing_engine::prelude::Position;
use starwing_proto::{SnapshotEntity, SNAPSHOT_MAX_ENTITIES};

/// Gather the authoritative state of all positioned entities, capped at the
/// 255 entities a snapshot can carry.
pub fn collect(registry: &mut Registry) -> Vec<SnapshotEntity> {
    let mut entities = Vec::new();
    let mut dropped = 0usize;
    registry.each1::<Position>(|e, pos| {
        if entities.len() < SNAPSHOT_MAX_ENTITIES {
            entities.push(SnapshotEntity::new((e.id() & 0xFF) as u8, pos.x, pos.y));
        } else {
            dropped += 1;
        }
    });
    if dropped > 0 {
        tracing::warn!(dropped, "snapshot overflow, entities not serialised");
    }
    entities
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
