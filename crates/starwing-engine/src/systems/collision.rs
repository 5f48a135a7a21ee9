//! Collision detection and mutual damage.
//!
//! Broad phase: a uniform grid of 64 px cells over the 1920×1080 play area,
//! rebuilt every tick. Each collidable entity is inserted into every cell
//! its AABB overlaps (cell ranges clamped to the grid). Narrow phase: for
//! each cell, every entry is tested against the later entries of its own
//! cell and all entries of the four forward-neighbour cells (i+1,j),
//! (i,j+1), (i+1,j+1), (i-1,j+1), so each unordered pair is considered at
//! most once.
//!
//! A hit requires the layer masks to agree in both directions and the
//! world-space boxes to overlap; damage is applied mutually, clamped at
//! zero, and only between two entities that are both still alive this tick.
//! This is the sole authoritative damage path.

use starwing_ecs::prelude::*;

use crate::components::{Collider, Damage, Health, Position, Renderable};
use crate::game::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Broad-phase cell size in pixels.
pub const CELL_SIZE: f32 = 64.0;
/// Grid width in cells (1920 / 64 + 1).
pub const GRID_WIDTH: usize = (SCREEN_WIDTH / CELL_SIZE) as usize + 1;
/// Grid height in cells (1080 / 64 + 1).
pub const GRID_HEIGHT: usize = (SCREEN_HEIGHT / CELL_SIZE) as usize + 1;

#[derive(Default)]
pub struct CollisionSystem {
    pub update_count: u64,
}

impl System for CollisionSystem {
    fn name(&self) -> &'static str {
        "collision"
    }

    fn required_components(&self, components: &mut ComponentRegistry) -> Signature {
        Signature::empty()
            .with::<Position>(components)
            .with::<Renderable>(components)
            .with::<Collider>(components)
            .with::<Damage>(components)
            .with::<Health>(components)
    }

    fn run(&mut self, registry: &mut Registry, _dt: f32) {
        self.update_count += 1;

        // Broad phase: bin every collidable entity by the cells its AABB
        // overlaps. Entities with a negative hitbox origin are skipped.
        let mut cells: Vec<Vec<Entity>> = vec![Vec::new(); GRID_WIDTH * GRID_HEIGHT];
        registry.each5::<Position, Renderable, Collider, Damage, Health>(
            |e, pos, _render, collider, _damage, _health| {
                let origin_x = pos.x + collider.origin_offset.x;
                let origin_y = pos.y + collider.origin_offset.y;
                if origin_x < 0.0 || origin_y < 0.0 {
                    return;
                }
                let min_cx = ((origin_x / CELL_SIZE) as usize).min(GRID_WIDTH - 1);
                let min_cy = ((origin_y / CELL_SIZE) as usize).min(GRID_HEIGHT - 1);
                let max_cx = (((origin_x + collider.size.x) / CELL_SIZE) as usize)
                    .min(GRID_WIDTH - 1);
                let max_cy = (((origin_y + collider.size.y) / CELL_SIZE) as usize)
                    .min(GRID_HEIGHT - 1);

                for cx in min_cx..=max_cx {
                    for cy in min_cy..=max_cy {
                        cells[cx * GRID_HEIGHT + cy].push(e);
                    }
                }
            },
        );

        // Candidate pairs from each cell and its forward neighbours. Two
        // large boxes can share more than one cell, so pairs are sorted and
        // deduplicated before any damage is applied -- no pair is considered
        // twice, and the application order is deterministic.
        let mut pairs: Vec<(Entity, Entity)> = Vec::new();
        for cx in 0..GRID_WIDTH {
            for cy in 0..GRID_HEIGHT {
                let cell = cx * GRID_HEIGHT + cy;
                for head in 0..cells[cell].len() {
                    let e0 = cells[cell][head];
                    for k in head + 1..cells[cell].len() {
                        pairs.push(ordered(e0, cells[cell][k]));
                    }
                    for (nx, ny) in forward_neighbours(cx, cy) {
                        for &e1 in &cells[nx * GRID_HEIGHT + ny] {
                            if e0 != e1 {
                                pairs.push(ordered(e0, e1));
                            }
                        }
                    }
                }
            }
        }
        pairs.sort_unstable();
        pairs.dedup();

        for (e1, e2) in pairs {
            collide(registry, e1, e2);
        }
    }
}

/// Order a pair canonically so `(a, b)` and `(b, a)` dedupe to one entry.
fn ordered(a: Entity, b: Entity) -> (Entity, Entity) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// The four neighbour cells checked ahead of `(cx, cy)`, pre-guarded against
/// the grid edges.
fn forward_neighbours(cx: usize, cy: usize) -> impl Iterator<Item = (usize, usize)> {
    let right = cx + 1 < GRID_WIDTH;
    let up = cy + 1 < GRID_HEIGHT;
    let left = cx >= 1;
    [
        right.then_some((cx + 1, cy)),
        up.then_some((cx, cy + 1)),
        (right && up).then_some((cx + 1, cy + 1)),
        (left && up).then_some((cx - 1, cy + 1)),
    ]
    .into_iter()
    .flatten()
}

/// Narrow-phase test plus mutual damage for one candidate pair.
fn collide(registry: &mut Registry, e1: Entity, e2: Entity) {
    if e1 == e2 {
        return;
    }
    let (Some(p1), Some(p2)) = (
        registry.get::<Position>(e1).copied(),
        registry.get::<Position>(e2).copied(),
    ) else {
        return;
    };
    let (Some(c1), Some(c2)) = (
        registry.get::<Collider>(e1).copied(),
        registry.get::<Collider>(e2).copied(),
    ) else {
        return;
    };

    // Both sides must name each other's layer.
    if c1.self_mask & c2.other_mask == 0 || c2.self_mask & c1.other_mask == 0 {
        return;
    }

    let a_min_x = p1.x + c1.origin_offset.x;
    let a_min_y = p1.y + c1.origin_offset.y;
    let b_min_x = p2.x + c2.origin_offset.x;
    let b_min_y = p2.y + c2.origin_offset.y;

    let overlap = a_min_x < b_min_x + c2.size.x
        && a_min_x + c1.size.x > b_min_x
        && a_min_y < b_min_y + c2.size.y
        && a_min_y + c1.size.y > b_min_y;
    if !overlap {
        return;
    }

    let (Some(d1), Some(d2)) = (
        registry.get::<Damage>(e1).copied(),
        registry.get::<Damage>(e2).copied(),
    ) else {
        return;
    };
    let (Some(h1), Some(h2)) = (
        registry.get::<Health>(e1).copied(),
        registry.get::<Health>(e2).copied(),
    ) else {
        return;
    };

    // Damage only flows between two entities that are both still standing;
    // a corpse neither absorbs nor deals this tick.
    if h1.current <= 0 || h2.current <= 0 {
        return;
    }
    if let Some(health) = registry.get_mut::<Health>(e1) {
        health.current = (health.current - d2.value).max(0);
    }
    if let Some(health) = registry.get_mut::<Health>(e2) {
        health.current = (health.current - d1.value).max(0);
    }
    tracing::trace!(%e1, %e2, "collision damage applied");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
