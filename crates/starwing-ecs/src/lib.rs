//! Starwing ECS -- sparse-set Entity Component System with fixed-step scheduling.
//!
//! This crate provides the simulation core for the Starwing server. Component
//! values live in dense sparse-set pools (one per kind) for O(1) membership
//! and contiguous iteration; systems declare the component kinds they need as
//! a 128-bit signature and only run while every required pool is non-empty.
//! A fixed-timestep [`GameClock`](clock::GameClock) drives the whole
//! simulation deterministically.
//!
//! # Quick Start
//!
//! ```
//! use starwing_ecs::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Position { x: f32, y: f32 }
//! impl Component for Position { const NAME: &'static str = "position"; }
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Velocity { x: f32, y: f32 }
//! impl Component for Velocity { const NAME: &'static str = "velocity"; }
//!
//! let mut registry = Registry::new();
//! let e = registry.create();
//! registry.emplace(e, Position { x: 0.0, y: 0.0 });
//! registry.emplace(e, Velocity { x: 1.0, y: 0.0 });
//!
//! registry.each2::<Position, Velocity>(|_e, pos, vel| {
//!     pos.x += vel.x;
//!     pos.y += vel.y;
//! });
//!
//! assert_eq!(registry.get::<Position>(e), Some(&Position { x: 1.0, y: 0.0 }));
//! ```

#![deny(unsafe_code)]

pub mod clock;
pub mod component;
pub mod entity;
pub mod registry;
pub mod sparse;
pub mod system;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by ECS operations.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// The entity is not alive (already destroyed or never created).
    #[error("entity {entity:?} is not alive")]
    DeadEntity { entity: entity::Entity },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::clock::GameClock;
    pub use crate::component::{
        Component, ComponentId, ComponentRegistry, Signature, MAX_COMPONENTS,
    };
    pub use crate::entity::{Entity, EntityManager};
    pub use crate::registry::Registry;
    pub use crate::sparse::SparseSet;
    pub use crate::system::System;
    pub use crate::EcsError;
}

// ---------------------------------------------------------------------------
// Integration tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }
    impl Component for Position {
        const NAME: &'static str = "position";
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Velocity {
        x: f32,
        y: f32,
    }
    impl Component for Velocity {
        const NAME: &'static str = "velocity";
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Health(i32);
    impl Component for Health {
        const NAME: &'static str = "health";
    }

    /// Moves every (Position, Velocity) entity each step.
    struct MotionLike;

    impl System for MotionLike {
        fn name(&self) -> &'static str {
            "motion-like"
        }

        fn required_components(&self, components: &mut ComponentRegistry) -> Signature {
            Signature::empty()
                .with::<Position>(components)
                .with::<Velocity>(components)
        }

        fn run(&mut self, registry: &mut Registry, dt: f32) {
            registry.each2::<Position, Velocity>(|_e, pos, vel| {
                pos.x += vel.x * dt;
                pos.y += vel.y * dt;
            });
        }
    }

    /// Destroys every entity whose health hits zero.
    struct DeathLike;

    impl System for DeathLike {
        fn name(&self) -> &'static str {
            "death-like"
        }

        fn required_components(&self, components: &mut ComponentRegistry) -> Signature {
            Signature::empty().with::<Health>(components)
        }

        fn run(&mut self, registry: &mut Registry, _dt: f32) {
            let mut dead = Vec::new();
            registry.each1::<Health>(|e, hp| {
                if hp.0 <= 0 {
                    dead.push(e);
                }
            });
            for e in dead {
                let _ = registry.destroy(e);
            }
        }
    }

    #[test]
    fn full_tick_pipeline_moves_and_reaps() {
        let mut registry = Registry::new();
        registry.clock_mut().fixed_delta_time = 0.5;
        registry.add_system(0, MotionLike);
        registry.add_system(10, DeathLike);

        let mover = registry.create();
        registry.emplace(mover, Position { x: 0.0, y: 0.0 });
        registry.emplace(mover, Velocity { x: 2.0, y: 0.0 });
        registry.emplace(mover, Health(3));

        let corpse = registry.create();
        registry.emplace(corpse, Position { x: 5.0, y: 5.0 });
        registry.emplace(corpse, Health(0));

        let steps = registry.update(0.5);
        assert_eq!(steps, 1);
        assert_eq!(
            registry.get::<Position>(mover),
            Some(&Position { x: 1.0, y: 0.0 })
        );
        assert!(!registry.is_alive(corpse));
        assert_eq!(registry.alive(), 1);
    }

    #[test]
    fn ticks_accumulate_deterministically() {
        fn run() -> (f32, u64) {
            let mut registry = Registry::new();
            registry.add_system(0, MotionLike);
            let e = registry.create();
            registry.emplace(e, Position { x: 0.0, y: 0.0 });
            registry.emplace(e, Velocity { x: 60.0, y: -60.0 });
            for _ in 0..120 {
                registry.update(1.0 / 60.0);
            }
            let pos = registry.get::<Position>(e).unwrap();
            (pos.x, registry.clock().frame_count)
        }

        let (x1, frames1) = run();
        let (x2, frames2) = run();
        assert_eq!(x1, x2, "simulation diverged between identical runs");
        assert_eq!(frames1, frames2);
        // 60 px/s for ~2 simulated seconds.
        assert!((x1 - 120.0).abs() < 2.0, "x1={x1}");
    }

    #[test]
    fn frame_count_increases_monotonically() {
        let mut registry = Registry::new();
        let mut last = registry.clock().frame_count;
        for _ in 0..50 {
            registry.update(0.02);
            let now = registry.clock().frame_count;
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn name_and_type_keyed_kinds_interoperate() {
        let mut registry = Registry::new();
        let e = registry.create();
        registry.emplace(e, Health(10));

        let components = registry.component_registry();
        let id = components.id_for_name("health").expect("registered via type");
        assert_eq!(components.name_of(id), Some("health"));
    }
}
