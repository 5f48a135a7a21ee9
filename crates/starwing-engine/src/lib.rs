//! Starwing Engine -- gameplay components, systems, and the level pipeline.
//!
//! This crate builds the game on top of [`starwing_ecs`]: plain-data
//! components, the built-in systems (input handling, gravity, sinusoidal AI,
//! motion, lifetimes, domain clipping, grid collision, scoring, death,
//! animation), entity factories for players/projectiles/enemies, and the
//! JSON level loader with its timed spawn pipeline.
//!
//! [`game::build_registry`] wires everything in the normative tick order:
//! Input → Gravity → AI → Motion → Lifetime → Domain → Collision → Score →
//! Death → Animation.
//!
//! # Quick Start
//!
//! ```
//! use starwing_engine::prelude::*;
//!
//! let mut registry = build_registry(GameMode::RType, None);
//! let player = spawn_player(&mut registry, 0, GameMode::RType);
//!
//! // Hold "right" for a tick.
//! registry
//!     .get_mut::<InputControlled>(player)
//!     .unwrap()
//!     .pressed_keys
//!     .push(3);
//! registry.update(1.0 / 60.0);
//!
//! assert!(registry.get::<Acceleration>(player).unwrap().x > 0.0);
//! ```

#![deny(unsafe_code)]

pub mod components;
pub mod game;
pub mod level;
pub mod systems;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use starwing_ecs::prelude::*;

    pub use crate::components::*;
    pub use crate::game::{
        build_registry, spawn_player, spawn_projectile, GameMode, SCREEN_HEIGHT, SCREEN_WIDTH,
    };
    pub use crate::level::{spawn_enemy, EnemySpawnData, LevelError, LevelSpawner};
    pub use crate::systems::death::PlayerDeathFn;
    pub use crate::systems::input::{KEY_DOWN, KEY_LEFT, KEY_RIGHT, KEY_SHOOT, KEY_UP};
}
