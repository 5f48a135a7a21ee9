//! Game-mode selection, tuning constants, and entity factories.
//!
//! Everything gameplay-global lives here: the screen extent, the collision
//! layer scheme, per-mode player recipes, and the wiring of systems into a
//! registry in the normative tick order.

use std::fmt;
use std::str::FromStr;

use starwing_ecs::prelude::{Entity, Registry};

use crate::components::*;
use crate::systems::ai::SinusoidalAiSystem;
use crate::systems::animation::AnimationSystem;
use crate::systems::collision::CollisionSystem;
use crate::systems::death::{DeathSystem, PlayerDeathFn};
use crate::systems::domain::DomainSystem;
use crate::systems::flap::FlapInputSystem;
use crate::systems::gravity::GravitySystem;
use crate::systems::input::InputSystem;
use crate::systems::lifetime::LifetimeSystem;
use crate::systems::motion::MotionSystem;
use crate::systems::score::ScoreSystem;

// ---------------------------------------------------------------------------
// World constants
// ---------------------------------------------------------------------------

/// Authoritative world width in pixels.
pub const SCREEN_WIDTH: f32 = 1920.0;
/// Authoritative world height in pixels.
pub const SCREEN_HEIGHT: f32 = 1080.0;

/// Acceleration applied per held directional key, px/s².
pub const PLAYER_ACCELERATION: f32 = 3000.0;
/// Player speed cap per axis, px/s.
pub const PLAYER_SPEED_MAX: f32 = 300.0;
/// Flap-mode player speed cap per axis, px/s.
pub const FLAP_SPEED_MAX: f32 = 500.0;
/// Upward impulse applied on a flap, px/s.
pub const FLAP_IMPULSE: f32 = 300.0;
/// Downward pull on flap-mode players, px/s².
pub const FLAP_GRAVITY: f32 = 400.0;
/// Minimum seconds between player shots.
pub const PLAYER_FIRE_INTERVAL: f32 = 0.15;

/// Projectile muzzle speed, px/s (rightward).
pub const PROJECTILE_SPEED: f32 = 1000.0;
/// Projectile contact damage.
pub const PROJECTILE_DAMAGE: i32 = 1;
/// Projectile hitbox extent in pixels.
pub const PROJECTILE_SIZE: Vec2 = Vec2::new(16.0, 8.0);
/// Seconds a projectile lives before it is reaped.
pub const PROJECTILE_LIFETIME: f32 = 1.5;

/// Player sprite frame extent on the sheet.
pub const PLAYER_FRAME_SIZE: Vec2 = Vec2::new(33.2, 17.2);
/// Player sprite sheet path handed to clients.
pub const PLAYER_SHEET: &str = "assets/sprites/ships.png";
/// Projectile sprite sheet path handed to clients.
pub const PROJECTILE_SHEET: &str = "assets/sprites/player_shots.png";

// ---------------------------------------------------------------------------
// Collision layers
// ---------------------------------------------------------------------------

/// 8-bit collision layer scheme.
///
/// `self_mask` is the layer an entity occupies; `other_mask` is the set of
/// layers that can hurt it. A pair collides only when each side's
/// `self_mask` intersects the other's `other_mask`.
pub mod layers {
    /// Player ships.
    pub const PLAYER: u8 = 0b1000_0000;
    /// Enemy ships.
    pub const ENEMY: u8 = 0b0100_0000;
    /// Player projectiles.
    pub const PLAYER_SHOT: u8 = 0b0010_0000;
    /// Enemy projectiles.
    pub const ENEMY_SHOT: u8 = 0b0001_0000;

    /// What can hurt a player.
    pub const PLAYER_HURT_BY: u8 = ENEMY | ENEMY_SHOT;
    /// What can hurt an enemy.
    pub const ENEMY_HURT_BY: u8 = PLAYER | PLAYER_SHOT;
    /// What a player projectile can hit.
    pub const PLAYER_SHOT_HITS: u8 = ENEMY;
}

// ---------------------------------------------------------------------------
// System priorities
// ---------------------------------------------------------------------------

/// Normative per-tick system order, as priority values.
pub mod priority {
    pub const INPUT: i32 = 0;
    pub const GRAVITY: i32 = 10;
    pub const AI: i32 = 20;
    pub const MOTION: i32 = 30;
    pub const LIFETIME: i32 = 35;
    pub const DOMAIN: i32 = 40;
    pub const COLLISION: i32 = 50;
    pub const SCORE: i32 = 55;
    pub const DEATH: i32 = 60;
    pub const ANIMATION: i32 = 70;
}

// ---------------------------------------------------------------------------
// GameMode
// ---------------------------------------------------------------------------

/// Which input handling variant the server runs, selected by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// Side-scroller: directional acceleration plus projectiles.
    RType,
    /// Flap: gravity pulls down, shoot applies an upward impulse.
    FlappyByte,
}

/// Error for an unrecognised game-mode string.
#[derive(Debug, thiserror::Error)]
#[error("unknown game mode '{0}' (expected 'RType' or 'flappyByte')")]
pub struct ParseGameModeError(String);

impl FromStr for GameMode {
    type Err = ParseGameModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RType" => Ok(GameMode::RType),
            "flappyByte" => Ok(GameMode::FlappyByte),
            other => Err(ParseGameModeError(other.to_owned())),
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::RType => write!(f, "RType"),
            GameMode::FlappyByte => write!(f, "flappyByte"),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry wiring
// ---------------------------------------------------------------------------

/// Build a registry with the full gameplay pipeline registered in the
/// normative order: Input, Gravity, AI, Motion, Lifetime, Domain, Collision,
/// Score, Death, Animation.
///
/// `on_player_death` is invoked by the death system for input-controlled
/// entities before their id is recycled; the session layer uses it to
/// broadcast a KILLED event.
pub fn build_registry(mode: GameMode, on_player_death: Option<PlayerDeathFn>) -> Registry {
    let mut registry = Registry::new();

    match mode {
        GameMode::RType => registry.add_system(priority::INPUT, InputSystem::default()),
        GameMode::FlappyByte => registry.add_system(priority::INPUT, FlapInputSystem::default()),
    }
    registry.add_system(priority::GRAVITY, GravitySystem::default());
    registry.add_system(priority::AI, SinusoidalAiSystem::default());
    registry.add_system(priority::MOTION, MotionSystem::default());
    registry.add_system(priority::LIFETIME, LifetimeSystem::default());
    registry.add_system(priority::DOMAIN, DomainSystem::default());
    registry.add_system(priority::COLLISION, CollisionSystem::default());
    registry.add_system(priority::SCORE, ScoreSystem::default());

    let mut death = DeathSystem::default();
    death.on_player_death = on_player_death;
    registry.add_system(priority::DEATH, death);

    registry.add_system(priority::ANIMATION, AnimationSystem::default());

    tracing::info!(%mode, systems = registry.system_names().len(), "gameplay pipeline wired");
    registry
}

// ---------------------------------------------------------------------------
// Entity factories
// ---------------------------------------------------------------------------

/// Animation frame offsets for a player ship, picked by slot so each player
/// gets a different row of the sheet.
fn player_frames(player_id: u8) -> Vec<Vec2> {
    let row_y = (PLAYER_FRAME_SIZE.y * player_id as f32) % 86.0;
    [66.4, 33.2, 0.0, 33.2, 66.4, 99.6, 132.8, 99.6]
        .iter()
        .map(|&x| Vec2::new(x, row_y))
        .collect()
}

/// Create the authoritative entity for a newly joined player.
pub fn spawn_player(registry: &mut Registry, player_id: u8, mode: GameMode) -> Entity {
    let entity = registry.create();
    let spawn = Position::new(100.0, 100.0 + player_id as f32 * 50.0);

    registry.emplace(entity, InputControlled::default());
    registry.emplace(entity, Acceleration::default());
    registry.emplace(entity, spawn);
    registry.emplace(
        entity,
        Collider {
            origin_offset: Vec2::ZERO,
            self_mask: layers::PLAYER,
            other_mask: layers::PLAYER_HURT_BY,
            size: PLAYER_FRAME_SIZE,
        },
    );
    registry.emplace(entity, Health::full(1));

    match mode {
        GameMode::RType => {
            registry.emplace(entity, Velocity::with_max(PLAYER_SPEED_MAX));
            registry.emplace(entity, Damage { value: 1 });
            registry.emplace(entity, FireRate::every(PLAYER_FIRE_INTERVAL));
            registry.emplace(
                entity,
                Renderable {
                    screen_size_x: SCREEN_WIDTH,
                    screen_size_y: SCREEN_HEIGHT,
                    sheet: PLAYER_SHEET.to_owned(),
                    frames: player_frames(player_id),
                    frame_size: PLAYER_FRAME_SIZE,
                    frame_duration_ms: 1000,
                    auto_animate: false,
                    current_frame: 0,
                },
            );
        }
        GameMode::FlappyByte => {
            registry.emplace(entity, Velocity::with_max(FLAP_SPEED_MAX));
            registry.emplace(entity, Damage { value: 0 });
            registry.emplace(entity, Gravity { force: FLAP_GRAVITY });
            registry.emplace(
                entity,
                Renderable {
                    screen_size_x: SCREEN_WIDTH,
                    screen_size_y: SCREEN_HEIGHT,
                    sheet: PLAYER_SHEET.to_owned(),
                    frames: player_frames(player_id),
                    frame_size: PLAYER_FRAME_SIZE,
                    frame_duration_ms: 500,
                    auto_animate: false,
                    current_frame: 0,
                },
            );
        }
    }

    tracing::info!(player_id, %entity, %mode, "player entity created");
    entity
}

/// Spawn a player projectile at the given muzzle position.
///
/// Speed, damage, hitbox, and lifetime are server constants; clients never
/// influence them.
pub fn spawn_projectile(registry: &mut Registry, x: f32, y: f32) -> Entity {
    let entity = registry.create();

    registry.emplace(entity, Position::new(x, y));
    registry.emplace(
        entity,
        Velocity {
            x: PROJECTILE_SPEED,
            y: 0.0,
            speed_max: PROJECTILE_SPEED,
        },
    );
    registry.emplace(entity, Acceleration::default());
    registry.emplace(entity, Health::full(1));
    registry.emplace(
        entity,
        Damage {
            value: PROJECTILE_DAMAGE,
        },
    );
    registry.emplace(
        entity,
        Collider {
            origin_offset: Vec2::ZERO,
            self_mask: layers::PLAYER_SHOT,
            other_mask: layers::PLAYER_SHOT_HITS,
            size: PROJECTILE_SIZE,
        },
    );
    registry.emplace(
        entity,
        Renderable {
            screen_size_x: SCREEN_WIDTH,
            screen_size_y: SCREEN_HEIGHT,
            sheet: PROJECTILE_SHEET.to_owned(),
            frames: vec![Vec2::ZERO],
            frame_size: PROJECTILE_SIZE,
            frame_duration_ms: 100,
            auto_animate: false,
            current_frame: 0,
        },
    );
    // Motion clamps positions to the screen, so the right edge of the domain
    // sits inside the clamp range; a projectile pinned at the edge still
    // leaves the domain and gets reaped.
    registry.emplace(
        entity,
        Domain::new(0.0, 0.0, SCREEN_WIDTH - PROJECTILE_SIZE.x - 4.0, SCREEN_HEIGHT),
    );
    registry.emplace(
        entity,
        Lifetime {
            remaining: PROJECTILE_LIFETIME,
        },
    );

    entity
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
