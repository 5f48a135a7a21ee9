//! Gameplay component definitions.
//!
//! Components are plain data; all behaviour lives in the systems. The
//! server-side [`Renderable`] carries only semantic data (screen bounds,
//! sheet path, frame table) -- sprite handles are a client concern.

use serde::{Deserialize, Serialize};
use starwing_ecs::prelude::Component;

// ---------------------------------------------------------------------------
// Vec2
// ---------------------------------------------------------------------------

/// Two-component float vector used for positions, sizes, and frame offsets.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

// ---------------------------------------------------------------------------
// Spatial components
// ---------------------------------------------------------------------------

/// World-space location in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Component for Position {
    const NAME: &'static str = "position";
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Position { x, y }
    }
}

/// Per-axis speed in px/s, clamped to `speed_max` by the motion system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
    /// Per-axis clamp magnitude.
    pub speed_max: f32,
}

impl Component for Velocity {
    const NAME: &'static str = "velocity";
}

impl Velocity {
    /// At rest, with the given speed cap.
    pub const fn with_max(speed_max: f32) -> Self {
        Velocity {
            x: 0.0,
            y: 0.0,
            speed_max,
        }
    }
}

/// Per-tick force in px/s². When `decelerate` is set the motion system
/// applies 600 px/s² friction toward zero on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Acceleration {
    pub x: f32,
    pub y: f32,
    pub decelerate: bool,
}

impl Component for Acceleration {
    const NAME: &'static str = "acceleration";
}

/// Inclusive bounding rectangle; an entity whose position leaves it is
/// destroyed by the domain system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub ax: f32,
    pub ay: f32,
    pub bx: f32,
    pub by: f32,
}

impl Component for Domain {
    const NAME: &'static str = "domain";
}

impl Domain {
    pub const fn new(ax: f32, ay: f32, bx: f32, by: f32) -> Self {
        Domain { ax, ay, bx, by }
    }
}

// ---------------------------------------------------------------------------
// Combat components
// ---------------------------------------------------------------------------

/// AABB hitbox plus the two 8-bit layer masks gating collisions.
///
/// A pair `(a, b)` collides iff `a.self_mask & b.other_mask != 0` and
/// `b.self_mask & a.other_mask != 0` -- both sides must name each other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    /// Offset from the entity position to the hitbox origin.
    pub origin_offset: Vec2,
    /// Layer bits this entity occupies.
    pub self_mask: u8,
    /// Layer bits this entity is hurt by.
    pub other_mask: u8,
    /// Hitbox extent in pixels.
    pub size: Vec2,
}

impl Component for Collider {
    const NAME: &'static str = "collider";
}

/// Hit points; the death system reaps entities at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Component for Health {
    const NAME: &'static str = "health";
}

impl Health {
    pub const fn full(max: i32) -> Self {
        Health { current: max, max }
    }
}

/// Damage dealt on contact.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Damage {
    pub value: i32,
}

impl Component for Damage {
    const NAME: &'static str = "damage";
}

// ---------------------------------------------------------------------------
// Presentation components
// ---------------------------------------------------------------------------

/// Semantic render description: screen bounds (authoritative for motion
/// clamping), sheet path, and the frame table for animation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Renderable {
    pub screen_size_x: f32,
    pub screen_size_y: f32,
    pub sheet: String,
    /// Top-left corner of each animation frame on the sheet.
    pub frames: Vec<Vec2>,
    pub frame_size: Vec2,
    pub frame_duration_ms: u32,
    pub auto_animate: bool,
    pub current_frame: usize,
}

impl Component for Renderable {
    const NAME: &'static str = "renderable";
}

/// On-screen text attached to an entity (HUD labels, usernames).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Text {
    pub content: String,
}

impl Component for Text {
    const NAME: &'static str = "text";
}

/// Sound cue request; consumed client-side.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Audio {
    pub sound: String,
    pub looped: bool,
}

impl Component for Audio {
    const NAME: &'static str = "audio";
}

// ---------------------------------------------------------------------------
// Control components
// ---------------------------------------------------------------------------

/// Marks an entity as driven by a player; holds the currently pressed keys.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InputControlled {
    /// Key codes currently held (0=up, 1=down, 2=left, 3=right, 4=shoot).
    pub pressed_keys: Vec<u8>,
    /// Latched once the first input arrives (flap mode waits for it).
    pub first_input: bool,
}

impl Component for InputControlled {
    const NAME: &'static str = "input_controlled";
}

/// Marker for AI-driven entities.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AIControlled;

impl Component for AIControlled {
    const NAME: &'static str = "ai_controlled";
}

/// Wave parameters for the sinusoidal AI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SinusoidalPattern {
    /// Maximum vertical displacement in pixels.
    pub amplitude: f32,
    /// Wave tightness in radians per pixel of horizontal travel.
    pub frequency: f32,
    /// Phase shift so enemies sharing a pattern do not move in lockstep.
    pub phase_offset: f32,
}

impl Component for SinusoidalPattern {
    const NAME: &'static str = "sinusoidal_pattern";
}

impl Default for SinusoidalPattern {
    fn default() -> Self {
        SinusoidalPattern {
            amplitude: 100.0,
            frequency: 0.005,
            phase_offset: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Small value components
// ---------------------------------------------------------------------------

/// Constant downward pull in px/s², applied by the gravity system.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Gravity {
    pub force: f32,
}

impl Component for Gravity {
    const NAME: &'static str = "gravity";
}

/// Minimum seconds between shots for an input-controlled entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireRate {
    pub interval: f32,
    /// Simulation time of the last shot.
    pub last_fired: f32,
}

impl Component for FireRate {
    const NAME: &'static str = "fire_rate";
}

impl FireRate {
    pub const fn every(interval: f32) -> Self {
        FireRate {
            interval,
            last_fired: f32::NEG_INFINITY,
        }
    }
}

/// Seconds left to live; the lifetime system destroys at zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Lifetime {
    pub remaining: f32,
}

impl Component for Lifetime {
    const NAME: &'static str = "lifetime";
}

/// Points granted when this entity dies.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreValue {
    pub points: i32,
}

impl Component for ScoreValue {
    const NAME: &'static str = "score_value";
}

/// Effect applied to whoever collects this entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OnPickup {
    Heal(i32),
    SpeedBoost(f32),
    Score(i32),
}

impl Component for OnPickup {
    const NAME: &'static str = "on_pickup";
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec2_add() {
        let v = Vec2::new(1.0, 2.0) + Vec2::new(3.0, -1.0);
        assert_eq!(v, Vec2::new(4.0, 1.0));
    }

    #[test]
    fn health_full_starts_at_max() {
        let hp = Health::full(3);
        assert_eq!(hp.current, 3);
        assert_eq!(hp.max, 3);
    }

    #[test]
    fn fire_rate_starts_ready() {
        let fr = FireRate::every(0.2);
        // last_fired is far in the past so the first shot is never gated.
        assert!(0.0 - fr.last_fired >= fr.interval);
    }

    #[test]
    fn component_names_are_distinct() {
        let names = [
            Position::NAME,
            Velocity::NAME,
            Acceleration::NAME,
            Collider::NAME,
            Health::NAME,
            Damage::NAME,
            Domain::NAME,
            Renderable::NAME,
            InputControlled::NAME,
            AIControlled::NAME,
            SinusoidalPattern::NAME,
            Gravity::NAME,
            FireRate::NAME,
            Lifetime::NAME,
            ScoreValue::NAME,
            OnPickup::NAME,
            Audio::NAME,
            Text::NAME,
        ];
        let mut dedup = names.to_vec();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), names.len());
    }
}
