//! Velocity integration and screen-bounds clamping.
//!
//! Per entity and tick, in this order:
//! 1. velocity += acceleration·dt, clamped per axis to ±speed_max;
//! 2. position += velocity·dt, clamped to `[0, screen − collider size]`;
//! 3. if the acceleration requests deceleration, 600 px/s² of friction is
//!    applied toward zero on each axis, bounded by the current speed.
//!
//! Friction after the position update means a one-tick overshoot cannot
//! leave the bounds.

use starwing_ecs::prelude::*;

use crate::components::{Acceleration, Collider, Position, Renderable, Velocity};

/// Friction applied while decelerating, px/s².
pub const FRICTION: f32 = 600.0;

#[derive(Default)]
pub struct MotionSystem {
    pub update_count: u64,
}

impl System for MotionSystem {
    fn name(&self) -> &'static str {
        "motion"
    }

    fn required_components(&self, components: &mut ComponentRegistry) -> Signature {
        Signature::empty()
            .with::<Position>(components)
            .with::<Velocity>(components)
            .with::<Acceleration>(components)
            .with::<Renderable>(components)
            .with::<Collider>(components)
    }

    fn run(&mut self, registry: &mut Registry, dt: f32) {
        self.update_count += 1;

        registry.each5::<Position, Velocity, Acceleration, Renderable, Collider>(
            |_e, pos, vel, acc, render, collider| {
                vel.x = (vel.x + acc.x * dt).clamp(-vel.speed_max, vel.speed_max);
                vel.y = (vel.y + acc.y * dt).clamp(-vel.speed_max, vel.speed_max);

                let max_x = (render.screen_size_x - collider.size.x).max(0.0);
                let max_y = (render.screen_size_y - collider.size.y).max(0.0);
                pos.x = (pos.x + vel.x * dt).clamp(0.0, max_x);
                pos.y = (pos.y + vel.y * dt).clamp(0.0, max_y);

                if acc.decelerate {
                    vel.x = if vel.x > 0.0 {
                        (vel.x - FRICTION * dt).max(0.0)
                    } else {
                        (vel.x + FRICTION * dt).min(0.0)
                    };
                    vel.y = if vel.y > 0.0 {
                        (vel.y - FRICTION * dt).max(0.0)
                    } else {
                        (vel.y + FRICTION * dt).min(0.0)
                    };
                }
            },
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
