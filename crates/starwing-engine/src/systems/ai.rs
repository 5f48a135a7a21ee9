//! Sinusoidal enemy movement.
//!
//! Gives AI-controlled entities a wave-shaped flight path by deriving the
//! vertical velocity from the horizontal one (chain rule on
//! `y = A·sin(f·x + φ)`), so faster enemies traverse their wave faster.
//! Must run before motion so the computed velocity is integrated in the same
//! tick.

use starwing_ecs::prelude::*;

use crate::components::{AIControlled, Collider, Position, Renderable, SinusoidalPattern, Velocity};

/// Safety margin kept from the screen edges, in pixels.
const EDGE_MARGIN: f32 = 10.0;

#[derive(Default)]
pub struct SinusoidalAiSystem {
    pub update_count: u64,
}

impl System for SinusoidalAiSystem {
    fn name(&self) -> &'static str {
        "sinusoidal_ai"
    }

    fn required_components(&self, components: &mut ComponentRegistry) -> Signature {
        Signature::empty()
            .with::<AIControlled>(components)
            .with::<SinusoidalPattern>(components)
            .with::<Position>(components)
            .with::<Velocity>(components)
            .with::<Renderable>(components)
            .with::<Collider>(components)
    }

    fn run(&mut self, registry: &mut Registry, _dt: f32) {
        self.update_count += 1;

        registry.each6::<AIControlled, SinusoidalPattern, Position, Velocity, Renderable, Collider>(
            |_e, _ai, pattern, pos, vel, render, collider| {
                // Shrink the amplitude near the screen edges so the wave can
                // never push the entity out of view.
                let top_margin = pos.y;
                let bottom_margin = render.screen_size_y - pos.y - collider.size.y;
                let safe_amplitude = pattern
                    .amplitude
                    .min(top_margin - EDGE_MARGIN)
                    .min(bottom_margin - EDGE_MARGIN);

                if safe_amplitude > 0.0 {
                    let wave_phase = pos.x * pattern.frequency + pattern.phase_offset;
                    // dy/dt = A·f·cos(f·x + φ) · dx/dt
                    vel.y = safe_amplitude * pattern.frequency * wave_phase.cos() * vel.x.abs();
                } else {
                    vel.y = 0.0;
                }
            },
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
