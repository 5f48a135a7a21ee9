//! Constant downward pull for entities carrying a `Gravity` component.
//!
//! Runs before motion so the pull is integrated in the same tick. The system
//! is inert in side-scroller games simply because nothing carries `Gravity`.

use starwing_ecs::prelude::*;

use crate::components::{Gravity, Velocity};

#[derive(Default)]
pub struct GravitySystem {
    pub update_count: u64,
}

impl System for GravitySystem {
    fn name(&self) -> &'static str {
        "gravity"
    }

    fn required_components(&self, components: &mut ComponentRegistry) -> Signature {
        Signature::empty()
            .with::<Gravity>(components)
            .with::<Velocity>(components)
    }

    fn run(&mut self, registry: &mut Registry, dt: f32) {
        self.update_count += 1;
        registry.each2::<Gravity, Velocity>(|_e, gravity, vel| {
            vel.y += gravity.force * dt;
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
