//! Score accumulation.
//!
//! Adds the `ScoreValue` of every entity whose health has reached zero to a
//! running total. Runs between collision and death so kills are counted in
//! the tick they are materialised.

use starwing_ecs::prelude::*;

use crate::components::{Health, ScoreValue};

#[derive(Default)]
pub struct ScoreSystem {
    pub update_count: u64,
    /// Total points accumulated over the game.
    pub score: i64,
}

impl System for ScoreSystem {
    fn name(&self) -> &'static str {
        "score"
    }

    fn required_components(&self, components: &mut ComponentRegistry) -> Signature {
        Signature::empty()
            .with::<ScoreValue>(components)
            .with::<Health>(components)
    }

    fn run(&mut self, registry: &mut Registry, _dt: f32) {
        self.update_count += 1;

        let mut gained: i64 = 0;
        registry.each2::<ScoreValue, Health>(|_e, value, health| {
            if health.current == 0 {
                gained += value.points as i64;
            }
        });
        if gained != 0 {
            self.score += gained;
            tracing::debug!(gained, total = self.score, "score awarded");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
