//! Domain clipping.
//!
//! Destroys any entity whose position leaves its inclusive domain
//! rectangle. Runs before collision so entities that left the play area
//! never enter the broad-phase grid.

use starwing_ecs::prelude::*;

use crate::components::{Domain, Position};

#[derive(Default)]
pub struct DomainSystem {
    pub update_count: u64,
}

impl System for DomainSystem {
    fn name(&self) -> &'static str {
        "domain"
    }

    fn required_components(&self, components: &mut ComponentRegistry) -> Signature {
        Signature::empty()
            .with::<Position>(components)
            .with::<Domain>(components)
    }

    fn run(&mut self, registry: &mut Registry, _dt: f32) {
        self.update_count += 1;

        let mut escaped = Vec::new();
        registry.each2::<Position, Domain>(|e, pos, domain| {
            if pos.x < domain.ax || pos.x > domain.bx || pos.y < domain.ay || pos.y > domain.by {
                escaped.push(e);
            }
        });
        for e in escaped {
            tracing::trace!(%e, "entity left its domain");
            let _ = registry.destroy(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
