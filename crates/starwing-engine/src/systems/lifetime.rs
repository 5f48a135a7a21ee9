//! Bounded entity lifetimes.
//!
//! Counts down `Lifetime::remaining` and destroys entities at zero, so
//! projectiles and transient effects cannot accumulate.

use starwing_ecs::prelude::*;

use crate::components::Lifetime;

#[derive(Default)]
pub struct LifetimeSystem {
    pub update_count: u64,
}

impl System for LifetimeSystem {
    fn name(&self) -> &'static str {
        "lifetime"
    }

    fn required_components(&self, components: &mut ComponentRegistry) -> Signature {
        Signature::empty().with::<Lifetime>(components)
    }

    fn run(&mut self, registry: &mut Registry, dt: f32) {
        self.update_count += 1;

        let mut expired = Vec::new();
        registry.each1::<Lifetime>(|e, lifetime| {
            lifetime.remaining -= dt;
            if lifetime.remaining <= 0.0 {
                expired.push(e);
            }
        });
        for e in expired {
            tracing::trace!(%e, "lifetime expired");
            let _ = registry.destroy(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_survives_until_its_time_runs_out() {
        let mut registry = Registry::new();
        registry.clock_mut().fixed_delta_time = 0.1;
        registry.add_system(0, LifetimeSystem::default());

        let e = registry.create();
        registry.emplace(e, Lifetime { remaining: 0.25 });

        registry.update(0.1);
        registry.update(0.1);
        assert!(registry.is_alive(e));

        registry.update(0.1);
        assert!(!registry.is_alive(e));
    }

    #[test]
    fn unrelated_entities_are_untouched() {
        let mut registry = Registry::new();
        registry.clock_mut().fixed_delta_time = 0.1;
        registry.add_system(0, LifetimeSystem::default());

        let doomed = registry.create();
        registry.emplace(doomed, Lifetime { remaining: 0.05 });
        let bystander = registry.create();

        registry.update(0.1);
        assert!(!registry.is_alive(doomed));
        assert!(registry.is_alive(bystander));
    }
}
