//! Death materialisation.
//!
//! Destroys every entity whose health has reached exactly zero. For
//! input-controlled entities the `on_player_death` hook fires *before* the
//! id is recycled, so the session layer can broadcast a KILLED event while
//! the entity id still maps to a slot.

use starwing_ecs::prelude::*;

use crate::components::{Health, InputControlled};

/// Hook invoked with a dying player's entity id.
pub type PlayerDeathFn = Box<dyn FnMut(Entity) + Send>;

#[derive(Default)]
pub struct DeathSystem {
    pub update_count: u64,
    /// Fired for input-controlled entities before destruction.
    pub on_player_death: Option<PlayerDeathFn>,
}

impl System for DeathSystem {
    fn name(&self) -> &'static str {
        "death"
    }

    fn required_components(&self, components: &mut ComponentRegistry) -> Signature {
        Signature::empty().with::<Health>(components)
    }

    fn run(&mut self, registry: &mut Registry, _dt: f32) {
        self.update_count += 1;

        let mut dead = Vec::new();
        registry.each1::<Health>(|e, health| {
            if health.current == 0 {
                dead.push(e);
            }
        });

        for e in dead {
            if registry.has::<InputControlled>(e) {
                tracing::info!(%e, "player entity died");
                if let Some(hook) = &mut self.on_player_death {
                    hook(e);
                }
            }
            let _ = registry.destroy(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
