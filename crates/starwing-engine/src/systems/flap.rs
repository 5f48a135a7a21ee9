//! Flap-mode input handling.
//!
//! In flap mode the only meaningful input is the shoot key, which applies a
//! one-shot upward impulse. Gravity does the rest.

use starwing_ecs::prelude::*;

use crate::components::{InputControlled, Velocity};
use crate::game::FLAP_IMPULSE;
use crate::systems::input::KEY_SHOOT;

/// Input handler for flap mode: shoot flaps, everything else is ignored.
#[derive(Default)]
pub struct FlapInputSystem {
    pub update_count: u64,
}

impl System for FlapInputSystem {
    fn name(&self) -> &'static str {
        "flap_input"
    }

    fn required_components(&self, components: &mut ComponentRegistry) -> Signature {
        Signature::empty()
            .with::<InputControlled>(components)
            .with::<Velocity>(components)
    }

    fn run(&mut self, registry: &mut Registry, _dt: f32) {
        self.update_count += 1;

        registry.each2::<InputControlled, Velocity>(|_e, input, vel| {
            if !input.first_input && !input.pressed_keys.is_empty() {
                input.first_input = true;
            }
            if input.pressed_keys.contains(&KEY_SHOOT) {
                vel.y = -FLAP_IMPULSE;
                // One impulse per press: the key re-arms on the next PRESS.
                input.pressed_keys.retain(|&k| k != KEY_SHOOT);
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{build_registry, spawn_player, GameMode};

    #[test]
    fn flap_applies_one_shot_impulse() {
        let mut registry = build_registry(GameMode::FlappyByte, None);
        let player = spawn_player(&mut registry, 0, GameMode::FlappyByte);
        registry
            .get_mut::<InputControlled>(player)
            .unwrap()
            .pressed_keys
            .push(KEY_SHOOT);

        registry.update(1.0 / 60.0);
        let vel = registry.get::<Velocity>(player).unwrap();
        // Gravity already pulled a fraction off the impulse this tick.
        assert!(vel.y < 0.0, "flap should move the player upward, vy={}", vel.y);

        // The key is consumed: further ticks only see gravity.
        let vy_after_flap = vel.y;
        registry.update(1.0 / 60.0);
        let vel = registry.get::<Velocity>(player).unwrap();
        assert!(vel.y > vy_after_flap);
        assert!(registry
            .get::<InputControlled>(player)
            .unwrap()
            .pressed_keys
            .is_empty());
    }

    #[test]
    fn first_input_latch_survives_key_consumption() {
        let mut registry = build_registry(GameMode::FlappyByte, None);
        let player = spawn_player(&mut registry, 0, GameMode::FlappyByte);
        registry
            .get_mut::<InputControlled>(player)
            .unwrap()
            .pressed_keys
            .push(KEY_SHOOT);

        registry.update(1.0 / 60.0);
        assert!(registry.get::<InputControlled>(player).unwrap().first_input);
    }
}
