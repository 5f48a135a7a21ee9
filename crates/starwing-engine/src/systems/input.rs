//! Side-scroller input handling.
//!
//! Translates the pressed-key set of every input-controlled entity into
//! acceleration, and spawns projectiles on the shoot key. Projectile spawns
//! are collected during the join and flushed afterwards.

use starwing_ecs::prelude::*;

use crate::components::{Acceleration, FireRate, InputControlled, Position};
use crate::game::{spawn_projectile, PLAYER_ACCELERATION};

/// Key codes carried in `InputControlled::pressed_keys`.
pub const KEY_UP: u8 = 0;
pub const KEY_DOWN: u8 = 1;
pub const KEY_LEFT: u8 = 2;
pub const KEY_RIGHT: u8 = 3;
pub const KEY_SHOOT: u8 = 4;

/// Input handler for the side-scroller mode: directional keys set
/// acceleration, shoot spawns a projectile at the player's position.
#[derive(Default)]
pub struct InputSystem {
    pub update_count: u64,
}

impl System for InputSystem {
    fn name(&self) -> &'static str {
        "input"
    }

    fn required_components(&self, components: &mut ComponentRegistry) -> Signature {
        Signature::empty()
            .with::<InputControlled>(components)
            .with::<Acceleration>(components)
    }

    fn run(&mut self, registry: &mut Registry, _dt: f32) {
        self.update_count += 1;
        let now = registry.clock().total_time;

        let mut shooters: Vec<Entity> = Vec::new();
        registry.each3::<InputControlled, Acceleration, Position>(|e, input, acc, _pos| {
            acc.x = 0.0;
            acc.y = 0.0;
            acc.decelerate = true;

            for &key in &input.pressed_keys {
                match key {
                    KEY_UP => acc.y = -PLAYER_ACCELERATION,
                    KEY_DOWN => acc.y = PLAYER_ACCELERATION,
                    KEY_LEFT => acc.x = -PLAYER_ACCELERATION,
                    KEY_RIGHT => acc.x = PLAYER_ACCELERATION,
                    KEY_SHOOT => shooters.push(e),
                    other => tracing::trace!(key = other, "ignoring unknown key code"),
                }
            }
            if !input.pressed_keys.is_empty() {
                input.first_input = true;
            }
        });

        for e in shooters {
            // Entities with a FireRate only shoot when the cooldown allows.
            if let Some(rate) = registry.get_mut::<FireRate>(e) {
                if now - rate.last_fired < rate.interval {
                    continue;
                }
                rate.last_fired = now;
            }
            if let Some(pos) = registry.get::<Position>(e).copied() {
                spawn_projectile(registry, pos.x, pos.y);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Health, Velocity};
    use crate::game::{build_registry, spawn_player, GameMode};

    fn press(registry: &mut Registry, e: Entity, key: u8) {
        registry
            .get_mut::<InputControlled>(e)
            .expect("player has input component")
            .pressed_keys
            .push(key);
    }

    #[test]
    fn directional_keys_set_acceleration() {
        let mut registry = build_registry(GameMode::RType, None);
        let player = spawn_player(&mut registry, 0, GameMode::RType);

        press(&mut registry, player, KEY_RIGHT);
        press(&mut registry, player, KEY_UP);
        registry.update(1.0 / 60.0);

        let acc = registry.get::<Acceleration>(player).unwrap();
        assert_eq!(acc.x, PLAYER_ACCELERATION);
        assert_eq!(acc.y, -PLAYER_ACCELERATION);
        assert!(acc.decelerate);
    }

    #[test]
    fn acceleration_resets_when_keys_release() {
        let mut registry = build_registry(GameMode::RType, None);
        let player = spawn_player(&mut registry, 0, GameMode::RType);

        press(&mut registry, player, KEY_LEFT);
        registry.update(1.0 / 60.0);
        registry
            .get_mut::<InputControlled>(player)
            .unwrap()
            .pressed_keys
            .clear();
        registry.update(1.0 / 60.0);

        let acc = registry.get::<Acceleration>(player).unwrap();
        assert_eq!(acc.x, 0.0);
        assert_eq!(acc.y, 0.0);
    }

    #[test]
    fn shoot_spawns_a_projectile_with_fixed_tuning() {
        let mut registry = build_registry(GameMode::RType, None);
        let player = spawn_player(&mut registry, 0, GameMode::RType);
        let before = registry.alive();

        press(&mut registry, player, KEY_SHOOT);
        registry.update(1.0 / 60.0);

        assert_eq!(registry.alive(), before + 1);
        // The projectile starts at the player's position.
        let player_pos = *registry.get::<Position>(player).unwrap();
        let mut projectile_found = false;
        registry.each2::<Velocity, Health>(|e, vel, _hp| {
            if e != player && vel.x > 0.0 {
                projectile_found = true;
            }
        });
        assert!(projectile_found);
        assert!(player_pos.x >= 100.0);
    }

    #[test]
    fn fire_rate_gates_repeated_shots() {
        let mut registry = build_registry(GameMode::RType, None);
        let player = spawn_player(&mut registry, 0, GameMode::RType);
        press(&mut registry, player, KEY_SHOOT);

        // Hold shoot over several ticks; the 0.15 s cooldown admits only the
        // first shot within the first two 1/60 s frames.
        registry.update(1.0 / 60.0);
        registry.update(1.0 / 60.0);

        // player + exactly one projectile
        assert_eq!(registry.alive(), 2);
    }

    #[test]
    fn first_input_latches() {
        let mut registry = build_registry(GameMode::RType, None);
        let player = spawn_player(&mut registry, 0, GameMode::RType);
        assert!(!registry.get::<InputControlled>(player).unwrap().first_input);

        press(&mut registry, player, KEY_DOWN);
        registry.update(1.0 / 60.0);
        assert!(registry.get::<InputControlled>(player).unwrap().first_input);
    }
}
