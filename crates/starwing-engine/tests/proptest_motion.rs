//! Property tests for the motion pipeline: wherever an entity starts and
//! however it accelerates, after any number of ticks it is inside the
//! screen and its speed is inside the clamp.

use proptest::prelude::*;
use starwing_engine::prelude::*;
use starwing_engine::systems::MotionSystem;

fn finite(range: std::ops::Range<i32>) -> impl Strategy<Value = f32> {
    range.prop_map(|v| v as f32 * 0.5)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn motion_keeps_entities_inside_the_screen(
        start_x in finite(0..3840),
        start_y in finite(0..2160),
        vel_x in finite(-2000..2000),
        vel_y in finite(-2000..2000),
        acc_x in finite(-8000..8000),
        acc_y in finite(-8000..8000),
        speed_max in finite(1..2000),
        decelerate in any::<bool>(),
        ticks in 1..120u32,
    ) {
        let mut registry = Registry::new();
        registry.add_system(0, MotionSystem::default());

        let e = registry.create();
        registry.emplace(e, Position::new(start_x, start_y));
        registry.emplace(e, Velocity { x: vel_x, y: vel_y, speed_max });
        registry.emplace(e, Acceleration { x: acc_x, y: acc_y, decelerate });
        registry.emplace(e, Renderable {
            screen_size_x: SCREEN_WIDTH,
            screen_size_y: SCREEN_HEIGHT,
            ..Default::default()
        });
        registry.emplace(e, Collider {
            origin_offset: Vec2::ZERO,
            self_mask: 0,
            other_mask: 0,
            size: Vec2::new(32.0, 32.0),
        });

        for _ in 0..ticks {
            registry.update(1.0 / 60.0);
        }

        let pos = registry.get::<Position>(e).unwrap();
        prop_assert!(pos.x >= 0.0 && pos.x <= SCREEN_WIDTH - 32.0, "x out of bounds: {}", pos.x);
        prop_assert!(pos.y >= 0.0 && pos.y <= SCREEN_HEIGHT - 32.0, "y out of bounds: {}", pos.y);

        let vel = registry.get::<Velocity>(e).unwrap();
        prop_assert!(vel.x.abs() <= speed_max, "vx exceeds clamp: {}", vel.x);
        prop_assert!(vel.y.abs() <= speed_max, "vy exceeds clamp: {}", vel.y);
    }

    #[test]
    fn friction_never_reverses_direction(
        vel_x in finite(-1000..1000),
        ticks in 1..200u32,
    ) {
        let mut registry = Registry::new();
        registry.add_system(0, MotionSystem::default());

        let e = registry.create();
        registry.emplace(e, Position::new(960.0, 540.0));
        registry.emplace(e, Velocity { x: vel_x, y: 0.0, speed_max: 2000.0 });
        registry.emplace(e, Acceleration { x: 0.0, y: 0.0, decelerate: true });
        registry.emplace(e, Renderable {
            screen_size_x: SCREEN_WIDTH,
            screen_size_y: SCREEN_HEIGHT,
            ..Default::default()
        });
        registry.emplace(e, Collider {
            origin_offset: Vec2::ZERO,
            self_mask: 0,
            other_mask: 0,
            size: Vec2::new(32.0, 32.0),
        });

        let start_sign = vel_x.signum();
        for _ in 0..ticks {
            registry.update(1.0 / 60.0);
            let vel = registry.get::<Velocity>(e).unwrap();
            prop_assert!(
                vel.x == 0.0 || vel.x.signum() == start_sign,
                "friction flipped velocity from {} to {}",
                vel_x,
                vel.x
            );
        }
    }
}
