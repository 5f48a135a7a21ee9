//! Frame advance for auto-animated renderables.
//!
//! The current frame is derived from the simulation clock's total time, not
//! the wall clock, so replaying the same inputs yields the same frames.

use starwing_ecs::prelude::*;

use crate::components::Renderable;

#[derive(Default)]
pub struct AnimationSystem {
    pub update_count: u64,
}

impl System for AnimationSystem {
    fn name(&self) -> &'static str {
        "animation"
    }

    fn required_components(&self, components: &mut ComponentRegistry) -> Signature {
        Signature::empty().with::<Renderable>(components)
    }

    fn run(&mut self, registry: &mut Registry, _dt: f32) {
        self.update_count += 1;
        let elapsed_ms = (registry.clock().total_time * 1000.0) as u64;

        registry.each1::<Renderable>(|_e, render| {
            if render.auto_animate && !render.frames.is_empty() && render.frame_duration_ms > 0 {
                render.current_frame =
                    ((elapsed_ms / render.frame_duration_ms as u64) % render.frames.len() as u64)
                        as usize;
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
    use crate::components::Vec2;

    fn spawn_animated(registry: &mut Registry, frame_duration_ms: u32, auto: bool) -> Entity {
        let e = registry.create();
        registry.emplace(
            e,
            Renderable {
                screen_size_x: 1920.0,
                screen_size_y: 1080.0,
                sheet: "sheet.png".to_owned(),
                frames: vec![
                    Vec2::new(0.0, 0.0),
                    Vec2::new(32.0, 0.0),
                    Vec2::new(64.0, 0.0),
                ],
                frame_size: Vec2::new(32.0, 32.0),
                frame_duration_ms,
                auto_animate: auto,
                current_frame: 0,
            },
        );
        e
    }

    #[test]
    fn frames_advance_with_simulation_time() {
        let mut registry = Registry::new();
        registry.clock_mut().fixed_delta_time = 0.1;
        registry.add_system(0, AnimationSystem::default());
        let e = spawn_animated(&mut registry, 100, true);

        registry.update(0.1); // total_time 0.1s -> frame 1
        assert_eq!(registry.get::<Renderable>(e).unwrap().current_frame, 1);

        registry.update(0.1); // 0.2s -> frame 2
        assert_eq!(registry.get::<Renderable>(e).unwrap().current_frame, 2);

        registry.update(0.1); // 0.3s -> wraps to frame 0
        assert_eq!(registry.get::<Renderable>(e).unwrap().current_frame, 0);
    }

    #[test]
    fn static_renderables_keep_their_frame() {
        let mut registry = Registry::new();
        registry.clock_mut().fixed_delta_time = 0.1;
        registry.add_system(0, AnimationSystem::default());
        let e = spawn_animated(&mut registry, 100, false);

        for _ in 0..5 {
            registry.update(0.1);
        }
        assert_eq!(registry.get::<Renderable>(e).unwrap().current_frame, 0);
    }
}
