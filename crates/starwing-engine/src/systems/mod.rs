//! Built-in gameplay systems.
//!
//! Each submodule holds one system. The normative tick order is wired by
//! [`build_registry`](crate::game::build_registry); see the priority
//! constants in [`crate::game::priority`].

pub mod ai;
pub mod animation;
pub mod collision;
pub mod death;
pub mod domain;
pub mod flap;
pub mod gravity;
pub mod input;
pub mod lifetime;
pub mod motion;
pub mod score;

pub use ai::SinusoidalAiSystem;
pub use animation::AnimationSystem;
pub use collision::CollisionSystem;
pub use death::{DeathSystem, PlayerDeathFn};
pub use domain::DomainSystem;
pub use flap::FlapInputSystem;
pub use gravity::GravitySystem;
pub use input::InputSystem;
pub use lifetime::LifetimeSystem;
pub use motion::MotionSystem;
pub use score::ScoreSystem;
