//! Level loading and the timed enemy-spawn pipeline.
//!
//! A level file is a JSON object with an `entities` array; parsing is
//! permissive -- missing fields default, `textureRect` to `[0, 0, 32, 32]`.
//! The spawn list is sorted by spawn time and consumed by a monotonic
//! cursor: whenever the simulation clock passes the next entry's time, that
//! enemy is emitted into the registry.
//!
//! With an empty list the spawner falls back to a seeded random generator,
//! emitting one enemy every few seconds of simulation time.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Deserialize;
use starwing_ecs::prelude::{Entity, Registry};

use crate::components::*;
use crate::game::{layers, SCREEN_HEIGHT, SCREEN_WIDTH};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures while loading a level file. Callers are expected to log these
/// and continue with an empty spawn list.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("failed to read level file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed level JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Level file format
// ---------------------------------------------------------------------------

fn default_texture_rect() -> [f32; 4] {
    [0.0, 0.0, 32.0, 32.0]
}

#[derive(Debug, Deserialize)]
struct LevelFile {
    #[serde(default)]
    entities: Vec<LevelEntry>,
}

#[derive(Debug, Deserialize)]
struct LevelEntry {
    #[serde(default, rename = "type")]
    kind: i32,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default, rename = "spawnTime")]
    spawn_time: f32,
    #[serde(default, rename = "spritePath")]
    sprite_path: String,
    #[serde(default = "default_texture_rect", rename = "textureRect")]
    texture_rect: [f32; 4],
}

/// One scheduled enemy spawn.
#[derive(Debug, Clone, PartialEq)]
pub struct EnemySpawnData {
    pub kind: i32,
    pub x: f32,
    pub y: f32,
    pub spawn_time: f32,
    pub sprite_sheet: String,
    /// `[x, y, w, h]` of the first animation frame on the sheet.
    pub texture_rect: [f32; 4],
}

impl From<LevelEntry> for EnemySpawnData {
    fn from(entry: LevelEntry) -> Self {
        EnemySpawnData {
            kind: entry.kind,
            x: entry.x,
            y: entry.y,
            spawn_time: entry.spawn_time,
            sprite_sheet: entry.sprite_path,
            texture_rect: entry.texture_rect,
        }
    }
}

// ---------------------------------------------------------------------------
// Enemy tuning
// ---------------------------------------------------------------------------

struct EnemyTuning {
    speed: f32,
    health: i32,
    frame_duration_ms: u32,
}

fn tuning_for(kind: i32) -> EnemyTuning {
    match kind {
        1 => EnemyTuning {
            speed: 180.0,
            health: 1,
            frame_duration_ms: 1000,
        },
        2 => EnemyTuning {
            speed: 240.0,
            health: 2,
            frame_duration_ms: 800,
        },
        3 => EnemyTuning {
            speed: 150.0,
            health: 1,
            frame_duration_ms: 1200,
        },
        4 => EnemyTuning {
            speed: 300.0,
            health: 3,
            frame_duration_ms: 600,
        },
        other => {
            tracing::warn!(kind = other, "unknown enemy type, using type-1 tuning");
            EnemyTuning {
                speed: 180.0,
                health: 1,
                frame_duration_ms: 1000,
            }
        }
    }
}

/// Number of animation frames cut from the sheet per enemy.
const ENEMY_FRAME_COUNT: usize = 8;
/// Enemies die just past the left edge (motion clamps them to x = 0 first).
const ENEMY_DOMAIN_LEFT: f32 = 5.0;
/// Seconds between fallback spawns when no level is loaded.
const FALLBACK_INTERVAL: f32 = 3.0;

/// Materialise one enemy from its spawn data.
pub fn spawn_enemy(registry: &mut Registry, data: &EnemySpawnData) -> Entity {
    let tuning = tuning_for(data.kind);
    let [rect_x, rect_y, rect_w, rect_h] = data.texture_rect;

    let frames = (0..ENEMY_FRAME_COUNT)
        .map(|i| Vec2::new(rect_x + i as f32 * rect_w, rect_y))
        .collect();

    let entity = registry.create();
    registry.emplace(entity, AIControlled);
    registry.emplace(
        entity,
        SinusoidalPattern {
            amplitude: 100.0,
            frequency: 0.005,
            // Spread phases by spawn position so waves are not in lockstep.
            phase_offset: data.x * 0.01 + data.y * 0.005,
        },
    );
    registry.emplace(entity, Position::new(data.x, data.y));
    registry.emplace(
        entity,
        Velocity {
            x: -tuning.speed,
            y: 0.0,
            speed_max: tuning.speed,
        },
    );
    registry.emplace(entity, Acceleration::default());
    registry.emplace(
        entity,
        Renderable {
            screen_size_x: SCREEN_WIDTH,
            screen_size_y: SCREEN_HEIGHT,
            sheet: data.sprite_sheet.clone(),
            frames,
            frame_size: Vec2::new(rect_w, rect_h),
            frame_duration_ms: tuning.frame_duration_ms,
            auto_animate: true,
            current_frame: 0,
        },
    );
    registry.emplace(
        entity,
        Collider {
            origin_offset: Vec2::ZERO,
            self_mask: layers::ENEMY,
            other_mask: layers::ENEMY_HURT_BY,
            size: Vec2::new(rect_w, rect_h),
        },
    );
    registry.emplace(
        entity,
        Domain::new(ENEMY_DOMAIN_LEFT, 0.0, SCREEN_WIDTH, SCREEN_HEIGHT),
    );
    registry.emplace(entity, Health::full(tuning.health));
    registry.emplace(entity, Damage { value: 1 });
    registry.emplace(
        entity,
        ScoreValue {
            points: 100 * data.kind.max(1),
        },
    );

    tracing::debug!(
        kind = data.kind,
        x = data.x,
        y = data.y,
        spawn_time = data.spawn_time,
        "enemy spawned"
    );
    entity
}

// ---------------------------------------------------------------------------
// LevelSpawner
// ---------------------------------------------------------------------------

/// Time-ordered enemy spawner driven by the registry's clock.
pub struct LevelSpawner {
    spawn_list: Vec<EnemySpawnData>,
    next_to_spawn: usize,
    rng: Pcg32,
    next_fallback_at: f32,
}

impl LevelSpawner {
    /// Spawner with no scheduled enemies; the fallback generator takes over.
    pub fn empty(seed: u64) -> Self {
        Self::from_list(Vec::new(), seed)
    }

    /// Spawner over an explicit list, sorted by spawn time.
    pub fn from_list(mut spawn_list: Vec<EnemySpawnData>, seed: u64) -> Self {
        spawn_list.sort_by(|a, b| {
            a.spawn_time
                .partial_cmp(&b.spawn_time)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        LevelSpawner {
            spawn_list,
            next_to_spawn: 0,
            rng: Pcg32::seed_from_u64(seed),
            next_fallback_at: FALLBACK_INTERVAL,
        }
    }

    /// Parse a level from JSON text.
    pub fn from_json(json: &str, seed: u64) -> Result<Self, LevelError> {
        let file: LevelFile = serde_json::from_str(json)?;
        let list = file.entities.into_iter().map(EnemySpawnData::from).collect();
        Ok(Self::from_list(list, seed))
    }

    /// Read and parse a level file.
    pub fn load(path: &std::path::Path, seed: u64) -> Result<Self, LevelError> {
        let text = std::fs::read_to_string(path)?;
        let spawner = Self::from_json(&text, seed)?;
        tracing::info!(
            path = %path.display(),
            enemies = spawner.spawn_list.len(),
            "level loaded"
        );
        Ok(spawner)
    }

    /// Number of scheduled spawns not yet emitted.
    pub fn pending(&self) -> usize {
        self.spawn_list.len() - self.next_to_spawn
    }

    /// Position of the spawn cursor; never retreats.
    pub fn cursor(&self) -> usize {
        self.next_to_spawn
    }

    /// Emit every enemy whose spawn time the clock has passed.
    ///
    /// With an empty spawn list, emits one randomly placed enemy every
    /// [`FALLBACK_INTERVAL`] seconds of simulation time instead.
    pub fn update(&mut self, registry: &mut Registry) {
        let now = registry.clock().total_time;

        if self.spawn_list.is_empty() {
            while now >= self.next_fallback_at {
                let data = EnemySpawnData {
                    kind: self.rng.gen_range(1..=4),
                    x: SCREEN_WIDTH - 20.0,
                    y: self.rng.gen_range(10.0..SCREEN_HEIGHT - 10.0),
                    spawn_time: self.next_fallback_at,
                    sprite_sheet: String::new(),
                    texture_rect: default_texture_rect(),
                };
                spawn_enemy(registry, &data);
                self.next_fallback_at += FALLBACK_INTERVAL;
            }
            return;
        }

        while self.next_to_spawn < self.spawn_list.len()
            && now >= self.spawn_list[self.next_to_spawn].spawn_time
        {
            let data = self.spawn_list[self.next_to_spawn].clone();
            spawn_enemy(registry, &data);
            self.next_to_spawn += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
