//! Fixed-timestep simulation clock.
//!
//! The [`GameClock`] decouples simulated-time progression from wall-clock
//! jitter through an accumulator: each [`advance`](GameClock::advance) call
//! banks scaled real time and pays it out as whole fixed steps, at most five
//! per call so a stalled host cannot trigger a spiral of death.

/// Accumulator-based fixed-step scheduler.
#[derive(Debug, Clone)]
pub struct GameClock {
    /// Simulated seconds elapsed across all completed steps.
    pub total_time: f32,
    /// Seconds of simulated time per fixed step.
    pub fixed_delta_time: f32,
    /// Number of completed fixed steps.
    pub frame_count: u64,
    /// Multiplier applied to incoming real time (1.0 = real time).
    pub time_scale: f32,
    accumulator: f32,
}

/// Upper bound on steps issued per `advance` call.
const MAX_STEPS_PER_UPDATE: u32 = 5;

impl Default for GameClock {
    /// 60 Hz, real-time scale.
    fn default() -> Self {
        Self {
            total_time: 0.0,
            fixed_delta_time: 1.0 / 60.0,
            frame_count: 0,
            time_scale: 1.0,
            accumulator: 0.0,
        }
    }
}

impl GameClock {
    /// Create a clock with the given step size in seconds.
    pub fn with_fixed_dt(fixed_delta_time: f32) -> Self {
        assert!(
            fixed_delta_time > 0.0 && fixed_delta_time.is_finite(),
            "fixed_delta_time must be positive and finite, got {fixed_delta_time}"
        );
        Self {
            fixed_delta_time,
            ..Self::default()
        }
    }

    /// Bank `real_dt` seconds of wall time and return how many whole fixed
    /// steps became due, capped at five. Fractional remainder carries over.
    pub fn advance(&mut self, real_dt: f32) -> u32 {
        self.accumulator += real_dt * self.time_scale;

        let mut steps = 0;
        while self.accumulator >= self.fixed_delta_time && steps < MAX_STEPS_PER_UPDATE {
            self.total_time += self.fixed_delta_time;
            self.frame_count += 1;
            self.accumulator -= self.fixed_delta_time;
            steps += 1;
        }
        steps
    }

    /// The dt handed to systems for one step.
    pub fn step_dt(&self) -> f32 {
        self.fixed_delta_time * self.time_scale
    }

    /// Fraction of the next step already banked, for render interpolation.
    pub fn interpolation_alpha(&self) -> f32 {
        self.accumulator / self.fixed_delta_time
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_step_until_a_full_interval_banks() {
        let mut clock = GameClock::default();
        assert_eq!(clock.advance(0.010), 0);
        assert_eq!(clock.frame_count, 0);
        // 10ms + 7ms crosses 1/60s.
        assert_eq!(clock.advance(0.007), 1);
        assert_eq!(clock.frame_count, 1);
    }

    #[test]
    fn large_delta_is_capped_at_five_steps() {
        let mut clock = GameClock::default();
        // A full second owes 60 steps but only 5 are issued.
        assert_eq!(clock.advance(1.0), 5);
        assert_eq!(clock.frame_count, 5);
    }

    #[test]
    fn fractional_remainder_carries_over() {
        let mut clock = GameClock::with_fixed_dt(0.01);
        assert_eq!(clock.advance(0.025), 2);
        // 0.005 left over; another 0.005 completes a step.
        assert_eq!(clock.advance(0.005), 1);
        assert_eq!(clock.frame_count, 3);
    }

    #[test]
    fn time_scale_stretches_real_time() {
        let mut clock = GameClock::with_fixed_dt(0.01);
        clock.time_scale = 2.0;
        assert_eq!(clock.advance(0.01), 2);
        assert!((clock.step_dt() - 0.02).abs() < f32::EPSILON);
    }

    #[test]
    fn paused_clock_issues_no_steps() {
        let mut clock = GameClock::default();
        clock.time_scale = 0.0;
        assert_eq!(clock.advance(10.0), 0);
        assert_eq!(clock.frame_count, 0);
        assert_eq!(clock.total_time, 0.0);
    }

    #[test]
    fn total_time_tracks_steps() {
        let mut clock = GameClock::with_fixed_dt(0.25);
        clock.advance(1.0);
        assert!((clock.total_time - 1.0).abs() < 1e-6);
        assert_eq!(clock.frame_count, 4);
    }

    #[test]
    fn step_count_over_time_matches_rate() {
        // Property 4 shape: N seconds at scale s yields ~ N*s/dt steps.
        let mut clock = GameClock::default();
        let mut steps = 0;
        for _ in 0..200 {
            steps += clock.advance(0.016);
        }
        let expected = (200.0 * 0.016 / clock.fixed_delta_time) as i64;
        assert!((steps as i64 - expected).abs() <= 1, "steps={steps} expected~{expected}");
    }

    #[test]
    #[should_panic(expected = "fixed_delta_time must be positive")]
    fn zero_dt_panics() {
        let _ = GameClock::with_fixed_dt(0.0);
    }
}
