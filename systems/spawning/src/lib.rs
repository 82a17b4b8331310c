#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn commands.

use grid_defense_core::{Command, EnemyProfile, Event};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Largest lateral offset an enemy may be assigned in either direction.
pub const LANE_OFFSET_LIMIT: f32 = 0.4;

/// Closed interval of floating point values sampled uniformly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatRange {
    min: f32,
    max: f32,
}

impl FloatRange {
    /// Creates a range from two bounds given in any order.
    #[must_use]
    pub fn new(a: f32, b: f32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Range holding a single value.
    #[must_use]
    pub const fn constant(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Lower bound of the range.
    #[must_use]
    pub const fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound of the range.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Reports whether `value` lies inside the range.
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    fn sample(&self, rng: &mut ChaCha8Rng) -> f32 {
        if self.min >= self.max {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    spawn_speed: f32,
    rng_seed: u64,
    scale: FloatRange,
    speed: FloatRange,
    lane_offset: FloatRange,
}

impl Config {
    /// Creates a configuration that spawns `spawn_speed` enemies per second.
    ///
    /// Enemy profiles start from the default ranges: scale 0.5 to 1.5, speed
    /// 0.75 to 1.25 and lane offset -0.25 to 0.25.
    #[must_use]
    pub fn new(spawn_speed: f32, rng_seed: u64) -> Self {
        Self {
            spawn_speed: spawn_speed.max(0.0),
            rng_seed,
            scale: FloatRange::new(0.5, 1.5),
            speed: FloatRange::new(0.75, 1.25),
            lane_offset: FloatRange::new(-0.25, 0.25),
        }
    }

    /// Replaces the scale range; values below 0.1 are raised to it.
    #[must_use]
    pub fn with_scale(mut self, scale: FloatRange) -> Self {
        self.scale = FloatRange::new(scale.min.max(0.1), scale.max.max(0.1));
        self
    }

    /// Replaces the speed range; values below 0.1 are raised to it.
    #[must_use]
    pub fn with_speed(mut self, speed: FloatRange) -> Self {
        self.speed = FloatRange::new(speed.min.max(0.1), speed.max.max(0.1));
        self
    }

    /// Replaces the lane offset range, clamped to [`LANE_OFFSET_LIMIT`].
    #[must_use]
    pub fn with_lane_offset(mut self, lane_offset: FloatRange) -> Self {
        let clamp = |value: f32| value.clamp(-LANE_OFFSET_LIMIT, LANE_OFFSET_LIMIT);
        self.lane_offset = FloatRange::new(clamp(lane_offset.min), clamp(lane_offset.max));
        self
    }

    /// Enemies spawned per second of simulated time.
    #[must_use]
    pub const fn spawn_speed(&self) -> f32 {
        self.spawn_speed
    }

    /// Range enemy scales are drawn from.
    #[must_use]
    pub const fn scale(&self) -> FloatRange {
        self.scale
    }

    /// Range enemy speeds are drawn from.
    #[must_use]
    pub const fn speed(&self) -> FloatRange {
        self.speed
    }

    /// Range enemy lane offsets are drawn from.
    #[must_use]
    pub const fn lane_offset(&self) -> FloatRange {
        self.lane_offset
    }
}

/// Pure system that deterministically emits spawn commands as time advances.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
    progress: f32,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            progress: 0.0,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and emits one spawn command per whole unit of progress.
    ///
    /// `spawn_point_count` is the length of the board's spawn point list; each
    /// command picks one of its indices uniformly.
    pub fn handle(&mut self, events: &[Event], spawn_point_count: usize, out: &mut Vec<Command>) {
        if spawn_point_count == 0 {
            return;
        }

        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.progress += self.config.spawn_speed * dt.as_secs_f32();
            }
        }

        while self.progress >= 1.0 {
            self.progress -= 1.0;
            let spawn_point = self.rng.gen_range(0..spawn_point_count);
            let profile = self.next_profile();
            out.push(Command::SpawnEnemy {
                spawn_point,
                profile,
            });
        }
    }

    fn next_profile(&mut self) -> EnemyProfile {
        EnemyProfile {
            scale: self.config.scale.sample(&mut self.rng),
            speed: self.config.speed.sample(&mut self.rng),
            lane_offset: self.config.lane_offset.sample(&mut self.rng),
        }
    }
}
