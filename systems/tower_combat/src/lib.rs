#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns tower targeting into damage and shell launches.
//!
//! Laser towers keep a tracked target and damage it continuously. Mortar
//! towers accumulate launch progress and lob shells at acquired targets; the
//! blast of a detonated shell damages every enemy it touches.

pub mod ballistics;

use std::{collections::BTreeMap, time::Duration};

use glam::Vec3;
use grid_defense_core::{
    Command, EnemyId, Event, ShellLaunch, SpatialIndex, TowerId, TowerKind, TowerSnapshot,
    TowerView,
};
use grid_defense_system_tower_targeting::{TargetBuffer, TargetPolicy, TowerTargeting};

const MIN_RANGE: f32 = 1.5;
const MAX_RANGE: f32 = 10.5;

/// Launch progress kept by a mortar that found nothing to shoot at.
const IDLE_LAUNCH_PROGRESS: f32 = 0.999;

/// Firing parameters shared by every laser tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaserStats {
    range: f32,
    damage_per_second: f32,
}

impl LaserStats {
    /// Creates laser stats; the range is clamped to 1.5..=10.5 and the damage
    /// to 1..=100 per second.
    #[must_use]
    pub fn new(range: f32, damage_per_second: f32) -> Self {
        Self {
            range: range.clamp(MIN_RANGE, MAX_RANGE),
            damage_per_second: damage_per_second.clamp(1.0, 100.0),
        }
    }

    /// Horizontal targeting range in tiles.
    #[must_use]
    pub const fn range(&self) -> f32 {
        self.range
    }

    /// Damage applied to the tracked target per second.
    #[must_use]
    pub const fn damage_per_second(&self) -> f32 {
        self.damage_per_second
    }
}

impl Default for LaserStats {
    fn default() -> Self {
        Self::new(3.5, 10.0)
    }
}

/// Firing parameters shared by every mortar tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MortarStats {
    range: f32,
    shots_per_second: f32,
    blast_radius: f32,
    damage: f32,
    launch_height: f32,
}

impl MortarStats {
    /// Creates mortar stats.
    ///
    /// The range is clamped to 1.5..=10.5, the rate of fire to 0.5..=2 shots
    /// per second, the blast radius to 0.5..=3 and the damage to 1..=100.
    #[must_use]
    pub fn new(range: f32, shots_per_second: f32, blast_radius: f32, damage: f32) -> Self {
        Self {
            range: range.clamp(MIN_RANGE, MAX_RANGE),
            shots_per_second: shots_per_second.clamp(0.5, 2.0),
            blast_radius: blast_radius.clamp(0.5, 3.0),
            damage: damage.clamp(1.0, 100.0),
            launch_height: 0.5,
        }
    }

    /// Replaces the height of the barrel above the tower's tile.
    #[must_use]
    pub fn with_launch_height(mut self, launch_height: f32) -> Self {
        self.launch_height = launch_height.max(0.0);
        self
    }

    /// Horizontal targeting range in tiles.
    #[must_use]
    pub const fn range(&self) -> f32 {
        self.range
    }

    /// Shells launched per second while targets are available.
    #[must_use]
    pub const fn shots_per_second(&self) -> f32 {
        self.shots_per_second
    }

    /// Horizontal radius of each shell's blast.
    #[must_use]
    pub const fn blast_radius(&self) -> f32 {
        self.blast_radius
    }

    /// Damage applied to every enemy within a blast.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Height of the barrel above the tower's tile.
    #[must_use]
    pub const fn launch_height(&self) -> f32 {
        self.launch_height
    }
}

impl Default for MortarStats {
    fn default() -> Self {
        Self::new(3.5, 1.0, 1.0, 10.0)
    }
}

/// Configuration parameters required to construct the tower combat system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    policy: TargetPolicy,
    rng_seed: u64,
    laser: LaserStats,
    mortar: MortarStats,
}

impl Config {
    /// Creates a configuration with default tower stats.
    #[must_use]
    pub fn new(policy: TargetPolicy, rng_seed: u64) -> Self {
        Self {
            policy,
            rng_seed,
            laser: LaserStats::default(),
            mortar: MortarStats::default(),
        }
    }

    /// Replaces the laser stats.
    #[must_use]
    pub fn with_laser(mut self, laser: LaserStats) -> Self {
        self.laser = laser;
        self
    }

    /// Replaces the mortar stats.
    #[must_use]
    pub fn with_mortar(mut self, mortar: MortarStats) -> Self {
        self.mortar = mortar;
        self
    }

    /// Policy used to pick among several candidates.
    #[must_use]
    pub const fn policy(&self) -> TargetPolicy {
        self.policy
    }

    /// Seed of the random generator behind [`TargetPolicy::Random`].
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    /// Stats applied to laser towers.
    #[must_use]
    pub const fn laser(&self) -> LaserStats {
        self.laser
    }

    /// Stats applied to mortar towers.
    #[must_use]
    pub const fn mortar(&self) -> MortarStats {
        self.mortar
    }
}

/// Tower combat system that emits damage and launch commands.
#[derive(Debug)]
pub struct TowerCombat {
    config: Config,
    launch_speed: f32,
    targeting: TowerTargeting,
    blast: TargetBuffer,
    laser_targets: BTreeMap<TowerId, Option<EnemyId>>,
    launch_progress: BTreeMap<TowerId, f32>,
}

impl TowerCombat {
    /// Creates a new tower combat system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mortar = config.mortar;
        Self {
            config,
            launch_speed: ballistics::launch_speed(mortar.range, mortar.launch_height),
            targeting: TowerTargeting::new(config.policy, config.rng_seed),
            blast: TargetBuffer::new(),
            laser_targets: BTreeMap::new(),
            launch_progress: BTreeMap::new(),
        }
    }

    /// Speed at which every mortar launches its shells.
    #[must_use]
    pub const fn launch_speed(&self) -> f32 {
        self.launch_speed
    }

    /// Enemy currently tracked by a laser tower.
    #[must_use]
    pub fn laser_target(&self, tower: TowerId) -> Option<EnemyId> {
        self.laser_targets.get(&tower).copied().flatten()
    }

    /// Consumes world events and emits the commands produced by every tower.
    ///
    /// `towers` and `index` must describe the world after the events were
    /// produced. Tower state is kept per tower id and dropped as soon as the
    /// tower disappears from the view.
    pub fn handle<I: SpatialIndex + ?Sized>(
        &mut self,
        events: &[Event],
        towers: &TowerView,
        index: &I,
        out: &mut Vec<Command>,
    ) {
        self.sync_towers(towers);

        for event in events {
            match event {
                Event::TimeAdvanced { dt } => self.fire(*dt, towers, index, out),
                Event::ShellDetonated {
                    position,
                    blast_radius,
                    damage,
                    ..
                } => self.detonate(*position, *blast_radius, *damage, index, out),
                _ => {}
            }
        }
    }

    fn sync_towers(&mut self, towers: &TowerView) {
        self.laser_targets
            .retain(|tower, _| towers.get(*tower).is_some());
        self.launch_progress
            .retain(|tower, _| towers.get(*tower).is_some());

        for tower in towers.iter() {
            match tower.kind {
                TowerKind::Laser => {
                    let _ = self.laser_targets.entry(tower.id).or_insert(None);
                }
                TowerKind::Mortar => {
                    let _ = self.launch_progress.entry(tower.id).or_insert(0.0);
                }
            }
        }
    }

    fn fire<I: SpatialIndex + ?Sized>(
        &mut self,
        dt: Duration,
        towers: &TowerView,
        index: &I,
        out: &mut Vec<Command>,
    ) {
        let seconds = dt.as_secs_f32();
        for tower in towers.iter() {
            match tower.kind {
                TowerKind::Laser => self.fire_laser(tower, seconds, index, out),
                TowerKind::Mortar => self.fire_mortar(tower, seconds, index, out),
            }
        }
    }

    fn fire_laser<I: SpatialIndex + ?Sized>(
        &mut self,
        tower: &TowerSnapshot,
        seconds: f32,
        index: &I,
        out: &mut Vec<Command>,
    ) {
        let laser = self.config.laser;
        let Some(target) = self.laser_targets.get_mut(&tower.id) else {
            return;
        };
        let Some(point) =
            self.targeting
                .track_or_acquire(index, tower.position, laser.range, target)
        else {
            return;
        };
        out.push(Command::DamageEnemy {
            enemy: point.enemy,
            amount: laser.damage_per_second * seconds,
        });
    }

    fn fire_mortar<I: SpatialIndex + ?Sized>(
        &mut self,
        tower: &TowerSnapshot,
        seconds: f32,
        index: &I,
        out: &mut Vec<Command>,
    ) {
        let mortar = self.config.mortar;
        let Some(progress) = self.launch_progress.get_mut(&tower.id) else {
            return;
        };
        *progress += mortar.shots_per_second * seconds;

        let launch_point = tower.position + Vec3::Y * mortar.launch_height;
        while *progress >= 1.0 {
            let Some(point) = self.targeting.acquire(index, tower.position, mortar.range) else {
                *progress = IDLE_LAUNCH_PROGRESS;
                break;
            };
            *progress -= 1.0;

            let target_point = Vec3::new(point.position.x, 0.0, point.position.z);
            let Some(velocity) =
                ballistics::solve_launch(launch_point, target_point, self.launch_speed)
            else {
                continue;
            };
            out.push(Command::LaunchShell {
                tower: tower.id,
                launch: ShellLaunch {
                    launch_point,
                    target_point,
                    velocity,
                    blast_radius: mortar.blast_radius,
                    damage: mortar.damage,
                },
            });
        }
    }

    fn detonate<I: SpatialIndex + ?Sized>(
        &mut self,
        position: Vec3,
        blast_radius: f32,
        damage: f32,
        index: &I,
        out: &mut Vec<Command>,
    ) {
        let hits = self.blast.fill(index, position, blast_radius);
        out.reserve(hits);
        out.extend(self.blast.as_slice().iter().map(|point| Command::DamageEnemy {
            enemy: point.enemy,
            amount: damage,
        }));
    }
}
