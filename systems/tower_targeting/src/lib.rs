#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Target acquisition for towers, built on a read-only [`SpatialIndex`].
//!
//! Candidates are gathered with an upright capsule query so that only the
//! horizontal distance from the tower matters. A tracked target is kept while
//! it stays within range on the ground plane and dropped otherwise.

use glam::Vec3;
use grid_defense_core::{
    horizontal_distance_squared, Capsule, EnemyId, SpatialIndex, TargetPoint,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Maximum number of candidates a single capsule query records.
pub const TARGET_BUFFER_CAPACITY: usize = 100;

/// Rule used to pick one candidate out of a filled buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPolicy {
    /// Uniformly random candidate.
    #[default]
    Random,
    /// Candidate closest on the ground plane, ties resolved by enemy handle.
    Nearest,
    /// First candidate reported by the index.
    First,
}

/// Fixed-capacity buffer filled by capsule queries.
#[derive(Clone, Debug)]
pub struct TargetBuffer {
    points: Box<[TargetPoint; TARGET_BUFFER_CAPACITY]>,
    count: usize,
}

impl Default for TargetBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            points: Box::new([TargetPoint::default(); TARGET_BUFFER_CAPACITY]),
            count: 0,
        }
    }

    /// Replaces the contents with the points found within `range` of
    /// `position` and returns how many were recorded.
    pub fn fill<I: SpatialIndex + ?Sized>(&mut self, index: &I, position: Vec3, range: f32) -> usize {
        let capsule = Capsule::upright(position, range);
        let written = index.overlap_capsule(&capsule, &mut self.points[..]);
        self.count = written.min(TARGET_BUFFER_CAPACITY);
        self.count
    }

    /// Number of points recorded by the last fill.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Point recorded at `slot`, if the last fill reached it.
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<TargetPoint> {
        self.as_slice().get(slot).copied()
    }

    /// Points recorded by the last fill.
    #[must_use]
    pub fn as_slice(&self) -> &[TargetPoint] {
        &self.points[..self.count]
    }

    /// Picks one recorded point according to `policy`.
    pub fn select(
        &self,
        policy: TargetPolicy,
        position: Vec3,
        rng: &mut impl Rng,
    ) -> Option<TargetPoint> {
        let candidates = self.as_slice();
        if candidates.is_empty() {
            return None;
        }
        match policy {
            TargetPolicy::Random => candidates.get(rng.gen_range(0..candidates.len())).copied(),
            TargetPolicy::First => candidates.first().copied(),
            TargetPolicy::Nearest => candidates.iter().copied().min_by(|a, b| {
                let da = horizontal_distance_squared(a.position, position);
                let db = horizontal_distance_squared(b.position, position);
                da.total_cmp(&db).then_with(|| a.enemy.cmp(&b.enemy))
            }),
        }
    }
}

/// Re-validates a tracked target against the tower's range.
///
/// The range is widened by the target's bounding radius so that a target the
/// capsule query still touches is not dropped. Targets that left the index or
/// moved out of range are cleared.
pub fn track<I: SpatialIndex + ?Sized>(
    index: &I,
    position: Vec3,
    range: f32,
    target: &mut Option<EnemyId>,
) -> Option<TargetPoint> {
    let enemy = (*target)?;
    let Some(point) = index.target_point(enemy) else {
        *target = None;
        return None;
    };

    let reach = range + point.radius;
    if horizontal_distance_squared(position, point.position) > reach * reach {
        *target = None;
        return None;
    }
    Some(point)
}

/// Tower targeting helper that owns the candidate buffer and the random
/// generator used by [`TargetPolicy::Random`].
#[derive(Clone, Debug)]
pub struct TowerTargeting {
    buffer: TargetBuffer,
    policy: TargetPolicy,
    rng: ChaCha8Rng,
}

impl TowerTargeting {
    /// Creates a targeting helper with the provided policy and seed.
    #[must_use]
    pub fn new(policy: TargetPolicy, rng_seed: u64) -> Self {
        Self {
            buffer: TargetBuffer::new(),
            policy,
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
        }
    }

    /// Policy applied when acquiring new targets.
    #[must_use]
    pub const fn policy(&self) -> TargetPolicy {
        self.policy
    }

    /// Picks a target within `range` of `position`, if any.
    pub fn acquire<I: SpatialIndex + ?Sized>(
        &mut self,
        index: &I,
        position: Vec3,
        range: f32,
    ) -> Option<TargetPoint> {
        if self.buffer.fill(index, position, range) == 0 {
            return None;
        }
        self.buffer.select(self.policy, position, &mut self.rng)
    }

    /// Keeps the tracked target when still valid, otherwise acquires a new one
    /// and stores its handle in `target`.
    pub fn track_or_acquire<I: SpatialIndex + ?Sized>(
        &mut self,
        index: &I,
        position: Vec3,
        range: f32,
        target: &mut Option<EnemyId>,
    ) -> Option<TargetPoint> {
        if let Some(point) = track(index, position, range, target) {
            return Some(point);
        }
        let point = self.acquire(index, position, range)?;
        *target = Some(point.enemy);
        Some(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn enemy_id(index: u32) -> EnemyId {
        KeyData::from_ffi(u64::from(index)).into()
    }

    #[derive(Default)]
    struct Points(Vec<TargetPoint>);

    impl SpatialIndex for Points {
        fn overlap_capsule(&self, capsule: &Capsule, out: &mut [TargetPoint]) -> usize {
            let hits = self
                .0
                .iter()
                .filter(|point| capsule.intersects_sphere(point.position, point.radius));
            let mut written = 0;
            for (slot, point) in out.iter_mut().zip(hits) {
                *slot = *point;
                written += 1;
            }
            written
        }

        fn target_point(&self, enemy: EnemyId) -> Option<TargetPoint> {
            self.0.iter().find(|point| point.enemy == enemy).copied()
        }
    }

    fn point(index: u32, x: f32, z: f32) -> TargetPoint {
        TargetPoint {
            enemy: enemy_id(index),
            position: Vec3::new(x, 0.25, z),
            radius: 0.125,
        }
    }

    #[test]
    fn fill_is_capped_at_capacity() {
        let crowd = Points((0..150).map(|index| point(index, 0.0, 0.0)).collect());
        let mut buffer = TargetBuffer::new();

        assert_eq!(buffer.fill(&crowd, Vec3::ZERO, 1.0), TARGET_BUFFER_CAPACITY);
        assert_eq!(buffer.count(), TARGET_BUFFER_CAPACITY);
        assert!(buffer.get(TARGET_BUFFER_CAPACITY).is_none());
    }

    #[test]
    fn fill_ignores_height() {
        let index = Points(vec![TargetPoint {
            enemy: enemy_id(1),
            position: Vec3::new(1.0, 2.5, 0.0),
            radius: 0.125,
        }]);
        let mut buffer = TargetBuffer::new();
        assert_eq!(buffer.fill(&index, Vec3::ZERO, 1.0), 1);
    }

    #[test]
    fn policies_pick_expected_candidates() {
        let index = Points(vec![point(4, 1.0, 0.0), point(2, 0.5, 0.0), point(3, -0.5, 0.0)]);
        let mut buffer = TargetBuffer::new();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        assert_eq!(buffer.fill(&index, Vec3::ZERO, 2.0), 3);

        let first = buffer.select(TargetPolicy::First, Vec3::ZERO, &mut rng);
        assert_eq!(first.map(|point| point.enemy), Some(enemy_id(4)));

        let nearest = buffer.select(TargetPolicy::Nearest, Vec3::ZERO, &mut rng);
        assert_eq!(nearest.map(|point| point.enemy), Some(enemy_id(2)));

        let random = buffer
            .select(TargetPolicy::Random, Vec3::ZERO, &mut rng)
            .expect("candidate");
        assert!(buffer.as_slice().contains(&random));
    }

    #[test]
    fn track_keeps_targets_within_padded_range() {
        let index = Points(vec![point(1, 2.1, 0.0)]);
        let mut target = Some(enemy_id(1));

        assert!(track(&index, Vec3::ZERO, 2.0, &mut target).is_some());
        assert_eq!(target, Some(enemy_id(1)));

        assert!(track(&index, Vec3::ZERO, 1.9, &mut target).is_none());
        assert_eq!(target, None);
    }

    #[test]
    fn track_loses_targets_that_left_the_index() {
        let index = Points::default();
        let mut target = Some(enemy_id(7));
        assert!(track(&index, Vec3::ZERO, 5.0, &mut target).is_none());
        assert_eq!(target, None);
    }

    #[test]
    fn track_or_acquire_switches_to_a_new_target() {
        let index = Points(vec![point(5, 0.5, 0.5)]);
        let mut targeting = TowerTargeting::new(TargetPolicy::Nearest, 1);
        let mut target = Some(enemy_id(9));

        let point = targeting
            .track_or_acquire(&index, Vec3::ZERO, 1.0, &mut target)
            .expect("acquired");
        assert_eq!(point.enemy, enemy_id(5));
        assert_eq!(target, Some(enemy_id(5)));
        assert_eq!(targeting.policy(), TargetPolicy::Nearest);
    }
}
