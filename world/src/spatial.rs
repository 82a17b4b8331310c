//! Brute-force spatial index over enemy target points.

use grid_defense_core::{Capsule, EnemyId, SpatialIndex, TargetPoint};

/// Snapshot of every enemy's target point at the time of capture.
///
/// Queries scan every point. Points are stored in handle order so that overlap
/// results are deterministic.
#[derive(Clone, Debug, Default)]
pub struct EnemyTargetIndex {
    points: Vec<TargetPoint>,
}

impl EnemyTargetIndex {
    /// Creates an index from the provided target points.
    #[must_use]
    pub fn from_points(mut points: Vec<TargetPoint>) -> Self {
        points.sort_by_key(|point| point.enemy);
        Self { points }
    }

    /// Number of indexed points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Reports whether the index holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl SpatialIndex for EnemyTargetIndex {
    fn overlap_capsule(&self, capsule: &Capsule, out: &mut [TargetPoint]) -> usize {
        let mut written = 0;
        for point in &self.points {
            if written == out.len() {
                break;
            }
            if capsule.intersects_sphere(point.position, point.radius) {
                out[written] = *point;
                written += 1;
            }
        }
        written
    }

    fn target_point(&self, enemy: EnemyId) -> Option<TargetPoint> {
        self.points
            .binary_search_by_key(&enemy, |point| point.enemy)
            .ok()
            .map(|index| self.points[index])
    }
}
