//! Ballistic shells fired by mortar towers.

use glam::Vec3;
use grid_defense_core::{ShellId, ShellLaunch, ShellSnapshot, GRAVITY};

/// Outcome of advancing a shell by one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Flight {
    Airborne,
    Detonated,
}

#[derive(Clone, Debug)]
pub(crate) struct Shell {
    launch: ShellLaunch,
    age: f32,
    position: Vec3,
    velocity: Vec3,
}

impl Shell {
    pub(crate) fn new(launch: ShellLaunch) -> Self {
        Self {
            launch,
            age: 0.0,
            position: launch.launch_point,
            velocity: launch.velocity,
        }
    }

    pub(crate) fn launch(&self) -> &ShellLaunch {
        &self.launch
    }

    /// Evaluates the trajectory at the new age. Positions are computed from the
    /// launch parameters rather than integrated, so frame length does not
    /// affect accuracy.
    pub(crate) fn advance(&mut self, dt: f32) -> Flight {
        self.age += dt;
        let mut position = self.launch.launch_point + self.launch.velocity * self.age;
        position.y -= 0.5 * GRAVITY * self.age * self.age;

        if position.y <= 0.0 {
            return Flight::Detonated;
        }

        self.position = position;
        self.velocity = self.launch.velocity - Vec3::Y * (GRAVITY * self.age);
        Flight::Airborne
    }

    pub(crate) fn snapshot(&self, id: ShellId) -> ShellSnapshot {
        ShellSnapshot {
            id,
            position: self.position,
            velocity: self.velocity,
            age: self.age,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn lob(vertical: f32) -> Shell {
        Shell::new(ShellLaunch {
            launch_point: Vec3::new(0.0, 0.5, 0.0),
            target_point: Vec3::new(2.0, 0.0, 0.0),
            velocity: Vec3::new(1.0, vertical, 0.0),
            blast_radius: 1.0,
            damage: 10.0,
        })
    }

    #[test]
    fn shell_follows_a_parabola() {
        let mut shell = lob(5.0);
        assert_eq!(shell.advance(0.5), Flight::Airborne);

        let expected_y = 0.5 + 5.0 * 0.5 - 0.5 * GRAVITY * 0.25;
        assert!((shell.position.y - expected_y).abs() < 1e-5);
        assert!((shell.position.x - 0.5).abs() < 1e-5);
        assert!((shell.velocity.y - (5.0 - GRAVITY * 0.5)).abs() < 1e-5);
    }

    #[test]
    fn shell_detonates_on_reaching_the_ground() {
        let mut shell = lob(5.0);
        // Solving 0.5 + 5t - 4.905t² = 0 gives a flight time of about 1.11s.
        let mut elapsed = 0.0;
        while shell.advance(0.05) == Flight::Airborne {
            elapsed += 0.05;
            assert!(elapsed < 2.0, "shell never landed");
        }
        assert!((1.0..1.15).contains(&elapsed), "landed after {elapsed}");
        assert_eq!(shell.launch().target_point, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn snapshot_reports_age() {
        let mut shell = lob(3.0);
        let _ = shell.advance(0.25);
        let id: ShellId = KeyData::from_ffi((2 << 32) | 1).into();
        let snapshot = shell.snapshot(id);
        assert_eq!(snapshot.id, id);
        assert_eq!(snapshot.age, 0.25);
    }
}
