//! Launch solutions for shells fired under constant gravity.

use glam::{Vec2, Vec3};
use grid_defense_core::GRAVITY;

/// Extra horizontal reach granted beyond the tower range so that targets on
/// the edge of the range remain solvable.
const RANGE_MARGIN: f32 = 0.25001;

/// Minimum launch speed that reaches a ground point `range` tiles away from a
/// launcher mounted `launch_height` above the ground.
#[must_use]
pub fn launch_speed(range: f32, launch_height: f32) -> f32 {
    let x = range + RANGE_MARGIN;
    let y = -launch_height;
    (GRAVITY * (y + (x * x + y * y).sqrt())).sqrt()
}

/// Computes the high-arc velocity that carries a shell from `launch_point`
/// to `target_point` when fired at `speed`.
///
/// Returns `None` when `speed` cannot reach the target.
#[must_use]
pub fn solve_launch(launch_point: Vec3, target_point: Vec3, speed: f32) -> Option<Vec3> {
    let mut direction = Vec2::new(
        target_point.x - launch_point.x,
        target_point.z - launch_point.z,
    );
    let x = direction.length();
    if x <= f32::EPSILON {
        return Some(Vec3::Y * speed);
    }
    direction /= x;

    let y = target_point.y - launch_point.y;
    let s2 = speed * speed;
    let r = s2 * s2 - GRAVITY * (GRAVITY * x * x + 2.0 * y * s2);
    debug_assert!(r >= 0.0, "launch speed {speed} cannot reach {x} tiles");
    if r < 0.0 {
        return None;
    }

    let tan_theta = (s2 + r.sqrt()) / (GRAVITY * x);
    let cos_theta = tan_theta.atan().cos();
    let sin_theta = cos_theta * tan_theta;
    Some(Vec3::new(
        speed * cos_theta * direction.x,
        speed * sin_theta,
        speed * cos_theta * direction.y,
    ))
}
