//! Aiming geometry for turrets.
//!
//! Yaw angles are measured about the vertical axis. An angle `a` faces the
//! direction `(cos a, 0, -sin a)`, which is where `DQuat::from_rotation_y(a)`
//! sends the local +x axis.

use std::f64::consts::{PI, TAU};

use rand::Rng;

use rampart_core::types::Position;

/// Wrap an angle into `[0, 2π)`.
pub fn angle_normalize(angle: f64) -> f64 {
    let wrapped = angle - (angle / TAU).floor() * TAU;
    // Rounding can land exactly on TAU for tiny negative inputs.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Yaw from `eye` towards `dest` in the x/z plane, in `[0, 2π)`.
pub fn look_at(eye: &Position, dest: &Position) -> f64 {
    let dx = dest.x - eye.x;
    let dz = dest.z - eye.z;
    angle_normalize((-dz).atan2(dx))
}

/// Step `current` towards `target` by at most `increment`, taking the short
/// way round.
///
/// Lands exactly on `target` when the remaining gap is within one step.
/// The result is not re-normalized, so callers comparing against `target`
/// see exact equality once the slew completes.
pub fn rotate_to(current: f64, target: f64, increment: f64) -> f64 {
    let target = angle_normalize(target);
    let mut current = angle_normalize(current);

    if current - target > PI {
        current -= TAU;
    } else if current - target < -PI {
        current += TAU;
    }

    if current > target {
        current -= increment;
        if current < target {
            current = target;
        }
    } else {
        current += increment;
        if current > target {
            current = target;
        }
    }
    current
}

/// Uniform random value in `[0, scale)`; for negative `scale` the range is
/// `(scale, 0]`.
pub fn randf(rng: &mut impl Rng, scale: f64) -> f64 {
    rng.gen::<f64>() * scale
}
