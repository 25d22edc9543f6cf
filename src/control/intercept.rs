// src/control/intercept.rs

//! Intercept-time solver.
//!
//! For a target at relative position `Δp` moving with constant velocity `v`,
//! a pursuer flying straight at speed `s` meets it at the time `t` solving
//!
//! ```text
//! (|v|² − s²)·t² + 2·(Δp·v)·t + |Δp|² = 0
//! ```
//!
//! The smallest positive root is used. When the quadratic degenerates, has
//! no real roots or no positive root, the direct flight time `|Δp| / s` is
//! used instead.

use crate::geometry::NEAR_ZERO;
use nalgebra::Vector3;

/// Time until a pursuer at `speed` can meet a target at `relative_position`
/// moving with `target_velocity`.
pub fn intercept_time(relative_position: &Vector3<f32>, target_velocity: &Vector3<f32>, speed: f32) -> f32 {
    let direct = relative_position.norm() / speed;

    let a = target_velocity.norm_squared() - speed * speed;
    let b = 2.0 * relative_position.dot(target_velocity);
    let c = relative_position.norm_squared();

    if a.abs() < NEAR_ZERO {
        return direct;
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return direct;
    }

    let root = discriminant.sqrt();
    [(-b - root) / (2.0 * a), (-b + root) / (2.0 * a)]
        .into_iter()
        .filter(|t| *t > 0.0)
        .min_by(f32::total_cmp)
        .unwrap_or(direct)
}

/// Point to fly at for an intercept, and the intercept time. Without a
/// target velocity the target itself is the aim point.
pub fn aim_point(
    drone_position: &Vector3<f32>,
    target_position: &Vector3<f32>,
    target_velocity: Option<&Vector3<f32>>,
    speed: f32,
) -> (Vector3<f32>, f32) {
    let relative = target_position - drone_position;
    match target_velocity {
        Some(velocity) => {
            let t = intercept_time(&relative, velocity, speed);
            (target_position + velocity * t, t)
        }
        None => (*target_position, relative.norm() / speed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    /// A stationary target is met after the direct flight time.
    #[test]
    fn test_stationary_target() {
        let (aim, t) = aim_point(
            &Vector3::zeros(),
            &Vector3::new(10.0, 0.0, 0.0),
            Some(&Vector3::zeros()),
            10.0,
        );
        assert!(value_close(1.0, t));
        assert!(vector_close(Vector3::new(10.0, 0.0, 0.0), aim));
    }

    /// A crossing target is led along its velocity.
    #[test]
    fn test_crossing_target_is_led() {
        let (aim, t) = aim_point(
            &Vector3::zeros(),
            &Vector3::new(10.0, 0.0, 0.0),
            Some(&Vector3::new(0.0, 5.0, 0.0)),
            10.0,
        );
        // 100 = 75·t²
        assert!(value_within(1.154_700_5, t, 1e-4));
        assert!(aim.y > 0.0);
        assert!(value_within(5.773_503, aim.y, 1e-3));
        assert!(value_close(10.0, aim.x));
    }

    /// A degenerate quadratic falls back to the direct time.
    #[test]
    fn test_target_as_fast_as_pursuer_falls_back_to_direct_time() {
        let t = intercept_time(&Vector3::new(10.0, 0.0, 0.0), &Vector3::new(0.0, 10.0, 0.0), 10.0);
        assert!(value_close(1.0, t));
    }

    /// A target fleeing faster than the pursuer falls back to the direct time.
    #[test]
    fn test_unreachable_target_falls_back_to_direct_time() {
        // Fleeing faster than the pursuer: both roots are negative.
        let t = intercept_time(&Vector3::new(10.0, 0.0, 0.0), &Vector3::new(20.0, 0.0, 0.0), 10.0);
        assert!(value_close(1.0, t));
    }

    /// Without a velocity the aim point is the target itself.
    #[test]
    fn test_no_velocity_aims_at_target() {
        let target = Vector3::new(3.0, 4.0, 0.0);
        let (aim, t) = aim_point(&Vector3::zeros(), &target, None, 10.0);
        assert_eq!(aim, target);
        assert!(value_close(0.5, t));
    }

    /// Of two positive roots the earlier meeting is chosen.
    #[test]
    fn test_approaching_target_takes_earlier_root() {
        // 300·t² − 400·t + 100 = 0 has roots 1/3 and 1.
        let (aim, t) = aim_point(
            &Vector3::zeros(),
            &Vector3::new(10.0, 0.0, 0.0),
            Some(&Vector3::new(-20.0, 0.0, 0.0)),
            10.0,
        );
        assert!(value_within(1.0 / 3.0, t, 1e-5));
        assert!(vector_within(Vector3::new(10.0 - 20.0 / 3.0, 0.0, 0.0), aim, 1e-4));
    }
}
