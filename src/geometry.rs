// src/geometry.rs

//! Heading and bearing helpers for the y-up world frame.
//!
//! `x` points forward, `y` is altitude and `z` is lateral. Azimuth is
//! measured in the horizontal `x/z` plane from `+x` towards `+z`, elevation
//! from the horizontal plane towards `+y`.

use core::f32::consts::{PI, TAU};
use nalgebra::Vector3;

/// Magnitudes below this are treated as zero.
pub const NEAR_ZERO: f32 = 1e-3;

/// A sampled flight direction as `(azimuth, elevation)` in radians.
pub type Heading = (f32, f32);

/// Unit vector for a heading.
pub fn heading_vector(heading: Heading) -> Vector3<f32> {
    let (azimuth, elevation) = heading;
    Vector3::new(
        elevation.cos() * azimuth.cos(),
        elevation.sin(),
        elevation.cos() * azimuth.sin(),
    )
}

/// Azimuth and elevation of a vector. The zero vector maps to `(0, 0)`.
pub fn bearing(v: &Vector3<f32>) -> Heading {
    let horizontal = (v.x * v.x + v.z * v.z).sqrt();
    (v.z.atan2(v.x), v.y.atan2(horizontal))
}

/// Wraps an angle into `[-π, π]`.
pub fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Angular distance between two headings, with the azimuth difference
/// taken the short way round the circle.
pub fn angular_distance(a: Heading, b: Heading) -> f32 {
    let azimuth = wrap_angle(a.0 - b.0).abs();
    let elevation = (a.1 - b.1).abs();
    (azimuth * azimuth + elevation * elevation).sqrt()
}

/// `n` evenly spaced values from `start` to `end`, both included.
pub fn linspace(start: f32, end: f32, n: usize) -> impl Iterator<Item = f32> {
    let step = if n > 1 {
        (end - start) / (n - 1) as f32
    } else {
        0.0
    };
    (0..n).map(move |i| start + step * i as f32)
}
