// src/perception/safe_directions.rs

//! # Safe-Direction Sampler
//!
//! Discretises the sphere of headings into an azimuth × elevation grid and
//! keeps the headings whose probe point, a fixed distance out, clears every
//! obstacle's safety radius.
//!
//! ## Limitations
//!
//! This is point sampling, not a visibility computation. Only the probe
//! point is tested: an obstacle lying between the drone and the probe point,
//! or one thin enough to fall between neighbouring rays, is not seen.

use crate::geometry::{heading_vector, linspace, Heading};
use crate::types::Obstacle;
use core::f32::consts::{FRAC_PI_4, TAU};
use nalgebra::Vector3;

/// Heading grid sampler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeDirectionSampler {
    /// Number of azimuth samples spanning `0..=2π`.
    pub azimuth_samples: usize,
    /// Number of elevation samples spanning `-π/4..=π/4`.
    pub elevation_samples: usize,
    /// Distance from the drone to the probe point.
    pub check_distance: f32,
    /// Margin added to an obstacle's extent.
    pub min_safe_distance: f32,
}

impl Default for SafeDirectionSampler {
    fn default() -> Self {
        Self {
            azimuth_samples: 16,
            elevation_samples: 5,
            check_distance: 10.0,
            min_safe_distance: 3.0,
        }
    }
}

impl SafeDirectionSampler {
    /// Every heading on the grid, azimuth-major.
    pub fn headings(&self) -> impl Iterator<Item = Heading> + '_ {
        linspace(0.0, TAU, self.azimuth_samples).flat_map(move |azimuth| {
            linspace(-FRAC_PI_4, FRAC_PI_4, self.elevation_samples)
                .map(move |elevation| (azimuth, elevation))
        })
    }

    /// Whether the probe point along `heading` clears every obstacle.
    pub fn is_safe(&self, position: &Vector3<f32>, heading: Heading, obstacles: &[Obstacle]) -> bool {
        let probe = position + heading_vector(heading) * self.check_distance;
        obstacles.iter().all(|obstacle| {
            (probe - obstacle.position).norm() >= obstacle.extent() + self.min_safe_distance
        })
    }

    /// The safe headings from `position`; may be empty.
    pub fn sample(&self, position: &Vector3<f32>, obstacles: &[Obstacle]) -> Vec<Heading> {
        self.headings()
            .filter(|heading| self.is_safe(position, *heading, obstacles))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::angular_distance;
    use core::f32::consts::PI;

    /// The default grid has 80 headings.
    #[test]
    fn test_grid_has_eighty_headings() {
        let sampler = SafeDirectionSampler::default();
        assert_eq!(sampler.headings().count(), 80);
        assert_eq!(sampler.sample(&Vector3::zeros(), &[]).len(), 80);
    }

    /// An obstacle ahead blocks the forward headings.
    #[test]
    fn test_obstacle_ahead_blocks_forward_headings() {
        let sampler = SafeDirectionSampler::default();
        let obstacle = Obstacle::stationary(Vector3::new(10.0, 0.0, 0.0), 1.0);
        let safe = sampler.sample(&Vector3::zeros(), &[obstacle]);

        assert!(!safe.contains(&(0.0, 0.0)), "Heading at the obstacle must be excluded.");
        assert!(safe.len() < 80);

        // The grid heading nearest to straight back is still available.
        let behind = sampler
            .headings()
            .filter(|h| h.1 == 0.0)
            .min_by(|a, b| {
                angular_distance(*a, (PI, 0.0)).total_cmp(&angular_distance(*b, (PI, 0.0)))
            })
            .unwrap();
        assert!(safe.contains(&behind));
    }

    /// A surrounded drone has no safe heading.
    #[test]
    fn test_surrounded_has_no_safe_heading() {
        let sampler = SafeDirectionSampler::default();
        // One huge obstacle centred on the drone covers every probe point.
        let obstacle = Obstacle::stationary(Vector3::zeros(), 20.0);
        assert!(sampler.sample(&Vector3::zeros(), &[obstacle]).is_empty());
    }

    /// Only the point at the check distance is tested.
    #[test]
    fn test_probe_only_sees_the_check_distance() {
        let sampler = SafeDirectionSampler::default();
        // Small obstacle close in front, far from the 10 m probe point.
        let obstacle = Obstacle::stationary(Vector3::new(2.0, 0.0, 0.0), 0.5);
        assert!(sampler.is_safe(&Vector3::zeros(), (0.0, 0.0), &[obstacle]));
    }
}
