// src/perception/threat.rs

//! # Threat Analyzer
//!
//! Straight-line closest-approach analysis of every obstacle relative to
//! the drone. Obstacles that come inside their safety radius within the
//! lookahead horizon are reported as threats, most urgent first.

use crate::geometry::NEAR_ZERO;
use crate::types::Obstacle;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Threat urgency tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatUrgency {
    /// Closest approach is inside the critical distance.
    Critical,
    /// Inside the safety radius but not critical.
    Warning,
}

/// An obstacle assessed as a near-term collision risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threat {
    /// The obstacle this threat refers to.
    pub obstacle: Obstacle,
    /// Separation at closest approach.
    pub closest_distance: f32,
    /// Seconds until closest approach.
    pub time_to_collision: f32,
    /// Urgency tier.
    pub urgency: ThreatUrgency,
    /// Recommended escape direction, scaled by the safety radius.
    pub avoidance_vector: Vector3<f32>,
}

impl Threat {
    /// Whether this threat is in the critical tier.
    pub fn is_critical(&self) -> bool {
        self.urgency == ThreatUrgency::Critical
    }
}

/// Closest approach of a relative trajectory `rp + rv·t`, `t ≥ 0`.
///
/// Returns `(closest_distance, time_of_closest_approach)`. With no relative
/// motion the time is infinite and the distance is `|rp|`.
pub fn closest_approach(rp: &Vector3<f32>, rv: &Vector3<f32>) -> (f32, f32) {
    if rv.norm() < NEAR_ZERO {
        return (rp.norm(), f32::INFINITY);
    }
    let t = (-rp.dot(rv) / rv.dot(rv)).max(0.0);
    ((rp + rv * t).norm(), t)
}

/// Collision threat analyzer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreatAnalyzer {
    /// Margin added to an obstacle's extent to form its safety radius.
    pub min_safe_distance: f32,
    /// Closest approach below this is critical.
    pub critical_distance: f32,
    /// Horizon in seconds beyond which approaches are ignored.
    pub lookahead: f32,
}

impl Default for ThreatAnalyzer {
    fn default() -> Self {
        Self {
            min_safe_distance: 3.0,
            critical_distance: 1.5,
            lookahead: 2.0,
        }
    }
}

impl ThreatAnalyzer {
    /// Assesses one obstacle; `None` when it is not a threat.
    pub fn analyze(
        &self,
        drone_position: &Vector3<f32>,
        drone_velocity: &Vector3<f32>,
        obstacle: &Obstacle,
    ) -> Option<Threat> {
        let rp = obstacle.position - drone_position;
        let rv = obstacle.velocity_or_zero() - drone_velocity;
        let (closest_distance, time_to_collision) = closest_approach(&rp, &rv);

        let safe_distance = obstacle.extent() + self.min_safe_distance;
        if closest_distance >= safe_distance || time_to_collision >= self.lookahead {
            return None;
        }

        let urgency = if closest_distance < self.critical_distance {
            ThreatUrgency::Critical
        } else {
            ThreatUrgency::Warning
        };

        Some(Threat {
            obstacle: *obstacle,
            closest_distance,
            time_to_collision,
            urgency,
            avoidance_vector: self.avoidance_vector(&rp, obstacle),
        })
    }

    /// Threats among `obstacles`, sorted by ascending time to collision.
    ///
    /// Downstream logic inspects the head of this list, so the order matters.
    pub fn detect(
        &self,
        drone_position: &Vector3<f32>,
        drone_velocity: &Vector3<f32>,
        obstacles: &[Obstacle],
    ) -> Vec<Threat> {
        let mut threats: Vec<Threat> = obstacles
            .iter()
            .filter_map(|obstacle| self.analyze(drone_position, drone_velocity, obstacle))
            .collect();
        threats.sort_by(|a, b| a.time_to_collision.total_cmp(&b.time_to_collision));
        threats
    }

    fn avoidance_vector(&self, rp: &Vector3<f32>, obstacle: &Obstacle) -> Vector3<f32> {
        let distance = rp.norm();
        if distance < NEAR_ZERO {
            return Vector3::y();
        }
        -rp / distance * (obstacle.extent() + self.min_safe_distance)
    }
}
