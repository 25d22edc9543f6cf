// src/perception.rs

//! # Perception Engine
//!
//! Turns one [`RawSnapshot`] into a [`PerceptionState`]: filtered drone and
//! target positions, target range and bearing, ranked collision threats,
//! sampled safe headings and the flight envelope.
//!
//! The engine owns the only state carried between ticks on the sensing side
//! (the two smoothers and the sample histories). A `PerceptionState` is
//! recomputed in full every tick and never mutated afterwards.

pub mod envelope;
pub use envelope::*;
pub mod history;
pub use history::*;
pub mod safe_directions;
pub use safe_directions::*;
pub mod threat;
pub use threat::*;

use crate::config::PerceptionConfig;
use crate::filter::KalmanSmoother;
use crate::geometry::{bearing, Heading};
use crate::types::{Obstacle, RawSnapshot};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// The filtered world model for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceptionState {
    /// Snapshot time in seconds.
    pub timestamp: f64,
    /// Filtered drone position.
    pub drone_position: Vector3<f32>,
    /// Drone velocity.
    pub drone_velocity: Vector3<f32>,
    /// Drone orientation as `(pitch, roll, yaw)`.
    pub drone_orientation: Vector3<f32>,
    /// Filtered target position, absent when not visible.
    pub target_position: Option<Vector3<f32>>,
    /// Target velocity, absent when not visible.
    pub target_velocity: Option<Vector3<f32>>,
    /// Whether the target was visible.
    pub target_visible: bool,
    /// Range to the target; infinite with no target.
    pub target_distance: f32,
    /// `(azimuth, elevation)` to the target; `(0, 0)` with no target.
    pub target_bearing: Heading,
    /// Obstacles exactly as reported.
    pub obstacles: Vec<Obstacle>,
    /// Threats, most urgent first.
    pub threats: Vec<Threat>,
    /// Sampled safe headings.
    pub safe_directions: Vec<Heading>,
    /// Battery level in percent.
    pub battery_level: f32,
    /// Current flight envelope.
    pub flight_envelope: FlightEnvelope,
}

impl PerceptionState {
    /// Current altitude.
    pub fn altitude(&self) -> f32 {
        self.drone_position.y
    }

    /// Head of the threat list.
    pub fn most_urgent_threat(&self) -> Option<&Threat> {
        self.threats.first()
    }
}

/// Range and bearing from `from` to an optional target.
pub fn target_range_bearing(from: &Vector3<f32>, target: Option<&Vector3<f32>>) -> (f32, Heading) {
    match target {
        Some(target) => {
            let delta = target - from;
            (delta.norm(), bearing(&delta))
        }
        None => (f32::INFINITY, (0.0, 0.0)),
    }
}

/// Real-time perception engine.
#[derive(Debug, Clone)]
pub struct PerceptionEngine {
    config: PerceptionConfig,
    position_filter: KalmanSmoother<Vector3<f32>>,
    target_filter: KalmanSmoother<Vector3<f32>>,
    analyzer: ThreatAnalyzer,
    sampler: SafeDirectionSampler,
    position_history: SampleHistory,
    velocity_history: SampleHistory,
    target_history: SampleHistory,
}

impl PerceptionEngine {
    /// Creates an engine with fresh filters.
    pub fn new(config: PerceptionConfig) -> Self {
        let smoother = KalmanSmoother::new(config.process_noise, config.measurement_noise);
        Self {
            position_filter: smoother.clone(),
            target_filter: smoother,
            analyzer: ThreatAnalyzer {
                min_safe_distance: config.min_safe_distance,
                critical_distance: config.critical_distance,
                lookahead: config.collision_lookahead,
            },
            sampler: SafeDirectionSampler {
                azimuth_samples: config.azimuth_samples,
                elevation_samples: config.elevation_samples,
                check_distance: config.check_distance,
                min_safe_distance: config.min_safe_distance,
            },
            position_history: SampleHistory::new(config.history_len),
            velocity_history: SampleHistory::new(config.history_len),
            target_history: SampleHistory::new(config.history_len),
            config,
        }
    }

    /// Processes one snapshot.
    pub fn process(&mut self, snapshot: &RawSnapshot) -> PerceptionState {
        let drone = &snapshot.drone;
        let target = &snapshot.target;

        let drone_position = self.position_filter.update(drone.position);
        let (target_position, target_velocity) = if target.visible {
            (Some(self.target_filter.update(target.position)), Some(target.velocity))
        } else {
            (None, None)
        };

        let (target_distance, target_bearing) =
            target_range_bearing(&drone_position, target_position.as_ref());
        let threats = self
            .analyzer
            .detect(&drone_position, &drone.velocity, &snapshot.obstacles);
        let safe_directions = self.sampler.sample(&drone_position, &snapshot.obstacles);
        let flight_envelope = FlightEnvelope::new(
            &self.config.envelope,
            drone.battery_level,
            self.config.altitude_limits,
        );

        self.position_history.push(snapshot.timestamp, drone.position);
        self.velocity_history.push(snapshot.timestamp, drone.velocity);
        if target.visible {
            self.target_history.push(snapshot.timestamp, target.position);
        }

        trace!(
            timestamp = snapshot.timestamp,
            threats = threats.len(),
            safe = safe_directions.len(),
            target_distance,
            "perception updated"
        );

        PerceptionState {
            timestamp: snapshot.timestamp,
            drone_position,
            drone_velocity: drone.velocity,
            drone_orientation: drone.orientation,
            target_position,
            target_velocity,
            target_visible: target.visible,
            target_distance,
            target_bearing,
            obstacles: snapshot.obstacles.clone(),
            threats,
            safe_directions,
            battery_level: drone.battery_level,
            flight_envelope,
        }
    }

    /// Predicts the target position `horizon` seconds ahead from recent
    /// raw observations.
    pub fn predict_target_position(&self, horizon: f32) -> Option<Vector3<f32>> {
        self.target_history.predict(horizon)
    }

    /// Raw drone position samples, oldest first.
    pub fn position_history(&self) -> &SampleHistory {
        &self.position_history
    }

    /// Raw drone velocity samples, oldest first.
    pub fn velocity_history(&self) -> &SampleHistory {
        &self.velocity_history
    }

    /// Threat analyzer in use.
    pub fn analyzer(&self) -> &ThreatAnalyzer {
        &self.analyzer
    }

    /// Forgets all filter state and history.
    pub fn reset(&mut self) {
        self.position_filter.reset();
        self.target_filter.reset();
        self.position_history.clear();
        self.velocity_history.clear();
        self.target_history.clear();
    }
}
