// src/control/emergency.rs

//! Emergency predicates and latch.
//!
//! Emergency is forced whenever the battery is low, any threat is critical
//! or the altitude leaves the allowed band. It stays latched for as long as
//! any predicate holds and clears on the first tick where none does.

use crate::config::ControlConfig;
use crate::perception::PerceptionState;
use core::fmt;
use tracing::{info, warn};

/// Why emergency was forced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmergencyReason {
    /// Battery below the emergency threshold.
    LowBattery {
        /// Battery level in percent.
        level: f32,
    },
    /// A critical threat is present.
    CriticalThreat {
        /// Closest-approach distance of the most urgent critical threat.
        distance: f32,
    },
    /// Altitude outside the allowed band.
    AltitudeOutOfBand {
        /// Current altitude.
        altitude: f32,
    },
}

impl fmt::Display for EmergencyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmergencyReason::LowBattery { level } => write!(f, "low battery ({level:.1}%)"),
            EmergencyReason::CriticalThreat { distance } => {
                write!(f, "critical threat at {distance:.2} m")
            }
            EmergencyReason::AltitudeOutOfBand { altitude } => {
                write!(f, "altitude {altitude:.2} m out of band")
            }
        }
    }
}

/// Evaluates the emergency predicates and keeps the latch.
#[derive(Debug, Clone, PartialEq)]
pub struct EmergencyMonitor {
    battery_threshold: f32,
    min_altitude: f32,
    max_altitude: f32,
    latched: bool,
}

impl EmergencyMonitor {
    /// Monitor using the thresholds of `config`.
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            battery_threshold: config.battery_emergency_threshold,
            min_altitude: config.min_altitude,
            max_altitude: config.max_altitude,
            latched: false,
        }
    }

    /// Every predicate that holds for `perception`.
    pub fn reasons(&self, perception: &PerceptionState) -> Vec<EmergencyReason> {
        let mut reasons = Vec::new();
        let battery = perception.battery_level;
        if !battery.is_finite() || battery < self.battery_threshold {
            reasons.push(EmergencyReason::LowBattery {
                level: perception.battery_level,
            });
        }
        if let Some(threat) = perception.threats.iter().find(|threat| threat.is_critical()) {
            reasons.push(EmergencyReason::CriticalThreat {
                distance: threat.closest_distance,
            });
        }
        let altitude = perception.altitude();
        if !(self.min_altitude..=self.max_altitude).contains(&altitude) {
            reasons.push(EmergencyReason::AltitudeOutOfBand { altitude });
        }
        reasons
    }

    /// Re-evaluates the predicates and returns whether emergency is active.
    pub fn update(&mut self, perception: &PerceptionState) -> bool {
        let reasons = self.reasons(perception);
        let active = !reasons.is_empty();

        match (self.latched, active) {
            (false, true) => {
                for reason in &reasons {
                    warn!(timestamp = perception.timestamp, %reason, "emergency triggered");
                }
            }
            (true, false) => info!(timestamp = perception.timestamp, "emergency cleared"),
            _ => {}
        }

        self.latched = active;
        active
    }

    /// Whether emergency was active on the last update.
    pub fn is_latched(&self) -> bool {
        self.latched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::{EnvelopeLimits, FlightEnvelope, Threat, ThreatUrgency};
    use crate::types::Obstacle;
    use nalgebra::Vector3;

    fn perception(battery_level: f32, altitude: f32) -> PerceptionState {
        PerceptionState {
            timestamp: 0.0,
            drone_position: Vector3::new(0.0, altitude, 0.0),
            drone_velocity: Vector3::zeros(),
            drone_orientation: Vector3::zeros(),
            target_position: None,
            target_velocity: None,
            target_visible: false,
            target_distance: f32::INFINITY,
            target_bearing: (0.0, 0.0),
            obstacles: Vec::new(),
            threats: Vec::new(),
            safe_directions: Vec::new(),
            battery_level,
            flight_envelope: FlightEnvelope::new(&EnvelopeLimits::default(), battery_level, (1.0, 100.0)),
        }
    }

    /// A healthy drone inside the band triggers nothing.
    #[test]
    fn test_nominal_state_is_not_emergency() {
        let mut monitor = EmergencyMonitor::new(&ControlConfig::default());
        assert!(monitor.reasons(&perception(80.0, 10.0)).is_empty());
        assert!(!monitor.update(&perception(80.0, 10.0)));
    }

    /// Each predicate reports its own reason.
    #[test]
    fn test_each_predicate() {
        let monitor = EmergencyMonitor::new(&ControlConfig::default());
        assert_eq!(
            monitor.reasons(&perception(10.0, 10.0)),
            vec![EmergencyReason::LowBattery { level: 10.0 }]
        );
        assert_eq!(
            monitor.reasons(&perception(80.0, 0.5)),
            vec![EmergencyReason::AltitudeOutOfBand { altitude: 0.5 }]
        );
        assert_eq!(monitor.reasons(&perception(80.0, 150.0)).len(), 1);

        let mut threatened = perception(80.0, 10.0);
        threatened.threats.push(Threat {
            obstacle: Obstacle::stationary(Vector3::new(1.0, 10.0, 0.0), 1.0),
            closest_distance: 1.0,
            time_to_collision: 0.2,
            urgency: ThreatUrgency::Critical,
            avoidance_vector: Vector3::new(-4.0, 0.0, 0.0),
        });
        assert_eq!(
            monitor.reasons(&threatened),
            vec![EmergencyReason::CriticalThreat { distance: 1.0 }]
        );
    }

    /// The latch holds exactly while a predicate holds.
    #[test]
    fn test_latch_follows_predicates() {
        let mut monitor = EmergencyMonitor::new(&ControlConfig::default());
        assert!(monitor.update(&perception(10.0, 10.0)));
        assert!(monitor.is_latched());
        assert!(monitor.update(&perception(14.9, 10.0)));
        assert!(!monitor.update(&perception(50.0, 10.0)));
        assert!(!monitor.is_latched());
    }

    /// Reasons render for the log.
    #[test]
    fn test_reason_display() {
        let reason = EmergencyReason::LowBattery { level: 12.0 };
        assert_eq!(reason.to_string(), "low battery (12.0%)");
    }

    /// Unknown altitude or battery is treated as out of limits.
    #[test]
    fn test_non_finite_readings_trigger() {
        let mut monitor = EmergencyMonitor::new(&ControlConfig::default());
        assert!(matches!(
            monitor.reasons(&perception(80.0, f32::NAN))[..],
            [EmergencyReason::AltitudeOutOfBand { altitude }] if altitude.is_nan()
        ));
        assert!(matches!(
            monitor.reasons(&perception(f32::NAN, 10.0))[..],
            [EmergencyReason::LowBattery { level }] if level.is_nan()
        ));
        assert!(monitor.update(&perception(80.0, f32::INFINITY)));
    }
}
