// src/perception/envelope.rs

//! Flight envelope: the performance limits the planner should respect on
//! this tick.

use serde::{Deserialize, Serialize};

/// Static performance limits of the airframe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeLimits {
    /// Maximum speed, m/s.
    pub max_speed: f32,
    /// Maximum acceleration, m/s².
    pub max_acceleration: f32,
    /// Maximum climb rate, m/s.
    pub max_climb_rate: f32,
    /// Maximum descent rate, m/s.
    pub max_descent_rate: f32,
    /// Maximum bank angle, degrees.
    pub max_bank_angle: f32,
    /// Battery level in percent above which reserves are considered intact.
    pub reserve_threshold: f32,
}

impl Default for EnvelopeLimits {
    fn default() -> Self {
        Self {
            max_speed: 15.0,
            max_acceleration: 8.0,
            max_climb_rate: 5.0,
            max_descent_rate: 3.0,
            max_bank_angle: 45.0,
            reserve_threshold: 20.0,
        }
    }
}

/// Current flight envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightEnvelope {
    /// Maximum speed, m/s.
    pub max_speed: f32,
    /// Maximum acceleration, m/s².
    pub max_acceleration: f32,
    /// Maximum climb rate, m/s.
    pub max_climb_rate: f32,
    /// Maximum descent rate, m/s.
    pub max_descent_rate: f32,
    /// Maximum bank angle, degrees.
    pub max_bank_angle: f32,
    /// Battery level as a fraction, `battery / 100`.
    pub battery_limit_factor: f32,
    /// Allowed altitude band as `(min, max)`.
    pub altitude_limits: (f32, f32),
    /// Whether the battery is above the reserve threshold.
    pub emergency_reserves: bool,
}

impl FlightEnvelope {
    /// Builds the envelope for the given battery level.
    pub fn new(limits: &EnvelopeLimits, battery_level: f32, altitude_limits: (f32, f32)) -> Self {
        Self {
            max_speed: limits.max_speed,
            max_acceleration: limits.max_acceleration,
            max_climb_rate: limits.max_climb_rate,
            max_descent_rate: limits.max_descent_rate,
            max_bank_angle: limits.max_bank_angle,
            battery_limit_factor: (battery_level / 100.0).clamp(0.0, 1.0),
            altitude_limits,
            emergency_reserves: battery_level > limits.reserve_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    /// Envelope limits scale with battery.
    #[test]
    fn test_envelope_from_battery() {
        let envelope = FlightEnvelope::new(&EnvelopeLimits::default(), 85.0, (1.0, 100.0));
        assert!(value_close(0.85, envelope.battery_limit_factor));
        assert!(envelope.emergency_reserves);
        assert!(value_close(15.0, envelope.max_speed));
        assert_eq!(envelope.altitude_limits, (1.0, 100.0));
    }

    /// A low battery drops the reserves and floors the factor at zero.
    #[test]
    fn test_envelope_low_battery() {
        let envelope = FlightEnvelope::new(&EnvelopeLimits::default(), 20.0, (1.0, 100.0));
        assert!(!envelope.emergency_reserves);
        let envelope = FlightEnvelope::new(&EnvelopeLimits::default(), -5.0, (1.0, 100.0));
        assert!(value_close(0.0, envelope.battery_limit_factor));
    }
}
