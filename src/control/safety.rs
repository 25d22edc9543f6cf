// src/control/safety.rs

//! Safety limiter: the last stage every [`DroneCommand`] passes through.
//!
//! No mode can bypass it, Emergency included. Non-finite channels are
//! replaced with neutral values before clamping, so NaN never reaches the
//! actuators.

use crate::config::ControlConfig;
use crate::types::DroneCommand;

/// Thrust forced when flying below the minimum altitude.
pub const LOW_ALTITUDE_THRUST: f32 = 0.6;

/// Neutral thrust substituted for a non-finite value.
pub const NEUTRAL_THRUST: f32 = 0.5;

/// Flag set when the low-altitude override fires.
pub const LOW_ALTITUDE_FLAG: &str = "low_altitude_override";

fn finite_or(value: f32, neutral: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        neutral
    }
}

/// Global actuator limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyLimiter {
    /// Thrust ceiling, `(0, 1]`.
    pub max_thrust: f32,
    /// Pitch and roll limit in radians.
    pub max_tilt: f32,
    /// Altitude below which climb is forced.
    pub min_altitude: f32,
}

impl SafetyLimiter {
    /// Limiter using the limits of `config`.
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            max_thrust: config.max_thrust,
            max_tilt: config.max_tilt_angle_deg.to_radians(),
            min_altitude: config.min_altitude,
        }
    }

    /// Clamps `command` in place for a drone at `altitude`. An unknown
    /// (NaN) altitude counts as too low.
    pub fn apply(&self, command: &mut DroneCommand, altitude: f32) {
        let tilt = self.max_tilt;

        command.thrust = finite_or(command.thrust, NEUTRAL_THRUST).clamp(0.0, self.max_thrust);
        command.pitch = finite_or(command.pitch, 0.0).clamp(-tilt, tilt);
        command.roll = finite_or(command.roll, 0.0).clamp(-tilt, tilt);
        command.yaw = finite_or(command.yaw, 0.0).clamp(-1.0, 1.0);

        let too_low = altitude.is_nan() || altitude < self.min_altitude;
        if too_low && command.thrust < LOW_ALTITUDE_THRUST {
            command.thrust = LOW_ALTITUDE_THRUST.min(self.max_thrust);
            // no backward tilt while climbing out
            command.pitch = command.pitch.max(0.0);
            command.mode_flags.set(LOW_ALTITUDE_FLAG);
        }
    }
}
