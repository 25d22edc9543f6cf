// src/config.rs

//! Static tunables for the flight core.
//!
//! Nothing here is renegotiated at runtime. Values come from
//! [`CoreConfig::default`], or from [`CoreConfig::load`], which layers an
//! optional TOML file and `PURSUIT_`-prefixed environment variables (nested
//! keys separated by `__`, e.g. `PURSUIT_CONTROL__MAX_THRUST=0.7`) over the
//! defaults and validates the result.

use crate::error::{CoreError, CoreResult};
use crate::perception::EnvelopeLimits;
use crate::pid::PidGains3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix read by [`CoreConfig::load`].
pub const ENV_PREFIX: &str = "PURSUIT";

/// Perception tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Smoother process noise.
    pub process_noise: f32,
    /// Smoother measurement noise.
    pub measurement_noise: f32,
    /// Margin added to an obstacle's extent to form its safety radius.
    pub min_safe_distance: f32,
    /// Closest approach below this is a critical threat.
    pub critical_distance: f32,
    /// Collision lookahead horizon, seconds.
    pub collision_lookahead: f32,
    /// Probe distance of the safe-direction sampler.
    pub check_distance: f32,
    /// Azimuth samples of the heading grid.
    pub azimuth_samples: usize,
    /// Elevation samples of the heading grid.
    pub elevation_samples: usize,
    /// Samples kept in each perception history.
    pub history_len: usize,
    /// Altitude band reported in the flight envelope.
    pub altitude_limits: (f32, f32),
    /// Airframe performance limits.
    pub envelope: EnvelopeLimits,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            process_noise: 0.1,
            measurement_noise: 0.5,
            min_safe_distance: 3.0,
            critical_distance: 1.5,
            collision_lookahead: 2.0,
            check_distance: 10.0,
            azimuth_samples: 16,
            elevation_samples: 5,
            history_len: 50,
            altitude_limits: (1.0, 100.0),
            envelope: EnvelopeLimits::default(),
        }
    }
}

/// Control tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Control loop rate; the PID time step is its inverse.
    pub update_rate_hz: f32,
    /// Gains of the position controller, axes `(x, y, z)`.
    pub position_gains: PidGains3<f32>,
    /// Gains of the orientation controller, axes `(pitch, roll, yaw)`.
    pub orientation_gains: PidGains3<f32>,
    /// Pitch and roll limit, degrees.
    pub max_tilt_angle_deg: f32,
    /// Thrust limit, `(0, 1]`.
    pub max_thrust: f32,
    /// Lowest safe altitude.
    pub min_altitude: f32,
    /// Highest safe altitude.
    pub max_altitude: f32,
    /// Battery percentage below which emergency is forced.
    pub battery_emergency_threshold: f32,
    /// Assumed closing speed for intercept lead, m/s.
    pub intercept_speed: f32,
    /// Lateral velocity damping gain used during emergency descent.
    pub emergency_damping: f32,
    /// Floor on the time step in the PID derivative term.
    pub min_dt: f32,
    /// Control actions kept in the executor's history.
    pub history_len: usize,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            update_rate_hz: 200.0,
            position_gains: PidGains3 {
                kp: (2.0, 2.0, 2.0),
                ki: (0.1, 0.1, 0.1),
                kd: (0.5, 0.5, 0.5),
            },
            orientation_gains: PidGains3 {
                kp: (3.0, 3.0, 1.5),
                ki: (0.1, 0.1, 0.05),
                kd: (0.8, 0.8, 0.3),
            },
            max_tilt_angle_deg: 45.0,
            max_thrust: 0.8,
            min_altitude: 1.0,
            max_altitude: 100.0,
            battery_emergency_threshold: 15.0,
            intercept_speed: 10.0,
            emergency_damping: 0.1,
            min_dt: 0.001,
            history_len: 1000,
        }
    }
}

impl ControlConfig {
    /// PID time step, seconds.
    pub fn dt(&self) -> f32 {
        1.0 / self.update_rate_hz
    }
}

/// Complete flight core configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Perception tunables.
    pub perception: PerceptionConfig,
    /// Control tunables.
    pub control: ControlConfig,
}

fn require(ok: bool, message: &str) -> CoreResult<()> {
    if ok {
        Ok(())
    } else {
        Err(CoreError::InvalidConfig(message.to_owned()))
    }
}

impl CoreConfig {
    /// Loads defaults, then the TOML file at `path` if it exists, then
    /// environment overrides, and validates the result.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path.as_ref()).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: CoreConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the core cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        let p = &self.perception;
        let c = &self.control;

        require(p.process_noise > 0.0, "process_noise must be positive")?;
        require(p.measurement_noise > 0.0, "measurement_noise must be positive")?;
        require(p.min_safe_distance >= 0.0, "min_safe_distance must not be negative")?;
        require(p.collision_lookahead > 0.0, "collision_lookahead must be positive")?;
        require(p.check_distance > 0.0, "check_distance must be positive")?;
        require(
            p.azimuth_samples > 0 && p.elevation_samples > 0,
            "heading grid needs at least one sample per axis",
        )?;

        require(c.update_rate_hz > 0.0, "update_rate_hz must be positive")?;
        require(
            c.max_thrust > 0.0 && c.max_thrust <= 1.0,
            "max_thrust must be in (0, 1]",
        )?;
        require(
            c.max_tilt_angle_deg > 0.0 && c.max_tilt_angle_deg <= 90.0,
            "max_tilt_angle_deg must be in (0, 90]",
        )?;
        require(
            c.min_altitude < c.max_altitude,
            "min_altitude must be below max_altitude",
        )?;
        require(c.intercept_speed > 0.0, "intercept_speed must be positive")?;
        require(c.min_dt > 0.0, "min_dt must be positive")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Defaults pass validation.
    #[test]
    fn test_defaults_are_valid() {
        let config = CoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.control.update_rate_hz, 200.0);
        assert!((config.control.dt() - 0.005).abs() < 1e-9);
    }

    /// An inverted altitude band is rejected.
    #[test]
    fn test_rejects_inverted_altitude_band() {
        let mut config = CoreConfig::default();
        config.control.min_altitude = 50.0;
        config.control.max_altitude = 10.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
        assert!(err.to_string().contains("min_altitude"));
    }

    /// A thrust ceiling above 1 is rejected.
    #[test]
    fn test_rejects_bad_thrust() {
        let mut config = CoreConfig::default();
        config.control.max_thrust = 1.5;
        assert!(config.validate().is_err());
    }

    /// A missing file loads the defaults.
    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CoreConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, CoreConfig::default());
    }

    /// A partial file overrides only its keys.
    #[test]
    fn test_load_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("core.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[perception]
min_safe_distance = 4.5

[control]
max_thrust = 0.7
position_gains = {{ kp = [1.0, 1.5, 1.0], ki = [0.0, 0.0, 0.0], kd = [0.2, 0.2, 0.2] }}
"#
        )
        .unwrap();

        let config = CoreConfig::load(&path).unwrap();
        assert_eq!(config.perception.min_safe_distance, 4.5);
        assert_eq!(config.perception.critical_distance, 1.5);
        assert_eq!(config.control.max_thrust, 0.7);
        assert_eq!(config.control.position_gains.kp, (1.0, 1.5, 1.0));
        assert_eq!(config.control.battery_emergency_threshold, 15.0);
    }

    /// Loaded values are validated.
    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[control]\nupdate_rate_hz = 0.0\n").unwrap();
        assert!(matches!(
            CoreConfig::load(&path),
            Err(CoreError::InvalidConfig(_))
        ));
    }
}
