// src/control/mode.rs

//! # Mode Laws
//!
//! One variant per [`ControlMode`]. A law is created by [`ModeLaw::enter`]
//! when its mode becomes effective and captures whatever it must freeze at
//! that moment. [`ModeLaw::compute`] then turns the current perception into
//! a raw [`DroneCommand`], before the safety limiter.
//!
//! All laws except Emergency drive the position PID. The position effort
//! `u = (x, y, z)` maps to channels as `pitch ← u.x`, `thrust ← 0.5 + u.y`,
//! `roll ← u.z`, each clamped per mode:
//!
//! | mode      | thrust          | pitch / roll | yaw              |
//! |-----------|-----------------|--------------|------------------|
//! | hover     | `[0, 1]`        | `±0.5`       | 0                |
//! | waypoint  | `[0, 1]`        | `±0.7`       | 0                |
//! | intercept | `[0, max]`      | `±0.8`       | orientation PID  |
//! | avoid     | `[0.3, 1]`      | `±1.0`       | 0                |
//! | emergency | `[0.3, 0.6]`    | `±0.3`       | 0                |

use crate::config::ControlConfig;
use crate::control::intercept::aim_point;
use crate::geometry::{angular_distance, bearing, heading_vector, wrap_angle};
use crate::perception::PerceptionState;
use crate::pid::PidController3;
use crate::types::{ControlCommand, ControlMode, DroneCommand, ModeFlags};
use nalgebra::Vector3;
use tracing::debug;

/// Baseline thrust around which the vertical effort is applied.
pub const HOVER_THRUST: f32 = 0.5;

/// Waypoint effort ramps down inside this distance.
pub const WAYPOINT_SLOWDOWN_DISTANCE: f32 = 5.0;

/// Intercept effort scales with `distance / INTERCEPT_SCALE_DISTANCE`.
pub const INTERCEPT_SCALE_DISTANCE: f32 = 10.0;

/// Upper bound on the intercept effort scale.
pub const INTERCEPT_MAX_SCALE: f32 = 2.0;

/// Distance flown along the chosen heading when avoiding.
pub const AVOID_DISTANCE: f32 = 5.0;

/// Floor on time-to-collision in the avoidance weights.
pub const AVOID_MIN_TTC: f32 = 0.1;

/// Emergency descent step below the current altitude.
pub const EMERGENCY_DESCENT_STEP: f32 = 1.0;

/// Lowest emergency descent set-point.
pub const EMERGENCY_FLOOR: f32 = 0.5;

/// The two independent PID controllers driven by the mode laws.
pub struct Controllers {
    /// Position controller, axes `(x, y, z)`.
    pub position: PidController3<f32>,
    /// Orientation controller, axes `(pitch, roll, yaw)`.
    pub orientation: PidController3<f32>,
}

impl Controllers {
    /// Fresh controllers with the gains of `config`.
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            position: PidController3::with_gains(config.position_gains, config.min_dt),
            orientation: PidController3::with_gains(config.orientation_gains, config.min_dt),
        }
    }

    /// Resets both controllers.
    pub fn reset(&mut self) {
        self.position.reset();
        self.orientation.reset();
    }

    fn position_effort(&mut self, error: Vector3<f32>, dt: f32) -> Vector3<f32> {
        let (x, y, z) = self.position.update((error.x, error.y, error.z), dt);
        Vector3::new(x, y, z)
    }
}

/// Per-mode channel limits applied to the position effort.
struct Shaping {
    thrust: (f32, f32),
    tilt: f32,
}

impl Shaping {
    fn command(&self, timestamp: f64, effort: Vector3<f32>, yaw: f32, flags: ModeFlags) -> DroneCommand {
        DroneCommand {
            timestamp,
            thrust: (HOVER_THRUST + effort.y).clamp(self.thrust.0, self.thrust.1),
            pitch: effort.x.clamp(-self.tilt, self.tilt),
            roll: effort.z.clamp(-self.tilt, self.tilt),
            yaw,
            mode_flags: flags,
        }
    }
}

const HOVER: Shaping = Shaping {
    thrust: (0.0, 1.0),
    tilt: 0.5,
};
const WAYPOINT: Shaping = Shaping {
    thrust: (0.0, 1.0),
    tilt: 0.7,
};
const AVOID: Shaping = Shaping {
    thrust: (0.3, 1.0),
    tilt: 1.0,
};
const EMERGENCY: Shaping = Shaping {
    thrust: (0.3, 0.6),
    tilt: 0.3,
};
const INTERCEPT_TILT: f32 = 0.8;

/// A control law with its mode-entry state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModeLaw {
    /// Hold `set_point`, frozen on entry.
    Hover {
        /// Position held.
        set_point: Vector3<f32>,
    },
    /// Fly to the commanded position.
    Waypoint {
        /// Position held when the command has no target.
        hold: Vector3<f32>,
    },
    /// Pursue the target with lead.
    Intercept {
        /// Position held when no target is known.
        hold: Vector3<f32>,
    },
    /// Steer away from current threats.
    Avoid,
    /// Bounded descent with damped lateral motion.
    Emergency,
}

impl ModeLaw {
    /// Law for `mode`, entered at the current filtered position.
    pub fn enter(mode: ControlMode, perception: &PerceptionState) -> Self {
        let here = perception.drone_position;
        match mode {
            ControlMode::Hover => ModeLaw::Hover { set_point: here },
            ControlMode::Waypoint => ModeLaw::Waypoint { hold: here },
            ControlMode::Intercept => ModeLaw::Intercept { hold: here },
            ControlMode::Avoid => ModeLaw::Avoid,
            ControlMode::Emergency => ModeLaw::Emergency,
        }
    }

    /// Mode this law implements.
    pub fn mode(&self) -> ControlMode {
        match self {
            ModeLaw::Hover { .. } => ControlMode::Hover,
            ModeLaw::Waypoint { .. } => ControlMode::Waypoint,
            ModeLaw::Intercept { .. } => ControlMode::Intercept,
            ModeLaw::Avoid => ControlMode::Avoid,
            ModeLaw::Emergency => ControlMode::Emergency,
        }
    }

    /// Raw command for this tick.
    pub fn compute(
        &self,
        pids: &mut Controllers,
        config: &ControlConfig,
        command: Option<&ControlCommand>,
        perception: &PerceptionState,
    ) -> DroneCommand {
        let dt = config.dt();
        match *self {
            ModeLaw::Hover { set_point } => hover(pids, dt, set_point, perception, ModeFlags::of(&["hover"])),
            ModeLaw::Waypoint { hold } => match command.and_then(|command| command.target_position) {
                Some(target) => waypoint(pids, dt, target, perception),
                None => fallback(pids, dt, hold, perception, ControlMode::Waypoint),
            },
            ModeLaw::Intercept { hold } => match intercept_target(command, perception) {
                Some((target, velocity)) => {
                    intercept(pids, config, target, velocity.as_ref(), perception)
                }
                None => fallback(pids, dt, hold, perception, ControlMode::Intercept),
            },
            ModeLaw::Avoid => avoid(pids, dt, perception),
            ModeLaw::Emergency => emergency(config, perception),
        }
    }
}

fn hover(
    pids: &mut Controllers,
    dt: f32,
    set_point: Vector3<f32>,
    perception: &PerceptionState,
    flags: ModeFlags,
) -> DroneCommand {
    let effort = pids.position_effort(set_point - perception.drone_position, dt);
    HOVER.command(perception.timestamp, effort, 0.0, flags)
}

fn fallback(
    pids: &mut Controllers,
    dt: f32,
    hold: Vector3<f32>,
    perception: &PerceptionState,
    mode: ControlMode,
) -> DroneCommand {
    debug!(%mode, "no target for mode, holding position");
    hover(pids, dt, hold, perception, ModeFlags::of(&["hover", "fallback_hover"]))
}

fn waypoint(
    pids: &mut Controllers,
    dt: f32,
    target: Vector3<f32>,
    perception: &PerceptionState,
) -> DroneCommand {
    let error = target - perception.drone_position;
    let scale = (error.norm() / WAYPOINT_SLOWDOWN_DISTANCE).min(1.0);
    let effort = pids.position_effort(error, dt) * scale;
    WAYPOINT.command(perception.timestamp, effort, 0.0, ModeFlags::of(&["waypoint"]))
}

/// Perception's target when visible, otherwise the command's.
fn intercept_target(
    command: Option<&ControlCommand>,
    perception: &PerceptionState,
) -> Option<(Vector3<f32>, Option<Vector3<f32>>)> {
    match perception.target_position {
        Some(position) => Some((position, perception.target_velocity)),
        None => command.and_then(|command| {
            command
                .target_position
                .map(|position| (position, command.target_velocity))
        }),
    }
}

fn intercept(
    pids: &mut Controllers,
    config: &ControlConfig,
    target: Vector3<f32>,
    velocity: Option<&Vector3<f32>>,
    perception: &PerceptionState,
) -> DroneCommand {
    let dt = config.dt();
    let position = perception.drone_position;
    let (aim, _) = aim_point(&position, &target, velocity, config.intercept_speed);

    let error = aim - position;
    let scale = (error.norm() / INTERCEPT_SCALE_DISTANCE).min(INTERCEPT_MAX_SCALE);
    let effort = pids.position_effort(error, dt) * scale;

    let (azimuth, _) = bearing(&error);
    let yaw_error = wrap_angle(azimuth - perception.drone_orientation.z);
    let (_, _, yaw) = pids.orientation.update((0.0, 0.0, yaw_error), dt);

    let shaping = Shaping {
        thrust: (0.0, config.max_thrust),
        tilt: INTERCEPT_TILT,
    };
    shaping.command(
        perception.timestamp,
        effort,
        yaw.clamp(-1.0, 1.0),
        ModeFlags::of(&["intercept", "aggressive"]),
    )
}

/// Threat-weighted escape direction; zero with no threats.
pub fn avoidance_direction(perception: &PerceptionState) -> Vector3<f32> {
    let (sum, total) = perception.threats.iter().fold(
        (Vector3::<f32>::zeros(), 0.0_f32),
        |(sum, total), threat| {
            let weight = 1.0 / threat.time_to_collision.max(AVOID_MIN_TTC);
            (sum + threat.avoidance_vector * weight, total + weight)
        },
    );
    if total > 0.0 {
        sum / total
    } else {
        sum
    }
}

/// Point the avoid law steers towards.
pub fn avoidance_aim(perception: &PerceptionState) -> Vector3<f32> {
    let position = perception.drone_position;
    let direction = avoidance_direction(perception);
    let desired = bearing(&direction);

    let best = perception
        .safe_directions
        .iter()
        .copied()
        .min_by(|a, b| angular_distance(*a, desired).total_cmp(&angular_distance(*b, desired)));

    match best {
        Some(heading) => position + heading_vector(heading) * AVOID_DISTANCE,
        None => position + Vector3::new(0.0, AVOID_DISTANCE, 0.0) + direction,
    }
}

fn avoid(pids: &mut Controllers, dt: f32, perception: &PerceptionState) -> DroneCommand {
    let error = avoidance_aim(perception) - perception.drone_position;
    let effort = pids.position_effort(error, dt);
    AVOID.command(
        perception.timestamp,
        effort,
        0.0,
        ModeFlags::of(&["avoid", "emergency_maneuver"]),
    )
}

fn emergency(config: &ControlConfig, perception: &PerceptionState) -> DroneCommand {
    let altitude = perception.altitude();
    let set_point = (altitude - EMERGENCY_DESCENT_STEP).max(EMERGENCY_FLOOR);
    let damping = config.emergency_damping;
    let velocity = perception.drone_velocity;

    let effort = Vector3::new(
        -damping * velocity.x,
        config.position_gains.kp.1 * (set_point - altitude),
        -damping * velocity.z,
    );
    EMERGENCY.command(
        perception.timestamp,
        effort,
        0.0,
        ModeFlags::of(&["emergency", "landing"]),
    )
}
