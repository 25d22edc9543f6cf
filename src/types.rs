// src/types.rs

//! Data exchanged with the collaborators around the flight core.
//!
//! ```text
//! Sensing (every tick)          Planner (slow, async)
//!        │                             │
//!        ├──► RawSnapshot              ├──► ControlCommand (latest wins)
//!        │                             │
//!        ▼                             ▼
//!  PerceptionEngine ──► PerceptionState ──► ControlExecutor ──► DroneCommand
//! ```
//!
//! All positions use the y-up world frame described in [`crate::geometry`].
//! Every type here is plain data and serialises with `serde`, so transport
//! collaborators can move it as JSON or any other serde format.

use core::fmt;
use nalgebra::Vector3;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Drone kinematics as reported by the sensing collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DroneKinematics {
    /// Position in metres; `y` is altitude.
    pub position: Vector3<f32>,
    /// Velocity in metres per second.
    pub velocity: Vector3<f32>,
    /// Orientation as `(pitch, roll, yaw)` in radians.
    pub orientation: Vector3<f32>,
    /// Battery level in percent, 0 to 100.
    pub battery_level: f32,
    /// Whether the motors are armed.
    pub armed: bool,
}

impl Default for DroneKinematics {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            orientation: Vector3::zeros(),
            battery_level: 100.0,
            armed: true,
        }
    }
}

/// Target observation. Position and velocity are meaningless when the
/// target is not visible.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TargetObservation {
    /// Observed target position.
    pub position: Vector3<f32>,
    /// Observed target velocity.
    pub velocity: Vector3<f32>,
    /// Visibility flag.
    pub visible: bool,
}

impl TargetObservation {
    /// A visible target.
    pub fn visible(position: Vector3<f32>, velocity: Vector3<f32>) -> Self {
        Self {
            position,
            velocity,
            visible: true,
        }
    }

    /// No target in view.
    pub fn hidden() -> Self {
        Self::default()
    }
}

/// An obstacle as reported by sensing. Obstacles are never filtered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Centre position.
    pub position: Vector3<f32>,
    /// Extent as `(width, height, depth)`.
    pub size: Vector3<f32>,
    /// Velocity; absent means stationary.
    #[serde(default)]
    pub velocity: Option<Vector3<f32>>,
}

impl Obstacle {
    /// A stationary cubic obstacle.
    pub fn stationary(position: Vector3<f32>, size: f32) -> Self {
        Self {
            position,
            size: Vector3::repeat(size),
            velocity: None,
        }
    }

    /// A moving cubic obstacle.
    pub fn moving(position: Vector3<f32>, size: f32, velocity: Vector3<f32>) -> Self {
        Self {
            velocity: Some(velocity),
            ..Self::stationary(position, size)
        }
    }

    /// Largest extent along any axis.
    pub fn extent(&self) -> f32 {
        self.size.max()
    }

    /// Velocity, zero when unknown.
    pub fn velocity_or_zero(&self) -> Vector3<f32> {
        self.velocity.unwrap_or_else(Vector3::zeros)
    }
}

/// One tick's raw world snapshot. Immutable once handed to perception.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawSnapshot {
    /// Snapshot time in seconds.
    pub timestamp: f64,
    /// Drone state.
    pub drone: DroneKinematics,
    /// Target state.
    pub target: TargetObservation,
    /// Obstacles in view.
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
}

/// Control modes a planner may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ControlMode {
    /// Hold the position at which the mode was entered.
    #[default]
    Hover,
    /// Fly to the commanded position.
    Waypoint,
    /// Pursue the target with lead.
    Intercept,
    /// Steer away from current threats.
    Avoid,
    /// Controlled descent with limited authority.
    Emergency,
}

impl ControlMode {
    /// All modes, in declaration order.
    pub const ALL: [ControlMode; 5] = [
        ControlMode::Hover,
        ControlMode::Waypoint,
        ControlMode::Intercept,
        ControlMode::Avoid,
        ControlMode::Emergency,
    ];

    /// Wire tag of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlMode::Hover => "hover",
            ControlMode::Waypoint => "waypoint",
            ControlMode::Intercept => "intercept",
            ControlMode::Avoid => "avoid",
            ControlMode::Emergency => "emergency",
        }
    }

    /// Parses a wire tag. Unknown tags fail closed to [`ControlMode::Hover`].
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(tag))
            .unwrap_or_else(|| {
                debug!(tag, "unknown control mode, falling back to hover");
                ControlMode::Hover
            })
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl Serialize for ControlMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ControlMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(ControlMode::from_tag(&tag))
    }
}

/// Urgency the planner attaches to a command. Carried for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum CommandUrgency {
    /// Routine.
    #[default]
    Low,
    /// Elevated.
    Medium,
    /// High.
    High,
    /// Critical.
    Critical,
}

impl CommandUrgency {
    /// Wire tag of the urgency.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandUrgency::Low => "low",
            CommandUrgency::Medium => "medium",
            CommandUrgency::High => "high",
            CommandUrgency::Critical => "critical",
        }
    }

    /// Parses a wire tag. Unknown tags map to [`CommandUrgency::Low`].
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "medium" => CommandUrgency::Medium,
            "high" => CommandUrgency::High,
            "critical" => CommandUrgency::Critical,
            _ => CommandUrgency::Low,
        }
    }
}

impl Serialize for CommandUrgency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CommandUrgency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(CommandUrgency::from_tag(&tag))
    }
}

/// A navigation command from the planner. A command with a new
/// `command_id` replaces the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlCommand {
    /// Identifier; inequality means "new command".
    pub command_id: String,
    /// Planner time in seconds.
    #[serde(default)]
    pub timestamp: f64,
    /// Requested mode.
    pub mode: ControlMode,
    /// Position to fly to, or the target to intercept when perception has none.
    #[serde(default)]
    pub target_position: Option<Vector3<f32>>,
    /// Velocity of the commanded target, used by intercept.
    #[serde(default)]
    pub target_velocity: Option<Vector3<f32>>,
    /// Intended duration in milliseconds.
    #[serde(default)]
    pub duration_ms: u64,
    /// Planner urgency.
    #[serde(default)]
    pub urgency: CommandUrgency,
    /// Free-form numeric parameters.
    #[serde(default)]
    pub parameters: HashMap<String, f64>,
}

impl ControlCommand {
    /// A command with no target and default urgency.
    pub fn new(command_id: impl Into<String>, mode: ControlMode) -> Self {
        Self {
            command_id: command_id.into(),
            timestamp: 0.0,
            mode,
            target_position: None,
            target_velocity: None,
            duration_ms: 0,
            urgency: CommandUrgency::Low,
            parameters: HashMap::new(),
        }
    }

    /// Sets the target position.
    pub fn with_target_position(mut self, position: Vector3<f32>) -> Self {
        self.target_position = Some(position);
        self
    }

    /// Sets the target velocity.
    pub fn with_target_velocity(mut self, velocity: Vector3<f32>) -> Self {
        self.target_velocity = Some(velocity);
        self
    }

    /// Sets the urgency.
    pub fn with_urgency(mut self, urgency: CommandUrgency) -> Self {
        self.urgency = urgency;
        self
    }
}

/// Named boolean diagnostics attached to a [`DroneCommand`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeFlags(BTreeMap<String, bool>);

impl ModeFlags {
    /// Flags with every name in `names` set.
    pub fn of(names: &[&str]) -> Self {
        let mut flags = Self::default();
        for name in names {
            flags.set(name);
        }
        flags
    }

    /// Sets a flag.
    pub fn set(&mut self, name: &str) {
        self.0.insert(name.to_owned(), true);
    }

    /// Whether a flag is set.
    pub fn is_set(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }

    /// Names of the set flags in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter(|(_, set)| **set).map(|(name, _)| name.as_str())
    }
}

/// The low-level actuator command emitted once per tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DroneCommand {
    /// Tick time in seconds.
    pub timestamp: f64,
    /// Collective thrust, `[0, 1]`.
    pub thrust: f32,
    /// Pitch in radians. Positive tilts the drone towards `+x` (nose down
    /// into forward flight); negative tilts it back towards `-x`.
    pub pitch: f32,
    /// Roll, positive towards `+z`.
    pub roll: f32,
    /// Yaw rate command, `[-1, 1]`.
    pub yaw: f32,
    /// Diagnostic flags.
    pub mode_flags: ModeFlags,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mode tags parse back to their mode.
    #[test]
    fn test_mode_tags_round_trip() {
        for mode in ControlMode::ALL {
            assert_eq!(mode, ControlMode::from_tag(mode.as_str()));
        }
        assert_eq!(ControlMode::Intercept, ControlMode::from_tag(" INTERCEPT "));
    }

    /// An unknown mode tag becomes Hover.
    #[test]
    fn test_unknown_mode_fails_closed() {
        assert_eq!(ControlMode::Hover, ControlMode::from_tag("return_home"));
        assert_eq!(ControlMode::Hover, ControlMode::from_tag(""));
    }

    /// A command with an unknown mode still deserialises.
    #[test]
    fn test_command_from_json_with_unknown_mode() {
        let json = r#"{
            "command_id": "cmd-7",
            "mode": "barrel_roll",
            "urgency": "extreme",
            "target_position": [1.0, 2.0, 3.0]
        }"#;
        let command: ControlCommand = serde_json::from_str(json).unwrap();
        assert_eq!(command.mode, ControlMode::Hover);
        assert_eq!(command.urgency, CommandUrgency::Low);
        assert_eq!(command.target_position, Some(Vector3::new(1.0, 2.0, 3.0)));
        assert!(command.parameters.is_empty());
    }

    /// Snapshots deserialise from planner JSON.
    #[test]
    fn test_snapshot_from_json() {
        let json = r#"{
            "timestamp": 1.5,
            "drone": {
                "position": [0.0, 5.0, 0.0],
                "velocity": [0.0, 0.0, 0.0],
                "orientation": [0.0, 0.0, 0.0],
                "battery_level": 85.0,
                "armed": true
            },
            "target": { "position": [0.0, 0.0, 0.0], "velocity": [0.0, 0.0, 0.0], "visible": false },
            "obstacles": [ { "position": [4.0, 5.0, 0.0], "size": [1.0, 2.0, 1.0] } ]
        }"#;
        let snapshot: RawSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.obstacles.len(), 1);
        assert_eq!(snapshot.obstacles[0].extent(), 2.0);
        assert_eq!(snapshot.obstacles[0].velocity_or_zero(), Vector3::zeros());
    }

    /// Flags report only what was set.
    #[test]
    fn test_mode_flags() {
        let flags = ModeFlags::of(&["intercept", "aggressive"]);
        assert!(flags.is_set("intercept"));
        assert!(!flags.is_set("hover"));
        assert_eq!(flags.names().collect::<Vec<_>>(), vec!["aggressive", "intercept"]);
        assert_eq!(serde_json::to_string(&flags).unwrap(), r#"{"aggressive":true,"intercept":true}"#);
    }
}
