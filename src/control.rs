// src/control.rs

//! # Control Executor
//!
//! A mode-based state machine turning the latest [`ControlCommand`] and the
//! current [`PerceptionState`] into one safety-limited [`DroneCommand`] per
//! tick.
//!
//! ## Tick order
//!
//! 1. Adopt the command if its `command_id` is new. This restarts the
//!    command clock but leaves the PID state alone.
//! 2. Evaluate the emergency predicates. While any holds the effective mode
//!    is [`ControlMode::Emergency`], whatever the command asks for.
//! 3. If the effective mode changed, reset both PID controllers and enter
//!    the new mode's law.
//! 4. Compute the law's raw command.
//! 5. Apply the [`SafetyLimiter`].
//! 6. Record the action in the bounded [`ControlHistory`].
//!
//! No step can fail. A command that cannot be honoured (a waypoint without a
//! position, an intercept with no target) degrades to holding position.

pub mod emergency;
pub use emergency::*;
pub mod history;
pub use history::*;
pub mod intercept;
pub use intercept::*;
pub mod mode;
pub use mode::*;
pub mod safety;
pub use safety::*;

use crate::config::ControlConfig;
use crate::perception::PerceptionState;
use crate::types::{ControlCommand, ControlMode, DroneCommand};
use tracing::{debug, info, trace};

/// Mode state machine with its PID controllers, emergency latch and
/// control history.
pub struct ControlExecutor {
    config: ControlConfig,
    pids: Controllers,
    monitor: EmergencyMonitor,
    limiter: SafetyLimiter,
    history: ControlHistory,
    command: Option<ControlCommand>,
    command_start_time: f64,
    law: Option<ModeLaw>,
}

impl ControlExecutor {
    /// Executor in Hover with fresh controllers.
    pub fn new(config: ControlConfig) -> Self {
        Self {
            pids: Controllers::new(&config),
            monitor: EmergencyMonitor::new(&config),
            limiter: SafetyLimiter::new(&config),
            history: ControlHistory::new(config.history_len),
            command: None,
            command_start_time: 0.0,
            law: None,
            config,
        }
    }

    /// Runs one tick. `command` is the planner's latest command, if any; a
    /// command whose id matches the one in force is ignored.
    pub fn execute(
        &mut self,
        command: Option<&ControlCommand>,
        perception: &PerceptionState,
    ) -> DroneCommand {
        if let Some(command) = command {
            self.adopt(command, perception.timestamp);
        }

        let emergency = self.monitor.update(perception);
        let mode = if emergency {
            ControlMode::Emergency
        } else {
            self.requested_mode()
        };

        let previous = self.law;
        let law = match previous {
            Some(law) if law.mode() == mode => law,
            _ => {
                debug!(
                    from = %previous.map_or(ControlMode::Hover, |law| law.mode()),
                    to = %mode,
                    "control mode changed"
                );
                self.pids.reset();
                let law = ModeLaw::enter(mode, perception);
                self.law = Some(law);
                law
            }
        };

        let mut output = law.compute(&mut self.pids, &self.config, self.command.as_ref(), perception);
        self.limiter.apply(&mut output, perception.altitude());

        trace!(
            timestamp = perception.timestamp,
            %mode,
            thrust = output.thrust,
            pitch = output.pitch,
            roll = output.roll,
            yaw = output.yaw,
            "control computed"
        );

        self.history.push(ControlRecord {
            timestamp: perception.timestamp,
            mode,
            emergency,
            command_id: self.command.as_ref().map(|command| command.command_id.clone()),
            command: output.clone(),
            position: perception.drone_position,
            target_distance: perception.target_distance,
            battery_level: perception.battery_level,
            threat_count: perception.threats.len(),
        });

        output
    }

    fn adopt(&mut self, command: &ControlCommand, timestamp: f64) {
        let same = self
            .command
            .as_ref()
            .is_some_and(|current| current.command_id == command.command_id);
        if same {
            return;
        }

        info!(
            command_id = %command.command_id,
            mode = %command.mode,
            urgency = command.urgency.as_str(),
            "command adopted"
        );
        self.command = Some(command.clone());
        self.command_start_time = timestamp;
    }

    fn requested_mode(&self) -> ControlMode {
        self.command
            .as_ref()
            .map_or(ControlMode::Hover, |command| command.mode)
    }

    /// Effective mode of the last tick; Hover before the first.
    pub fn mode(&self) -> ControlMode {
        self.law.map_or(ControlMode::Hover, |law| law.mode())
    }

    /// Law in force, with its mode-entry state.
    pub fn law(&self) -> Option<&ModeLaw> {
        self.law.as_ref()
    }

    /// Whether emergency is latched.
    pub fn is_emergency(&self) -> bool {
        self.monitor.is_latched()
    }

    /// Command in force.
    pub fn current_command(&self) -> Option<&ControlCommand> {
        self.command.as_ref()
    }

    /// Seconds since the command in force was adopted.
    pub fn command_elapsed(&self, now: f64) -> Option<f64> {
        self.command
            .as_ref()
            .map(|_| now - self.command_start_time)
    }

    /// PID controllers.
    pub fn controllers(&self) -> &Controllers {
        &self.pids
    }

    /// Control actions, oldest first.
    pub fn history(&self) -> &ControlHistory {
        &self.history
    }

    /// Configuration in use.
    pub fn config(&self) -> &ControlConfig {
        &self.config
    }
}
