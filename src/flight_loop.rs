// src/flight_loop.rs

//! # Flight Loop
//!
//! One [`FlightLoop::tick`] runs perceive → control → emit synchronously.
//! The loop owns every piece of tick state. It does not sleep or schedule
//! itself: the caller invokes `tick` once per [`FlightLoop::tick_interval`].
//!
//! The planner hands commands over through a [`CommandSlot`]. Publishing
//! replaces the slot's content, and the loop copies the latest command once
//! at the start of each tick, so a command published mid-tick takes effect
//! on the next one and is never seen half-written. Without a new command the
//! previous one stays authoritative indefinitely.

use crate::config::CoreConfig;
use crate::control::ControlExecutor;
use crate::error::CoreResult;
use crate::perception::{PerceptionEngine, PerceptionState};
use crate::types::{ControlCommand, DroneCommand, RawSnapshot};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::info;

/// Latest-wins handoff of [`ControlCommand`]s from the planner.
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct CommandSlot {
    inner: Arc<Mutex<Option<ControlCommand>>>,
}

impl CommandSlot {
    /// An empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the slot's command.
    pub fn publish(&self, command: ControlCommand) {
        let mut slot = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(command);
    }

    /// Copy of the latest command.
    pub fn latest(&self) -> Option<ControlCommand> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Everything one tick produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutput {
    /// World model the command was computed from.
    pub perception: PerceptionState,
    /// Safety-limited actuator command.
    pub command: DroneCommand,
}

/// The fixed-rate perceive → control → emit loop.
pub struct FlightLoop {
    perception: PerceptionEngine,
    executor: ControlExecutor,
    commands: CommandSlot,
    tick_interval: Duration,
}

impl FlightLoop {
    /// Validates `config` and builds a loop with an empty command slot.
    pub fn new(config: CoreConfig) -> CoreResult<Self> {
        config.validate()?;
        let CoreConfig {
            mut perception,
            control,
        } = config;
        perception.altitude_limits = (control.min_altitude, control.max_altitude);

        let tick_interval = Duration::from_nanos((1e9 / f64::from(control.update_rate_hz)).round() as u64);
        info!(
            update_rate_hz = control.update_rate_hz,
            max_thrust = control.max_thrust,
            "flight loop ready"
        );

        Ok(Self {
            perception: PerceptionEngine::new(perception),
            executor: ControlExecutor::new(control),
            commands: CommandSlot::new(),
            tick_interval,
        })
    }

    /// Runs one tick on `snapshot`.
    pub fn tick(&mut self, snapshot: &RawSnapshot) -> TickOutput {
        let command = self.commands.latest();
        let perception = self.perception.process(snapshot);
        let drone_command = self.executor.execute(command.as_ref(), &perception);
        TickOutput {
            perception,
            command: drone_command,
        }
    }

    /// Handle the planner publishes commands through.
    pub fn command_slot(&self) -> CommandSlot {
        self.commands.clone()
    }

    /// Period at which [`FlightLoop::tick`] should be called.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Perception engine.
    pub fn perception(&self) -> &PerceptionEngine {
        &self.perception
    }

    /// Control executor.
    pub fn executor(&self) -> &ControlExecutor {
        &self.executor
    }
}
