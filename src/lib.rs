// src/lib.rs

//! # Pursuit Flight Core
//!
//! The real-time perception and control core of an autonomous pursuit
//! drone. Every tick, a [`RawSnapshot`] from sensing is filtered into a
//! [`PerceptionState`] (smoothed positions, target range and bearing,
//! ranked collision threats, safe headings, flight envelope), and the
//! planner's latest [`ControlCommand`] is turned into one safety-limited
//! [`DroneCommand`] by a mode-based PID state machine.
//!
//! ```text
//! RawSnapshot ─► PerceptionEngine ─► PerceptionState ─► ControlExecutor ─► DroneCommand
//!                 (KalmanSmoother,                        (ModeLaw, PID,
//!                  ThreatAnalyzer,                         EmergencyMonitor,
//!                  SafeDirectionSampler)                   SafetyLimiter)
//! ```
//!
//! [`FlightLoop`] wires the two halves together and takes commands from the
//! planner through a latest-wins [`CommandSlot`]. Ticks never fail; only
//! building the loop from an invalid [`CoreConfig`] returns an error.
//!
//! The crate logs through [`tracing`] and never installs a subscriber.
//!
//! ## Example
//!
//! ```
//! use pursuit_flight_core::{ControlCommand, ControlMode, CoreConfig, FlightLoop, RawSnapshot};
//! use nalgebra::Vector3;
//!
//! let mut flight = FlightLoop::new(CoreConfig::default()).unwrap();
//! flight.command_slot().publish(
//!     ControlCommand::new("wp-1", ControlMode::Waypoint)
//!         .with_target_position(Vector3::new(10.0, 5.0, 0.0)),
//! );
//!
//! let mut snapshot = RawSnapshot::default();
//! snapshot.drone.position = Vector3::new(0.0, 5.0, 0.0);
//! let output = flight.tick(&snapshot);
//!
//! assert!(output.command.mode_flags.is_set("waypoint"));
//! assert!(output.command.thrust <= 0.8);
//! ```

#![deny(missing_docs)]

pub mod config;
pub mod control;
pub mod error;
pub mod filter;
pub mod flight_loop;
pub mod geometry;
pub mod perception;
pub mod pid;
pub mod types;

#[doc(inline)]
pub use crate::config::{ControlConfig, CoreConfig, PerceptionConfig};
#[doc(inline)]
pub use control::ControlExecutor;
#[doc(inline)]
pub use error::{CoreError, CoreResult};
#[doc(inline)]
pub use filter::KalmanSmoother;
#[doc(inline)]
pub use flight_loop::{CommandSlot, FlightLoop, TickOutput};
#[doc(inline)]
pub use perception::{PerceptionEngine, PerceptionState, Threat, ThreatUrgency};
#[doc(inline)]
pub use pid::{PidController3, PidGains3};
#[doc(inline)]
pub use types::*;

#[cfg(test)]
mod test_utils;
