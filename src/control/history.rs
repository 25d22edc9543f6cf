// src/control/history.rs

//! Bounded log of emitted control actions.

use crate::types::{ControlMode, DroneCommand};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Default number of records kept before trimming.
pub const DEFAULT_CONTROL_HISTORY_LEN: usize = 1000;

/// One tick's control action with the state it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlRecord {
    /// Tick time in seconds.
    pub timestamp: f64,
    /// Effective mode.
    pub mode: ControlMode,
    /// Whether emergency was latched.
    pub emergency: bool,
    /// Identifier of the command in force, if any.
    pub command_id: Option<String>,
    /// The limited output.
    pub command: DroneCommand,
    /// Filtered drone position.
    pub position: Vector3<f32>,
    /// Range to the target.
    pub target_distance: f32,
    /// Battery level in percent.
    pub battery_level: f32,
    /// Number of threats.
    pub threat_count: usize,
}

/// Records kept oldest first. When the log grows past its capacity it is
/// trimmed to the newest half.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlHistory {
    capacity: usize,
    records: Vec<ControlRecord>,
}

impl ControlHistory {
    /// Empty log holding at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: Vec::new(),
        }
    }

    /// Appends a record, trimming on overflow.
    pub fn push(&mut self, record: ControlRecord) {
        self.records.push(record);
        if self.records.len() > self.capacity {
            let keep = self.capacity / 2;
            self.records.drain(..self.records.len() - keep);
        }
    }

    /// Records, oldest first.
    pub fn records(&self) -> &[ControlRecord] {
        &self.records
    }

    /// Most recent record.
    pub fn last(&self) -> Option<&ControlRecord> {
        self.records.last()
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for ControlHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CONTROL_HISTORY_LEN)
    }
}
