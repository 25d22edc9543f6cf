// src/pid.rs

//! # PID Control Module
//!
//! This module provides the compute callback and control data structure
//! used with [`piddiy`] to perform per-axis PID calculations, and a
//! three-axis controller built from three independent axis controllers.
//!
//! Two independent instances are used by the control executor, one for
//! position and one for orientation. They must never share state.

use piddiy::Number as PiddiyNumber;

pub mod axis;
pub use axis::*;
pub mod three_axis;
pub use three_axis::*;

/// Custom trait to encapsulate base number requirements.
pub trait Number: PiddiyNumber {
    /// Returns the larger of two generic PartialOrd values.
    fn at_least(self, floor: Self) -> Self {
        if self < floor {
            floor
        } else {
            self
        }
    }
}

impl<T: PiddiyNumber> Number for T {}
