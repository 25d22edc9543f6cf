// src/pid/axis.rs

//! # Error-Driven Axis PID Module
//!
//! This module provides a compute function and control data structure
//! for a single PID axis that is fed a precomputed error instead of a
//! measurement. The integral is not clamped.

use crate::pid::Number;
use piddiy::PidController;

/// Control data for the error-driven axis compute callback.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisControlData<T> {
    /// The set-point error for this axis, already computed by the caller.
    pub error: T,
    /// The time delta since the last computation.
    pub dt: T,
    /// Lower bound applied to `dt` in the derivative term.
    pub min_dt: T,
}

/// Error-driven PID compute callback.
///
/// Returns `(error, integral, derivative)`. The integral accumulates
/// `error * dt` without limit, and the derivative divides by
/// `max(dt, min_dt)` so a degenerate tick cannot divide by zero.
pub fn compute_axis<T: Number>(
    pid: &mut PidController<T, AxisControlData<T>>,
    data: AxisControlData<T>,
) -> (T, T, T) {
    let error = data.error;
    let integral = pid.integral + error * data.dt;
    let derivative = (error - pid.error) / data.dt.at_least(data.min_dt);

    (error, integral, derivative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn axis_pid(kp: f32, ki: f32, kd: f32) -> PidController<f32, AxisControlData<f32>> {
        let mut pid = PidController::new();
        pid.compute_fn(compute_axis).kp(kp).ki(ki).kd(kd);
        pid
    }

    /// Test PID response to a constant error.
    #[test]
    fn test_pid_axis_response() {
        let mut pid = axis_pid(1.0, 1.0, 1.0);
        let data = AxisControlData {
            error: 10.0,
            dt: 1.0,
            min_dt: 0.001,
        };

        let (error, integral, derivative) = compute_axis(&mut pid, data);
        let output = pid.compute(data);
        assert!(value_close(10.0, error), "Error should be 10.");
        assert!(value_close(10.0, integral), "Integral should start to accumulate.");
        assert!(value_close(10.0, derivative), "Derivative should be 10.");
        assert!(value_close(30.0, output), "Output should be the sum of terms.");

        let (_, integral, derivative) = compute_axis(&mut pid, data);
        let output = pid.compute(data);
        assert!(value_close(20.0, integral), "Integral should accumulate to 20.");
        assert!(value_close(0.0, derivative), "Derivative should be zero.");
        assert!(value_close(30.0, output), "Output should be 10 + 20 + 0.");
    }

    /// The integral is never clamped.
    #[test]
    fn test_pid_axis_integral_unbounded() {
        let mut pid = axis_pid(0.0, 1.0, 0.0);
        let data = AxisControlData {
            error: 50.0,
            dt: 1.0,
            min_dt: 0.001,
        };
        for _ in 0..100 {
            let _ = pid.compute(data);
        }
        assert!(value_close(5000.0, pid.integral), "Integral should not saturate.");
    }

    /// A zero time step falls back to `min_dt` in the derivative term.
    #[test]
    fn test_pid_axis_zero_dt() {
        let mut pid = axis_pid(0.0, 0.0, 1.0);
        let data = AxisControlData {
            error: 1.0,
            dt: 0.0,
            min_dt: 0.5,
        };
        let output = pid.compute(data);
        assert!(output.is_finite(), "Output must stay finite.");
        assert!(value_close(2.0, output), "Derivative should use min_dt.");
    }
}
