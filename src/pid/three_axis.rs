// src/pid/three_axis.rs

//! # Three-Axis PID Controller
//!
//! A stateful PID controller producing a 3-vector control effort from a
//! 3-vector error: `effort = kp⊙e + ki⊙∫e·dt + kd⊙Δe/max(dt, ε)` with the
//! element-wise product taken per axis. Each axis is an independent
//! [`piddiy::PidController`] driven by [`compute_axis`].
//!
//! The integral has no anti-windup. Call [`PidController3::reset`] whenever
//! a control mode is entered fresh.

use crate::pid::{compute_axis, AxisControlData, Number};
use piddiy::PidController;
use serde::{Deserialize, Serialize};

/// Per-axis gains for a three-axis PID controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains3<T> {
    /// Proportional gains.
    pub kp: (T, T, T),
    /// Integral gains.
    pub ki: (T, T, T),
    /// Derivative gains.
    pub kd: (T, T, T),
}

impl<T: Number> PidGains3<T> {
    /// Uses the same gains on all three axes.
    pub fn uniform(kp: T, ki: T, kd: T) -> Self {
        Self {
            kp: (kp, kp, kp),
            ki: (ki, ki, ki),
            kd: (kd, kd, kd),
        }
    }
}

/// Three-axis PID controller.
pub struct PidController3<T: Number> {
    axes: [PidController<T, AxisControlData<T>>; 3],
    min_dt: T,
}

fn axis<T: Number>(kp: T, ki: T, kd: T) -> PidController<T, AxisControlData<T>> {
    let mut pid = PidController::new();
    pid.compute_fn(compute_axis)
        .set_point(T::zero())
        .kp(kp)
        .ki(ki)
        .kd(kd);
    pid
}

impl<T: Number> PidController3<T> {
    /// Creates a new controller using the provided gains. `min_dt` is the
    /// floor applied to the time step in the derivative term.
    pub fn with_gains(gains: PidGains3<T>, min_dt: T) -> Self {
        PidController3 {
            axes: [
                axis(gains.kp.0, gains.ki.0, gains.kd.0),
                axis(gains.kp.1, gains.ki.1, gains.kd.1),
                axis(gains.kp.2, gains.ki.2, gains.kd.2),
            ],
            min_dt,
        }
    }

    /// Feeds one error sample and returns the per-axis control effort.
    pub fn update(&mut self, error: (T, T, T), dt: T) -> (T, T, T) {
        let min_dt = self.min_dt;
        let data = |error| AxisControlData { error, dt, min_dt };
        let [x, y, z] = &mut self.axes;

        (
            x.compute(data(error.0)),
            y.compute(data(error.1)),
            z.compute(data(error.2)),
        )
    }

    /// Zeroes the integral and the previous error on every axis.
    pub fn reset(&mut self) {
        for pid in self.axes.iter_mut() {
            pid.integral = T::zero();
            pid.error = T::zero();
        }
    }

    /// Running integral per axis.
    pub fn integral(&self) -> (T, T, T) {
        let [x, y, z] = &self.axes;
        (x.integral, y.integral, z.integral)
    }

    /// Error seen on the previous update, per axis.
    pub fn previous_error(&self) -> (T, T, T) {
        let [x, y, z] = &self.axes;
        (x.error, y.error, z.error)
    }
}
