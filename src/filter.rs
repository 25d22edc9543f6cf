// src/filter.rs

//! # Kalman Smoother
//!
//! An exponential-gain smoother that turns raw position samples into a
//! denoised estimate with a running error value. This is a one-state
//! approximation of a Kalman filter: a single scalar gain is shared by every
//! component of the sample and there is no covariance matrix and no motion
//! model. It trades accuracy on manoeuvring targets for a constant-time,
//! allocation-free update.

use core::ops::{Add, Mul, Sub};
use nalgebra::Vector3;
use tracing::{trace, warn};

/// Anything the smoother can blend: scalars and fixed-size vectors.
pub trait Sample: Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f32, Output = Self> {
    /// Whether every component is finite.
    fn is_finite(&self) -> bool;
}

impl Sample for f32 {
    fn is_finite(&self) -> bool {
        f32::is_finite(*self)
    }
}

impl Sample for Vector3<f32> {
    fn is_finite(&self) -> bool {
        self.iter().all(|v| v.is_finite())
    }
}

/// Error value the smoother starts from after being seeded.
pub const INITIAL_ERROR: f32 = 1.0;

/// One-state exponential-gain smoother.
#[derive(Debug, Clone, PartialEq)]
pub struct KalmanSmoother<S> {
    process_noise: f32,
    measurement_noise: f32,
    estimate: Option<S>,
    error: f32,
}

impl<S: Sample> KalmanSmoother<S> {
    /// Creates an unseeded smoother with the given noise constants.
    pub fn new(process_noise: f32, measurement_noise: f32) -> Self {
        Self {
            process_noise,
            measurement_noise,
            estimate: None,
            error: INITIAL_ERROR,
        }
    }

    /// Blends a measurement into the estimate and returns the new estimate.
    ///
    /// The first call returns the measurement unchanged and seeds the state.
    /// A non-finite measurement leaves the state untouched; the current
    /// estimate is returned, or the measurement itself while unseeded.
    pub fn update(&mut self, measurement: S) -> S {
        if !measurement.is_finite() {
            warn!("non-finite measurement dropped");
            return self.estimate.unwrap_or(measurement);
        }

        let Some(estimate) = self.estimate else {
            self.estimate = Some(measurement);
            self.error = INITIAL_ERROR;
            trace!("smoother seeded");
            return measurement;
        };

        let prior_error = self.error + self.process_noise;
        let gain = prior_error / (prior_error + self.measurement_noise);
        let estimate = estimate + (measurement - estimate) * gain;

        self.error = (1.0 - gain) * prior_error;
        self.estimate = Some(estimate);
        estimate
    }

    /// Current estimate, `None` until the first update.
    pub fn estimate(&self) -> Option<S> {
        self.estimate
    }

    /// Running error value, a confidence proxy (smaller is more confident).
    pub fn error(&self) -> f32 {
        self.error
    }

    /// Forgets the estimate; the next update seeds again.
    pub fn reset(&mut self) {
        self.estimate = None;
        self.error = INITIAL_ERROR;
    }
}
