// src/perception/history.rs

//! Bounded, timestamped sample history used for target prediction.

use nalgebra::Vector3;
use std::collections::VecDeque;

/// Default number of samples kept per history.
pub const DEFAULT_HISTORY_LEN: usize = 50;

/// A bounded FIFO of `(timestamp, sample)` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleHistory {
    capacity: usize,
    samples: VecDeque<(f64, Vector3<f32>)>,
}

impl SampleHistory {
    /// Empty history holding at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends a sample, dropping the oldest when full.
    pub fn push(&mut self, timestamp: f64, sample: Vector3<f32>) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back((timestamp, sample));
    }

    /// Number of samples held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recent sample.
    pub fn last(&self) -> Option<&(f64, Vector3<f32>)> {
        self.samples.back()
    }

    /// Samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &(f64, Vector3<f32>)> {
        self.samples.iter()
    }

    /// Drops every sample.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Linear extrapolation `horizon` seconds past the newest sample.
    ///
    /// Averages the finite-difference velocity over the last three samples,
    /// skipping pairs with a non-positive time step. Needs three samples;
    /// with no usable time step the newest sample is returned unchanged.
    pub fn predict(&self, horizon: f32) -> Option<Vector3<f32>> {
        if self.samples.len() < 3 {
            return None;
        }
        let recent: Vec<_> = self.samples.iter().skip(self.samples.len() - 3).collect();
        let velocities: Vec<Vector3<f32>> = recent
            .windows(2)
            .filter_map(|pair| {
                let (t0, p0) = pair[0];
                let (t1, p1) = pair[1];
                let dt = (t1 - t0) as f32;
                (dt > 0.0).then(|| (p1 - p0) / dt)
            })
            .collect();

        let (_, newest) = *recent[recent.len() - 1];
        if velocities.is_empty() {
            return Some(newest);
        }
        let mean = velocities.iter().sum::<Vector3<f32>>() / velocities.len() as f32;
        Some(newest + mean * horizon)
    }
}

impl Default for SampleHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN)
    }
}
