//! Velocity outlier screening across the fleet
//!
//! All velocity samples from every vehicle are pooled into a single
//! population. A vehicle is flagged when any of its samples lies more than
//! `threshold_std_devs` population standard deviations from the pooled mean.
//! The default band of one standard deviation is loose on purpose: the output
//! is a review list, and false positives are expected.

use crate::core::DEFAULT_THRESHOLD_STD_DEVS;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Relative spread below which all samples count as equal
const SPREAD_TOLERANCE: f64 = 1e-9;

/// Velocity samples belonging to one named vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocitySeries {
    pub vehicle: String,
    pub samples: Vec<f64>,
}

impl VelocitySeries {
    pub fn new(vehicle: impl Into<String>, samples: Vec<f64>) -> Self {
        Self {
            vehicle: vehicle.into(),
            samples,
        }
    }
}

/// Pooled mean and population standard deviation of velocity samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityStatistics {
    pub sample_count: usize,
    pub mean: f64,
    pub std_dev: f64,
}

impl VelocityStatistics {
    /// Returns `None` when there are no samples at all
    pub fn from_series(series: &[VelocitySeries]) -> Option<Self> {
        let sample_count: usize = series.iter().map(|s| s.samples.len()).sum();
        if sample_count == 0 {
            return None;
        }

        let n = sample_count as f64;
        let samples = || series.iter().flat_map(|s| s.samples.iter().copied());
        let mean = samples().sum::<f64>() / n;
        let variance = samples().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            sample_count,
            mean,
            std_dev: variance.sqrt(),
        })
    }

    /// True when `value` lies strictly outside `mean ± threshold * std_dev`
    pub fn is_outlier(&self, value: f64, threshold_std_devs: f64) -> bool {
        // Spread this small relative to the mean is coordinate rounding noise
        if self.std_dev <= SPREAD_TOLERANCE * self.mean.abs().max(1.0) {
            return false;
        }
        (value - self.mean).abs() > threshold_std_devs * self.std_dev
    }
}

/// Flags velocity series containing at least one outlying sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierDetector {
    threshold_std_devs: f64,
}

impl OutlierDetector {
    pub fn new(threshold_std_devs: f64) -> Self {
        Self { threshold_std_devs }
    }

    pub fn threshold_std_devs(&self) -> f64 {
        self.threshold_std_devs
    }

    /// Series with at least one outlying sample, each listed once, in input order
    pub fn find_outliers<'a>(&self, series: &'a [VelocitySeries]) -> Vec<&'a VelocitySeries> {
        let stats = match VelocityStatistics::from_series(series) {
            Some(stats) => stats,
            None => {
                debug!("no velocity samples, nothing to screen");
                return Vec::new();
            }
        };

        debug!(
            samples = stats.sample_count,
            mean = stats.mean,
            std_dev = stats.std_dev,
            threshold = self.threshold_std_devs,
            "screening velocities"
        );

        series
            .iter()
            .filter(|s| {
                let flagged = s
                    .samples
                    .iter()
                    .any(|&v| stats.is_outlier(v, self.threshold_std_devs));
                if flagged {
                    info!(vehicle = %s.vehicle, "velocity outlier detected");
                }
                flagged
            })
            .collect()
    }
}

impl Default for OutlierDetector {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_STD_DEVS)
    }
}
