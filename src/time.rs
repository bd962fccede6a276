// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Evenly spaced time grid on which evolutions are stored.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Relative tolerance used when checking that samples are evenly spaced.
const SPACING_TOLERANCE: f64 = 1e-9;

/// Evenly spaced, increasing sequence of `length` time points.
///
/// Deserialized axes go through [`TimeAxis::new`], so they carry the same
/// guarantees as constructed ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeAxis")]
pub struct TimeAxis {
    start: f64,
    length: usize,
    step: f64,
}

#[derive(Deserialize)]
struct RawTimeAxis {
    #[serde(default)]
    start: f64,
    length: usize,
    step: f64,
}

impl TryFrom<RawTimeAxis> for TimeAxis {
    type Error = Error;

    fn try_from(raw: RawTimeAxis) -> Result<Self> {
        Self::new(raw.start, raw.length, raw.step)
    }
}

impl TimeAxis {
    /// Create a time axis `start, start + step, ..., start + (length − 1) step`.
    pub fn new(start: f64, length: usize, step: f64) -> Result<Self> {
        if length == 0 {
            return Err(Error::Construction(
                "time axis must contain at least one point".into(),
            ));
        }
        if !start.is_finite() {
            return Err(Error::Construction(format!(
                "time axis start must be finite, got {start}"
            )));
        }
        if !(step.is_finite() && step > 0.0) {
            return Err(Error::Construction(format!(
                "time axis step must be positive and finite, got {step}"
            )));
        }
        Ok(Self {
            start,
            length,
            step,
        })
    }

    /// Build a time axis from explicit samples, which must be evenly spaced.
    pub fn from_times(times: &[f64]) -> Result<Self> {
        match times {
            [] => Err(Error::Construction("time axis is empty".into())),
            [only] => Err(Error::Construction(format!(
                "cannot infer a time step from the single sample {only}"
            ))),
            [first, second, ..] => {
                let step = second - first;
                let axis = Self::new(*first, times.len(), step)?;
                for (i, t) in times.iter().enumerate() {
                    if (t - axis.time(i)).abs() > SPACING_TOLERANCE * step.max(t.abs()) {
                        return Err(Error::Construction(format!(
                            "time samples are not evenly spaced (sample {i} is {t}, expected {})",
                            axis.time(i)
                        )));
                    }
                }
                Ok(axis)
            }
        }
    }

    /// Number of time points.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Grid spacing.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// First time point.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Last time point.
    pub fn end(&self) -> f64 {
        self.time(self.length - 1)
    }

    /// Time at grid index `i`.
    pub fn time(&self, i: usize) -> f64 {
        self.start + i as f64 * self.step
    }

    /// All time points.
    pub fn times(&self) -> Vec<f64> {
        (0..self.length).map(|i| self.time(i)).collect()
    }

    /// Index of the grid point nearest to `t`, clamped to the axis.
    pub fn nearest(&self, t: f64) -> usize {
        let pos = ((t - self.start) / self.step).round();
        if pos <= 0.0 {
            0
        } else {
            (pos as usize).min(self.length - 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_time_points() {
        let ax = TimeAxis::new(0.0, 1001, 0.01).unwrap();
        assert_eq!(ax.length(), 1001);
        assert_relative_eq!(ax.end(), 10.0, epsilon = 1e-12);
        assert_relative_eq!(ax.time(250), 2.5, epsilon = 1e-12);
        assert_eq!(ax.times().len(), 1001);
    }

    #[test]
    fn test_nearest_is_clamped() {
        let ax = TimeAxis::new(1.0, 11, 0.5).unwrap();
        assert_eq!(ax.nearest(-3.0), 0);
        assert_eq!(ax.nearest(1.0), 0);
        assert_eq!(ax.nearest(2.26), 3);
        assert_eq!(ax.nearest(2.24), 2);
        assert_eq!(ax.nearest(100.0), 10);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(TimeAxis::new(0.0, 0, 1.0).is_err());
        assert!(TimeAxis::new(0.0, 10, 0.0).is_err());
        assert!(TimeAxis::new(0.0, 10, -1.0).is_err());
        assert!(TimeAxis::new(f64::NAN, 10, 1.0).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ax: TimeAxis =
            serde_json::from_str(r#"{"start":0.5,"length":4,"step":0.25}"#).unwrap();
        assert_eq!(ax, TimeAxis::new(0.5, 4, 0.25).unwrap());

        let ax: TimeAxis = serde_yaml::from_str("length: 3\nstep: 1.0\n").unwrap();
        assert_eq!(ax.start(), 0.0);

        for bad in [
            r#"{"start":0.0,"length":0,"step":1.0}"#,
            r#"{"start":0.0,"length":5,"step":-1.0}"#,
            r#"{"start":0.0,"length":5,"step":0.0}"#,
        ] {
            let err = serde_json::from_str::<TimeAxis>(bad).unwrap_err();
            assert!(err.to_string().contains("time axis"), "{err}");
        }
    }

    #[test]
    fn test_from_times() {
        let ax = TimeAxis::from_times(&[0.0, 0.5, 1.0, 1.5]).unwrap();
        assert_eq!(ax.length(), 4);
        assert_relative_eq!(ax.step(), 0.5);

        assert!(TimeAxis::from_times(&[0.0, 0.5, 1.2]).is_err());
        assert!(TimeAxis::from_times(&[1.0]).is_err());
        assert!(TimeAxis::from_times(&[]).is_err());
        assert!(TimeAxis::from_times(&[1.0, 0.5]).is_err());
    }
}
