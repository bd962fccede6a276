// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Time-indexed sequence of density matrix snapshots.

use ndarray::{Array3, ArrayView2, Axis};
use num_complex::Complex64;

use crate::error::{Error, Result};
use crate::linalg::trace;
use crate::time::TimeAxis;

/// Density matrix evolution on a [`TimeAxis`].
///
/// Snapshot `i` is the state at `time_axis.time(i)`; snapshot 0 is the
/// initial condition.
#[derive(Debug, Clone)]
pub struct DensityMatrixEvolution {
    time_axis: TimeAxis,
    data: Array3<Complex64>,
    name: String,
}

impl DensityMatrixEvolution {
    /// Assemble from a fully populated `(Nt, N, N)` buffer.
    pub(crate) fn new(time_axis: TimeAxis, data: Array3<Complex64>, name: String) -> Self {
        debug_assert_eq!(data.len_of(Axis(0)), time_axis.length());
        Self {
            time_axis,
            data,
            name,
        }
    }

    /// Time grid of the snapshots.
    pub fn time_axis(&self) -> &TimeAxis {
        &self.time_axis
    }

    /// Run label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Relabel the run.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// Always false for a successfully propagated run.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hilbert space dimension.
    pub fn dim(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    /// Raw `(Nt, N, N)` data.
    pub fn data(&self) -> &Array3<Complex64> {
        &self.data
    }

    /// Snapshot at time index `i`.
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn at(&self, i: usize) -> ArrayView2<'_, Complex64> {
        self.data.index_axis(Axis(0), i)
    }

    /// Snapshot at time index `i`, or `None` when out of range.
    pub fn get(&self, i: usize) -> Option<ArrayView2<'_, Complex64>> {
        (i < self.len()).then(|| self.at(i))
    }

    /// Iterate over snapshots in time order.
    pub fn iter(&self) -> impl Iterator<Item = ArrayView2<'_, Complex64>> {
        self.data.outer_iter()
    }

    /// Tr(ρ(t_i)).
    pub fn trace(&self, i: usize) -> Complex64 {
        trace(&self.at(i).to_owned())
    }

    /// Populations (real diagonal) at time index `i`.
    pub fn populations(&self, i: usize) -> Vec<f64> {
        self.at(i).diag().iter().map(|z| z.re).collect()
    }

    /// Population of `state` over the whole time axis.
    pub fn population_trajectory(&self, state: usize) -> Vec<f64> {
        self.iter().map(|rho| rho[[state, state]].re).collect()
    }

    /// Element ρ_ij over the whole time axis.
    pub fn coherence_trajectory(&self, i: usize, j: usize) -> Vec<Complex64> {
        self.iter().map(|rho| rho[[i, j]]).collect()
    }

    /// Largest element-wise modulus of the difference to `other`.
    pub fn max_deviation(&self, other: &DensityMatrixEvolution) -> Result<f64> {
        if self.data.shape() != other.data.shape() {
            return Err(Error::InvalidInput(format!(
                "cannot compare evolutions of shape {:?} and {:?}",
                self.data.shape(),
                other.data.shape()
            )));
        }
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, f64::max))
    }
}
