// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Lindblad dissipation channels.
//!
//! A channel (K, γ) contributes γ (K ρ Kᵀ − ½{KᵀK, ρ}) to the generator.
//! K is real, so K† = Kᵀ.
//!
//! Ref: Breuer & Petruccione, "The Theory of Open Quantum Systems" (2002), Ch. 3.

use ndarray::Array2;

use crate::error::{Error, Result};

/// A single Lindblad channel with a real jump operator and its rate.
#[derive(Debug, Clone)]
pub struct LindbladChannel {
    /// Jump operator (N × N, real).
    pub operator: Array2<f64>,
    /// Rate γ in inverse units of the time axis.
    pub rate: f64,
    /// Human-readable label (e.g., "decay_1->0").
    pub label: String,
}

impl LindbladChannel {
    /// Create a channel, checking the operator shape and the rate.
    pub fn new(operator: Array2<f64>, rate: f64, label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        if !(rate.is_finite() && rate >= 0.0) {
            return Err(Error::Construction(format!(
                "channel '{label}' must have a finite non-negative rate, got {rate:.3e}"
            )));
        }
        if operator.nrows() == 0 || operator.nrows() != operator.ncols() {
            return Err(Error::Construction(format!(
                "channel '{label}' operator must be square and non-empty ({} × {})",
                operator.nrows(),
                operator.ncols()
            )));
        }
        Ok(Self {
            operator,
            rate,
            label,
        })
    }

    /// Population transfer `from → to`: K = |to⟩⟨from|.
    pub fn amplitude_damping(dim: usize, from: usize, to: usize, rate: f64) -> Result<Self> {
        if from >= dim || to >= dim {
            return Err(Error::Construction(format!(
                "levels {from} -> {to} out of range for dimension {dim}"
            )));
        }
        if from == to {
            return Err(Error::Construction(format!(
                "amplitude damping needs two distinct levels, got {from} -> {to}"
            )));
        }
        let mut k = Array2::zeros((dim, dim));
        k[[to, from]] = 1.0;
        Self::new(k, rate, format!("decay_{from}->{to}"))
    }

    /// Pure dephasing of `level`: K = |level⟩⟨level|.
    ///
    /// Coherences ρ_kj (j ≠ k) decay at rate γ/2; populations are untouched.
    pub fn dephasing(dim: usize, level: usize, rate: f64) -> Result<Self> {
        if level >= dim {
            return Err(Error::Construction(format!(
                "level {level} out of range for dimension {dim}"
            )));
        }
        let mut k = Array2::zeros((dim, dim));
        k[[level, level]] = 1.0;
        Self::new(k, rate, format!("dephasing_{level}"))
    }

    /// Hilbert space dimension.
    pub fn dim(&self) -> usize {
        self.operator.nrows()
    }
}
