// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Exact closed-system evolution for validating the short-exp family.

use ndarray::{Array3, Axis};
use num_complex::Complex64;
use tracing::debug;

use crate::error::{Error, Result};
use crate::evolution::DensityMatrixEvolution;
use crate::linalg::{conjugate_transpose, matrix_exp};
use crate::operators::{DensityMatrix, Hamiltonian};
use crate::time::TimeAxis;

/// ρ(t) = exp(−iH(t − t₀)) ρ₀ exp(iH(t − t₀)) on every point of `time_axis`.
pub fn unitary_evolution(
    hamiltonian: &Hamiltonian,
    rho0: &DensityMatrix,
    time_axis: &TimeAxis,
) -> Result<DensityMatrixEvolution> {
    let n = hamiltonian.dim();
    if rho0.dim() != n {
        return Err(Error::InvalidInput(format!(
            "density matrix is {0} × {0}, Hamiltonian is {1} × {1}",
            rho0.dim(),
            n
        )));
    }

    let mut data = Array3::zeros((time_axis.length(), n, n));
    for (i, mut slot) in data.outer_iter_mut().enumerate() {
        let t = time_axis.time(i) - time_axis.start();
        let u = matrix_exp(&hamiltonian.data().mapv(|h| h * Complex64::new(0.0, -t)))?;
        slot.assign(&u.dot(rho0.data()).dot(&conjugate_transpose(&u)));
    }
    debug!(dim = n, points = data.len_of(Axis(0)), "Computed unitary reference");
    Ok(DensityMatrixEvolution::new(
        *time_axis,
        data,
        "unitary-reference".to_string(),
    ))
}
