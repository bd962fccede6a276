// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared fixtures and assertions for propagator tests.

use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;

use crate::operators::{DensityMatrix, Hamiltonian};
use crate::time::TimeAxis;

/// Assert element-wise closeness of two complex matrices.
pub fn assert_matrix_close<'a, A, B>(a: A, b: B, tol: f64)
where
    A: Into<ArrayView2<'a, Complex64>>,
    B: Into<ArrayView2<'a, Complex64>>,
{
    let a = a.into();
    let b = b.into();
    assert_eq!(a.shape(), b.shape());
    for ((i, j), val) in a.indexed_iter() {
        let diff = (val - b[[i, j]]).norm();
        assert!(
            diff < tol,
            "Mismatch at ({}, {}): {:?} vs {:?} (diff={})",
            i,
            j,
            val,
            b[[i, j]],
            diff
        );
    }
}

/// Two-level system with tunnelling coupling `v`: [[0, v], [v, 0]].
pub fn dimer_hamiltonian(v: f64) -> Hamiltonian {
    let mut h = Array2::zeros((2, 2));
    h[[0, 1]] = v;
    h[[1, 0]] = v;
    Hamiltonian::from_real(h).unwrap()
}

/// Three-level chain with site energies and nearest-neighbour coupling.
pub fn trimer_hamiltonian() -> Hamiltonian {
    let h = ndarray::array![[0.0, 0.1, 0.0], [0.1, 0.05, 0.1], [0.0, 0.1, 0.1]];
    Hamiltonian::from_real(h).unwrap()
}

/// A generic mixed state with coherences, trace one.
pub fn mixed_state_3() -> DensityMatrix {
    let mut m = Array2::zeros((3, 3));
    m[[0, 0]] = Complex64::new(0.5, 0.0);
    m[[1, 1]] = Complex64::new(0.3, 0.0);
    m[[2, 2]] = Complex64::new(0.2, 0.0);
    m[[0, 1]] = Complex64::new(0.1, 0.05);
    m[[1, 0]] = Complex64::new(0.1, -0.05);
    m[[1, 2]] = Complex64::new(0.02, -0.03);
    m[[2, 1]] = Complex64::new(0.02, 0.03);
    DensityMatrix::new(m).unwrap()
}

/// Time axis starting at zero.
pub fn axis(length: usize, step: f64) -> TimeAxis {
    TimeAxis::new(0.0, length, step).unwrap()
}
