// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Hamiltonian and density matrix containers.
//!
//! Both are thin wrappers around `Array2<Complex64>` that check shape on
//! construction, so the propagator never sees a non-square operator.

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{Error, Result};
use crate::linalg::{conjugate_transpose, max_abs_diff, to_complex, trace};

/// System Hamiltonian (N × N).
#[derive(Debug, Clone, PartialEq)]
pub struct Hamiltonian {
    data: Array2<Complex64>,
}

impl Hamiltonian {
    /// Wrap a complex matrix.
    pub fn new(data: Array2<Complex64>) -> Result<Self> {
        check_square(&data, "Hamiltonian").map_err(Error::Construction)?;
        Ok(Self { data })
    }

    /// Wrap a real matrix.
    pub fn from_real(data: Array2<f64>) -> Result<Self> {
        Self::new(to_complex(&data))
    }

    /// Hilbert space dimension.
    pub fn dim(&self) -> usize {
        self.data.nrows()
    }

    /// Underlying matrix.
    pub fn data(&self) -> &Array2<Complex64> {
        &self.data
    }

    /// True when H = H† within `tol`.
    pub fn is_hermitian(&self, tol: f64) -> bool {
        max_abs_diff(&self.data, &conjugate_transpose(&self.data)) <= tol
    }
}

/// Density matrix (N × N).
///
/// Hermiticity and unit trace are expected but not enforced; the propagator
/// transports whatever it is given.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityMatrix {
    data: Array2<Complex64>,
}

impl DensityMatrix {
    /// Wrap a complex matrix.
    pub fn new(data: Array2<Complex64>) -> Result<Self> {
        check_square(&data, "density matrix").map_err(Error::InvalidInput)?;
        Ok(Self { data })
    }

    /// Wrap a real matrix.
    pub fn from_real(data: Array2<f64>) -> Result<Self> {
        Self::new(to_complex(&data))
    }

    /// Pure state |k⟩⟨k| in a `dim`-level system.
    pub fn pure(dim: usize, state: usize) -> Result<Self> {
        if state >= dim {
            return Err(Error::InvalidInput(format!(
                "state index {state} out of range for dimension {dim}"
            )));
        }
        let mut data = Array2::zeros((dim, dim));
        data[[state, state]] = Complex64::new(1.0, 0.0);
        Self::new(data)
    }

    /// Diagonal (incoherent) state with the given populations.
    pub fn from_populations(populations: &[f64]) -> Result<Self> {
        let data = Array2::from_diag(&ndarray::Array1::from_iter(
            populations.iter().map(|&p| Complex64::new(p, 0.0)),
        ));
        Self::new(data)
    }

    /// Hilbert space dimension.
    pub fn dim(&self) -> usize {
        self.data.nrows()
    }

    /// Underlying matrix.
    pub fn data(&self) -> &Array2<Complex64> {
        &self.data
    }

    /// Consume into the underlying matrix.
    pub fn into_inner(self) -> Array2<Complex64> {
        self.data
    }

    /// Tr(ρ).
    pub fn trace(&self) -> Complex64 {
        trace(&self.data)
    }

    /// Purity Tr(ρ²).
    pub fn purity(&self) -> f64 {
        trace(&self.data.dot(&self.data)).re
    }

    /// Diagonal elements (real parts).
    pub fn populations(&self) -> Vec<f64> {
        self.data.diag().iter().map(|z| z.re).collect()
    }

    /// True when ρ = ρ† within `tol`.
    pub fn is_hermitian(&self, tol: f64) -> bool {
        max_abs_diff(&self.data, &conjugate_transpose(&self.data)) <= tol
    }
}

fn check_square(m: &Array2<Complex64>, what: &str) -> std::result::Result<(), String> {
    if m.nrows() == 0 {
        return Err(format!("{what} must not be empty"));
    }
    if m.nrows() != m.ncols() {
        return Err(format!(
            "{what} must be square, got {} × {}",
            m.nrows(),
            m.ncols()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hamiltonian_rejects_non_square() {
        let err = Hamiltonian::from_real(Array2::zeros((2, 3))).unwrap_err();
        assert!(matches!(err, Error::Construction(_)));
        assert!(err.to_string().contains("2 × 3"));
    }

    #[test]
    fn test_hamiltonian_rejects_empty() {
        assert!(Hamiltonian::new(Array2::zeros((0, 0))).is_err());
    }

    #[test]
    fn test_hamiltonian_hermiticity() {
        let h = Hamiltonian::from_real(ndarray::array![[0.0, 0.1], [0.1, 1.0]]).unwrap();
        assert!(h.is_hermitian(1e-15));

        let mut m = Array2::zeros((2, 2));
        m[[0, 1]] = Complex64::new(0.0, 1.0);
        m[[1, 0]] = Complex64::new(0.0, 1.0);
        assert!(!Hamiltonian::new(m).unwrap().is_hermitian(1e-12));
    }

    #[test]
    fn test_density_matrix_rejects_non_square() {
        let err = DensityMatrix::new(Array2::zeros((3, 2))).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_pure_state() {
        let rho = DensityMatrix::pure(3, 1).unwrap();
        assert_eq!(rho.populations(), vec![0.0, 1.0, 0.0]);
        assert_relative_eq!(rho.trace().re, 1.0);
        assert_relative_eq!(rho.purity(), 1.0);
        assert!(DensityMatrix::pure(3, 3).is_err());
    }

    #[test]
    fn test_mixed_state_purity() {
        let rho = DensityMatrix::from_populations(&[0.5, 0.5]).unwrap();
        assert_relative_eq!(rho.purity(), 0.5);
        assert!(rho.is_hermitian(0.0));
    }
}
