// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Integration method names and kernel options.

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::linalg::{conjugate_transpose, trace};

/// Recognized method names, in the order they are documented.
pub const METHOD_NAMES: &[&str] = &[
    "primitive",
    "Runge-Kutta",
    "diagonalization",
    "short-exp",
    "short-exp-2",
    "short-exp-4",
    "short-exp-6",
];

/// Integration scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationMethod {
    /// First-order explicit Euler stepping.
    Primitive,
    /// Declared, not available.
    RungeKutta,
    /// Declared, not available.
    Diagonalization,
    /// Exponential propagator expanded to `order` terms per fine step.
    ShortExp { order: usize },
}

impl PropagationMethod {
    /// Default expansion order of `"short-exp"`.
    pub const DEFAULT_SHORT_EXP_ORDER: usize = 4;
}

impl Default for PropagationMethod {
    fn default() -> Self {
        PropagationMethod::ShortExp {
            order: Self::DEFAULT_SHORT_EXP_ORDER,
        }
    }
}

impl FromStr for PropagationMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primitive" => Ok(PropagationMethod::Primitive),
            "Runge-Kutta" => Ok(PropagationMethod::RungeKutta),
            "diagonalization" => Ok(PropagationMethod::Diagonalization),
            "short-exp" | "short-exp-4" => Ok(PropagationMethod::ShortExp { order: 4 }),
            "short-exp-2" => Ok(PropagationMethod::ShortExp { order: 2 }),
            "short-exp-6" => Ok(PropagationMethod::ShortExp { order: 6 }),
            other => Err(Error::UnknownMethod(other.to_string())),
        }
    }
}

impl fmt::Display for PropagationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropagationMethod::Primitive => write!(f, "primitive"),
            PropagationMethod::RungeKutta => write!(f, "Runge-Kutta"),
            PropagationMethod::Diagonalization => write!(f, "diagonalization"),
            PropagationMethod::ShortExp { order } => write!(f, "short-exp-{}", order),
        }
    }
}

/// Kernel used for operator-form relaxation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperatorKernel {
    /// Complex-valued matrix products.
    #[default]
    Complex,
    /// Real and imaginary parts propagated as separate real matrices.
    Split,
}

impl FromStr for OperatorKernel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "complex" => Ok(OperatorKernel::Complex),
            "split" => Ok(OperatorKernel::Split),
            other => Err(Error::Config(format!(
                "unknown operator kernel '{other}' (expected complex or split)"
            ))),
        }
    }
}

/// What, if anything, is enforced on the density matrix after each fine step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DensityPolicy {
    /// Transport the state as computed.
    #[default]
    Unenforced,
    /// Replace ρ by (ρ + ρ†)/2.
    Hermitian,
    /// Hermitian part, then rescale to unit trace.
    HermitianNormalized,
}

impl DensityPolicy {
    /// Apply the policy to a complex density matrix.
    pub fn enforce(&self, rho: &mut Array2<Complex64>) {
        if *self == DensityPolicy::Unenforced {
            return;
        }
        let dag = conjugate_transpose(rho);
        rho.zip_mut_with(&dag, |a, b| *a = (*a + *b) * 0.5);
        if *self == DensityPolicy::HermitianNormalized {
            let tr = trace(rho).re;
            if tr.abs() > f64::MIN_POSITIVE {
                rho.mapv_inplace(|z| z / tr);
            }
        }
    }

    /// Apply the policy to a density matrix held as real and imaginary parts.
    pub fn enforce_split(&self, re: &mut Array2<f64>, im: &mut Array2<f64>) {
        if *self == DensityPolicy::Unenforced {
            return;
        }
        let re_t = re.t().to_owned();
        let im_t = im.t().to_owned();
        re.zip_mut_with(&re_t, |a, b| *a = 0.5 * (*a + *b));
        im.zip_mut_with(&im_t, |a, b| *a = 0.5 * (*a - *b));
        if *self == DensityPolicy::HermitianNormalized {
            let tr = re.diag().sum();
            if tr.abs() > f64::MIN_POSITIVE {
                re.mapv_inplace(|x| x / tr);
                im.mapv_inplace(|x| x / tr);
            }
        }
    }
}

impl FromStr for DensityPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unenforced" => Ok(DensityPolicy::Unenforced),
            "hermitian" => Ok(DensityPolicy::Hermitian),
            "hermitian-normalized" => Ok(DensityPolicy::HermitianNormalized),
            other => Err(Error::Config(format!(
                "unknown density policy '{other}' (expected unenforced, hermitian or hermitian-normalized)"
            ))),
        }
    }
}
