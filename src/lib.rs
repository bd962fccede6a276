// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Reduced density matrix propagation for open quantum systems.
//!
//! Given a Hamiltonian, an optional relaxation superoperator and an optional
//! external field coupled through a dipole operator, the propagator computes
//! ρ(t) on a fixed time grid.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              RdmPropagator               │
//! │   builder · dispatch · batch (rayon)     │
//! ├──────────────────┬──────────────────────┤
//! │ complex kernels  │  split re/im kernel  │
//! │ (tensor, ops)    │  (operator form)     │
//! ├──────────────────┴──────────────────────┤
//! │  RelaxationTensor · Lindblad channels    │
//! ├─────────────────────────────────────────┤
//! │  Hamiltonian · DensityMatrix · TimeAxis  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`propagator`]: Propagator, integration methods and kernels
//! - [`relaxation`]: Relaxation tensors and Lindblad channels
//! - [`operators`]: Hamiltonian and density matrix containers
//! - [`evolution`]: Propagation results
//! - [`time`]: Time grid
//! - [`problem`]: YAML problem files for the command-line driver
//! - [`config`]: Configuration management
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use rdm_propagator::{DensityMatrix, Hamiltonian, RdmPropagator, TimeAxis};
//!
//! let h = Hamiltonian::from_real(array![[0.0, 0.1], [0.1, 0.0]]).unwrap();
//! let axis = TimeAxis::new(0.0, 101, 0.1).unwrap();
//! let propagator = RdmPropagator::new(axis, h).unwrap();
//!
//! let rho0 = DensityMatrix::pure(2, 0).unwrap();
//! let evolution = propagator.propagate(&rho0, "short-exp-4").unwrap();
//! assert_eq!(evolution.len(), 101);
//! ```

pub mod config;
pub mod error;
pub mod evolution;
pub mod linalg;
pub mod operators;
pub mod problem;
pub mod propagator;
pub mod relaxation;
pub mod time;

pub use config::Config;
pub use error::{Error, Result};
pub use evolution::DensityMatrixEvolution;
pub use operators::{DensityMatrix, Hamiltonian};
pub use propagator::{
    DensityPolicy, OperatorKernel, PropagationMethod, RdmPropagator, RelaxationKind,
};
pub use relaxation::{LindbladChannel, RelaxationTensor};
pub use time::TimeAxis;

#[cfg(test)]
pub mod test_utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
