// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Relaxation (dissipation) superoperators.
//!
//! A relaxation term is held either as a dense 4-index tensor acting as
//!
//!   (Rρ)_ab = Σ_cd R_abcd ρ_cd
//!
//! or as an operator sum
//!
//!   D(ρ) = Σ_m ( K_m ρ L_m† + L_m ρ K_m† − K_m† L_m ρ − ρ L_m† K_m )
//!
//! with real K_m and complex L_m. Either form may be time dependent, with
//! one slice per time-grid point and an optional cutoff past which the
//! last relevant slice is reused.

pub mod lindblad;
pub mod tensor;

pub use lindblad::LindbladChannel;
pub use tensor::{Cutoff, OperatorSum, RelaxationTensor, Representation};
