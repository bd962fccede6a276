// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Complex-valued Liouville generator.
//!
//!   L(ρ) = −i[H − E(t) μ, ρ] + D_t(ρ)
//!
//! where D_t is either a dense tensor contraction or an operator sum. The
//! field term −i[−Eμ, ρ] = +i E [μ, ρ] is folded into an effective
//! Hamiltonian that is refreshed once per coarse step.

use ndarray::{Array1, Array2, Array4};
use num_complex::Complex64;

use crate::error::Result;
use crate::linalg::{commutator, conjugate_transpose, to_complex};
use crate::relaxation::RelaxationTensor;

/// Dipole operator with one field value per coarse time point.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldCoupling<'a> {
    pub dipole: &'a Array2<Complex64>,
    pub field: &'a [f64],
}

/// Relaxation slice in use at coarse step `step`: frozen at the cutoff.
pub(crate) fn relaxation_slice(step: usize, cutoff: Option<usize>) -> usize {
    cutoff.map_or(step, |c| step.min(c))
}

struct OperatorTerm {
    k: Array2<Complex64>,
    kd: Array2<Complex64>,
    l: Array2<Complex64>,
    ld: Array2<Complex64>,
    kd_l: Array2<Complex64>,
    ld_k: Array2<Complex64>,
}

enum Dissipator {
    None,
    /// Tensor reshaped to an N² × N² matrix.
    Tensor(Array2<Complex64>),
    Operators(Vec<OperatorTerm>),
}

/// Generator of the fine-step dynamics for one propagation run.
pub(crate) struct Liouvillian<'a> {
    hamiltonian: &'a Array2<Complex64>,
    coupling: Option<FieldCoupling<'a>>,
    relaxation: Option<&'a RelaxationTensor>,
    cutoff: Option<usize>,
    effective: Array2<Complex64>,
    dissipator: Dissipator,
    slice: Option<usize>,
}

impl<'a> Liouvillian<'a> {
    pub fn new(
        hamiltonian: &'a Array2<Complex64>,
        relaxation: Option<&'a RelaxationTensor>,
        cutoff: Option<usize>,
        coupling: Option<FieldCoupling<'a>>,
    ) -> Self {
        Self {
            hamiltonian,
            coupling,
            relaxation,
            cutoff,
            effective: hamiltonian.clone(),
            dissipator: Dissipator::None,
            slice: None,
        }
    }

    /// Load the field value and relaxation slice for coarse step `step`.
    pub fn prepare(&mut self, step: usize) -> Result<()> {
        if let Some(c) = self.coupling {
            self.effective.assign(self.hamiltonian);
            self.effective
                .scaled_add(Complex64::new(-c.field[step], 0.0), c.dipole);
        }

        let Some(relaxation) = self.relaxation else {
            return Ok(());
        };
        let slice = if relaxation.is_time_dependent() {
            relaxation_slice(step, self.cutoff)
        } else {
            0
        };
        if self.slice == Some(slice) {
            return Ok(());
        }

        self.dissipator = if relaxation.is_operator_form() {
            let (k, l) = relaxation.operators_at(slice)?;
            Dissipator::Operators(
                k.outer_iter()
                    .zip(l.outer_iter())
                    .map(|(km, lm)| {
                        let k = to_complex(&km.to_owned());
                        let l = lm.to_owned();
                        let kd = k.t().to_owned();
                        let ld = conjugate_transpose(&l);
                        OperatorTerm {
                            kd_l: kd.dot(&l),
                            ld_k: ld.dot(&k),
                            k,
                            kd,
                            l,
                            ld,
                        }
                    })
                    .collect(),
            )
        } else {
            Dissipator::Tensor(flatten(relaxation.tensor_at(slice)?))
        };
        self.slice = Some(slice);
        Ok(())
    }

    /// L(ρ) for the currently prepared step.
    pub fn apply(&self, rho: &Array2<Complex64>) -> Array2<Complex64> {
        let mut out = commutator(&self.effective, rho) * Complex64::new(0.0, -1.0);
        match &self.dissipator {
            Dissipator::None => {}
            Dissipator::Tensor(flat) => out += &contract(flat, rho),
            Dissipator::Operators(terms) => {
                for t in terms {
                    out += &t.k.dot(rho).dot(&t.ld);
                    out += &t.l.dot(rho).dot(&t.kd);
                    out -= &t.kd_l.dot(rho);
                    out -= &rho.dot(&t.ld_k);
                }
            }
        }
        out
    }
}

/// R[a,b,c,d] → M[a·N + b, c·N + d]
fn flatten(r: &Array4<Complex64>) -> Array2<Complex64> {
    let n = r.shape()[0];
    Array2::from_shape_fn((n * n, n * n), |(p, q)| r[[p / n, p % n, q / n, q % n]])
}

/// (Rρ)_ab = Σ_cd R_abcd ρ_cd on the flattened tensor.
fn contract(flat: &Array2<Complex64>, rho: &Array2<Complex64>) -> Array2<Complex64> {
    let n = rho.nrows();
    let v: Array1<Complex64> = rho.iter().cloned().collect();
    let w = flat.dot(&v);
    Array2::from_shape_fn((n, n), |(a, b)| w[a * n + b])
}
