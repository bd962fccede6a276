// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Operator-sum generator on real and imaginary parts.
//!
//! With ρ = a + ib, H = h + ig and L_m = p + iq (K_m real):
//!
//!   Re L(ρ) = [h,b] + [g,a] + Σ K(apᵀ + bqᵀ) + (pa − qb)Kᵀ − Kᵀ(pa − qb) − (apᵀ + bqᵀ)K
//!   Im L(ρ) = [g,b] − [h,a] + Σ K(bpᵀ − aqᵀ) + (pb + qa)Kᵀ − Kᵀ(pb + qa) − (bpᵀ − aqᵀ)K
//!
//! No Hermiticity of ρ is assumed, so results agree with the complex kernel
//! to rounding for any input.

use ndarray::{Array2, Array3, Axis, Zip};
use num_complex::Complex64;

use super::kernels::RunContext;
use super::liouvillian::{relaxation_slice, FieldCoupling};
use crate::error::Result;
use crate::relaxation::RelaxationTensor;

fn commutator(a: &Array2<f64>, b: &Array2<f64>) -> Array2<f64> {
    a.dot(b) - b.dot(a)
}

struct SplitTerm {
    k: Array2<f64>,
    kt: Array2<f64>,
    p: Array2<f64>,
    q: Array2<f64>,
    pt: Array2<f64>,
    qt: Array2<f64>,
    ktp: Array2<f64>,
    ktq: Array2<f64>,
    ptk: Array2<f64>,
    qtk: Array2<f64>,
}

impl SplitTerm {
    fn new(k: Array2<f64>, l: &Array2<Complex64>) -> Self {
        let p = l.mapv(|z| z.re);
        let q = l.mapv(|z| z.im);
        let kt = k.t().to_owned();
        let pt = p.t().to_owned();
        let qt = q.t().to_owned();
        Self {
            ktp: kt.dot(&p),
            ktq: kt.dot(&q),
            ptk: pt.dot(&k),
            qtk: qt.dot(&k),
            k,
            kt,
            p,
            q,
            pt,
            qt,
        }
    }
}

/// Real-arithmetic counterpart of the complex Liouvillian, operator form only.
pub(crate) struct SplitLiouvillian<'a> {
    h: Array2<f64>,
    g: Array2<f64>,
    h_eff: Array2<f64>,
    g_eff: Array2<f64>,
    dipole: Option<(Array2<f64>, Array2<f64>, &'a [f64])>,
    relaxation: &'a RelaxationTensor,
    cutoff: Option<usize>,
    terms: Vec<SplitTerm>,
    slice: Option<usize>,
}

impl<'a> SplitLiouvillian<'a> {
    pub fn new(
        hamiltonian: &Array2<Complex64>,
        relaxation: &'a RelaxationTensor,
        cutoff: Option<usize>,
        coupling: Option<FieldCoupling<'a>>,
    ) -> Self {
        let h = hamiltonian.mapv(|z| z.re);
        let g = hamiltonian.mapv(|z| z.im);
        Self {
            h_eff: h.clone(),
            g_eff: g.clone(),
            h,
            g,
            dipole: coupling
                .map(|c| (c.dipole.mapv(|z| z.re), c.dipole.mapv(|z| z.im), c.field)),
            relaxation,
            cutoff,
            terms: Vec::new(),
            slice: None,
        }
    }

    pub fn prepare(&mut self, step: usize) -> Result<()> {
        if let Some((mu_re, mu_im, field)) = &self.dipole {
            let e = field[step];
            self.h_eff.assign(&self.h);
            self.h_eff.scaled_add(-e, mu_re);
            self.g_eff.assign(&self.g);
            self.g_eff.scaled_add(-e, mu_im);
        }

        let slice = if self.relaxation.is_time_dependent() {
            relaxation_slice(step, self.cutoff)
        } else {
            0
        };
        if self.slice != Some(slice) {
            let (k, l) = self.relaxation.operators_at(slice)?;
            self.terms = k
                .outer_iter()
                .zip(l.outer_iter())
                .map(|(km, lm)| SplitTerm::new(km.to_owned(), &lm.to_owned()))
                .collect();
            self.slice = Some(slice);
        }
        Ok(())
    }

    /// (Re L(ρ), Im L(ρ)) for ρ = a + ib.
    pub fn apply(&self, a: &Array2<f64>, b: &Array2<f64>) -> (Array2<f64>, Array2<f64>) {
        let (h, g) = (&self.h_eff, &self.g_eff);
        let mut re = commutator(h, b) + commutator(g, a);
        let mut im = commutator(g, b) - commutator(h, a);

        for t in &self.terms {
            let pa_qb = t.p.dot(a) - t.q.dot(b);
            let pb_qa = t.p.dot(b) + t.q.dot(a);
            let a_pt_b_qt = a.dot(&t.pt) + b.dot(&t.qt);
            let b_pt_a_qt = b.dot(&t.pt) - a.dot(&t.qt);

            re += &t.k.dot(&a_pt_b_qt);
            re += &pa_qb.dot(&t.kt);
            re -= &(t.ktp.dot(a) - t.ktq.dot(b));
            re -= &(a.dot(&t.ptk) + b.dot(&t.qtk));

            im += &t.k.dot(&b_pt_a_qt);
            im += &pb_qa.dot(&t.kt);
            im -= &(t.ktp.dot(b) + t.ktq.dot(a));
            im -= &(b.dot(&t.ptk) - a.dot(&t.qtk));
        }
        (re, im)
    }
}

/// Short-exp stepping on split real and imaginary parts.
pub(crate) fn short_exp(
    ctx: &RunContext<'_>,
    rho0: &Array2<Complex64>,
    order: usize,
    generator: &mut SplitLiouvillian<'_>,
) -> Result<Array3<Complex64>> {
    let mut data = ctx.buffer(rho0);
    let mut r1 = rho0.mapv(|z| z.re);
    let mut i1 = rho0.mapv(|z| z.im);
    let mut r2 = r1.clone();
    let mut i2 = i1.clone();

    for step in 1..ctx.nt {
        ctx.checkpoint(step)?;
        generator.prepare(step)?;

        for _ in 0..ctx.nref {
            for l in 1..=order {
                let pref = ctx.dt / l as f64;
                let (dr, di) = generator.apply(&r1, &i1);
                r1 = dr * pref;
                i1 = di * pref;
                r2 += &r1;
                i2 += &i1;
            }
            ctx.policy.enforce_split(&mut r2, &mut i2);
            r1.assign(&r2);
            i1.assign(&i2);
        }

        Zip::from(data.index_axis_mut(Axis(0), step))
            .and(&r2)
            .and(&i2)
            .for_each(|z, &re, &im| *z = Complex64::new(re, im));
    }
    Ok(data)
}
