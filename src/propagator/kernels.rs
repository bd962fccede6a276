// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Stepping loops over the coarse time grid.
//!
//! Every kernel leaves snapshot 0 equal to the initial condition and fills
//! snapshots 1..Nt from `nref` fine steps of size `dt` each.

use std::sync::atomic::{AtomicBool, Ordering};

use ndarray::{Array2, Array3, Axis};
use num_complex::Complex64;
use tracing::info;

use super::liouvillian::Liouvillian;
use super::method::DensityPolicy;
use crate::error::{Error, Result};

/// Parameters shared by all kernels for one run.
pub(crate) struct RunContext<'a> {
    pub nt: usize,
    pub nref: usize,
    pub dt: f64,
    pub verbose: bool,
    pub policy: DensityPolicy,
    pub cancel: Option<&'a AtomicBool>,
}

impl RunContext<'_> {
    /// Called once per coarse step, never inside the fine-step loop.
    pub fn checkpoint(&self, step: usize) -> Result<()> {
        if self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return Err(Error::Cancelled { step });
        }
        if self.verbose {
            info!(step, total = self.nt, "Time step");
        }
        Ok(())
    }

    /// `(Nt, N, N)` buffer with snapshot 0 set.
    pub fn buffer(&self, rho0: &Array2<Complex64>) -> Array3<Complex64> {
        let n = rho0.nrows();
        let mut data = Array3::zeros((self.nt, n, n));
        data.index_axis_mut(Axis(0), 0).assign(rho0);
        data
    }
}

/// Exponential propagator truncated after `order` terms.
///
/// Each fine step accumulates ρ₂ += ρ₁ with ρ₁ ← (dt/l) L(ρ₁) for
/// l = 1..order, then restarts the series from ρ₁ = ρ₂.
pub(crate) fn short_exp(
    ctx: &RunContext<'_>,
    rho0: &Array2<Complex64>,
    order: usize,
    generator: &mut Liouvillian<'_>,
) -> Result<Array3<Complex64>> {
    let mut data = ctx.buffer(rho0);
    let mut rho1 = rho0.clone();
    let mut rho2 = rho0.clone();

    for step in 1..ctx.nt {
        ctx.checkpoint(step)?;
        generator.prepare(step)?;

        for _ in 0..ctx.nref {
            for l in 1..=order {
                let pref = Complex64::new(ctx.dt / l as f64, 0.0);
                rho1 = generator.apply(&rho1) * pref;
                rho2 += &rho1;
            }
            ctx.policy.enforce(&mut rho2);
            rho1.assign(&rho2);
        }

        data.index_axis_mut(Axis(0), step).assign(&rho2);
    }
    Ok(data)
}

/// First-order explicit Euler stepping.
pub(crate) fn primitive(
    ctx: &RunContext<'_>,
    rho0: &Array2<Complex64>,
    generator: &mut Liouvillian<'_>,
) -> Result<Array3<Complex64>> {
    let mut data = ctx.buffer(rho0);
    let mut rho = rho0.clone();
    let dt = Complex64::new(ctx.dt, 0.0);

    for step in 1..ctx.nt {
        ctx.checkpoint(step)?;
        generator.prepare(step)?;

        for _ in 0..ctx.nref {
            let drho = generator.apply(&rho);
            rho.scaled_add(dt, &drho);
            ctx.policy.enforce(&mut rho);
        }

        data.index_axis_mut(Axis(0), step).assign(&rho);
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn context(nt: usize, nref: usize, dt: f64) -> RunContext<'static> {
        RunContext {
            nt,
            nref,
            dt,
            verbose: false,
            policy: DensityPolicy::Unenforced,
            cancel: None,
        }
    }

    fn diagonal_h(e0: f64, e1: f64) -> Array2<Complex64> {
        let mut h = Array2::zeros((2, 2));
        h[[0, 0]] = Complex64::new(e0, 0.0);
        h[[1, 1]] = Complex64::new(e1, 0.0);
        h
    }

    fn coherent_state() -> Array2<Complex64> {
        Array2::from_elem((2, 2), Complex64::new(0.5, 0.0))
    }

    #[test]
    fn test_short_exp_phase_rotation() {
        // ρ01(t) = ρ01(0) exp(−i (E0 − E1) t)
        let h = diagonal_h(0.0, 1.0);
        let ctx = context(11, 10, 0.01);
        let mut gen = Liouvillian::new(&h, None, None, None);
        let data = short_exp(&ctx, &coherent_state(), 6, &mut gen).unwrap();

        let t = 1.0;
        let expected = Complex64::new(0.0, t).exp() * 0.5;
        assert_relative_eq!(data[[10, 0, 1]].re, expected.re, epsilon = 1e-12);
        assert_relative_eq!(data[[10, 0, 1]].im, expected.im, epsilon = 1e-12);
    }

    #[test]
    fn test_first_snapshot_is_initial_condition() {
        let h = diagonal_h(0.0, 3.0);
        let rho0 = coherent_state();
        let ctx = context(5, 2, 0.1);
        let mut gen = Liouvillian::new(&h, None, None, None);
        let data = primitive(&ctx, &rho0, &mut gen).unwrap();
        assert_eq!(data.index_axis(Axis(0), 0), rho0);
    }

    #[test]
    fn test_primitive_euler_step() {
        // One Euler step: ρ01 ← ρ01 (1 + i dt (E1 − E0))
        let h = diagonal_h(0.0, 1.0);
        let ctx = context(2, 1, 0.1);
        let mut gen = Liouvillian::new(&h, None, None, None);
        let data = primitive(&ctx, &coherent_state(), &mut gen).unwrap();
        assert_relative_eq!(data[[1, 0, 1]].re, 0.5, epsilon = 1e-15);
        assert_relative_eq!(data[[1, 0, 1]].im, 0.05, epsilon = 1e-15);
    }

    #[test]
    fn test_cancellation_checked_per_coarse_step() {
        let h = diagonal_h(0.0, 1.0);
        let flag = AtomicBool::new(true);
        let ctx = RunContext {
            cancel: Some(&flag),
            ..context(4, 1, 0.1)
        };
        let mut gen = Liouvillian::new(&h, None, None, None);
        let err = short_exp(&ctx, &coherent_state(), 4, &mut gen).unwrap_err();
        assert!(matches!(err, Error::Cancelled { step: 1 }));
    }
}
