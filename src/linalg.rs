// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dense complex linear algebra used by the propagator.
//!
//! - [`matrix_exp`]: scaling-and-squaring with Padé(13) (Higham 2005)
//! - [`inverse`]: Gaussian elimination with partial pivoting
//! - small helpers: commutator, dagger, trace, element-wise deviation
//!
//! Ref: Higham (2005), "The Scaling and Squaring Method for the Matrix
//! Exponential Revisited", SIAM J. Matrix Anal. Appl. 26(4), 1179.

use ndarray::{s, Array2};
use num_complex::Complex64;

use crate::error::{Error, Result};

/// Commutator [A, B] = AB − BA.
pub fn commutator(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    a.dot(b) - b.dot(a)
}

/// Conjugate transpose (dagger) of a matrix.
pub fn conjugate_transpose(m: &Array2<Complex64>) -> Array2<Complex64> {
    m.t().mapv(|z| z.conj())
}

/// Complex trace.
pub fn trace(m: &Array2<Complex64>) -> Complex64 {
    m.diag().iter().sum()
}

/// Widen a real matrix to complex.
pub fn to_complex(m: &Array2<f64>) -> Array2<Complex64> {
    m.mapv(|x| Complex64::new(x, 0.0))
}

/// Largest element-wise modulus of A − B.
pub fn max_abs_diff(a: &Array2<Complex64>, b: &Array2<Complex64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max)
}

/// True when every imaginary part is negligible against the entry's modulus.
pub fn is_real(m: &Array2<Complex64>) -> bool {
    m.iter()
        .all(|z| z.im.abs() <= 1e-14 * z.norm().max(1.0))
}

/// Matrix exponential exp(A) by scaling and squaring around a Padé(13)
/// approximant.
///
/// Fails for non-square or non-finite input, and when the Padé denominator
/// cannot be factored.
pub fn matrix_exp(a: &Array2<Complex64>) -> Result<Array2<Complex64>> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(Error::InvalidInput(format!(
            "matrix exponential of a non-square {} × {} matrix",
            n,
            a.ncols()
        )));
    }
    if a.iter().any(|z| !(z.re.is_finite() && z.im.is_finite())) {
        return Err(Error::InvalidInput(
            "matrix exponential of a matrix with non-finite entries".into(),
        ));
    }
    match n {
        0 => return Ok(Array2::zeros((0, 0))),
        1 => return Ok(Array2::from_elem((1, 1), a[[0, 0]].exp())),
        _ => {}
    }

    // Halve until ‖A‖₁ ≤ θ₁₃ (Higham Table 10.2), then square back up.
    const THETA_13: f64 = 5.37;
    let norm = matrix_1_norm(a);
    let squarings = if norm > THETA_13 {
        (norm / THETA_13).log2().ceil() as i32
    } else {
        0
    };

    let scaled = a.mapv(|z| z * 2f64.powi(-squarings));
    let mut result = pade13(&scaled)?;
    for _ in 0..squarings {
        result = result.dot(&result);
    }
    Ok(result)
}

/// Padé(13,13) coefficients b₀..b₁₃, Higham (2005) eq. (10.33).
const PADE_COEFFS: [f64; 14] = [
    1.0,
    0.5,
    0.12,
    1.833_333_333_333_333_4e-2,
    1.992_753_623_188_405_8e-3,
    1.630_434_782_608_696e-4,
    1.035_196_687_401_6e-5,
    5.175_983_437_008_01e-7,
    2.043_151_356_652_5e-8,
    6.306_022_705_717_593e-10,
    1.483_770_048_404_14e-11,
    2.529_153_491_597_966e-13,
    2.810_170_546_219_962_4e-15,
    1.544_049_750_670_309e-17,
];

/// r₁₃(A) = (V − U)⁻¹ (V + U), with V the even and U the odd part of the
/// numerator polynomial, both evaluated from A², A⁴ and A⁶.
fn pade13(a: &Array2<Complex64>) -> Result<Array2<Complex64>> {
    let b = &PADE_COEFFS;
    let a2 = a.dot(a);
    let a4 = a2.dot(&a2);
    let a6 = a2.dot(&a4);
    let eye = identity(a.nrows());
    let powers = [&eye, &a2, &a4, &a6];

    // V = A⁶(b₁₂A⁶ + b₁₀A⁴ + b₈A²) + b₆A⁶ + b₄A⁴ + b₂A² + b₀I; U uses the odd b's times A.
    let even_odd = |offset: usize| {
        let high = combine(&powers[1..], &[b[8 + offset], b[10 + offset], b[12 + offset]]);
        let low = combine(
            &powers,
            &[b[offset], b[2 + offset], b[4 + offset], b[6 + offset]],
        );
        high.dot(&a6) + low
    };
    let v = even_odd(0);
    let u = a.dot(&even_odd(1));

    solve_linear(&v - &u, &v + &u)
}

/// Σ coeffs[k] · terms[k].
fn combine(terms: &[&Array2<Complex64>], coeffs: &[f64]) -> Array2<Complex64> {
    let mut acc = Array2::zeros(terms[0].raw_dim());
    for (term, &coeff) in terms.iter().zip(coeffs) {
        acc.scaled_add(c(coeff), *term);
    }
    acc
}

#[inline]
fn c(x: f64) -> Complex64 {
    Complex64::new(x, 0.0)
}

/// Identity matrix of dimension `n`.
pub fn identity(n: usize) -> Array2<Complex64> {
    Array2::from_diag_elem(n, Complex64::new(1.0, 0.0))
}

/// Inverse of a square matrix.
pub fn inverse(a: &Array2<Complex64>) -> Result<Array2<Complex64>> {
    if a.nrows() != a.ncols() {
        return Err(Error::InvalidInput(format!(
            "cannot invert a {} × {} matrix",
            a.nrows(),
            a.ncols()
        )));
    }
    solve_linear(a.clone(), identity(a.nrows()))
}

/// Solve A · X = B for X using Gaussian elimination with partial pivoting.
pub fn solve_linear(a: Array2<Complex64>, b: Array2<Complex64>) -> Result<Array2<Complex64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.nrows() {
        return Err(Error::InvalidInput(format!(
            "incompatible shapes for linear solve: A is {} × {}, B has {} rows",
            a.nrows(),
            a.ncols(),
            b.nrows()
        )));
    }
    let m = b.ncols();

    let mut aug = Array2::zeros((n, n + m));
    aug.slice_mut(s![.., ..n]).assign(&a);
    aug.slice_mut(s![.., n..]).assign(&b);

    for col in 0..n {
        let mut max_val = 0.0;
        let mut max_row = col;
        for row in col..n {
            let val = aug[[row, col]].norm();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }

        if max_row != col {
            for j in 0..(n + m) {
                aug.swap([col, j], [max_row, j]);
            }
        }

        let pivot = aug[[col, col]];
        if pivot.norm() < 1e-15 {
            return Err(Error::InvalidInput(format!(
                "matrix is singular (pivot {:.2e} in column {})",
                pivot.norm(),
                col
            )));
        }

        for row in (col + 1)..n {
            let factor = aug[[row, col]] / pivot;
            for j in col..(n + m) {
                let val = aug[[col, j]];
                aug[[row, j]] -= factor * val;
            }
        }
    }

    let mut x = Array2::<Complex64>::zeros((n, m));
    for col in (0..n).rev() {
        let pivot = aug[[col, col]];
        for j in 0..m {
            let mut sum = aug[[col, n + j]];
            for k in (col + 1)..n {
                sum -= aug[[col, k]] * x[[k, j]];
            }
            x[[col, j]] = sum / pivot;
        }
    }
    Ok(x)
}

/// 1-norm: max column sum of absolute values.
fn matrix_1_norm(a: &Array2<Complex64>) -> f64 {
    a.columns()
        .into_iter()
        .map(|col| col.iter().map(|z| z.norm()).sum::<f64>())
        .fold(0.0, f64::max)
}
