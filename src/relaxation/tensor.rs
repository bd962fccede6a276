// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Relaxation tensor in tensor or operator-sum representation.

use ndarray::{s, Array2, Array3, Array4, ArrayView2, Axis};
use num_complex::Complex64;
use tracing::debug;

use super::lindblad::LindbladChannel;
use crate::error::{Error, Result};
use crate::linalg::{conjugate_transpose, identity, inverse, is_real, max_abs_diff, to_complex};

/// Operator-sum representation: real K_m and complex L_m, stacked along axis 0.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorSum {
    k: Array3<f64>,
    l: Array3<Complex64>,
}

impl OperatorSum {
    /// Pair up `K` (M × N × N, real) with `L` (M × N × N, complex).
    pub fn new(k: Array3<f64>, l: Array3<Complex64>) -> Result<Self> {
        check_operator_stack(k.dim(), l.dim())?;
        Ok(Self { k, l })
    }

    /// Number of operator pairs M.
    pub fn len(&self) -> usize {
        self.k.len_of(Axis(0))
    }

    /// True when there are no operator pairs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hilbert space dimension.
    pub fn dim(&self) -> usize {
        self.k.len_of(Axis(1))
    }

    /// Real K_m operators.
    pub fn k(&self) -> &Array3<f64> {
        &self.k
    }

    /// Complex L_m operators.
    pub fn l(&self) -> &Array3<Complex64> {
        &self.l
    }

    /// L_m† for every m.
    pub fn l_dagger(&self) -> Array3<Complex64> {
        let mut ld = Array3::zeros(self.l.raw_dim());
        for (mut out, lm) in ld.outer_iter_mut().zip(self.l.outer_iter()) {
            out.assign(&lm.t().mapv(|z| z.conj()));
        }
        ld
    }
}

/// Storage of a relaxation term.
#[derive(Debug, Clone, PartialEq)]
pub enum Representation {
    /// Constant N × N × N × N tensor.
    Tensor(Array4<Complex64>),
    /// One tensor per time-grid point.
    TimeDependentTensor(Vec<Array4<Complex64>>),
    /// Constant operator sum.
    Operators(OperatorSum),
    /// Constant K_m with one L_m stack per time-grid point.
    TimeDependentOperators {
        k: Array3<f64>,
        l: Vec<Array3<Complex64>>,
    },
}

/// Point after which a time-dependent relaxation term stops changing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cutoff {
    /// Grid index of the last slice in use.
    Index(usize),
    /// Time, resolved to the nearest grid index by the propagator.
    Time(f64),
}

/// Relaxation superoperator attached to a propagator.
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxationTensor {
    repr: Representation,
    dim: usize,
    cutoff: Option<Cutoff>,
    name: String,
}

impl RelaxationTensor {
    /// Constant dense tensor.
    pub fn from_tensor(data: Array4<Complex64>) -> Result<Self> {
        let dim = check_tensor_shape(&data)?;
        Ok(Self::with_repr(Representation::Tensor(data), dim))
    }

    /// Time-dependent dense tensor, one slice per time-grid point.
    pub fn time_dependent(slices: Vec<Array4<Complex64>>) -> Result<Self> {
        let first = slices.first().ok_or_else(|| {
            Error::Construction("time-dependent tensor needs at least one slice".into())
        })?;
        let dim = check_tensor_shape(first)?;
        if let Some(i) = slices.iter().position(|r| r.dim() != first.dim()) {
            return Err(Error::Construction(format!(
                "tensor slice {i} has shape {:?}, expected {:?}",
                slices[i].shape(),
                first.shape()
            )));
        }
        Ok(Self::with_repr(
            Representation::TimeDependentTensor(slices),
            dim,
        ))
    }

    /// Constant operator-sum form.
    pub fn from_operators(k: Array3<f64>, l: Array3<Complex64>) -> Result<Self> {
        let ops = OperatorSum::new(k, l)?;
        let dim = ops.dim();
        Ok(Self::with_repr(Representation::Operators(ops), dim))
    }

    /// Operator-sum form with time-dependent L_m.
    pub fn time_dependent_operators(k: Array3<f64>, l: Vec<Array3<Complex64>>) -> Result<Self> {
        if l.is_empty() {
            return Err(Error::Construction(
                "time-dependent operator form needs at least one L stack".into(),
            ));
        }
        for (i, lm) in l.iter().enumerate() {
            check_operator_stack(k.dim(), lm.dim())
                .map_err(|e| Error::Construction(format!("L stack {i}: {e}")))?;
        }
        let dim = k.len_of(Axis(1));
        Ok(Self::with_repr(
            Representation::TimeDependentOperators { k, l },
            dim,
        ))
    }

    /// Operator-sum form of a set of Lindblad channels, with L = (γ/2) K.
    pub fn lindblad(channels: &[LindbladChannel]) -> Result<Self> {
        let first = channels
            .first()
            .ok_or_else(|| Error::Construction("at least one Lindblad channel required".into()))?;
        let n = first.dim();
        let mut k = Array3::zeros((channels.len(), n, n));
        let mut l = Array3::zeros((channels.len(), n, n));
        for (m, ch) in channels.iter().enumerate() {
            if ch.dim() != n {
                return Err(Error::Construction(format!(
                    "channel '{}' has dimension {}, expected {}",
                    ch.label,
                    ch.dim(),
                    n
                )));
            }
            k.index_axis_mut(Axis(0), m).assign(&ch.operator);
            l.index_axis_mut(Axis(0), m)
                .assign(&ch.operator.mapv(|x| Complex64::new(0.5 * ch.rate * x, 0.0)));
        }
        debug!(channels = channels.len(), dim = n, "Built Lindblad operator form");
        Self::from_operators(k, l)
    }

    fn with_repr(repr: Representation, dim: usize) -> Self {
        Self {
            repr,
            dim,
            cutoff: None,
            name: String::new(),
        }
    }

    /// Freeze the relaxation data at grid index `index`.
    pub fn with_cutoff_index(mut self, index: usize) -> Self {
        self.cutoff = Some(Cutoff::Index(index));
        self
    }

    /// Freeze the relaxation data at the grid point nearest to `time`.
    pub fn with_cutoff_time(mut self, time: f64) -> Self {
        self.cutoff = Some(Cutoff::Time(time));
        self
    }

    /// Attach a label used in log output.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured cutoff, if any.
    pub fn cutoff(&self) -> Option<Cutoff> {
        self.cutoff
    }

    /// Hilbert space dimension N.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Stored representation.
    pub fn representation(&self) -> &Representation {
        &self.repr
    }

    /// True for the operator-sum representations.
    pub fn is_operator_form(&self) -> bool {
        matches!(
            self.repr,
            Representation::Operators(_) | Representation::TimeDependentOperators { .. }
        )
    }

    /// True when the data changes along the time axis.
    pub fn is_time_dependent(&self) -> bool {
        matches!(
            self.repr,
            Representation::TimeDependentTensor(_) | Representation::TimeDependentOperators { .. }
        )
    }

    /// Number of stored time slices for time-dependent data.
    pub fn time_points(&self) -> Option<usize> {
        match &self.repr {
            Representation::TimeDependentTensor(slices) => Some(slices.len()),
            Representation::TimeDependentOperators { l, .. } => Some(l.len()),
            _ => None,
        }
    }

    /// Dense tensor for time slice `idx` (ignored for constant data).
    pub fn tensor_at(&self, idx: usize) -> Result<&Array4<Complex64>> {
        match &self.repr {
            Representation::Tensor(r) => Ok(r),
            Representation::TimeDependentTensor(slices) => slices.get(idx).ok_or_else(|| {
                Error::InvalidInput(format!(
                    "relaxation slice {idx} requested, only {} stored",
                    slices.len()
                ))
            }),
            _ => Err(Error::Representation(
                "tensor is in operator form, not tensor form".into(),
            )),
        }
    }

    /// K_m and L_m for time slice `idx` (ignored for constant data).
    pub fn operators_at(&self, idx: usize) -> Result<(&Array3<f64>, &Array3<Complex64>)> {
        match &self.repr {
            Representation::Operators(ops) => Ok((ops.k(), ops.l())),
            Representation::TimeDependentOperators { k, l } => {
                let lm = l.get(idx).ok_or_else(|| {
                    Error::InvalidInput(format!(
                        "relaxation slice {idx} requested, only {} stored",
                        l.len()
                    ))
                })?;
                Ok((k, lm))
            }
            _ => Err(Error::Representation("tensor is not in operator form".into())),
        }
    }

    /// Zero every element that neither maps populations onto populations
    /// (a == b, c == d) nor a coherence onto itself (a == c, b == d).
    pub fn secularize(&mut self) -> Result<()> {
        match &mut self.repr {
            Representation::Tensor(r) => secularize_tensor(r),
            Representation::TimeDependentTensor(slices) => {
                slices.iter_mut().for_each(secularize_tensor)
            }
            _ => {
                return Err(Error::Representation(
                    "cannot secularize a relaxation tensor in operator form".into(),
                ))
            }
        }
        debug!(name = %self.name, "Secularized relaxation tensor");
        Ok(())
    }

    /// Change basis with ρ' = S⁻¹ ρ S.
    ///
    /// `inv` may supply S⁻¹; otherwise it is computed. Operator forms keep
    /// K_m real, so they accept only a real orthogonal S.
    pub fn transform(
        &mut self,
        ss: &Array2<Complex64>,
        inv: Option<&Array2<Complex64>>,
    ) -> Result<()> {
        if ss.nrows() != self.dim || ss.ncols() != self.dim {
            return Err(Error::InvalidInput(format!(
                "transformation matrix is {} × {}, relaxation dimension is {}",
                ss.nrows(),
                ss.ncols(),
                self.dim
            )));
        }
        let s1 = match inv {
            Some(m) => m.clone(),
            None => inverse(ss)?,
        };

        match &mut self.repr {
            Representation::Tensor(r) => transform_tensor(r, ss, &s1),
            Representation::TimeDependentTensor(slices) => {
                for r in slices.iter_mut() {
                    transform_tensor(r, ss, &s1);
                }
            }
            Representation::Operators(ops) => {
                check_orthogonal(ss, &s1)?;
                transform_real_stack(&mut ops.k, ss, &s1);
                transform_complex_stack(&mut ops.l, ss, &s1);
            }
            Representation::TimeDependentOperators { k, l } => {
                check_orthogonal(ss, &s1)?;
                transform_real_stack(k, ss, &s1);
                for lm in l.iter_mut() {
                    transform_complex_stack(lm, ss, &s1);
                }
            }
        }
        debug!(name = %self.name, dim = self.dim, "Relaxation tensor changed basis");
        Ok(())
    }

    /// Equivalent dense tensor form. Tensor forms are returned unchanged.
    pub fn to_tensor(&self) -> Self {
        let repr = match &self.repr {
            Representation::Operators(ops) => {
                Representation::Tensor(operators_to_tensor(ops.k(), ops.l()))
            }
            Representation::TimeDependentOperators { k, l } => Representation::TimeDependentTensor(
                l.iter().map(|lm| operators_to_tensor(k, lm)).collect(),
            ),
            other => other.clone(),
        };
        Self {
            repr,
            dim: self.dim,
            cutoff: self.cutoff,
            name: self.name.clone(),
        }
    }
}

fn check_tensor_shape(r: &Array4<Complex64>) -> Result<usize> {
    let (a, b, c, d) = r.dim();
    if a == 0 || !(a == b && b == c && c == d) {
        return Err(Error::Construction(format!(
            "relaxation tensor must be N × N × N × N with N > 0, got {:?}",
            r.shape()
        )));
    }
    Ok(a)
}

fn check_operator_stack(
    k: (usize, usize, usize),
    l: (usize, usize, usize),
) -> Result<()> {
    if k != l {
        return Err(Error::Construction(format!(
            "K has shape {k:?} but L has shape {l:?}"
        )));
    }
    if k.1 == 0 || k.1 != k.2 {
        return Err(Error::Construction(format!(
            "operators must be square and non-empty, got {} × {}",
            k.1, k.2
        )));
    }
    Ok(())
}

fn secularize_tensor(r: &mut Array4<Complex64>) {
    for ((a, b, c, d), v) in r.indexed_iter_mut() {
        if !((a == b && c == d) || (a == c && b == d)) {
            *v = Complex64::new(0.0, 0.0);
        }
    }
}

/// R'[a',b',c',d'] = Σ S⁻¹[a',a] S[b,b'] R[a,b,c,d] S[c,c'] S⁻¹[d',d]
fn transform_tensor(r: &mut Array4<Complex64>, ss: &Array2<Complex64>, s1: &Array2<Complex64>) {
    let n = ss.nrows();
    let st = ss.t().to_owned();
    let s1t = s1.t().to_owned();

    for c in 0..n {
        for d in 0..n {
            let block = r.slice(s![.., .., c, d]).to_owned();
            r.slice_mut(s![.., .., c, d])
                .assign(&s1.dot(&block).dot(ss));
        }
    }
    for a in 0..n {
        for b in 0..n {
            let block = r.slice(s![a, b, .., ..]).to_owned();
            r.slice_mut(s![a, b, .., ..])
                .assign(&st.dot(&block).dot(&s1t));
        }
    }
}

fn check_orthogonal(ss: &Array2<Complex64>, s1: &Array2<Complex64>) -> Result<()> {
    let n = ss.nrows();
    let orthogonal = max_abs_diff(&ss.t().dot(ss), &identity(n)) < 1e-10
        && max_abs_diff(s1, &ss.t().to_owned()) < 1e-10;
    if !is_real(ss) || !orthogonal {
        return Err(Error::Representation(
            "operator-form relaxation can only change basis by a real orthogonal matrix".into(),
        ));
    }
    Ok(())
}

fn transform_real_stack(k: &mut Array3<f64>, ss: &Array2<Complex64>, s1: &Array2<Complex64>) {
    let sr = ss.mapv(|z| z.re);
    let s1r = s1.mapv(|z| z.re);
    for mut km in k.outer_iter_mut() {
        let t = s1r.dot(&km).dot(&sr);
        km.assign(&t);
    }
}

fn transform_complex_stack(
    l: &mut Array3<Complex64>,
    ss: &Array2<Complex64>,
    s1: &Array2<Complex64>,
) {
    for mut lm in l.outer_iter_mut() {
        let t = s1.dot(&lm).dot(ss);
        lm.assign(&t);
    }
}

fn operators_to_tensor(k: &Array3<f64>, l: &Array3<Complex64>) -> Array4<Complex64> {
    let n = k.len_of(Axis(1));
    let mut r = Array4::zeros((n, n, n, n));
    for (km, lm) in k.outer_iter().zip(l.outer_iter()) {
        let km = to_complex(&km.to_owned());
        let lm: ArrayView2<Complex64> = lm;
        let ld = conjugate_transpose(&lm.to_owned());
        let kd = km.t().to_owned();
        let kd_l = kd.dot(&lm);
        let ld_k = ld.dot(&km);
        for ((a, b, c, d), v) in r.indexed_iter_mut() {
            *v += km[[a, c]] * ld[[d, b]] + lm[[a, c]] * kd[[d, b]];
            if b == d {
                *v -= kd_l[[a, c]];
            }
            if a == c {
                *v -= ld_k[[d, b]];
            }
        }
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_matrix_close;

    fn tensor_apply(r: &Array4<Complex64>, rho: &Array2<Complex64>) -> Array2<Complex64> {
        let n = rho.nrows();
        let mut out = Array2::zeros((n, n));
        for ((a, b, c, d), v) in r.indexed_iter() {
            out[[a, b]] += v * rho[[c, d]];
        }
        out
    }

    fn operator_apply(
        k: &Array3<f64>,
        l: &Array3<Complex64>,
        rho: &Array2<Complex64>,
    ) -> Array2<Complex64> {
        let n = rho.nrows();
        let mut out = Array2::zeros((n, n));
        for (km, lm) in k.outer_iter().zip(l.outer_iter()) {
            let km = to_complex(&km.to_owned());
            let lm = lm.to_owned();
            let ld = conjugate_transpose(&lm);
            let kd = km.t().to_owned();
            out = out + km.dot(rho).dot(&ld) + lm.dot(rho).dot(&kd)
                - kd.dot(&lm).dot(rho)
                - rho.dot(&ld).dot(&km);
        }
        out
    }

    fn sample_rho() -> Array2<Complex64> {
        let mut rho = Array2::zeros((2, 2));
        rho[[0, 0]] = Complex64::new(0.3, 0.0);
        rho[[1, 1]] = Complex64::new(0.7, 0.0);
        rho[[0, 1]] = Complex64::new(0.2, -0.1);
        rho[[1, 0]] = Complex64::new(0.2, 0.1);
        rho
    }

    fn damping_and_dephasing() -> RelaxationTensor {
        RelaxationTensor::lindblad(&[
            LindbladChannel::amplitude_damping(2, 1, 0, 0.2).unwrap(),
            LindbladChannel::dephasing(2, 1, 0.1).unwrap(),
        ])
        .unwrap()
    }

    fn random_tensor(n: usize) -> Array4<Complex64> {
        let mut r = Array4::zeros((n, n, n, n));
        for ((a, b, c, d), v) in r.indexed_iter_mut() {
            let x = (a * 7 + b * 5 + c * 3 + d) as f64;
            *v = Complex64::new((x * 0.37).sin(), (x * 0.11).cos() * 0.1);
        }
        r
    }

    #[test]
    fn test_shape_validation() {
        assert!(RelaxationTensor::from_tensor(Array4::zeros((2, 2, 2, 3))).is_err());
        assert!(
            RelaxationTensor::from_operators(Array3::zeros((1, 2, 2)), Array3::zeros((2, 2, 2)))
                .is_err()
        );
        assert!(RelaxationTensor::time_dependent(vec![]).is_err());
        assert!(RelaxationTensor::time_dependent(vec![
            Array4::zeros((2, 2, 2, 2)),
            Array4::zeros((3, 3, 3, 3))
        ])
        .is_err());
        assert!(
            RelaxationTensor::time_dependent_operators(Array3::zeros((1, 2, 2)), vec![]).is_err()
        );
    }

    #[test]
    fn test_capability_flags() {
        let t = RelaxationTensor::from_tensor(Array4::zeros((2, 2, 2, 2))).unwrap();
        assert!(!t.is_operator_form());
        assert!(!t.is_time_dependent());
        assert_eq!(t.time_points(), None);

        let o = damping_and_dephasing();
        assert!(o.is_operator_form());
        assert!(!o.is_time_dependent());

        let td = RelaxationTensor::time_dependent_operators(
            Array3::zeros((1, 2, 2)),
            vec![Array3::zeros((1, 2, 2)); 4],
        )
        .unwrap();
        assert!(td.is_operator_form());
        assert!(td.is_time_dependent());
        assert_eq!(td.time_points(), Some(4));
    }

    #[test]
    fn test_representation_accessors_mismatch() {
        let t = RelaxationTensor::from_tensor(Array4::zeros((2, 2, 2, 2))).unwrap();
        let err = t.operators_at(0).unwrap_err();
        assert!(matches!(err, Error::Representation(_)));
        assert!(err.to_string().contains("not in operator form"));

        let o = damping_and_dephasing();
        assert!(matches!(o.tensor_at(0), Err(Error::Representation(_))));
    }

    #[test]
    fn test_lindblad_matches_textbook_dissipator() {
        // L = γ/2 K gives γ (K ρ Kᵀ − ½{KᵀK, ρ}); for σ⁻ on |1⟩⟨1| that is ρ̇00 = γ.
        let gamma = 0.4;
        let channel = LindbladChannel::amplitude_damping(2, 1, 0, gamma).unwrap();
        let r = RelaxationTensor::lindblad(&[channel]).unwrap();
        let (k, l) = r.operators_at(0).unwrap();
        let mut rho = Array2::zeros((2, 2));
        rho[[1, 1]] = Complex64::new(1.0, 0.0);
        let d = operator_apply(k, l, &rho);
        assert!((d[[0, 0]] - Complex64::new(gamma, 0.0)).norm() < 1e-15);
        assert!((d[[1, 1]] + Complex64::new(gamma, 0.0)).norm() < 1e-15);
    }

    #[test]
    fn test_to_tensor_is_equivalent() {
        let r = damping_and_dephasing();
        let (k, l) = r.operators_at(0).unwrap();
        let expected = operator_apply(k, l, &sample_rho());

        let dense = r.to_tensor();
        assert!(!dense.is_operator_form());
        let actual = tensor_apply(dense.tensor_at(0).unwrap(), &sample_rho());
        assert_matrix_close(&actual, &expected, 1e-14);
    }

    #[test]
    fn test_secularize_keeps_population_and_coherence_blocks() {
        let mut r = RelaxationTensor::from_tensor(random_tensor(3)).unwrap();
        let before = r.tensor_at(0).unwrap().clone();
        r.secularize().unwrap();
        let after = r.tensor_at(0).unwrap();
        for ((a, b, c, d), v) in after.indexed_iter() {
            if (a == b && c == d) || (a == c && b == d) {
                assert_eq!(*v, before[[a, b, c, d]]);
            } else {
                assert_eq!(*v, Complex64::new(0.0, 0.0));
            }
        }
    }

    #[test]
    fn test_secularize_time_dependent_all_slices() {
        let mut r = RelaxationTensor::time_dependent(vec![random_tensor(2); 3]).unwrap();
        r.secularize().unwrap();
        for i in 0..3 {
            assert_eq!(r.tensor_at(i).unwrap()[[0, 1, 1, 0]], Complex64::new(0.0, 0.0));
        }
    }

    #[test]
    fn test_secularize_operator_form_fails() {
        let mut r = damping_and_dephasing();
        assert!(matches!(r.secularize(), Err(Error::Representation(_))));
    }

    #[test]
    fn test_transform_commutes_with_action() {
        // (R'ρ') = S⁻¹ (Rρ) S for ρ' = S⁻¹ ρ S
        let mut ss = Array2::zeros((2, 2));
        ss[[0, 0]] = Complex64::new(1.0, 0.0);
        ss[[0, 1]] = Complex64::new(0.5, 0.2);
        ss[[1, 0]] = Complex64::new(-0.3, 0.0);
        ss[[1, 1]] = Complex64::new(2.0, -0.1);
        let s1 = inverse(&ss).unwrap();

        let rt = random_tensor(2);
        let rho = sample_rho();
        let expected = s1.dot(&tensor_apply(&rt, &rho)).dot(&ss);

        let mut r = RelaxationTensor::from_tensor(rt).unwrap();
        r.transform(&ss, None).unwrap();
        let rho_t = s1.dot(&rho).dot(&ss);
        let actual = tensor_apply(r.tensor_at(0).unwrap(), &rho_t);
        assert_matrix_close(&actual, &expected, 1e-12);
    }

    #[test]
    fn test_transform_operator_form_orthogonal() {
        let theta: f64 = 0.3;
        let mut ss = Array2::zeros((2, 2));
        ss[[0, 0]] = Complex64::new(theta.cos(), 0.0);
        ss[[0, 1]] = Complex64::new(-theta.sin(), 0.0);
        ss[[1, 0]] = Complex64::new(theta.sin(), 0.0);
        ss[[1, 1]] = Complex64::new(theta.cos(), 0.0);
        let s1 = ss.t().to_owned();

        let mut ops = damping_and_dephasing();
        let mut dense = ops.to_tensor();
        ops.transform(&ss, Some(&s1)).unwrap();
        dense.transform(&ss, Some(&s1)).unwrap();

        let rho = sample_rho();
        let (k, l) = ops.operators_at(0).unwrap();
        assert_matrix_close(
            &operator_apply(k, l, &rho),
            &tensor_apply(dense.tensor_at(0).unwrap(), &rho),
            1e-13,
        );
    }

    #[test]
    fn test_transform_operator_form_rejects_complex_matrix() {
        let mut ss = identity(2);
        ss[[0, 1]] = Complex64::new(0.0, 0.5);
        let mut ops = damping_and_dephasing();
        assert!(matches!(ops.transform(&ss, None), Err(Error::Representation(_))));
    }

    #[test]
    fn test_transform_dimension_mismatch() {
        let mut r = damping_and_dephasing();
        assert!(matches!(r.transform(&identity(3), None), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_cutoff_and_name() {
        let r = damping_and_dephasing().with_cutoff_time(2.5).with_name("bath");
        assert_eq!(r.cutoff(), Some(Cutoff::Time(2.5)));
        assert_eq!(r.name(), "bath");
        let r = r.with_cutoff_index(4);
        assert_eq!(r.cutoff(), Some(Cutoff::Index(4)));
    }

    #[test]
    fn test_l_dagger() {
        let mut l = Array3::zeros((1, 2, 2));
        l[[0, 0, 1]] = Complex64::new(1.0, 2.0);
        let ops = OperatorSum::new(Array3::zeros((1, 2, 2)), l).unwrap();
        assert_eq!(ops.l_dagger()[[0, 1, 0]], Complex64::new(1.0, -2.0));
        assert_eq!(ops.len(), 1);
        assert_eq!(ops.dim(), 2);
    }
}
