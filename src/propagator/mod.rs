// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Reduced density matrix propagator.
//!
//! A [`RdmPropagator`] owns a Hamiltonian, a time grid and, optionally, a
//! relaxation term and a dipole/field pair. [`RdmPropagator::propagate`]
//! selects a kernel from the method name and from what is attached:
//!
//! | relaxation            | short-exp          | primitive          |
//! |-----------------------|--------------------|--------------------|
//! | none                  | complex            | complex (no field) |
//! | constant tensor       | complex            | complex (no field) |
//! | constant operators    | complex or split   | complex (no field) |
//! | time-dependent tensor | complex            | unsupported        |
//! | time-dependent ops    | complex or split   | unsupported        |
//!
//! Every run allocates a fresh `(Nt, N, N)` buffer; the propagator itself is
//! never mutated by `propagate`, so one instance can serve many threads.

mod kernels;
mod liouvillian;
pub mod method;
pub mod reference;
mod split;

use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use ndarray::{Array2, Array3};
use num_complex::Complex64;
use rayon::prelude::*;
use tracing::{debug, info, warn};

pub use method::{DensityPolicy, OperatorKernel, PropagationMethod, METHOD_NAMES};
pub use reference::unitary_evolution;

use crate::config::PropagationConfig;
use crate::error::{Error, Result};
use crate::evolution::DensityMatrixEvolution;
use crate::operators::{DensityMatrix, Hamiltonian};
use crate::relaxation::{Cutoff, RelaxationTensor};
use crate::time::TimeAxis;
use kernels::RunContext;
use liouvillian::{FieldCoupling, Liouvillian};
use split::SplitLiouvillian;

/// Which relaxation data, if any, drives the dissipative part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaxationKind {
    None,
    ConstantTensor,
    ConstantOperators,
    TimeDependentTensor,
    TimeDependentOperators,
}

impl RelaxationKind {
    fn of(relaxation: Option<&RelaxationTensor>) -> Self {
        match relaxation {
            None => RelaxationKind::None,
            Some(r) => match (r.is_time_dependent(), r.is_operator_form()) {
                (false, false) => RelaxationKind::ConstantTensor,
                (false, true) => RelaxationKind::ConstantOperators,
                (true, false) => RelaxationKind::TimeDependentTensor,
                (true, true) => RelaxationKind::TimeDependentOperators,
            },
        }
    }

    /// True for the operator-sum representations.
    pub fn is_operator_form(self) -> bool {
        matches!(
            self,
            RelaxationKind::ConstantOperators | RelaxationKind::TimeDependentOperators
        )
    }
}

impl fmt::Display for RelaxationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelaxationKind::None => "no relaxation",
            RelaxationKind::ConstantTensor => "constant tensor relaxation",
            RelaxationKind::ConstantOperators => "constant operator-form relaxation",
            RelaxationKind::TimeDependentTensor => "time-dependent tensor relaxation",
            RelaxationKind::TimeDependentOperators => "time-dependent operator-form relaxation",
        };
        f.write_str(s)
    }
}

/// Collects the optional parts of a propagator before validation.
#[derive(Debug)]
pub struct RdmPropagatorBuilder {
    time_axis: TimeAxis,
    hamiltonian: Hamiltonian,
    relaxation: Option<RelaxationTensor>,
    dipole: Option<Array2<Complex64>>,
    field: Option<Vec<f64>>,
}

impl RdmPropagatorBuilder {
    /// Attach a relaxation term.
    pub fn relaxation(mut self, relaxation: RelaxationTensor) -> Self {
        self.relaxation = Some(relaxation);
        self
    }

    /// Attach a transition dipole operator.
    pub fn dipole(mut self, dipole: Array2<Complex64>) -> Self {
        self.dipole = Some(dipole);
        self
    }

    /// Attach external field values, one per time-grid point.
    pub fn field(mut self, field: Vec<f64>) -> Self {
        self.field = Some(field);
        self
    }

    /// Validate and assemble the propagator.
    pub fn build(self) -> Result<RdmPropagator> {
        let n = self.hamiltonian.dim();
        let nt = self.time_axis.length();
        if !self.hamiltonian.is_hermitian(1e-10) {
            warn!(dim = n, "Hamiltonian is not Hermitian");
        }

        if let Some(mu) = &self.dipole {
            if mu.nrows() != n || mu.ncols() != n {
                return Err(Error::Construction(format!(
                    "dipole operator is {} × {}, Hamiltonian is {n} × {n}",
                    mu.nrows(),
                    mu.ncols()
                )));
            }
        }
        if let Some(field) = &self.field {
            if self.dipole.is_none() {
                return Err(Error::Construction(
                    "external field requires a dipole operator".into(),
                ));
            }
            if field.len() != nt {
                return Err(Error::Construction(format!(
                    "field has {} values, time axis has {nt} points",
                    field.len()
                )));
            }
            if let Some(i) = field.iter().position(|e| !e.is_finite()) {
                return Err(Error::Construction(format!(
                    "field value at index {i} is not finite"
                )));
            }
        }

        let mut cutoff_index = None;
        if let Some(r) = &self.relaxation {
            if r.dim() != n {
                return Err(Error::Construction(format!(
                    "relaxation tensor has dimension {}, Hamiltonian has {n}",
                    r.dim()
                )));
            }
            cutoff_index = r.cutoff().map(|c| match c {
                Cutoff::Index(i) => i,
                Cutoff::Time(t) => self.time_axis.nearest(t),
            });
            if let Some(stored) = r.time_points() {
                let needed = cutoff_index.map_or(nt - 1, |c| c.min(nt - 1)) + 1;
                if stored < needed {
                    return Err(Error::Construction(format!(
                        "time-dependent relaxation has {stored} slices, {needed} are needed"
                    )));
                }
            }
        }

        debug!(
            dim = n,
            time_points = nt,
            relaxation = %RelaxationKind::of(self.relaxation.as_ref()),
            field = self.field.is_some(),
            cutoff = ?cutoff_index,
            "Built RDM propagator"
        );

        Ok(RdmPropagator {
            dt: self.time_axis.step(),
            time_axis: self.time_axis,
            hamiltonian: self.hamiltonian,
            relaxation: self.relaxation,
            dipole: self.dipole,
            field: self.field,
            cutoff_index,
            nref: 1,
            verbose: false,
            operator_kernel: OperatorKernel::default(),
            density_policy: DensityPolicy::default(),
            cancel: None,
        })
    }
}

/// Propagates density matrices on a fixed time grid.
#[derive(Debug)]
pub struct RdmPropagator {
    time_axis: TimeAxis,
    hamiltonian: Hamiltonian,
    relaxation: Option<RelaxationTensor>,
    dipole: Option<Array2<Complex64>>,
    field: Option<Vec<f64>>,
    cutoff_index: Option<usize>,
    nref: usize,
    dt: f64,
    verbose: bool,
    operator_kernel: OperatorKernel,
    density_policy: DensityPolicy,
    cancel: Option<Arc<AtomicBool>>,
}

impl RdmPropagator {
    /// Start building a propagator for `hamiltonian` on `time_axis`.
    pub fn builder(time_axis: TimeAxis, hamiltonian: Hamiltonian) -> RdmPropagatorBuilder {
        RdmPropagatorBuilder {
            time_axis,
            hamiltonian,
            relaxation: None,
            dipole: None,
            field: None,
        }
    }

    /// Closed-system propagator.
    pub fn new(time_axis: TimeAxis, hamiltonian: Hamiltonian) -> Result<Self> {
        Self::builder(time_axis, hamiltonian).build()
    }

    /// Number of fine steps per coarse interval; the fine step becomes
    /// `dt_coarse / nref`.
    pub fn set_dt_refinement(&mut self, nref: usize) -> Result<()> {
        if nref == 0 {
            return Err(Error::InvalidInput(
                "dt refinement must be at least 1".into(),
            ));
        }
        self.nref = nref;
        self.dt = self.time_axis.step() / nref as f64;
        Ok(())
    }

    /// Log every coarse step at `info` level.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn set_operator_kernel(&mut self, kernel: OperatorKernel) {
        self.operator_kernel = kernel;
    }

    pub fn set_density_policy(&mut self, policy: DensityPolicy) {
        self.density_policy = policy;
    }

    /// Flag polled once per coarse step; raising it aborts the run.
    pub fn set_cancellation_flag(&mut self, flag: Arc<AtomicBool>) {
        self.cancel = Some(flag);
    }

    /// Apply the run options of a loaded configuration. The method name is
    /// chosen per call and is not stored.
    pub fn configure(&mut self, config: &PropagationConfig) -> Result<()> {
        self.set_dt_refinement(config.nref)?;
        self.verbose = config.verbose;
        self.operator_kernel = config.operator_kernel;
        self.density_policy = config.density_policy;
        Ok(())
    }

    pub fn dim(&self) -> usize {
        self.hamiltonian.dim()
    }

    pub fn nref(&self) -> usize {
        self.nref
    }

    /// Fine step size.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn time_axis(&self) -> &TimeAxis {
        &self.time_axis
    }

    pub fn hamiltonian(&self) -> &Hamiltonian {
        &self.hamiltonian
    }

    pub fn relaxation(&self) -> Option<&RelaxationTensor> {
        self.relaxation.as_ref()
    }

    /// Grid index at which time-dependent relaxation stops advancing.
    pub fn cutoff_index(&self) -> Option<usize> {
        self.cutoff_index
    }

    /// True when both a dipole and a field are attached.
    pub fn has_field(&self) -> bool {
        self.dipole.is_some() && self.field.is_some()
    }

    pub fn relaxation_kind(&self) -> RelaxationKind {
        RelaxationKind::of(self.relaxation.as_ref())
    }

    /// Propagate `rho0` with the method named `method`.
    pub fn propagate(&self, rho0: &DensityMatrix, method: &str) -> Result<DensityMatrixEvolution> {
        let method: PropagationMethod = method.parse()?;
        self.propagate_named(rho0, method, "")
    }

    /// Propagate `rho0` and label the resulting evolution `name`.
    pub fn propagate_named(
        &self,
        rho0: &DensityMatrix,
        method: PropagationMethod,
        name: &str,
    ) -> Result<DensityMatrixEvolution> {
        if rho0.dim() != self.dim() {
            return Err(Error::InvalidInput(format!(
                "density matrix is {0} × {0}, system dimension is {1}",
                rho0.dim(),
                self.dim()
            )));
        }
        let data = self.run(rho0.data(), method)?;
        if self.verbose {
            info!(method = %method, name, "Propagation finished");
        }
        Ok(DensityMatrixEvolution::new(
            self.time_axis,
            data,
            name.to_string(),
        ))
    }

    /// Propagate several independent initial conditions in parallel.
    ///
    /// Results keep the input order and are named `batch-<i>`. The first
    /// failure is returned and no evolutions are.
    pub fn propagate_batch(
        &self,
        initials: &[DensityMatrix],
        method: &str,
    ) -> Result<Vec<DensityMatrixEvolution>> {
        let method: PropagationMethod = method.parse()?;
        debug!(runs = initials.len(), method = %method, "Starting batch propagation");
        initials
            .par_iter()
            .enumerate()
            .map(|(i, rho0)| self.propagate_named(rho0, method, &format!("batch-{i}")))
            .collect()
    }

    fn coupling(&self) -> Option<FieldCoupling<'_>> {
        match (&self.dipole, &self.field) {
            (Some(dipole), Some(field)) => Some(FieldCoupling { dipole, field }),
            _ => None,
        }
    }

    fn context(&self) -> RunContext<'_> {
        RunContext {
            nt: self.time_axis.length(),
            nref: self.nref,
            dt: self.dt,
            verbose: self.verbose,
            policy: self.density_policy,
            cancel: self.cancel.as_deref(),
        }
    }

    fn describe(&self, kind: RelaxationKind) -> String {
        if self.has_field() {
            format!("{kind} with external field")
        } else {
            kind.to_string()
        }
    }

    fn run(
        &self,
        rho0: &Array2<Complex64>,
        method: PropagationMethod,
    ) -> Result<Array3<Complex64>> {
        let kind = self.relaxation_kind();
        let relaxation = self.relaxation.as_ref();
        let h = self.hamiltonian.data();
        let ctx = self.context();

        debug!(
            method = %method,
            relaxation = %kind,
            field = self.has_field(),
            kernel = ?self.operator_kernel,
            dim = self.dim(),
            time_points = ctx.nt,
            nref = ctx.nref,
            "Starting propagation"
        );

        match method {
            PropagationMethod::RungeKutta | PropagationMethod::Diagonalization => Err(
                Error::NotImplemented(format!("'{method}' propagation is not available")),
            ),
            PropagationMethod::Primitive => match (kind, self.has_field()) {
                (
                    RelaxationKind::None
                    | RelaxationKind::ConstantTensor
                    | RelaxationKind::ConstantOperators,
                    false,
                ) => {
                    let mut gen = Liouvillian::new(h, relaxation, None, None);
                    kernels::primitive(&ctx, rho0, &mut gen)
                }
                _ => Err(Error::UnsupportedMethod {
                    method: method.to_string(),
                    configuration: self.describe(kind),
                }),
            },
            PropagationMethod::ShortExp { order } => {
                match (self.operator_kernel, relaxation) {
                    (OperatorKernel::Split, Some(r)) if kind.is_operator_form() => {
                        let mut gen =
                            SplitLiouvillian::new(h, r, self.cutoff_index, self.coupling());
                        split::short_exp(&ctx, rho0, order, &mut gen)
                    }
                    (OperatorKernel::Split, Some(_)) => Err(Error::Representation(format!(
                        "split kernel needs operator-form relaxation, got {kind}"
                    ))),
                    _ => {
                        let mut gen =
                            Liouvillian::new(h, relaxation, self.cutoff_index, self.coupling());
                        kernels::short_exp(&ctx, rho0, order, &mut gen)
                    }
                }
            }
        }
    }
}
