// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! YAML problem descriptions for the `rdm-prop` command and the JSON run
//! summary it prints.
//!
//! ```yaml
//! name: dimer
//! time_axis: { start: 0.0, length: 1001, step: 0.01 }
//! hamiltonian:
//!   real: [[0.0, 0.1], [0.1, 0.0]]
//! initial:
//!   populations: [1.0, 0.0]
//! relaxation:
//!   channels:
//!     - { kind: amplitude_damping, from: 1, to: 0, rate: 0.05 }
//!     - { kind: dephasing, level: 1, rate: 0.02 }
//!   secular: false
//! dipole:
//!   real: [[0.0, 1.0], [1.0, 0.0]]
//! field:
//!   kind: continuous_wave
//!   amplitude: 0.01
//!   frequency: 0.2
//! ```

use std::path::Path;

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::evolution::DensityMatrixEvolution;
use crate::operators::{DensityMatrix, Hamiltonian};
use crate::propagator::RdmPropagator;
use crate::relaxation::{LindbladChannel, RelaxationTensor};
use crate::time::TimeAxis;

/// Dense matrix given as nested rows, with an optional imaginary part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixSpec {
    pub real: Vec<Vec<f64>>,
    #[serde(default)]
    pub imag: Option<Vec<Vec<f64>>>,
}

impl MatrixSpec {
    /// Assemble the complex matrix, checking that rows are rectangular.
    pub fn to_array(&self) -> Result<Array2<Complex64>> {
        let re = rows_to_array(&self.real, "real part")?;
        let Some(imag) = &self.imag else {
            return Ok(re.mapv(|x| Complex64::new(x, 0.0)));
        };
        let im = rows_to_array(imag, "imaginary part")?;
        if im.dim() != re.dim() {
            return Err(Error::InvalidInput(format!(
                "imaginary part is {:?}, real part is {:?}",
                im.dim(),
                re.dim()
            )));
        }
        Ok(Array2::from_shape_fn(re.dim(), |(i, j)| {
            Complex64::new(re[[i, j]], im[[i, j]])
        }))
    }
}

fn rows_to_array(rows: &[Vec<f64>], what: &str) -> Result<Array2<f64>> {
    let ncols = rows.first().map_or(0, Vec::len);
    if let Some(i) = rows.iter().position(|r| r.len() != ncols) {
        return Err(Error::InvalidInput(format!(
            "{what}: row {i} has {} entries, expected {ncols}",
            rows[i].len()
        )));
    }
    Ok(Array2::from_shape_fn((rows.len(), ncols), |(i, j)| rows[i][j]))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeAxisSpec {
    #[serde(default)]
    pub start: f64,
    pub length: usize,
    pub step: f64,
}

/// Initial condition: exactly one of a diagonal state or a full density matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialSpec {
    #[serde(default)]
    pub populations: Option<Vec<f64>>,
    #[serde(default)]
    pub density: Option<MatrixSpec>,
}

/// One Lindblad channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChannelSpec {
    AmplitudeDamping { from: usize, to: usize, rate: f64 },
    Dephasing { level: usize, rate: f64 },
    Custom {
        operator: Vec<Vec<f64>>,
        rate: f64,
        #[serde(default)]
        label: Option<String>,
    },
}

impl ChannelSpec {
    fn build(&self, dim: usize) -> Result<LindbladChannel> {
        match self {
            ChannelSpec::AmplitudeDamping { from, to, rate } => {
                LindbladChannel::amplitude_damping(dim, *from, *to, *rate)
            }
            ChannelSpec::Dephasing { level, rate } => {
                LindbladChannel::dephasing(dim, *level, *rate)
            }
            ChannelSpec::Custom {
                operator,
                rate,
                label,
            } => LindbladChannel::new(
                rows_to_array(operator, "channel operator")?,
                *rate,
                label.clone().unwrap_or_else(|| "custom".into()),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelaxationSpec {
    pub channels: Vec<ChannelSpec>,
    /// Use the dense tensor form instead of the operator form.
    #[serde(default)]
    pub tensor: bool,
    /// Secularize (implies the tensor form).
    #[serde(default)]
    pub secular: bool,
}

/// External field on the time grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldSpec {
    /// One value per time point.
    Values { values: Vec<f64> },
    /// E(t) = amplitude · cos(frequency · t + phase)
    ContinuousWave {
        amplitude: f64,
        frequency: f64,
        #[serde(default)]
        phase: f64,
    },
}

impl FieldSpec {
    fn sample(&self, axis: &TimeAxis) -> Vec<f64> {
        match self {
            FieldSpec::Values { values } => values.clone(),
            FieldSpec::ContinuousWave {
                amplitude,
                frequency,
                phase,
            } => axis
                .times()
                .into_iter()
                .map(|t| amplitude * (frequency * t + phase).cos())
                .collect(),
        }
    }
}

/// Complete propagation problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(default)]
    pub name: String,
    pub time_axis: TimeAxisSpec,
    pub hamiltonian: MatrixSpec,
    pub initial: InitialSpec,
    #[serde(default)]
    pub relaxation: Option<RelaxationSpec>,
    #[serde(default)]
    pub dipole: Option<MatrixSpec>,
    #[serde(default)]
    pub field: Option<FieldSpec>,
}

impl Problem {
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn time_axis(&self) -> Result<TimeAxis> {
        let t = &self.time_axis;
        TimeAxis::new(t.start, t.length, t.step)
    }

    pub fn hamiltonian(&self) -> Result<Hamiltonian> {
        Hamiltonian::new(self.hamiltonian.to_array()?)
    }

    pub fn initial_state(&self) -> Result<DensityMatrix> {
        match (&self.initial.populations, &self.initial.density) {
            (Some(p), None) => DensityMatrix::from_populations(p),
            (None, Some(m)) => DensityMatrix::new(m.to_array()?),
            _ => Err(Error::InvalidInput(
                "initial state needs exactly one of 'populations' or 'density'".into(),
            )),
        }
    }

    /// True when neither relaxation nor a field is attached.
    pub fn is_closed(&self) -> bool {
        self.relaxation.is_none() && self.field.is_none()
    }

    fn relaxation(&self, dim: usize) -> Result<Option<RelaxationTensor>> {
        let Some(spec) = &self.relaxation else {
            return Ok(None);
        };
        let channels = spec
            .channels
            .iter()
            .map(|c| c.build(dim))
            .collect::<Result<Vec<_>>>()?;
        let mut r = RelaxationTensor::lindblad(&channels)?;
        if spec.tensor || spec.secular {
            r = r.to_tensor();
        }
        if spec.secular {
            r.secularize()?;
        }
        Ok(Some(r.with_name("lindblad")))
    }

    /// Assemble the propagator with default run options.
    pub fn build_propagator(&self) -> Result<RdmPropagator> {
        let axis = self.time_axis()?;
        let hamiltonian = self.hamiltonian()?;
        let dim = hamiltonian.dim();

        let mut builder = RdmPropagator::builder(axis, hamiltonian);
        if let Some(r) = self.relaxation(dim)? {
            builder = builder.relaxation(r);
        }
        if let Some(mu) = &self.dipole {
            builder = builder.dipole(mu.to_array()?);
        }
        if let Some(field) = &self.field {
            builder = builder.field(field.sample(&axis));
        }
        builder.build()
    }
}

/// State at one time point of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSummary {
    pub time: f64,
    pub populations: Vec<f64>,
    pub trace: f64,
}

/// JSON report printed by `rdm-prop run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub name: String,
    pub method: String,
    pub dim: usize,
    pub nref: usize,
    pub points: Vec<PointSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_deviation: Option<f64>,
}

impl RunSummary {
    /// Summarize every `stride`-th snapshot; the last snapshot is always kept.
    pub fn from_evolution(
        evolution: &DensityMatrixEvolution,
        method: &str,
        nref: usize,
        stride: usize,
    ) -> Self {
        let stride = stride.max(1);
        let last = evolution.len().saturating_sub(1);
        let points = (0..evolution.len())
            .filter(|&i| i % stride == 0 || i == last)
            .map(|i| PointSummary {
                time: evolution.time_axis().time(i),
                populations: evolution.populations(i),
                trace: evolution.trace(i).re,
            })
            .collect();
        Self {
            name: evolution.name().to_string(),
            method: method.to_string(),
            dim: evolution.dim(),
            nref,
            points,
            reference_deviation: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagator::{unitary_evolution, RelaxationKind};
    use approx::assert_relative_eq;
    use std::io::Write as _;

    const DIMER: &str = r#"
name: dimer
time_axis: { length: 101, step: 0.1 }
hamiltonian:
  real: [[0.0, 0.1], [0.1, 0.0]]
initial:
  populations: [1.0, 0.0]
"#;

    #[test]
    fn test_closed_problem() {
        let problem = Problem::from_yaml(DIMER).unwrap();
        assert!(problem.is_closed());
        let p = problem.build_propagator().unwrap();
        assert_eq!(p.relaxation_kind(), RelaxationKind::None);

        let rho0 = problem.initial_state().unwrap();
        let ev = p.propagate(&rho0, "short-exp-6").unwrap();
        let exact = unitary_evolution(p.hamiltonian(), &rho0, p.time_axis()).unwrap();
        assert!(ev.max_deviation(&exact).unwrap() < 1e-8);
    }

    #[test]
    fn test_open_problem_with_field() {
        let yaml = r#"
time_axis: { start: 0.0, length: 20, step: 0.5 }
hamiltonian:
  real: [[0.0, 0.0, 0.0], [0.0, 1.0, 0.05], [0.0, 0.05, 1.1]]
  imag: [[0.0, 0.0, 0.0], [0.0, 0.0, 0.01], [0.0, -0.01, 0.0]]
initial:
  density:
    real: [[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]]
relaxation:
  channels:
    - { kind: amplitude_damping, from: 1, to: 0, rate: 0.1 }
    - { kind: dephasing, level: 2, rate: 0.05 }
    - kind: custom
      operator: [[0.0, 0.0, 1.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]]
      rate: 0.02
dipole:
  real: [[0.0, 1.0, 0.8], [1.0, 0.0, 0.0], [0.8, 0.0, 0.0]]
field:
  kind: continuous_wave
  amplitude: 0.02
  frequency: 1.0
"#;
        let problem = Problem::from_yaml(yaml).unwrap();
        assert!(!problem.is_closed());
        let p = problem.build_propagator().unwrap();
        assert_eq!(p.relaxation_kind(), RelaxationKind::ConstantOperators);
        assert!(p.has_field());

        let ev = p.propagate(&problem.initial_state().unwrap(), "short-exp").unwrap();
        assert_relative_eq!(ev.trace(19).re, 1.0, epsilon = 1e-10);
        assert!(ev.populations(19)[1] > 0.0);
    }

    #[test]
    fn test_secular_relaxation_is_tensor_form() {
        let yaml = r#"
time_axis: { length: 5, step: 0.1 }
hamiltonian:
  real: [[0.0, 0.0], [0.0, 1.0]]
initial:
  populations: [0.0, 1.0]
relaxation:
  channels:
    - { kind: amplitude_damping, from: 1, to: 0, rate: 0.1 }
  secular: true
"#;
        let p = Problem::from_yaml(yaml).unwrap().build_propagator().unwrap();
        assert_eq!(p.relaxation_kind(), RelaxationKind::ConstantTensor);
    }

    #[test]
    fn test_field_values_length_checked() {
        let yaml = format!(
            "{DIMER}dipole:\n  real: [[0.0, 1.0], [1.0, 0.0]]\nfield:\n  kind: values\n  values: [0.0, 0.1]\n"
        );
        let err = Problem::from_yaml(&yaml).unwrap().build_propagator().unwrap_err();
        assert!(matches!(err, Error::Construction(_)));
    }

    #[test]
    fn test_initial_state_must_be_unique() {
        let mut problem = Problem::from_yaml(DIMER).unwrap();
        problem.initial.density = Some(MatrixSpec {
            real: vec![vec![1.0, 0.0], vec![0.0, 0.0]],
            imag: None,
        });
        assert!(problem.initial_state().unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_ragged_matrix_rejected() {
        let spec = MatrixSpec {
            real: vec![vec![0.0, 1.0], vec![1.0]],
            imag: None,
        };
        assert!(matches!(spec.to_array(), Err(Error::InvalidInput(_))));

        let spec = MatrixSpec {
            real: vec![vec![0.0, 1.0], vec![1.0, 0.0]],
            imag: Some(vec![vec![0.0]]),
        };
        assert!(spec.to_array().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "{DIMER}").unwrap();
        let problem = Problem::from_file(f.path()).unwrap();
        assert_eq!(problem.name, "dimer");
        assert_eq!(problem.time_axis().unwrap().length(), 101);
    }

    #[test]
    fn test_run_summary_stride_keeps_last_point() {
        let problem = Problem::from_yaml(DIMER).unwrap();
        let p = problem.build_propagator().unwrap();
        let ev = p
            .propagate(&problem.initial_state().unwrap(), "short-exp")
            .unwrap();
        let summary = RunSummary::from_evolution(&ev, "short-exp", 1, 30);
        let times: Vec<f64> = summary.points.iter().map(|pt| pt.time).collect();
        assert_eq!(times.len(), 5);
        assert_relative_eq!(times[4], 10.0, epsilon = 1e-12);
        assert_eq!(summary.dim, 2);

        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("reference_deviation"));
    }
}
