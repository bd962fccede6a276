// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! RDM propagation command-line driver.
//!
//! # Usage
//!
//! ```bash
//! # Propagate a problem with the configured method
//! rdm-prop run --problem dimer.yaml
//!
//! # Override method and refinement, compare with the exact unitary result
//! rdm-prop run --problem dimer.yaml --method short-exp-6 --nref 4 --reference
//!
//! # Show effective configuration
//! rdm-prop config
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rdm_propagator::{
    config::Config,
    problem::{Problem, RunSummary},
    propagator::unitary_evolution,
    Error, Result, VERSION,
};

/// Reduced density matrix propagator
#[derive(Parser)]
#[command(name = "rdm-prop")]
#[command(author = "QubitOS Contributors")]
#[command(version = VERSION)]
#[command(about = "Propagate reduced density matrices of open quantum systems")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Propagate a problem file and print a JSON summary
    Run {
        /// Problem description (YAML)
        #[arg(short, long)]
        problem: PathBuf,

        /// Integration method
        #[arg(short, long, env = "RDMPROP_METHOD")]
        method: Option<String>,

        /// Fine steps per coarse time step
        #[arg(long, env = "RDMPROP_NREF")]
        nref: Option<usize>,

        /// Operator-form kernel (complex, split)
        #[arg(long, env = "RDMPROP_OPERATOR_KERNEL")]
        kernel: Option<String>,

        /// Run label (defaults to the problem name)
        #[arg(long)]
        name: Option<String>,

        /// Report every n-th time point
        #[arg(long, default_value_t = 1)]
        stride: usize,

        /// Report the deviation from exact unitary evolution
        #[arg(long)]
        reference: bool,
    },

    /// Show effective configuration
    Config,

    /// Validate configuration file
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    init_logging(&config.logging.level, &config.logging.format);

    match cli.command {
        Commands::Run {
            problem,
            method,
            nref,
            kernel,
            name,
            stride,
            reference,
        } => {
            // Override config with CLI args
            if let Some(method) = method {
                config.propagation.method = method;
            }
            if let Some(nref) = nref {
                config.propagation.nref = nref;
            }
            if let Some(kernel) = kernel {
                config.propagation.operator_kernel = kernel.parse()?;
            }
            config.validate()?;

            let spec = Problem::from_file(&problem)?;
            let mut propagator = spec.build_propagator()?;
            propagator.configure(&config.propagation)?;
            let method = config.propagation.method()?;
            let rho0 = spec.initial_state()?;
            let name = name.unwrap_or_else(|| spec.name.clone());

            info!(
                version = VERSION,
                problem = %problem.display(),
                method = %method,
                dim = propagator.dim(),
                time_points = propagator.time_axis().length(),
                nref = propagator.nref(),
                relaxation = %propagator.relaxation_kind(),
                field = propagator.has_field(),
                "Starting propagation"
            );

            let evolution = propagator.propagate_named(&rho0, method, &name)?;
            let mut summary = RunSummary::from_evolution(
                &evolution,
                &method.to_string(),
                propagator.nref(),
                stride,
            );

            if reference {
                if !spec.is_closed() {
                    return Err(Error::InvalidInput(
                        "--reference needs a problem without relaxation or field".into(),
                    ));
                }
                let exact =
                    unitary_evolution(propagator.hamiltonian(), &rho0, propagator.time_axis())?;
                let deviation = evolution.max_deviation(&exact)?;
                info!(deviation, "Compared with exact unitary evolution");
                summary.reference_deviation = Some(deviation);
            }

            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Commands::Config => {
            // Show effective configuration
            println!("{}", serde_yaml::to_string(&config)?);
        }

        Commands::Validate => match config.validate() {
            Ok(()) => {
                println!("Configuration is valid");
            }
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

/// Initialize logging with tracing. Logs go to stderr so that stdout
/// carries only the report.
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    if format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
