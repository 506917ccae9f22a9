//! Lattica command-line interface.
//!
//! Run wavelength sweeps from TOML configuration files:
//! ```sh
//! lattica run                 # built-in reference sweep
//! lattica run job.toml --parallel
//! lattica validate job.toml
//! lattica reference > job.toml
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use config::JobConfig;

#[derive(Parser)]
#[command(name = "lattica")]
#[command(about = "Lattica: RCWA spectra of dispersive photonic-crystal slabs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a sweep; without a configuration file, runs the reference sweep.
    Run {
        /// Path to the job configuration file.
        config: Option<PathBuf>,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Solve wavelengths in parallel (overrides config file setting).
        #[arg(short, long)]
        parallel: bool,
    },
    /// Validate a configuration file without running the sweep.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// Print the reference configuration as TOML.
    Reference,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            output,
            parallel,
        } => {
            println!("Lattica RCWA Solver");
            println!("===================");
            let job = match &config {
                Some(path) => {
                    println!("Configuration: {}", path.display());
                    config::load_config(path)?
                }
                None => {
                    println!("Configuration: built-in reference");
                    JobConfig::default()
                }
            };

            let spectrum = runner::run_job(&job, parallel || job.parallel)?;

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));
            let written = runner::write_outputs(&spectrum, &job, &out_dir)?;
            log::info!("wrote {} output file(s) to {}", written.len(), out_dir.display());

            println!("Sweep complete.");
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            job.validate()?;
            println!(
                "Configuration is valid: {} ({} wavelengths, {} harmonics)",
                config.display(),
                job.wavelengths.len(),
                job.sweep.solver.harmonic_count()
            );
            Ok(())
        }
        Commands::Reference => {
            print!("{}", config::reference_toml()?);
            Ok(())
        }
    }
}
