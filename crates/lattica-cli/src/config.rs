//! TOML configuration for sweep jobs.
//!
//! Every section is optional; an empty file describes the reference run.
//!
//! ```toml
//! parallel = true
//!
//! [wavelengths]
//! range = [1.2, 2.5]
//! points = 113
//!
//! [sweep]
//! host_permittivity = 12.0
//! layer_thickness = 0.2
//!
//! [sweep.cell]
//! lattice_pitch = 0.499
//! radius = 0.1
//! grid = [512, 512]
//!
//! [sweep.inclusion]
//! model = "drude"
//!
//! [output]
//! directory = "./output"
//! save_json = true
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use lattica_core::sweep::SweepConfig;
use lattica_core::types::WavelengthGrid;
use serde::{Deserialize, Serialize};

/// Top-level job configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Spread wavelengths across the rayon pool.
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub wavelengths: WavelengthGrid,
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl JobConfig {
    /// Check everything that can be checked without solving.
    pub fn validate(&self) -> Result<()> {
        self.sweep.validate().context("Invalid sweep configuration")?;
        let wavelengths = self.wavelengths.wavelengths();
        if wavelengths.is_empty() {
            anyhow::bail!("Wavelength grid is empty");
        }
        if let Some(bad) = wavelengths.iter().find(|wl| !(wl.is_finite() && **wl > 0.0)) {
            anyhow::bail!("Wavelengths must be finite and positive, found {bad}");
        }
        Ok(())
    }
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to save spectra as CSV (default: true).
    #[serde(default = "default_true")]
    pub save_spectra: bool,
    /// Whether to also save spectra as JSON (default: false).
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_spectra: true,
            save_json: false,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &Path) -> Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: JobConfig =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}

/// The reference job rendered as TOML.
pub fn reference_toml() -> Result<String> {
    toml::to_string(&JobConfig::default()).context("Failed to serialise reference configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattica_core::sweep::InclusionModel;
    use std::io::Write;

    #[test]
    fn test_empty_file_is_reference_job() {
        let config: JobConfig = toml::from_str("").unwrap();
        assert_eq!(config, JobConfig::default());
        assert_eq!(config.wavelengths.len(), 113);
        config.validate().unwrap();
    }

    #[test]
    fn test_reference_toml_round_trips() {
        let text = reference_toml().unwrap();
        let back: JobConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, JobConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let text = r#"
            parallel = true

            [wavelengths]
            values = [1.3, 1.7]

            [sweep]
            host_permittivity = 9.0

            [sweep.inclusion]
            model = "constant"
            epsilon = 1.0

            [sweep.solver]
            orders = [2, 2]
        "#;
        let config: JobConfig = toml::from_str(text).unwrap();
        assert!(config.parallel);
        assert_eq!(config.wavelengths.wavelengths(), vec![1.3, 1.7]);
        assert_eq!(config.sweep.host_permittivity, 9.0);
        assert_eq!(config.sweep.inclusion, InclusionModel::Constant { epsilon: 1.0 });
        assert_eq!(config.sweep.solver.orders, [2, 2]);
        assert_eq!(config.sweep.layer_thickness, 0.2);
        assert!(config.output.save_spectra);
    }

    #[test]
    fn test_validate_rejects_bad_jobs() {
        let mut config = JobConfig::default();
        config.sweep.cell.radius = 0.25;
        assert!(config.validate().is_err());

        let mut config = JobConfig::default();
        config.wavelengths = WavelengthGrid::List {
            values: vec![1.5, 0.0],
        };
        assert!(config.validate().is_err());

        let mut config = JobConfig::default();
        config.wavelengths = WavelengthGrid::linspace(1.2, 2.5, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[output]\ndirectory = \"spectra\"\nsave_json = true").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.output.directory, "spectra");
        assert!(config.output.save_json);

        let missing = load_config(Path::new("/nonexistent/job.toml"));
        assert!(missing.is_err());
    }
}
