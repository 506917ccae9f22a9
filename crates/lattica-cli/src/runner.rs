//! Sweep runner: builds the driver from a job and writes the spectra.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lattica_core::sweep::{InclusionModel, SweepDriver};
use lattica_core::types::Spectrum;

use crate::config::JobConfig;

/// Run the sweep described by `job`.
pub fn run_job(job: &JobConfig, parallel: bool) -> Result<Spectrum> {
    job.validate()?;
    let wavelengths = job.wavelengths.wavelengths();
    let driver = SweepDriver::reference(job.sweep.clone())?;

    println!(
        "  {} wavelengths over [{:.4}, {:.4}], orders {:?}, grid {:?}",
        wavelengths.len(),
        wavelengths.iter().cloned().fold(f64::INFINITY, f64::min),
        wavelengths.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        job.sweep.solver.orders,
        job.sweep.cell.grid
    );

    let spectrum = if parallel {
        driver.run_parallel(&wavelengths)?
    } else {
        driver.run(&wavelengths)?
    };

    println!(
        "  max |1 - R - T| over the sweep: {:.3e}",
        spectrum.max_energy_defect()
    );
    Ok(spectrum)
}

/// Write every output the job asks for into `out_dir`; returns the paths written.
pub fn write_outputs(spectrum: &Spectrum, job: &JobConfig, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    if job.output.save_spectra {
        let path = out_dir.join("spectra.csv");
        write_spectra_csv(spectrum, &path, job)?;
        written.push(path);
    }
    if job.output.save_json {
        let path = out_dir.join("spectra.json");
        write_spectra_json(spectrum, &path)?;
        written.push(path);
    }
    Ok(written)
}

/// Write R/T/A spectra to a CSV file with a metadata header.
pub fn write_spectra_csv(spectrum: &Spectrum, path: &Path, job: &JobConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let sweep = &job.sweep;
    let settings = &sweep.solver;
    writeln!(file, "# Lattica RCWA Solver - Slab Spectra")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(file, "# length_scale: {} m", sweep.constants.length_scale())?;
    writeln!(
        file,
        "# cell: pitch={}, radius={}, grid={}x{}",
        sweep.cell.lattice_pitch, sweep.cell.radius, sweep.cell.grid[0], sweep.cell.grid[1]
    )?;
    writeln!(
        file,
        "# slab: host_permittivity={}, thickness={}",
        sweep.host_permittivity, sweep.layer_thickness
    )?;
    match &sweep.inclusion {
        InclusionModel::Drude => writeln!(
            file,
            "# inclusion: drude, plasma_frequency={:.6e} rad/s, damping_rate={:.6e} rad/s",
            sweep.dispersion.plasma_frequency, sweep.dispersion.damping_rate
        )?,
        InclusionModel::Constant { epsilon } => {
            writeln!(file, "# inclusion: constant, epsilon={epsilon}")?
        }
    }
    writeln!(
        file,
        "# incidence: theta={}, phi={}, pte={}, ptm={}",
        settings.theta, settings.phi, settings.pte, settings.ptm
    )?;
    writeln!(
        file,
        "# orders: {}x{}, half spaces: {:?}",
        settings.orders[0], settings.orders[1], settings.half_space_permittivities
    )?;
    writeln!(file, "#")?;
    writeln!(file, "wavelength,reflection,transmission,absorption")?;

    for p in &spectrum.points {
        writeln!(
            file,
            "{:.6},{:.10e},{:.10e},{:.10e}",
            p.wavelength, p.reflection, p.transmission, p.absorption
        )?;
    }

    println!("Spectra written to: {}", path.display());
    Ok(())
}

/// Write spectra to a JSON file.
pub fn write_spectra_json(spectrum: &Spectrum, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(spectrum).context("JSON serialisation error")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Spectra (JSON) written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattica_core::types::{SolverSettings, SpectralPoint, WavelengthGrid};
    use lattica_core::Efficiencies;

    fn small_job() -> JobConfig {
        let mut job = JobConfig::default();
        job.wavelengths = WavelengthGrid::linspace(1.3, 2.3, 3);
        job.sweep.cell.grid = [32, 32];
        job.sweep.inclusion = InclusionModel::Constant { epsilon: 1.0 };
        job.sweep.solver = SolverSettings {
            orders: [1, 1],
            ..SolverSettings::default()
        };
        job
    }

    fn sample_spectrum() -> Spectrum {
        Spectrum::new(vec![
            SpectralPoint::new(1.2, Efficiencies { reflection: 0.4, transmission: 0.5 }),
            SpectralPoint::new(1.3, Efficiencies { reflection: 0.3, transmission: 0.6 }),
        ])
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("spectra.csv");
        write_spectra_csv(&sample_spectrum(), &path, &JobConfig::default()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.lines().next().unwrap().starts_with("# Lattica"));
        assert!(text.contains("# inclusion: drude"));
        let data: Vec<&str> = text.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(data[0], "wavelength,reflection,transmission,absorption");
        assert_eq!(data.len(), 3);
        let fields: Vec<f64> = data[1].split(',').map(|f| f.parse().unwrap()).collect();
        assert_eq!(fields[0], 1.2);
        assert!((fields[3] - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_json_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spectra.json");
        write_spectra_json(&sample_spectrum(), &path).unwrap();
        let back: Spectrum = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, sample_spectrum());
    }

    #[test]
    fn test_json_keeps_last_bit_of_derived_absorption() {
        let spectrum = Spectrum::new(vec![SpectralPoint::new(
            1.55,
            Efficiencies { reflection: 0.2123212003340863, transmission: 0.7876787996659064 },
        )]);
        let json = serde_json::to_string(&spectrum).unwrap();
        let back: Spectrum = serde_json::from_str(&json).unwrap();
        assert_eq!(back.points[0].absorption.to_bits(), spectrum.points[0].absorption.to_bits());
        assert_eq!(back.points[0].reflection.to_bits(), spectrum.points[0].reflection.to_bits());
    }

    #[test]
    fn test_write_outputs_respects_flags() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = JobConfig::default();
        job.output.save_spectra = false;
        assert!(write_outputs(&sample_spectrum(), &job, dir.path()).unwrap().is_empty());

        job.output.save_spectra = true;
        job.output.save_json = true;
        let written = write_outputs(&sample_spectrum(), &job, dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_small_job_runs_end_to_end() {
        let job = small_job();
        let sequential = run_job(&job, false).unwrap();
        let parallel = run_job(&job, true).unwrap();
        assert_eq!(sequential.len(), 3);
        assert_eq!(sequential.wavelengths(), parallel.wavelengths());
        for (s, p) in sequential.points.iter().zip(&parallel.points) {
            assert!((s.reflection - p.reflection).abs() < 1e-12);
        }
        assert!(sequential.max_energy_defect() < 1e-6);
    }

    #[test]
    fn test_invalid_job_is_rejected() {
        let mut job = small_job();
        job.sweep.layer_thickness = 0.0;
        assert!(run_job(&job, false).is_err());
    }
}
