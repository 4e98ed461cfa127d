use super::{DriverStats, Output, Simulation};
use crate::base::Result;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Holds a summary of a finished simulation
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RunSummary {
    /// Simulation name
    pub name: String,

    /// Canonical name of the constitutive model
    pub model: String,

    /// Number of legs run
    pub n_legs: usize,

    /// Number of time steps
    pub n_steps: usize,

    /// Number of stress-control iterations
    pub n_iterations: usize,

    /// Number of rows written to the output table
    pub n_rows: usize,

    /// Time at the end of the run
    pub final_time: f64,

    /// Stress at the end of the run
    pub final_stress: Vec<f64>,

    /// Strain at the end of the run
    pub final_strain: Vec<f64>,

    /// Checked parameters
    pub parameters: Vec<(String, f64)>,
}

impl RunSummary {
    /// Allocates a new instance from a finished simulation
    pub fn new(sim: &Simulation, output: &Output, stats: &DriverStats) -> Result<Self> {
        Ok(RunSummary {
            name: sim.name.clone(),
            model: sim.material.name().to_string(),
            n_legs: stats.n_legs,
            n_steps: stats.n_steps,
            n_iterations: stats.n_iterations,
            n_rows: output.rows.len(),
            final_time: sim.simdat.scalar_old("time")?,
            final_stress: sim.material.matdat.array_old("stress")?,
            final_strain: sim.material.matdat.array_old("strain")?,
            parameters: sim.material.parameter_echo(),
        })
    }

    /// Reads a JSON file containing the summary
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_json<P>(full_path: &P) -> Result<Self>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let input = File::open(path)?;
        let buffered = BufReader::new(input);
        let summary = serde_json::from_reader(buffered)?;
        Ok(summary)
    }

    /// Writes a JSON file with the summary
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn write_json<P>(&self, full_path: &P) -> Result<()>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        if let Some(p) = path.parent() {
            fs::create_dir_all(p)?;
        }
        let mut file = File::create(&path)?;
        serde_json::to_writer_pretty(&mut file, &self)?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
