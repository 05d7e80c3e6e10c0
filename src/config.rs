//! Solver configuration and its JSON file format.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::SolveResult;
use crate::sim::coupled::{FixedPointConfig, NewtonConfig};

/// Settings of both stages of [`crate::solve`].
///
/// Missing sections and fields fall back to their defaults, so
/// `{"newton": {"absolute_tolerance": 1e-6}}` is a complete config file.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveConfig {
    pub fixed_point: FixedPointConfig,
    pub newton: NewtonConfig,
}

impl SolveConfig {
    pub fn validate(&self) -> SolveResult<()> {
        self.fixed_point.validate()?;
        self.newton.validate()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse solver config")
    }

    /// Reads a config from a JSON file.
    ///
    /// # Example
    /// ```no_run
    /// use meltflow::SolveConfig;
    /// use std::path::Path;
    ///
    /// let config = SolveConfig::read_json(Path::new("solver.json")).unwrap();
    /// println!("Newton atol: {}", config.newton.absolute_tolerance);
    /// ```
    pub fn read_json(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?;
        let reader = BufReader::new(file);

        let config: SolveConfig = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse solver config from: {}", path.display()))?;

        Ok(config)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create file: {}", path.display()))?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, self)
            .with_context(|| format!("Failed to serialize solver config to: {}", path.display()))?;

        Ok(())
    }
}
