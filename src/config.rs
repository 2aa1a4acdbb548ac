//! Run configuration for the life table pipeline

use crate::error::{LifeTableError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Default location of the settings file
pub const DEFAULT_CONFIG_PATH: &str = "settings.json";

/// Configuration for a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// First age of the output grid (inclusive)
    pub min_age: u32,

    /// Last age of the output grid (inclusive)
    pub max_age: u32,

    /// Reproductive band; mx is forced to 0.0 outside it
    pub fertility_min_age: u32,
    pub fertility_max_age: u32,

    /// Divide each cohort's lx by its age-0 value before merging
    /// (HMD publishes lx per 100,000)
    pub standardise_lx: bool,

    /// Root directory under which numbered output folders are created
    pub output_root: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_age: 0,
            max_age: 110,
            fertility_min_age: 12,
            fertility_max_age: 55,
            standardise_lx: false,
            output_root: PathBuf::from("data/processed"),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file; missing keys take defaults
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: PipelineConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that both age ranges are well formed
    pub fn validate(&self) -> Result<()> {
        if self.min_age > self.max_age {
            return Err(LifeTableError::InvalidConfig(format!(
                "min_age {} exceeds max_age {}",
                self.min_age, self.max_age
            )));
        }
        if self.fertility_min_age > self.fertility_max_age {
            return Err(LifeTableError::InvalidConfig(format!(
                "fertility_min_age {} exceeds fertility_max_age {}",
                self.fertility_min_age, self.fertility_max_age
            )));
        }
        Ok(())
    }

    pub fn age_range(&self) -> AgeRange {
        AgeRange {
            min: self.min_age,
            max: self.max_age,
        }
    }

    /// True when fertility is allowed to be non-zero at this age
    pub fn in_fertility_band(&self, age: u32) -> bool {
        (self.fertility_min_age..=self.fertility_max_age).contains(&age)
    }
}

/// Closed integer age interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeRange {
    pub min: u32,
    pub max: u32,
}

impl AgeRange {
    /// Number of ages in the range
    pub fn span(&self) -> usize {
        (self.max - self.min) as usize + 1
    }

    pub fn contains(&self, age: u32) -> bool {
        (self.min..=self.max).contains(&age)
    }

    pub fn ages(&self) -> impl Iterator<Item = u32> {
        self.min..=self.max
    }
}
