//! Life Table System - merged HMD/HFD life tables and Keyfitz entropy
//!
//! This library provides:
//! - Cohort age-grid construction and the survivorship/fertility merge
//! - Derived life table columns (lxmx, dx, qx, sx, vx)
//! - Keyfitz entropy (H_N) per cohort via the fundamental matrix method
//! - CSV loading and writing for the input and output tables

pub mod cohort;
pub mod config;
pub mod error;
pub mod input;
pub mod life_table;
pub mod entropy;
pub mod pipeline;
pub mod output;
pub mod report;

// Re-export commonly used types
pub use cohort::CohortKey;
pub use config::{AgeRange, PipelineConfig};
pub use error::{LifeTableError, Result};
pub use input::{FertilityTable, SurvivorshipTable};
pub use life_table::{LifeTable, LifeTableRow};
pub use entropy::{keyfitz_entropy, EntropyTable, Undefined};
pub use pipeline::{Pipeline, PipelineOutput, RunSummary};
pub use report::{LogReporter, RecordingReporter, Reporter};
