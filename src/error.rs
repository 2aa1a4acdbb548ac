//! Error types for the life table pipeline
//!
//! Structural problems with the inputs and broken table invariants are errors
//! and abort the run. Numeric degeneracies (singular matrix, zero `lx`) are
//! not represented here; see [`crate::entropy::Undefined`].

use crate::cohort::CohortKey;
use thiserror::Error;

/// Which input table a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Survivorship,
    Fertility,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Survivorship => write!(f, "survivorship"),
            Source::Fertility => write!(f, "fertility"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LifeTableError {
    // === Structural errors ===
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required column is absent from an input table header
    #[error("{source_table} table is missing required column '{column}'")]
    MissingColumn { source_table: Source, column: String },

    /// A cell could not be interpreted
    #[error("invalid {field} value '{value}' in {source_table} table (row {row})")]
    InvalidValue {
        source_table: Source,
        field: &'static str,
        value: String,
        row: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // === Invariant violations ===
    /// The age grid does not hold exactly one row per (cohort, age)
    #[error("grid cardinality violated: expected {expected} rows, found {actual}")]
    GridCardinality { expected: usize, actual: usize },

    /// Two records of one source share the same (cohort, age)
    #[error("duplicate {source_table} record for {key} at age {age}")]
    DuplicateRecord {
        source_table: Source,
        key: CohortKey,
        age: u32,
    },

    /// Rows of a cohort are not strictly ascending by age
    #[error("ages for {key} are not strictly ascending at age {age}")]
    AgeOrder { key: CohortKey, age: u32 },
}

pub type Result<T> = std::result::Result<T, LifeTableError>;
