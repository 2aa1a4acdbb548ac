//! Keyfitz entropy per cohort

pub mod matrix;
pub mod keyfitz;
pub mod cohorts;

pub use keyfitz::{keyfitz_entropy, survival_probabilities, Undefined};
pub use cohorts::{cohort_entropies, survivorship_entropies, CohortEntropy, EntropyTable};
