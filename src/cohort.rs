//! Cohort identity: (country code, sub-population suffix, year)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of the country part of a combined population code (ISO3)
const COUNTRY_CODE_LEN: usize = 3;

/// Normalized identity of one population group over one year
///
/// Ordering follows field order, so sorting keys gives
/// (country_code, suffix, year). An empty suffix means "no suffix" and is a
/// distinct value of its own.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CohortKey {
    pub country_code: String,
    pub suffix: String,
    pub year: i32,
}

impl CohortKey {
    /// Create a key, trimming and upper-casing the code and suffix
    pub fn new(country_code: &str, suffix: Option<&str>, year: i32) -> Self {
        Self {
            country_code: normalize(country_code),
            suffix: suffix.map(normalize).unwrap_or_default(),
            year,
        }
    }

    /// Split a combined population code such as `DEUTE` or `GBR_NP`
    ///
    /// The first three characters are the country; the remainder, if any,
    /// is the suffix.
    pub fn from_population_code(code: &str, year: i32) -> Self {
        let code = normalize(code);
        let split = code
            .char_indices()
            .nth(COUNTRY_CODE_LEN)
            .map(|(idx, _)| idx)
            .unwrap_or(code.len());
        let (country, suffix) = code.split_at(split);
        Self {
            country_code: country.to_string(),
            suffix: suffix.to_string(),
            year,
        }
    }
}

impl fmt::Display for CohortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} {}", self.country_code, self.suffix, self.year)
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_uppercase()
}
