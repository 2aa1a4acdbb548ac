//! Merged life table: grid construction, merge and derived rates

mod row;
pub mod grid;
pub mod merge;
pub mod rates;

pub use row::{LifeTable, LifeTableRow};
pub use grid::{build_grid, AgeGrid};
pub use merge::merge;
pub use rates::annotate;
