//! Source tables and CSV loading

mod records;
pub mod loader;

pub use records::{FertilityRecord, FertilityTable, SurvivorshipRecord, SurvivorshipTable};
pub use loader::{
    load_fertility, load_fertility_from_reader, load_survivorship, load_survivorship_from_reader,
};
