//! Export helpers for turning in-memory records into shareable files.

pub mod csv;

pub use csv::{to_csv, CsvRecord};
