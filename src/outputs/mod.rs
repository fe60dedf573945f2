//! Output sinks for finished records.
//!
//! # Submodules
//!
//! - [`csv`]: Spreadsheet-friendly CSV with a UTF-8 BOM and Chinese headers
//! - [`json`]: A JSON array of records for programmatic consumers
//!
//! Both writers keep the column order title, link, author, date.

pub mod csv;
pub mod json;
