//! Flat CSV reports over finalized contributor records.
//!
//! Pure apart from [`write_atomic`]; rendering never touches the network.
//!
//! # Quick start
//!
//! ```no_run
//! use roster_report::{Layout, render, write_atomic};
//! # let records: Vec<roster_core::record::ContributorRecord> = Vec::new();
//!
//! let table = render(&records, &["core".to_owned()], Layout::Wide);
//! write_atomic("contributors.csv", &table).unwrap();
//! ```

mod csv;
mod output;
mod render;

pub mod error;

pub use error::{Error, Result};
pub use output::write_atomic;
pub use render::render;

use serde::Deserialize;

/// Column layout of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
  /// One row per contributor with the overall commit count.
  #[default]
  Summary,
  /// One row per contributor, one commit column per repository.
  Wide,
  /// One row per contributor per repository they committed to.
  Long,
}
