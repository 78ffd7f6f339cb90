//! Roster acquisition: fetching, decoding, and mapping export rows onto records.

pub mod fetch;
pub mod format;
pub mod loader;
pub mod normalizer;
pub mod source;
pub mod table;

use std::time::Duration;

pub use fetch::{RemoteRosterFetcher, RosterFetcher};
pub use format::{Column, RosterFormat, NONE_MARKERS};
pub use loader::RosterLoader;
pub use normalizer::{normalize, normalize_rows, RosterRecord};
pub use source::{
    rows_from_bytes, DelimitedText, FlattenedTable, RosterSource, SourceError, SourceShape,
    SpreadsheetGrid,
};
pub use table::{CsvRosterTable, InMemoryRosterTable, PrizeTableRow, RosterTable};

/// The roster could not be obtained; callers decide whether to fail or fall back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterUnavailable {
    #[error("failed to fetch roster from {location}: {reason}")]
    Transport { location: String, reason: String },
    #[error("roster source {location} answered with status {status}")]
    Status { location: String, status: u16 },
    #[error("roster from {location} could not be decoded: {reason}")]
    Decode { location: String, reason: String },
    #[error("roster fetch from {location} timed out after {after:?}")]
    TimedOut { location: String, after: Duration },
}
