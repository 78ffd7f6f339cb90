//! Input shapes a roster can arrive in.
//!
//! Each shape yields the same thing: rows of trimmed cells, header row first. Anything shape
//! specific stays behind [`RosterSource`] so the normalizer never sees it.

use super::loader::{decode_text, logical_lines, parse_text};

/// Produces raw field rows from one kind of roster document.
pub trait RosterSource {
    fn rows(&self) -> Vec<Vec<String>>;
}

/// Comma-separated text with double-quote grouping.
#[derive(Debug, Clone)]
pub struct DelimitedText {
    text: String,
}

impl DelimitedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl RosterSource for DelimitedText {
    fn rows(&self) -> Vec<Vec<String>> {
        parse_text(&self.text)
    }
}

/// Plain text dumped out of a word-processor table: one table row per line, cells separated by
/// an ASCII comma, a full-width comma, or a tab. Empty cells are dropped.
#[derive(Debug, Clone)]
pub struct FlattenedTable {
    text: String,
}

impl FlattenedTable {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl RosterSource for FlattenedTable {
    fn rows(&self) -> Vec<Vec<String>> {
        logical_lines(&self.text)
            .map(|line| {
                line.split([',', '，', '\t'])
                    .map(str::trim)
                    .filter(|cell| !cell.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .collect()
    }
}

/// Cells already decoded from a spreadsheet's first sheet.
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetGrid {
    cells: Vec<Vec<String>>,
}

impl SpreadsheetGrid {
    pub fn new(cells: Vec<Vec<String>>) -> Self {
        Self { cells }
    }

    /// Reads the array-of-arrays JSON that sheet exporters emit. Numbers and booleans become
    /// their textual form; nulls become empty cells.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let grid: Vec<Vec<serde_json::Value>> = serde_json::from_slice(bytes)?;
        let cells = grid
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        Ok(Self { cells })
    }
}

impl RosterSource for SpreadsheetGrid {
    fn rows(&self) -> Vec<Vec<String>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|cell| cell.trim().to_string()).collect::<Vec<_>>())
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .collect()
    }
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Which [`RosterSource`] an uploaded document should be read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceShape {
    Delimited,
    FlattenedTable,
    SpreadsheetGrid,
}

impl SourceShape {
    pub fn from_file_name(file_name: &str) -> Self {
        let lowered = file_name.trim().to_ascii_lowercase();
        if lowered.ends_with(".json") {
            Self::SpreadsheetGrid
        } else if lowered.ends_with(".txt") || lowered.ends_with(".tsv") {
            Self::FlattenedTable
        } else {
            Self::Delimited
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("spreadsheet grid is not an array of rows: {0}")]
    Grid(#[from] serde_json::Error),
}

/// Decodes an in-memory document of the given shape into field rows.
pub fn rows_from_bytes(bytes: &[u8], shape: SourceShape) -> Result<Vec<Vec<String>>, SourceError> {
    let rows = match shape {
        SourceShape::Delimited => DelimitedText::new(decode_text(bytes)?).rows(),
        SourceShape::FlattenedTable => FlattenedTable::new(decode_text(bytes)?).rows(),
        SourceShape::SpreadsheetGrid => SpreadsheetGrid::from_json(bytes)?.rows(),
    };
    Ok(rows)
}
