use super::format::RosterFormat;
use super::normalizer::normalize;
use crate::storage::{ensure_parent, StoreError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// One row of the admin-maintained prize table, in the unit roster column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeTableRow {
    #[serde(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Dept")]
    pub dept: String,
    #[serde(rename = "ChineseName")]
    pub chinese_name: String,
    #[serde(rename = "EnglishName")]
    pub english_name: String,
    #[serde(rename = "Prize")]
    pub prize: String,
}

impl PrizeTableRow {
    /// Builds a table row from a raw unit roster row; rows the unit roster format would not
    /// index are rejected.
    ///
    /// Double quotes are dropped from every cell: the roster loader treats them as grouping
    /// marks, so a quote stored in the table would not survive being read back as a roster.
    pub fn from_unit_row(row: &[String]) -> Option<Self> {
        let cleaned: Vec<String> = row.iter().map(|cell| cell.replace('"', "")).collect();
        let record = normalize(&cleaned, &RosterFormat::UNIT_ROSTER)?;
        let cell = |index: usize| cleaned.get(index).map(|value| value.trim().to_string());

        Some(Self {
            unit: cell(0).unwrap_or_default(),
            dept: record.company,
            chinese_name: cell(2).unwrap_or_default(),
            english_name: record.name,
            prize: record.base_prize,
        })
    }
}

/// Upload target for replacement rosters. Rows are keyed by English name.
pub trait RosterTable: Send + Sync {
    /// Inserts or replaces each row, returning how many uploaded rows were applied.
    fn upsert(&self, rows: Vec<PrizeTableRow>) -> Result<usize, StoreError>;
    fn rows(&self) -> Result<Vec<PrizeTableRow>, StoreError>;
}

fn merge(existing: &mut Vec<PrizeTableRow>, incoming: Vec<PrizeTableRow>) -> usize {
    let mut applied = 0;
    for row in incoming {
        match existing
            .iter_mut()
            .find(|current| current.english_name == row.english_name)
        {
            Some(current) => *current = row,
            None => existing.push(row),
        }
        applied += 1;
    }
    applied
}

/// Keeps the prize table as a CSV file that the roster loader can read back.
#[derive(Debug, Clone)]
pub struct CsvRosterTable {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl CsvRosterTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_rows(&self) -> Result<Vec<PrizeTableRow>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)?;
        let mut rows = Vec::new();
        for row in reader.deserialize::<PrizeTableRow>() {
            rows.push(row?);
        }
        Ok(rows)
    }

    fn write_rows(&self, rows: &[PrizeTableRow]) -> Result<(), StoreError> {
        ensure_parent(&self.path)?;
        let mut writer = csv::Writer::from_path(&self.path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl RosterTable for CsvRosterTable {
    fn upsert(&self, rows: Vec<PrizeTableRow>) -> Result<usize, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::poisoned())?;
        let mut existing = self.read_rows()?;
        let applied = merge(&mut existing, rows);
        self.write_rows(&existing)?;
        Ok(applied)
    }

    fn rows(&self) -> Result<Vec<PrizeTableRow>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::poisoned())?;
        self.read_rows()
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryRosterTable {
    rows: Arc<Mutex<Vec<PrizeTableRow>>>,
}

impl RosterTable for InMemoryRosterTable {
    fn upsert(&self, rows: Vec<PrizeTableRow>) -> Result<usize, StoreError> {
        let mut guard = self.rows.lock().map_err(|_| StoreError::poisoned())?;
        Ok(merge(&mut guard, rows))
    }

    fn rows(&self) -> Result<Vec<PrizeTableRow>, StoreError> {
        let guard = self.rows.lock().map_err(|_| StoreError::poisoned())?;
        Ok(guard.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::loader::parse_text;
    use crate::roster::normalizer::normalize_rows;

    fn unit_row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    fn temp_table(label: &str) -> CsvRosterTable {
        let path = std::env::temp_dir().join(format!(
            "lucky-draw-table-{label}-{}.csv",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        CsvRosterTable::new(path)
    }

    #[test]
    fn from_unit_row_requires_english_name() {
        let row = unit_row(&["ReSources", "SSC", "羅文妮", "Winnie Lo", "SAMPO氣炸烤箱 KZ-RA13B"]);
        let table_row = PrizeTableRow::from_unit_row(&row).expect("row");
        assert_eq!(table_row.unit, "ReSources");
        assert_eq!(table_row.english_name, "Winnie Lo");

        let nameless = unit_row(&["LEO", "CR", "楊乃菁", "", "新光三越3000禮券"]);
        assert!(PrizeTableRow::from_unit_row(&nameless).is_none());
    }

    #[test]
    fn quoted_prizes_read_back_unchanged_from_the_csv_table() {
        let table = temp_table("quotes");
        let row = PrizeTableRow::from_unit_row(&unit_row(&[
            "MSL",
            "CS",
            "藍英綸",
            "Jay Lan",
            "TOUS \"Bear\" 50ML, gift box",
        ]))
        .expect("row");
        assert_eq!(row.prize, "TOUS Bear 50ML, gift box");
        assert_eq!(table.upsert(vec![row]).expect("upsert"), 1);

        let text = std::fs::read_to_string(table.path()).expect("table written");
        let records = normalize_rows(&parse_text(&text), &RosterFormat::UNIT_ROSTER);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].base_prize, "TOUS Bear 50ML, gift box");
        assert_eq!(table.rows().expect("rows")[0].prize, "TOUS Bear 50ML, gift box");

        let _ = std::fs::remove_file(table.path());
    }

    #[test]
    fn upsert_replaces_rows_with_the_same_name() {
        let table = InMemoryRosterTable::default();
        let first = PrizeTableRow::from_unit_row(&unit_row(&["LEO", "CR", "楊乃菁", "Jin Yang", "新光三越3000禮券"]))
            .expect("row");
        let mut second = first.clone();
        second.prize = "Apple Homepod mini".to_string();

        assert_eq!(table.upsert(vec![first]).expect("upsert"), 1);
        assert_eq!(table.upsert(vec![second]).expect("upsert"), 1);

        let rows = table.rows().expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].prize, "Apple Homepod mini");
    }

    #[test]
    fn csv_table_round_trips_through_the_roster_loader() {
        let table = temp_table("round-trip");
        let rows = vec![
            PrizeTableRow::from_unit_row(&unit_row(&["ReSources", "SSC", "羅文妮", "Winnie Lo", "SAMPO氣炸烤箱 KZ-RA13B"]))
                .expect("row"),
            PrizeTableRow::from_unit_row(&unit_row(&["LEO", "CR", "楊乃菁", "Jin Yang", "新光三越3000禮券"]))
                .expect("row"),
        ];
        assert_eq!(table.upsert(rows).expect("upsert"), 2);

        let text = std::fs::read_to_string(table.path()).expect("table written");
        assert!(text.starts_with("Unit,Dept,ChineseName,EnglishName,Prize"));
        let records = normalize_rows(&parse_text(&text), &RosterFormat::UNIT_ROSTER);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Winnie Lo");
        assert_eq!(records[0].company, "SSC");

        let _ = std::fs::remove_file(table.path());
    }
}
