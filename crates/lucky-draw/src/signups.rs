//! Sign-in log: one row per attendee sign-in, exported as CSV for the organizers.

use crate::storage::{ensure_parent, StoreError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Validated sign-in payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSignup {
    pub name: String,
    pub company: String,
    pub phone: Option<String>,
}

impl NewSignup {
    /// Trims the fields; `None` when name or company is blank.
    pub fn new(name: &str, company: &str, phone: Option<&str>) -> Option<Self> {
        let name = name.trim();
        let company = company.trim();
        if name.is_empty() || company.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            company: company.to_string(),
            phone: phone
                .map(str::trim)
                .filter(|phone| !phone.is_empty())
                .map(str::to_string),
        })
    }
}

/// Stored sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRecord {
    pub id: u64,
    pub name: String,
    pub company: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Append-only sign-in storage.
pub trait SignupStore: Send + Sync {
    fn append(&self, signup: NewSignup) -> Result<SignupRecord, StoreError>;
    /// All sign-ins, newest first.
    fn list(&self) -> Result<Vec<SignupRecord>, StoreError>;
}

fn newest_first(mut records: Vec<SignupRecord>) -> Vec<SignupRecord> {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    records
}

#[derive(Debug, Default, Clone)]
pub struct InMemorySignupLog {
    records: Arc<Mutex<Vec<SignupRecord>>>,
}

impl SignupStore for InMemorySignupLog {
    fn append(&self, signup: NewSignup) -> Result<SignupRecord, StoreError> {
        let mut guard = self.records.lock().map_err(|_| StoreError::poisoned())?;
        let record = SignupRecord {
            id: guard.len() as u64 + 1,
            name: signup.name,
            company: signup.company,
            phone: signup.phone,
            created_at: Utc::now(),
        };
        guard.push(record.clone());
        Ok(record)
    }

    fn list(&self) -> Result<Vec<SignupRecord>, StoreError> {
        let guard = self.records.lock().map_err(|_| StoreError::poisoned())?;
        Ok(newest_first(guard.clone()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SignupRow {
    id: u64,
    name: String,
    company: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<SignupRow> for SignupRecord {
    fn from(row: SignupRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            company: row.company,
            phone: row.phone.filter(|phone| !phone.is_empty()),
            created_at: row.created_at,
        }
    }
}

/// CSV file holding the sign-in log. The file, with its header, is created on the first
/// sign-in.
///
/// The next id is read from the file once and then kept in memory, so the log must have a
/// single writer.
#[derive(Debug, Clone)]
pub struct CsvSignupLog {
    path: PathBuf,
    next_id: Arc<Mutex<Option<u64>>>,
}

impl CsvSignupLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            next_id: Arc::new(Mutex::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<SignupRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for row in reader.deserialize::<SignupRow>() {
            records.push(row?.into());
        }
        Ok(records)
    }
}

impl SignupStore for CsvSignupLog {
    fn append(&self, signup: NewSignup) -> Result<SignupRecord, StoreError> {
        let mut next_id = self.next_id.lock().map_err(|_| StoreError::poisoned())?;
        let id = match *next_id {
            Some(id) => id,
            None => self.read_all()?.iter().map(|record| record.id).max().unwrap_or(0) + 1,
        };

        let record = SignupRecord {
            id,
            name: signup.name,
            company: signup.company,
            phone: signup.phone,
            created_at: Utc::now(),
        };

        let create = !self.path.exists();
        if create {
            ensure_parent(&self.path)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(create)
            .from_writer(file);
        writer.serialize(SignupRow {
            id: record.id,
            name: record.name.clone(),
            company: record.company.clone(),
            phone: record.phone.clone(),
            created_at: record.created_at,
        })?;
        writer.flush()?;

        *next_id = Some(id + 1);
        Ok(record)
    }

    fn list(&self) -> Result<Vec<SignupRecord>, StoreError> {
        let _guard = self.next_id.lock().map_err(|_| StoreError::poisoned())?;
        Ok(newest_first(self.read_all()?))
    }
}

/// Renders sign-ins as the organizer's CSV: `ID,Name,Company,Phone,Time`.
pub fn export_csv(records: &[SignupRecord]) -> Result<String, StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(["ID", "Name", "Company", "Phone", "Time"])?;

    for record in records {
        writer.write_record([
            record.id.to_string(),
            record.name.clone(),
            record.company.clone(),
            record.phone.clone().unwrap_or_default(),
            record.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| StoreError::Io(err.into_error()))?;
    String::from_utf8(bytes).map_err(|err| StoreError::Unavailable(err.to_string()))
}
