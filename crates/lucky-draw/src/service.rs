use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{AdminConfig, RosterConfig};
use crate::directory::DirectoryPolicy;
use crate::error::AppError;
use crate::roster::{
    normalize_rows, rows_from_bytes, PrizeTableRow, RosterFetcher, RosterLoader, RosterTable,
    RosterUnavailable, SourceShape,
};
use crate::signups::{export_csv, NewSignup, SignupRecord, SignupStore};
use crate::storage::StoreError;
use crate::winners::{lookup, PrizeOutcome};

/// Service composing the roster loader, sign-in log, and prize table behind the HTTP routes.
///
/// Nothing roster-derived is cached: every lookup and directory request re-reads its source.
pub struct DrawService<F, S, T> {
    loader: RosterLoader<F>,
    roster: RosterConfig,
    directory: DirectoryPolicy,
    signups: Arc<S>,
    table: Arc<T>,
    admin: AdminConfig,
}

impl<F, S, T> DrawService<F, S, T>
where
    F: RosterFetcher + 'static,
    S: SignupStore + 'static,
    T: RosterTable + 'static,
{
    pub fn new(
        fetcher: F,
        roster: RosterConfig,
        signups: Arc<S>,
        table: Arc<T>,
        admin: AdminConfig,
    ) -> Self {
        let loader = RosterLoader::new(fetcher, roster.fetch);
        let directory = DirectoryPolicy::for_format(&roster.directory_format);

        Self {
            loader,
            roster,
            directory,
            signups,
            table,
            admin,
        }
    }

    /// Resolves the prize for a sign-in against a freshly fetched roster.
    pub async fn find_winner(
        &self,
        name: &str,
        company: Option<&str>,
    ) -> Result<PrizeOutcome, RosterUnavailable> {
        let rows = self.loader.load(&self.roster.roster_url).await?;
        let records = normalize_rows(&rows, &self.roster.roster_format);
        let outcome = lookup(&records, name, company);

        debug!(%name, ?company, "winner lookup");
        info!(
            rows = rows.len(),
            records = records.len(),
            outcome = ?outcome.kind(),
            "winner lookup resolved"
        );
        Ok(outcome)
    }

    /// Company dropdown entries. Falls back to the fixed list when the roster is unreachable.
    pub async fn companies(&self) -> Vec<String> {
        match self.loader.load(&self.roster.directory_url).await {
            Ok(rows) => self.directory.build(&rows),
            Err(err) => {
                warn!(error = %err, "company directory unavailable, serving fallback list");
                self.directory.fallback()
            }
        }
    }

    pub async fn sign_in(&self, signup: NewSignup) -> Result<SignupRecord, StoreError> {
        let signups = Arc::clone(&self.signups);
        let record = run_blocking(move || signups.append(signup)).await?;
        info!(signup_id = record.id, "attendee signed in");
        Ok(record)
    }

    pub async fn export_signups(&self) -> Result<String, StoreError> {
        let signups = Arc::clone(&self.signups);
        let records = run_blocking(move || signups.list()).await?;
        export_csv(&records)
    }

    /// Checks the admin password without short-circuiting on the first differing byte.
    pub fn authorize(&self, password: &str) -> bool {
        match self.admin.password.as_deref() {
            Some(expected) => constant_time_eq(expected.as_bytes(), password.as_bytes()),
            None => false,
        }
    }

    /// Parses an uploaded unit roster and upserts it into the prize table.
    pub async fn upload_roster(&self, file_name: &str, bytes: &[u8]) -> Result<usize, AppError> {
        let shape = SourceShape::from_file_name(file_name);
        let rows = rows_from_bytes(bytes, shape)
            .map_err(|err| AppError::validation(format!("unreadable roster upload: {err}")))?;

        let entries: Vec<PrizeTableRow> = rows
            .iter()
            .skip(1)
            .filter_map(|row| PrizeTableRow::from_unit_row(row))
            .collect();

        let table = Arc::clone(&self.table);
        let applied = run_blocking(move || table.upsert(entries)).await?;
        info!(?shape, rows = rows.len(), applied, "prize table updated");
        Ok(applied)
    }
}

/// Runs a store call on the blocking pool; the stores do synchronous file I/O under a mutex.
async fn run_blocking<R, W>(work: W) -> Result<R, StoreError>
where
    R: Send + 'static,
    W: FnOnce() -> Result<R, StoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| StoreError::Unavailable(format!("store task failed: {err}")))?
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
