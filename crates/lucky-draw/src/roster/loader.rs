use super::fetch::RosterFetcher;
use super::RosterUnavailable;
use crate::config::FetchPolicy;
use tracing::{debug, warn};

/// Decodes roster bytes as UTF-8, dropping a leading byte-order mark and normalizing CRLF.
pub fn decode_text(bytes: &[u8]) -> Result<String, std::str::Utf8Error> {
    let text = std::str::from_utf8(bytes)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    Ok(text.replace("\r\n", "\n"))
}

/// Lines that carry any content; whitespace-only lines are dropped.
pub fn logical_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').filter(|line| !line.trim().is_empty())
}

/// Splits one line on commas that sit outside double quotes.
///
/// A quote toggles the quoted state and is not copied into the field. Every field is trimmed and
/// the last field is always emitted, so `a,b,` yields three fields.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for ch in line.chars() {
        match ch {
            '"' => quoted = !quoted,
            ',' if !quoted => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            other => current.push(other),
        }
    }
    fields.push(current.trim().to_string());

    fields
}

/// Parses decoded roster text into field rows, header line included.
pub fn parse_text(text: &str) -> Vec<Vec<String>> {
    logical_lines(text).map(split_fields).collect()
}

/// Fetches roster sources with a per-attempt deadline and a single retry.
#[derive(Debug, Clone)]
pub struct RosterLoader<F> {
    fetcher: F,
    policy: FetchPolicy,
}

impl<F: RosterFetcher> RosterLoader<F> {
    pub fn new(fetcher: F, policy: FetchPolicy) -> Self {
        Self { fetcher, policy }
    }

    /// Raw bytes of the source. Reports `RosterUnavailable` only after both attempts fail.
    pub async fn fetch_bytes(&self, location: &str) -> Result<Vec<u8>, RosterUnavailable> {
        match self.attempt(location).await {
            Ok(bytes) => Ok(bytes),
            Err(first) => {
                warn!(%location, error = %first, "roster fetch failed, retrying once");
                tokio::time::sleep(self.policy.retry_backoff).await;
                self.attempt(location).await.inspect_err(|err| {
                    warn!(%location, error = %err, "roster fetch retry failed");
                })
            }
        }
    }

    /// Decoded text of the source.
    pub async fn fetch_text(&self, location: &str) -> Result<String, RosterUnavailable> {
        let bytes = self.fetch_bytes(location).await?;
        decode_text(&bytes).map_err(|err| RosterUnavailable::Decode {
            location: location.to_string(),
            reason: err.to_string(),
        })
    }

    /// Field rows of a delimited-text source, header line included.
    pub async fn load(&self, location: &str) -> Result<Vec<Vec<String>>, RosterUnavailable> {
        let text = self.fetch_text(location).await?;
        let rows = parse_text(&text);
        debug!(%location, rows = rows.len(), "roster loaded");
        Ok(rows)
    }

    async fn attempt(&self, location: &str) -> Result<Vec<u8>, RosterUnavailable> {
        match tokio::time::timeout(self.policy.timeout, self.fetcher.fetch(location)).await {
            Ok(result) => result,
            Err(_) => Err(RosterUnavailable::TimedOut {
                location: location.to_string(),
                after: self.policy.timeout,
            }),
        }
    }
}
