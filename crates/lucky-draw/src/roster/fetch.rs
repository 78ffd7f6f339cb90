use super::RosterUnavailable;
use std::future::Future;
use std::path::PathBuf;

/// Capability to pull the raw bytes of a roster source.
pub trait RosterFetcher: Send + Sync {
    fn fetch(
        &self,
        location: &str,
    ) -> impl Future<Output = Result<Vec<u8>, RosterUnavailable>> + Send;
}

/// Fetches `http(s)://` sources over the network and everything else from the local disk.
#[derive(Debug, Clone, Default)]
pub struct RemoteRosterFetcher {
    client: reqwest::Client,
}

impl RemoteRosterFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

enum SourceLocation {
    Http(String),
    File(PathBuf),
}

impl SourceLocation {
    fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Http(trimmed.to_string())
        } else {
            let path = trimmed.strip_prefix("file://").unwrap_or(trimmed);
            Self::File(PathBuf::from(path))
        }
    }
}

impl RosterFetcher for RemoteRosterFetcher {
    fn fetch(
        &self,
        location: &str,
    ) -> impl Future<Output = Result<Vec<u8>, RosterUnavailable>> + Send {
        let client = self.client.clone();
        let target = SourceLocation::parse(location);
        let location = location.to_string();

        async move {
            match target {
                SourceLocation::Http(url) => {
                    let transport = |err: reqwest::Error| RosterUnavailable::Transport {
                        location: location.clone(),
                        reason: err.to_string(),
                    };

                    let response = client.get(&url).send().await.map_err(transport)?;
                    let status = response.status();
                    if !status.is_success() {
                        return Err(RosterUnavailable::Status {
                            location: location.clone(),
                            status: status.as_u16(),
                        });
                    }

                    let body = response.bytes().await.map_err(transport)?;
                    Ok(body.to_vec())
                }
                SourceLocation::File(path) => {
                    tokio::fs::read(&path)
                        .await
                        .map_err(|err| RosterUnavailable::Transport {
                            location,
                            reason: err.to_string(),
                        })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_parsing_distinguishes_http_and_files() {
        assert!(matches!(
            SourceLocation::parse(" https://blob.example/roster.csv "),
            SourceLocation::Http(url) if url == "https://blob.example/roster.csv"
        ));
        assert!(matches!(
            SourceLocation::parse("file:///srv/prizes.csv"),
            SourceLocation::File(path) if path == PathBuf::from("/srv/prizes.csv")
        ));
        assert!(matches!(
            SourceLocation::parse("data/prizes.csv"),
            SourceLocation::File(path) if path == PathBuf::from("data/prizes.csv")
        ));
    }

    #[tokio::test]
    async fn missing_file_is_reported_as_unavailable() {
        let fetcher = RemoteRosterFetcher::default();
        let error = fetcher
            .fetch("./does-not-exist-roster.csv")
            .await
            .expect_err("missing file");
        assert!(matches!(error, RosterUnavailable::Transport { .. }));
    }
}
