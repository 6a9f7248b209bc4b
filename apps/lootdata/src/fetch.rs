//! # Table Fetching
//!
//! Fetches raw CSV payloads, one table at a time, in table-list order.
//! The first failure aborts the run before anything is compiled or written.
//!
//! - HTTP: `GET {base_url}/{Table}/csv`, non-2xx is fatal
//! - Directory: `{dir}/{Table}.csv`, for offline runs and tests

use lootdata_core::{CompileError, RawTables};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Where raw tables come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Http { base_url: String, timeout: Duration },
    Dir(PathBuf),
}

impl Source {
    /// A URL selects HTTP; anything else is a directory path.
    #[must_use]
    pub fn parse(value: &str, timeout: Duration) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            Self::Http {
                base_url: value.to_string(),
                timeout,
            }
        } else {
            Self::Dir(PathBuf::from(value))
        }
    }

    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Http { base_url, .. } => base_url.clone(),
            Self::Dir(dir) => dir.display().to_string(),
        }
    }
}

/// Sequential table fetcher over a [`Source`].
#[derive(Debug, Clone)]
pub struct TableFetcher {
    source: Source,
    http: Option<reqwest::Client>,
}

impl TableFetcher {
    pub fn new(source: Source) -> Result<Self, CompileError> {
        let http = match &source {
            Source::Http { timeout, .. } => Some(
                reqwest::Client::builder()
                    .timeout(*timeout)
                    .user_agent(concat!("lootdata/", env!("CARGO_PKG_VERSION")))
                    .build()
                    .map_err(|e| CompileError::Config(format!("HTTP client: {e}")))?,
            ),
            Source::Dir(_) => None,
        };
        Ok(Self { source, http })
    }

    #[must_use]
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Fetch every table in order.
    pub async fn fetch_all(&self, tables: &[&str]) -> Result<RawTables, CompileError> {
        let mut raw = RawTables::new();
        for table in tables {
            let payload = self.fetch_table(table).await?;
            info!(table = *table, bytes = payload.len(), "Fetched table");
            raw.push(*table, payload);
        }
        Ok(raw)
    }

    async fn fetch_table(&self, table: &str) -> Result<String, CompileError> {
        let fetch_error = |message: String| CompileError::Fetch {
            table: table.to_string(),
            message,
        };

        match (&self.source, &self.http) {
            (Source::Http { base_url, .. }, Some(http)) => {
                let url = format!("{}/{}/csv", base_url.trim_end_matches('/'), table);
                debug!(%url, "GET");

                let resp = http
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| fetch_error(format!("Cannot connect to {url}: {e}")))?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(fetch_error(format!("{url} returned {status}")));
                }
                resp.text()
                    .await
                    .map_err(|e| fetch_error(format!("Cannot read body: {e}")))
            }
            (Source::Dir(dir), _) => {
                let path = dir.join(format!("{table}.csv"));
                debug!(path = %path.display(), "Read");
                std::fs::read_to_string(&path)
                    .map_err(|e| fetch_error(format!("Cannot read {}: {e}", path.display())))
            }
            (Source::Http { .. }, None) => {
                Err(fetch_error("HTTP client not initialized".to_string()))
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
