//! Source references and the collaborator that turns them into bytes.

use crate::error::ViewerError;
use std::fmt;
use std::time::Duration;

/// A non-empty locator for a point-cloud asset: an `http(s)://` URL or a
/// filesystem path (optionally `file://`-prefixed).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceRef(String);

impl SourceRef {
    /// Returns `None` for empty or whitespace-only input.
    pub fn new(locator: impl AsRef<str>) -> Option<Self> {
        let trimmed = locator.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Locator of the reconstructed cloud for `job_id` on the given service.
    pub fn for_job(upstream: &str, job_id: &str) -> Option<Self> {
        let base = upstream.trim().trim_end_matches('/');
        let job_id = job_id.trim();
        if base.is_empty() || job_id.is_empty() {
            return None;
        }
        Self::new(format!("{}/api/jobs/{}/gaussians.ply", base, job_id))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_remote(&self) -> bool {
        self.0.starts_with("http://") || self.0.starts_with("https://")
    }

    /// Filesystem path for local references.
    pub fn local_path(&self) -> Option<&str> {
        if self.is_remote() {
            None
        } else {
            Some(self.0.strip_prefix("file://").unwrap_or(&self.0))
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves a source reference to its raw payload. Called off the UI thread.
pub trait Fetch: Send + Sync {
    fn fetch(&self, source: &SourceRef) -> Result<Vec<u8>, ViewerError>;
}

/// HTTP(S) via a blocking client, everything else from disk.
pub struct SourceFetcher {
    client: reqwest::blocking::Client,
}

impl SourceFetcher {
    pub fn new() -> Result<Self, ViewerError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ViewerError::Fetch(e.to_string()))?;
        Ok(Self { client })
    }

    fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, ViewerError> {
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .map_err(|e| ViewerError::Fetch(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ViewerError::Fetch(format!(
                "Failed to fetch PLY: {}",
                status.as_u16()
            )));
        }

        let body = resp
            .bytes()
            .map_err(|e| ViewerError::Fetch(e.to_string()))?;
        Ok(body.to_vec())
    }
}

impl Fetch for SourceFetcher {
    fn fetch(&self, source: &SourceRef) -> Result<Vec<u8>, ViewerError> {
        match source.local_path() {
            None => self.fetch_remote(source.as_str()),
            Some(path) => {
                std::fs::read(path).map_err(|e| ViewerError::Fetch(format!("{}: {}", path, e)))
            }
        }
    }
}
