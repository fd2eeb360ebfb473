//! Download engine: materializes a resolved release on disk.
//!
//! The engine walks the release's file manifest in order. Directory
//! placeholders become directories, leaves are fetched over HTTP and
//! written verbatim, and files matching the release's skip pattern are
//! never touched. A second run over the same destination is idempotent:
//! unchanged files are detected by byte comparison and not rewritten.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};

use crate::provider::ResolvedRelease;
use crate::provider::http::default_user_agent;

use super::DownloadError;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 60;

/// What happened to a single manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// A leaf file was fetched and written; carries the byte count.
    Created(u64),
    /// The fetched content matched the existing file byte for byte; the
    /// file was not rewritten. Carries the fetched byte count.
    Unchanged(u64),
    /// A directory placeholder was created.
    CreatedDirectory,
    /// A directory placeholder already existed.
    AlreadyExists,
    /// The entry matched the release's skip pattern; no I/O happened.
    Skipped,
}

/// Receives per-entry progress while a release downloads.
///
/// `label` is the destination path for files and directories, and the
/// manifest entry itself for skipped files (which never map to a path).
pub trait DownloadObserver: Send + Sync {
    /// Called before an entry is processed.
    fn entry_started(&self, _label: &str) {}

    /// Called after an entry is processed with its outcome.
    fn entry_finished(&self, _label: &str, _outcome: &DownloadOutcome) {}
}

/// An observer that reports nothing.
pub struct SilentObserver;

impl DownloadObserver for SilentObserver {}

/// Downloads every file of a release into a destination directory.
#[derive(Debug, Default)]
pub struct DownloadEngine;

impl DownloadEngine {
    /// Creates a new engine. The HTTP client is built lazily, on the first
    /// leaf file of a `download` call; releases whose files are all
    /// directories or skipped never open a connection.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Materializes `release` under `dest_root`, reporting per-entry
    /// progress to `observer`. Returns the outcome of every manifest
    /// entry in order.
    ///
    /// The target directory is `dest_root/{dest_dir}` when the release
    /// names one, otherwise `dest_root/{name}/{version}`.
    ///
    /// # Errors
    ///
    /// Fails fast with [`DownloadError::DestinationMissing`] or
    /// [`DownloadError::DestinationNotDirectory`] before any network I/O.
    /// A fetch or write failure aborts the remaining entries; files
    /// already written stay on disk.
    #[instrument(skip(self, release, observer), fields(library = %release.name, version = %release.version))]
    pub async fn download(
        &self,
        release: &ResolvedRelease,
        dest_root: &Path,
        observer: &dyn DownloadObserver,
    ) -> Result<Vec<DownloadOutcome>, DownloadError> {
        if !dest_root.exists() {
            return Err(DownloadError::destination_missing(dest_root));
        }
        if !dest_root.is_dir() {
            return Err(DownloadError::destination_not_directory(dest_root));
        }

        let target_dir = dest_root.join(release.dest_dir_or_default());
        let mut client: Option<Client> = None;
        let mut outcomes = Vec::with_capacity(release.files.len());

        for entry in &release.files {
            let outcome = if release
                .skip_pattern
                .as_ref()
                .is_some_and(|pattern| pattern.is_match(entry))
            {
                observer.entry_started(entry);
                let outcome = DownloadOutcome::Skipped;
                observer.entry_finished(entry, &outcome);
                outcome
            } else if let Some(dir_entry) = entry.strip_suffix('/') {
                let dir_path = target_dir.join(dir_entry);
                let label = dir_path.display().to_string();
                observer.entry_started(&label);
                let outcome = ensure_directory(&dir_path).await?;
                observer.entry_finished(&label, &outcome);
                outcome
            } else {
                let file_path = target_dir.join(entry);
                let label = file_path.display().to_string();
                observer.entry_started(&label);
                if client.is_none() {
                    client = Some(build_client()?);
                }
                let http = client.as_ref().unwrap_or_else(|| unreachable!());
                let url = format!("{}{entry}", release.base_url);
                let outcome = fetch_into(http, &url, &file_path).await?;
                observer.entry_finished(&label, &outcome);
                outcome
            };
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}

/// Creates a directory placeholder, or reports that it already exists.
async fn ensure_directory(path: &Path) -> Result<DownloadOutcome, DownloadError> {
    if path.exists() {
        return Ok(DownloadOutcome::AlreadyExists);
    }
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| DownloadError::io(path, e))?;
    Ok(DownloadOutcome::CreatedDirectory)
}

/// Fetches one leaf and writes it under `path`, skipping the write when
/// the existing file already has identical content.
async fn fetch_into(
    client: &Client,
    url: &str,
    path: &Path,
) -> Result<DownloadOutcome, DownloadError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| DownloadError::network(url, e))?;
    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::http(
            url,
            status.as_u16(),
            status.canonical_reason().unwrap_or("error"),
        ));
    }
    let content = response
        .bytes()
        .await
        .map_err(|e| DownloadError::network(url, e))?;
    let byte_count = content.len() as u64;
    debug!(url, byte_count, "fetched");

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DownloadError::io(parent, e))?;
    }

    if path.exists() {
        let existing = tokio::fs::read(path)
            .await
            .map_err(|e| DownloadError::io(path, e))?;
        if existing == content {
            return Ok(DownloadOutcome::Unchanged(byte_count));
        }
    }

    tokio::fs::write(path, &content)
        .await
        .map_err(|e| DownloadError::io(path, e))?;
    Ok(DownloadOutcome::Created(byte_count))
}

fn build_client() -> Result<Client, DownloadError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
        .user_agent(default_user_agent())
        .gzip(true)
        .build()
        .map_err(|source| DownloadError::ClientBuild { source })
}

/// An observer that records every event, for assertions in tests.
#[cfg(test)]
pub(crate) struct RecordingObserver {
    pub events: std::sync::Mutex<Vec<(String, DownloadOutcome)>>,
}

#[cfg(test)]
impl RecordingObserver {
    pub fn new() -> Self {
        Self {
            events: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
impl DownloadObserver for RecordingObserver {
    fn entry_finished(&self, label: &str, outcome: &DownloadOutcome) {
        self.events
            .lock()
            .unwrap()
            .push((label.to_string(), outcome.clone()));
    }
}
