//! Error types for the download module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while materializing a release on disk.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The destination root does not exist. Checked before any network I/O.
    #[error("{}: not exist.", path.display())]
    DestinationMissing {
        /// The destination root that was given.
        path: PathBuf,
    },

    /// The destination root exists but is not a directory.
    #[error("{}: not a directory.", path.display())]
    DestinationNotDirectory {
        /// The destination root that was given.
        path: PathBuf,
    },

    /// HTTP error response while fetching a file (4xx, 5xx).
    #[error("GET {url}: {status} {message}")]
    Http {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// The status reason phrase.
        message: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors).
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// File system error (create directory, read, write).
    #[error("IO error at {}: {source}", path.display())]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl DownloadError {
    /// Creates a missing-destination error.
    pub fn destination_missing(path: impl Into<PathBuf>) -> Self {
        Self::DestinationMissing { path: path.into() }
    }

    /// Creates a not-a-directory error.
    pub fn destination_not_directory(path: impl Into<PathBuf>) -> Self {
        Self::DestinationNotDirectory { path: path.into() }
    }

    /// Creates an HTTP status error.
    pub fn http(url: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: the variants need the
// url/path context the source errors don't carry, so the helper
// constructors are the conversion points.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_messages_are_exact() {
        assert_eq!(
            DownloadError::destination_missing("/tmp/nope").to_string(),
            "/tmp/nope: not exist."
        );
        assert_eq!(
            DownloadError::destination_not_directory("/tmp/file.txt").to_string(),
            "/tmp/file.txt: not a directory."
        );
    }

    #[test]
    fn test_http_error_display() {
        let error = DownloadError::http("https://example.com/a.js", 404, "Not Found");
        assert_eq!(
            error.to_string(),
            "GET https://example.com/a.js: 404 Not Found"
        );
    }

    #[test]
    fn test_io_error_display_contains_path() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = DownloadError::io(PathBuf::from("/tmp/test.js"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/test.js"), "Expected path in: {msg}");
    }
}
