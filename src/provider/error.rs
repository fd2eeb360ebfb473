//! Error types for provider adapters.
//!
//! Every variant is terminal for the current invocation: nothing here is
//! caught and retried internally. Messages are user-facing and keep each
//! adapter's exact wording for the not-found cases.

use thiserror::Error;

/// Errors raised by CDN provider adapters.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Library name failed local validation; raised before any network call.
    #[error("{library}: unexpected library name.")]
    InvalidLibraryName {
        /// The rejected name.
        library: String,
    },

    /// Version string failed local validation; raised before any network call.
    #[error("{version}: unexpected version number.")]
    InvalidVersionNumber {
        /// The rejected version.
        version: String,
    },

    /// Search pattern could not be compiled into a matcher.
    #[error("{pattern}: unexpected search pattern.")]
    InvalidSearchPattern {
        /// The rejected pattern.
        pattern: String,
    },

    /// The provider has no such library. Some adapters attach a
    /// "maybe you meant" suggestion derived from the input.
    #[error("{library}: library not found{}", suggestion_suffix(suggestion, *hint_period))]
    LibraryNotFound {
        /// The requested library.
        library: String,
        /// Deterministic alternate spelling hint (CDNJS `.js` toggle).
        suggestion: Option<String>,
        /// Whether the hint parenthetical is followed by a period. CDNJS
        /// words its HTTP-404 hint without one; the empty-body hint has it.
        hint_period: bool,
    },

    /// The library exists but the requested version does not.
    #[error("{library} {version}: version not found.")]
    VersionNotFound {
        /// The requested library.
        library: String,
        /// The requested version.
        version: String,
    },

    /// The upstream call conflates the two not-found cases.
    #[error("{library}@{version}: library or version not found.")]
    LibraryOrVersionNotFound {
        /// The requested library.
        library: String,
        /// The requested version.
        version: String,
    },

    /// The provider has no bulk-listing endpoint; a search pattern is needed.
    #[error("{code}: cannot list libraries; please specify pattern such as 'jquery*'.")]
    CannotList {
        /// Provider code.
        code: String,
    },

    /// Non-success HTTP response not otherwise classified.
    #[error("GET {url}: {status} {message}")]
    Http {
        /// The URL that was fetched.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Status reason or response excerpt.
        message: String,
    },

    /// Network-level failure (DNS, connection refused, TLS, timeout).
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that was fetched.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The upstream response did not have the expected shape.
    #[error("unexpected response from {url}: {detail}")]
    UnexpectedResponse {
        /// The URL that was fetched.
        url: String,
        /// What was wrong with the response.
        detail: String,
    },

    /// HTTP client construction failed.
    #[error("HTTP client construction failed for {provider}: {detail}")]
    ClientBuild {
        /// Provider code.
        provider: String,
        /// Builder error description.
        detail: String,
    },
}

fn suggestion_suffix(suggestion: &Option<String>, hint_period: bool) -> String {
    match suggestion {
        Some(s) if hint_period => format!(" (maybe '{s}'?)."),
        Some(s) => format!(" (maybe '{s}'?)"),
        None => ".".to_string(),
    }
}

impl ProviderError {
    /// Creates an invalid-library-name error.
    pub fn invalid_library_name(library: impl Into<String>) -> Self {
        Self::InvalidLibraryName {
            library: library.into(),
        }
    }

    /// Creates an invalid-version-number error.
    pub fn invalid_version_number(version: impl Into<String>) -> Self {
        Self::InvalidVersionNumber {
            version: version.into(),
        }
    }

    /// Creates a library-not-found error without a suggestion.
    pub fn library_not_found(library: impl Into<String>) -> Self {
        Self::LibraryNotFound {
            library: library.into(),
            suggestion: None,
            hint_period: true,
        }
    }

    /// Creates a library-not-found error carrying an alternate-spelling hint.
    pub fn library_not_found_suggest(
        library: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::LibraryNotFound {
            library: library.into(),
            suggestion: Some(suggestion.into()),
            hint_period: true,
        }
    }

    /// Creates a library-not-found error whose hint is not followed by a
    /// period, matching how CDNJS words the hint on its HTTP-404 path.
    pub fn library_not_found_suggest_bare(
        library: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::LibraryNotFound {
            library: library.into(),
            suggestion: Some(suggestion.into()),
            hint_period: false,
        }
    }

    /// Creates a version-not-found error.
    pub fn version_not_found(library: impl Into<String>, version: impl Into<String>) -> Self {
        Self::VersionNotFound {
            library: library.into(),
            version: version.into(),
        }
    }

    /// Creates a library-or-version-not-found error.
    pub fn library_or_version_not_found(
        library: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::LibraryOrVersionNotFound {
            library: library.into(),
            version: version.into(),
        }
    }

    /// Creates a cannot-list error.
    pub fn cannot_list(code: impl Into<String>) -> Self {
        Self::CannotList { code: code.into() }
    }

    /// Creates an HTTP status error.
    pub fn http(url: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an unexpected-response error.
    pub fn unexpected_response(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            url: url.into(),
            detail: detail.into(),
        }
    }

    /// Creates a client-construction error.
    pub fn client_build(provider: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ClientBuild {
            provider: provider.into(),
            detail: detail.into(),
        }
    }

    /// Returns the HTTP status code when this is an [`ProviderError::Http`] error.
    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
