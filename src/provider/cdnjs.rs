//! CDNJS adapter - normalizes the `api.cdnjs.com` metadata API.
//!
//! A single library-metadata endpoint returns every known version's asset
//! list in one response, so `find` and `get` share one fetch and `get`
//! locates the exact matching version object locally.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::http::{build_provider_client, get_text};
use super::validate::{ScopedNames, validate_library_name, validate_version};
use super::versions::sort_newest_first;
use super::{LibraryDetail, LibrarySummary, Provider, ProviderError, ResolvedRelease};

const SITE_URL: &str = "https://cdnjs.com/";
const DEFAULT_API_URL: &str = "https://api.cdnjs.com/libraries";
const DEFAULT_CDN_URL: &str = "https://cdnjs.cloudflare.com/ajax/libs";

// ==================== CDNJS API Response Types ====================

#[derive(Debug, Deserialize)]
struct CdnjsListing {
    results: Vec<CdnjsListEntry>,
}

#[derive(Debug, Deserialize)]
struct CdnjsListEntry {
    name: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CdnjsLibrary {
    description: Option<String>,
    keywords: Option<Vec<String>>,
    homepage: Option<String>,
    license: Option<CdnjsLicense>,
    assets: Vec<CdnjsAsset>,
}

/// The license field is a plain string in the current API but an object
/// with a `name` in older responses.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CdnjsLicense {
    Name(String),
    Detailed { name: String },
}

impl CdnjsLicense {
    fn into_name(self) -> String {
        match self {
            Self::Name(name) | Self::Detailed { name } => name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CdnjsAsset {
    version: String,
    files: Vec<String>,
}

// ==================== Cdnjs ====================

/// Adapter for CDNJS (<https://cdnjs.com/>).
pub struct Cdnjs {
    client: Client,
    api_url: String,
    cdn_url: String,
}

impl Cdnjs {
    /// Creates the adapter against the production CDNJS endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::ClientBuild`] if HTTP client construction fails.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_urls(DEFAULT_API_URL, DEFAULT_CDN_URL)
    }

    /// Creates the adapter with custom endpoints (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::ClientBuild`] if HTTP client construction fails.
    pub fn with_base_urls(
        api_url: impl Into<String>,
        cdn_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_provider_client("cdnjs")?,
            api_url: api_url.into(),
            cdn_url: cdn_url.into(),
        })
    }

    /// Fetches a library-metadata document, translating the API's two
    /// not-found shapes (404 and a literal `{}` body) into
    /// [`ProviderError::LibraryNotFound`] with the `.js` suffix-toggle hint.
    async fn fetch_library(&self, library: &str) -> Result<CdnjsLibrary, ProviderError> {
        let url = format!("{}/{library}", self.api_url);
        let body = match get_text(&self.client, &url).await {
            Ok(body) => body,
            Err(err) if err.http_status() == Some(404) => {
                return Err(not_found_with_hint(library, NotFoundVia::Status404));
            }
            Err(err) => return Err(err),
        };
        if body.trim() == "{}" {
            return Err(not_found_with_hint(library, NotFoundVia::EmptyBody));
        }
        serde_json::from_str(&body)
            .map_err(|e| ProviderError::unexpected_response(&url, e.to_string()))
    }
}

#[async_trait]
impl Provider for Cdnjs {
    fn code(&self) -> &'static str {
        "cdnjs"
    }

    fn site_url(&self) -> &'static str {
        SITE_URL
    }

    #[tracing::instrument(skip(self), fields(provider = "cdnjs"))]
    async fn list(&self) -> Result<Option<Vec<LibrarySummary>>, ProviderError> {
        let url = format!("{}?fields=name,description", self.api_url);
        let body = get_text(&self.client, &url).await?;
        let listing: CdnjsListing = serde_json::from_str(&body)
            .map_err(|e| ProviderError::unexpected_response(&url, e.to_string()))?;
        debug!(count = listing.results.len(), "CDNJS listing fetched");

        let mut libraries: Vec<LibrarySummary> = listing
            .results
            .into_iter()
            .map(|entry| LibrarySummary::new(entry.name, entry.description))
            .collect();
        libraries.sort_by(|a, b| a.name.cmp(&b.name));
        libraries.dedup();
        Ok(Some(libraries))
    }

    #[tracing::instrument(skip(self), fields(provider = "cdnjs"))]
    async fn find(&self, library: &str) -> Result<LibraryDetail, ProviderError> {
        validate_library_name(library, ScopedNames::Rejected)?;
        let data = self.fetch_library(library).await?;
        let versions =
            sort_newest_first(data.assets.into_iter().map(|asset| asset.version).collect());
        Ok(LibraryDetail {
            name: library.to_string(),
            description: data.description,
            tags: data.keywords.unwrap_or_default(),
            site_url: data.homepage,
            info_url: Some(format!("{SITE_URL}libraries/{library}")),
            license: data.license.map(CdnjsLicense::into_name),
            versions,
        })
    }

    #[tracing::instrument(skip(self), fields(provider = "cdnjs"))]
    async fn get(&self, library: &str, version: &str) -> Result<ResolvedRelease, ProviderError> {
        validate_library_name(library, ScopedNames::Rejected)?;
        validate_version(version)?;
        let data = self.fetch_library(library).await?;
        let asset = data
            .assets
            .into_iter()
            .find(|asset| asset.version == version)
            .ok_or_else(|| ProviderError::version_not_found(library, version))?;

        let base_url = format!("{}/{library}/{version}/", self.cdn_url);
        Ok(ResolvedRelease {
            name: library.to_string(),
            version: version.to_string(),
            description: data.description,
            tags: data.keywords.unwrap_or_default(),
            site_url: data.homepage,
            info_url: Some(format!("{SITE_URL}libraries/{library}/{version}")),
            license: data.license.map(CdnjsLicense::into_name),
            base_url,
            files: asset.files,
            dest_dir: None,
            skip_pattern: None,
            default_entry_point: None,
            npm_tarball_url: None,
        })
    }
}

/// Which of CDNJS's two not-found response shapes signaled the miss. The
/// wordings differ: the 404 hint has no closing period, the empty-body
/// hint does.
enum NotFoundVia {
    Status404,
    EmptyBody,
}

fn not_found_with_hint(library: &str, via: NotFoundVia) -> ProviderError {
    match js_suffix_toggle(library) {
        Some(suggestion) => match via {
            NotFoundVia::Status404 => {
                ProviderError::library_not_found_suggest_bare(library, suggestion)
            }
            NotFoundVia::EmptyBody => {
                ProviderError::library_not_found_suggest(library, suggestion)
            }
        },
        None => ProviderError::library_not_found(library),
    }
}

/// Toggles a trailing `.js`/`js` suffix: `emberjs` → `ember.js` and
/// `ember.js` → `emberjs`. Names not ending in `js` get no hint.
fn js_suffix_toggle(library: &str) -> Option<String> {
    if let Some(stem) = library.strip_suffix(".js") {
        Some(format!("{stem}js"))
    } else {
        library
            .strip_suffix("js")
            .map(|stem| format!("{stem}.js"))
    }
}
