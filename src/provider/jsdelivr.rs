//! jsDelivr adapter - merges the jsDelivr data API with the Algolia
//! npm-search index.
//!
//! jsDelivr has no bulk-listing endpoint, so `list` is unsupported and
//! `search` goes through the hosted Algolia `npm-search` index (a fixed
//! public query endpoint with provider-supplied credentials). `find` takes
//! descriptive metadata from the search index but the authoritative version
//! list from `data.jsdelivr.com`, because the index's version list can be
//! stale.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::http::{build_provider_client, get_text};
use super::validate::{GlobPattern, ScopedNames, validate_library_name, validate_version};
use super::{LibraryDetail, LibrarySummary, Provider, ProviderError, ResolvedRelease};

const SITE_URL: &str = "https://www.jsdelivr.com/";
const DEFAULT_API_URL: &str = "https://data.jsdelivr.com/v1";
const DEFAULT_CDN_URL: &str = "https://cdn.jsdelivr.net/npm";
const DEFAULT_SEARCH_URL: &str = "https://ofcncog2cu-3.algolianet.com/1/indexes/npm-search/query";
const DEFAULT_LOOKUP_URL: &str = "https://ofcncog2cu-dsn.algolia.net/1/indexes/npm-search";

// Public search-only credentials published by the index operator.
const ALGOLIA_APP_ID: &str = "OFCNCOG2CU";
const ALGOLIA_API_KEY: &str = "f54e21fa3a2a0160595bb058179bfb1e";

// ==================== Upstream Response Types ====================

#[derive(Debug, Deserialize)]
struct AlgoliaSearchResponse {
    hits: Vec<AlgoliaHit>,
}

#[derive(Debug, Deserialize)]
struct AlgoliaHit {
    name: String,
    description: Option<String>,
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlgoliaObject {
    name: String,
    description: Option<String>,
    keywords: Option<Vec<String>>,
    homepage: Option<String>,
    license: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PackageVersions {
    versions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FlatFileList {
    default: Option<String>,
    #[serde(default)]
    files: Vec<FlatFileEntry>,
}

#[derive(Debug, Deserialize)]
struct FlatFileEntry {
    name: String,
}

// ==================== JsDelivr ====================

/// Adapter for jsDelivr (<https://www.jsdelivr.com/>).
pub struct JsDelivr {
    client: Client,
    api_url: String,
    cdn_url: String,
    search_url: String,
    lookup_url: String,
}

impl JsDelivr {
    /// Creates the adapter against the production jsDelivr endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::ClientBuild`] if HTTP client construction fails.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_urls(DEFAULT_API_URL, DEFAULT_SEARCH_URL, DEFAULT_LOOKUP_URL)
    }

    /// Creates the adapter with custom API/search endpoints (for testing
    /// with wiremock). The CDN base stays at its production value.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::ClientBuild`] if HTTP client construction fails.
    pub fn with_base_urls(
        api_url: impl Into<String>,
        search_url: impl Into<String>,
        lookup_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_provider_client("jsdelivr")?,
            api_url: api_url.into(),
            cdn_url: DEFAULT_CDN_URL.to_string(),
            search_url: search_url.into(),
            lookup_url: lookup_url.into(),
        })
    }

    /// Fetches descriptive metadata for one library from the search index.
    async fn lookup_metadata(&self, library: &str) -> Result<AlgoliaObject, ProviderError> {
        let url = format!("{}/{}", self.lookup_url, urlencoding::encode(library));
        let response = self
            .client
            .get(&url)
            .header("x-algolia-application-id", ALGOLIA_APP_ID)
            .header("x-algolia-api-key", ALGOLIA_API_KEY)
            .send()
            .await
            .map_err(|e| ProviderError::network(&url, e))?;
        let status = response.status();
        if status.as_u16() == 404 {
            return Err(ProviderError::library_not_found(library));
        }
        if !status.is_success() {
            return Err(ProviderError::http(
                &url,
                status.as_u16(),
                status.canonical_reason().unwrap_or("error"),
            ));
        }
        response
            .json()
            .await
            .map_err(|e| ProviderError::network(&url, e))
    }

    /// Fetches the authoritative, newest-first version list from the
    /// jsDelivr data API. Order is preserved as returned.
    async fn fetch_versions(&self, library: &str) -> Result<Vec<String>, ProviderError> {
        let url = format!("{}/package/npm/{library}", self.api_url);
        let body = match get_text(&self.client, &url).await {
            Ok(body) => body,
            Err(err) if err.http_status() == Some(404) => {
                return Err(ProviderError::library_not_found(library));
            }
            Err(err) => return Err(err),
        };
        let package: PackageVersions = serde_json::from_str(&body)
            .map_err(|e| ProviderError::unexpected_response(&url, e.to_string()))?;
        Ok(package.versions)
    }
}

#[async_trait]
impl Provider for JsDelivr {
    fn code(&self) -> &'static str {
        "jsdelivr"
    }

    fn site_url(&self) -> &'static str {
        SITE_URL
    }

    async fn list(&self) -> Result<Option<Vec<LibrarySummary>>, ProviderError> {
        // No bulk-listing endpoint upstream.
        Ok(None)
    }

    #[tracing::instrument(skip(self), fields(provider = "jsdelivr"))]
    async fn search(&self, pattern: &str) -> Result<Vec<LibrarySummary>, ProviderError> {
        let glob = GlobPattern::new(pattern)?;
        let params = format!(
            "query={}&page=0&hitsPerPage=1000&attributesToHighlight={}&attributesToRetrieve={}",
            urlencoding::encode(pattern),
            urlencoding::encode("[]"),
            urlencoding::encode(r#"["name","description","version"]"#),
        );
        let payload = serde_json::json!({ "params": params });

        let response = self
            .client
            .post(&self.search_url)
            .header("x-algolia-application-id", ALGOLIA_APP_ID)
            .header("x-algolia-api-key", ALGOLIA_API_KEY)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProviderError::network(&self.search_url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::http(
                &self.search_url,
                status.as_u16(),
                status.canonical_reason().unwrap_or("error"),
            ));
        }
        let results: AlgoliaSearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::network(&self.search_url, e))?;
        debug!(hits = results.hits.len(), "Algolia search returned");

        // The native search is full-text; re-filter through the glob so
        // anchoring still holds.
        Ok(results
            .hits
            .into_iter()
            .filter(|hit| glob.matches(&hit.name))
            .map(|hit| LibrarySummary {
                name: hit.name,
                description: hit.description,
                latest_version_hint: hit.version,
            })
            .collect())
    }

    #[tracing::instrument(skip(self), fields(provider = "jsdelivr"))]
    async fn find(&self, library: &str) -> Result<LibraryDetail, ProviderError> {
        validate_library_name(library, ScopedNames::Allowed)?;
        let metadata = self.lookup_metadata(library).await?;
        let versions = self.fetch_versions(library).await?;
        Ok(LibraryDetail {
            name: metadata.name,
            description: metadata.description,
            tags: metadata.keywords.unwrap_or_default(),
            site_url: metadata.homepage,
            info_url: Some(format!("{SITE_URL}package/npm/{library}")),
            license: metadata.license,
            versions,
        })
    }

    #[tracing::instrument(skip(self), fields(provider = "jsdelivr"))]
    async fn get(&self, library: &str, version: &str) -> Result<ResolvedRelease, ProviderError> {
        validate_library_name(library, ScopedNames::Allowed)?;
        validate_version(version)?;

        let url = format!("{}/package/npm/{library}@{version}/flat", self.api_url);
        let body = match get_text(&self.client, &url).await {
            Ok(body) => body,
            Err(err) if err.http_status() == Some(404) => {
                return Err(ProviderError::library_or_version_not_found(library, version));
            }
            Err(err) => return Err(err),
        };
        let flat: FlatFileList = serde_json::from_str(&body)
            .map_err(|e| ProviderError::unexpected_response(&url, e.to_string()))?;

        let files = flat
            .files
            .into_iter()
            .map(|entry| entry.name.trim_start_matches('/').to_string())
            .collect();

        let detail = self.find(library).await?;
        Ok(ResolvedRelease {
            name: library.to_string(),
            version: version.to_string(),
            description: detail.description,
            tags: detail.tags,
            site_url: detail.site_url,
            info_url: Some(format!("{SITE_URL}package/npm/{library}?version={version}")),
            license: detail.license,
            base_url: format!("{}/{library}@{version}/", self.cdn_url),
            files,
            dest_dir: Some(format!("{library}@{version}")),
            skip_pattern: None,
            default_entry_point: flat.default,
            npm_tarball_url: Some(npm_tarball_url(library, version)),
        })
    }
}

/// Builds the npm registry tarball URL for a release.
///
/// The tarball file name uses only the unscoped portion of the package
/// name, and any `/` in a scoped name is path-escaped.
pub(crate) fn npm_tarball_url(library: &str, version: &str) -> String {
    let basename = library.rsplit('/').next().unwrap_or(library);
    let escaped = library.replace('/', "%2F");
    format!("https://registry.npmjs.org/{escaped}/-/{basename}-{version}.tgz")
}
