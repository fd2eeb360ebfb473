//! UNPKG adapter - browse-page scraping plus recursive `?meta` listings.
//!
//! UNPKG has no bulk listing and no first-party search, so `search` goes
//! through the npms.io registry search and `find` scrapes the embedded
//! `window.__DATA__` JSON blob out of the package browse page for the
//! authoritative version list, with npms.io supplying descriptive fields.
//! `get` walks UNPKG's recursive directory-listing JSON, flattening it in
//! traversal order into leaf paths and `dir/` placeholders.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::http::{build_no_redirect_client, build_provider_client, get_text};
use super::jsdelivr::npm_tarball_url;
use super::validate::{
    GlobPattern, ScopedNames, compile_static_regex, validate_library_name, validate_version,
};
use super::{LibraryDetail, LibrarySummary, Provider, ProviderError, ResolvedRelease};

const DEFAULT_SITE_URL: &str = "https://unpkg.com/";
const DEFAULT_REGISTRY_API_URL: &str = "https://api.npms.io/v2";

/// The browse page embeds its state as a JSON blob in a script tag.
static BROWSE_DATA_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?s)<script>window\.__DATA__\s*=\s*(.*?)</script>"));

/// UNPKG answers 403 for `.DS_Store` files, so they must never be fetched.
static DS_STORE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(^|/)\.DS_Store$"));

// ==================== Upstream Response Types ====================

#[derive(Debug, Deserialize)]
struct NpmsSearchResponse {
    results: Vec<NpmsSearchResult>,
}

#[derive(Debug, Deserialize)]
struct NpmsSearchResult {
    package: NpmsPackage,
}

#[derive(Debug, Deserialize)]
struct NpmsPackageResponse {
    collected: NpmsCollected,
}

#[derive(Debug, Deserialize)]
struct NpmsCollected {
    metadata: NpmsPackage,
}

#[derive(Debug, Deserialize)]
struct NpmsPackage {
    name: String,
    description: Option<String>,
    version: Option<String>,
    keywords: Option<Vec<String>>,
    license: Option<String>,
    links: Option<NpmsLinks>,
}

#[derive(Debug, Deserialize)]
struct NpmsLinks {
    homepage: Option<String>,
    npm: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BrowseData {
    #[serde(rename = "availableVersions")]
    available_versions: Vec<String>,
}

/// One node of the recursive `?meta` directory listing.
#[derive(Debug, Deserialize)]
struct MetaNode {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    files: Vec<MetaNode>,
}

// ==================== Unpkg ====================

/// Adapter for UNPKG (<https://unpkg.com/>).
pub struct Unpkg {
    client: Client,
    no_redirect_client: Client,
    site_url: String,
    registry_api_url: String,
}

impl Unpkg {
    /// Creates the adapter against the production UNPKG endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::ClientBuild`] if HTTP client construction fails.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_urls(DEFAULT_SITE_URL, DEFAULT_REGISTRY_API_URL)
    }

    /// Creates the adapter with custom endpoints (for testing with
    /// wiremock). `site_url` must end in `/`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::ClientBuild`] if HTTP client construction fails.
    pub fn with_base_urls(
        site_url: impl Into<String>,
        registry_api_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_provider_client("unpkg")?,
            no_redirect_client: build_no_redirect_client("unpkg")?,
            site_url: site_url.into(),
            registry_api_url: registry_api_url.into(),
        })
    }

    /// Fetches descriptive package metadata from the npms.io registry API.
    async fn fetch_registry_metadata(&self, library: &str) -> Result<NpmsPackage, ProviderError> {
        let url = format!(
            "{}/package/{}",
            self.registry_api_url,
            urlencoding::encode(library)
        );
        let body = match get_text(&self.client, &url).await {
            Ok(body) => body,
            Err(err) if err.http_status() == Some(404) => {
                return Err(ProviderError::library_not_found(library));
            }
            Err(err) => return Err(err),
        };
        let response: NpmsPackageResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::unexpected_response(&url, e.to_string()))?;
        Ok(response.collected.metadata)
    }

    /// Scrapes the browse page for the embedded `availableVersions` list,
    /// oldest-first upstream, reversed here to newest-first.
    async fn scrape_available_versions(
        &self,
        library: &str,
    ) -> Result<Option<Vec<String>>, ProviderError> {
        let url = format!("{}browse/{library}/", self.site_url);
        let html = match get_text(&self.client, &url).await {
            Ok(html) => html,
            Err(err) if err.http_status() == Some(404) => {
                return Err(ProviderError::library_not_found(library));
            }
            Err(err) => return Err(err),
        };
        let Some(captures) = BROWSE_DATA_RE.captures(&html) else {
            debug!(library, "browse page carried no __DATA__ blob");
            return Ok(None);
        };
        let Some(blob) = captures.get(1) else {
            return Ok(None);
        };
        let data: BrowseData = serde_json::from_str(blob.as_str())
            .map_err(|e| ProviderError::unexpected_response(&url, e.to_string()))?;
        let mut versions = data.available_versions;
        versions.reverse();
        Ok(Some(versions))
    }
}

#[async_trait]
impl Provider for Unpkg {
    fn code(&self) -> &'static str {
        "unpkg"
    }

    fn site_url(&self) -> &'static str {
        DEFAULT_SITE_URL
    }

    async fn list(&self) -> Result<Option<Vec<LibrarySummary>>, ProviderError> {
        // No bulk-listing endpoint upstream.
        Ok(None)
    }

    #[tracing::instrument(skip(self), fields(provider = "unpkg"))]
    async fn search(&self, pattern: &str) -> Result<Vec<LibrarySummary>, ProviderError> {
        let glob = GlobPattern::new(pattern)?;
        let url = format!(
            "{}/search?q={}&size=250",
            self.registry_api_url,
            urlencoding::encode(pattern)
        );
        let body = get_text(&self.client, &url).await?;
        let response: NpmsSearchResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::unexpected_response(&url, e.to_string()))?;
        debug!(hits = response.results.len(), "npms.io search returned");

        Ok(response
            .results
            .into_iter()
            .map(|result| result.package)
            .filter(|package| glob.matches(&package.name))
            .map(|package| LibrarySummary {
                name: package.name,
                description: package.description,
                latest_version_hint: package.version,
            })
            .collect())
    }

    #[tracing::instrument(skip(self), fields(provider = "unpkg"))]
    async fn find(&self, library: &str) -> Result<LibraryDetail, ProviderError> {
        validate_library_name(library, ScopedNames::Allowed)?;
        let metadata = self.fetch_registry_metadata(library).await?;
        let versions = match self.scrape_available_versions(library).await? {
            Some(versions) if !versions.is_empty() => versions,
            _ => metadata.version.clone().into_iter().collect(),
        };
        let site_url = metadata
            .links
            .as_ref()
            .and_then(|links| links.homepage.clone().or_else(|| links.npm.clone()));
        Ok(LibraryDetail {
            name: metadata.name,
            description: metadata.description,
            tags: metadata.keywords.unwrap_or_default(),
            site_url,
            info_url: Some(format!("{}browse/{library}/", self.site_url)),
            license: metadata.license,
            versions,
        })
    }

    #[tracing::instrument(skip(self), fields(provider = "unpkg"))]
    async fn get(&self, library: &str, version: &str) -> Result<ResolvedRelease, ProviderError> {
        validate_library_name(library, ScopedNames::Allowed)?;
        validate_version(version)?;

        let detail = self.find(library).await?;

        let url = format!("{}{library}@{version}/?meta", self.site_url);
        let body = match get_text(&self.client, &url).await {
            Ok(body) => body,
            Err(err) if err.http_status() == Some(404) => {
                return Err(ProviderError::library_or_version_not_found(library, version));
            }
            Err(err) => return Err(err),
        };
        let root: MetaNode = serde_json::from_str(&body)
            .map_err(|e| ProviderError::unexpected_response(&url, e.to_string()))?;
        let files = flatten_meta_tree(&root);

        Ok(ResolvedRelease {
            name: library.to_string(),
            version: version.to_string(),
            description: detail.description,
            tags: detail.tags,
            site_url: detail.site_url,
            info_url: Some(format!("{}browse/{library}@{version}/", self.site_url)),
            license: detail.license,
            base_url: format!("{}{library}@{version}/", self.site_url),
            files,
            dest_dir: Some(format!("{library}@{version}")),
            skip_pattern: Some(DS_STORE_RE.clone()),
            default_entry_point: None,
            npm_tarball_url: Some(npm_tarball_url(library, version)),
        })
    }

    /// HEAD-based optimization: the canonical browse URL redirects to a
    /// versioned one, so the latest version can be read from the Location
    /// header without fetching any metadata. Falls back to the generic
    /// find-based path when no redirect is present; the generic path's
    /// answer is authoritative if they ever disagree.
    #[tracing::instrument(skip(self), fields(provider = "unpkg"))]
    async fn latest_version(&self, library: &str) -> Result<String, ProviderError> {
        validate_library_name(library, ScopedNames::Allowed)?;
        let url = format!("{}browse/{library}/", self.site_url);
        let response = self
            .no_redirect_client
            .head(&url)
            .send()
            .await
            .map_err(|e| ProviderError::network(&url, e))?;
        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(ProviderError::library_not_found(library));
        }
        if status.is_redirection() {
            if let Some(version) = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|location| parse_redirect_version(location, library))
            {
                return Ok(version);
            }
        }

        debug!(library, "no usable redirect; using find-based fallback");
        let detail = self.find(library).await?;
        detail.versions.first().cloned().ok_or_else(|| {
            ProviderError::unexpected_response(&url, format!("no versions reported for {library}"))
        })
    }
}

/// Flattens the recursive directory listing in traversal order:
/// directories become `path/` placeholders, files become leaf paths.
/// The root node itself produces no entry.
fn flatten_meta_tree(root: &MetaNode) -> Vec<String> {
    let mut entries = Vec::new();
    for child in &root.files {
        flatten_meta_node(child, &mut entries);
    }
    entries
}

fn flatten_meta_node(node: &MetaNode, entries: &mut Vec<String>) {
    let relative = node.path.trim_start_matches('/');
    if node.kind == "directory" {
        entries.push(format!("{relative}/"));
        for child in &node.files {
            flatten_meta_node(child, entries);
        }
    } else {
        entries.push(relative.to_string());
    }
}

/// Extracts the version tag from a `/browse/{library}@{version}/` redirect
/// target. Absolute URLs are reduced to their path first.
fn parse_redirect_version(location: &str, library: &str) -> Option<String> {
    let path = if location.starts_with('/') {
        location.to_string()
    } else {
        Url::parse(location).ok()?.path().to_string()
    };
    let marker = format!("/browse/{library}@");
    let (_, tail) = path.split_once(&marker)?;
    let version = tail.trim_end_matches('/');
    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn meta(path: &str, kind: &str, files: Vec<MetaNode>) -> MetaNode {
        MetaNode {
            path: path.to_string(),
            kind: kind.to_string(),
            files,
        }
    }

    #[test]
    fn test_flatten_preserves_traversal_order() {
        let root = meta(
            "/",
            "directory",
            vec![
                meta("/package.json", "file", Vec::new()),
                meta(
                    "/dist",
                    "directory",
                    vec![
                        meta("/dist/jquery.js", "file", Vec::new()),
                        meta("/dist/jquery.min.js", "file", Vec::new()),
                    ],
                ),
                meta("/README.md", "file", Vec::new()),
            ],
        );
        assert_eq!(
            flatten_meta_tree(&root),
            vec![
                "package.json",
                "dist/",
                "dist/jquery.js",
                "dist/jquery.min.js",
                "README.md",
            ]
        );
    }

    #[test]
    fn test_flatten_empty_directory_keeps_placeholder() {
        let root = meta(
            "/",
            "directory",
            vec![meta("/dist", "directory", Vec::new())],
        );
        assert_eq!(flatten_meta_tree(&root), vec!["dist/"]);
    }

    #[test]
    fn test_parse_redirect_version_relative_and_absolute() {
        assert_eq!(
            parse_redirect_version("/browse/jquery@3.6.0/", "jquery").unwrap(),
            "3.6.0"
        );
        assert_eq!(
            parse_redirect_version("https://unpkg.com/browse/jquery@3.6.0/", "jquery").unwrap(),
            "3.6.0"
        );
        assert!(parse_redirect_version("/browse/other@1.0.0/", "jquery").is_none());
    }

    #[test]
    fn test_ds_store_skip_pattern_matches_any_segment() {
        assert!(DS_STORE_RE.is_match(".DS_Store"));
        assert!(DS_STORE_RE.is_match("dist/.DS_Store"));
        assert!(!DS_STORE_RE.is_match("dist/DS_Store.txt"));
        assert!(!DS_STORE_RE.is_match("not.DS_Store.js"));
    }

    #[tokio::test]
    async fn test_list_is_unsupported() {
        let provider = Unpkg::new().unwrap();
        assert!(provider.list().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_rejects_invalid_name_before_network() {
        let provider =
            Unpkg::with_base_urls("http://127.0.0.1:1/", "http://127.0.0.1:1").unwrap();
        let err = provider.find("bad name!").await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidLibraryName { .. }));
    }

    #[tokio::test]
    async fn test_get_rejects_invalid_version_before_network() {
        let provider =
            Unpkg::with_base_urls("http://127.0.0.1:1/", "http://127.0.0.1:1").unwrap();
        let err = provider.get("jquery", "nope").await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidVersionNumber { .. }));
    }
}
