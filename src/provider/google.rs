//! Google Hosted Libraries adapter - scrapes the single static
//! documentation page.
//!
//! Google publishes no JSON API, so both `list` and `find` work off the
//! same HTML: `list` regex-matches CDN asset URLs across the whole page,
//! while `find` locates the `<h3>…</h3><dl>…</dl>` fragment for one
//! library and extracts its snippet URLs, site link, and comma-separated
//! version lists. The exact regexes are pinned by fixture tests.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::debug;

use super::http::{build_provider_client, get_text};
use super::validate::{ScopedNames, compile_static_regex, validate_library_name, validate_version};
use super::{LibraryDetail, LibrarySummary, Provider, ProviderError, ResolvedRelease};

const DEFAULT_SITE_URL: &str = "https://developers.google.com/speed/libraries/";
const CDN_URL: &str = "https://ajax.googleapis.com/ajax/libs";

static ASSET_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(&format!(
        r#"{}/([^/]+)/([^/]+)/([^"]+)"#,
        regex::escape(CDN_URL)
    ))
});

static LIBRARY_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?s)<h3\b.*?>.*?</h3>\s*<dl>(.*?)</dl>"));

static SNIPPET_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?s)<dt>.*?snippet:</dt>\s*<dd>(.*?)</dd>"));

static SRC_HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"\b(?:src|href)="([^"]*?)""#));

static SITE_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?s)<dt>site:</dt>\s*<dd>(.*?)</dd>"));

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r#"href="([^"]+)""#));

static VERSIONS_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r"(?s)<dt>(?:stable |unstable )?versions:</dt>\s*<dd\b.*?>(.*?)</dd>")
});

/// What the documentation page says about one library.
struct ScrapedLibrary {
    site_url: Option<String>,
    versions: Vec<String>,
    url_hints: Vec<String>,
}

/// Adapter for Google Hosted Libraries
/// (<https://developers.google.com/speed/libraries/>).
pub struct GoogleCdn {
    client: Client,
    site_url: String,
}

impl GoogleCdn {
    /// Creates the adapter against the production documentation page.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::ClientBuild`] if HTTP client construction fails.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_site_url(DEFAULT_SITE_URL)
    }

    /// Creates the adapter scraping a custom page URL (for testing with
    /// wiremock fixture HTML).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::ClientBuild`] if HTTP client construction fails.
    pub fn with_site_url(site_url: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_provider_client("google")?,
            site_url: site_url.into(),
        })
    }

    async fn fetch_page(&self) -> Result<String, ProviderError> {
        get_text(&self.client, &self.site_url).await
    }

    /// Locates the documentation fragment for one library and extracts its
    /// parts. Returns `None` when no fragment mentions the library's CDN
    /// directory.
    fn scrape_library(html: &str, library: &str) -> Option<ScrapedLibrary> {
        let needle = format!("{CDN_URL}/{library}/");
        for block in LIBRARY_BLOCK_RE.captures_iter(html) {
            let text = block.get(1)?.as_str();
            if !text.contains(&needle) {
                continue;
            }

            let url_hints = SNIPPET_RE
                .captures(text)
                .and_then(|m| m.get(1))
                .map(|snippet| {
                    SRC_HREF_RE
                        .captures_iter(snippet.as_str())
                        .filter_map(|m| m.get(1).map(|href| href.as_str().to_string()))
                        .collect()
                })
                .unwrap_or_default();

            let site_url = SITE_LINK_RE
                .captures(text)
                .and_then(|m| m.get(1))
                .and_then(|dd| HREF_RE.captures(dd.as_str()))
                .and_then(|m| m.get(1))
                .map(|href| href.as_str().to_string());

            let mut versions = Vec::new();
            for m in VERSIONS_RE.captures_iter(text) {
                if let Some(dd) = m.get(1) {
                    versions.extend(
                        dd.as_str()
                            .split(',')
                            .map(str::trim)
                            .filter(|v| !v.is_empty())
                            .map(ToString::to_string),
                    );
                }
            }

            return Some(ScrapedLibrary {
                site_url,
                versions,
                url_hints,
            });
        }
        None
    }
}

#[async_trait]
impl Provider for GoogleCdn {
    fn code(&self) -> &'static str {
        "google"
    }

    fn site_url(&self) -> &'static str {
        DEFAULT_SITE_URL
    }

    #[tracing::instrument(skip(self), fields(provider = "google"))]
    async fn list(&self) -> Result<Option<Vec<LibrarySummary>>, ProviderError> {
        let html = self.fetch_page().await?;
        let mut libraries: Vec<LibrarySummary> = ASSET_URL_RE
            .captures_iter(&html)
            .filter_map(|m| {
                let name = m.get(1)?.as_str();
                let version = m.get(2)?.as_str();
                Some(LibrarySummary::new(
                    name,
                    Some(format!("latest version: {version}")),
                ))
            })
            .collect();
        debug!(count = libraries.len(), "scraped asset URLs");
        libraries.sort_by(|a, b| a.name.cmp(&b.name));
        libraries.dedup();
        Ok(Some(libraries))
    }

    #[tracing::instrument(skip(self), fields(provider = "google"))]
    async fn find(&self, library: &str) -> Result<LibraryDetail, ProviderError> {
        validate_library_name(library, ScopedNames::Rejected)?;
        let html = self.fetch_page().await?;
        let scraped = Self::scrape_library(&html, library)
            .ok_or_else(|| ProviderError::library_not_found(library))?;
        Ok(LibraryDetail {
            name: library.to_string(),
            description: None,
            tags: Vec::new(),
            site_url: scraped.site_url,
            info_url: Some(format!("{DEFAULT_SITE_URL}#{library}")),
            license: None,
            versions: scraped.versions,
        })
    }

    #[tracing::instrument(skip(self), fields(provider = "google"))]
    async fn get(&self, library: &str, version: &str) -> Result<ResolvedRelease, ProviderError> {
        validate_library_name(library, ScopedNames::Rejected)?;
        validate_version(version)?;
        let html = self.fetch_page().await?;
        let scraped = Self::scrape_library(&html, library)
            .ok_or_else(|| ProviderError::library_not_found(library))?;
        if !scraped.versions.iter().any(|v| v == version) {
            return Err(ProviderError::version_not_found(library, version));
        }

        // The page only shows the latest release's URLs; rewrite their
        // version segment to the requested one.
        let version_segment_re =
            Regex::new(&format!(r"(/libs/{})/[^/]+", regex::escape(library)))
                .map_err(|e| ProviderError::unexpected_response(&self.site_url, e.to_string()))?;
        let base_url = format!("{CDN_URL}/{library}/{version}/");
        let files: Vec<String> = scraped
            .url_hints
            .iter()
            .map(|hint| {
                version_segment_re
                    .replace(hint, format!("${{1}}/{version}"))
                    .into_owned()
            })
            .filter_map(|rewritten| {
                rewritten
                    .strip_prefix(base_url.as_str())
                    .map(ToString::to_string)
            })
            .collect();

        Ok(ResolvedRelease {
            name: library.to_string(),
            version: version.to_string(),
            description: None,
            tags: Vec::new(),
            site_url: scraped.site_url,
            info_url: Some(format!("{DEFAULT_SITE_URL}#{library}")),
            license: None,
            base_url,
            files,
            dest_dir: None,
            skip_pattern: None,
            default_entry_point: None,
            npm_tarball_url: None,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Minimal fragment in the documentation page's structure; pins the
    /// exact HTML shapes the scraping regexes expect.
    const FIXTURE_HTML: &str = r#"
<h3 id="jquery">jQuery</h3>
<dl>
  <dt>snippet:</dt>
  <dd>
    &lt;script src="https://ajax.googleapis.com/ajax/libs/jquery/3.6.0/jquery.min.js"&gt;&lt;/script&gt;
  </dd>
  <dt>site:</dt>
  <dd><a href="http://jquery.com/">http://jquery.com/</a></dd>
  <dt>stable versions:</dt>
  <dd class="versions">3.6.0, 3.5.1, 2.2.4, 1.12.4</dd>
</dl>
<h3 id="mootools">MooTools</h3>
<dl>
  <dt>snippet:</dt>
  <dd>
    &lt;script src="https://ajax.googleapis.com/ajax/libs/mootools/1.6.0/mootools.min.js"&gt;&lt;/script&gt;
  </dd>
  <dt>versions:</dt>
  <dd class="versions">1.6.0, 1.5.2</dd>
</dl>
"#;

    #[test]
    fn test_scrape_library_extracts_site_versions_and_hints() {
        let scraped = GoogleCdn::scrape_library(FIXTURE_HTML, "jquery").unwrap();
        assert_eq!(scraped.site_url.unwrap(), "http://jquery.com/");
        assert_eq!(
            scraped.versions,
            vec!["3.6.0", "3.5.1", "2.2.4", "1.12.4"]
        );
        assert_eq!(
            scraped.url_hints,
            vec!["https://ajax.googleapis.com/ajax/libs/jquery/3.6.0/jquery.min.js"]
        );
    }

    #[test]
    fn test_scrape_library_without_site_link() {
        let scraped = GoogleCdn::scrape_library(FIXTURE_HTML, "mootools").unwrap();
        assert!(scraped.site_url.is_none());
        assert_eq!(scraped.versions, vec!["1.6.0", "1.5.2"]);
    }

    #[test]
    fn test_scrape_library_unknown_name_is_none() {
        assert!(GoogleCdn::scrape_library(FIXTURE_HTML, "prototype").is_none());
    }

    #[test]
    fn test_asset_url_regex_captures_name_and_version() {
        let caps = ASSET_URL_RE
            .captures(r#"src="https://ajax.googleapis.com/ajax/libs/jquery/3.6.0/jquery.min.js""#)
            .unwrap();
        assert_eq!(&caps[1], "jquery");
        assert_eq!(&caps[2], "3.6.0");
    }

    #[tokio::test]
    async fn test_find_rejects_invalid_name_before_network() {
        let provider = GoogleCdn::with_site_url("http://127.0.0.1:1/").unwrap();
        let err = provider.find("bad name!").await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidLibraryName { .. }));
    }

    #[tokio::test]
    async fn test_scoped_names_are_rejected() {
        let provider = GoogleCdn::with_site_url("http://127.0.0.1:1/").unwrap();
        let err = provider.find("@angular/core").await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidLibraryName { .. }));
    }
}
