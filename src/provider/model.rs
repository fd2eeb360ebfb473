//! Normalized records produced by CDN provider adapters.
//!
//! Every adapter translates its upstream API (or scraped HTML) into these
//! shapes, so the orchestrator and the download engine never see
//! provider-specific structure.

use regex::Regex;

/// One library as it appears in a listing or search result.
///
/// Used only for human display; `name` is the identity within a provider's
/// namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrarySummary {
    /// Library name, unique within the provider.
    pub name: String,
    /// Short description, when the provider supplies one.
    pub description: Option<String>,
    /// Latest version, when the listing happens to carry it.
    pub latest_version_hint: Option<String>,
}

impl LibrarySummary {
    /// Creates a summary with just a name and optional description.
    #[must_use]
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            latest_version_hint: None,
        }
    }
}

/// Full metadata for one library, as returned by `find`.
///
/// `versions` is newest-first in the provider's own ordering and is never
/// re-sorted downstream. It is non-empty whenever the library exists;
/// "library not found" is always an error, never an empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryDetail {
    /// Library name.
    pub name: String,
    /// Short description.
    pub description: Option<String>,
    /// Keyword tags, in provider order.
    pub tags: Vec<String>,
    /// The library's own home page.
    pub site_url: Option<String>,
    /// Provider-specific documentation/browse link.
    pub info_url: Option<String>,
    /// License identifier.
    pub license: Option<String>,
    /// Known versions, newest first.
    pub versions: Vec<String>,
}

/// One resolved library version with its downloadable file manifest,
/// as returned by `get`.
///
/// `base_url` always ends in `/` and file URLs are formed by plain string
/// concatenation of `base_url` and a manifest entry. Every entry in `files`
/// is either a plain relative path (a leaf file to fetch) or a path ending
/// in `/` (a directory placeholder to create without fetching).
#[derive(Debug, Clone)]
pub struct ResolvedRelease {
    /// Library name.
    pub name: String,
    /// The exact resolved version.
    pub version: String,
    /// Short description.
    pub description: Option<String>,
    /// Keyword tags, in provider order.
    pub tags: Vec<String>,
    /// The library's own home page.
    pub site_url: Option<String>,
    /// Provider-specific documentation/browse link for this version.
    pub info_url: Option<String>,
    /// License identifier.
    pub license: Option<String>,
    /// Common URL prefix all files are joined to. Ends in `/`.
    pub base_url: String,
    /// Relative file paths and `dir/` placeholders, in provider order.
    pub files: Vec<String>,
    /// Local subdirectory override; defaults to `{name}/{version}` when absent.
    pub dest_dir: Option<String>,
    /// Entries matching this pattern are never fetched (e.g. `.DS_Store`).
    pub skip_pattern: Option<Regex>,
    /// Informational default entry point (e.g. `/dist/foo.min.js`).
    pub default_entry_point: Option<String>,
    /// npm registry tarball for the release, when the provider is npm-backed.
    pub npm_tarball_url: Option<String>,
}

impl ResolvedRelease {
    /// Returns the local subdirectory name files are written under.
    #[must_use]
    pub fn dest_dir_or_default(&self) -> String {
        self.dest_dir
            .clone()
            .unwrap_or_else(|| format!("{}/{}", self.name, self.version))
    }

    /// Returns the full download URLs for the leaf files in manifest order.
    ///
    /// Directory placeholders have no URL and are excluded.
    #[must_use]
    pub fn file_urls(&self) -> Vec<String> {
        self.files
            .iter()
            .filter(|entry| !entry.ends_with('/'))
            .map(|entry| format!("{}{entry}", self.base_url))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn release_with_files(files: &[&str]) -> ResolvedRelease {
        ResolvedRelease {
            name: "jquery".to_string(),
            version: "2.2.0".to_string(),
            description: None,
            tags: Vec::new(),
            site_url: None,
            info_url: None,
            license: None,
            base_url: "https://cdnjs.cloudflare.com/ajax/libs/jquery/2.2.0/".to_string(),
            files: files.iter().map(ToString::to_string).collect(),
            dest_dir: None,
            skip_pattern: None,
            default_entry_point: None,
            npm_tarball_url: None,
        }
    }

    #[test]
    fn test_dest_dir_defaults_to_name_slash_version() {
        let release = release_with_files(&[]);
        assert_eq!(release.dest_dir_or_default(), "jquery/2.2.0");
    }

    #[test]
    fn test_dest_dir_override_wins() {
        let mut release = release_with_files(&[]);
        release.dest_dir = Some("jquery@2.2.0".to_string());
        assert_eq!(release.dest_dir_or_default(), "jquery@2.2.0");
    }

    #[test]
    fn test_file_urls_concatenate_and_skip_directories() {
        let release = release_with_files(&["jquery.js", "dist/", "dist/jquery.min.js"]);
        assert_eq!(
            release.file_urls(),
            vec![
                "https://cdnjs.cloudflare.com/ajax/libs/jquery/2.2.0/jquery.js".to_string(),
                "https://cdnjs.cloudflare.com/ajax/libs/jquery/2.2.0/dist/jquery.min.js"
                    .to_string(),
            ]
        );
    }
}
