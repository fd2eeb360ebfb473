//! CDN provider adapters behind one common contract.
//!
//! Each adapter translates a different upstream surface (JSON API, search
//! index, or scraped HTML) into the normalized records from [`model`], so
//! the orchestrator and download engine never deal with provider-specific
//! shapes.
//!
//! # Architecture
//!
//! - [`Provider`] - Async trait the four adapters implement
//! - [`ProviderRegistry`] - Code-keyed, registration-ordered adapter table
//! - [`Cdnjs`] - CDNJS metadata API
//! - [`JsDelivr`] - jsDelivr data API plus the Algolia npm search index
//! - [`Unpkg`] - UNPKG browse pages and recursive `?meta` file listings
//! - [`GoogleCdn`] - Google Hosted Libraries documentation page scraping
//!
//! # Example
//!
//! ```no_run
//! use cdnget::provider::build_default_registry;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = build_default_registry();
//! let provider = registry.get("cdnjs").ok_or("no such CDN")?;
//! let detail = provider.find("jquery").await?;
//! println!("latest: {}", detail.versions[0]);
//! # Ok(())
//! # }
//! ```

mod cdnjs;
mod error;
mod google;
pub(crate) mod http;
mod jsdelivr;
mod model;
mod registry;
mod unpkg;
mod validate;
mod versions;

pub use cdnjs::Cdnjs;
pub use error::ProviderError;
pub use google::GoogleCdn;
pub use jsdelivr::JsDelivr;
pub use model::{LibraryDetail, LibrarySummary, ResolvedRelease};
pub use registry::{ProviderRegistry, build_default_registry};
pub use unpkg::Unpkg;
pub use validate::{GlobPattern, ScopedNames, validate_library_name, validate_version};
pub(crate) use validate::compile_static_regex;
pub use versions::sort_newest_first;

use async_trait::async_trait;

/// Common contract every CDN adapter implements.
///
/// Adapters own no persistent state; every call constructs fresh records.
/// Library names and versions are validated locally before any network
/// access, so invalid input never produces a request.
///
/// # Object Safety
///
/// This trait uses `async_trait` to support dynamic dispatch via
/// `Box<dyn Provider>`; native async traits are not object-safe.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable short identifier (e.g. `"cdnjs"`).
    fn code(&self) -> &'static str;

    /// Human home page of the CDN.
    fn site_url(&self) -> &'static str;

    /// Enumerates every library the provider can list without a query.
    ///
    /// Returns `Ok(None)` for providers whose backing APIs have no
    /// bulk-listing endpoint (jsDelivr, UNPKG). `None` is a signal, not an
    /// error, and is distinct from an empty listing.
    async fn list(&self) -> Result<Option<Vec<LibrarySummary>>, ProviderError>;

    /// Searches libraries by shell-glob pattern (`*` wildcard,
    /// case-insensitive, anchored on the full name).
    ///
    /// The default implementation fetches [`Provider::list`] and filters
    /// client-side; providers that cannot list override this with a native
    /// search call and re-filter through the same glob to honor anchoring.
    async fn search(&self, pattern: &str) -> Result<Vec<LibrarySummary>, ProviderError> {
        let glob = GlobPattern::new(pattern)?;
        let Some(libraries) = self.list().await? else {
            return Err(ProviderError::cannot_list(self.code()));
        };
        Ok(libraries
            .into_iter()
            .filter(|library| glob.matches(&library.name))
            .collect())
    }

    /// Looks up one library's metadata and full version list.
    async fn find(&self, library: &str) -> Result<LibraryDetail, ProviderError>;

    /// Resolves one exact version into a downloadable file manifest.
    async fn get(&self, library: &str, version: &str) -> Result<ResolvedRelease, ProviderError>;

    /// Returns the newest version of a library.
    ///
    /// The default implementation calls [`Provider::find`] and takes the
    /// first entry of the newest-first version list. UNPKG overrides this
    /// with a lighter HEAD-redirect lookup; both paths must agree.
    async fn latest_version(&self, library: &str) -> Result<String, ProviderError> {
        let detail = self.find(library).await?;
        detail.versions.first().cloned().ok_or_else(|| {
            ProviderError::unexpected_response(
                self.site_url(),
                format!("no versions reported for {library}"),
            )
        })
    }
}
