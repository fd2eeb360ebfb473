//! Provider registry: maps CDN codes to adapter instances.
//!
//! The registry is built once at startup and never mutated afterwards.
//! Registration order is the display order of the "list providers"
//! command, so it is deliberately not alphabetical.

use tracing::{debug, warn};

use super::{Cdnjs, GoogleCdn, JsDelivr, Provider, Unpkg};

/// A registration-ordered collection of CDN adapters.
pub struct ProviderRegistry {
    providers: Vec<Box<dyn Provider>>,
}

impl ProviderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Registers an adapter. Order of registration is preserved for display.
    pub fn register(&mut self, provider: Box<dyn Provider>) {
        debug!(code = provider.code(), "Registering provider");
        self.providers.push(provider);
    }

    /// Looks up an adapter by its provider code.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&dyn Provider> {
        self.providers
            .iter()
            .find(|provider| provider.code() == code)
            .map(AsRef::as_ref)
    }

    /// Iterates adapters in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Provider> {
        self.providers.iter().map(AsRef::as_ref)
    }

    /// Returns the number of registered adapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Returns true if no adapters are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let codes: Vec<&str> = self.providers.iter().map(|p| p.code()).collect();
        f.debug_struct("ProviderRegistry")
            .field("providers", &codes)
            .finish()
    }
}

/// Builds the default registry in the fixed display order:
/// cdnjs, jsdelivr, unpkg, google.
///
/// An adapter whose HTTP client cannot be constructed is skipped with a
/// warning rather than aborting the whole invocation.
#[must_use]
pub fn build_default_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();

    match Cdnjs::new() {
        Ok(provider) => registry.register(Box::new(provider)),
        Err(error) => warn!(%error, "CDNJS adapter unavailable"),
    }
    match JsDelivr::new() {
        Ok(provider) => registry.register(Box::new(provider)),
        Err(error) => warn!(%error, "jsDelivr adapter unavailable"),
    }
    match Unpkg::new() {
        Ok(provider) => registry.register(Box::new(provider)),
        Err(error) => warn!(%error, "UNPKG adapter unavailable"),
    }
    match GoogleCdn::new() {
        Ok(provider) => registry.register(Box::new(provider)),
        Err(error) => warn!(%error, "Google CDN adapter unavailable"),
    }

    registry
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_fixed_display_order() {
        let registry = build_default_registry();
        let codes: Vec<&str> = registry.iter().map(Provider::code).collect();
        assert_eq!(codes, vec!["cdnjs", "jsdelivr", "unpkg", "google"]);
    }

    #[test]
    fn test_get_returns_adapter_by_code() {
        let registry = build_default_registry();
        assert_eq!(registry.get("cdnjs").unwrap().code(), "cdnjs");
        assert_eq!(registry.get("google").unwrap().code(), "google");
    }

    #[test]
    fn test_get_unknown_code_returns_none() {
        let registry = build_default_registry();
        assert!(registry.get("blablabla").is_none());
    }

    #[test]
    fn test_debug_shows_provider_codes() {
        let registry = build_default_registry();
        let debug_str = format!("{registry:?}");
        assert!(debug_str.contains("cdnjs"), "missing code in: {debug_str}");
    }

    #[test]
    fn test_empty_registry() {
        let registry = ProviderRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }
}
