//! Local validation grammars and the shell-glob search matcher.
//!
//! Validation always happens before any network call: a syntactically
//! invalid library name or version fails fast without touching the
//! transport.

use std::sync::LazyLock;

use regex::Regex;

use super::error::ProviderError;

/// Compiles a regex at static init; panics on invalid pattern.
pub(crate) fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

static LIBRARY_NAME_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"^[-.\w]+$"));

static SCOPED_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"^@[-.\w]+/[-.\w]+$"));

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"^\d+(\.\d+)+([-.\w]+)?$"));

/// Whether a provider accepts npm-style `@scope/name` library names.
///
/// jsDelivr and UNPKG accept the scoped form; CDNJS and Google reject it
/// outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopedNames {
    /// `@scope/name` is a valid library name.
    Allowed,
    /// Only plain `[-.\w]+` names are valid.
    Rejected,
}

/// Validates a library name against the provider's accepted grammar.
///
/// # Errors
///
/// Returns [`ProviderError::InvalidLibraryName`] when the name does not
/// match `[-.\w]+` (or the scoped form, where allowed).
pub fn validate_library_name(library: &str, scoped: ScopedNames) -> Result<(), ProviderError> {
    if LIBRARY_NAME_RE.is_match(library) {
        return Ok(());
    }
    if scoped == ScopedNames::Allowed && SCOPED_NAME_RE.is_match(library) {
        return Ok(());
    }
    Err(ProviderError::invalid_library_name(library))
}

/// Validates a literal version number (`\d+(\.\d+)+` with an optional
/// `[-.\w]+` pre-release/build suffix).
///
/// # Errors
///
/// Returns [`ProviderError::InvalidVersionNumber`] on mismatch.
pub fn validate_version(version: &str) -> Result<(), ProviderError> {
    if VERSION_RE.is_match(version) {
        return Ok(());
    }
    Err(ProviderError::invalid_version_number(version))
}

/// A compiled shell-glob search pattern.
///
/// `*` matches any run of characters; everything else is literal. Matching
/// is case-insensitive and anchored on the full library name, so `jquery*`
/// matches `jqueryui` but not `require-jquery`.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    regex: Regex,
}

impl GlobPattern {
    /// Compiles a glob pattern into an anchored, case-insensitive matcher.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidSearchPattern`] when the compiled
    /// expression is rejected (e.g. pattern far beyond the regex size limit).
    pub fn new(pattern: &str) -> Result<Self, ProviderError> {
        let escaped = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex = Regex::new(&format!("(?i)^{escaped}$")).map_err(|_| {
            ProviderError::InvalidSearchPattern {
                pattern: pattern.to_string(),
            }
        })?;
        Ok(Self { regex })
    }

    /// Returns true when `name` matches the pattern in full.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_library_name_accepts_plain_names() {
        for name in ["jquery", "ember.js", "angular_material", "ext-core", "x"] {
            assert!(
                validate_library_name(name, ScopedNames::Rejected).is_ok(),
                "should accept {name}"
            );
        }
    }

    #[test]
    fn test_validate_library_name_rejects_garbage() {
        for name in ["", "foo bar", "foo/bar", "jquery;rm -rf", "a*b"] {
            assert!(
                validate_library_name(name, ScopedNames::Allowed).is_err(),
                "should reject {name}"
            );
        }
    }

    #[test]
    fn test_validate_library_name_scoped_form() {
        assert!(validate_library_name("@angular/core", ScopedNames::Allowed).is_ok());
        assert!(validate_library_name("@angular/core", ScopedNames::Rejected).is_err());
        // One segment only, or a trailing segment, is not a scoped name.
        assert!(validate_library_name("@angular", ScopedNames::Allowed).is_err());
        assert!(validate_library_name("@a/b/c", ScopedNames::Allowed).is_err());
    }

    #[test]
    fn test_validate_version_accepts_release_forms() {
        for version in ["1.0", "2.2.4", "10.0.1", "7.0.0-beta.33", "1.2.3rc1"] {
            assert!(validate_version(version).is_ok(), "should accept {version}");
        }
    }

    #[test]
    fn test_validate_version_rejects_non_versions() {
        for version in ["", "latest", "1", "v2.2.4", "1.2.4 ", "..", "1.2/3"] {
            assert!(validate_version(version).is_err(), "should reject {version}");
        }
    }

    #[test]
    fn test_glob_prefix_is_anchored() {
        let glob = GlobPattern::new("jquery*").unwrap();
        assert!(glob.matches("jquery"));
        assert!(glob.matches("jqueryui"));
        assert!(!glob.matches("require-jquery"));
    }

    #[test]
    fn test_glob_suffix_is_anchored() {
        let glob = GlobPattern::new("*jquery").unwrap();
        assert!(glob.matches("jquery"));
        assert!(glob.matches("require-jquery"));
        assert!(!glob.matches("jqueryui"));
    }

    #[test]
    fn test_glob_substring_matches_all() {
        let glob = GlobPattern::new("*jquery*").unwrap();
        for name in ["jquery", "jqueryui", "require-jquery"] {
            assert!(glob.matches(name), "should match {name}");
        }
    }

    #[test]
    fn test_glob_is_case_insensitive() {
        let glob = GlobPattern::new("JQuery*").unwrap();
        assert!(glob.matches("jqueryui"));
    }

    #[test]
    fn test_glob_without_wildcard_is_exact_match() {
        let glob = GlobPattern::new("jquery").unwrap();
        assert!(glob.matches("jquery"));
        assert!(glob.matches("JQUERY"));
        assert!(!glob.matches("jqueryui"));
    }

    #[test]
    fn test_glob_escapes_regex_metacharacters() {
        let glob = GlobPattern::new("ember.js").unwrap();
        assert!(glob.matches("ember.js"));
        assert!(!glob.matches("emberXjs"));
    }
}
