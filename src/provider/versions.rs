//! Version ordering for providers whose APIs return versions unordered.
//!
//! CDNJS returns one asset object per version with no guaranteed order, so
//! the adapter sorts them itself: lexicographically first, then a stable
//! sort by dot-separated numeric components, then reversed for newest-first.
//! Non-numeric components (e.g. the `0-beta` in `7.0.0-beta.33`) compare
//! as zero; the resulting ordering for pre-releases is pinned by the tests
//! below rather than derived from semver.

/// Sorts version strings newest-first by component-wise numeric comparison.
#[must_use]
pub fn sort_newest_first(mut versions: Vec<String>) -> Vec<String> {
    versions.sort();
    // Stable sort: ties on the numeric key keep the lexicographic order.
    versions.sort_by_key(|version| numeric_key(version));
    versions.reverse();
    versions
}

/// Splits a version into dot-separated components parsed as integers,
/// with unparsable components counting as zero.
fn numeric_key(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|component| component.parse::<u64>().unwrap_or(0))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sorted(input: &[&str]) -> Vec<String> {
        sort_newest_first(input.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn test_numeric_components_beat_lexicographic_order() {
        assert_eq!(
            sorted(&["1.9.1", "1.10.0", "1.2.3", "2.0.0"]),
            vec!["2.0.0", "1.10.0", "1.9.1", "1.2.3"]
        );
    }

    #[test]
    fn test_newest_version_comes_first() {
        let versions = sorted(&["2.2.0", "2.2.4", "1.12.4"]);
        assert_eq!(versions.first().unwrap(), "2.2.4");
    }

    #[test]
    fn test_strictly_descending_by_component() {
        let versions = sorted(&["3.0.0", "2.2.4", "2.2.0", "2.10.1", "2.2.1"]);
        for pair in versions.windows(2) {
            assert!(
                numeric_key(&pair[0]) >= numeric_key(&pair[1]),
                "{} should not sort below {}",
                pair[0],
                pair[1]
            );
        }
    }

    // Pins the component-comparison behavior for pre-release suffixes:
    // "7.0.0-beta.33" splits into [7, 0, 0("0-beta"→0), 33], which is a
    // longer key than "7.0.0" and therefore sorts above the plain release.
    #[test]
    fn test_prerelease_suffix_component_behavior_is_pinned() {
        assert_eq!(
            sorted(&["7.0.0", "7.0.0-beta.33", "6.9.0"]),
            vec!["7.0.0-beta.33", "7.0.0", "6.9.0"]
        );
    }

    #[test]
    fn test_unparsable_component_counts_as_zero() {
        assert_eq!(numeric_key("7.0.0-beta.33"), vec![7, 0, 0, 33]);
        assert_eq!(numeric_key("1.x.2"), vec![1, 0, 2]);
    }

    #[test]
    fn test_empty_input_stays_empty() {
        assert!(sorted(&[]).is_empty());
    }
}
