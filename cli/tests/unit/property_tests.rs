//! Property-based tests for identifier normalization and config validation.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use proptest::prelude::*;
use regex::Regex;

use capsule_cli::domain::identity::{FALLBACK_IDENTIFIER, MAX_IDENTIFIER_LEN};
use capsule_cli::domain::{normalize, validate_config_key, validate_config_value};

fn identifier_pattern() -> Regex {
    Regex::new(r"^[A-Za-z0-9._-]{1,100}$").expect("valid regex")
}

// ============================================================================
// normalize() property tests
// ============================================================================

proptest! {
    /// Any input yields a non-empty identifier in the allowed alphabet.
    #[test]
    fn prop_normalize_output_is_safe(input in any::<String>()) {
        let id = normalize(&input);
        prop_assert!(identifier_pattern().is_match(id.as_str()), "bad identifier: {:?}", id);
    }

    /// Identifiers never start or end with a hyphen and never collapse to a
    /// relative path component.
    #[test]
    fn prop_normalize_has_no_edge_hyphens(input in "[ -~]{0,300}") {
        let id = normalize(&input);
        let s = id.as_str();
        prop_assert!(!s.starts_with('-'), "leading hyphen: {}", s);
        prop_assert!(!s.ends_with('-'), "trailing hyphen: {}", s);
        prop_assert!(!s.contains("--"), "double hyphen: {}", s);
        prop_assert!(s != "." && s != "..", "dot identifier: {}", s);
    }

    /// Length is bounded by the maximum.
    #[test]
    fn prop_normalize_is_bounded(input in "[a-z/]{0,400}") {
        prop_assert!(normalize(&input).as_str().len() <= MAX_IDENTIFIER_LEN);
    }

    /// Normalizing is deterministic.
    #[test]
    fn prop_normalize_is_deterministic(input in any::<String>()) {
        prop_assert_eq!(normalize(&input), normalize(&input));
    }

    /// The common remote URL spellings of one repository agree.
    #[test]
    fn prop_remote_forms_agree(
        host in "[a-z]{1,10}\\.(com|org|io)",
        owner in "[a-z][a-z0-9]{0,12}",
        repo in "[a-z][a-z0-9_]{0,12}",
    ) {
        let https = normalize(&format!("https://{host}/{owner}/{repo}.git"));
        let scp = normalize(&format!("git@{host}:{owner}/{repo}.git"));
        let ssh = normalize(&format!("ssh://git@{host}/{owner}/{repo}.git"));
        let bare = normalize(&format!("https://{host}/{owner}/{repo}"));
        let expected = format!("{host}-{owner}-{repo}");
        prop_assert_eq!(https.as_str(), expected.as_str());
        prop_assert_eq!(scp.as_str(), expected.as_str());
        prop_assert_eq!(ssh.as_str(), expected.as_str());
        prop_assert_eq!(bare.as_str(), expected.as_str());
    }

    /// Only keys from the whitelist validate.
    #[test]
    fn prop_unknown_config_keys_rejected(key in "[a-z]{1,8}\\.[a-z]{1,8}") {
        let known = [
            "volume.path",
            "volume.size_gb",
            "container.shell",
            "container.stop_timeout",
        ];
        prop_assume!(!known.contains(&key.as_str()));
        prop_assert!(validate_config_key(&key).is_err());
    }

    /// Volume sizes validate exactly inside 1..=100.
    #[test]
    fn prop_volume_size_range(size in 0u32..1000) {
        let ok = validate_config_value("volume.size_gb", &size.to_string()).is_ok();
        prop_assert_eq!(ok, (1..=100).contains(&size));
    }
}

#[test]
fn test_long_path_truncates_to_exact_max() {
    let input = format!("/{}", "a".repeat(MAX_IDENTIFIER_LEN * 2));
    assert_eq!(normalize(&input).as_str().len(), MAX_IDENTIFIER_LEN);
}

#[test]
fn test_unusable_input_falls_back() {
    for input in ["", "   ", "@@@", "...", "/"] {
        assert_eq!(normalize(input).as_str(), FALLBACK_IDENTIFIER, "input {input:?}");
    }
}
