//! Property-based tests for orgaplex
//!
//! - Natural ordering invariants
//! - Completeness arithmetic
//! - Loader acceptance of well-formed series
//! - Run with ProptestConfig::with_cases(100)

use orgaplex::aggregate::CompletenessReport;
use orgaplex::measurement::{MeasurementLoader, Quantity};
use orgaplex::report::CollectingReporter;
use orgaplex::sorting::{natural_cmp, sorted_natural};
use orgaplex::AnalysisConfig;
use proptest::prelude::*;
use std::cmp::Ordering;
use std::path::Path;

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Identifiers shaped like specimen names: letters, digits, underscores
fn arb_identifier() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,12}"
}

/// Prefix plus a number, optionally zero padded
fn arb_numbered() -> impl Strategy<Value = (String, u32)> {
    ("[a-z]{1,5}", 0u32..100_000)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: sorting twice gives the same order
    #[test]
    fn prop_natural_sort_idempotent(items in prop::collection::vec(arb_identifier(), 0..30)) {
        let once = sorted_natural(items.iter().cloned());
        let twice = sorted_natural(once.iter().cloned());
        prop_assert_eq!(once, twice);
    }

    /// Property: sorting is a permutation of the input
    #[test]
    fn prop_natural_sort_is_permutation(items in prop::collection::vec(arb_identifier(), 0..30)) {
        let mut sorted = sorted_natural(items.iter().cloned());
        let mut original = items;
        sorted.sort();
        original.sort();
        prop_assert_eq!(sorted, original);
    }

    /// Property: numeric suffixes compare by value
    #[test]
    fn prop_numbers_compare_by_value((prefix, a) in arb_numbered(), b in 0u32..100_000) {
        let left = format!("{prefix}{a}");
        let right = format!("{prefix}{b}");
        prop_assert_eq!(natural_cmp(&left, &right), a.cmp(&b));
    }

    /// Property: comparison is antisymmetric
    #[test]
    fn prop_natural_cmp_antisymmetric(a in arb_identifier(), b in arb_identifier()) {
        prop_assert_eq!(natural_cmp(&a, &b), natural_cmp(&b, &a).reverse());
    }

    /// Property: missing percentage stays within [0, 100]
    #[test]
    fn prop_missing_percent_bounded(total in 0usize..10_000, missing_frac in 0.0f64..=1.0) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let missing = (total as f64 * missing_frac) as usize;
        let report = CompletenessReport::new(missing, total);
        let percent = report.missing_percent();
        prop_assert!((0.0..=100.0).contains(&percent));
        prop_assert_eq!(report.is_complete(), missing == 0);
    }

    /// Property: loaded series preserves every finite value and its mean
    #[test]
    fn prop_loader_keeps_finite_values(values in prop::collection::vec(-500.0f64..500.0, 1..50)) {
        let mut contents = String::from("h1\nh2\nh3\nh4\n");
        for v in &values {
            contents.push_str(&format!("{v},um\n"));
        }
        let config = AnalysisConfig::default();
        let series = MeasurementLoader::new(&config)
            .parse(&contents, Quantity::Distance, Path::new("prop.csv"), &CollectingReporter::new())
            .unwrap();

        prop_assert_eq!(series.values(), values.as_slice());
        #[allow(clippy::cast_precision_loss)]
        let expected = values.iter().sum::<f64>() / values.len() as f64;
        prop_assert!((series.mean() - expected).abs() < 1e-9);
    }
}

#[test]
fn test_equal_keys_keep_input_order() {
    assert_eq!(natural_cmp("c01", "c1"), Ordering::Equal);
    assert_eq!(sorted_natural(["c1", "c01"]), vec!["c1", "c01"]);
    assert_eq!(sorted_natural(["c01", "c1"]), vec!["c01", "c1"]);
}
