// Property-based tests for registry, resolver and join invariants.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::{BTreeSet, HashMap};

use proptest::prelude::*;
use worldmix_recon::{common_codes, CodeResolver, EdgeCaseOverlay, NameMatcher, Registry};

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Distinct (code, long name) pairs; codes are three uppercase letters, never XXX.
fn arb_registry_rows() -> impl Strategy<Value = Vec<(String, String, String)>> {
    prop::collection::btree_map("[A-W]{3}", "[A-Z][a-z]{3,12}( [A-Z][a-z]{2,8})?", 1..25).prop_map(
        |by_code| {
            let mut seen = BTreeSet::new();
            by_code
                .into_iter()
                .filter(|(_, name)| seen.insert(name.clone()))
                .enumerate()
                .map(|(i, (code, name))| {
                    let region = if i % 4 == 0 { "" } else { "Sub-Saharan Africa" };
                    (code, name, region.to_string())
                })
                .collect()
        },
    )
}

fn arb_codes() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[A-E]{2}", 0..30)
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn registry_lookups_round_trip(rows in arb_registry_rows()) {
        let registry = Registry::from_rows(rows.clone()).unwrap();
        prop_assert_eq!(registry.len(), rows.len());

        for (code, name, region) in &rows {
            let by_code = registry.lookup_by_code(code).unwrap();
            prop_assert_eq!(&by_code.long_name, name);
            prop_assert_eq!(&by_code.region, region);

            let by_name = registry.lookup_by_name(name).unwrap();
            prop_assert_eq!(&by_name.code, code);
        }

        let codes: Vec<&str> = rows.iter().map(|(c, _, _)| c.as_str()).collect();
        prop_assert_eq!(registry.all_codes(), codes);
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn resolver_is_deterministic(
        rows in arb_registry_rows(),
        names in prop::collection::vec("[A-Za-z ]{0,16}", 1..20),
    ) {
        let registry = Registry::from_rows(rows).unwrap();
        let overlay = EdgeCaseOverlay::default();
        let resolver = CodeResolver::new(&registry, &overlay, NameMatcher::default());

        let first = resolver.resolve_all(names.iter().map(String::as_str), false);
        let second = resolver.resolve_all(names.iter().map(String::as_str), true);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn resolver_returns_own_code_for_long_names(rows in arb_registry_rows()) {
        let registry = Registry::from_rows(rows.clone()).unwrap();
        let overlay = EdgeCaseOverlay::default();
        let resolver = CodeResolver::new(&registry, &overlay, NameMatcher::default());

        for (code, name, _) in &rows {
            prop_assert_eq!(resolver.resolve(name, false), code.as_str());
        }
    }

    #[test]
    fn overlay_target_resolves_like_substitute(rows in arb_registry_rows(), alias in "zz[a-z]{6}") {
        let registry = Registry::from_rows(rows.clone()).unwrap();
        let (code, name, _) = &rows[0];
        let overlay = EdgeCaseOverlay::new(HashMap::from([(alias.clone(), name.clone())]));
        let resolver = CodeResolver::new(&registry, &overlay, NameMatcher::default());

        prop_assert_eq!(resolver.resolve(&alias, false), code.as_str());
    }
}

// ---------------------------------------------------------------------------
// Join
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn join_is_commutative_as_a_set(left in arb_codes(), right in arb_codes()) {
        let lr: BTreeSet<String> = common_codes(&left[..], &right[..]).into_iter().collect();
        let rl: BTreeSet<String> = common_codes(&right[..], &left[..]).into_iter().collect();
        prop_assert_eq!(lr, rl);
    }

    #[test]
    fn join_output_is_unique_and_in_left_order(left in arb_codes(), right in arb_codes()) {
        let joined = common_codes(&left[..], &right[..]);

        let unique: BTreeSet<&String> = joined.iter().collect();
        prop_assert_eq!(unique.len(), joined.len());

        let positions: Vec<usize> = joined
            .iter()
            .map(|code| left.iter().position(|l| l == code).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(joined.iter().all(|code| right.contains(code)));
    }
}
