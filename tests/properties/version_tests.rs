use std::cmp::Ordering;

use proptest::prelude::*;

use xodr_qc::version::{self, Version, VersionExpr};

fn version_string() -> impl Strategy<Value = String> {
    prop::collection::vec(0u64..20, 1..4).prop_map(|parts| {
        parts
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".")
    })
}

proptest! {
    #[test]
    fn test_compare_is_antisymmetric(a in version_string(), b in version_string()) {
        let forward = version::compare(&a, &b).unwrap();
        let backward = version::compare(&b, &a).unwrap();
        prop_assert_eq!(forward, backward.reverse());
    }

    #[test]
    fn test_display_round_trips(raw in version_string()) {
        let parsed = Version::parse(&raw).unwrap();
        prop_assert_eq!(parsed.to_string(), raw);
    }

    #[test]
    fn test_satisfies_agrees_with_compare(a in version_string(), b in version_string()) {
        let ordering = version::compare(&a, &b).unwrap();
        prop_assert_eq!(version::satisfies(&a, &format!(">={b}")).unwrap(), ordering != Ordering::Less);
        prop_assert_eq!(version::satisfies(&a, &format!("<{b}")).unwrap(), ordering == Ordering::Less);
        prop_assert_eq!(version::satisfies(&a, &format!("=={b}")).unwrap(), ordering == Ordering::Equal);
    }

    #[test]
    fn test_closed_range_contains_its_bounds(a in version_string(), b in version_string()) {
        let (low, high) = match version::compare(&a, &b).unwrap() {
            Ordering::Greater => (b, a),
            _ => (a, b),
        };
        let expr = VersionExpr::parse(&format!("[{low}, {high}]")).unwrap();
        prop_assert!(expr.matches(&Version::parse(&low).unwrap()));
        prop_assert!(expr.matches(&Version::parse(&high).unwrap()));
        prop_assert!(expr.has_lower_bound());
    }

    #[test]
    fn test_garbage_never_panics(raw in ".*") {
        let _ = Version::parse(&raw);
        let _ = version::is_valid_expression(&raw);
    }
}
