//! Property tests for versions and ranges

use plugin_discovery::{Version, VersionRange};
use proptest::prelude::*;

fn version() -> impl Strategy<Value = Version> {
    (0u32..20, 0u32..20, 0u32..20, 0u32..5)
        .prop_map(|(major, minor, patch, build)| Version::with_build(major, minor, patch, build))
}

proptest! {
    #[test]
    fn prop_display_parses_back(v in version()) {
        prop_assert_eq!(Version::parse(&v.to_string()).unwrap(), v);
    }

    #[test]
    fn prop_open_range_is_lower_bound(min in version(), v in version()) {
        let range = VersionRange::at_least(min);
        prop_assert_eq!(range.contains(&v), v >= min);
    }

    #[test]
    fn prop_bounded_range_is_inclusive(a in version(), b in version(), v in version()) {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        let range = VersionRange::new(min, Some(max)).unwrap();
        prop_assert!(range.contains(&min));
        prop_assert!(range.contains(&max));
        prop_assert_eq!(range.contains(&v), min <= v && v <= max);
    }

    #[test]
    fn prop_inverted_range_rejected(a in version(), b in version()) {
        prop_assume!(a != b);
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        prop_assert!(VersionRange::new(high, Some(low)).is_err());
    }

    #[test]
    fn prop_missing_components_are_zero(major in 0u32..100, minor in 0u32..100) {
        prop_assert_eq!(
            Version::parse(&format!("{major}.{minor}")).unwrap(),
            Version::new(major, minor, 0)
        );
    }
}
