//! Version values and inclusive version ranges
//!
//! Versions are plain ordered `(major, minor, patch, build)` tuples. No
//! pre-release or semver caret semantics are applied.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::discovery::traits::DiscoveryError;

/// Four-component module version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub build: u32,
}

impl Version {
    /// Create a `major.minor.patch` version (build 0)
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            build: 0,
        }
    }

    /// Create a version with an explicit build component
    pub const fn with_build(major: u32, minor: u32, patch: u32, build: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            build,
        }
    }

    /// Parse `major[.minor[.patch[.build]]]`, missing components are 0
    pub fn parse(input: &str) -> Result<Self, DiscoveryError> {
        let invalid = || DiscoveryError::InvalidVersion(input.to_string());

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }

        let mut parts = [0u32; 4];
        let mut count = 0;
        for piece in trimmed.split('.') {
            if count == parts.len() {
                return Err(invalid());
            }
            if piece.is_empty() || !piece.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            parts[count] = piece.parse::<u32>().map_err(|_| invalid())?;
            count += 1;
        }

        Ok(Self::with_build(parts[0], parts[1], parts[2], parts[3]))
    }
}

impl FromStr for Version {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.build == 0 {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
        } else {
            write!(
                f,
                "{}.{}.{}.{}",
                self.major, self.minor, self.patch, self.build
            )
        }
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Version::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Inclusive `[min, max]` bound; an unset `max` means open-ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRange {
    min: Version,
    max: Option<Version>,
}

impl VersionRange {
    /// Create a range, rejecting `max < min`
    pub fn new(min: Version, max: Option<Version>) -> Result<Self, DiscoveryError> {
        if let Some(max) = max {
            if max < min {
                return Err(DiscoveryError::InvalidVersionRange { min, max });
            }
        }
        Ok(Self { min, max })
    }

    /// Range accepting any version `>= min`
    pub fn at_least(min: Version) -> Self {
        Self { min, max: None }
    }

    pub fn min(&self) -> Version {
        self.min
    }

    pub fn max(&self) -> Option<Version> {
        self.max
    }

    /// Whether `version` falls inside the range (both ends inclusive)
    pub fn contains(&self, version: &Version) -> bool {
        match self.max {
            Some(max) => self.min <= *version && *version <= max,
            None => *version >= self.min,
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "[{}, {}]", self.min, max),
            None => write!(f, ">= {}", self.min),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fills_missing_components() {
        assert_eq!(Version::parse("1").unwrap(), Version::new(1, 0, 0));
        assert_eq!(Version::parse("1.2").unwrap(), Version::new(1, 2, 0));
        assert_eq!(Version::parse("1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(
            Version::parse("1.2.3.4").unwrap(),
            Version::with_build(1, 2, 3, 4)
        );
        assert_eq!(Version::parse(" 2.0 ").unwrap(), Version::new(2, 0, 0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "1.", ".1", "1.2.3.4.5", "1.x", "-1.0", "1.0-beta", "v1.0"] {
            assert!(
                matches!(Version::parse(input), Err(DiscoveryError::InvalidVersion(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_ordering_is_component_wise() {
        assert!(Version::new(1, 2, 0) < Version::new(1, 10, 0));
        assert!(Version::new(1, 2, 3) < Version::with_build(1, 2, 3, 1));
        assert!(Version::new(0, 9, 0) < Version::new(1, 0, 0));
    }

    #[test]
    fn test_display() {
        assert_eq!(Version::new(1, 2, 0).to_string(), "1.2.0");
        assert_eq!(Version::with_build(1, 2, 0, 7).to_string(), "1.2.0.7");
    }

    #[test]
    fn test_open_ended_range() {
        let range = VersionRange::at_least(Version::new(1, 0, 0));
        assert!(range.contains(&Version::new(1, 0, 0)));
        assert!(range.contains(&Version::new(42, 0, 0)));
        assert!(!range.contains(&Version::new(0, 9, 0)));
    }

    #[test]
    fn test_bounded_range_is_inclusive() {
        let range =
            VersionRange::new(Version::new(1, 0, 0), Some(Version::new(2, 0, 0))).unwrap();
        assert!(range.contains(&Version::new(1, 0, 0)));
        assert!(range.contains(&Version::new(1, 5, 0)));
        assert!(range.contains(&Version::new(2, 0, 0)));
        assert!(!range.contains(&Version::with_build(2, 0, 0, 1)));
        assert!(!range.contains(&Version::new(0, 99, 0)));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = VersionRange::new(Version::new(2, 0, 0), Some(Version::new(1, 0, 0)))
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidVersionRange { .. }));
    }

    #[test]
    fn test_range_display() {
        let open = VersionRange::at_least(Version::new(1, 0, 0));
        assert_eq!(open.to_string(), ">= 1.0.0");
        let bounded =
            VersionRange::new(Version::new(1, 0, 0), Some(Version::new(1, 4, 0))).unwrap();
        assert_eq!(bounded.to_string(), "[1.0.0, 1.4.0]");
    }
}
