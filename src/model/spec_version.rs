//! CycloneDX specification versions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A CycloneDX specification revision.
///
/// Ordered so that downgrade/upgrade checks read naturally:
/// `SpecVersion::V1_2 < SpecVersion::V1_4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpecVersion {
    V1_0,
    V1_1,
    V1_2,
    V1_3,
    V1_4,
}

impl SpecVersion {
    /// All versions, oldest first.
    pub const ALL: [SpecVersion; 5] = [
        SpecVersion::V1_0,
        SpecVersion::V1_1,
        SpecVersion::V1_2,
        SpecVersion::V1_3,
        SpecVersion::V1_4,
    ];

    /// The newest supported revision.
    pub const LATEST: SpecVersion = SpecVersion::V1_4;

    /// The `X.Y` form used in media-type parameters and document fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SpecVersion::V1_0 => "1.0",
            SpecVersion::V1_1 => "1.1",
            SpecVersion::V1_2 => "1.2",
            SpecVersion::V1_3 => "1.3",
            SpecVersion::V1_4 => "1.4",
        }
    }

    /// The XML namespace for this revision.
    #[must_use]
    pub const fn xml_namespace(self) -> &'static str {
        match self {
            SpecVersion::V1_0 => "http://cyclonedx.org/schema/bom/1.0",
            SpecVersion::V1_1 => "http://cyclonedx.org/schema/bom/1.1",
            SpecVersion::V1_2 => "http://cyclonedx.org/schema/bom/1.2",
            SpecVersion::V1_3 => "http://cyclonedx.org/schema/bom/1.3",
            SpecVersion::V1_4 => "http://cyclonedx.org/schema/bom/1.4",
        }
    }

    /// Resolve a revision from an XML namespace URI.
    #[must_use]
    pub fn from_xml_namespace(ns: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.xml_namespace() == ns)
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecVersion {
    type Err = UnknownSpecVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownSpecVersion(s.to_string()))
    }
}

/// Error returned when a version string is not a known CycloneDX revision.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown CycloneDX specification version: {0:?}")]
pub struct UnknownSpecVersion(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_follows_history() {
        assert!(SpecVersion::V1_0 < SpecVersion::V1_1);
        assert!(SpecVersion::V1_3 < SpecVersion::V1_4);
        assert_eq!(SpecVersion::LATEST, SpecVersion::V1_4);
    }

    #[test]
    fn test_round_trip_str() {
        for v in SpecVersion::ALL {
            assert_eq!(v.as_str().parse::<SpecVersion>().unwrap(), v);
        }
        assert!("1.5".parse::<SpecVersion>().is_err());
        assert!("".parse::<SpecVersion>().is_err());
    }

    #[test]
    fn test_namespace_lookup() {
        assert_eq!(
            SpecVersion::from_xml_namespace("http://cyclonedx.org/schema/bom/1.2"),
            Some(SpecVersion::V1_2)
        );
        assert_eq!(SpecVersion::from_xml_namespace("http://example.com"), None);
    }
}
