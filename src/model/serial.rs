//! BOM serial numbers.
//!
//! A serial number is the stable identity of a BOM across its stored
//! versions. CycloneDX requires the canonical URN form
//! `urn:uuid:xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` with lowercase hex
//! digits; anything else (brace GUIDs, uppercase, whitespace, truncation)
//! is rejected before it can reach the filesystem layer.

use crate::error::RepoError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Canonical URN pattern. Anchored on both ends so trailing garbage fails.
const SERIAL_PATTERN: &str =
    "^urn:uuid:[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$";

fn serial_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SERIAL_PATTERN).expect("serial pattern is valid"))
}

/// A validated BOM serial number in canonical `urn:uuid` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerialNumber(String);

impl SerialNumber {
    /// Validate and wrap a serial number string.
    pub fn new(value: &str) -> Result<Self, RepoError> {
        if serial_regex().is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(RepoError::invalid_serial(
                value,
                "expected urn:uuid:xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx with lowercase hex",
            ))
        }
    }

    /// The canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SerialNumber {
    type Error = RepoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<SerialNumber> for String {
    fn from(serial: SerialNumber) -> Self {
        serial.0
    }
}

impl std::str::FromStr for SerialNumber {
    type Err = RepoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79";

    #[test]
    fn test_accepts_canonical_form() {
        let serial = SerialNumber::new(VALID).unwrap();
        assert_eq!(serial.as_str(), VALID);
    }

    #[test]
    fn test_rejects_truncated_uuid() {
        assert!(SerialNumber::new("urn:uuid:3e671687-395b-41f5-a30f-a58921a69b7").is_err());
    }

    #[test]
    fn test_rejects_whitespace() {
        assert!(SerialNumber::new(&format!(" {VALID}")).is_err());
        assert!(SerialNumber::new(&format!("{VALID} ")).is_err());
        assert!(SerialNumber::new(&format!("{VALID}\n")).is_err());
    }

    #[test]
    fn test_rejects_brace_guid() {
        assert!(SerialNumber::new("urn:uuid:{3e671687-395b-41f5-a30f-a58921a69b79}").is_err());
    }

    #[test]
    fn test_rejects_uppercase_hex() {
        assert!(SerialNumber::new("urn:uuid:3E671687-395B-41F5-A30F-A58921A69B79").is_err());
    }

    #[test]
    fn test_rejects_missing_urn_prefix() {
        assert!(SerialNumber::new("3e671687-395b-41f5-a30f-a58921a69b79").is_err());
        assert!(SerialNumber::new("uuid:3e671687-395b-41f5-a30f-a58921a69b79").is_err());
    }

    #[test]
    fn test_serde_round_trip_validates() {
        let json = format!("\"{VALID}\"");
        let serial: SerialNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(serde_json::to_string(&serial).unwrap(), json);

        let bad: std::result::Result<SerialNumber, _> = serde_json::from_str("\"urn:uuid:nope\"");
        assert!(bad.is_err());
    }
}
