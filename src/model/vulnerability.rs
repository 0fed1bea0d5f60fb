//! Vulnerability structures (CycloneDX 1.4+).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A known vulnerability affecting components in the BOM.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub bom_ref: Option<String>,
    /// Identifier within the source, e.g. `CVE-2024-0001`
    pub id: Option<String>,
    pub source: Option<VulnerabilitySource>,
    pub ratings: Vec<VulnerabilityRating>,
    /// CWE identifiers (numeric part only)
    pub cwes: Vec<u32>,
    pub description: Option<String>,
    pub detail: Option<String>,
    pub recommendation: Option<String>,
    pub advisories: Vec<Advisory>,
    pub created: Option<DateTime<Utc>>,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    /// `bom-ref`s of affected components
    pub affects: Vec<String>,
}

/// Where the vulnerability intelligence came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilitySource {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// A severity/score assessment from one source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityRating {
    pub source: Option<VulnerabilitySource>,
    pub score: Option<f64>,
    pub severity: Option<Severity>,
    pub method: Option<ScoreMethod>,
    pub vector: Option<String>,
}

/// Qualitative severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
    None,
    Unknown,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
            Severity::None => "none",
            Severity::Unknown => "unknown",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        const ALL: [Severity; 7] = [
            Severity::Critical,
            Severity::High,
            Severity::Medium,
            Severity::Low,
            Severity::Info,
            Severity::None,
            Severity::Unknown,
        ];
        ALL.into_iter().find(|v| v.as_str() == s)
    }
}

/// Scoring methodology behind a rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreMethod {
    CvssV2,
    CvssV3,
    CvssV31,
    Owasp,
    Other,
}

impl ScoreMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ScoreMethod::CvssV2 => "CVSSv2",
            ScoreMethod::CvssV3 => "CVSSv3",
            ScoreMethod::CvssV31 => "CVSSv31",
            ScoreMethod::Owasp => "OWASP",
            ScoreMethod::Other => "other",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        const ALL: [ScoreMethod; 5] = [
            ScoreMethod::CvssV2,
            ScoreMethod::CvssV3,
            ScoreMethod::CvssV31,
            ScoreMethod::Owasp,
            ScoreMethod::Other,
        ];
        ALL.into_iter().find(|v| v.as_str() == s)
    }
}

/// A published advisory for the vulnerability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub title: Option<String>,
    pub url: String,
}
