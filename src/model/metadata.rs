//! Shared metadata structures: tools, organizations, hashes, licenses,
//! external references, and properties.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Component;

/// Document-level metadata (`bom.metadata`, CycloneDX 1.2+).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BomMetadata {
    /// When the BOM document was produced
    pub timestamp: Option<DateTime<Utc>>,
    /// Tools that produced the BOM
    pub tools: Vec<Tool>,
    /// Authors of the BOM
    pub authors: Vec<OrganizationalContact>,
    /// The component the BOM describes
    pub component: Option<Box<Component>>,
    /// Organization that manufactured the described component
    pub manufacture: Option<OrganizationalEntity>,
    /// Organization that supplied the described component
    pub supplier: Option<OrganizationalEntity>,
    /// License of the BOM document itself (1.3+)
    pub licenses: Vec<LicenseChoice>,
    /// Name/value pairs (1.3+)
    pub properties: Vec<Property>,
}

/// A tool used to create the BOM.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub vendor: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub hashes: Vec<Hash>,
}

/// An organization with optional URLs and contacts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationalEntity {
    pub name: Option<String>,
    pub urls: Vec<String>,
    pub contacts: Vec<OrganizationalContact>,
}

/// A named contact within an organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationalContact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A cryptographic hash of a component artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hash {
    pub alg: HashAlg,
    pub value: String,
}

/// Hash algorithms registered by the CycloneDX schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlg {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
    Sha3_256,
    Sha3_384,
    Sha3_512,
    Blake2b256,
    Blake2b384,
    Blake2b512,
    Blake3,
}

impl HashAlg {
    /// The wire spelling shared by the XML and JSON schemas.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            HashAlg::Md5 => "MD5",
            HashAlg::Sha1 => "SHA-1",
            HashAlg::Sha256 => "SHA-256",
            HashAlg::Sha384 => "SHA-384",
            HashAlg::Sha512 => "SHA-512",
            HashAlg::Sha3_256 => "SHA3-256",
            HashAlg::Sha3_384 => "SHA3-384",
            HashAlg::Sha3_512 => "SHA3-512",
            HashAlg::Blake2b256 => "BLAKE2b-256",
            HashAlg::Blake2b384 => "BLAKE2b-384",
            HashAlg::Blake2b512 => "BLAKE2b-512",
            HashAlg::Blake3 => "BLAKE3",
        }
    }

    /// Parse the wire spelling.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        const ALL: [HashAlg; 12] = [
            HashAlg::Md5,
            HashAlg::Sha1,
            HashAlg::Sha256,
            HashAlg::Sha384,
            HashAlg::Sha512,
            HashAlg::Sha3_256,
            HashAlg::Sha3_384,
            HashAlg::Sha3_512,
            HashAlg::Blake2b256,
            HashAlg::Blake2b384,
            HashAlg::Blake2b512,
            HashAlg::Blake3,
        ];
        ALL.into_iter().find(|a| a.as_str() == s)
    }
}

impl fmt::Display for HashAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Either a concrete license or an SPDX license expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LicenseChoice {
    License(License),
    Expression(String),
}

/// A single license by SPDX id or free-form name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct License {
    /// SPDX license id, e.g. `Apache-2.0`
    pub id: Option<String>,
    /// Free-form name when no SPDX id applies
    pub name: Option<String>,
    pub url: Option<String>,
}

/// A reference to an external resource (1.1+ on components, 1.1+ at BOM level).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalReference {
    pub ref_type: ExternalReferenceType,
    pub url: String,
    pub comment: Option<String>,
    /// Hashes of the referenced artifact (1.3+)
    pub hashes: Vec<Hash>,
}

/// External reference categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExternalReferenceType {
    Vcs,
    IssueTracker,
    Website,
    Advisories,
    Bom,
    MailingList,
    Social,
    Chat,
    Documentation,
    Support,
    Distribution,
    License,
    BuildMeta,
    BuildSystem,
    /// 1.4+; downgraded to `Other` for older schemas
    ReleaseNotes,
    Other,
}

impl ExternalReferenceType {
    /// The wire spelling shared by the XML and JSON schemas.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ExternalReferenceType::Vcs => "vcs",
            ExternalReferenceType::IssueTracker => "issue-tracker",
            ExternalReferenceType::Website => "website",
            ExternalReferenceType::Advisories => "advisories",
            ExternalReferenceType::Bom => "bom",
            ExternalReferenceType::MailingList => "mailing-list",
            ExternalReferenceType::Social => "social",
            ExternalReferenceType::Chat => "chat",
            ExternalReferenceType::Documentation => "documentation",
            ExternalReferenceType::Support => "support",
            ExternalReferenceType::Distribution => "distribution",
            ExternalReferenceType::License => "license",
            ExternalReferenceType::BuildMeta => "build-meta",
            ExternalReferenceType::BuildSystem => "build-system",
            ExternalReferenceType::ReleaseNotes => "release-notes",
            ExternalReferenceType::Other => "other",
        }
    }

    /// Parse the wire spelling; unknown values map to `Other` the way
    /// permissive CycloneDX consumers treat them.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        const ALL: [ExternalReferenceType; 16] = [
            ExternalReferenceType::Vcs,
            ExternalReferenceType::IssueTracker,
            ExternalReferenceType::Website,
            ExternalReferenceType::Advisories,
            ExternalReferenceType::Bom,
            ExternalReferenceType::MailingList,
            ExternalReferenceType::Social,
            ExternalReferenceType::Chat,
            ExternalReferenceType::Documentation,
            ExternalReferenceType::Support,
            ExternalReferenceType::Distribution,
            ExternalReferenceType::License,
            ExternalReferenceType::BuildMeta,
            ExternalReferenceType::BuildSystem,
            ExternalReferenceType::ReleaseNotes,
            ExternalReferenceType::Other,
        ];
        ALL.into_iter()
            .find(|t| t.as_str() == s)
            .unwrap_or(ExternalReferenceType::Other)
    }
}

/// ISO/IEC 19770-2 software identification tag (1.2+).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwidTag {
    pub tag_id: String,
    pub name: String,
    pub version: Option<String>,
}

/// A name/value pair (1.3+).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_alg_wire_spelling() {
        assert_eq!(HashAlg::Sha256.as_str(), "SHA-256");
        assert_eq!(HashAlg::parse("SHA-256"), Some(HashAlg::Sha256));
        assert_eq!(HashAlg::parse("sha-256"), None);
        assert_eq!(HashAlg::parse("BLAKE3"), Some(HashAlg::Blake3));
    }

    #[test]
    fn test_external_reference_type_unknown_maps_to_other() {
        assert_eq!(
            ExternalReferenceType::parse("issue-tracker"),
            ExternalReferenceType::IssueTracker
        );
        assert_eq!(
            ExternalReferenceType::parse("something-new"),
            ExternalReferenceType::Other
        );
    }
}
