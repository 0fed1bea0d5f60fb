//! Protocol-buffer codec (CycloneDX 1.3–1.4).
//!
//! Message definitions are written out with `prost` derives instead of a
//! build-time protoc step; field tags and enumeration values match the
//! published `bom-1.4.proto` schema so payloads interoperate with other
//! CycloneDX tooling. The wire `spec_version` field carries the schema
//! revision the way the xmlns attribute does for XML.

use prost::Message;

use crate::codec::{BomCodec, BomFormat, DecodedBom};
use crate::error::{RepoError, Result};
use crate::model::{
    Advisory, Aggregate, Bom, BomMetadata, Component, ComponentType, Composition, Dependency,
    ExternalReference, ExternalReferenceType, Hash, HashAlg, License, LicenseChoice,
    OrganizationalContact, OrganizationalEntity, Property, Scope, ScoreMethod, SerialNumber,
    Service, Severity, SpecVersion, SwidTag, Tool, Vulnerability, VulnerabilityRating,
    VulnerabilitySource,
};

/// Codec for `application/x.vnd.cyclonedx+protobuf`.
pub struct ProtobufCodec;

const PROTOBUF_VERSIONS: &[SpecVersion] = &[SpecVersion::V1_3, SpecVersion::V1_4];

impl BomCodec for ProtobufCodec {
    fn format(&self) -> BomFormat {
        BomFormat::Protobuf
    }

    fn supported_versions(&self) -> &'static [SpecVersion] {
        PROTOBUF_VERSIONS
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedBom> {
        let doc = PbBom::decode(bytes)
            .map_err(|e| RepoError::decode(BomFormat::Protobuf, e.to_string()))?;

        let spec_version: SpecVersion = doc.spec_version.parse().map_err(|_| {
            RepoError::UnsupportedFormatVersion(format!(
                "protobuf spec_version {:?} is not supported",
                doc.spec_version
            ))
        })?;
        if !PROTOBUF_VERSIONS.contains(&spec_version) {
            return Err(RepoError::UnsupportedFormatVersion(format!(
                "CycloneDX {spec_version} has no protobuf serialization"
            )));
        }

        Ok(DecodedBom {
            bom: pb_to_canonical(doc)?,
            spec_version,
        })
    }

    fn encode(&self, bom: &Bom, version: SpecVersion) -> Result<Vec<u8>> {
        let doc = pb_from_canonical(&bom.project_to(version), version);
        Ok(doc.encode_to_vec())
    }
}

// ============================================================================
// Message definitions (tags per bom-1.4.proto)
// ============================================================================

#[derive(Clone, PartialEq, Message)]
pub struct PbBom {
    #[prost(string, tag = "1")]
    pub spec_version: String,
    #[prost(int32, optional, tag = "2")]
    pub version: Option<i32>,
    #[prost(string, optional, tag = "3")]
    pub serial_number: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub metadata: Option<PbMetadata>,
    #[prost(message, repeated, tag = "5")]
    pub components: Vec<PbComponent>,
    #[prost(message, repeated, tag = "6")]
    pub services: Vec<PbService>,
    #[prost(message, repeated, tag = "7")]
    pub external_references: Vec<PbExternalReference>,
    #[prost(message, repeated, tag = "8")]
    pub dependencies: Vec<PbDependency>,
    #[prost(message, repeated, tag = "9")]
    pub compositions: Vec<PbComposition>,
    #[prost(message, repeated, tag = "10")]
    pub vulnerabilities: Vec<PbVulnerability>,
    #[prost(message, repeated, tag = "11")]
    pub properties: Vec<PbProperty>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PbMetadata {
    #[prost(message, optional, tag = "1")]
    pub timestamp: Option<prost_types::Timestamp>,
    #[prost(message, repeated, tag = "2")]
    pub tools: Vec<PbTool>,
    #[prost(message, repeated, tag = "3")]
    pub authors: Vec<PbOrganizationalContact>,
    #[prost(message, optional, boxed, tag = "4")]
    pub component: Option<Box<PbComponent>>,
    #[prost(message, optional, tag = "5")]
    pub manufacture: Option<PbOrganizationalEntity>,
    #[prost(message, optional, tag = "6")]
    pub supplier: Option<PbOrganizationalEntity>,
    #[prost(message, repeated, tag = "7")]
    pub licenses: Vec<PbLicenseChoice>,
    #[prost(message, repeated, tag = "8")]
    pub properties: Vec<PbProperty>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PbTool {
    #[prost(string, optional, tag = "1")]
    pub vendor: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub version: Option<String>,
    #[prost(message, repeated, tag = "4")]
    pub hashes: Vec<PbHash>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PbOrganizationalContact {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub email: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub phone: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PbOrganizationalEntity {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(string, repeated, tag = "2")]
    pub url: Vec<String>,
    #[prost(message, repeated, tag = "3")]
    pub contact: Vec<PbOrganizationalContact>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PbComponent {
    #[prost(enumeration = "PbClassification", tag = "1")]
    pub r#type: i32,
    #[prost(string, optional, tag = "2")]
    pub mime_type: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub bom_ref: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub supplier: Option<PbOrganizationalEntity>,
    #[prost(string, optional, tag = "5")]
    pub author: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub publisher: Option<String>,
    #[prost(string, optional, tag = "7")]
    pub group: Option<String>,
    #[prost(string, tag = "8")]
    pub name: String,
    #[prost(string, optional, tag = "9")]
    pub version: Option<String>,
    #[prost(string, optional, tag = "10")]
    pub description: Option<String>,
    #[prost(enumeration = "PbScope", optional, tag = "11")]
    pub scope: Option<i32>,
    #[prost(message, repeated, tag = "12")]
    pub hashes: Vec<PbHash>,
    #[prost(message, repeated, tag = "13")]
    pub licenses: Vec<PbLicenseChoice>,
    #[prost(string, optional, tag = "14")]
    pub copyright: Option<String>,
    #[prost(string, optional, tag = "15")]
    pub cpe: Option<String>,
    #[prost(string, optional, tag = "16")]
    pub purl: Option<String>,
    #[prost(message, optional, tag = "17")]
    pub swid: Option<PbSwid>,
    #[prost(bool, optional, tag = "18")]
    pub modified: Option<bool>,
    #[prost(message, repeated, tag = "20")]
    pub external_references: Vec<PbExternalReference>,
    #[prost(message, repeated, tag = "21")]
    pub components: Vec<PbComponent>,
    #[prost(message, repeated, tag = "22")]
    pub properties: Vec<PbProperty>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, prost::Enumeration)]
#[repr(i32)]
pub enum PbClassification {
    Null = 0,
    Application = 1,
    Framework = 2,
    Library = 3,
    Container = 4,
    OperatingSystem = 5,
    Device = 6,
    Firmware = 7,
    File = 8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, prost::Enumeration)]
#[repr(i32)]
pub enum PbScope {
    Unspecified = 0,
    Required = 1,
    Optional = 2,
    Excluded = 3,
}

#[derive(Clone, PartialEq, Message)]
pub struct PbSwid {
    #[prost(string, tag = "1")]
    pub tag_id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, optional, tag = "3")]
    pub version: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PbHash {
    #[prost(enumeration = "PbHashAlg", tag = "1")]
    pub alg: i32,
    #[prost(string, tag = "2")]
    pub value: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, prost::Enumeration)]
#[repr(i32)]
pub enum PbHashAlg {
    Null = 0,
    Md5 = 1,
    Sha1 = 2,
    Sha256 = 3,
    Sha384 = 4,
    Sha512 = 5,
    Sha3256 = 6,
    Sha3384 = 7,
    Sha3512 = 8,
    Blake2b256 = 9,
    Blake2b384 = 10,
    Blake2b512 = 11,
    Blake3 = 12,
}

#[derive(Clone, PartialEq, Message)]
pub struct PbLicenseChoice {
    #[prost(oneof = "pb_license_choice::Choice", tags = "1, 2")]
    pub choice: Option<pb_license_choice::Choice>,
}

pub mod pb_license_choice {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Choice {
        #[prost(message, tag = "1")]
        License(super::PbLicense),
        #[prost(string, tag = "2")]
        Expression(String),
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct PbLicense {
    #[prost(string, optional, tag = "1")]
    pub id: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub url: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PbExternalReference {
    #[prost(enumeration = "PbExternalReferenceType", tag = "1")]
    pub r#type: i32,
    #[prost(string, tag = "2")]
    pub url: String,
    #[prost(string, optional, tag = "3")]
    pub comment: Option<String>,
    #[prost(message, repeated, tag = "4")]
    pub hashes: Vec<PbHash>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, prost::Enumeration)]
#[repr(i32)]
pub enum PbExternalReferenceType {
    Other = 0,
    Vcs = 1,
    IssueTracker = 2,
    Website = 3,
    Advisories = 4,
    Bom = 5,
    MailingList = 6,
    Social = 7,
    Chat = 8,
    Documentation = 9,
    Support = 10,
    Distribution = 11,
    License = 12,
    BuildMeta = 13,
    BuildSystem = 14,
    ReleaseNotes = 15,
}

#[derive(Clone, PartialEq, Message)]
pub struct PbDependency {
    #[prost(string, tag = "1")]
    pub r#ref: String,
    #[prost(message, repeated, tag = "2")]
    pub dependencies: Vec<PbDependency>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PbService {
    #[prost(string, optional, tag = "1")]
    pub bom_ref: Option<String>,
    #[prost(message, optional, tag = "2")]
    pub provider: Option<PbOrganizationalEntity>,
    #[prost(string, optional, tag = "3")]
    pub group: Option<String>,
    #[prost(string, tag = "4")]
    pub name: String,
    #[prost(string, optional, tag = "5")]
    pub version: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub description: Option<String>,
    #[prost(string, repeated, tag = "7")]
    pub endpoints: Vec<String>,
    #[prost(bool, optional, tag = "8")]
    pub authenticated: Option<bool>,
    #[prost(bool, optional, tag = "9")]
    pub x_trust_boundary: Option<bool>,
    #[prost(message, repeated, tag = "12")]
    pub external_references: Vec<PbExternalReference>,
    #[prost(message, repeated, tag = "14")]
    pub properties: Vec<PbProperty>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PbComposition {
    #[prost(enumeration = "PbAggregate", tag = "1")]
    pub aggregate: i32,
    #[prost(string, repeated, tag = "2")]
    pub assemblies: Vec<String>,
    #[prost(string, repeated, tag = "3")]
    pub dependencies: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, prost::Enumeration)]
#[repr(i32)]
pub enum PbAggregate {
    NotSpecified = 0,
    Complete = 1,
    Incomplete = 2,
    IncompleteFirstPartyOnly = 3,
    IncompleteThirdPartyOnly = 4,
    Unknown = 5,
}

#[derive(Clone, PartialEq, Message)]
pub struct PbProperty {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, optional, tag = "2")]
    pub value: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PbVulnerability {
    #[prost(string, optional, tag = "1")]
    pub bom_ref: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub id: Option<String>,
    #[prost(message, optional, tag = "3")]
    pub source: Option<PbVulnerabilitySource>,
    #[prost(message, repeated, tag = "5")]
    pub ratings: Vec<PbVulnerabilityRating>,
    #[prost(int32, repeated, tag = "6")]
    pub cwes: Vec<i32>,
    #[prost(string, optional, tag = "7")]
    pub description: Option<String>,
    #[prost(string, optional, tag = "8")]
    pub detail: Option<String>,
    #[prost(string, optional, tag = "9")]
    pub recommendation: Option<String>,
    #[prost(message, repeated, tag = "10")]
    pub advisories: Vec<PbAdvisory>,
    #[prost(message, optional, tag = "11")]
    pub created: Option<prost_types::Timestamp>,
    #[prost(message, optional, tag = "12")]
    pub published: Option<prost_types::Timestamp>,
    #[prost(message, optional, tag = "13")]
    pub updated: Option<prost_types::Timestamp>,
    #[prost(message, repeated, tag = "17")]
    pub affects: Vec<PbVulnerabilityAffects>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PbVulnerabilitySource {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub url: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PbVulnerabilityRating {
    #[prost(message, optional, tag = "1")]
    pub source: Option<PbVulnerabilitySource>,
    #[prost(double, optional, tag = "2")]
    pub score: Option<f64>,
    #[prost(enumeration = "PbSeverity", optional, tag = "3")]
    pub severity: Option<i32>,
    #[prost(enumeration = "PbScoreMethod", optional, tag = "4")]
    pub method: Option<i32>,
    #[prost(string, optional, tag = "5")]
    pub vector: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, prost::Enumeration)]
#[repr(i32)]
pub enum PbSeverity {
    Unknown = 0,
    Critical = 1,
    High = 2,
    Medium = 3,
    Low = 4,
    Info = 5,
    None = 6,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, prost::Enumeration)]
#[repr(i32)]
pub enum PbScoreMethod {
    Null = 0,
    CvssV2 = 1,
    CvssV3 = 2,
    CvssV31 = 3,
    Owasp = 4,
    Other = 5,
}

#[derive(Clone, PartialEq, Message)]
pub struct PbAdvisory {
    #[prost(string, optional, tag = "1")]
    pub title: Option<String>,
    #[prost(string, tag = "2")]
    pub url: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct PbVulnerabilityAffects {
    #[prost(string, tag = "1")]
    pub r#ref: String,
}

// ============================================================================
// Canonical ↔ message conversion
// ============================================================================

fn timestamp_to_pb(value: Option<chrono::DateTime<chrono::Utc>>) -> Option<prost_types::Timestamp> {
    value.map(|t| prost_types::Timestamp {
        seconds: t.timestamp(),
        nanos: t.timestamp_subsec_nanos() as i32,
    })
}

fn timestamp_from_pb(value: Option<prost_types::Timestamp>) -> Option<chrono::DateTime<chrono::Utc>> {
    value.and_then(|t| chrono::DateTime::from_timestamp(t.seconds, t.nanos.max(0) as u32))
}

fn pb_from_canonical(bom: &Bom, version: SpecVersion) -> PbBom {
    PbBom {
        spec_version: version.as_str().to_string(),
        version: Some(bom.version.unwrap_or(1) as i32),
        serial_number: bom.serial_number.as_ref().map(|s| s.as_str().to_string()),
        metadata: bom.metadata.as_ref().map(metadata_to_pb),
        components: bom.components.iter().map(component_to_pb).collect(),
        services: bom.services.iter().map(service_to_pb).collect(),
        external_references: bom.external_references.iter().map(reference_to_pb).collect(),
        dependencies: bom
            .dependencies
            .iter()
            .map(|d| PbDependency {
                r#ref: d.dependency_ref.clone(),
                dependencies: d
                    .depends_on
                    .iter()
                    .map(|r| PbDependency {
                        r#ref: r.clone(),
                        dependencies: Vec::new(),
                    })
                    .collect(),
            })
            .collect(),
        compositions: bom
            .compositions
            .iter()
            .map(|c| PbComposition {
                aggregate: aggregate_to_pb(c.aggregate) as i32,
                assemblies: c.assemblies.clone(),
                dependencies: c.dependencies.clone(),
            })
            .collect(),
        vulnerabilities: bom.vulnerabilities.iter().map(vulnerability_to_pb).collect(),
        properties: bom.properties.iter().map(property_to_pb).collect(),
    }
}

fn pb_to_canonical(doc: PbBom) -> Result<Bom> {
    let serial_number = doc
        .serial_number
        .as_deref()
        .map(SerialNumber::new)
        .transpose()?;
    let version = match doc.version {
        Some(v) if v <= 0 => {
            return Err(RepoError::InvalidVersion {
                value: v.to_string(),
            })
        }
        Some(v) => Some(v as u32),
        None => None,
    };

    Ok(Bom {
        serial_number,
        version,
        metadata: doc.metadata.map(metadata_from_pb),
        components: doc.components.into_iter().map(component_from_pb).collect(),
        services: doc.services.into_iter().map(service_from_pb).collect(),
        external_references: doc
            .external_references
            .into_iter()
            .map(reference_from_pb)
            .collect(),
        dependencies: doc
            .dependencies
            .into_iter()
            .map(|d| Dependency {
                dependency_ref: d.r#ref,
                depends_on: d.dependencies.into_iter().map(|child| child.r#ref).collect(),
            })
            .collect(),
        compositions: doc
            .compositions
            .into_iter()
            .map(|c| Composition {
                aggregate: aggregate_from_pb(c.aggregate),
                assemblies: c.assemblies,
                dependencies: c.dependencies,
            })
            .collect(),
        vulnerabilities: doc
            .vulnerabilities
            .into_iter()
            .map(vulnerability_from_pb)
            .collect(),
        properties: doc.properties.into_iter().map(property_from_pb).collect(),
    })
}

fn metadata_to_pb(meta: &BomMetadata) -> PbMetadata {
    PbMetadata {
        timestamp: timestamp_to_pb(meta.timestamp),
        tools: meta
            .tools
            .iter()
            .map(|t| PbTool {
                vendor: t.vendor.clone(),
                name: t.name.clone(),
                version: t.version.clone(),
                hashes: t.hashes.iter().map(hash_to_pb).collect(),
            })
            .collect(),
        authors: meta.authors.iter().map(contact_to_pb).collect(),
        component: meta
            .component
            .as_ref()
            .map(|c| Box::new(component_to_pb(c))),
        manufacture: meta.manufacture.as_ref().map(organization_to_pb),
        supplier: meta.supplier.as_ref().map(organization_to_pb),
        licenses: meta.licenses.iter().map(license_choice_to_pb).collect(),
        properties: meta.properties.iter().map(property_to_pb).collect(),
    }
}

fn metadata_from_pb(meta: PbMetadata) -> BomMetadata {
    BomMetadata {
        timestamp: timestamp_from_pb(meta.timestamp),
        tools: meta
            .tools
            .into_iter()
            .map(|t| Tool {
                vendor: t.vendor,
                name: t.name,
                version: t.version,
                hashes: t.hashes.into_iter().filter_map(hash_from_pb).collect(),
            })
            .collect(),
        authors: meta.authors.into_iter().map(contact_from_pb).collect(),
        component: meta.component.map(|c| Box::new(component_from_pb(*c))),
        manufacture: meta.manufacture.map(organization_from_pb),
        supplier: meta.supplier.map(organization_from_pb),
        licenses: meta
            .licenses
            .into_iter()
            .filter_map(license_choice_from_pb)
            .collect(),
        properties: meta.properties.into_iter().map(property_from_pb).collect(),
    }
}

fn contact_to_pb(contact: &OrganizationalContact) -> PbOrganizationalContact {
    PbOrganizationalContact {
        name: contact.name.clone(),
        email: contact.email.clone(),
        phone: contact.phone.clone(),
    }
}

fn contact_from_pb(contact: PbOrganizationalContact) -> OrganizationalContact {
    OrganizationalContact {
        name: contact.name,
        email: contact.email,
        phone: contact.phone,
    }
}

fn organization_to_pb(org: &OrganizationalEntity) -> PbOrganizationalEntity {
    PbOrganizationalEntity {
        name: org.name.clone(),
        url: org.urls.clone(),
        contact: org.contacts.iter().map(contact_to_pb).collect(),
    }
}

fn organization_from_pb(org: PbOrganizationalEntity) -> OrganizationalEntity {
    OrganizationalEntity {
        name: org.name,
        urls: org.url,
        contacts: org.contact.into_iter().map(contact_from_pb).collect(),
    }
}

fn classification_to_pb(t: ComponentType) -> PbClassification {
    match t {
        ComponentType::Application => PbClassification::Application,
        ComponentType::Framework => PbClassification::Framework,
        ComponentType::Library => PbClassification::Library,
        ComponentType::Container => PbClassification::Container,
        ComponentType::OperatingSystem => PbClassification::OperatingSystem,
        ComponentType::Device => PbClassification::Device,
        ComponentType::Firmware => PbClassification::Firmware,
        ComponentType::File => PbClassification::File,
    }
}

fn classification_from_pb(value: i32) -> ComponentType {
    match PbClassification::try_from(value) {
        Ok(PbClassification::Application) => ComponentType::Application,
        Ok(PbClassification::Framework) => ComponentType::Framework,
        Ok(PbClassification::Container) => ComponentType::Container,
        Ok(PbClassification::OperatingSystem) => ComponentType::OperatingSystem,
        Ok(PbClassification::Device) => ComponentType::Device,
        Ok(PbClassification::Firmware) => ComponentType::Firmware,
        Ok(PbClassification::File) => ComponentType::File,
        _ => ComponentType::Library,
    }
}

fn hash_to_pb(hash: &Hash) -> PbHash {
    let alg = match hash.alg {
        HashAlg::Md5 => PbHashAlg::Md5,
        HashAlg::Sha1 => PbHashAlg::Sha1,
        HashAlg::Sha256 => PbHashAlg::Sha256,
        HashAlg::Sha384 => PbHashAlg::Sha384,
        HashAlg::Sha512 => PbHashAlg::Sha512,
        HashAlg::Sha3_256 => PbHashAlg::Sha3256,
        HashAlg::Sha3_384 => PbHashAlg::Sha3384,
        HashAlg::Sha3_512 => PbHashAlg::Sha3512,
        HashAlg::Blake2b256 => PbHashAlg::Blake2b256,
        HashAlg::Blake2b384 => PbHashAlg::Blake2b384,
        HashAlg::Blake2b512 => PbHashAlg::Blake2b512,
        HashAlg::Blake3 => PbHashAlg::Blake3,
    };
    PbHash {
        alg: alg as i32,
        value: hash.value.clone(),
    }
}

fn hash_from_pb(hash: PbHash) -> Option<Hash> {
    let alg = match PbHashAlg::try_from(hash.alg).ok()? {
        PbHashAlg::Null => return None,
        PbHashAlg::Md5 => HashAlg::Md5,
        PbHashAlg::Sha1 => HashAlg::Sha1,
        PbHashAlg::Sha256 => HashAlg::Sha256,
        PbHashAlg::Sha384 => HashAlg::Sha384,
        PbHashAlg::Sha512 => HashAlg::Sha512,
        PbHashAlg::Sha3256 => HashAlg::Sha3_256,
        PbHashAlg::Sha3384 => HashAlg::Sha3_384,
        PbHashAlg::Sha3512 => HashAlg::Sha3_512,
        PbHashAlg::Blake2b256 => HashAlg::Blake2b256,
        PbHashAlg::Blake2b384 => HashAlg::Blake2b384,
        PbHashAlg::Blake2b512 => HashAlg::Blake2b512,
        PbHashAlg::Blake3 => HashAlg::Blake3,
    };
    Some(Hash {
        alg,
        value: hash.value,
    })
}

fn license_choice_to_pb(choice: &LicenseChoice) -> PbLicenseChoice {
    PbLicenseChoice {
        choice: Some(match choice {
            LicenseChoice::License(l) => pb_license_choice::Choice::License(PbLicense {
                id: l.id.clone(),
                name: l.name.clone(),
                url: l.url.clone(),
            }),
            LicenseChoice::Expression(e) => pb_license_choice::Choice::Expression(e.clone()),
        }),
    }
}

fn license_choice_from_pb(choice: PbLicenseChoice) -> Option<LicenseChoice> {
    choice.choice.map(|c| match c {
        pb_license_choice::Choice::License(l) => LicenseChoice::License(License {
            id: l.id,
            name: l.name,
            url: l.url,
        }),
        pb_license_choice::Choice::Expression(e) => LicenseChoice::Expression(e),
    })
}

fn reference_to_pb(reference: &ExternalReference) -> PbExternalReference {
    let ref_type = match reference.ref_type {
        ExternalReferenceType::Vcs => PbExternalReferenceType::Vcs,
        ExternalReferenceType::IssueTracker => PbExternalReferenceType::IssueTracker,
        ExternalReferenceType::Website => PbExternalReferenceType::Website,
        ExternalReferenceType::Advisories => PbExternalReferenceType::Advisories,
        ExternalReferenceType::Bom => PbExternalReferenceType::Bom,
        ExternalReferenceType::MailingList => PbExternalReferenceType::MailingList,
        ExternalReferenceType::Social => PbExternalReferenceType::Social,
        ExternalReferenceType::Chat => PbExternalReferenceType::Chat,
        ExternalReferenceType::Documentation => PbExternalReferenceType::Documentation,
        ExternalReferenceType::Support => PbExternalReferenceType::Support,
        ExternalReferenceType::Distribution => PbExternalReferenceType::Distribution,
        ExternalReferenceType::License => PbExternalReferenceType::License,
        ExternalReferenceType::BuildMeta => PbExternalReferenceType::BuildMeta,
        ExternalReferenceType::BuildSystem => PbExternalReferenceType::BuildSystem,
        ExternalReferenceType::ReleaseNotes => PbExternalReferenceType::ReleaseNotes,
        ExternalReferenceType::Other => PbExternalReferenceType::Other,
    };
    PbExternalReference {
        r#type: ref_type as i32,
        url: reference.url.clone(),
        comment: reference.comment.clone(),
        hashes: reference.hashes.iter().map(hash_to_pb).collect(),
    }
}

fn reference_from_pb(reference: PbExternalReference) -> ExternalReference {
    let ref_type = match PbExternalReferenceType::try_from(reference.r#type) {
        Ok(PbExternalReferenceType::Vcs) => ExternalReferenceType::Vcs,
        Ok(PbExternalReferenceType::IssueTracker) => ExternalReferenceType::IssueTracker,
        Ok(PbExternalReferenceType::Website) => ExternalReferenceType::Website,
        Ok(PbExternalReferenceType::Advisories) => ExternalReferenceType::Advisories,
        Ok(PbExternalReferenceType::Bom) => ExternalReferenceType::Bom,
        Ok(PbExternalReferenceType::MailingList) => ExternalReferenceType::MailingList,
        Ok(PbExternalReferenceType::Social) => ExternalReferenceType::Social,
        Ok(PbExternalReferenceType::Chat) => ExternalReferenceType::Chat,
        Ok(PbExternalReferenceType::Documentation) => ExternalReferenceType::Documentation,
        Ok(PbExternalReferenceType::Support) => ExternalReferenceType::Support,
        Ok(PbExternalReferenceType::Distribution) => ExternalReferenceType::Distribution,
        Ok(PbExternalReferenceType::License) => ExternalReferenceType::License,
        Ok(PbExternalReferenceType::BuildMeta) => ExternalReferenceType::BuildMeta,
        Ok(PbExternalReferenceType::BuildSystem) => ExternalReferenceType::BuildSystem,
        Ok(PbExternalReferenceType::ReleaseNotes) => ExternalReferenceType::ReleaseNotes,
        _ => ExternalReferenceType::Other,
    };
    ExternalReference {
        ref_type,
        url: reference.url,
        comment: reference.comment,
        hashes: reference.hashes.into_iter().filter_map(hash_from_pb).collect(),
    }
}

fn component_to_pb(component: &Component) -> PbComponent {
    PbComponent {
        r#type: classification_to_pb(component.component_type) as i32,
        mime_type: component.mime_type.clone(),
        bom_ref: component.bom_ref.clone(),
        supplier: component.supplier.as_ref().map(organization_to_pb),
        author: component.author.clone(),
        publisher: component.publisher.clone(),
        group: component.group.clone(),
        name: component.name.clone(),
        version: component.version.clone(),
        description: component.description.clone(),
        scope: component.scope.map(|s| {
            (match s {
                Scope::Required => PbScope::Required,
                Scope::Optional => PbScope::Optional,
                Scope::Excluded => PbScope::Excluded,
            }) as i32
        }),
        hashes: component.hashes.iter().map(hash_to_pb).collect(),
        licenses: component.licenses.iter().map(license_choice_to_pb).collect(),
        copyright: component.copyright.clone(),
        cpe: component.cpe.clone(),
        purl: component.purl.clone(),
        swid: component.swid.as_ref().map(|s| PbSwid {
            tag_id: s.tag_id.clone(),
            name: s.name.clone(),
            version: s.version.clone(),
        }),
        modified: component.modified,
        external_references: component
            .external_references
            .iter()
            .map(reference_to_pb)
            .collect(),
        components: component.components.iter().map(component_to_pb).collect(),
        properties: component.properties.iter().map(property_to_pb).collect(),
    }
}

fn component_from_pb(component: PbComponent) -> Component {
    Component {
        component_type: classification_from_pb(component.r#type),
        bom_ref: component.bom_ref,
        mime_type: component.mime_type,
        supplier: component.supplier.map(organization_from_pb),
        author: component.author,
        publisher: component.publisher,
        group: component.group,
        name: component.name,
        version: component.version,
        description: component.description,
        scope: component.scope.and_then(|s| match PbScope::try_from(s) {
            Ok(PbScope::Required) => Some(Scope::Required),
            Ok(PbScope::Optional) => Some(Scope::Optional),
            Ok(PbScope::Excluded) => Some(Scope::Excluded),
            _ => None,
        }),
        hashes: component.hashes.into_iter().filter_map(hash_from_pb).collect(),
        licenses: component
            .licenses
            .into_iter()
            .filter_map(license_choice_from_pb)
            .collect(),
        copyright: component.copyright,
        cpe: component.cpe,
        purl: component.purl,
        swid: component.swid.map(|s| SwidTag {
            tag_id: s.tag_id,
            name: s.name,
            version: s.version,
        }),
        modified: component.modified,
        external_references: component
            .external_references
            .into_iter()
            .map(reference_from_pb)
            .collect(),
        components: component.components.into_iter().map(component_from_pb).collect(),
        properties: component.properties.into_iter().map(property_from_pb).collect(),
    }
}

fn service_to_pb(service: &Service) -> PbService {
    PbService {
        bom_ref: service.bom_ref.clone(),
        provider: service.provider.as_ref().map(organization_to_pb),
        group: service.group.clone(),
        name: service.name.clone(),
        version: service.version.clone(),
        description: service.description.clone(),
        endpoints: service.endpoints.clone(),
        authenticated: service.authenticated,
        x_trust_boundary: service.x_trust_boundary,
        external_references: service
            .external_references
            .iter()
            .map(reference_to_pb)
            .collect(),
        properties: service.properties.iter().map(property_to_pb).collect(),
    }
}

fn service_from_pb(service: PbService) -> Service {
    Service {
        bom_ref: service.bom_ref,
        provider: service.provider.map(organization_from_pb),
        group: service.group,
        name: service.name,
        version: service.version,
        description: service.description,
        endpoints: service.endpoints,
        authenticated: service.authenticated,
        x_trust_boundary: service.x_trust_boundary,
        external_references: service
            .external_references
            .into_iter()
            .map(reference_from_pb)
            .collect(),
        properties: service.properties.into_iter().map(property_from_pb).collect(),
    }
}

fn property_to_pb(property: &Property) -> PbProperty {
    PbProperty {
        name: property.name.clone(),
        value: property.value.clone(),
    }
}

fn property_from_pb(property: PbProperty) -> Property {
    Property {
        name: property.name,
        value: property.value,
    }
}

fn aggregate_to_pb(aggregate: Aggregate) -> PbAggregate {
    match aggregate {
        Aggregate::Complete => PbAggregate::Complete,
        Aggregate::Incomplete => PbAggregate::Incomplete,
        Aggregate::IncompleteFirstPartyOnly => PbAggregate::IncompleteFirstPartyOnly,
        Aggregate::IncompleteThirdPartyOnly => PbAggregate::IncompleteThirdPartyOnly,
        Aggregate::Unknown => PbAggregate::Unknown,
        Aggregate::NotSpecified => PbAggregate::NotSpecified,
    }
}

fn aggregate_from_pb(value: i32) -> Aggregate {
    match PbAggregate::try_from(value) {
        Ok(PbAggregate::Complete) => Aggregate::Complete,
        Ok(PbAggregate::Incomplete) => Aggregate::Incomplete,
        Ok(PbAggregate::IncompleteFirstPartyOnly) => Aggregate::IncompleteFirstPartyOnly,
        Ok(PbAggregate::IncompleteThirdPartyOnly) => Aggregate::IncompleteThirdPartyOnly,
        Ok(PbAggregate::Unknown) => Aggregate::Unknown,
        _ => Aggregate::NotSpecified,
    }
}

fn vulnerability_to_pb(vuln: &Vulnerability) -> PbVulnerability {
    PbVulnerability {
        bom_ref: vuln.bom_ref.clone(),
        id: vuln.id.clone(),
        source: vuln.source.as_ref().map(|s| PbVulnerabilitySource {
            name: s.name.clone(),
            url: s.url.clone(),
        }),
        ratings: vuln
            .ratings
            .iter()
            .map(|r| PbVulnerabilityRating {
                source: r.source.as_ref().map(|s| PbVulnerabilitySource {
                    name: s.name.clone(),
                    url: s.url.clone(),
                }),
                score: r.score,
                severity: r.severity.map(|s| {
                    (match s {
                        Severity::Critical => PbSeverity::Critical,
                        Severity::High => PbSeverity::High,
                        Severity::Medium => PbSeverity::Medium,
                        Severity::Low => PbSeverity::Low,
                        Severity::Info => PbSeverity::Info,
                        Severity::None => PbSeverity::None,
                        Severity::Unknown => PbSeverity::Unknown,
                    }) as i32
                }),
                method: r.method.map(|m| {
                    (match m {
                        ScoreMethod::CvssV2 => PbScoreMethod::CvssV2,
                        ScoreMethod::CvssV3 => PbScoreMethod::CvssV3,
                        ScoreMethod::CvssV31 => PbScoreMethod::CvssV31,
                        ScoreMethod::Owasp => PbScoreMethod::Owasp,
                        ScoreMethod::Other => PbScoreMethod::Other,
                    }) as i32
                }),
                vector: r.vector.clone(),
            })
            .collect(),
        cwes: vuln.cwes.iter().map(|c| *c as i32).collect(),
        description: vuln.description.clone(),
        detail: vuln.detail.clone(),
        recommendation: vuln.recommendation.clone(),
        advisories: vuln
            .advisories
            .iter()
            .map(|a| PbAdvisory {
                title: a.title.clone(),
                url: a.url.clone(),
            })
            .collect(),
        created: timestamp_to_pb(vuln.created),
        published: timestamp_to_pb(vuln.published),
        updated: timestamp_to_pb(vuln.updated),
        affects: vuln
            .affects
            .iter()
            .map(|r| PbVulnerabilityAffects { r#ref: r.clone() })
            .collect(),
    }
}

fn vulnerability_from_pb(vuln: PbVulnerability) -> Vulnerability {
    Vulnerability {
        bom_ref: vuln.bom_ref,
        id: vuln.id,
        source: vuln.source.map(|s| VulnerabilitySource {
            name: s.name,
            url: s.url,
        }),
        ratings: vuln
            .ratings
            .into_iter()
            .map(|r| VulnerabilityRating {
                source: r.source.map(|s| VulnerabilitySource {
                    name: s.name,
                    url: s.url,
                }),
                score: r.score,
                severity: r.severity.and_then(|s| match PbSeverity::try_from(s) {
                    Ok(PbSeverity::Critical) => Some(Severity::Critical),
                    Ok(PbSeverity::High) => Some(Severity::High),
                    Ok(PbSeverity::Medium) => Some(Severity::Medium),
                    Ok(PbSeverity::Low) => Some(Severity::Low),
                    Ok(PbSeverity::Info) => Some(Severity::Info),
                    Ok(PbSeverity::None) => Some(Severity::None),
                    Ok(PbSeverity::Unknown) => Some(Severity::Unknown),
                    Err(_) => None,
                }),
                method: r.method.and_then(|m| match PbScoreMethod::try_from(m) {
                    Ok(PbScoreMethod::CvssV2) => Some(ScoreMethod::CvssV2),
                    Ok(PbScoreMethod::CvssV3) => Some(ScoreMethod::CvssV3),
                    Ok(PbScoreMethod::CvssV31) => Some(ScoreMethod::CvssV31),
                    Ok(PbScoreMethod::Owasp) => Some(ScoreMethod::Owasp),
                    Ok(PbScoreMethod::Other) => Some(ScoreMethod::Other),
                    _ => None,
                }),
                vector: r.vector,
            })
            .collect(),
        cwes: vuln.cwes.into_iter().filter(|c| *c >= 0).map(|c| c as u32).collect(),
        description: vuln.description,
        detail: vuln.detail,
        recommendation: vuln.recommendation,
        advisories: vuln
            .advisories
            .into_iter()
            .map(|a| Advisory {
                title: a.title,
                url: a.url,
            })
            .collect(),
        created: timestamp_from_pb(vuln.created),
        published: timestamp_from_pb(vuln.published),
        updated: timestamp_from_pb(vuln.updated),
        affects: vuln.affects.into_iter().map(|a| a.r#ref).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ComponentType;

    fn sample_bom() -> Bom {
        let mut component = Component::new(ComponentType::Library, "openssl");
        component.version = Some("3.0.13".into());
        component.purl = Some("pkg:generic/openssl@3.0.13".into());
        Bom {
            serial_number: Some(
                SerialNumber::new("urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79").unwrap(),
            ),
            version: Some(2),
            components: vec![component],
            ..Bom::default()
        }
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let bom = sample_bom();
        let encoded = ProtobufCodec.encode(&bom, SpecVersion::V1_4).unwrap();
        let decoded = ProtobufCodec.decode(&encoded).unwrap();
        assert_eq!(decoded.spec_version, SpecVersion::V1_4);
        assert_eq!(decoded.bom, bom);
    }

    #[test]
    fn test_encode_1_3_stamps_spec_version() {
        let bom = sample_bom();
        let encoded = ProtobufCodec.encode(&bom, SpecVersion::V1_3).unwrap();
        let raw = PbBom::decode(encoded.as_slice()).unwrap();
        assert_eq!(raw.spec_version, "1.3");
    }

    #[test]
    fn test_decode_rejects_unsupported_spec_version() {
        let raw = PbBom {
            spec_version: "1.2".to_string(),
            ..PbBom::default()
        };
        let bytes = raw.encode_to_vec();
        assert!(matches!(
            ProtobufCodec.decode(&bytes),
            Err(RepoError::UnsupportedFormatVersion(_))
        ));
    }

    #[test]
    fn test_decode_garbage_fails() {
        // A long run of 0xFF bytes is not a valid message
        let bytes = vec![0xFF; 64];
        assert!(matches!(
            ProtobufCodec.decode(&bytes),
            Err(RepoError::Decode { .. })
        ));
    }
}
