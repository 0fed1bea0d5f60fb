//! XML codec (CycloneDX 1.0–1.4).
//!
//! The schema version of a document is carried by its `xmlns` attribute
//! rather than a field, so decode resolves the namespace first and the
//! encoder stamps the namespace of the target version.
//!
//! Wire structs are kept separate from the JSON ones: the two schemas
//! disagree on attribute vs element placement, wrapper elements, and the
//! spelling of hash values (`content` in JSON, element text in XML).

use serde::{Deserialize, Serialize};

use crate::codec::{BomCodec, BomFormat, DecodedBom};
use crate::error::{RepoError, Result};
use crate::model::{
    Advisory, Aggregate, Bom, BomMetadata, Component, ComponentType, Composition, Dependency,
    ExternalReference, ExternalReferenceType, Hash, HashAlg, License, LicenseChoice,
    OrganizationalContact, OrganizationalEntity, Property, Scope, ScoreMethod, SerialNumber,
    Service, Severity, SpecVersion, SwidTag, Tool, Vulnerability, VulnerabilityRating,
    VulnerabilitySource,
};

/// Codec for `application/vnd.cyclonedx+xml`.
pub struct XmlCodec;

const XML_VERSIONS: &[SpecVersion] = &[
    SpecVersion::V1_0,
    SpecVersion::V1_1,
    SpecVersion::V1_2,
    SpecVersion::V1_3,
    SpecVersion::V1_4,
];

impl BomCodec for XmlCodec {
    fn format(&self) -> BomFormat {
        BomFormat::Xml
    }

    fn supported_versions(&self) -> &'static [SpecVersion] {
        XML_VERSIONS
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedBom> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| RepoError::decode(BomFormat::Xml, format!("invalid UTF-8: {e}")))?;
        let doc: XmlBom = quick_xml::de::from_str(text)
            .map_err(|e| RepoError::decode(BomFormat::Xml, e.to_string()))?;

        let namespace = doc.xmlns.as_deref().ok_or_else(|| {
            RepoError::decode(BomFormat::Xml, "missing CycloneDX xmlns declaration")
        })?;
        let spec_version = SpecVersion::from_xml_namespace(namespace).ok_or_else(|| {
            RepoError::UnsupportedFormatVersion(format!(
                "unrecognized CycloneDX namespace {namespace:?}"
            ))
        })?;

        Ok(DecodedBom {
            bom: doc.into_canonical()?,
            spec_version,
        })
    }

    fn encode(&self, bom: &Bom, version: SpecVersion) -> Result<Vec<u8>> {
        let doc = XmlBom::from_canonical(&bom.project_to(version), version);
        let mut body = String::new();
        let mut serializer = quick_xml::se::Serializer::new(&mut body);
        serializer.indent(' ', 2);
        doc.serialize(serializer)
            .map_err(|e| RepoError::decode(BomFormat::Xml, e.to_string()))?;

        let mut out = String::with_capacity(body.len() + 40);
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str(&body);
        out.push('\n');
        Ok(out.into_bytes())
    }
}

// ============================================================================
// Wire structures
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "bom")]
struct XmlBom {
    #[serde(rename = "@xmlns", skip_serializing_if = "Option::is_none")]
    xmlns: Option<String>,
    #[serde(rename = "@serialNumber", skip_serializing_if = "Option::is_none")]
    serial_number: Option<String>,
    #[serde(rename = "@version", skip_serializing_if = "Option::is_none")]
    version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<XmlMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    components: Option<XmlComponents>,
    #[serde(skip_serializing_if = "Option::is_none")]
    services: Option<XmlServices>,
    #[serde(rename = "externalReferences", skip_serializing_if = "Option::is_none")]
    external_references: Option<XmlExternalReferences>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependencies: Option<XmlDependencies>,
    #[serde(skip_serializing_if = "Option::is_none")]
    compositions: Option<XmlCompositions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<XmlProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vulnerabilities: Option<XmlVulnerabilities>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<XmlTools>,
    #[serde(skip_serializing_if = "Option::is_none")]
    authors: Option<XmlAuthors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    component: Option<Box<XmlComponent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    manufacture: Option<XmlOrganization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    supplier: Option<XmlOrganization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    licenses: Option<XmlLicenses>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<XmlProperties>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlTools {
    #[serde(rename = "tool", default)]
    tool: Vec<XmlTool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlTool {
    #[serde(skip_serializing_if = "Option::is_none")]
    vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hashes: Option<XmlHashes>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlAuthors {
    #[serde(rename = "author", default)]
    author: Vec<XmlContact>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlContact {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlOrganization {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(rename = "url", default, skip_serializing_if = "Vec::is_empty")]
    urls: Vec<String>,
    #[serde(rename = "contact", default, skip_serializing_if = "Vec::is_empty")]
    contacts: Vec<XmlContact>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlComponents {
    #[serde(rename = "component", default)]
    component: Vec<XmlComponent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlComponent {
    #[serde(rename = "@type")]
    component_type: String,
    #[serde(rename = "@bom-ref", skip_serializing_if = "Option::is_none")]
    bom_ref: Option<String>,
    #[serde(rename = "@mime-type", skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    supplier: Option<XmlOrganization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hashes: Option<XmlHashes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    licenses: Option<XmlLicenses>,
    #[serde(skip_serializing_if = "Option::is_none")]
    copyright: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cpe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    swid: Option<XmlSwid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<bool>,
    #[serde(rename = "externalReferences", skip_serializing_if = "Option::is_none")]
    external_references: Option<XmlExternalReferences>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<XmlProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    components: Option<XmlComponents>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlSwid {
    #[serde(rename = "@tagId")]
    tag_id: String,
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@version", skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlHashes {
    #[serde(rename = "hash", default)]
    hash: Vec<XmlHash>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlHash {
    #[serde(rename = "@alg")]
    alg: String,
    #[serde(rename = "$text")]
    value: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlLicenses {
    #[serde(rename = "$value", default)]
    items: Vec<XmlLicenseChoice>,
}

#[derive(Debug, Serialize, Deserialize)]
enum XmlLicenseChoice {
    #[serde(rename = "license")]
    License(XmlLicense),
    #[serde(rename = "expression")]
    Expression(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlLicense {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlExternalReferences {
    #[serde(rename = "reference", default)]
    reference: Vec<XmlExternalReference>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlExternalReference {
    #[serde(rename = "@type")]
    ref_type: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hashes: Option<XmlHashes>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlDependencies {
    #[serde(rename = "dependency", default)]
    dependency: Vec<XmlDependency>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlDependency {
    #[serde(rename = "@ref")]
    dependency_ref: String,
    #[serde(rename = "dependency", default, skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<XmlDependencyRef>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlDependencyRef {
    #[serde(rename = "@ref")]
    dependency_ref: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlCompositions {
    #[serde(rename = "composition", default)]
    composition: Vec<XmlComposition>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlComposition {
    aggregate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    assemblies: Option<XmlAssemblies>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependencies: Option<XmlCompositionDependencies>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlAssemblies {
    #[serde(rename = "assembly", default)]
    assembly: Vec<XmlRefAttribute>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlCompositionDependencies {
    #[serde(rename = "dependency", default)]
    dependency: Vec<XmlRefAttribute>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlRefAttribute {
    #[serde(rename = "@ref")]
    reference: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlProperties {
    #[serde(rename = "property", default)]
    property: Vec<XmlProperty>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlProperty {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "$text", skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlServices {
    #[serde(rename = "service", default)]
    service: Vec<XmlService>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlService {
    #[serde(rename = "@bom-ref", skip_serializing_if = "Option::is_none")]
    bom_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<XmlOrganization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoints: Option<XmlEndpoints>,
    #[serde(skip_serializing_if = "Option::is_none")]
    authenticated: Option<bool>,
    #[serde(rename = "x-trust-boundary", skip_serializing_if = "Option::is_none")]
    x_trust_boundary: Option<bool>,
    #[serde(rename = "externalReferences", skip_serializing_if = "Option::is_none")]
    external_references: Option<XmlExternalReferences>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<XmlProperties>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlEndpoints {
    #[serde(rename = "endpoint", default)]
    endpoint: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlVulnerabilities {
    #[serde(rename = "vulnerability", default)]
    vulnerability: Vec<XmlVulnerability>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlVulnerability {
    #[serde(rename = "@bom-ref", skip_serializing_if = "Option::is_none")]
    bom_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<XmlVulnSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ratings: Option<XmlRatings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cwes: Option<XmlCwes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recommendation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    advisories: Option<XmlAdvisories>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    published: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    affects: Option<XmlAffects>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlVulnSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlRatings {
    #[serde(rename = "rating", default)]
    rating: Vec<XmlRating>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlRating {
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<XmlVulnSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vector: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlCwes {
    #[serde(rename = "cwe", default)]
    cwe: Vec<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlAdvisories {
    #[serde(rename = "advisory", default)]
    advisory: Vec<XmlAdvisory>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlAdvisory {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    url: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlAffects {
    #[serde(rename = "target", default)]
    target: Vec<XmlAffectsTarget>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlAffectsTarget {
    #[serde(rename = "ref")]
    target_ref: String,
}

// ============================================================================
// Wire → canonical
// ============================================================================

fn parse_timestamp(value: Option<String>) -> Option<chrono::DateTime<chrono::Utc>> {
    value.as_deref().and_then(|s| {
        chrono::DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&chrono::Utc))
    })
}

fn format_timestamp(value: Option<chrono::DateTime<chrono::Utc>>) -> Option<String> {
    value.map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
}

impl XmlBom {
    fn into_canonical(self) -> Result<Bom> {
        let serial_number = self
            .serial_number
            .as_deref()
            .map(SerialNumber::new)
            .transpose()?;
        if self.version == Some(0) {
            return Err(RepoError::InvalidVersion { value: "0".into() });
        }

        Ok(Bom {
            serial_number,
            version: self.version,
            metadata: self.metadata.map(XmlMetadata::into_canonical),
            components: self
                .components
                .map(|c| c.component.into_iter().map(XmlComponent::into_canonical).collect())
                .unwrap_or_default(),
            services: self
                .services
                .map(|s| s.service.into_iter().map(XmlService::into_canonical).collect())
                .unwrap_or_default(),
            external_references: convert_references(self.external_references),
            dependencies: self
                .dependencies
                .map(|d| {
                    d.dependency
                        .into_iter()
                        .map(|dep| Dependency {
                            dependency_ref: dep.dependency_ref,
                            depends_on: dep
                                .depends_on
                                .into_iter()
                                .map(|r| r.dependency_ref)
                                .collect(),
                        })
                        .collect()
                })
                .unwrap_or_default(),
            compositions: self
                .compositions
                .map(|c| {
                    c.composition
                        .into_iter()
                        .map(|comp| Composition {
                            aggregate: Aggregate::parse(&comp.aggregate)
                                .unwrap_or(Aggregate::NotSpecified),
                            assemblies: comp
                                .assemblies
                                .map(|a| a.assembly.into_iter().map(|r| r.reference).collect())
                                .unwrap_or_default(),
                            dependencies: comp
                                .dependencies
                                .map(|d| d.dependency.into_iter().map(|r| r.reference).collect())
                                .unwrap_or_default(),
                        })
                        .collect()
                })
                .unwrap_or_default(),
            vulnerabilities: self
                .vulnerabilities
                .map(|v| {
                    v.vulnerability
                        .into_iter()
                        .map(XmlVulnerability::into_canonical)
                        .collect()
                })
                .unwrap_or_default(),
            properties: convert_properties(self.properties),
        })
    }

    fn from_canonical(bom: &Bom, version: SpecVersion) -> Self {
        Self {
            xmlns: Some(version.xml_namespace().to_string()),
            serial_number: bom.serial_number.as_ref().map(|s| s.as_str().to_string()),
            version: Some(bom.version.unwrap_or(1)),
            metadata: bom.metadata.as_ref().map(XmlMetadata::from_canonical),
            components: if bom.components.is_empty() {
                None
            } else {
                Some(XmlComponents {
                    component: bom.components.iter().map(XmlComponent::from_canonical).collect(),
                })
            },
            services: if bom.services.is_empty() {
                None
            } else {
                Some(XmlServices {
                    service: bom.services.iter().map(XmlService::from_canonical).collect(),
                })
            },
            external_references: wire_references(&bom.external_references),
            dependencies: if bom.dependencies.is_empty() {
                None
            } else {
                Some(XmlDependencies {
                    dependency: bom
                        .dependencies
                        .iter()
                        .map(|d| XmlDependency {
                            dependency_ref: d.dependency_ref.clone(),
                            depends_on: d
                                .depends_on
                                .iter()
                                .map(|r| XmlDependencyRef {
                                    dependency_ref: r.clone(),
                                })
                                .collect(),
                        })
                        .collect(),
                })
            },
            compositions: if bom.compositions.is_empty() {
                None
            } else {
                Some(XmlCompositions {
                    composition: bom
                        .compositions
                        .iter()
                        .map(|c| XmlComposition {
                            aggregate: c.aggregate.as_str().to_string(),
                            assemblies: if c.assemblies.is_empty() {
                                None
                            } else {
                                Some(XmlAssemblies {
                                    assembly: c
                                        .assemblies
                                        .iter()
                                        .map(|r| XmlRefAttribute {
                                            reference: r.clone(),
                                        })
                                        .collect(),
                                })
                            },
                            dependencies: if c.dependencies.is_empty() {
                                None
                            } else {
                                Some(XmlCompositionDependencies {
                                    dependency: c
                                        .dependencies
                                        .iter()
                                        .map(|r| XmlRefAttribute {
                                            reference: r.clone(),
                                        })
                                        .collect(),
                                })
                            },
                        })
                        .collect(),
                })
            },
            properties: wire_properties(&bom.properties),
            vulnerabilities: if bom.vulnerabilities.is_empty() {
                None
            } else {
                Some(XmlVulnerabilities {
                    vulnerability: bom
                        .vulnerabilities
                        .iter()
                        .map(XmlVulnerability::from_canonical)
                        .collect(),
                })
            },
        }
    }
}

fn convert_references(wire: Option<XmlExternalReferences>) -> Vec<ExternalReference> {
    wire.map(|w| {
        w.reference
            .into_iter()
            .map(|r| ExternalReference {
                ref_type: ExternalReferenceType::parse(&r.ref_type),
                url: r.url,
                comment: r.comment,
                hashes: convert_hashes(r.hashes),
            })
            .collect()
    })
    .unwrap_or_default()
}

fn wire_references(refs: &[ExternalReference]) -> Option<XmlExternalReferences> {
    if refs.is_empty() {
        None
    } else {
        Some(XmlExternalReferences {
            reference: refs
                .iter()
                .map(|r| XmlExternalReference {
                    ref_type: r.ref_type.as_str().to_string(),
                    url: r.url.clone(),
                    comment: r.comment.clone(),
                    hashes: wire_hashes(&r.hashes),
                })
                .collect(),
        })
    }
}

fn convert_hashes(wire: Option<XmlHashes>) -> Vec<Hash> {
    wire.map(|w| {
        w.hash
            .into_iter()
            .filter_map(|h| {
                HashAlg::parse(&h.alg).map(|alg| Hash {
                    alg,
                    value: h.value,
                })
            })
            .collect()
    })
    .unwrap_or_default()
}

fn wire_hashes(hashes: &[Hash]) -> Option<XmlHashes> {
    if hashes.is_empty() {
        None
    } else {
        Some(XmlHashes {
            hash: hashes
                .iter()
                .map(|h| XmlHash {
                    alg: h.alg.as_str().to_string(),
                    value: h.value.clone(),
                })
                .collect(),
        })
    }
}

fn convert_licenses(wire: Option<XmlLicenses>) -> Vec<LicenseChoice> {
    wire.map(|w| {
        w.items
            .into_iter()
            .map(|item| match item {
                XmlLicenseChoice::License(l) => LicenseChoice::License(License {
                    id: l.id,
                    name: l.name,
                    url: l.url,
                }),
                XmlLicenseChoice::Expression(e) => LicenseChoice::Expression(e),
            })
            .collect()
    })
    .unwrap_or_default()
}

fn wire_licenses(licenses: &[LicenseChoice]) -> Option<XmlLicenses> {
    if licenses.is_empty() {
        None
    } else {
        Some(XmlLicenses {
            items: licenses
                .iter()
                .map(|choice| match choice {
                    LicenseChoice::License(l) => XmlLicenseChoice::License(XmlLicense {
                        id: l.id.clone(),
                        name: l.name.clone(),
                        url: l.url.clone(),
                    }),
                    LicenseChoice::Expression(e) => XmlLicenseChoice::Expression(e.clone()),
                })
                .collect(),
        })
    }
}

fn convert_properties(wire: Option<XmlProperties>) -> Vec<Property> {
    wire.map(|w| {
        w.property
            .into_iter()
            .map(|p| Property {
                name: p.name,
                value: p.value,
            })
            .collect()
    })
    .unwrap_or_default()
}

fn wire_properties(properties: &[Property]) -> Option<XmlProperties> {
    if properties.is_empty() {
        None
    } else {
        Some(XmlProperties {
            property: properties
                .iter()
                .map(|p| XmlProperty {
                    name: p.name.clone(),
                    value: p.value.clone(),
                })
                .collect(),
        })
    }
}

fn convert_organization(wire: XmlOrganization) -> OrganizationalEntity {
    OrganizationalEntity {
        name: wire.name,
        urls: wire.urls,
        contacts: wire
            .contacts
            .into_iter()
            .map(|c| OrganizationalContact {
                name: c.name,
                email: c.email,
                phone: c.phone,
            })
            .collect(),
    }
}

fn wire_organization(org: &OrganizationalEntity) -> XmlOrganization {
    XmlOrganization {
        name: org.name.clone(),
        urls: org.urls.clone(),
        contacts: org
            .contacts
            .iter()
            .map(|c| XmlContact {
                name: c.name.clone(),
                email: c.email.clone(),
                phone: c.phone.clone(),
            })
            .collect(),
    }
}

impl XmlMetadata {
    fn into_canonical(self) -> BomMetadata {
        BomMetadata {
            timestamp: parse_timestamp(self.timestamp),
            tools: self
                .tools
                .map(|t| {
                    t.tool
                        .into_iter()
                        .map(|tool| Tool {
                            vendor: tool.vendor,
                            name: tool.name,
                            version: tool.version,
                            hashes: convert_hashes(tool.hashes),
                        })
                        .collect()
                })
                .unwrap_or_default(),
            authors: self
                .authors
                .map(|a| {
                    a.author
                        .into_iter()
                        .map(|c| OrganizationalContact {
                            name: c.name,
                            email: c.email,
                            phone: c.phone,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            component: self.component.map(|c| Box::new(c.into_canonical())),
            manufacture: self.manufacture.map(convert_organization),
            supplier: self.supplier.map(convert_organization),
            licenses: convert_licenses(self.licenses),
            properties: convert_properties(self.properties),
        }
    }

    fn from_canonical(meta: &BomMetadata) -> Self {
        Self {
            timestamp: format_timestamp(meta.timestamp),
            tools: if meta.tools.is_empty() {
                None
            } else {
                Some(XmlTools {
                    tool: meta
                        .tools
                        .iter()
                        .map(|t| XmlTool {
                            vendor: t.vendor.clone(),
                            name: t.name.clone(),
                            version: t.version.clone(),
                            hashes: wire_hashes(&t.hashes),
                        })
                        .collect(),
                })
            },
            authors: if meta.authors.is_empty() {
                None
            } else {
                Some(XmlAuthors {
                    author: meta
                        .authors
                        .iter()
                        .map(|c| XmlContact {
                            name: c.name.clone(),
                            email: c.email.clone(),
                            phone: c.phone.clone(),
                        })
                        .collect(),
                })
            },
            component: meta
                .component
                .as_ref()
                .map(|c| Box::new(XmlComponent::from_canonical(c))),
            manufacture: meta.manufacture.as_ref().map(wire_organization),
            supplier: meta.supplier.as_ref().map(wire_organization),
            licenses: wire_licenses(&meta.licenses),
            properties: wire_properties(&meta.properties),
        }
    }
}

impl XmlComponent {
    fn into_canonical(self) -> Component {
        Component {
            component_type: ComponentType::parse(&self.component_type)
                .unwrap_or(ComponentType::Library),
            bom_ref: self.bom_ref,
            mime_type: self.mime_type,
            supplier: self.supplier.map(convert_organization),
            author: self.author,
            publisher: self.publisher,
            group: self.group,
            name: self.name,
            version: self.version,
            description: self.description,
            scope: self.scope.as_deref().and_then(Scope::parse),
            hashes: convert_hashes(self.hashes),
            licenses: convert_licenses(self.licenses),
            copyright: self.copyright,
            cpe: self.cpe,
            purl: self.purl,
            swid: self.swid.map(|s| SwidTag {
                tag_id: s.tag_id,
                name: s.name,
                version: s.version,
            }),
            modified: self.modified,
            external_references: convert_references(self.external_references),
            components: self
                .components
                .map(|c| c.component.into_iter().map(XmlComponent::into_canonical).collect())
                .unwrap_or_default(),
            properties: convert_properties(self.properties),
        }
    }

    fn from_canonical(component: &Component) -> Self {
        Self {
            component_type: component.component_type.as_str().to_string(),
            bom_ref: component.bom_ref.clone(),
            mime_type: component.mime_type.clone(),
            supplier: component.supplier.as_ref().map(wire_organization),
            author: component.author.clone(),
            publisher: component.publisher.clone(),
            group: component.group.clone(),
            name: component.name.clone(),
            version: component.version.clone(),
            description: component.description.clone(),
            scope: component.scope.map(|s| s.as_str().to_string()),
            hashes: wire_hashes(&component.hashes),
            licenses: wire_licenses(&component.licenses),
            copyright: component.copyright.clone(),
            cpe: component.cpe.clone(),
            purl: component.purl.clone(),
            swid: component.swid.as_ref().map(|s| XmlSwid {
                tag_id: s.tag_id.clone(),
                name: s.name.clone(),
                version: s.version.clone(),
            }),
            modified: component.modified,
            external_references: wire_references(&component.external_references),
            properties: wire_properties(&component.properties),
            components: if component.components.is_empty() {
                None
            } else {
                Some(XmlComponents {
                    component: component
                        .components
                        .iter()
                        .map(XmlComponent::from_canonical)
                        .collect(),
                })
            },
        }
    }
}

impl XmlService {
    fn into_canonical(self) -> Service {
        Service {
            bom_ref: self.bom_ref,
            provider: self.provider.map(convert_organization),
            group: self.group,
            name: self.name,
            version: self.version,
            description: self.description,
            endpoints: self.endpoints.map(|e| e.endpoint).unwrap_or_default(),
            authenticated: self.authenticated,
            x_trust_boundary: self.x_trust_boundary,
            external_references: convert_references(self.external_references),
            properties: convert_properties(self.properties),
        }
    }

    fn from_canonical(service: &Service) -> Self {
        Self {
            bom_ref: service.bom_ref.clone(),
            provider: service.provider.as_ref().map(wire_organization),
            group: service.group.clone(),
            name: service.name.clone(),
            version: service.version.clone(),
            description: service.description.clone(),
            endpoints: if service.endpoints.is_empty() {
                None
            } else {
                Some(XmlEndpoints {
                    endpoint: service.endpoints.clone(),
                })
            },
            authenticated: service.authenticated,
            x_trust_boundary: service.x_trust_boundary,
            external_references: wire_references(&service.external_references),
            properties: wire_properties(&service.properties),
        }
    }
}

impl XmlVulnerability {
    fn into_canonical(self) -> Vulnerability {
        Vulnerability {
            bom_ref: self.bom_ref,
            id: self.id,
            source: self.source.map(|s| VulnerabilitySource {
                name: s.name,
                url: s.url,
            }),
            ratings: self
                .ratings
                .map(|r| {
                    r.rating
                        .into_iter()
                        .map(|rating| VulnerabilityRating {
                            source: rating.source.map(|s| VulnerabilitySource {
                                name: s.name,
                                url: s.url,
                            }),
                            score: rating.score,
                            severity: rating.severity.as_deref().and_then(Severity::parse),
                            method: rating.method.as_deref().and_then(ScoreMethod::parse),
                            vector: rating.vector,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            cwes: self.cwes.map(|c| c.cwe).unwrap_or_default(),
            description: self.description,
            detail: self.detail,
            recommendation: self.recommendation,
            advisories: self
                .advisories
                .map(|a| {
                    a.advisory
                        .into_iter()
                        .map(|adv| Advisory {
                            title: adv.title,
                            url: adv.url,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            created: parse_timestamp(self.created),
            published: parse_timestamp(self.published),
            updated: parse_timestamp(self.updated),
            affects: self
                .affects
                .map(|a| a.target.into_iter().map(|t| t.target_ref).collect())
                .unwrap_or_default(),
        }
    }

    fn from_canonical(vuln: &Vulnerability) -> Self {
        Self {
            bom_ref: vuln.bom_ref.clone(),
            id: vuln.id.clone(),
            source: vuln.source.as_ref().map(|s| XmlVulnSource {
                name: s.name.clone(),
                url: s.url.clone(),
            }),
            ratings: if vuln.ratings.is_empty() {
                None
            } else {
                Some(XmlRatings {
                    rating: vuln
                        .ratings
                        .iter()
                        .map(|r| XmlRating {
                            source: r.source.as_ref().map(|s| XmlVulnSource {
                                name: s.name.clone(),
                                url: s.url.clone(),
                            }),
                            score: r.score,
                            severity: r.severity.map(|s| s.as_str().to_string()),
                            method: r.method.map(|m| m.as_str().to_string()),
                            vector: r.vector.clone(),
                        })
                        .collect(),
                })
            },
            cwes: if vuln.cwes.is_empty() {
                None
            } else {
                Some(XmlCwes {
                    cwe: vuln.cwes.clone(),
                })
            },
            description: vuln.description.clone(),
            detail: vuln.detail.clone(),
            recommendation: vuln.recommendation.clone(),
            advisories: if vuln.advisories.is_empty() {
                None
            } else {
                Some(XmlAdvisories {
                    advisory: vuln
                        .advisories
                        .iter()
                        .map(|a| XmlAdvisory {
                            title: a.title.clone(),
                            url: a.url.clone(),
                        })
                        .collect(),
                })
            },
            created: format_timestamp(vuln.created),
            published: format_timestamp(vuln.published),
            updated: format_timestamp(vuln.updated),
            affects: if vuln.affects.is_empty() {
                None
            } else {
                Some(XmlAffects {
                    target: vuln
                        .affects
                        .iter()
                        .map(|r| XmlAffectsTarget {
                            target_ref: r.clone(),
                        })
                        .collect(),
                })
            },
        }
    }
}
