//! JSON codec (CycloneDX 1.2–1.4).
//!
//! Wire structs mirror the JSON schema field names; conversion to and from
//! the canonical model happens here so the rest of the crate never sees
//! serde-shaped data.

use chrono::{DateTime, Utc};
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

/// Codec for `application/vnd.cyclonedx+json`.
pub struct JsonCodec;

const JSON_VERSIONS: &[SpecVersion] = &[SpecVersion::V1_2, SpecVersion::V1_3, SpecVersion::V1_4];

impl BomCodec for JsonCodec {
    fn format(&self) -> BomFormat {
        BomFormat::Json
    }

    fn supported_versions(&self) -> &'static [SpecVersion] {
        JSON_VERSIONS
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedBom> {
        let doc: JsonBom = serde_json::from_slice(bytes)
            .map_err(|e| RepoError::decode(BomFormat::Json, e.to_string()))?;

        if let Some(fmt) = &doc.bom_format {
            if fmt != "CycloneDX" {
                return Err(RepoError::decode(
                    BomFormat::Json,
                    format!("bomFormat is {fmt:?}, expected \"CycloneDX\""),
                ));
            }
        }

        let spec_version: SpecVersion = doc.spec_version.parse().map_err(|_| {
            RepoError::UnsupportedFormatVersion(format!(
                "JSON specVersion {:?} is not supported",
                doc.spec_version
            ))
        })?;
        if !JSON_VERSIONS.contains(&spec_version) {
            return Err(RepoError::UnsupportedFormatVersion(format!(
                "CycloneDX {spec_version} has no JSON serialization"
            )));
        }

        Ok(DecodedBom {
            bom: doc.into_canonical()?,
            spec_version,
        })
    }

    fn encode(&self, bom: &Bom, version: SpecVersion) -> Result<Vec<u8>> {
        let doc = JsonBom::from_canonical(&bom.project_to(version), version);
        let mut out = serde_json::to_vec_pretty(&doc)
            .map_err(|e| RepoError::decode(BomFormat::Json, e.to_string()))?;
        out.push(b'\n');
        Ok(out)
    }
}

// ============================================================================
// Wire structures
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonBom {
    #[serde(skip_serializing_if = "Option::is_none")]
    bom_format: Option<String>,
    spec_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<JsonMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    components: Option<Vec<JsonComponent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    services: Option<Vec<JsonService>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_references: Option<Vec<JsonExternalReference>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependencies: Option<Vec<JsonDependency>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    compositions: Option<Vec<JsonComposition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vulnerabilities: Option<Vec<JsonVulnerability>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<Vec<JsonProperty>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<JsonTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    authors: Option<Vec<JsonContact>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    component: Option<Box<JsonComponent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    manufacture: Option<JsonOrganization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    supplier: Option<JsonOrganization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    licenses: Option<Vec<JsonLicenseChoice>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<Vec<JsonProperty>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonTool {
    #[serde(skip_serializing_if = "Option::is_none")]
    vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hashes: Option<Vec<JsonHash>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonContact {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonOrganization {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    contact: Option<Vec<JsonContact>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonComponent {
    #[serde(rename = "type")]
    component_type: String,
    #[serde(rename = "bom-ref", skip_serializing_if = "Option::is_none")]
    bom_ref: Option<String>,
    #[serde(rename = "mime-type", skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    supplier: Option<JsonOrganization>,
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
    hashes: Option<Vec<JsonHash>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    licenses: Option<Vec<JsonLicenseChoice>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    copyright: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cpe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    swid: Option<JsonSwid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_references: Option<Vec<JsonExternalReference>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    components: Option<Vec<JsonComponent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<Vec<JsonProperty>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonSwid {
    tag_id: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonHash {
    alg: String,
    content: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonLicenseChoice {
    #[serde(skip_serializing_if = "Option::is_none")]
    license: Option<JsonLicense>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expression: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonLicense {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonExternalReference {
    #[serde(rename = "type")]
    ref_type: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hashes: Option<Vec<JsonHash>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonDependency {
    #[serde(rename = "ref")]
    dependency_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    depends_on: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonComposition {
    aggregate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    assemblies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependencies: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonService {
    #[serde(rename = "bom-ref", skip_serializing_if = "Option::is_none")]
    bom_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<JsonOrganization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoints: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    authenticated: Option<bool>,
    #[serde(rename = "x-trust-boundary", skip_serializing_if = "Option::is_none")]
    x_trust_boundary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_references: Option<Vec<JsonExternalReference>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<Vec<JsonProperty>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonProperty {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonVulnerability {
    #[serde(rename = "bom-ref", skip_serializing_if = "Option::is_none")]
    bom_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<JsonVulnSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ratings: Option<Vec<JsonRating>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cwes: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recommendation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    advisories: Option<Vec<JsonAdvisory>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    published: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    affects: Option<Vec<JsonAffectsTarget>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonVulnSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonRating {
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<JsonVulnSource>,
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
struct JsonAdvisory {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    url: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonAffectsTarget {
    #[serde(rename = "ref")]
    target_ref: String,
}

// ============================================================================
// Wire → canonical
// ============================================================================

impl JsonBom {
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
            metadata: self.metadata.map(JsonMetadata::into_canonical),
            components: convert_vec(self.components, JsonComponent::into_canonical),
            services: convert_vec(self.services, JsonService::into_canonical),
            external_references: convert_vec(
                self.external_references,
                JsonExternalReference::into_canonical,
            ),
            dependencies: convert_vec(self.dependencies, |d| Dependency {
                dependency_ref: d.dependency_ref,
                depends_on: d.depends_on.unwrap_or_default(),
            }),
            compositions: convert_vec(self.compositions, |c| Composition {
                aggregate: Aggregate::parse(&c.aggregate).unwrap_or(Aggregate::NotSpecified),
                assemblies: c.assemblies.unwrap_or_default(),
                dependencies: c.dependencies.unwrap_or_default(),
            }),
            vulnerabilities: convert_vec(self.vulnerabilities, JsonVulnerability::into_canonical),
            properties: convert_vec(self.properties, |p| Property {
                name: p.name,
                value: p.value,
            }),
        })
    }

    fn from_canonical(bom: &Bom, version: SpecVersion) -> Self {
        Self {
            bom_format: Some("CycloneDX".to_string()),
            spec_version: version.as_str().to_string(),
            serial_number: bom.serial_number.as_ref().map(|s| s.as_str().to_string()),
            version: Some(bom.version.unwrap_or(1)),
            metadata: bom.metadata.as_ref().map(JsonMetadata::from_canonical),
            components: wire_vec(&bom.components, JsonComponent::from_canonical),
            services: wire_vec(&bom.services, JsonService::from_canonical),
            external_references: wire_vec(
                &bom.external_references,
                JsonExternalReference::from_canonical,
            ),
            dependencies: wire_vec(&bom.dependencies, |d| JsonDependency {
                dependency_ref: d.dependency_ref.clone(),
                depends_on: if d.depends_on.is_empty() {
                    None
                } else {
                    Some(d.depends_on.clone())
                },
            }),
            compositions: wire_vec(&bom.compositions, |c| JsonComposition {
                aggregate: c.aggregate.as_str().to_string(),
                assemblies: if c.assemblies.is_empty() {
                    None
                } else {
                    Some(c.assemblies.clone())
                },
                dependencies: if c.dependencies.is_empty() {
                    None
                } else {
                    Some(c.dependencies.clone())
                },
            }),
            vulnerabilities: wire_vec(&bom.vulnerabilities, JsonVulnerability::from_canonical),
            properties: wire_vec(&bom.properties, |p| JsonProperty {
                name: p.name.clone(),
                value: p.value.clone(),
            }),
        }
    }
}

fn convert_vec<W, C>(wire: Option<Vec<W>>, f: impl Fn(W) -> C) -> Vec<C> {
    wire.unwrap_or_default().into_iter().map(f).collect()
}

fn wire_vec<C, W>(canonical: &[C], f: impl Fn(&C) -> W) -> Option<Vec<W>> {
    if canonical.is_empty() {
        None
    } else {
        Some(canonical.iter().map(f).collect())
    }
}

impl JsonMetadata {
    fn into_canonical(self) -> BomMetadata {
        BomMetadata {
            timestamp: self.timestamp,
            tools: convert_vec(self.tools, |t| Tool {
                vendor: t.vendor,
                name: t.name,
                version: t.version,
                hashes: convert_vec(t.hashes, JsonHash::into_canonical)
                    .into_iter()
                    .flatten()
                    .collect(),
            }),
            authors: convert_vec(self.authors, JsonContact::into_canonical),
            component: self
                .component
                .map(|c| Box::new(JsonComponent::into_canonical(*c))),
            manufacture: self.manufacture.map(JsonOrganization::into_canonical),
            supplier: self.supplier.map(JsonOrganization::into_canonical),
            licenses: convert_vec(self.licenses, JsonLicenseChoice::into_canonical)
                .into_iter()
                .flatten()
                .collect(),
            properties: convert_vec(self.properties, |p| Property {
                name: p.name,
                value: p.value,
            }),
        }
    }

    fn from_canonical(meta: &BomMetadata) -> Self {
        Self {
            timestamp: meta.timestamp,
            tools: wire_vec(&meta.tools, |t| JsonTool {
                vendor: t.vendor.clone(),
                name: t.name.clone(),
                version: t.version.clone(),
                hashes: wire_vec(&t.hashes, JsonHash::from_canonical),
            }),
            authors: wire_vec(&meta.authors, JsonContact::from_canonical),
            component: meta
                .component
                .as_ref()
                .map(|c| Box::new(JsonComponent::from_canonical(c))),
            manufacture: meta.manufacture.as_ref().map(JsonOrganization::from_canonical),
            supplier: meta.supplier.as_ref().map(JsonOrganization::from_canonical),
            licenses: wire_vec(&meta.licenses, JsonLicenseChoice::from_canonical),
            properties: wire_vec(&meta.properties, |p| JsonProperty {
                name: p.name.clone(),
                value: p.value.clone(),
            }),
        }
    }
}

impl JsonContact {
    fn into_canonical(self) -> OrganizationalContact {
        OrganizationalContact {
            name: self.name,
            email: self.email,
            phone: self.phone,
        }
    }

    fn from_canonical(contact: &OrganizationalContact) -> Self {
        Self {
            name: contact.name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
        }
    }
}

impl JsonOrganization {
    fn into_canonical(self) -> OrganizationalEntity {
        OrganizationalEntity {
            name: self.name,
            urls: self.url.unwrap_or_default(),
            contacts: convert_vec(self.contact, JsonContact::into_canonical),
        }
    }

    fn from_canonical(org: &OrganizationalEntity) -> Self {
        Self {
            name: org.name.clone(),
            url: if org.urls.is_empty() {
                None
            } else {
                Some(org.urls.clone())
            },
            contact: wire_vec(&org.contacts, JsonContact::from_canonical),
        }
    }
}

impl JsonHash {
    /// Unknown algorithms are skipped rather than failing the whole document.
    fn into_canonical(self) -> Option<Hash> {
        HashAlg::parse(&self.alg).map(|alg| Hash {
            alg,
            value: self.content,
        })
    }

    fn from_canonical(hash: &Hash) -> Self {
        Self {
            alg: hash.alg.as_str().to_string(),
            content: hash.value.clone(),
        }
    }
}

impl JsonLicenseChoice {
    fn into_canonical(self) -> Option<LicenseChoice> {
        if let Some(expression) = self.expression {
            Some(LicenseChoice::Expression(expression))
        } else {
            self.license.map(|l| {
                LicenseChoice::License(License {
                    id: l.id,
                    name: l.name,
                    url: l.url,
                })
            })
        }
    }

    fn from_canonical(choice: &LicenseChoice) -> Self {
        match choice {
            LicenseChoice::License(l) => Self {
                license: Some(JsonLicense {
                    id: l.id.clone(),
                    name: l.name.clone(),
                    url: l.url.clone(),
                }),
                expression: None,
            },
            LicenseChoice::Expression(e) => Self {
                license: None,
                expression: Some(e.clone()),
            },
        }
    }
}

impl JsonExternalReference {
    fn into_canonical(self) -> ExternalReference {
        ExternalReference {
            ref_type: ExternalReferenceType::parse(&self.ref_type),
            url: self.url,
            comment: self.comment,
            hashes: convert_vec(self.hashes, JsonHash::into_canonical)
                .into_iter()
                .flatten()
                .collect(),
        }
    }

    fn from_canonical(reference: &ExternalReference) -> Self {
        Self {
            ref_type: reference.ref_type.as_str().to_string(),
            url: reference.url.clone(),
            comment: reference.comment.clone(),
            hashes: wire_vec(&reference.hashes, JsonHash::from_canonical),
        }
    }
}

impl JsonComponent {
    fn into_canonical(self) -> Component {
        Component {
            component_type: ComponentType::parse(&self.component_type)
                .unwrap_or(ComponentType::Library),
            bom_ref: self.bom_ref,
            mime_type: self.mime_type,
            supplier: self.supplier.map(JsonOrganization::into_canonical),
            author: self.author,
            publisher: self.publisher,
            group: self.group,
            name: self.name,
            version: self.version,
            description: self.description,
            scope: self.scope.as_deref().and_then(Scope::parse),
            hashes: convert_vec(self.hashes, JsonHash::into_canonical)
                .into_iter()
                .flatten()
                .collect(),
            licenses: convert_vec(self.licenses, JsonLicenseChoice::into_canonical)
                .into_iter()
                .flatten()
                .collect(),
            copyright: self.copyright,
            cpe: self.cpe,
            purl: self.purl,
            swid: self.swid.map(|s| SwidTag {
                tag_id: s.tag_id,
                name: s.name,
                version: s.version,
            }),
            modified: self.modified,
            external_references: convert_vec(
                self.external_references,
                JsonExternalReference::into_canonical,
            ),
            components: convert_vec(self.components, JsonComponent::into_canonical),
            properties: convert_vec(self.properties, |p| Property {
                name: p.name,
                value: p.value,
            }),
        }
    }

    fn from_canonical(component: &Component) -> Self {
        Self {
            component_type: component.component_type.as_str().to_string(),
            bom_ref: component.bom_ref.clone(),
            mime_type: component.mime_type.clone(),
            supplier: component.supplier.as_ref().map(JsonOrganization::from_canonical),
            author: component.author.clone(),
            publisher: component.publisher.clone(),
            group: component.group.clone(),
            name: component.name.clone(),
            version: component.version.clone(),
            description: component.description.clone(),
            scope: component.scope.map(|s| s.as_str().to_string()),
            hashes: wire_vec(&component.hashes, JsonHash::from_canonical),
            licenses: wire_vec(&component.licenses, JsonLicenseChoice::from_canonical),
            copyright: component.copyright.clone(),
            cpe: component.cpe.clone(),
            purl: component.purl.clone(),
            swid: component.swid.as_ref().map(|s| JsonSwid {
                tag_id: s.tag_id.clone(),
                name: s.name.clone(),
                version: s.version.clone(),
            }),
            modified: component.modified,
            external_references: wire_vec(
                &component.external_references,
                JsonExternalReference::from_canonical,
            ),
            components: wire_vec(&component.components, JsonComponent::from_canonical),
            properties: wire_vec(&component.properties, |p| JsonProperty {
                name: p.name.clone(),
                value: p.value.clone(),
            }),
        }
    }
}

impl JsonService {
    fn into_canonical(self) -> Service {
        Service {
            bom_ref: self.bom_ref,
            provider: self.provider.map(JsonOrganization::into_canonical),
            group: self.group,
            name: self.name,
            version: self.version,
            description: self.description,
            endpoints: self.endpoints.unwrap_or_default(),
            authenticated: self.authenticated,
            x_trust_boundary: self.x_trust_boundary,
            external_references: convert_vec(
                self.external_references,
                JsonExternalReference::into_canonical,
            ),
            properties: convert_vec(self.properties, |p| Property {
                name: p.name,
                value: p.value,
            }),
        }
    }

    fn from_canonical(service: &Service) -> Self {
        Self {
            bom_ref: service.bom_ref.clone(),
            provider: service.provider.as_ref().map(JsonOrganization::from_canonical),
            group: service.group.clone(),
            name: service.name.clone(),
            version: service.version.clone(),
            description: service.description.clone(),
            endpoints: if service.endpoints.is_empty() {
                None
            } else {
                Some(service.endpoints.clone())
            },
            authenticated: service.authenticated,
            x_trust_boundary: service.x_trust_boundary,
            external_references: wire_vec(
                &service.external_references,
                JsonExternalReference::from_canonical,
            ),
            properties: wire_vec(&service.properties, |p| JsonProperty {
                name: p.name.clone(),
                value: p.value.clone(),
            }),
        }
    }
}

impl JsonVulnerability {
    fn into_canonical(self) -> Vulnerability {
        Vulnerability {
            bom_ref: self.bom_ref,
            id: self.id,
            source: self.source.map(JsonVulnSource::into_canonical),
            ratings: convert_vec(self.ratings, |r| VulnerabilityRating {
                source: r.source.map(JsonVulnSource::into_canonical),
                score: r.score,
                severity: r.severity.as_deref().and_then(Severity::parse),
                method: r.method.as_deref().and_then(ScoreMethod::parse),
                vector: r.vector,
            }),
            cwes: self.cwes.unwrap_or_default(),
            description: self.description,
            detail: self.detail,
            recommendation: self.recommendation,
            advisories: convert_vec(self.advisories, |a| Advisory {
                title: a.title,
                url: a.url,
            }),
            created: self.created,
            published: self.published,
            updated: self.updated,
            affects: convert_vec(self.affects, |a| a.target_ref),
        }
    }

    fn from_canonical(vuln: &Vulnerability) -> Self {
        Self {
            bom_ref: vuln.bom_ref.clone(),
            id: vuln.id.clone(),
            source: vuln.source.as_ref().map(JsonVulnSource::from_canonical),
            ratings: wire_vec(&vuln.ratings, |r| JsonRating {
                source: r.source.as_ref().map(JsonVulnSource::from_canonical),
                score: r.score,
                severity: r.severity.map(|s| s.as_str().to_string()),
                method: r.method.map(|m| m.as_str().to_string()),
                vector: r.vector.clone(),
            }),
            cwes: if vuln.cwes.is_empty() {
                None
            } else {
                Some(vuln.cwes.clone())
            },
            description: vuln.description.clone(),
            detail: vuln.detail.clone(),
            recommendation: vuln.recommendation.clone(),
            advisories: wire_vec(&vuln.advisories, |a| JsonAdvisory {
                title: a.title.clone(),
                url: a.url.clone(),
            }),
            created: vuln.created,
            published: vuln.published,
            updated: vuln.updated,
            affects: wire_vec(&vuln.affects, |r| JsonAffectsTarget {
                target_ref: r.clone(),
            }),
        }
    }
}

impl JsonVulnSource {
    fn into_canonical(self) -> VulnerabilitySource {
        VulnerabilitySource {
            name: self.name,
            url: self.url,
        }
    }

    fn from_canonical(source: &VulnerabilitySource) -> Self {
        Self {
            name: source.name.clone(),
            url: source.url.clone(),
        }
    }
}
