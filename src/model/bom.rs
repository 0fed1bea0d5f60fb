//! Core BOM and Component data structures, plus the schema-version
//! projection used by every encoder.

use serde::{Deserialize, Serialize};

use super::{
    BomMetadata, ExternalReference, ExternalReferenceType, Hash, LicenseChoice, OrganizationalEntity,
    Property, SerialNumber, SpecVersion, SwidTag, Vulnerability,
};

/// Canonical, schema-version-independent CycloneDX BOM.
///
/// Decoders populate this from any supported wire form; encoders project it
/// down to a target [`SpecVersion`] with [`Bom::project_to`] before writing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bom {
    /// Stable document identity in `urn:uuid` form
    pub serial_number: Option<SerialNumber>,
    /// Document version within the repository; `None` on submission means
    /// "assign the next free version"
    pub version: Option<u32>,
    /// Document metadata (1.2+)
    pub metadata: Option<BomMetadata>,
    pub components: Vec<Component>,
    /// External services (1.2+)
    pub services: Vec<Service>,
    /// BOM-level external references (1.1+)
    pub external_references: Vec<ExternalReference>,
    /// Dependency graph (1.2+)
    pub dependencies: Vec<Dependency>,
    /// Composition completeness claims (1.3+)
    pub compositions: Vec<Composition>,
    /// Known vulnerabilities (1.4+)
    pub vulnerabilities: Vec<Vulnerability>,
    /// BOM-level properties (1.3+)
    pub properties: Vec<Property>,
}

impl Bom {
    /// Project this BOM onto a target schema version.
    ///
    /// Fields the target version does not define are dropped; nothing is
    /// fabricated for newer targets, so upgrading is the identity except for
    /// defaults the newer schema requires. The returned value is always a
    /// valid document at `target`.
    #[must_use]
    pub fn project_to(&self, target: SpecVersion) -> Bom {
        let mut bom = self.clone();

        if target < SpecVersion::V1_4 {
            bom.vulnerabilities.clear();
        }
        if target < SpecVersion::V1_3 {
            bom.properties.clear();
            bom.compositions.clear();
            if let Some(meta) = bom.metadata.as_mut() {
                meta.licenses.clear();
                meta.properties.clear();
            }
        }
        if target < SpecVersion::V1_2 {
            bom.metadata = None;
            bom.dependencies.clear();
            bom.services.clear();
        }
        if target < SpecVersion::V1_1 {
            bom.external_references.clear();
        }

        for component in &mut bom.components {
            project_component(component, target);
        }
        if let Some(meta) = bom.metadata.as_mut() {
            if let Some(component) = meta.component.as_mut() {
                project_component(component, target);
            }
        }
        for service in &mut bom.services {
            project_service(service, target);
        }
        for reference in &mut bom.external_references {
            project_reference(reference, target);
        }

        bom
    }
}

fn project_component(component: &mut Component, target: SpecVersion) {
    if target < SpecVersion::V1_3 {
        component.properties.clear();
        for reference in &mut component.external_references {
            reference.hashes.clear();
        }
    }
    if target < SpecVersion::V1_2 {
        component.swid = None;
        component.author = None;
        component.mime_type = None;
        component.supplier = None;
    }
    if target < SpecVersion::V1_1 {
        component.bom_ref = None;
        component.external_references.clear();
        // modified was required before 1.1 extensions existed
        component.modified.get_or_insert(false);
    }
    for reference in &mut component.external_references {
        project_reference(reference, target);
    }
    for nested in &mut component.components {
        project_component(nested, target);
    }
}

fn project_service(service: &mut Service, target: SpecVersion) {
    if target < SpecVersion::V1_3 {
        service.properties.clear();
    }
    for reference in &mut service.external_references {
        project_reference(reference, target);
    }
}

fn project_reference(reference: &mut ExternalReference, target: SpecVersion) {
    if target < SpecVersion::V1_4 && reference.ref_type == ExternalReferenceType::ReleaseNotes {
        reference.ref_type = ExternalReferenceType::Other;
    }
    if target < SpecVersion::V1_3 {
        reference.hashes.clear();
    }
}

/// A software component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub component_type: ComponentType,
    /// Stable in-document reference (1.1+)
    pub bom_ref: Option<String>,
    /// IANA media type (1.2+)
    pub mime_type: Option<String>,
    /// Supplier organization (1.2+)
    pub supplier: Option<OrganizationalEntity>,
    /// Author of the component (1.2+)
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub group: Option<String>,
    pub name: String,
    /// Optional since 1.4
    pub version: Option<String>,
    pub description: Option<String>,
    pub scope: Option<Scope>,
    pub hashes: Vec<Hash>,
    pub licenses: Vec<LicenseChoice>,
    pub copyright: Option<String>,
    pub cpe: Option<String>,
    pub purl: Option<String>,
    /// SWID tag (1.2+)
    pub swid: Option<SwidTag>,
    /// Whether the component has been modified from the original (required ≤1.1)
    pub modified: Option<bool>,
    /// External references (1.1+)
    pub external_references: Vec<ExternalReference>,
    /// Nested subcomponents
    pub components: Vec<Component>,
    /// Name/value pairs (1.3+)
    pub properties: Vec<Property>,
}

impl Component {
    /// Minimal component with the fields every schema version requires.
    #[must_use]
    pub fn new(component_type: ComponentType, name: impl Into<String>) -> Self {
        Self {
            component_type,
            bom_ref: None,
            mime_type: None,
            supplier: None,
            author: None,
            publisher: None,
            group: None,
            name: name.into(),
            version: None,
            description: None,
            scope: None,
            hashes: Vec::new(),
            licenses: Vec::new(),
            copyright: None,
            cpe: None,
            purl: None,
            swid: None,
            modified: None,
            external_references: Vec::new(),
            components: Vec::new(),
            properties: Vec::new(),
        }
    }
}

/// Component classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentType {
    Application,
    Framework,
    Library,
    Container,
    OperatingSystem,
    Device,
    Firmware,
    File,
}

impl ComponentType {
    /// The wire spelling shared by the XML and JSON schemas.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ComponentType::Application => "application",
            ComponentType::Framework => "framework",
            ComponentType::Library => "library",
            ComponentType::Container => "container",
            ComponentType::OperatingSystem => "operating-system",
            ComponentType::Device => "device",
            ComponentType::Firmware => "firmware",
            ComponentType::File => "file",
        }
    }

    /// Parse the wire spelling.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        const ALL: [ComponentType; 8] = [
            ComponentType::Application,
            ComponentType::Framework,
            ComponentType::Library,
            ComponentType::Container,
            ComponentType::OperatingSystem,
            ComponentType::Device,
            ComponentType::Firmware,
            ComponentType::File,
        ];
        ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// Component scope within the described product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    Required,
    Optional,
    Excluded,
}

impl Scope {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Scope::Required => "required",
            Scope::Optional => "optional",
            Scope::Excluded => "excluded",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        [Scope::Required, Scope::Optional, Scope::Excluded]
            .into_iter()
            .find(|v| v.as_str() == s)
    }
}

/// One dependency edge set: `dependency_ref` depends on each of `depends_on`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub dependency_ref: String,
    pub depends_on: Vec<String>,
}

/// An external service the product calls (1.2+).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub bom_ref: Option<String>,
    pub provider: Option<OrganizationalEntity>,
    pub group: Option<String>,
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
    pub endpoints: Vec<String>,
    pub authenticated: Option<bool>,
    pub x_trust_boundary: Option<bool>,
    pub external_references: Vec<ExternalReference>,
    pub properties: Vec<Property>,
}

/// Completeness claim over assemblies and dependencies (1.3+).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    pub aggregate: Aggregate,
    pub assemblies: Vec<String>,
    pub dependencies: Vec<String>,
}

/// Composition completeness levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Aggregate {
    Complete,
    Incomplete,
    IncompleteFirstPartyOnly,
    IncompleteThirdPartyOnly,
    Unknown,
    NotSpecified,
}

impl Aggregate {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Aggregate::Complete => "complete",
            Aggregate::Incomplete => "incomplete",
            Aggregate::IncompleteFirstPartyOnly => "incomplete_first_party_only",
            Aggregate::IncompleteThirdPartyOnly => "incomplete_third_party_only",
            Aggregate::Unknown => "unknown",
            Aggregate::NotSpecified => "not_specified",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        const ALL: [Aggregate; 6] = [
            Aggregate::Complete,
            Aggregate::Incomplete,
            Aggregate::IncompleteFirstPartyOnly,
            Aggregate::IncompleteThirdPartyOnly,
            Aggregate::Unknown,
            Aggregate::NotSpecified,
        ];
        ALL.into_iter().find(|v| v.as_str() == s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HashAlg, Severity, Tool, VulnerabilityRating, VulnerabilitySource};

    fn sample_bom() -> Bom {
        let mut component = Component::new(ComponentType::Library, "acme-lib");
        component.version = Some("1.2.3".into());
        component.bom_ref = Some("pkg:cargo/acme-lib@1.2.3".into());
        component.purl = Some("pkg:cargo/acme-lib@1.2.3".into());
        component.properties.push(Property {
            name: "internal".into(),
            value: Some("true".into()),
        });
        component.external_references.push(ExternalReference {
            ref_type: ExternalReferenceType::ReleaseNotes,
            url: "https://acme.example/notes".into(),
            comment: None,
            hashes: vec![Hash {
                alg: HashAlg::Sha256,
                value: "ab".repeat(32),
            }],
        });

        Bom {
            serial_number: Some(
                SerialNumber::new("urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79").unwrap(),
            ),
            version: Some(1),
            metadata: Some(BomMetadata {
                timestamp: None,
                tools: vec![Tool {
                    vendor: Some("acme".into()),
                    name: Some("bomgen".into()),
                    version: Some("2.0".into()),
                    hashes: Vec::new(),
                }],
                ..BomMetadata::default()
            }),
            components: vec![component],
            services: Vec::new(),
            external_references: Vec::new(),
            dependencies: vec![Dependency {
                dependency_ref: "pkg:cargo/acme-lib@1.2.3".into(),
                depends_on: Vec::new(),
            }],
            compositions: vec![Composition {
                aggregate: Aggregate::Complete,
                assemblies: Vec::new(),
                dependencies: Vec::new(),
            }],
            vulnerabilities: vec![Vulnerability {
                id: Some("CVE-2024-0001".into()),
                source: Some(VulnerabilitySource {
                    name: Some("NVD".into()),
                    url: None,
                }),
                ratings: vec![VulnerabilityRating {
                    severity: Some(Severity::High),
                    ..VulnerabilityRating::default()
                }],
                ..Vulnerability::default()
            }],
            properties: vec![Property {
                name: "build".into(),
                value: Some("42".into()),
            }],
        }
    }

    #[test]
    fn test_project_to_same_version_is_identity() {
        let bom = sample_bom();
        assert_eq!(bom.project_to(SpecVersion::V1_4), bom);
    }

    #[test]
    fn test_project_to_1_3_drops_vulnerabilities() {
        let projected = sample_bom().project_to(SpecVersion::V1_3);
        assert!(projected.vulnerabilities.is_empty());
        // 1.3 still has properties and compositions
        assert!(!projected.properties.is_empty());
        assert!(!projected.compositions.is_empty());
        // release-notes reference type is 1.4-only
        assert_eq!(
            projected.components[0].external_references[0].ref_type,
            ExternalReferenceType::Other
        );
    }

    #[test]
    fn test_project_to_1_2_drops_properties_and_compositions() {
        let projected = sample_bom().project_to(SpecVersion::V1_2);
        assert!(projected.properties.is_empty());
        assert!(projected.compositions.is_empty());
        assert!(projected.components[0].properties.is_empty());
        assert!(projected.components[0].external_references[0].hashes.is_empty());
        // metadata and dependencies survive at 1.2
        assert!(projected.metadata.is_some());
        assert!(!projected.dependencies.is_empty());
    }

    #[test]
    fn test_project_to_1_1_drops_metadata_and_dependencies() {
        let projected = sample_bom().project_to(SpecVersion::V1_1);
        assert!(projected.metadata.is_none());
        assert!(projected.dependencies.is_empty());
        // bom-ref and external references survive at 1.1
        assert!(projected.components[0].bom_ref.is_some());
        assert!(!projected.components[0].external_references.is_empty());
    }

    #[test]
    fn test_project_to_1_0_leaves_only_components() {
        let projected = sample_bom().project_to(SpecVersion::V1_0);
        assert!(projected.components[0].bom_ref.is_none());
        assert!(projected.components[0].external_references.is_empty());
        assert_eq!(projected.components[0].modified, Some(false));
        assert_eq!(projected.components[0].name, "acme-lib");
        // identity fields always survive
        assert!(projected.serial_number.is_some());
    }
}
