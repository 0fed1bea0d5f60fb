//! Cross-format and cross-version codec tests over a fully populated BOM.

use chrono::{TimeZone, Utc};

use sbom_repo::codec::{self, BomFormat};
use sbom_repo::model::{
    Aggregate, Bom, BomMetadata, Component, ComponentType, Composition, Dependency,
    ExternalReference, ExternalReferenceType, Hash, HashAlg, License, LicenseChoice,
    OrganizationalContact, OrganizationalEntity, Property, Scope, ScoreMethod, SerialNumber,
    Service, Severity, SpecVersion, SwidTag, Tool, Vulnerability, VulnerabilityRating,
    VulnerabilitySource,
};

const SERIAL: &str = "urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79";

/// A BOM exercising every modeled field.
fn rich_bom() -> Bom {
    let mut component = Component::new(ComponentType::Library, "acme-core");
    component.bom_ref = Some("pkg:cargo/acme-core@2.1.0".into());
    component.group = Some("io.acme".into());
    component.version = Some("2.1.0".into());
    component.description = Some("core runtime".into());
    component.scope = Some(Scope::Required);
    component.author = Some("Acme Build Robot".into());
    component.publisher = Some("Acme Inc".into());
    component.copyright = Some("© Acme Inc".into());
    component.cpe = Some("cpe:2.3:a:acme:core:2.1.0:*:*:*:*:*:*:*".into());
    component.purl = Some("pkg:cargo/acme-core@2.1.0".into());
    component.mime_type = Some("application/octet-stream".into());
    component.modified = Some(false);
    component.hashes.push(Hash {
        alg: HashAlg::Sha256,
        value: "ab".repeat(32),
    });
    component.licenses.push(LicenseChoice::License(License {
        id: Some("Apache-2.0".into()),
        name: None,
        url: Some("https://www.apache.org/licenses/LICENSE-2.0".into()),
    }));
    component
        .licenses
        .push(LicenseChoice::Expression("MIT OR Apache-2.0".into()));
    component.swid = Some(SwidTag {
        tag_id: "acme-core-2.1.0".into(),
        name: "acme-core".into(),
        version: Some("2.1.0".into()),
    });
    component.external_references.push(ExternalReference {
        ref_type: ExternalReferenceType::Vcs,
        url: "https://git.acme.io/core".into(),
        comment: Some("primary repo".into()),
        hashes: Vec::new(),
    });
    component.properties.push(Property {
        name: "acme:tier".into(),
        value: Some("1".into()),
    });
    component.components.push(Component::new(
        ComponentType::File,
        "libacme.so",
    ));

    Bom {
        serial_number: Some(SerialNumber::new(SERIAL).expect("valid serial")),
        version: Some(7),
        metadata: Some(BomMetadata {
            timestamp: Some(Utc.with_ymd_and_hms(2024, 5, 4, 12, 30, 0).unwrap()),
            tools: vec![Tool {
                vendor: Some("Acme".into()),
                name: Some("bomgen".into()),
                version: Some("3.2".into()),
                hashes: Vec::new(),
            }],
            authors: vec![OrganizationalContact {
                name: Some("Release Engineering".into()),
                email: Some("releng@acme.io".into()),
                phone: None,
            }],
            component: Some(Box::new(Component::new(
                ComponentType::Application,
                "acme-suite",
            ))),
            manufacture: None,
            supplier: Some(OrganizationalEntity {
                name: Some("Acme Inc".into()),
                urls: vec!["https://acme.io".into()],
                contacts: Vec::new(),
            }),
            licenses: vec![
                LicenseChoice::Expression("Apache-2.0".into()),
                LicenseChoice::License(License {
                    id: Some("CC-BY-4.0".into()),
                    name: None,
                    url: None,
                }),
            ],
            properties: vec![Property {
                name: "pipeline".into(),
                value: Some("release".into()),
            }],
        }),
        components: vec![component],
        services: vec![Service {
            bom_ref: Some("svc-auth".into()),
            provider: Some(OrganizationalEntity {
                name: Some("Acme Cloud".into()),
                urls: Vec::new(),
                contacts: Vec::new(),
            }),
            group: None,
            name: "auth-api".into(),
            version: Some("1".into()),
            description: Some("token service".into()),
            endpoints: vec!["https://auth.acme.io/token".into()],
            authenticated: Some(true),
            x_trust_boundary: Some(true),
            external_references: Vec::new(),
            properties: Vec::new(),
        }],
        external_references: vec![ExternalReference {
            ref_type: ExternalReferenceType::Bom,
            url: "https://boms.acme.io/acme-suite".into(),
            comment: None,
            hashes: Vec::new(),
        }],
        dependencies: vec![Dependency {
            dependency_ref: "pkg:cargo/acme-core@2.1.0".into(),
            depends_on: vec!["pkg:cargo/libc@0.2".into()],
        }],
        compositions: vec![Composition {
            aggregate: Aggregate::Incomplete,
            assemblies: vec!["pkg:cargo/acme-core@2.1.0".into()],
            dependencies: Vec::new(),
        }],
        vulnerabilities: vec![Vulnerability {
            bom_ref: None,
            id: Some("CVE-2024-31337".into()),
            source: Some(VulnerabilitySource {
                name: Some("NVD".into()),
                url: Some("https://nvd.nist.gov".into()),
            }),
            ratings: vec![VulnerabilityRating {
                source: None,
                score: Some(8.1),
                severity: Some(Severity::High),
                method: Some(ScoreMethod::CvssV31),
                vector: Some("CVSS:3.1/AV:N/AC:H/PR:N/UI:N/S:U/C:H/I:H/A:H".into()),
            }],
            cwes: vec![787],
            description: Some("out of bounds write".into()),
            detail: None,
            recommendation: Some("upgrade to 2.1.1".into()),
            advisories: Vec::new(),
            created: None,
            published: Some(Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()),
            updated: None,
            affects: vec!["pkg:cargo/acme-core@2.1.0".into()],
        }],
        properties: vec![Property {
            name: "build-id".into(),
            value: Some("20240504.1".into()),
        }],
    }
}

#[test]
fn test_semantic_round_trip_every_supported_cell() {
    let bom = rich_bom();
    for format in [BomFormat::Xml, BomFormat::Json, BomFormat::Protobuf] {
        for version in format.supported_versions() {
            let encoded = codec::encode(&bom, format, *version)
                .unwrap_or_else(|e| panic!("encode {format} {version}: {e}"));
            let decoded = codec::decode(format, &encoded)
                .unwrap_or_else(|e| panic!("decode {format} {version}: {e}"));

            assert_eq!(decoded.spec_version, *version, "{format} {version}");
            assert_eq!(
                decoded.bom,
                bom.project_to(*version),
                "semantic mismatch for {format} {version}"
            );
        }
    }
}

#[test]
fn test_downgrade_then_upgrade_never_fabricates() {
    let bom = rich_bom();

    // Down to 1.0 and back up to 1.4: everything 1.0 cannot express stays gone
    let down = codec::encode(&bom, BomFormat::Xml, SpecVersion::V1_0).expect("encode 1.0");
    let parsed = codec::decode(BomFormat::Xml, &down).expect("decode 1.0");
    let up = codec::encode(&parsed.bom, BomFormat::Xml, SpecVersion::V1_4).expect("encode 1.4");
    let reparsed = codec::decode(BomFormat::Xml, &up).expect("decode 1.4");

    assert!(reparsed.bom.metadata.is_none());
    assert!(reparsed.bom.vulnerabilities.is_empty());
    assert!(reparsed.bom.dependencies.is_empty());
    assert_eq!(reparsed.bom.components[0].name, "acme-core");
    // identity survives the whole journey
    assert_eq!(
        reparsed.bom.serial_number.as_ref().map(|s| s.as_str()),
        Some(SERIAL)
    );
    assert_eq!(reparsed.bom.version, Some(7));
}

#[test]
fn test_conversion_chain_across_formats() {
    let bom = rich_bom();

    // JSON 1.4 → protobuf 1.4 → XML 1.4: common fields must survive
    let json = codec::encode(&bom, BomFormat::Json, SpecVersion::V1_4).expect("to json");
    let from_json = codec::decode(BomFormat::Json, &json).expect("from json");
    let pb = codec::encode(&from_json.bom, BomFormat::Protobuf, SpecVersion::V1_4).expect("to pb");
    let from_pb = codec::decode(BomFormat::Protobuf, &pb).expect("from pb");
    let xml = codec::encode(&from_pb.bom, BomFormat::Xml, SpecVersion::V1_4).expect("to xml");
    let from_xml = codec::decode(BomFormat::Xml, &xml).expect("from xml");

    let result = from_xml.bom;
    assert_eq!(result.components.len(), 1);
    let component = &result.components[0];
    assert_eq!(component.name, "acme-core");
    assert_eq!(component.hashes[0].alg, HashAlg::Sha256);
    assert_eq!(component.licenses.len(), 2);
    assert_eq!(component.components[0].name, "libacme.so");
    assert_eq!(result.services[0].name, "auth-api");
    assert_eq!(result.vulnerabilities[0].id.as_deref(), Some("CVE-2024-31337"));
    assert_eq!(
        result.vulnerabilities[0].ratings[0].severity,
        Some(Severity::High)
    );
    assert_eq!(result.dependencies[0].depends_on, vec!["pkg:cargo/libc@0.2"]);
}

#[test]
fn test_component_version_optional_at_1_4() {
    let mut component = Component::new(ComponentType::Library, "no-version");
    component.version = None;
    let bom = Bom {
        serial_number: Some(SerialNumber::new(SERIAL).expect("valid serial")),
        version: Some(1),
        components: vec![component],
        ..Bom::default()
    };

    let encoded = codec::encode(&bom, BomFormat::Json, SpecVersion::V1_4).expect("encode");
    let value: serde_json::Value = serde_json::from_slice(&encoded).expect("json");
    assert!(value["components"][0].get("version").is_none());
}
