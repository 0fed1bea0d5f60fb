//! Store + retention integration tests through the public API.

use std::sync::Arc;

use sbom_repo::codec::{self, BomFormat};
use sbom_repo::error::RepoError;
use sbom_repo::model::{SerialNumber, SpecVersion};
use sbom_repo::retention::{sweep, RetentionConfig};
use sbom_repo::store::FileStore;

const SERIAL_A: &str = "urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79";
const SERIAL_B: &str = "urn:uuid:deadbeef-cafe-4f00-9aaa-0123456789ab";

fn serial(value: &str) -> SerialNumber {
    SerialNumber::new(value).expect("valid serial")
}

fn json_doc(serial: &str) -> Vec<u8> {
    format!(
        r#"{{"bomFormat": "CycloneDX", "specVersion": "1.4", "serialNumber": "{serial}",
            "components": [{{"type": "library", "name": "dep", "version": "1.0"}}]}}"#
    )
    .into_bytes()
}

fn xml_doc(serial: &str) -> Vec<u8> {
    format!(
        "<?xml version=\"1.0\"?>\n<bom xmlns=\"http://cyclonedx.org/schema/bom/1.3\" \
         serialNumber=\"{serial}\" version=\"1\">\n  <components>\n    \
         <component type=\"library\">\n      <name>dep</name>\n      \
         <version>1.0</version>\n    </component>\n  </components>\n</bom>\n"
    )
    .into_bytes()
}

#[tokio::test]
async fn test_mixed_format_versions_under_one_serial() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = FileStore::open(dir.path()).await.expect("open store");
    let serial_a = serial(SERIAL_A);

    store
        .store(&serial_a, Some(1), &xml_doc(SERIAL_A), BomFormat::Xml)
        .await
        .expect("store v1");
    store
        .store(&serial_a, Some(2), &json_doc(SERIAL_A), BomFormat::Json)
        .await
        .expect("store v2");

    let v1 = store.retrieve(&serial_a, 1).await.expect("retrieve v1");
    assert_eq!(v1.format, BomFormat::Xml);
    assert_eq!(v1.spec_version, SpecVersion::V1_3);

    let v2 = store.retrieve(&serial_a, 2).await.expect("retrieve v2");
    assert_eq!(v2.format, BomFormat::Json);
    assert_eq!(v2.spec_version, SpecVersion::V1_4);

    // Both parse to the same logical content
    assert_eq!(v1.bom.components[0].name, v2.bom.components[0].name);
}

#[tokio::test]
async fn test_original_bytes_identical_for_every_format() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = FileStore::open(dir.path()).await.expect("open store");
    let serial_a = serial(SERIAL_A);

    let protobuf_bytes = {
        let decoded = codec::decode(BomFormat::Json, &json_doc(SERIAL_A)).expect("decode");
        codec::encode(&decoded.bom, BomFormat::Protobuf, SpecVersion::V1_4).expect("encode")
    };

    for (version, bytes, format) in [
        (1, xml_doc(SERIAL_A), BomFormat::Xml),
        (2, json_doc(SERIAL_A), BomFormat::Json),
        (3, protobuf_bytes, BomFormat::Protobuf),
    ] {
        store
            .store(&serial_a, Some(version), &bytes, format)
            .await
            .expect("store");
        let original = store
            .retrieve_original(&serial_a, version)
            .await
            .expect("retrieve original");
        assert_eq!(original.bytes, bytes, "bytes must be identical for {format}");
        assert_eq!(original.format, format);
    }
}

#[tokio::test]
async fn test_version_gaps_are_preserved_and_sorted() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = FileStore::open(dir.path()).await.expect("open store");
    let serial_a = serial(SERIAL_A);

    for version in [5, 1, 3] {
        store
            .store(&serial_a, Some(version), &json_doc(SERIAL_A), BomFormat::Json)
            .await
            .expect("store");
    }
    store.delete(&serial_a, 3).await.expect("delete");

    assert_eq!(store.list(&serial_a).await.expect("list"), vec![1, 5]);
    let latest = store.retrieve_latest(&serial_a).await.expect("latest");
    assert_eq!(latest.version, 5);
}

#[tokio::test]
async fn test_concurrent_auto_versioning_no_duplicates() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = Arc::new(FileStore::open(dir.path()).await.expect("open store"));
    let serial_a = serial(SERIAL_A);

    let mut handles = Vec::new();
    for _ in 0..6 {
        let store = Arc::clone(&store);
        let serial_a = serial_a.clone();
        handles.push(tokio::spawn(async move {
            store
                .store(&serial_a, None, &json_doc(SERIAL_A), BomFormat::Json)
                .await
        }));
    }

    let mut versions = Vec::new();
    for handle in handles {
        versions.push(
            handle
                .await
                .expect("join")
                .expect("auto-versioned store should retry past collisions")
                .version,
        );
    }
    versions.sort_unstable();
    assert_eq!(versions, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(store.list(&serial_a).await.expect("list"), vec![1, 2, 3, 4, 5, 6]);
}

#[tokio::test]
async fn test_retention_bound_holds_across_serials() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = FileStore::open(dir.path()).await.expect("open store");
    let serial_a = serial(SERIAL_A);
    let serial_b = serial(SERIAL_B);

    for _ in 0..5 {
        store
            .store(&serial_a, None, &json_doc(SERIAL_A), BomFormat::Json)
            .await
            .expect("store a");
    }
    for _ in 0..2 {
        store
            .store(&serial_b, None, &json_doc(SERIAL_B), BomFormat::Json)
            .await
            .expect("store b");
    }

    let config = RetentionConfig {
        max_versions: Some(3),
        ..RetentionConfig::default()
    };
    let stats = sweep(&store, &config).await.expect("sweep");
    assert_eq!(stats.deleted_entries, 2);

    // Every serial has <= 3 versions and at least one
    for s in store.list_all().await.expect("list_all") {
        let versions = store.list(&s).await.expect("list");
        assert!(!versions.is_empty());
        assert!(versions.len() <= 3);
    }
    assert_eq!(store.list(&serial_a).await.expect("list"), vec![3, 4, 5]);
    assert_eq!(store.list(&serial_b).await.expect("list"), vec![1, 2]);
}

#[tokio::test]
async fn test_store_rejects_explicit_version_zero() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = FileStore::open(dir.path()).await.expect("open store");

    let err = store
        .store(&serial(SERIAL_A), Some(0), &json_doc(SERIAL_A), BomFormat::Json)
        .await
        .expect_err("version 0 must be rejected");
    assert!(matches!(err, RepoError::InvalidVersion { .. }));
}

#[tokio::test]
async fn test_exists_tracks_lifecycle() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = FileStore::open(dir.path()).await.expect("open store");
    let serial_a = serial(SERIAL_A);

    assert!(!store.exists(&serial_a, 1).await.expect("exists"));
    store
        .store(&serial_a, Some(1), &json_doc(SERIAL_A), BomFormat::Json)
        .await
        .expect("store");
    assert!(store.exists(&serial_a, 1).await.expect("exists"));
    store.delete_all(&serial_a).await.expect("delete");
    assert!(!store.exists(&serial_a, 1).await.expect("exists"));
}
