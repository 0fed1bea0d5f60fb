//! End-to-end tests for the HTTP surface.
//!
//! Builds a real router over a temp-dir store and drives it with
//! `tower::ServiceExt::oneshot`, covering the store-and-fetch, conversion,
//! original-bytes, validation, gating, and collision scenarios.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use sbom_repo::config::AllowedMethods;
use sbom_repo::server::{router, AppState};
use sbom_repo::service::RepoService;
use sbom_repo::store::FileStore;

const SERIAL: &str = "urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79";

const XML_BOM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bom xmlns="http://cyclonedx.org/schema/bom/1.4" serialNumber="urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79" version="1">
  <components>
    <component type="library">
      <name>acme-lib</name>
      <version>1.2.3</version>
      <purl>pkg:generic/acme-lib@1.2.3</purl>
    </component>
  </components>
</bom>"#;

fn json_bom(version_field: Option<u32>) -> String {
    let version = version_field
        .map(|v| format!("\"version\": {v},"))
        .unwrap_or_default();
    format!(
        r#"{{
  "bomFormat": "CycloneDX",
  "specVersion": "1.4",
  "serialNumber": "{SERIAL}",
  {version}
  "components": [
    {{"type": "library", "name": "acme-lib", "version": "1.2.3"}}
  ],
  "vulnerabilities": [
    {{"id": "CVE-2024-0001", "source": {{"name": "NVD"}}}}
  ]
}}"#
    )
}

/// All methods enabled, fresh store.
async fn test_app() -> (axum::Router, tempfile::TempDir) {
    app_with(AllowedMethods {
        get: true,
        post: true,
        delete: true,
    })
    .await
}

async fn app_with(allowed_methods: AllowedMethods) -> (axum::Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = FileStore::open(dir.path()).await.expect("open store");
    let service = RepoService::new(store);
    let app = router(AppState {
        service,
        allowed_methods,
    });
    (app, dir)
}

async fn body_bytes(body: Body) -> Vec<u8> {
    body.collect().await.expect("collect body").to_bytes().to_vec()
}

fn post_request(content_type: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/bom")
        .header(header::CONTENT_TYPE, content_type)
        .body(body.into())
        .expect("build request")
}

fn get_request(uri: &str, accept: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(accept) = accept {
        builder = builder.header(header::ACCEPT, accept);
    }
    builder.body(Body::empty()).expect("build request")
}

// ---------------------------------------------------------------
// Health
// ---------------------------------------------------------------

#[tokio::test]
async fn test_health() {
    let (app, _dir) = test_app().await;
    let resp = app
        .oneshot(get_request("/health", None))
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::OK);
}

// ---------------------------------------------------------------
// S1: XML store-and-fetch
// ---------------------------------------------------------------

#[tokio::test]
async fn test_xml_store_and_fetch() {
    let (app, _dir) = test_app().await;

    let resp = app
        .clone()
        .oneshot(post_request(
            "application/vnd.cyclonedx+xml; version=1.4",
            XML_BOM,
        ))
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let location = resp.headers()[header::LOCATION].to_str().expect("location");
    assert_eq!(
        location,
        "/bom?serialNumber=urn%3Auuid%3A3e671687-395b-41f5-a30f-a58921a69b79&version=1"
    );

    let resp = app
        .oneshot(get_request(
            location,
            Some("application/vnd.cyclonedx+xml; version=1.4"),
        ))
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "application/vnd.cyclonedx+xml; version=1.4"
    );

    let body = body_bytes(resp.into_body()).await;
    let text = String::from_utf8(body).expect("utf-8 body");
    assert!(text.contains("acme-lib"));
    assert!(text.contains(SERIAL));
    assert!(text.contains("http://cyclonedx.org/schema/bom/1.4"));
}

// ---------------------------------------------------------------
// S2: format conversion with downgrade
// ---------------------------------------------------------------

#[tokio::test]
async fn test_json_to_xml_downgrade() {
    let (app, _dir) = test_app().await;

    let resp = app
        .clone()
        .oneshot(post_request(
            "application/vnd.cyclonedx+json; version=1.4",
            json_bom(Some(1)),
        ))
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let uri = format!("/bom?serialNumber={}", urlencoded_serial());
    let resp = app
        .oneshot(get_request(
            &uri,
            Some("application/vnd.cyclonedx+xml; version=1.3"),
        ))
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "application/vnd.cyclonedx+xml; version=1.3"
    );

    let text = String::from_utf8(body_bytes(resp.into_body()).await).expect("utf-8");
    assert!(text.contains("http://cyclonedx.org/schema/bom/1.3"));
    assert!(text.contains("acme-lib"));
    // vulnerabilities are a 1.4 feature and must be projected away
    assert!(!text.contains("CVE-2024-0001"));
}

// ---------------------------------------------------------------
// S3: original bytes preserved
// ---------------------------------------------------------------

#[tokio::test]
async fn test_original_bytes_round_trip() {
    let (app, _dir) = test_app().await;

    // Deliberately odd whitespace that a re-encode would normalize away
    let quirky = XML_BOM.replace("<name>acme-lib</name>", "<name>acme-lib</name>    \n\n");
    let resp = app
        .clone()
        .oneshot(post_request(
            "application/vnd.cyclonedx+xml; version=1.4",
            quirky.clone(),
        ))
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let uri = format!("/bom?serialNumber={}&original=true", urlencoded_serial());
    let resp = app
        .oneshot(get_request(&uri, None))
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "application/vnd.cyclonedx+xml; version=1.4"
    );
    assert_eq!(body_bytes(resp.into_body()).await, quirky.into_bytes());
}

// ---------------------------------------------------------------
// S4: invalid serial numbers
// ---------------------------------------------------------------

#[tokio::test]
async fn test_truncated_serial_is_rejected() {
    let (app, _dir) = test_app().await;

    // One hex digit short
    let body = XML_BOM.replace(SERIAL, "urn:uuid:3e671687-395b-41f5-a30f-a58921a69b7");
    let resp = app
        .oneshot(post_request(
            "application/vnd.cyclonedx+xml; version=1.4",
            body,
        ))
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_rejects_bad_serial_and_version() {
    let (app, _dir) = test_app().await;

    let resp = app
        .clone()
        .oneshot(get_request("/bom?serialNumber=not-a-urn", None))
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let uri = format!("/bom?serialNumber={}&version=0", urlencoded_serial());
    let resp = app
        .clone()
        .oneshot(get_request(&uri, None))
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let uri = format!("/bom?serialNumber={}&version=two", urlencoded_serial());
    let resp = app
        .oneshot(get_request(&uri, None))
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------
// S5: method gating
// ---------------------------------------------------------------

#[tokio::test]
async fn test_disabled_post_is_405_with_allow() {
    let (app, _dir) = app_with(AllowedMethods {
        get: true,
        post: false,
        delete: false,
    })
    .await;

    let resp = app
        .oneshot(post_request(
            "application/vnd.cyclonedx+xml; version=1.4",
            XML_BOM,
        ))
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.headers()[header::ALLOW], "GET");
}

#[tokio::test]
async fn test_disabled_delete_is_405() {
    let (app, _dir) = app_with(AllowedMethods {
        get: true,
        post: true,
        delete: false,
    })
    .await;

    let uri = format!("/bom?serialNumber={}", urlencoded_serial());
    let resp = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.headers()[header::ALLOW], "GET, POST");
}

// ---------------------------------------------------------------
// S6: collision
// ---------------------------------------------------------------

#[tokio::test]
async fn test_duplicate_store_conflicts() {
    let (app, _dir) = test_app().await;

    let first = app
        .clone()
        .oneshot(post_request(
            "application/vnd.cyclonedx+xml; version=1.4",
            XML_BOM,
        ))
        .await
        .expect("send request");
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .clone()
        .oneshot(post_request(
            "application/vnd.cyclonedx+xml; version=1.4",
            XML_BOM,
        ))
        .await
        .expect("send request");
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------
// Version auto-assignment over HTTP
// ---------------------------------------------------------------

#[tokio::test]
async fn test_versionless_posts_count_up() {
    let (app, _dir) = test_app().await;

    for expected in 1..=3 {
        let resp = app
            .clone()
            .oneshot(post_request(
                "application/vnd.cyclonedx+json; version=1.4",
                json_bom(None),
            ))
            .await
            .expect("send request");
        assert_eq!(resp.status(), StatusCode::CREATED);
        let location = resp.headers()[header::LOCATION].to_str().expect("location");
        assert!(
            location.ends_with(&format!("&version={expected}")),
            "location {location} should end with version {expected}"
        );
    }
}

// ---------------------------------------------------------------
// Negotiation behavior
// ---------------------------------------------------------------

#[tokio::test]
async fn test_absent_accept_defaults_to_xml() {
    let (app, _dir) = test_app().await;

    app.clone()
        .oneshot(post_request(
            "application/vnd.cyclonedx+json; version=1.4",
            json_bom(Some(1)),
        ))
        .await
        .expect("send request");

    let uri = format!("/bom?serialNumber={}", urlencoded_serial());
    let resp = app
        .oneshot(get_request(&uri, None))
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "application/vnd.cyclonedx+xml; version=1.4"
    );
}

#[tokio::test]
async fn test_generic_alias_echoed_in_response() {
    let (app, _dir) = test_app().await;

    app.clone()
        .oneshot(post_request(
            "application/vnd.cyclonedx+json; version=1.4",
            json_bom(Some(1)),
        ))
        .await
        .expect("send request");

    let uri = format!("/bom?serialNumber={}", urlencoded_serial());
    let resp = app
        .oneshot(get_request(&uri, Some("text/xml")))
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/xml; version=1.4");
}

#[tokio::test]
async fn test_unacceptable_accept_is_406() {
    let (app, _dir) = test_app().await;
    let uri = format!("/bom?serialNumber={}", urlencoded_serial());
    let resp = app
        .oneshot(get_request(&uri, Some("text/html")))
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::NOT_ACCEPTABLE);
}

#[tokio::test]
async fn test_unknown_content_type_is_415() {
    let (app, _dir) = test_app().await;
    let resp = app
        .oneshot(post_request("text/plain", XML_BOM))
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_undecodable_body_is_400() {
    let (app, _dir) = test_app().await;
    let resp = app
        .oneshot(post_request(
            "application/vnd.cyclonedx+json; version=1.4",
            "{definitely not json",
        ))
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------
// Protobuf path, including the octet-stream alias
// ---------------------------------------------------------------

#[tokio::test]
async fn test_protobuf_store_and_fetch() {
    use sbom_repo::codec::{self, BomFormat};
    use sbom_repo::model::{Bom, Component, ComponentType, SerialNumber, SpecVersion};

    let (app, _dir) = test_app().await;

    let mut component = Component::new(ComponentType::Library, "zlib");
    component.version = Some("1.3.1".into());
    let bom = Bom {
        serial_number: Some(SerialNumber::new(SERIAL).expect("valid serial")),
        version: Some(1),
        components: vec![component],
        ..Bom::default()
    };
    let payload = codec::encode(&bom, BomFormat::Protobuf, SpecVersion::V1_4).expect("encode");

    let resp = app
        .clone()
        .oneshot(post_request("application/octet-stream", payload))
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let uri = format!("/bom?serialNumber={}", urlencoded_serial());
    let resp = app
        .oneshot(get_request(
            &uri,
            Some("application/x.vnd.cyclonedx+protobuf; version=1.4"),
        ))
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "application/x.vnd.cyclonedx+protobuf; version=1.4"
    );

    let body = body_bytes(resp.into_body()).await;
    let decoded = codec::decode(BomFormat::Protobuf, &body).expect("decode");
    assert_eq!(decoded.bom.components[0].name, "zlib");
}

// ---------------------------------------------------------------
// DELETE semantics
// ---------------------------------------------------------------

#[tokio::test]
async fn test_delete_one_version_then_404() {
    let (app, _dir) = test_app().await;

    app.clone()
        .oneshot(post_request(
            "application/vnd.cyclonedx+json; version=1.4",
            json_bom(Some(1)),
        ))
        .await
        .expect("send request");

    let uri = format!("/bom?serialNumber={}&version=1", urlencoded_serial());
    let delete = |app: axum::Router, uri: String| async move {
        app.oneshot(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("send request")
    };

    let resp = delete(app.clone(), uri.clone()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // The entry is gone now
    let resp = delete(app.clone(), uri.clone()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app
        .oneshot(get_request(&uri, None))
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_versionless_delete_of_unknown_serial_is_204() {
    let (app, _dir) = test_app().await;
    let uri = format!("/bom?serialNumber={}", urlencoded_serial());
    let resp = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_get_unknown_serial_is_404() {
    let (app, _dir) = test_app().await;
    let uri = format!("/bom?serialNumber={}", urlencoded_serial());
    let resp = app
        .oneshot(get_request(&uri, None))
        .await
        .expect("send request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

fn urlencoded_serial() -> &'static str {
    "urn%3Auuid%3A3e671687-395b-41f5-a30f-a58921a69b79"
}
