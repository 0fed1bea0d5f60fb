//! Request handlers for the `/bom` endpoint family.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::info;

use super::{ApiError, AppState};
use crate::codec;
use crate::error::RepoError;
use crate::model::SerialNumber;
use crate::negotiate::{self, response_content_type};
use crate::store::escape_serial;

/// Query parameters shared by GET and DELETE.
///
/// `version` is accepted as a raw string so non-numeric values map to the
/// repository's own `InvalidVersion` error instead of a generic extractor
/// rejection.
#[derive(Debug, Deserialize)]
pub(super) struct BomQuery {
    #[serde(rename = "serialNumber")]
    serial_number: Option<String>,
    version: Option<String>,
    original: Option<String>,
}

impl BomQuery {
    fn serial(&self) -> Result<SerialNumber, RepoError> {
        let raw = self.serial_number.as_deref().ok_or_else(|| {
            RepoError::invalid_serial("", "serialNumber query parameter is required")
        })?;
        SerialNumber::new(raw)
    }

    fn version(&self) -> Result<Option<u32>, RepoError> {
        match self.version.as_deref() {
            None => Ok(None),
            Some(raw) => match raw.parse::<u32>() {
                Ok(v) if v >= 1 => Ok(Some(v)),
                _ => Err(RepoError::InvalidVersion {
                    value: raw.to_string(),
                }),
            },
        }
    }

    fn wants_original(&self) -> bool {
        matches!(self.original.as_deref(), Some("true") | Some("1"))
    }
}

/// Liveness probe.
pub(super) async fn health() -> &'static str {
    "OK"
}

/// GET `/bom?serialNumber=…[&version=…][&original=true]`
pub(super) async fn get_bom(
    State(state): State<AppState>,
    Query(query): Query<BomQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if !state.allowed_methods.get {
        return Err(ApiError::serve(RepoError::MethodNotAllowed {
            allowed: state.allowed_methods.allow_header(),
        }));
    }

    let serial = query.serial().map_err(ApiError::serve)?;
    let version = query.version().map_err(ApiError::serve)?;
    let store = state.service.store();

    if query.wants_original() {
        let version = match version {
            Some(v) => v,
            None => store
                .latest_version(&serial)
                .await
                .map_err(ApiError::serve)?
                .ok_or_else(|| ApiError::serve(RepoError::not_found(serial.to_string(), None)))?,
        };
        let original = store
            .retrieve_original(&serial, version)
            .await
            .map_err(ApiError::serve)?;
        // The response still carries a version parameter, taken from the
        // document itself since the bytes pass through untouched.
        let decoded = codec::decode(original.format, &original.bytes).map_err(ApiError::serve)?;
        let content_type = response_content_type(original.format, decoded.spec_version, None);
        return Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type)],
            original.bytes,
        )
            .into_response());
    }

    let accept = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok());
    let negotiated = negotiate::negotiate_accept(accept).map_err(ApiError::serve)?;

    let entry = match version {
        Some(v) => store.retrieve(&serial, v).await,
        None => store.retrieve_latest(&serial).await,
    }
    .map_err(ApiError::serve)?;

    let body = codec::encode(&entry.bom, negotiated.format, negotiated.spec_version)
        .map_err(ApiError::serve)?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, negotiated.content_type)],
        body,
    )
        .into_response())
}

/// POST `/bom` — store the body under the serial number it declares.
pub(super) async fn post_bom(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    if !state.allowed_methods.post {
        return Err(ApiError::ingest(RepoError::MethodNotAllowed {
            allowed: state.allowed_methods.allow_header(),
        }));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let declared = negotiate::negotiate_content_type(content_type).map_err(ApiError::ingest)?;

    let decoded = codec::decode(declared.format, &body).map_err(ApiError::ingest)?;
    let serial = decoded.bom.serial_number.clone().ok_or_else(|| {
        ApiError::ingest(RepoError::invalid_serial(
            "",
            "BOM document carries no serialNumber",
        ))
    })?;

    let receipt = state
        .service
        .store()
        .store(&serial, decoded.bom.version, &body, declared.format)
        .await
        .map_err(ApiError::ingest)?;
    state
        .service
        .record_ingest(declared.format, decoded.spec_version)
        .await;

    info!(
        serial = %serial,
        version = receipt.version,
        format = %declared.format,
        spec_version = %decoded.spec_version,
        "stored BOM"
    );

    let location = format!(
        "/bom?serialNumber={}&version={}",
        escape_serial(&serial),
        receipt.version
    );
    Ok((StatusCode::CREATED, [(header::LOCATION, location)]).into_response())
}

/// DELETE `/bom?serialNumber=…[&version=…]`
pub(super) async fn delete_bom(
    State(state): State<AppState>,
    Query(query): Query<BomQuery>,
) -> Result<Response, ApiError> {
    if !state.allowed_methods.delete {
        return Err(ApiError::serve(RepoError::MethodNotAllowed {
            allowed: state.allowed_methods.allow_header(),
        }));
    }

    let serial = query.serial().map_err(ApiError::serve)?;
    let version = query.version().map_err(ApiError::serve)?;
    let store = state.service.store();

    match version {
        // Deleting a specific missing version is 404
        Some(v) => store.delete(&serial, v).await.map_err(ApiError::serve)?,
        // Versionless delete is idempotent: unknown serials are fine
        None => store.delete_all(&serial).await.map_err(ApiError::serve)?,
    }

    Ok(StatusCode::NO_CONTENT.into_response())
}
