//! HTTP media-type negotiation for BOM requests.
//!
//! Maps `Accept` and `Content-Type` headers onto a concrete
//! `(format, schema version)` pair from the supported matrix. Media types
//! are parsed as `(type, subtype, parameters)` triples via [`mime`];
//! parameter names are matched case-insensitively while the `version`
//! value is case-sensitive.

use mime::Mime;

use crate::codec::BomFormat;
use crate::error::{RepoError, Result};
use crate::model::SpecVersion;

/// Generic aliases accepted on input alongside the canonical vendor types.
const XML_ALIASES: &[&str] = &["text/xml", "application/xml"];
const JSON_ALIASES: &[&str] = &["application/json"];
const PROTOBUF_ALIASES: &[&str] = &["application/octet-stream"];

/// Outcome of `Accept` negotiation: what to encode and the exact
/// `Content-Type` value to answer with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiated {
    pub format: BomFormat,
    pub spec_version: SpecVersion,
    /// Full response header value, e.g.
    /// `application/vnd.cyclonedx+xml; version=1.4`. Echoes the client's
    /// generic alias when one was used.
    pub content_type: String,
}

/// Outcome of `Content-Type` parsing on ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredContentType {
    pub format: BomFormat,
    /// Schema version pinned by the `version` parameter, if present
    pub version: Option<SpecVersion>,
}

/// Resolve a wire format from a parsed media type, or `None` for types the
/// repository does not serve.
fn format_for(mime: &Mime) -> Option<BomFormat> {
    let essence = mime.essence_str();
    if essence == BomFormat::Xml.canonical_media_type() || XML_ALIASES.contains(&essence) {
        Some(BomFormat::Xml)
    } else if essence == BomFormat::Json.canonical_media_type() || JSON_ALIASES.contains(&essence) {
        Some(BomFormat::Json)
    } else if essence == BomFormat::Protobuf.canonical_media_type()
        || PROTOBUF_ALIASES.contains(&essence)
    {
        Some(BomFormat::Protobuf)
    } else {
        None
    }
}

/// Build the response `Content-Type` header value.
///
/// The canonical vendor type is used unless the client asked with a generic
/// alias, which is echoed back; either way a `version` parameter reflects
/// the schema version actually served.
#[must_use]
pub fn response_content_type(
    format: BomFormat,
    version: SpecVersion,
    requested: Option<&Mime>,
) -> String {
    let media_type = match requested.map(Mime::essence_str) {
        Some(essence)
            if XML_ALIASES.contains(&essence)
                || JSON_ALIASES.contains(&essence)
                || PROTOBUF_ALIASES.contains(&essence) =>
        {
            essence.to_string()
        }
        _ => format.canonical_media_type().to_string(),
    };
    format!("{media_type}; version={version}")
}

/// One parsed `Accept` entry with its quality factor.
#[derive(Debug)]
struct AcceptEntry {
    mime: Mime,
    quality: f32,
}

fn parse_accept(header: &str) -> Vec<AcceptEntry> {
    let mut entries: Vec<AcceptEntry> = header
        .split(',')
        .filter_map(|part| {
            let mime: Mime = part.trim().parse().ok()?;
            let quality = mime
                .get_param("q")
                .and_then(|q| q.as_str().parse::<f32>().ok())
                .unwrap_or(1.0);
            Some(AcceptEntry { mime, quality })
        })
        .collect();
    // Stable sort keeps the client's ordering among equal qualities
    entries.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap_or(std::cmp::Ordering::Equal));
    entries
}

/// Select the response encoding for a GET request.
///
/// Entries are tried in quality-factor order; the first whose
/// `(format, version)` pair lands on a populated matrix cell wins. A
/// missing header and bare `*/*` both fall back to XML at the newest schema
/// version. Failure means `406 Not Acceptable`.
pub fn negotiate_accept(header: Option<&str>) -> Result<Negotiated> {
    let Some(header) = header.map(str::trim).filter(|h| !h.is_empty()) else {
        return Ok(default_negotiated());
    };

    for entry in parse_accept(header) {
        if entry.mime.type_() == mime::STAR {
            return Ok(default_negotiated());
        }
        let Some(format) = format_for(&entry.mime) else {
            continue;
        };
        let spec_version = match entry.mime.get_param("version") {
            Some(value) => match value.as_str().parse::<SpecVersion>() {
                Ok(v) => v,
                // An unknown version pins this entry to an empty cell
                Err(_) => continue,
            },
            None => format.latest_version(),
        };
        if !format.supports(spec_version) {
            continue;
        }
        return Ok(Negotiated {
            format,
            spec_version,
            content_type: response_content_type(format, spec_version, Some(&entry.mime)),
        });
    }

    Err(RepoError::UnsupportedFormatVersion(format!(
        "no supported representation satisfies Accept: {header}"
    )))
}

fn default_negotiated() -> Negotiated {
    let format = BomFormat::Xml;
    let version = format.latest_version();
    Negotiated {
        format,
        spec_version: version,
        content_type: response_content_type(format, version, None),
    }
}

/// Parse the `Content-Type` of a POST body. Failure means
/// `415 Unsupported Media Type`.
pub fn negotiate_content_type(header: Option<&str>) -> Result<DeclaredContentType> {
    let header = header.map(str::trim).filter(|h| !h.is_empty()).ok_or_else(|| {
        RepoError::UnsupportedFormatVersion("request carries no Content-Type".to_string())
    })?;

    let mime: Mime = header.parse().map_err(|_| {
        RepoError::UnsupportedFormatVersion(format!("unparseable Content-Type: {header}"))
    })?;
    let format = format_for(&mime).ok_or_else(|| {
        RepoError::UnsupportedFormatVersion(format!(
            "unrecognized media type {}",
            mime.essence_str()
        ))
    })?;

    let version = match mime.get_param("version") {
        Some(value) => {
            let version = value.as_str().parse::<SpecVersion>().map_err(|_| {
                RepoError::UnsupportedFormatVersion(format!(
                    "unknown schema version {:?}",
                    value.as_str()
                ))
            })?;
            if !format.supports(version) {
                return Err(RepoError::UnsupportedFormatVersion(format!(
                    "CycloneDX {version} has no {format} serialization"
                )));
            }
            Some(version)
        }
        None => None,
    };

    Ok(DeclaredContentType { format, version })
}
