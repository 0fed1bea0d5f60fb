//! BOM codecs: one encoder/decoder per wire format, all speaking the
//! canonical model.
//!
//! The supported `(format, schema version)` matrix:
//!
//! | Format   | 1.0 | 1.1 | 1.2 | 1.3 | 1.4 |
//! |----------|-----|-----|-----|-----|-----|
//! | XML      |  ✓  |  ✓  |  ✓  |  ✓  |  ✓  |
//! | JSON     |     |     |  ✓  |  ✓  |  ✓  |
//! | Protobuf |     |     |     |  ✓  |  ✓  |
//!
//! Requests outside the matrix fail with
//! [`RepoError::UnsupportedFormatVersion`] before any codec runs.

mod json;
mod proto;
mod xml;

pub use json::JsonCodec;
pub use proto::ProtobufCodec;
pub use xml::XmlCodec;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{RepoError, Result};
use crate::model::{Bom, SpecVersion};

/// The three CycloneDX wire formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BomFormat {
    Xml,
    Json,
    Protobuf,
}

impl BomFormat {
    /// File extension used in the on-disk layout (`bom.<ext>`).
    #[must_use]
    pub const fn file_extension(self) -> &'static str {
        match self {
            BomFormat::Xml => "xml",
            BomFormat::Json => "json",
            BomFormat::Protobuf => "cdx",
        }
    }

    /// Reverse of [`BomFormat::file_extension`].
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "xml" => Some(BomFormat::Xml),
            "json" => Some(BomFormat::Json),
            "cdx" => Some(BomFormat::Protobuf),
            _ => None,
        }
    }

    /// The canonical vendor media type for this format.
    #[must_use]
    pub const fn canonical_media_type(self) -> &'static str {
        match self {
            BomFormat::Xml => "application/vnd.cyclonedx+xml",
            BomFormat::Json => "application/vnd.cyclonedx+json",
            BomFormat::Protobuf => "application/x.vnd.cyclonedx+protobuf",
        }
    }

    /// Schema versions this format can serialize.
    #[must_use]
    pub fn supported_versions(self) -> &'static [SpecVersion] {
        codec_for(self).supported_versions()
    }

    /// Whether `(self, version)` is a populated matrix cell.
    #[must_use]
    pub fn supports(self, version: SpecVersion) -> bool {
        self.supported_versions().contains(&version)
    }

    /// The newest schema version this format supports.
    #[must_use]
    pub fn latest_version(self) -> SpecVersion {
        *self
            .supported_versions()
            .last()
            .expect("every format supports at least one version")
    }
}

impl fmt::Display for BomFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BomFormat::Xml => write!(f, "XML"),
            BomFormat::Json => write!(f, "JSON"),
            BomFormat::Protobuf => write!(f, "protobuf"),
        }
    }
}

/// A decoded document together with the schema revision it declared.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBom {
    pub bom: Bom,
    pub spec_version: SpecVersion,
}

/// Trait for format codecs.
///
/// Implementations are stateless; `decode` infers the document's own schema
/// version (specVersion field, xmlns, or protobuf `spec_version`), and
/// `encode` projects the canonical model to the requested version first.
pub trait BomCodec: Send + Sync {
    /// The wire format this codec handles
    fn format(&self) -> BomFormat;

    /// Schema versions this codec can emit and accept
    fn supported_versions(&self) -> &'static [SpecVersion];

    /// Parse bytes into the canonical model
    fn decode(&self, bytes: &[u8]) -> Result<DecodedBom>;

    /// Serialize the canonical model at the given schema version
    fn encode(&self, bom: &Bom, version: SpecVersion) -> Result<Vec<u8>>;
}

/// Look up the codec for a format.
#[must_use]
pub fn codec_for(format: BomFormat) -> &'static dyn BomCodec {
    match format {
        BomFormat::Xml => &XmlCodec,
        BomFormat::Json => &JsonCodec,
        BomFormat::Protobuf => &ProtobufCodec,
    }
}

/// Decode `bytes` as `format`, inferring the schema version from the document.
pub fn decode(format: BomFormat, bytes: &[u8]) -> Result<DecodedBom> {
    codec_for(format).decode(bytes)
}

/// Encode `bom` as `(format, version)`, failing fast on empty matrix cells.
pub fn encode(bom: &Bom, format: BomFormat, version: SpecVersion) -> Result<Vec<u8>> {
    if !format.supports(version) {
        return Err(RepoError::UnsupportedFormatVersion(format!(
            "CycloneDX {version} has no {format} serialization"
        )));
    }
    codec_for(format).encode(bom, version)
}
