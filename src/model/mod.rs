//! Canonical object model for CycloneDX BOMs.
//!
//! Every wire format (XML, JSON, protobuf) decodes into these structures and
//! encodes back out of them. The model itself is schema-version-agnostic: it
//! carries the union of fields across CycloneDX 1.0–1.4, and
//! [`Bom::project_to`] drops whatever a target schema version does not know
//! about before an encoder runs.

mod bom;
mod metadata;
mod serial;
mod spec_version;
mod vulnerability;

pub use bom::*;
pub use metadata::*;
pub use serial::*;
pub use spec_version::*;
pub use vulnerability::*;
