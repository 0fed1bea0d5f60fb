//! **Repository server for CycloneDX Software Bills of Materials.**
//!
//! `sbom-repo` accepts BOM documents over HTTP in three interchangeable
//! serializations (XML, JSON, and a protobuf encoding) across CycloneDX
//! schema versions 1.0–1.4, persists them in a content-addressed filesystem
//! layout keyed by `(serialNumber, version)`, and serves them back with
//! on-the-fly format and schema-version conversion. The exact bytes of every
//! submission are retained so clients that need byte-identical retrieval
//! (signature verification, attestation) can recover them.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: the canonical, schema-version-agnostic BOM
//!   representation every codec speaks, plus [`model::Bom::project_to`], the
//!   pure projection that implements schema downgrades.
//! - **[`codec`]**: one encoder/decoder per wire format over the supported
//!   `(format, version)` matrix; unsupported cells fail fast.
//! - **[`store`]**: the filesystem store. Writes stage into a private
//!   `.tmp` namespace and commit with an atomic directory rename, which is
//!   the only publication point; collisions surface as `AlreadyExists`.
//! - **[`negotiate`]**: maps `Accept`/`Content-Type` headers onto concrete
//!   encodings, including the generic media-type aliases.
//! - **[`retention`]**: background sweeper enforcing per-serial version
//!   caps and age limits, and reaping abandoned staging directories.
//! - **[`service`]**: long-lived owner of store + sweeper with
//!   repository-wide metadata.
//! - **[`server`]**: the axum HTTP layer.
//!
//! ## Storing and fetching a BOM
//!
//! ```no_run
//! use sbom_repo::codec::BomFormat;
//! use sbom_repo::model::SerialNumber;
//! use sbom_repo::store::FileStore;
//!
//! # async fn example() -> sbom_repo::error::Result<()> {
//! let store = FileStore::open("/var/lib/sbom-repo").await?;
//! let serial = SerialNumber::new("urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79")?;
//!
//! let bytes = std::fs::read("app.cdx.json")?;
//! let receipt = store.store(&serial, None, &bytes, BomFormat::Json).await?;
//! println!("stored as version {}", receipt.version);
//!
//! let entry = store.retrieve_latest(&serial).await?;
//! println!("{} components", entry.bom.components.len());
//! # Ok(())
//! # }
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // # Errors / # Panics sections are aspirational across the public API
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    // wire-struct conversion functions are inherently long
    clippy::too_many_lines
)]

pub mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod negotiate;
pub mod retention;
pub mod server;
pub mod service;
pub mod store;

// Re-export main types for convenience
pub use codec::{BomCodec, BomFormat, DecodedBom};
pub use config::{AllowedMethods, AppConfig};
pub use error::{RepoError, Result};
pub use model::{Bom, Component, SerialNumber, SpecVersion};
pub use negotiate::{negotiate_accept, negotiate_content_type, Negotiated};
pub use retention::{RetentionConfig, SweepStats};
pub use server::{router, AppState};
pub use service::RepoService;
pub use store::{FileStore, StoredEntry};
