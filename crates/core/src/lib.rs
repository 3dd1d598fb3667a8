//! # Lake Core
//!
//! Ingest core for HL7 v2 (ER7) messages.
//!
//! A submission flows through the pipeline below. Each stage is its own module and can be used
//! on its own:
//!
//! - [`dedup`]: reject payloads already accepted from the same source
//! - [`decode`]: base64 payload and character set decoding
//! - [`normalize`]: rewrite segment terminators to `\r`
//! - [`split`]: split a batch into individual messages
//! - [`transform`]: turn an `er7` parse tree into a nested [`Mapping`]
//! - [`identifiers`]: pull local patient identifiers out of the mapping
//! - [`identity`]: resolve local identifiers to a [`GlobalId`]
//! - [`catalog`]: keys under which staged and rejected messages are filed
//!
//! [`service::IngestService`] wires the stages together.
//!
//! **No transport concerns**: reading files, HTTP endpoints and object storage belong in the
//! binaries that use this crate.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod decode;
pub mod dedup;
pub mod error;
pub mod identifiers;
pub mod identity;
pub mod mapping;
pub mod normalize;
pub mod service;
pub mod split;
pub mod transform;

pub use catalog::{error_key, header_timestamp, CatalogKeys};
pub use config::IngestConfig;
pub use decode::{decode_payload, Encoding};
pub use dedup::DedupGuard;
pub use error::{IndexError, IndexResult, IngestError, IngestResult, MalformedInput};
pub use identifiers::{extract_local_identifiers, LocalIdentifier};
pub use identity::{
    FileIdentityIndex, GlobalIdentity, IdentityIndex, IdentityResolver, InMemoryIdentityIndex,
};
pub use mapping::{Mapping, MappingValue};
pub use normalize::normalize_terminators;
pub use service::{IngestService, Rejection, StagedMessage, Submission};
pub use split::split_messages;
pub use transform::message_to_mapping;

pub use lake_fingerprint::{
    FileFingerprintStore, Fingerprint, FingerprintError, FingerprintStore, InMemoryFingerprintStore,
    SourceId,
};
pub use lake_uuid::GlobalId;
