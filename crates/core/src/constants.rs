//! Constants used throughout the ingest core.

/// Default root for file-backed indexes when no directory is configured.
pub const DEFAULT_DATA_DIR: &str = "lake_data";

/// Terminator hints applied when a caller declares none.
pub const DEFAULT_SEGMENT_TERMINATORS: [&str; 2] = ["\r\n", "\n"];

/// Directory under the data root holding fingerprint markers.
pub const FINGERPRINTS_DIR_NAME: &str = "fingerprints";

/// Directory under the data root holding identity links.
pub const IDENTITIES_DIR_NAME: &str = "identities";

/// Segment separator produced by the normaliser.
pub const SEGMENT_SEPARATOR: char = '\r';

/// Marker that starts every message in a batch.
pub const MESSAGE_HEADER: &str = "MSH";

/// Separator between the components of a local identifier.
pub const LOCAL_ID_SEPARATOR: char = '#';

pub const SORT_KEY_PREFIX: &str = "HL7";
pub const RAW_KEY_PREFIX: &str = "raw/hl7v2";
pub const STAGING_KEY_PREFIX: &str = "staging/hl7v2";
pub const ERROR_KEY_PREFIX: &str = "error/hl7v2";

/// Environment variable names read by binaries at startup.
pub const DATA_DIR_ENV: &str = "LAKE_DATA_DIR";
pub const SEGMENT_TERMINATORS_ENV: &str = "LAKE_SEGMENT_TERMINATORS";
pub const FINGERPRINT_LENGTH_ENV: &str = "LAKE_FINGERPRINT_LENGTH";
