//! Fingerprint constants.

/// Default number of hex characters kept from the SHA-256 digest.
pub const DEFAULT_FINGERPRINT_LENGTH: usize = 12;

/// Shortest truncation accepted; anything shorter collides too easily.
pub const MIN_FINGERPRINT_LENGTH: usize = 8;

/// Full SHA-256 hex digest length.
pub const MAX_FINGERPRINT_LENGTH: usize = 64;

/// Directory prefix for per-source partitions in the file-backed store.
pub const SOURCE_DIR_PREFIX: &str = "source=";
