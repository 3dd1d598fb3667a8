//! Global patient identity identifiers.
//!
//! A global identity links one or more locally-assigned patient identifiers to a single
//! real-world patient. The identity value itself is a UUID v4 kept in a *canonical*
//! representation: **32 lowercase hexadecimal characters** (no hyphens).
//!
//! ## Canonical UUID form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! Notes:
//! - This is the same value you would get from `Uuid::new_v4().simple().to_string()`.
//! - Canonical form is *required* for values read back from an identity index. Use
//!   [`GlobalId::parse`] to validate a stored string.
//! - Non-canonical values (uppercase, hyphenated, wrong length, non-hex) are rejected.

mod global_id;

pub use global_id::{GlobalId, Uuid};

/// Error type for UUID operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for UUID operations.
pub type UuidResult<T> = Result<T, UuidError>;
