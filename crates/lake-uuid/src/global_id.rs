//! Implementation of the canonical global identity type.

use crate::{UuidError, UuidResult};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// A cross-system patient identity (32 lowercase hex characters, no hyphens).
///
/// This wrapper guarantees that once constructed, the contained UUID is in canonical
/// format, so identities compare and index consistently no matter which backend they
/// were read from.
///
/// # Construction
/// - [`GlobalId::new`] generates a fresh identity for a patient seen for the first time.
/// - [`GlobalId::parse`] validates a value read back from an identity index.
///
/// # Display format
/// When displayed or serialised, `GlobalId` always produces the canonical
/// 32-character lowercase hex format without hyphens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlobalId(Uuid);

impl Default for GlobalId {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalId {
    /// Generates a new random identity (RFC 4122 version 4).
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses an identity string that must already be canonical.
    ///
    /// This does **not** normalise other common UUID forms (hyphenated or uppercase).
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not in canonical form.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidInput(format!(
                "UUID must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| UuidError::InvalidInput(format!("invalid UUID '{}': {}", input, e)))
    }

    /// Returns the underlying `uuid::Uuid`.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` is in canonical form.
    ///
    /// A purely syntactic check: exactly 32 bytes of `0-9` / `a-f`.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for GlobalId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GlobalId::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for GlobalId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for GlobalId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        GlobalId::parse(&s).map_err(serde::de::Error::custom)
    }
}
