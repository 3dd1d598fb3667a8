//! Validated identifiers shared across the ingest crates.

/// Errors raised when validating a source name.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    #[error("Source name cannot be blank")]
    Empty,

    #[error("Source name contains a forbidden character: {0:?}")]
    ForbiddenCharacter(char),
}

/// Characters a submission source name may not contain.
///
/// Source names end up as path segments and key prefixes in the downstream stores.
const FORBIDDEN_SOURCE_CHARS: &[char] = &['/', '\\', '=', '&', '\r', '\n'];

/// The authorised writer a payload was submitted by.
///
/// Fingerprint uniqueness is scoped per source, so the same payload from two different
/// sources is never a duplicate. A `SourceId` is trimmed, non-blank and free of path and key
/// separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(String);

impl SourceId {
    /// Creates a validated source identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] for blank input, or [`TextError::ForbiddenCharacter`]
    /// if the name contains a separator character.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let name = input.as_ref().trim();
        if name.is_empty() {
            return Err(TextError::Empty);
        }
        match name.chars().find(|c| FORBIDDEN_SOURCE_CHARS.contains(c)) {
            Some(c) => Err(TextError::ForbiddenCharacter(c)),
            None => Ok(Self(name.to_owned())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for SourceId {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceId::new(s)
    }
}

impl serde::Serialize for SourceId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for SourceId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        SourceId::new(raw).map_err(serde::de::Error::custom)
    }
}
