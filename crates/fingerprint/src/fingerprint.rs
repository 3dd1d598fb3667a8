//! Truncated SHA-256 payload fingerprints.

use crate::{FingerprintError, FingerprintResult, MAX_FINGERPRINT_LENGTH, MIN_FINGERPRINT_LENGTH};
use sha2::{Digest, Sha256};
use std::fmt;

/// A fixed-length, lowercase hex, truncated SHA-256 digest of a raw payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Computes the fingerprint of `payload`, keeping the first `length` hex characters.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError::InvalidLength`] if `length` is outside
    /// [`MIN_FINGERPRINT_LENGTH`]..=[`MAX_FINGERPRINT_LENGTH`].
    pub fn compute(payload: &[u8], length: usize) -> FingerprintResult<Self> {
        Self::check_length(length)?;

        let digest = Sha256::digest(payload);
        let mut hex_digest = hex::encode(digest);
        hex_digest.truncate(length);
        Ok(Self(hex_digest))
    }

    /// Validates a fingerprint string previously produced by [`Fingerprint::compute`].
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError::InvalidFingerprint`] if the input is not lowercase hex of a
    /// supported length.
    pub fn parse(input: &str) -> FingerprintResult<Self> {
        let valid_length = (MIN_FINGERPRINT_LENGTH..=MAX_FINGERPRINT_LENGTH).contains(&input.len());
        let valid_chars = input
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if !valid_length || !valid_chars {
            return Err(FingerprintError::InvalidFingerprint(input.to_string()));
        }
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two-character shard used by file-backed stores.
    pub(crate) fn shard(&self) -> &str {
        &self.0[0..2]
    }

    pub(crate) fn check_length(length: usize) -> FingerprintResult<()> {
        if (MIN_FINGERPRINT_LENGTH..=MAX_FINGERPRINT_LENGTH).contains(&length) {
            Ok(())
        } else {
            Err(FingerprintError::InvalidLength(length))
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Fingerprint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Fingerprint::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_FINGERPRINT_LENGTH;

    #[test]
    fn test_compute_known_digest() {
        // sha256("abc") = ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad
        let fp = Fingerprint::compute(b"abc", DEFAULT_FINGERPRINT_LENGTH).unwrap();
        assert_eq!(fp.as_str(), "ba7816bf8f01");

        let full = Fingerprint::compute(b"abc", MAX_FINGERPRINT_LENGTH).unwrap();
        assert_eq!(
            full.as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_compute_is_deterministic() {
        let a = Fingerprint::compute(b"MSH|^~\\&|A", 12).unwrap();
        let b = Fingerprint::compute(b"MSH|^~\\&|A", 12).unwrap();
        let c = Fingerprint::compute(b"MSH|^~\\&|B", 12).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_compute_rejects_bad_length() {
        assert!(matches!(
            Fingerprint::compute(b"abc", 4),
            Err(FingerprintError::InvalidLength(4))
        ));
        assert!(matches!(
            Fingerprint::compute(b"abc", 65),
            Err(FingerprintError::InvalidLength(65))
        ));
    }

    #[test]
    fn test_parse_validates() {
        assert!(Fingerprint::parse("ba7816bf8f01").is_ok());
        assert!(Fingerprint::parse("BA7816BF8F01").is_err());
        assert!(Fingerprint::parse("ba78").is_err());
        assert!(Fingerprint::parse("../../etc/pw").is_err());
    }

    #[test]
    fn test_shard_is_prefix() {
        let fp = Fingerprint::parse("abcdef123456").unwrap();
        assert_eq!(fp.shard(), "ab");
    }
}
