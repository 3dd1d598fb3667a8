//! Submission payload decoding.
//!
//! Real-time submissions carry the message base64 encoded, together with the character set the
//! sender used. Only the two character sets seen in HL7 v2 feeds are supported.

use crate::error::MalformedInput;
use base64::{engine::general_purpose, Engine as _};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    /// ISO-8859-1. Every byte maps to the code point of the same value.
    Latin1,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Latin1 => "iso-8859-1",
        }
    }

    /// Decode raw bytes to text.
    pub fn decode(&self, bytes: Vec<u8>) -> Result<String, MalformedInput> {
        match self {
            Encoding::Utf8 => {
                String::from_utf8(bytes).map_err(|_| MalformedInput::Encoding(self.as_str()))
            }
            Encoding::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = MalformedInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "iso-8859-1" | "iso8859-1" | "latin-1" | "latin1" => Ok(Encoding::Latin1),
            other => Err(MalformedInput::UnknownEncoding(other.to_string())),
        }
    }
}

/// Decode a base64 payload into text using `encoding`.
///
/// Surrounding whitespace in `encoded` is ignored.
///
/// # Errors
///
/// Returns [`MalformedInput`] if `encoded` is not valid base64 or the bytes are not valid in
/// `encoding`.
pub fn decode_payload(encoded: &str, encoding: Encoding) -> Result<String, MalformedInput> {
    let bytes = general_purpose::STANDARD.decode(encoded.trim())?;
    encoding.decode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_names() {
        assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("latin-1".parse::<Encoding>().unwrap(), Encoding::Latin1);
        assert_eq!("ISO-8859-1".parse::<Encoding>().unwrap(), Encoding::Latin1);
        assert!(matches!(
            "ebcdic".parse::<Encoding>(),
            Err(MalformedInput::UnknownEncoding(_))
        ));
    }

    #[test]
    fn test_decode_utf8() {
        let encoded = general_purpose::STANDARD.encode("MSH|^~\\&|Zoë");
        assert_eq!(
            decode_payload(&encoded, Encoding::Utf8).unwrap(),
            "MSH|^~\\&|Zoë"
        );
    }

    #[test]
    fn test_decode_latin1() {
        let encoded = general_purpose::STANDARD.encode([b'Z', b'o', 0xEB]);
        assert_eq!(decode_payload(&encoded, Encoding::Latin1).unwrap(), "Zoë");
    }

    #[test]
    fn test_invalid_utf8() {
        let encoded = general_purpose::STANDARD.encode([b'Z', b'o', 0xEB]);
        assert!(matches!(
            decode_payload(&encoded, Encoding::Utf8),
            Err(MalformedInput::Encoding("utf-8"))
        ));
    }

    #[test]
    fn test_invalid_base64() {
        assert!(matches!(
            decode_payload("not base64!", Encoding::Utf8),
            Err(MalformedInput::Base64(_))
        ));
    }
}
