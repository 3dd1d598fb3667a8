//! HL7 v2 ER7 grammar support.
//!
//! This crate turns a single ER7 message (segments separated by `\r`) into a typed parse tree.
//! It is the boundary between raw pipe-and-hat text and the structural mapping done in
//! `lake-core`: this crate knows *what* exists in a given HL7 version, the core only decides
//! *how* to lay it out.
//!
//! The grammar is table-driven and intentionally partial. It covers the segments and data types
//! the ingest pipeline reads for versions 2.3 through 2.5.1. Elements that the declared version
//! does not define are still produced, but without a name, so callers can reject the message
//! instead of silently mis-structuring it.
//!
//! Tree shape:
//!
//! ```text
//! ParsedMessage (ADT_A01, 2.5)
//! ├── MSH          segment   (max 1)
//! │   ├── MSH_1    field     leaf "|"
//! │   ├── MSH_7    field     branch
//! │   │   └── TS_1 component leaf "20200101"
//! │   └── ...
//! └── PID          segment   (max 1)
//!     └── PID_3    field     branch (max unbounded)
//!         ├── CX_1 component leaf "123"
//!         └── CX_4 component leaf "AUTH"
//! ```

mod delimiters;
mod node;
mod parser;
mod tables;
mod version;

pub use delimiters::Delimiters;
pub use node::{LeafValue, NodeContent, NodeKind, ParseNode, ParsedMessage, Primitive, Repetitions};
pub use version::Version;

use thiserror::Error;

/// The only legal segment separator in ER7.
pub const SEGMENT_SEPARATOR: char = '\r';

/// Segment id that starts every message.
pub const HEADER_SEGMENT: &str = "MSH";

/// Errors returned when text does not lexically match the ER7 structure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Er7Error {
    #[error("message is empty")]
    EmptyMessage,

    #[error("first segment must be MSH, found '{0}'")]
    MissingHeader(String),

    #[error("invalid MSH delimiters: {0}")]
    InvalidDelimiters(String),

    #[error("missing required header field {0}")]
    MissingField(&'static str),

    #[error("unsupported HL7 version '{0}'")]
    UnsupportedVersion(String),
}

/// Parse one ER7 message into a typed tree.
///
/// `text` must already use `\r` as its only segment separator.
///
/// # Errors
///
/// Returns [`Er7Error`] if the text is empty, does not start with an `MSH` segment, declares
/// invalid delimiters, or declares a version this grammar has no tables for.
pub fn parse_message(text: &str) -> Result<ParsedMessage, Er7Error> {
    parser::parse(text)
}
