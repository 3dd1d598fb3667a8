use er7::{Er7Error, NodeKind};
use lake_fingerprint::{Fingerprint, FingerprintError, SourceId};

/// Reasons a payload or message could not be read as HL7 v2 text.
#[derive(Debug, thiserror::Error)]
pub enum MalformedInput {
    #[error(transparent)]
    Grammar(#[from] Er7Error),
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not valid {0}")]
    Encoding(&'static str),
    #[error("unsupported character encoding '{0}'")]
    UnknownEncoding(String),
    #[error("missing header value {0}")]
    MissingHeaderValue(&'static str),
}

/// Failures raised by identity index backends.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("invalid root directory: {0}")]
    InvalidRootDirectory(String),
    #[error("identity index I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to (de)serialise identity record: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("identity record is invalid: {0}")]
    InvalidRecord(String),
    #[error("identity index lock poisoned")]
    Poisoned,
}

pub type IndexResult<T> = std::result::Result<T, IndexError>;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("malformed input: {0}")]
    MalformedInput(#[from] MalformedInput),

    #[error("{kind} with value {value} not found in this version of HL7")]
    UnsupportedElement { kind: NodeKind, value: String },

    #[error("duplicate submission from {source_id}: fingerprint {fingerprint} already accepted")]
    DuplicateSubmission {
        source_id: SourceId,
        fingerprint: Fingerprint,
    },

    #[error("failed to resolve identity for {local_id}: {source}")]
    IdentityLinkFailure {
        local_id: String,
        #[source]
        source: IndexError,
    },

    #[error("fingerprint store error: {0}")]
    FingerprintStore(#[from] FingerprintError),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<Er7Error> for IngestError {
    fn from(err: Er7Error) -> Self {
        IngestError::MalformedInput(MalformedInput::Grammar(err))
    }
}

impl IngestError {
    /// Stable tag used when filing a rejected payload.
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::MalformedInput(_) => "malformed_input",
            IngestError::UnsupportedElement { .. } => "unsupported_element",
            IngestError::DuplicateSubmission { .. } => "duplicate_submission",
            IngestError::IdentityLinkFailure { .. } => "identity_link_failure",
            IngestError::FingerprintStore(_) => "fingerprint_store_failure",
            IngestError::Configuration(_) => "configuration",
        }
    }

    /// Store and index failures can be retried; everything else is terminal for the payload.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            IngestError::IdentityLinkFailure { .. } | IngestError::FingerprintStore(_)
        )
    }
}

pub type IngestResult<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_element_message() {
        let err = IngestError::UnsupportedElement {
            kind: NodeKind::Segment,
            value: "ZPD|1".into(),
        };
        assert_eq!(
            err.to_string(),
            "segment with value ZPD|1 not found in this version of HL7"
        );
        assert_eq!(err.kind(), "unsupported_element");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_grammar_error_is_malformed_input() {
        let err: IngestError = Er7Error::EmptyMessage.into();
        assert_eq!(err.kind(), "malformed_input");
    }

    #[test]
    fn test_link_failure_is_retryable() {
        let err = IngestError::IdentityLinkFailure {
            local_id: "AUTH#MR#123".into(),
            source: IndexError::Poisoned,
        };
        assert_eq!(err.kind(), "identity_link_failure");
        assert!(err.is_retryable());
        assert!(std::error::Error::source(&err).is_some());
    }
}
