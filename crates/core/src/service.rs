//! Ingest service.
//!
//! Orchestrates one submission end to end:
//!
//! ```text
//! dedup check -> decode -> normalise -> parse -> mapping -> identifiers -> identity -> keys
//!                                                                                   |
//!                                                          reserve fingerprint <----+
//! ```
//!
//! The fingerprint is reserved only once everything else has succeeded, so a failed payload can
//! be resubmitted after the cause is fixed.

use crate::catalog::{error_key, header_timestamp, CatalogKeys};
use crate::config::IngestConfig;
use crate::dedup::DedupGuard;
use crate::decode::{decode_payload, Encoding};
use crate::error::MalformedInput;
use crate::identifiers::{extract_local_identifiers, LocalIdentifier};
use crate::identity::{GlobalIdentity, IdentityIndex, IdentityResolver};
use crate::mapping::Mapping;
use crate::normalize::normalize_terminators;
use crate::split::split_messages;
use crate::transform::message_to_mapping;
use crate::{IngestError, IngestResult};
use chrono::{DateTime, Utc};
use lake_fingerprint::{Fingerprint, FingerprintStore, SourceId};
use serde::{Deserialize, Serialize};

/// Real-time submission envelope: `{ "msg": <base64>, "encoding": "utf-8", "segTerm": [...] }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub msg: String,
    pub encoding: String,
    #[serde(rename = "segTerm", default, skip_serializing_if = "Option::is_none")]
    pub seg_term: Option<Vec<String>>,
}

/// A message that made it through the pipeline, ready to be filed.
#[derive(Clone, Debug, Serialize)]
pub struct StagedMessage {
    pub control_id: String,
    pub structure: String,
    pub version: String,
    pub event: String,
    pub fingerprint: Fingerprint,
    pub identity: GlobalIdentity,
    pub local_ids: Vec<LocalIdentifier>,
    pub keys: CatalogKeys,
    pub received_at: DateTime<Utc>,
    pub mapping: Mapping,
}

/// A message that was not staged, with everything needed to file it for follow-up.
#[derive(Debug)]
pub struct Rejection {
    pub error: IngestError,
    /// `None` when the header could not be read far enough to name the message.
    pub error_key: Option<String>,
    /// `*** <error> ***\r<message text>`
    pub body: String,
}

impl Rejection {
    pub fn kind(&self) -> &'static str {
        self.error.kind()
    }
}

pub struct IngestService<I, S> {
    config: IngestConfig,
    guard: DedupGuard<S>,
    resolver: IdentityResolver<I>,
}

impl<I: IdentityIndex, S: FingerprintStore> IngestService<I, S> {
    /// Creates a new ingest service over the given identity index and fingerprint store.
    pub fn new(config: IngestConfig, index: I, store: S) -> Self {
        let guard = DedupGuard::new(store, config.fingerprint_length());
        Self {
            config,
            guard,
            resolver: IdentityResolver::new(index),
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn resolver(&self) -> &IdentityResolver<I> {
        &self.resolver
    }

    pub fn guard(&self) -> &DedupGuard<S> {
        &self.guard
    }

    /// Ingest a single real-time submission.
    ///
    /// The fingerprint covers `submission.msg` exactly as received. Terminators are rewritten
    /// only when the submission declares them in `segTerm`; without it the decoded text is used
    /// as sent, apart from empty-segment removal.
    ///
    /// # Errors
    ///
    /// - [`IngestError::DuplicateSubmission`] if the same payload was already accepted from `source`
    /// - [`IngestError::MalformedInput`] if the payload cannot be decoded or parsed
    /// - [`IngestError::UnsupportedElement`] if the message uses elements its version lacks
    /// - [`IngestError::IdentityLinkFailure`] or [`IngestError::FingerprintStore`] on storage failure
    pub fn ingest(&self, source: &SourceId, submission: &Submission) -> IngestResult<StagedMessage> {
        let fingerprint = self
            .guard
            .check_and_accept(source, submission.msg.as_bytes())?;

        let encoding: Encoding = submission.encoding.parse()?;
        let text = decode_payload(&submission.msg, encoding)?;

        let hints: &[String] = submission.seg_term.as_deref().unwrap_or(&[]);
        let message = normalize_terminators(&text, hints);

        let staged = self.stage(&message, fingerprint)?;
        self.guard.reserve(source, &staged.fingerprint)?;

        tracing::info!(
            "Message {} from {} staged as {}",
            staged.control_id,
            source,
            staged.keys.staging_key
        );
        Ok(staged)
    }

    /// Ingest a batch of concatenated messages.
    ///
    /// Each message is fingerprinted, processed and reserved on its own; one bad message does
    /// not affect the others. Results are returned in input order.
    pub fn ingest_batch(
        &self,
        source: &SourceId,
        text: &str,
        hints: Option<&[String]>,
    ) -> Vec<Result<StagedMessage, Rejection>> {
        let normalized = self.normalize_batch(text, hints);

        let results: Vec<_> = split_messages(&normalized)
            .map(|message| {
                self.ingest_message(source, &message)
                    .map_err(|error| self.rejection(&message, error))
            })
            .collect();

        let staged = results.iter().filter(|r| r.is_ok()).count();
        tracing::info!(
            "Batch from {}: {} staged, {} rejected",
            source,
            staged,
            results.len() - staged
        );
        results
    }

    /// Fingerprint [`IngestService::ingest`] records for `submission`.
    pub fn submission_fingerprint(&self, submission: &Submission) -> IngestResult<Fingerprint> {
        self.guard.fingerprint(submission.msg.as_bytes())
    }

    /// Fingerprints [`IngestService::ingest_batch`] records for `text`, one per message.
    pub fn batch_fingerprints(
        &self,
        text: &str,
        hints: Option<&[String]>,
    ) -> IngestResult<Vec<Fingerprint>> {
        let normalized = self.normalize_batch(text, hints);
        split_messages(&normalized)
            .map(|message| self.guard.fingerprint(message.as_bytes()))
            .collect()
    }

    /// Package `error` for filing alongside the message text that caused it.
    pub fn rejection(&self, message: &str, error: IngestError) -> Rejection {
        tracing::error!("{}", error);

        let error_key = er7::parse_message(message).ok().and_then(|parsed| {
            parsed.control_id().map(|control_id| {
                error_key(
                    parsed.version().as_str(),
                    parsed.structure(),
                    control_id,
                )
            })
        });

        Rejection {
            body: format!("*** {} ***\r{}", error, message),
            error_key,
            error,
        }
    }

    /// Batches fall back to the configured hints when the caller declares none.
    fn normalize_batch(&self, text: &str, hints: Option<&[String]>) -> String {
        let hints = hints.unwrap_or(self.config.segment_terminators());
        normalize_terminators(text, hints)
    }

    fn ingest_message(&self, source: &SourceId, message: &str) -> IngestResult<StagedMessage> {
        let fingerprint = self.guard.check_and_accept(source, message.as_bytes())?;
        let staged = self.stage(message, fingerprint)?;
        self.guard.reserve(source, &staged.fingerprint)?;
        Ok(staged)
    }

    /// Parse, map and resolve one normalised message.
    fn stage(&self, message: &str, fingerprint: Fingerprint) -> IngestResult<StagedMessage> {
        let parsed = er7::parse_message(message)?;
        let control_id = parsed
            .control_id()
            .ok_or(MalformedInput::MissingHeaderValue("MSH_10"))?
            .to_string();
        tracing::info!("Parsed message {} to ER7", control_id);

        let mapping = message_to_mapping(&parsed)?;
        let timestamp = header_timestamp(&mapping)
            .ok_or(MalformedInput::MissingHeaderValue("MSH_7"))?
            .to_string();
        tracing::debug!("Record built for {}", control_id);

        let local_ids = extract_local_identifiers(&mapping);
        let identity = self.resolver.resolve(&local_ids)?;

        let structure = parsed.structure().to_string();
        let keys = CatalogKeys::new(&structure, &timestamp, &control_id);

        Ok(StagedMessage {
            control_id,
            event: structure.clone(),
            structure,
            version: parsed.version().to_string(),
            fingerprint,
            identity,
            local_ids,
            keys,
            received_at: Utc::now(),
            mapping,
        })
    }
}
