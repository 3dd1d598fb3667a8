//! Catalog and object keys for staged and rejected messages.

use crate::constants::{ERROR_KEY_PREFIX, RAW_KEY_PREFIX, SORT_KEY_PREFIX, STAGING_KEY_PREFIX};
use crate::mapping::{Mapping, MappingValue};
use serde::Serialize;

/// Keys under which a staged message is filed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogKeys {
    /// `HL7_<structure>_<timestamp>`, orders catalog entries by message type then time.
    pub sort_key: String,
    pub raw_key: String,
    pub staging_key: String,
}

impl CatalogKeys {
    pub fn new(structure: &str, timestamp: &str, control_id: &str) -> Self {
        let stem = format!("{}_{}_{}", structure, timestamp, control_id);
        Self {
            sort_key: format!("{}_{}_{}", SORT_KEY_PREFIX, structure, timestamp),
            raw_key: format!("{}/{}.txt", RAW_KEY_PREFIX, stem),
            staging_key: format!("{}/{}.json", STAGING_KEY_PREFIX, stem),
        }
    }
}

/// Key for a rejected message: `error/hl7v2/<version>_<event>_<control id>.txt`.
pub fn error_key(version: &str, event: &str, control_id: &str) -> String {
    format!(
        "{}/{}_{}_{}.txt",
        ERROR_KEY_PREFIX, version, event, control_id
    )
}

/// Message timestamp, `MSH.MSH_7.TS_1`.
pub fn header_timestamp(mapping: &Mapping) -> Option<&str> {
    mapping
        .get_path(&["MSH", "MSH_7", "TS_1"])
        .and_then(MappingValue::as_text)
}
