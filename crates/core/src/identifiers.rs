//! Local patient identifier extraction.
//!
//! A local identifier is the triple `assigning authority # identifier type # id value`, read from
//! the `CX` components of `PID-2` (legacy external id) and `PID-3` (patient identifier list).

use crate::constants::LOCAL_ID_SEPARATOR;
use crate::mapping::{Mapping, MappingValue};
use serde::{Deserialize, Serialize};
use std::fmt;

const IDENTIFIER_FIELDS: [&str; 2] = ["PID_2", "PID_3"];

/// `AUTH#MR#123`: assigning authority, identifier type code and id value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalIdentifier(String);

impl LocalIdentifier {
    /// Join the three parts; blank parts become empty strings.
    pub fn from_parts(assigning_authority: &str, type_code: &str, id_value: &str) -> Self {
        let part = |value: &str| {
            if value.trim().is_empty() {
                String::new()
            } else {
                value.to_string()
            }
        };
        Self(format!(
            "{}{sep}{}{sep}{}",
            part(assigning_authority),
            part(type_code),
            part(id_value),
            sep = LOCAL_ID_SEPARATOR
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when all three parts are empty (`##`).
    pub fn is_blank(&self) -> bool {
        self.0.chars().all(|c| c == LOCAL_ID_SEPARATOR)
    }
}

impl fmt::Display for LocalIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pull candidate local identifiers out of a message mapping.
///
/// Reads `PID.PID_2` then every entry of `PID.PID_3`, in that order. Either field may be a
/// single object or a list. A missing segment or field contributes nothing; identifiers whose
/// three parts are all blank are dropped, since linking them would merge unrelated patients.
pub fn extract_local_identifiers(mapping: &Mapping) -> Vec<LocalIdentifier> {
    let Some(pid) = mapping.get("PID") else {
        return Vec::new();
    };

    let mut identifiers = Vec::new();

    for segment in pid.objects() {
        for field in IDENTIFIER_FIELDS {
            let Some(value) = segment.get(field) else {
                continue;
            };
            for cx in value.objects() {
                let identifier = LocalIdentifier::from_parts(
                    component(cx, "CX_4"),
                    component(cx, "CX_5"),
                    component(cx, "CX_1"),
                );
                if identifier.is_blank() {
                    tracing::debug!("skipping blank identifier in {}", field);
                    continue;
                }
                identifiers.push(identifier);
            }
        }
    }

    identifiers
}

fn component<'a>(cx: &'a Mapping, name: &str) -> &'a str {
    cx.get(name).and_then(MappingValue::as_text).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::message_to_mapping;
    use er7::parse_message;

    fn mapping_for(pid: &str) -> Mapping {
        let text = format!(
            "MSH|^~\\&|A|B|C|D|20200101||ADT^A01|MSG1|P|2.5\r{}",
            pid
        );
        message_to_mapping(&parse_message(&text).unwrap()).unwrap()
    }

    fn ids(values: &[&str]) -> Vec<LocalIdentifier> {
        values
            .iter()
            .map(|v| LocalIdentifier(v.to_string()))
            .collect()
    }

    #[test]
    fn test_scenario_identifier() {
        let mapping = mapping_for("PID|1||123^^^AUTH^MR");
        assert_eq!(extract_local_identifiers(&mapping), ids(&["AUTH#MR#123"]));
    }

    #[test]
    fn test_external_id_comes_first() {
        let mapping = mapping_for("PID|1|999^^^AUTH2^SS|123^^^AUTH^MR~456^^^AUTH^NH");
        assert_eq!(
            extract_local_identifiers(&mapping),
            ids(&["AUTH2#SS#999", "AUTH#MR#123", "AUTH#NH#456"])
        );
    }

    #[test]
    fn test_missing_components_are_empty() {
        let mapping = mapping_for("PID|1||123");
        assert_eq!(extract_local_identifiers(&mapping), ids(&["##123"]));

        let mapping = mapping_for("PID|1||^^^AUTH");
        assert_eq!(extract_local_identifiers(&mapping), ids(&["AUTH##"]));
    }

    #[test]
    fn test_missing_segment_or_fields() {
        let no_pid = mapping_for("EVN|A01|20200101");
        assert!(extract_local_identifiers(&no_pid).is_empty());

        let no_ids = mapping_for("PID|1");
        assert!(extract_local_identifiers(&no_ids).is_empty());

        assert!(extract_local_identifiers(&Mapping::new()).is_empty());
    }

    #[test]
    fn test_blank_identifier_dropped() {
        let mut cx = Mapping::new();
        cx.insert("CX_1", MappingValue::Text("  ".into()));
        let mut pid = Mapping::new();
        pid.insert("PID_3", MappingValue::Object(cx));
        let mut root = Mapping::new();
        root.insert("PID", MappingValue::Object(pid));

        assert!(extract_local_identifiers(&root).is_empty());
    }

    #[test]
    fn test_object_shaped_identifier_list() {
        let mut cx = Mapping::new();
        cx.insert("CX_1", MappingValue::Text("123".into()));
        cx.insert("CX_4", MappingValue::Text("AUTH".into()));
        cx.insert("CX_5", MappingValue::Text("MR".into()));
        let mut pid = Mapping::new();
        pid.insert("PID_3", MappingValue::Object(cx));
        let mut root = Mapping::new();
        root.insert("PID", MappingValue::Object(pid));

        assert_eq!(extract_local_identifiers(&root), ids(&["AUTH#MR#123"]));
    }

    #[test]
    fn test_from_parts() {
        assert_eq!(LocalIdentifier::from_parts("A", "", "1").as_str(), "A##1");
        assert_eq!(LocalIdentifier::from_parts(" ", " ", " ").as_str(), "##");
        assert!(LocalIdentifier::from_parts("", "", "").is_blank());
    }
}
