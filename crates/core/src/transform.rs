//! Parse tree to mapping transformation.
//!
//! Walks the grammar's parse tree depth-first and builds a [`Mapping`] keyed by each element's
//! short grammar name (`PID`, `PID_3`, `CX_1`, ...). Whether a branch becomes an object or a
//! list is decided by the grammar's declared cardinality, never by how many occurrences happen
//! to be present in one message; a repeatable field with a single value is still a list. This
//! keeps every message of a given type on the same shape for downstream queries.

use crate::mapping::{Mapping, MappingValue};
use crate::{IngestError, IngestResult};
use er7::{LeafValue, NodeContent, ParseNode, ParsedMessage};

/// Build the mapping for a whole message.
///
/// # Errors
///
/// Returns [`IngestError::UnsupportedElement`] if any element in the tree has no name for the
/// message's declared version. No partial mapping is returned.
pub fn message_to_mapping(message: &ParsedMessage) -> IngestResult<Mapping> {
    let mut mapping = Mapping::new();
    for segment in message.segments() {
        add_node(&mut mapping, segment)?;
    }
    Ok(mapping)
}

/// Add `node` (and everything below it) to `parent`.
///
/// # Arguments
///
/// * `parent` - Mapping that receives the node's key.
/// * `node` - Parse tree node to add.
///
/// # Errors
///
/// Returns [`IngestError::UnsupportedElement`] carrying the node kind and raw text of the
/// first unnamed element found.
pub fn add_node(parent: &mut Mapping, node: &ParseNode) -> IngestResult<()> {
    let Some(name) = node.name() else {
        tracing::error!(
            "{} with value {} not found in this version of HL7",
            node.kind(),
            node.raw()
        );
        return Err(IngestError::UnsupportedElement {
            kind: node.kind(),
            value: node.raw().to_string(),
        });
    };

    tracing::debug!("adding {} {}", node.kind(), name);

    match node.content() {
        NodeContent::Leaf(value) => {
            // Quoted nulls ("") arrive as typed primitives and must be kept, not dropped.
            let text = match value {
                LeafValue::Text(text) => text.clone(),
                LeafValue::Primitive(primitive) => primitive.value.clone(),
            };
            parent.insert(name, MappingValue::Text(text));
        }
        NodeContent::Branch(children) => {
            let mut child = Mapping::new();
            for grandchild in children {
                add_node(&mut child, grandchild)?;
            }

            if node.max_repetitions().is_single() {
                parent.insert(name, MappingValue::Object(child));
            } else {
                parent.push_to_list(name, child);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use er7::{parse_message, NodeKind, Primitive, Repetitions};

    const SINGLE: Repetitions = Repetitions::Bounded(1);

    fn component(name: &'static str, value: &str) -> ParseNode {
        ParseNode::leaf(
            Some(name),
            NodeKind::Component,
            SINGLE,
            LeafValue::Text(value.into()),
        )
    }

    fn text(value: &str) -> MappingValue {
        MappingValue::Text(value.into())
    }

    #[test]
    fn test_scenario_message() {
        let message =
            parse_message("MSH|^~\\&|A|B|C|D|20200101||ADT^A01|MSG1|P|2.3\rPID|1||123^^^AUTH^MR")
                .unwrap();
        let mapping = message_to_mapping(&message).unwrap();

        assert_eq!(
            mapping.to_json_line().unwrap(),
            concat!(
                r#"{"MSH":{"MSH_1":"|","MSH_2":"^~\\&","MSH_3":{"HD_1":"A"},"MSH_4":{"HD_1":"B"},"#,
                r#""MSH_5":{"HD_1":"C"},"MSH_6":{"HD_1":"D"},"MSH_7":{"TS_1":"20200101"},"#,
                r#""MSH_9":{"MSG_1":"ADT","MSG_2":"A01"},"MSH_10":"MSG1","MSH_11":{"PT_1":"P"},"#,
                r#""MSH_12":{"VID_1":"2.3"}},"#,
                r#""PID":{"PID_1":"1","PID_3":[{"CX_1":"123","CX_4":"AUTH","CX_5":"MR"}]}}"#
            )
        );
    }

    #[test]
    fn test_single_cardinality_never_lists() {
        let field = ParseNode::branch(
            Some("PID_2"),
            NodeKind::Field,
            SINGLE,
            "999^^^AUTH2^SS",
            vec![component("CX_1", "999"), component("CX_4", "AUTH2")],
        );
        let mut mapping = Mapping::new();
        add_node(&mut mapping, &field).unwrap();

        let value = mapping.get("PID_2").unwrap();
        assert!(value.as_object().is_some());
        assert_eq!(
            value.as_object().unwrap().get("CX_4"),
            Some(&text("AUTH2"))
        );
    }

    #[test]
    fn test_single_cardinality_last_write_wins() {
        let first = ParseNode::branch(
            Some("PID_2"),
            NodeKind::Field,
            SINGLE,
            "1",
            vec![component("CX_1", "1")],
        );
        let second = ParseNode::branch(
            Some("PID_2"),
            NodeKind::Field,
            SINGLE,
            "2",
            vec![component("CX_1", "2")],
        );
        let mut mapping = Mapping::new();
        add_node(&mut mapping, &first).unwrap();
        add_node(&mut mapping, &second).unwrap();

        assert_eq!(mapping.len(), 1);
        assert_eq!(
            mapping.get_path(&["PID_2", "CX_1"]),
            Some(&text("2"))
        );
    }

    #[test]
    fn test_repeatable_siblings_accumulate() {
        let message = parse_message(
            "MSH|^~\\&|A|B|C|D|20200101||ADT^A01|MSG1|P|2.5\rPID|1||1^^^A^MR~2^^^B^NH\rNTE|1||one\rNTE|2||two",
        )
        .unwrap();
        let mapping = message_to_mapping(&message).unwrap();

        let pid_3 = mapping
            .get_path(&["PID", "PID_3"])
            .and_then(|v| v.as_list())
            .unwrap();
        assert_eq!(pid_3.len(), 2);
        assert_eq!(pid_3[1].get("CX_4"), Some(&text("B")));

        let notes = mapping.get("NTE").and_then(|v| v.as_list()).unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(
            notes[0].get("NTE_3").and_then(|v| v.as_list()),
            None,
            "primitive repeatable fields are stored directly"
        );
        assert_eq!(notes[1].get("NTE_3"), Some(&text("two")));
    }

    #[test]
    fn test_repeatable_with_one_occurrence_is_list() {
        let message =
            parse_message("MSH|^~\\&|A|B|C|D|20200101||ADT^A01|MSG1|P|2.3\rPID|1||123^^^AUTH^MR")
                .unwrap();
        let mapping = message_to_mapping(&message).unwrap();

        let pid_3 = mapping.get_path(&["PID", "PID_3"]).unwrap();
        assert_eq!(pid_3.as_list().map(|l| l.len()), Some(1));
    }

    #[test]
    fn test_primitive_wrapper_is_unwrapped() {
        let node = ParseNode::leaf(
            Some("PID_8"),
            NodeKind::Field,
            SINGLE,
            LeafValue::Primitive(Primitive {
                datatype: "IS",
                value: "\"\"".into(),
            }),
        );
        let mut mapping = Mapping::new();
        add_node(&mut mapping, &node).unwrap();

        assert_eq!(mapping.get("PID_8"), Some(&text("\"\"")));
    }

    #[test]
    fn test_unsupported_segment_rejects_message() {
        let message = parse_message(
            "MSH|^~\\&|A|B|C|D|20200101||ADT^A01|MSG1|P|2.3\rPID|1||123^^^AUTH^MR\rZPD|1|x",
        )
        .unwrap();
        let result = message_to_mapping(&message);

        match result {
            Err(IngestError::UnsupportedElement { kind, value }) => {
                assert_eq!(kind, NodeKind::Segment);
                assert_eq!(value, "ZPD|1|x");
            }
            other => panic!("expected UnsupportedElement, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_nested_element_rejects_message() {
        let field = ParseNode::branch(
            Some("PID_3"),
            NodeKind::Field,
            Repetitions::Unbounded,
            "1^^^A^MR^^X",
            vec![
                component("CX_1", "1"),
                ParseNode::leaf(
                    None,
                    NodeKind::Component,
                    SINGLE,
                    LeafValue::Text("X".into()),
                ),
            ],
        );
        let mut mapping = Mapping::new();
        let result = add_node(&mut mapping, &field);

        assert!(matches!(
            result,
            Err(IngestError::UnsupportedElement {
                kind: NodeKind::Component,
                ..
            })
        ));
    }

    #[test]
    fn test_children_keep_grammar_order() {
        let field = ParseNode::branch(
            Some("XPN"),
            NodeKind::Field,
            SINGLE,
            "raw",
            vec![component("XPN_2", "b"), component("XPN_1", "a")],
        );
        let mut mapping = Mapping::new();
        add_node(&mut mapping, &field).unwrap();

        let inner = mapping.get("XPN").and_then(|v| v.as_object()).unwrap();
        assert_eq!(inner.keys().collect::<Vec<_>>(), vec!["XPN_2", "XPN_1"]);
    }
}
