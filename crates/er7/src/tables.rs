//! Segment and data type tables.
//!
//! One table per element serves every supported version: each entry records the version that
//! introduced it, and lookups hide entries newer than the message's declared version. Data types
//! are simplified where the full standard nests deeper than the ingest pipeline reads (for
//! instance `CX_4` is modelled as a primitive rather than `HD`).

use crate::{Repetitions, Version};

use Repetitions::Unbounded;
use Version::{V2_3, V2_3_1, V2_4, V2_5};

#[derive(Debug, Clone, Copy)]
pub(crate) struct ElementDef {
    pub name: &'static str,
    pub datatype: &'static str,
    pub max: Repetitions,
    pub since: Version,
}

impl ElementDef {
    const fn since(self, version: Version) -> Self {
        Self {
            since: version,
            ..self
        }
    }
}

/// Single occurrence.
const fn one(name: &'static str, datatype: &'static str) -> ElementDef {
    ElementDef {
        name,
        datatype,
        max: Repetitions::Bounded(1),
        since: V2_3,
    }
}

/// Repeatable.
const fn rep(name: &'static str, datatype: &'static str) -> ElementDef {
    ElementDef {
        name,
        datatype,
        max: Unbounded,
        since: V2_3,
    }
}

#[derive(Debug)]
pub(crate) struct SegmentDef {
    pub id: &'static str,
    /// Occurrences allowed at message level.
    pub max: Repetitions,
    pub fields: &'static [ElementDef],
}

#[derive(Debug)]
struct CompositeDef {
    name: &'static str,
    components: &'static [ElementDef],
}

/// Segment definition by id.
pub(crate) fn segment(id: &str) -> Option<&'static SegmentDef> {
    SEGMENTS.iter().find(|s| s.id == id)
}

/// Field definition at 1-based `position` within a segment, as visible in `version`.
pub(crate) fn field(
    segment: &'static SegmentDef,
    position: usize,
    version: Version,
) -> Option<&'static ElementDef> {
    visible(segment.fields, position, version)
}

/// Components of a composite data type; `None` for primitives.
pub(crate) fn components(datatype: &str) -> Option<&'static [ElementDef]> {
    COMPOSITES
        .iter()
        .find(|c| c.name == datatype)
        .map(|c| c.components)
}

/// Component definition at 1-based `position` within `components`, as visible in `version`.
pub(crate) fn component(
    components: &'static [ElementDef],
    position: usize,
    version: Version,
) -> Option<&'static ElementDef> {
    visible(components, position, version)
}

fn visible(
    elements: &'static [ElementDef],
    position: usize,
    version: Version,
) -> Option<&'static ElementDef> {
    position
        .checked_sub(1)
        .and_then(|i| elements.get(i))
        .filter(|e| e.since <= version)
}

// ============================================================================
// Composite data types
// ============================================================================

static COMPOSITES: &[CompositeDef] = &[
    CompositeDef {
        name: "TS",
        components: &[one("TS_1", "DTM"), one("TS_2", "ID")],
    },
    CompositeDef {
        name: "MSG",
        components: &[
            one("MSG_1", "ID"),
            one("MSG_2", "ID"),
            one("MSG_3", "ID").since(V2_3_1),
        ],
    },
    CompositeDef {
        name: "HD",
        components: &[one("HD_1", "IS"), one("HD_2", "ST"), one("HD_3", "ID")],
    },
    CompositeDef {
        name: "PT",
        components: &[one("PT_1", "ID"), one("PT_2", "ID")],
    },
    CompositeDef {
        name: "VID",
        components: &[one("VID_1", "ID"), one("VID_2", "CE"), one("VID_3", "CE")],
    },
    CompositeDef {
        name: "CE",
        components: &[
            one("CE_1", "ST"),
            one("CE_2", "ST"),
            one("CE_3", "ID"),
            one("CE_4", "ST"),
            one("CE_5", "ST"),
            one("CE_6", "ID"),
        ],
    },
    CompositeDef {
        name: "CX",
        components: &[
            one("CX_1", "ST"),
            one("CX_2", "ST"),
            one("CX_3", "ID"),
            one("CX_4", "IS"),
            one("CX_5", "ID"),
            one("CX_6", "IS"),
            one("CX_7", "DT").since(V2_4),
            one("CX_8", "DT").since(V2_4),
            one("CX_9", "CE").since(V2_5),
            one("CX_10", "CE").since(V2_5),
        ],
    },
    CompositeDef {
        name: "XPN",
        components: &[
            one("XPN_1", "ST"),
            one("XPN_2", "ST"),
            one("XPN_3", "ST"),
            one("XPN_4", "ST"),
            one("XPN_5", "ST"),
            one("XPN_6", "IS"),
            one("XPN_7", "ID"),
            one("XPN_8", "ID"),
        ],
    },
    CompositeDef {
        name: "XAD",
        components: &[
            one("XAD_1", "ST"),
            one("XAD_2", "ST"),
            one("XAD_3", "ST"),
            one("XAD_4", "ST"),
            one("XAD_5", "ST"),
            one("XAD_6", "ID"),
            one("XAD_7", "ID"),
            one("XAD_8", "ST"),
            one("XAD_9", "IS"),
            one("XAD_10", "IS"),
            one("XAD_11", "ID"),
        ],
    },
    CompositeDef {
        name: "XTN",
        components: &[
            one("XTN_1", "ST"),
            one("XTN_2", "ID"),
            one("XTN_3", "ID"),
            one("XTN_4", "ST"),
            one("XTN_5", "NM"),
            one("XTN_6", "NM"),
            one("XTN_7", "NM"),
            one("XTN_8", "NM"),
            one("XTN_9", "ST"),
        ],
    },
    CompositeDef {
        name: "XCN",
        components: &[
            one("XCN_1", "ST"),
            one("XCN_2", "ST"),
            one("XCN_3", "ST"),
            one("XCN_4", "ST"),
            one("XCN_5", "ST"),
            one("XCN_6", "ST"),
            one("XCN_7", "IS"),
            one("XCN_8", "IS"),
            one("XCN_9", "HD"),
        ],
    },
    CompositeDef {
        name: "XON",
        components: &[
            one("XON_1", "ST"),
            one("XON_2", "IS"),
            one("XON_3", "NM"),
        ],
    },
    CompositeDef {
        name: "PL",
        components: &[
            one("PL_1", "IS"),
            one("PL_2", "IS"),
            one("PL_3", "IS"),
            one("PL_4", "HD"),
            one("PL_5", "IS"),
            one("PL_6", "IS"),
            one("PL_7", "IS"),
            one("PL_8", "IS"),
            one("PL_9", "ST"),
        ],
    },
    CompositeDef {
        name: "EI",
        components: &[
            one("EI_1", "ST"),
            one("EI_2", "IS"),
            one("EI_3", "ST"),
            one("EI_4", "ID"),
        ],
    },
    CompositeDef {
        name: "CQ",
        components: &[one("CQ_1", "NM"), one("CQ_2", "CE")],
    },
    CompositeDef {
        name: "DLN",
        components: &[one("DLN_1", "ST"), one("DLN_2", "IS"), one("DLN_3", "DT")],
    },
    CompositeDef {
        name: "ELD",
        components: &[
            one("ELD_1", "ST"),
            one("ELD_2", "NM"),
            one("ELD_3", "NM"),
            one("ELD_4", "CE"),
        ],
    },
];

// ============================================================================
// Segments
// ============================================================================

static SEGMENTS: &[SegmentDef] = &[
    SegmentDef {
        id: "MSH",
        max: Repetitions::Bounded(1),
        fields: &[
            one("MSH_1", "ST"),
            one("MSH_2", "ST"),
            one("MSH_3", "HD"),
            one("MSH_4", "HD"),
            one("MSH_5", "HD"),
            one("MSH_6", "HD"),
            one("MSH_7", "TS"),
            one("MSH_8", "ST"),
            one("MSH_9", "MSG"),
            one("MSH_10", "ST"),
            one("MSH_11", "PT"),
            one("MSH_12", "VID"),
            one("MSH_13", "NM"),
            one("MSH_14", "ST"),
            one("MSH_15", "ID"),
            one("MSH_16", "ID"),
            one("MSH_17", "ID"),
            one("MSH_18", "ID"),
            one("MSH_19", "CE"),
            one("MSH_20", "ID").since(V2_3_1),
            rep("MSH_21", "EI").since(V2_4),
        ],
    },
    SegmentDef {
        id: "EVN",
        max: Repetitions::Bounded(1),
        fields: &[
            one("EVN_1", "ID"),
            one("EVN_2", "TS"),
            one("EVN_3", "TS"),
            one("EVN_4", "IS"),
            rep("EVN_5", "XCN"),
            one("EVN_6", "TS"),
            one("EVN_7", "HD").since(V2_4),
        ],
    },
    SegmentDef {
        id: "PID",
        max: Repetitions::Bounded(1),
        fields: &[
            one("PID_1", "SI"),
            one("PID_2", "CX"),
            rep("PID_3", "CX"),
            rep("PID_4", "CX"),
            rep("PID_5", "XPN"),
            rep("PID_6", "XPN"),
            one("PID_7", "TS"),
            one("PID_8", "IS"),
            rep("PID_9", "XPN"),
            rep("PID_10", "CE"),
            rep("PID_11", "XAD"),
            one("PID_12", "IS"),
            rep("PID_13", "XTN"),
            rep("PID_14", "XTN"),
            one("PID_15", "CE"),
            one("PID_16", "CE"),
            one("PID_17", "CE"),
            one("PID_18", "CX"),
            one("PID_19", "ST"),
            one("PID_20", "DLN"),
            rep("PID_21", "CX"),
            rep("PID_22", "CE"),
            one("PID_23", "ST"),
            one("PID_24", "ID"),
            one("PID_25", "NM"),
            rep("PID_26", "CE"),
            one("PID_27", "CE"),
            one("PID_28", "CE"),
            one("PID_29", "TS"),
            one("PID_30", "ID"),
            one("PID_31", "ID").since(V2_4),
            rep("PID_32", "IS").since(V2_4),
            one("PID_33", "TS").since(V2_4),
            one("PID_34", "HD").since(V2_4),
            one("PID_35", "CE").since(V2_4),
            one("PID_36", "CE").since(V2_4),
            one("PID_37", "ST").since(V2_4),
            one("PID_38", "CE").since(V2_4),
            rep("PID_39", "CE").since(V2_5),
        ],
    },
    SegmentDef {
        id: "PD1",
        max: Repetitions::Bounded(1),
        fields: &[
            rep("PD1_1", "IS"),
            rep("PD1_2", "XON"),
            rep("PD1_3", "XON"),
            rep("PD1_4", "XCN"),
            one("PD1_5", "IS"),
            one("PD1_6", "IS"),
            one("PD1_7", "IS"),
            one("PD1_8", "IS"),
            one("PD1_9", "ID"),
            rep("PD1_10", "CX"),
            one("PD1_11", "CE"),
            one("PD1_12", "ID"),
            one("PD1_13", "DT").since(V2_4),
            one("PD1_14", "XON").since(V2_4),
            one("PD1_15", "CE").since(V2_4),
            one("PD1_16", "IS").since(V2_4),
            one("PD1_17", "DT").since(V2_4),
            one("PD1_18", "DT").since(V2_4),
            one("PD1_19", "DT").since(V2_4),
            one("PD1_20", "DT").since(V2_4),
            one("PD1_21", "DT").since(V2_4),
        ],
    },
    SegmentDef {
        id: "NK1",
        max: Unbounded,
        fields: &[
            one("NK1_1", "SI"),
            rep("NK1_2", "XPN"),
            one("NK1_3", "CE"),
            rep("NK1_4", "XAD"),
            rep("NK1_5", "XTN"),
            rep("NK1_6", "XTN"),
            one("NK1_7", "CE"),
            one("NK1_8", "DT"),
            one("NK1_9", "DT"),
            one("NK1_10", "ST"),
            one("NK1_11", "CE"),
            one("NK1_12", "CX"),
            rep("NK1_13", "XON"),
            one("NK1_14", "CE"),
            one("NK1_15", "IS"),
            one("NK1_16", "TS"),
            rep("NK1_17", "IS"),
            one("NK1_18", "IS"),
            rep("NK1_19", "CE"),
            one("NK1_20", "CE"),
            one("NK1_21", "IS"),
            rep("NK1_22", "CE"),
            one("NK1_23", "ID"),
            one("NK1_24", "IS"),
            one("NK1_25", "CE"),
            rep("NK1_26", "XPN"),
            one("NK1_27", "CE"),
            rep("NK1_28", "CE"),
            rep("NK1_29", "CE"),
            rep("NK1_30", "XPN"),
            rep("NK1_31", "XTN"),
            rep("NK1_32", "XAD"),
            rep("NK1_33", "CX"),
            one("NK1_34", "IS"),
            one("NK1_35", "CE"),
            one("NK1_36", "IS"),
            one("NK1_37", "ST"),
            one("NK1_38", "CE"),
            one("NK1_39", "IS"),
        ],
    },
    SegmentDef {
        id: "PV1",
        max: Repetitions::Bounded(1),
        fields: &[
            one("PV1_1", "SI"),
            one("PV1_2", "IS"),
            one("PV1_3", "PL"),
            one("PV1_4", "IS"),
            one("PV1_5", "CX"),
            one("PV1_6", "PL"),
            rep("PV1_7", "XCN"),
            rep("PV1_8", "XCN"),
            rep("PV1_9", "XCN"),
            one("PV1_10", "IS"),
            one("PV1_11", "PL"),
            one("PV1_12", "IS"),
            one("PV1_13", "IS"),
            one("PV1_14", "IS"),
            rep("PV1_15", "IS"),
            one("PV1_16", "IS"),
            rep("PV1_17", "XCN"),
            one("PV1_18", "IS"),
            one("PV1_19", "CX"),
            rep("PV1_20", "ST"),
            one("PV1_21", "IS"),
            one("PV1_22", "IS"),
            one("PV1_23", "IS"),
            rep("PV1_24", "IS"),
            rep("PV1_25", "DT"),
            rep("PV1_26", "NM"),
            rep("PV1_27", "NM"),
            one("PV1_28", "IS"),
            one("PV1_29", "IS"),
            one("PV1_30", "DT"),
            one("PV1_31", "IS"),
            one("PV1_32", "NM"),
            one("PV1_33", "NM"),
            one("PV1_34", "IS"),
            one("PV1_35", "DT"),
            one("PV1_36", "IS"),
            one("PV1_37", "ST"),
            one("PV1_38", "CE"),
            one("PV1_39", "IS"),
            one("PV1_40", "IS"),
            one("PV1_41", "IS"),
            one("PV1_42", "PL"),
            one("PV1_43", "PL"),
            one("PV1_44", "TS"),
            rep("PV1_45", "TS"),
            one("PV1_46", "NM"),
            one("PV1_47", "NM"),
            one("PV1_48", "NM"),
            one("PV1_49", "NM"),
            one("PV1_50", "CX"),
            one("PV1_51", "IS"),
            rep("PV1_52", "XCN"),
        ],
    },
    SegmentDef {
        id: "ORC",
        max: Unbounded,
        fields: &[
            one("ORC_1", "ID"),
            one("ORC_2", "EI"),
            one("ORC_3", "EI"),
            one("ORC_4", "EI"),
            one("ORC_5", "ID"),
            one("ORC_6", "ID"),
            rep("ORC_7", "ST"),
            one("ORC_8", "ST"),
            one("ORC_9", "TS"),
            rep("ORC_10", "XCN"),
            rep("ORC_11", "XCN"),
            rep("ORC_12", "XCN"),
            one("ORC_13", "PL"),
            rep("ORC_14", "XTN"),
            one("ORC_15", "TS"),
            one("ORC_16", "CE"),
            one("ORC_17", "CE"),
            one("ORC_18", "CE"),
            rep("ORC_19", "XCN"),
            one("ORC_20", "CE"),
            rep("ORC_21", "XON").since(V2_3_1),
            rep("ORC_22", "XAD").since(V2_3_1),
            rep("ORC_23", "XTN").since(V2_3_1),
            rep("ORC_24", "XAD").since(V2_3_1),
            one("ORC_25", "CE").since(V2_4),
            one("ORC_26", "CE").since(V2_5),
            one("ORC_27", "TS").since(V2_5),
            one("ORC_28", "CE").since(V2_5),
            one("ORC_29", "CE").since(V2_5),
            one("ORC_30", "CE").since(V2_5),
            one("ORC_31", "CE").since(V2_5),
        ],
    },
    SegmentDef {
        id: "OBR",
        max: Unbounded,
        fields: &[
            one("OBR_1", "SI"),
            one("OBR_2", "EI"),
            one("OBR_3", "EI"),
            one("OBR_4", "CE"),
            one("OBR_5", "ID"),
            one("OBR_6", "TS"),
            one("OBR_7", "TS"),
            one("OBR_8", "TS"),
            one("OBR_9", "CQ"),
            rep("OBR_10", "XCN"),
            one("OBR_11", "ID"),
            one("OBR_12", "CE"),
            one("OBR_13", "ST"),
            one("OBR_14", "TS"),
            one("OBR_15", "CE"),
            rep("OBR_16", "XCN"),
            rep("OBR_17", "XTN"),
            one("OBR_18", "ST"),
            one("OBR_19", "ST"),
            one("OBR_20", "ST"),
            one("OBR_21", "ST"),
            one("OBR_22", "TS"),
            one("OBR_23", "ST"),
            one("OBR_24", "ID"),
            one("OBR_25", "ID"),
            one("OBR_26", "CE"),
            rep("OBR_27", "ST"),
            rep("OBR_28", "XCN"),
            one("OBR_29", "EI"),
            one("OBR_30", "ID"),
            rep("OBR_31", "CE"),
            one("OBR_32", "ST"),
            rep("OBR_33", "ST"),
            rep("OBR_34", "ST"),
            rep("OBR_35", "ST"),
            one("OBR_36", "TS"),
            one("OBR_37", "NM"),
            rep("OBR_38", "CE"),
            rep("OBR_39", "CE"),
            one("OBR_40", "CE"),
            one("OBR_41", "ID"),
            one("OBR_42", "ID"),
            rep("OBR_43", "CE"),
            one("OBR_44", "CE").since(V2_3_1),
            rep("OBR_45", "CE").since(V2_3_1),
            rep("OBR_46", "CE").since(V2_4),
            rep("OBR_47", "CE").since(V2_4),
            one("OBR_48", "CE").since(V2_5),
            one("OBR_49", "IS").since(V2_5),
            one("OBR_50", "CE").since(V2_5),
        ],
    },
    SegmentDef {
        id: "OBX",
        max: Unbounded,
        fields: &[
            one("OBX_1", "SI"),
            one("OBX_2", "ID"),
            one("OBX_3", "CE"),
            one("OBX_4", "ST"),
            rep("OBX_5", "ST"),
            one("OBX_6", "CE"),
            one("OBX_7", "ST"),
            one("OBX_8", "IS"),
            one("OBX_9", "NM"),
            one("OBX_10", "ID"),
            one("OBX_11", "ID"),
            one("OBX_12", "TS"),
            one("OBX_13", "ST"),
            one("OBX_14", "TS"),
            one("OBX_15", "CE"),
            rep("OBX_16", "XCN"),
            rep("OBX_17", "CE"),
            rep("OBX_18", "EI").since(V2_4),
            one("OBX_19", "TS").since(V2_4),
            one("OBX_20", "ST").since(V2_5),
            one("OBX_21", "ST").since(V2_5),
            one("OBX_22", "ST").since(V2_5),
            one("OBX_23", "XON").since(V2_5),
            one("OBX_24", "XAD").since(V2_5),
            one("OBX_25", "XCN").since(V2_5),
        ],
    },
    SegmentDef {
        id: "NTE",
        max: Unbounded,
        fields: &[
            one("NTE_1", "SI"),
            one("NTE_2", "ID"),
            rep("NTE_3", "FT"),
            one("NTE_4", "CE").since(V2_4),
        ],
    },
    SegmentDef {
        id: "AL1",
        max: Unbounded,
        fields: &[
            one("AL1_1", "SI"),
            one("AL1_2", "CE"),
            one("AL1_3", "CE"),
            one("AL1_4", "CE"),
            rep("AL1_5", "ST"),
            one("AL1_6", "DT"),
        ],
    },
    SegmentDef {
        id: "DG1",
        max: Unbounded,
        fields: &[
            one("DG1_1", "SI"),
            one("DG1_2", "ID"),
            one("DG1_3", "CE"),
            one("DG1_4", "ST"),
            one("DG1_5", "TS"),
            one("DG1_6", "IS"),
            one("DG1_7", "CE"),
            one("DG1_8", "CE"),
            one("DG1_9", "ID"),
            one("DG1_10", "IS"),
            one("DG1_11", "CE"),
            one("DG1_12", "NM"),
            one("DG1_13", "ST"),
            one("DG1_14", "ST"),
            one("DG1_15", "ID"),
            rep("DG1_16", "XCN"),
            one("DG1_17", "IS"),
            one("DG1_18", "ID"),
            one("DG1_19", "TS"),
            one("DG1_20", "EI").since(V2_5),
            one("DG1_21", "ID").since(V2_5),
        ],
    },
    SegmentDef {
        id: "MSA",
        max: Repetitions::Bounded(1),
        fields: &[
            one("MSA_1", "ID"),
            one("MSA_2", "ST"),
            one("MSA_3", "ST"),
            one("MSA_4", "NM"),
            one("MSA_5", "ID"),
            one("MSA_6", "CE"),
        ],
    },
    SegmentDef {
        id: "ERR",
        max: Unbounded,
        fields: &[
            rep("ERR_1", "ELD"),
            rep("ERR_2", "ST").since(V2_5),
            one("ERR_3", "CE").since(V2_5),
            one("ERR_4", "ID").since(V2_5),
            one("ERR_5", "CE").since(V2_5),
            one("ERR_6", "ST").since(V2_5),
            one("ERR_7", "TX").since(V2_5),
            one("ERR_8", "TX").since(V2_5),
            rep("ERR_9", "IS").since(V2_5),
            one("ERR_10", "CE").since(V2_5),
            rep("ERR_11", "CE").since(V2_5),
            rep("ERR_12", "XTN").since(V2_5),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use Version::V2_5_1;

    #[test]
    fn test_segment_lookup() {
        let pid = segment("PID").unwrap();
        assert!(pid.max.is_single());
        assert!(segment("ZZZ").is_none());
        assert!(!segment("OBX").unwrap().max.is_single());
    }

    #[test]
    fn test_segment_repetition_is_per_segment_id() {
        let single = ["MSH", "EVN", "PID", "PD1", "PV1", "MSA"];
        let repeating = ["NK1", "ORC", "OBR", "OBX", "NTE", "AL1", "DG1", "ERR"];

        for id in single {
            assert!(segment(id).unwrap().max.is_single(), "{} should be single", id);
        }
        for id in repeating {
            assert_eq!(segment(id).unwrap().max, Unbounded, "{} should repeat", id);
        }
        assert_eq!(SEGMENTS.len(), single.len() + repeating.len());
    }

    #[test]
    fn test_field_positions_match_names() {
        for seg in SEGMENTS {
            for (i, f) in seg.fields.iter().enumerate() {
                assert_eq!(f.name, format!("{}_{}", seg.id, i + 1));
            }
        }
        for composite in COMPOSITES {
            for (i, c) in composite.components.iter().enumerate() {
                assert_eq!(c.name, format!("{}_{}", composite.name, i + 1));
            }
        }
    }

    #[test]
    fn test_versioned_fields() {
        let pid = segment("PID").unwrap();
        assert!(field(pid, 30, V2_3).is_some());
        assert!(field(pid, 31, V2_3).is_none());
        assert!(field(pid, 31, V2_4).is_some());
        assert!(field(pid, 39, V2_5_1).is_some());
        assert!(field(pid, 40, V2_5_1).is_none());
        assert!(field(pid, 0, V2_5_1).is_none());
    }

    #[test]
    fn test_repeatable_identifier_field() {
        let pid = segment("PID").unwrap();
        assert!(field(pid, 2, V2_3).unwrap().max.is_single());
        assert_eq!(field(pid, 3, V2_3).unwrap().max, Unbounded);
    }

    #[test]
    fn test_composite_lookup() {
        let cx = components("CX").unwrap();
        assert_eq!(component(cx, 4, V2_3).unwrap().name, "CX_4");
        assert!(component(cx, 9, V2_3).is_none());
        assert!(components("ST").is_none());
    }

    #[test]
    fn test_component_datatypes_resolve() {
        let primitives = ["ST", "ID", "IS", "NM", "SI", "TX", "FT", "DT", "DTM"];
        for composite in COMPOSITES {
            for c in composite.components {
                assert!(
                    primitives.contains(&c.datatype) || components(c.datatype).is_some(),
                    "{} has unknown datatype {}",
                    c.name,
                    c.datatype
                );
            }
        }
    }
}
