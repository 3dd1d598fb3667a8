use crate::Version;
use std::fmt;

/// Structural level of a node in the ER7 hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Segment,
    Field,
    Component,
    SubComponent,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Segment => "segment",
            NodeKind::Field => "field",
            NodeKind::Component => "component",
            NodeKind::SubComponent => "subcomponent",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maximum number of times an element may repeat under its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Repetitions {
    Bounded(u32),
    Unbounded,
}

impl Repetitions {
    /// `true` when the grammar allows exactly one occurrence.
    pub fn is_single(&self) -> bool {
        matches!(self, Repetitions::Bounded(1))
    }
}

/// A typed primitive value, tagged with its HL7 data type (`ST`, `ID`, `DTM`, ...).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Primitive {
    pub datatype: &'static str,
    pub value: String,
}

/// Value held by a leaf node.
///
/// Field-level primitives carry their data type; components and sub-components are plain text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeafValue {
    Text(String),
    Primitive(Primitive),
}

impl LeafValue {
    /// The string value, unwrapping a typed primitive if needed.
    pub fn as_text(&self) -> &str {
        match self {
            LeafValue::Text(text) => text,
            LeafValue::Primitive(primitive) => &primitive.value,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeContent {
    Leaf(LeafValue),
    Branch(Vec<ParseNode>),
}

/// One element of a parsed message.
///
/// `name` is `None` when the declared HL7 version has no definition for the element at this
/// position (an unknown segment id, a field beyond the segment's table, and so on).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseNode {
    name: Option<&'static str>,
    kind: NodeKind,
    max_repetitions: Repetitions,
    raw: String,
    content: NodeContent,
}

impl ParseNode {
    /// Build a leaf node.
    pub fn leaf(
        name: Option<&'static str>,
        kind: NodeKind,
        max_repetitions: Repetitions,
        value: LeafValue,
    ) -> Self {
        Self {
            name,
            kind,
            max_repetitions,
            raw: value.as_text().to_string(),
            content: NodeContent::Leaf(value),
        }
    }

    /// Build a branch node; `raw` is the element text as it appeared on the wire.
    pub fn branch(
        name: Option<&'static str>,
        kind: NodeKind,
        max_repetitions: Repetitions,
        raw: impl Into<String>,
        children: Vec<ParseNode>,
    ) -> Self {
        Self {
            name,
            kind,
            max_repetitions,
            raw: raw.into(),
            content: NodeContent::Branch(children),
        }
    }

    pub fn name(&self) -> Option<&'static str> {
        self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn max_repetitions(&self) -> Repetitions {
        self.max_repetitions
    }

    /// Element text as received, delimiters included for branches.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn content(&self) -> &NodeContent {
        &self.content
    }

    /// Child nodes in wire order; empty for leaves.
    pub fn children(&self) -> &[ParseNode] {
        match &self.content {
            NodeContent::Leaf(_) => &[],
            NodeContent::Branch(children) => children,
        }
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&ParseNode> {
        self.children().iter().find(|c| c.name == Some(name))
    }
}

/// A parsed ER7 message: header facts plus the ordered segment nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedMessage {
    structure: String,
    version: Version,
    control_id: Option<String>,
    segments: Vec<ParseNode>,
}

impl ParsedMessage {
    pub(crate) fn new(
        structure: String,
        version: Version,
        control_id: Option<String>,
        segments: Vec<ParseNode>,
    ) -> Self {
        Self {
            structure,
            version,
            control_id,
            segments,
        }
    }

    /// Message structure name, e.g. `ADT_A01`.
    pub fn structure(&self) -> &str {
        &self.structure
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// MSH-10, when present.
    pub fn control_id(&self) -> Option<&str> {
        self.control_id.as_deref()
    }

    /// Segment nodes in wire order.
    pub fn segments(&self) -> &[ParseNode] {
        &self.segments
    }

    /// First segment with the given id.
    pub fn segment(&self, name: &str) -> Option<&ParseNode> {
        self.segments.iter().find(|s| s.name == Some(name))
    }
}
