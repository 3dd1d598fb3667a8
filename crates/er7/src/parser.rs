use crate::tables::{self, ElementDef};
use crate::{
    Delimiters, Er7Error, LeafValue, NodeKind, ParseNode, ParsedMessage, Primitive, Repetitions,
    Version, HEADER_SEGMENT, SEGMENT_SEPARATOR,
};

const SINGLE: Repetitions = Repetitions::Bounded(1);

pub(crate) fn parse(text: &str) -> Result<ParsedMessage, Er7Error> {
    let mut lines = text
        .split(SEGMENT_SEPARATOR)
        .filter(|line| !line.trim().is_empty());

    let header = lines.next().ok_or(Er7Error::EmptyMessage)?;
    if !header.starts_with(HEADER_SEGMENT) {
        return Err(Er7Error::MissingHeader(header.chars().take(3).collect()));
    }

    let delimiters = Delimiters::from_header(header)?;
    let header_fields: Vec<&str> = header.split(delimiters.field).collect();

    // header_fields[0] is "MSH" and header_fields[1] is MSH-2, so MSH-n sits at index n - 1.
    let header_field = |position: usize| {
        header_fields
            .get(position - 1)
            .and_then(|f| f.split(delimiters.repetition).next())
            .filter(|f| !f.is_empty())
    };

    let version_text = header_field(12)
        .and_then(|f| f.split(delimiters.component).next())
        .filter(|v| !v.is_empty())
        .ok_or(Er7Error::MissingField("MSH_12"))?;
    let version: Version = version_text.parse()?;

    let message_type = header_field(9).ok_or(Er7Error::MissingField("MSH_9"))?;
    let structure = structure_name(message_type, &delimiters)?;
    let control_id = header_field(10).map(str::to_string);

    let mut segments = vec![parse_segment(header, &delimiters, version)];
    segments.extend(lines.map(|line| parse_segment(line, &delimiters, version)));

    tracing::debug!(
        "parsed {} v{} with {} segments",
        structure,
        version,
        segments.len()
    );

    Ok(ParsedMessage::new(structure, version, control_id, segments))
}

/// `ADT^A01` becomes `ADT_A01`; a message type without a trigger event stays as-is.
fn structure_name(message_type: &str, delimiters: &Delimiters) -> Result<String, Er7Error> {
    let mut components = message_type.split(delimiters.component);
    let code = components
        .next()
        .filter(|c| !c.is_empty())
        .ok_or(Er7Error::MissingField("MSH_9"))?;

    Ok(match components.next().filter(|e| !e.is_empty()) {
        Some(event) => format!("{}_{}", code, event),
        None => code.to_string(),
    })
}

fn parse_segment(line: &str, delimiters: &Delimiters, version: Version) -> ParseNode {
    let mut parts = line.split(delimiters.field);
    let id = parts.next().unwrap_or_default();
    let definition = tables::segment(id);

    if definition.is_none() {
        tracing::debug!("segment {} is not defined for HL7 {}", id, version);
    }

    let field_def =
        |position: usize| definition.and_then(|def| tables::field(def, position, version));

    let mut children = Vec::new();

    if id == HEADER_SEGMENT {
        // MSH-1 is the field separator itself and MSH-2 the encoding characters; neither is
        // split on the delimiters it declares.
        children.push(header_leaf(field_def(1), delimiters.field.to_string()));
        if let Some(encoding) = parts.next().filter(|e| !e.is_empty()) {
            children.push(header_leaf(field_def(2), encoding.to_string()));
        }
        for (i, raw) in parts.enumerate() {
            children.extend(parse_field(raw, field_def(i + 3), delimiters, version));
        }
    } else {
        for (i, raw) in parts.enumerate() {
            children.extend(parse_field(raw, field_def(i + 1), delimiters, version));
        }
    }

    ParseNode::branch(
        definition.map(|def| def.id),
        NodeKind::Segment,
        definition.map(|def| def.max).unwrap_or(SINGLE),
        line,
        children,
    )
}

fn header_leaf(definition: Option<&'static ElementDef>, value: String) -> ParseNode {
    let datatype = definition.map(|def| def.datatype).unwrap_or("ST");
    ParseNode::leaf(
        definition.map(|def| def.name),
        NodeKind::Field,
        SINGLE,
        LeafValue::Primitive(Primitive { datatype, value }),
    )
}

/// One node per non-empty repetition of a field.
fn parse_field(
    raw: &str,
    definition: Option<&'static ElementDef>,
    delimiters: &Delimiters,
    version: Version,
) -> Vec<ParseNode> {
    raw.split(delimiters.repetition)
        .filter(|repetition| !repetition.is_empty())
        .filter_map(|repetition| {
            let Some(def) = definition else {
                return Some(ParseNode::leaf(
                    None,
                    NodeKind::Field,
                    SINGLE,
                    LeafValue::Text(repetition.to_string()),
                ));
            };

            match tables::components(def.datatype) {
                None => Some(ParseNode::leaf(
                    Some(def.name),
                    NodeKind::Field,
                    def.max,
                    LeafValue::Primitive(Primitive {
                        datatype: def.datatype,
                        value: repetition.to_string(),
                    }),
                )),
                Some(components) => {
                    let children = parse_components(repetition, components, delimiters, version);
                    (!children.is_empty()).then(|| {
                        ParseNode::branch(
                            Some(def.name),
                            NodeKind::Field,
                            def.max,
                            repetition,
                            children,
                        )
                    })
                }
            }
        })
        .collect()
}

fn parse_components(
    raw: &str,
    components: &'static [ElementDef],
    delimiters: &Delimiters,
    version: Version,
) -> Vec<ParseNode> {
    raw.split(delimiters.component)
        .enumerate()
        .filter(|(_, text)| !text.is_empty())
        .filter_map(|(i, text)| {
            let def = tables::component(components, i + 1, version);
            let sub_components = def.and_then(|def| tables::components(def.datatype));

            match (def, sub_components) {
                (Some(def), Some(subs)) => {
                    let children = parse_sub_components(text, subs, delimiters, version);
                    (!children.is_empty()).then(|| {
                        ParseNode::branch(
                            Some(def.name),
                            NodeKind::Component,
                            def.max,
                            text,
                            children,
                        )
                    })
                }
                (def, _) => Some(ParseNode::leaf(
                    def.map(|def| def.name),
                    NodeKind::Component,
                    def.map(|def| def.max).unwrap_or(SINGLE),
                    LeafValue::Text(text.to_string()),
                )),
            }
        })
        .collect()
}

fn parse_sub_components(
    raw: &str,
    components: &'static [ElementDef],
    delimiters: &Delimiters,
    version: Version,
) -> Vec<ParseNode> {
    raw.split(delimiters.subcomponent)
        .enumerate()
        .filter(|(_, text)| !text.is_empty())
        .map(|(i, text)| {
            let def = tables::component(components, i + 1, version);
            ParseNode::leaf(
                def.map(|def| def.name),
                NodeKind::SubComponent,
                SINGLE,
                LeafValue::Text(text.to_string()),
            )
        })
        .collect()
}
