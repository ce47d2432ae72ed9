// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! The bundled GPML schemas, as rule tables, and a validator that checks a
//! document against them in one pass over its events.
//!
//! Each rule names an element, the attributes it may carry (with the kind
//! of value each must hold and whether it is required), the rules of the
//! children it may contain and whether it may hold text.  A rule is found
//! through its parent, so `Graphics` under a `DataNode` and `Graphics`
//! under an `Interaction` are checked differently.  Identifier attributes
//! must be unique and reference attributes must name an identifier of the
//! same document.

use std::collections::HashSet;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

use crate::common::Result;
use crate::import_err;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    /// A document-unique identifier.
    Id,
    /// The identifier of another element of the document.
    IdRef,
    Number,
    Integer,
    Color,
    OneOf(&'static [&'static str]),
}

#[derive(Copy, Clone, Debug)]
pub struct AttrRule {
    pub name: &'static str,
    pub kind: ValueKind,
    pub required: bool,
}

#[derive(Copy, Clone, Debug)]
pub struct ElementRule {
    /// Unique within a schema.
    pub key: &'static str,
    pub tag: &'static str,
    pub attrs: &'static [AttrRule],
    /// Keys of the rules for permitted children.
    pub children: &'static [&'static str],
    pub text: bool,
    /// Content is not checked (foreign vocabularies embedded in GPML).
    pub lax: bool,
}

#[derive(Copy, Clone, Debug)]
pub struct Schema {
    pub namespace: &'static str,
    pub root: &'static str,
    pub rules: &'static [ElementRule],
}

macro_rules! req {
    ($name:expr, $kind:expr) => {
        AttrRule {
            name: $name,
            kind: $kind,
            required: true,
        }
    };
}

macro_rules! opt {
    ($name:expr, $kind:expr) => {
        AttrRule {
            name: $name,
            kind: $kind,
            required: false,
        }
    };
}

const fn element(
    key: &'static str,
    tag: &'static str,
    attrs: &'static [AttrRule],
    children: &'static [&'static str],
) -> ElementRule {
    ElementRule {
        key,
        tag,
        attrs,
        children,
        text: false,
        lax: false,
    }
}

const fn text_element(key: &'static str, tag: &'static str, attrs: &'static [AttrRule]) -> ElementRule {
    ElementRule {
        key,
        tag,
        attrs,
        children: &[],
        text: true,
        lax: false,
    }
}

const fn lax_element(key: &'static str, tag: &'static str) -> ElementRule {
    ElementRule {
        key,
        tag,
        attrs: &[],
        children: &[],
        text: true,
        lax: true,
    }
}

use ValueKind::*;

const LINE_STYLES: ValueKind = OneOf(&["Solid", "Dashed", "Double"]);
const CONNECTOR_TYPES: ValueKind = OneOf(&["Straight", "Elbow", "Curved", "Segmented"]);
const H_ALIGNS: ValueKind = OneOf(&["Left", "Center", "Right"]);
const V_ALIGNS: ValueKind = OneOf(&["Top", "Middle", "Bottom"]);

macro_rules! with_referencing {
    ($($child:expr),* $(,)?) => {
        &[
            $($child,)*
            "Comment",
            "Property",
            "AnnotationRef",
            "CitationRef",
            "EvidenceRef",
        ]
    };
}

macro_rules! shape_graphics_2021 {
    ($($position:expr),* $(,)?) => {
        &[
            $($position,)*
            opt!("textColor", Color),
            opt!("fontName", Text),
            opt!("fontWeight", OneOf(&["Normal", "Bold"])),
            opt!("fontStyle", OneOf(&["Normal", "Italic"])),
            opt!("fontDecoration", OneOf(&["Normal", "Underline"])),
            opt!("fontStrikethru", OneOf(&["Normal", "Strikethru"])),
            opt!("fontSize", Number),
            opt!("hAlign", H_ALIGNS),
            opt!("vAlign", V_ALIGNS),
            opt!("borderColor", Color),
            opt!("borderStyle", LINE_STYLES),
            opt!("borderWidth", Number),
            opt!("fillColor", Color),
            opt!("shapeType", Text),
            opt!("zOrder", Integer),
            opt!("rotation", Number),
        ]
    };
}

const RECT_GRAPHICS_2021: &[AttrRule] = shape_graphics_2021!(
    req!("centerX", Number),
    req!("centerY", Number),
    req!("width", Number),
    req!("height", Number),
);

pub static GPML_2021: Schema = Schema {
    namespace: super::GPML_2021_NS,
    root: "Pathway",
    rules: &[
        element(
            "Pathway",
            "Pathway",
            &[
                req!("title", Text),
                opt!("organism", Text),
                opt!("source", Text),
                opt!("version", Text),
                opt!("license", Text),
            ],
            with_referencing!(
                "Xref",
                "Description",
                "Authors",
                "Pathway.Graphics",
                "DataNodes",
                "Interactions",
                "GraphicalLines",
                "Labels",
                "Shapes",
                "Groups",
                "Annotations",
                "Citations",
                "Evidences",
            ),
        ),
        element(
            "Xref",
            "Xref",
            &[req!("identifier", Text), req!("dataSource", Text)],
            &[],
        ),
        text_element("Description", "Description", &[]),
        element("Authors", "Authors", &[], &["Author"]),
        element(
            "Author",
            "Author",
            &[
                req!("name", Text),
                opt!("username", Text),
                opt!("order", Integer),
            ],
            &["Xref"],
        ),
        text_element("Comment", "Comment", &[opt!("source", Text)]),
        element(
            "Property",
            "Property",
            &[req!("key", Text), req!("value", Text)],
            &[],
        ),
        element(
            "AnnotationRef",
            "AnnotationRef",
            &[req!("elementRef", IdRef)],
            &["CitationRef", "EvidenceRef"],
        ),
        element("CitationRef", "CitationRef", &[req!("elementRef", IdRef)], &[]),
        element("EvidenceRef", "EvidenceRef", &[req!("elementRef", IdRef)], &[]),
        element(
            "Pathway.Graphics",
            "Graphics",
            &[
                opt!("boardWidth", Number),
                opt!("boardHeight", Number),
                opt!("backgroundColor", Color),
            ],
            &[],
        ),
        element("DataNodes", "DataNodes", &[], &["DataNode"]),
        element(
            "DataNode",
            "DataNode",
            &[
                req!("elementId", Id),
                req!("textLabel", Text),
                req!("type", Text),
                opt!("groupRef", IdRef),
                opt!("aliasRef", IdRef),
            ],
            with_referencing!("Xref", "States", "Shaped.Graphics"),
        ),
        element("States", "States", &[], &["State"]),
        element(
            "State",
            "State",
            &[
                req!("elementId", Id),
                req!("textLabel", Text),
                req!("type", Text),
            ],
            with_referencing!("Xref", "State.Graphics"),
        ),
        element(
            "State.Graphics",
            "Graphics",
            shape_graphics_2021!(
                req!("relX", Number),
                req!("relY", Number),
                req!("width", Number),
                req!("height", Number),
            ),
            &[],
        ),
        element("Shaped.Graphics", "Graphics", RECT_GRAPHICS_2021, &[]),
        element("Interactions", "Interactions", &[], &["Interaction"]),
        element(
            "Interaction",
            "Interaction",
            &[req!("elementId", Id), opt!("groupRef", IdRef)],
            with_referencing!("Xref", "Waypoints", "Line.Graphics"),
        ),
        element("GraphicalLines", "GraphicalLines", &[], &["GraphicalLine"]),
        element(
            "GraphicalLine",
            "GraphicalLine",
            &[req!("elementId", Id), opt!("groupRef", IdRef)],
            with_referencing!("Waypoints", "Line.Graphics"),
        ),
        element("Waypoints", "Waypoints", &[], &["Point", "Anchor"]),
        element(
            "Point",
            "Point",
            &[
                req!("elementId", Id),
                req!("x", Number),
                req!("y", Number),
                opt!("elementRef", IdRef),
                opt!("relX", Number),
                opt!("relY", Number),
                opt!("arrowHead", Text),
            ],
            &[],
        ),
        element(
            "Anchor",
            "Anchor",
            &[
                req!("elementId", Id),
                req!("position", Number),
                opt!("shapeType", Text),
            ],
            &[],
        ),
        element(
            "Line.Graphics",
            "Graphics",
            &[
                opt!("lineColor", Color),
                opt!("lineStyle", LINE_STYLES),
                opt!("lineWidth", Number),
                opt!("connectorType", CONNECTOR_TYPES),
                opt!("zOrder", Integer),
            ],
            &[],
        ),
        element("Labels", "Labels", &[], &["Label"]),
        element(
            "Label",
            "Label",
            &[
                req!("elementId", Id),
                req!("textLabel", Text),
                opt!("href", Text),
                opt!("groupRef", IdRef),
            ],
            with_referencing!("Shaped.Graphics"),
        ),
        element("Shapes", "Shapes", &[], &["Shape"]),
        element(
            "Shape",
            "Shape",
            &[
                req!("elementId", Id),
                opt!("textLabel", Text),
                opt!("groupRef", IdRef),
            ],
            with_referencing!("Shaped.Graphics"),
        ),
        element("Groups", "Groups", &[], &["Group"]),
        element(
            "Group",
            "Group",
            &[
                req!("elementId", Id),
                req!("type", Text),
                opt!("textLabel", Text),
                opt!("groupRef", IdRef),
            ],
            with_referencing!("Xref", "Shaped.Graphics"),
        ),
        element("Annotations", "Annotations", &[], &["Annotation"]),
        element(
            "Annotation",
            "Annotation",
            &[
                req!("elementId", Id),
                req!("value", Text),
                req!("type", OneOf(&["Ontology", "Taxonomy", "Undefined"])),
            ],
            &["Xref", "UrlLink"],
        ),
        element("Citations", "Citations", &[], &["Citation"]),
        element(
            "Citation",
            "Citation",
            &[req!("elementId", Id)],
            &["Xref", "UrlLink"],
        ),
        element("Evidences", "Evidences", &[], &["Evidence"]),
        element(
            "Evidence",
            "Evidence",
            &[req!("elementId", Id), opt!("value", Text)],
            &["Xref", "UrlLink"],
        ),
        element("UrlLink", "UrlLink", &[req!("link", Text)], &[]),
    ],
};

const LEGACY_LINE_STYLES: ValueKind = OneOf(&["Solid", "Broken", "Double"]);

const LEGACY_SHAPED_GRAPHICS: &[AttrRule] = &[
    req!("CenterX", Number),
    req!("CenterY", Number),
    req!("Width", Number),
    req!("Height", Number),
    opt!("Color", Color),
    opt!("FillColor", Color),
    opt!("FontName", Text),
    opt!("FontWeight", OneOf(&["Normal", "Bold"])),
    opt!("FontStyle", OneOf(&["Normal", "Italic"])),
    opt!("FontDecoration", OneOf(&["Normal", "Underline"])),
    opt!("FontStrikethru", OneOf(&["Normal", "Strikethru"])),
    opt!("FontSize", Number),
    opt!("Align", H_ALIGNS),
    opt!("Valign", V_ALIGNS),
    opt!("LineStyle", LEGACY_LINE_STYLES),
    opt!("LineThickness", Number),
    opt!("ShapeType", Text),
    opt!("ZOrder", Integer),
    opt!("Rotation", Number),
];

pub static GPML_2013A: Schema = Schema {
    namespace: super::GPML_2013A_NS,
    root: "Legacy.Pathway",
    rules: &[
        element(
            "Legacy.Pathway",
            "Pathway",
            &[
                req!("Name", Text),
                opt!("Organism", Text),
                opt!("Data-Source", Text),
                opt!("Version", Text),
                opt!("License", Text),
                opt!("Author", Text),
                opt!("Maintainer", Text),
                opt!("Email", Text),
                opt!("Last-Modified", Text),
            ],
            &[
                "Legacy.Comment",
                "BiopaxRef",
                "Attribute",
                "Legacy.Pathway.Graphics",
                "Legacy.DataNode",
                "Legacy.State",
                "Legacy.Interaction",
                "Legacy.GraphicalLine",
                "Legacy.Label",
                "Legacy.Shape",
                "Legacy.Group",
                "InfoBox",
                "Legend",
                "Biopax",
            ],
        ),
        text_element("Legacy.Comment", "Comment", &[opt!("Source", Text)]),
        text_element("BiopaxRef", "BiopaxRef", &[]),
        element(
            "Attribute",
            "Attribute",
            &[req!("Key", Text), req!("Value", Text)],
            &[],
        ),
        element(
            "Legacy.Xref",
            "Xref",
            &[req!("Database", Text), req!("ID", Text)],
            &[],
        ),
        element(
            "Legacy.Pathway.Graphics",
            "Graphics",
            &[opt!("BoardWidth", Number), opt!("BoardHeight", Number)],
            &[],
        ),
        element(
            "InfoBox",
            "InfoBox",
            &[req!("CenterX", Number), req!("CenterY", Number)],
            &[],
        ),
        element(
            "Legend",
            "Legend",
            &[req!("CenterX", Number), req!("CenterY", Number)],
            &[],
        ),
        lax_element("Biopax", "Biopax"),
        element(
            "Legacy.DataNode",
            "DataNode",
            &[
                req!("TextLabel", Text),
                req!("GraphId", Id),
                opt!("GroupRef", Text),
                opt!("Type", Text),
            ],
            &[
                "Legacy.Comment",
                "BiopaxRef",
                "Attribute",
                "Legacy.Shaped.Graphics",
                "Legacy.Xref",
            ],
        ),
        element(
            "Legacy.Shaped.Graphics",
            "Graphics",
            LEGACY_SHAPED_GRAPHICS,
            &[],
        ),
        element(
            "Legacy.State",
            "State",
            &[
                req!("GraphRef", IdRef),
                req!("TextLabel", Text),
                opt!("GraphId", Id),
                opt!("StateType", Text),
            ],
            &[
                "Legacy.Comment",
                "BiopaxRef",
                "Attribute",
                "Legacy.State.Graphics",
                "Legacy.Xref",
            ],
        ),
        element(
            "Legacy.State.Graphics",
            "Graphics",
            &[
                req!("RelX", Number),
                req!("RelY", Number),
                req!("Width", Number),
                req!("Height", Number),
                opt!("Color", Color),
                opt!("FillColor", Color),
                opt!("FontName", Text),
                opt!("FontWeight", OneOf(&["Normal", "Bold"])),
                opt!("FontStyle", OneOf(&["Normal", "Italic"])),
                opt!("FontSize", Number),
                opt!("LineStyle", LEGACY_LINE_STYLES),
                opt!("LineThickness", Number),
                opt!("ShapeType", Text),
                opt!("ZOrder", Integer),
            ],
            &[],
        ),
        element(
            "Legacy.Interaction",
            "Interaction",
            &[opt!("GraphId", Id), opt!("GroupRef", Text)],
            &[
                "Legacy.Comment",
                "BiopaxRef",
                "Attribute",
                "Legacy.Line.Graphics",
                "Legacy.Xref",
            ],
        ),
        element(
            "Legacy.GraphicalLine",
            "GraphicalLine",
            &[opt!("GraphId", Id), opt!("GroupRef", Text)],
            &[
                "Legacy.Comment",
                "BiopaxRef",
                "Attribute",
                "Legacy.Line.Graphics",
            ],
        ),
        element(
            "Legacy.Line.Graphics",
            "Graphics",
            &[
                opt!("Color", Color),
                opt!("LineThickness", Number),
                opt!("LineStyle", LEGACY_LINE_STYLES),
                opt!("ConnectorType", CONNECTOR_TYPES),
                opt!("ZOrder", Integer),
            ],
            &["Legacy.Point", "Legacy.Anchor"],
        ),
        element(
            "Legacy.Point",
            "Point",
            &[
                req!("X", Number),
                req!("Y", Number),
                opt!("RelX", Number),
                opt!("RelY", Number),
                opt!("GraphRef", IdRef),
                opt!("GraphId", Id),
                opt!("ArrowHead", Text),
            ],
            &[],
        ),
        element(
            "Legacy.Anchor",
            "Anchor",
            &[
                req!("Position", Number),
                opt!("Shape", Text),
                opt!("GraphId", Id),
            ],
            &[],
        ),
        element(
            "Legacy.Label",
            "Label",
            &[
                req!("TextLabel", Text),
                opt!("GraphId", Id),
                opt!("GroupRef", Text),
                opt!("Href", Text),
            ],
            &[
                "Legacy.Comment",
                "BiopaxRef",
                "Attribute",
                "Legacy.Shaped.Graphics",
            ],
        ),
        element(
            "Legacy.Shape",
            "Shape",
            &[
                opt!("TextLabel", Text),
                opt!("GraphId", Id),
                opt!("GroupRef", Text),
            ],
            &[
                "Legacy.Comment",
                "BiopaxRef",
                "Attribute",
                "Legacy.Shaped.Graphics",
            ],
        ),
        element(
            "Legacy.Group",
            "Group",
            &[
                req!("GroupId", Text),
                opt!("GraphId", Id),
                opt!("GroupRef", Text),
                opt!("Style", Text),
                opt!("TextLabel", Text),
            ],
            &[
                "Legacy.Comment",
                "BiopaxRef",
                "Attribute",
            ],
        ),
    ],
};

impl Schema {
    fn rule(&self, key: &str) -> Option<&'static ElementRule> {
        self.rules.iter().find(|rule| rule.key == key)
    }

    fn child_rule(&self, parent: &ElementRule, tag: &[u8]) -> Option<&'static ElementRule> {
        parent
            .children
            .iter()
            .filter_map(|key| self.rule(key))
            .find(|rule| rule.tag.as_bytes() == tag)
    }

    /// Check `document` against this schema, reporting the first problem
    /// with its byte offset.
    pub fn validate(&self, document: &str) -> Result<()> {
        let mut reader = NsReader::from_str(document);
        let mut stack: Vec<&'static ElementRule> = vec![];
        let mut lax_depth = 0usize;
        let mut seen_root = false;
        let mut ids = HashSet::new();
        let mut id_refs: Vec<(String, u64)> = vec![];

        loop {
            let position = reader.buffer_position();
            let (ns, event) = match reader.read_resolved_event() {
                Ok(resolved) => resolved,
                Err(err) => return invalid(reader.error_position(), err.to_string()),
            };
            let in_namespace = matches!(ns, ResolveResult::Bound(ref ns) if ns.as_ref() == self.namespace.as_bytes());

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let is_empty = matches!(event, Event::Empty(_));
                    if lax_depth > 0 {
                        if !is_empty {
                            lax_depth += 1;
                        }
                        continue;
                    }

                    let local = e.local_name();
                    let name = String::from_utf8_lossy(local.as_ref()).into_owned();
                    let rule = match stack.last() {
                        None if seen_root => {
                            return invalid(position, format!("second root element {name}"));
                        }
                        None => self.rule(self.root).filter(|root| root.tag == name),
                        Some(parent) => self.child_rule(parent, local.as_ref()),
                    };
                    let Some(rule) = rule else {
                        let context = stack.last().map(|r| r.tag).unwrap_or("document");
                        return invalid(position, format!("unexpected element {name} in {context}"));
                    };
                    if !in_namespace {
                        return invalid(
                            position,
                            format!("element {name} is not in namespace {}", self.namespace),
                        );
                    }
                    seen_root = true;

                    self.check_attrs(rule, e, position, &mut ids, &mut id_refs)?;

                    if !is_empty {
                        if rule.lax {
                            lax_depth = 1;
                        } else {
                            stack.push(rule);
                        }
                    }
                }
                Event::End(_) => {
                    if lax_depth > 0 {
                        lax_depth -= 1;
                    } else {
                        stack.pop();
                    }
                }
                Event::Text(ref t) => {
                    if lax_depth > 0 {
                        continue;
                    }
                    if !t.iter().all(u8::is_ascii_whitespace) {
                        match stack.last() {
                            Some(rule) if rule.text => {}
                            Some(rule) => {
                                return invalid(
                                    position,
                                    format!("text is not allowed in {}", rule.tag),
                                );
                            }
                            None => return invalid(position, "text outside the root".to_owned()),
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_root {
            return invalid(0, "no root element".to_owned());
        }
        for (id_ref, position) in id_refs {
            if !ids.contains(&id_ref) {
                return invalid(position, format!("reference to unknown id {id_ref}"));
            }
        }
        Ok(())
    }

    fn check_attrs(
        &self,
        rule: &ElementRule,
        e: &BytesStart,
        position: u64,
        ids: &mut HashSet<String>,
        id_refs: &mut Vec<(String, u64)>,
    ) -> Result<()> {
        let mut present = HashSet::new();
        for attr in e.attributes() {
            let attr = match attr {
                Ok(attr) => attr,
                Err(err) => return invalid(position, err.to_string()),
            };
            let key = attr.key;
            if key.as_ref().starts_with(b"xmlns") || key.prefix().is_some() {
                continue;
            }
            let name = String::from_utf8_lossy(key.as_ref()).into_owned();
            let Some(attr_rule) = rule.attrs.iter().find(|a| a.name == name) else {
                return invalid(
                    position,
                    format!("attribute {name} is not allowed on {}", rule.tag),
                );
            };
            let value = match attr.unescape_value() {
                Ok(value) => value.into_owned(),
                Err(err) => return invalid(position, err.to_string()),
            };
            check_value(attr_rule, rule.tag, &value, position)?;
            match attr_rule.kind {
                Id => {
                    if !ids.insert(value.clone()) {
                        return invalid(position, format!("duplicate id {value}"));
                    }
                }
                IdRef => id_refs.push((value, position)),
                _ => {}
            }
            present.insert(attr_rule.name);
        }

        for attr_rule in rule.attrs.iter().filter(|a| a.required) {
            if !present.contains(attr_rule.name) {
                return invalid(
                    position,
                    format!("{} is missing required attribute {}", rule.tag, attr_rule.name),
                );
            }
        }
        Ok(())
    }
}

fn check_value(rule: &AttrRule, tag: &str, value: &str, position: u64) -> Result<()> {
    let ok = match rule.kind {
        Text => true,
        Id | IdRef => is_ncname(value),
        Number => value.trim().parse::<f64>().is_ok_and(f64::is_finite),
        Integer => value.trim().parse::<i32>().is_ok(),
        Color => crate::types::Color::parse(value).is_some(),
        OneOf(allowed) => allowed.contains(&value),
    };
    if ok {
        Ok(())
    } else {
        invalid(
            position,
            format!("invalid value {value:?} for {tag}@{}", rule.name),
        )
    }
}

fn is_ncname(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn invalid<T>(position: u64, message: String) -> Result<T> {
    import_err!(SchemaValidationFailed, format!("at byte {position}: {message}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorCode;

    const MINIMAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Pathway xmlns="http://pathvisio.org/GPML/2021" title="Minimal">
    <DataNodes>
        <DataNode elementId="a" textLabel="A" type="Protein">
            <Graphics centerX="10" centerY="10" width="40" height="20"/>
        </DataNode>
    </DataNodes>
</Pathway>"#;

    #[test]
    fn test_rule_keys_resolve() {
        for schema in [&GPML_2021, &GPML_2013A] {
            assert!(schema.rule(schema.root).is_some());
            for rule in schema.rules {
                for child in rule.children {
                    assert!(schema.rule(child).is_some(), "{} -> {}", rule.key, child);
                }
            }
        }
    }

    #[test]
    fn test_valid_document() {
        GPML_2021.validate(MINIMAL).unwrap();
    }

    #[test]
    fn test_missing_required_attribute() {
        let doc = MINIMAL.replace(r#" width="40""#, "");
        let err = GPML_2021.validate(&doc).unwrap_err();
        assert_eq!(ErrorCode::SchemaValidationFailed, err.code);
        assert!(err.details.unwrap().contains("width"));
    }

    #[test]
    fn test_bad_values() {
        let doc = MINIMAL.replace(r#"centerX="10""#, r#"centerX="left""#);
        assert!(GPML_2021.validate(&doc).is_err());

        let doc = MINIMAL.replace(
            r#"height="20""#,
            r#"height="20" borderStyle="Wavy""#,
        );
        assert!(GPML_2021.validate(&doc).is_err());
    }

    #[test]
    fn test_ids_and_refs() {
        let doc = MINIMAL.replace(r#"type="Protein""#, r#"type="Protein" groupRef="nowhere""#);
        let err = GPML_2021.validate(&doc).unwrap_err();
        assert!(err.details.unwrap().contains("nowhere"));

        let doc = MINIMAL.replace(
            "</DataNodes>",
            r#"<DataNode elementId="a" textLabel="B" type="Protein"/></DataNodes>"#,
        );
        let err = GPML_2021.validate(&doc).unwrap_err();
        assert!(err.details.unwrap().contains("duplicate"));
    }

    #[test]
    fn test_unknown_element_and_text() {
        let doc = MINIMAL.replace("<DataNodes>", "<DataNodes><Widget/>");
        assert!(GPML_2021.validate(&doc).is_err());

        let doc = MINIMAL.replace("<DataNodes>", "<DataNodes>stray");
        assert!(GPML_2021.validate(&doc).is_err());
    }

    #[test]
    fn test_lax_content_is_skipped() {
        let doc = r#"<Pathway xmlns="http://pathvisio.org/GPML/2013a" Name="x">
  <Biopax>
    <bp:PublicationXref xmlns:bp="http://www.biopax.org/release/biopax-level3.owl#" xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" rdf:id="c1">
      <bp:ID rdf:datatype="http://www.w3.org/2001/XMLSchema#string">123</bp:ID>
    </bp:PublicationXref>
  </Biopax>
</Pathway>"#;
        GPML_2013A.validate(doc).unwrap();
    }
}
