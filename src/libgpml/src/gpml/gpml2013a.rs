// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! GPML 2013a, the legacy generation.  Documents are read into the same
//! object graph as 2021 ones; nothing is ever written in this form.
//!
//! Differences the reader papers over: ids live in `GraphId`/`GraphRef`,
//! groups are named by a separate `GroupId`, states sit at the top level
//! and point at their data node, points and anchors are nested in the
//! line's `Graphics`, and literature references are BioPAX records kept in
//! a trailing `Biopax` block.

use std::collections::{BTreeMap, HashMap, HashSet};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Deserialize;
use tracing::debug;

use super::schema::GPML_2013A;
use super::{
    FormatReader, SchemaVersion, ValueIds, add_with_id, closed_or, color_or, defaults,
    malformed, non_empty, requested_id,
};
use crate::common::Result;
use crate::datamodel::{
    Anchor, AnnotationContent, Author, CitationContent, Comment, DataNode, ElementKind,
    FontStyle, Group, Label, LineElement, LineGraphics, LinePoint, PathwayElement, Rect, Shape,
    ShapeStyle, State, Xref,
};
use crate::ids::ElementId;
use crate::import_err;
use crate::model::PathwayModel;
use crate::refs::RefSource;
use crate::types::{
    AnchorShapeType, AnnotationType, ArrowHeadType, ConnectorType, DataNodeType, GroupType,
    HAlign, LineStyle, ShapeType, StateType, TypeRegistry, VAlign,
};

/// The comment source legacy files use for the pathway description.
const DESCRIPTION_SOURCE: &str = "WikiPathways-description";

/// Reader for `http://pathvisio.org/GPML/2013a`.
#[derive(Copy, Clone, Debug, Default)]
pub struct Gpml2013a;

impl SchemaVersion for Gpml2013a {
    fn namespace(&self) -> &'static str {
        super::GPML_2013A_NS
    }

    fn validate(&self, document: &str) -> Result<()> {
        GPML_2013A.validate(document)
    }
}

impl FormatReader for Gpml2013a {
    fn read_from_root(&self, document: &str, model: &mut PathwayModel) -> Result<()> {
        let file: File = quick_xml::de::from_str(document).map_err(malformed)?;
        let biopax = Biopax::parse(document)?;
        populate(file, biopax, model)
    }
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct XrefXml {
    #[serde(rename = "@Database", default)]
    pub database: String,
    #[serde(rename = "@ID", default)]
    pub id: String,
}

/// Legacy files write an empty `Xref` when there is none.
fn read_xref(xref: &Option<XrefXml>) -> Option<Xref> {
    let xref = xref.as_ref()?;
    let id = xref.id.trim();
    if id.is_empty() {
        return None;
    }
    Some(Xref::new(id, xref.database.trim()))
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct CommentXml {
    #[serde(rename = "@Source")]
    pub source: Option<String>,
    #[serde(rename = "$text", default)]
    pub text: String,
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct AttributeXml {
    #[serde(rename = "@Key", default)]
    pub key: String,
    #[serde(rename = "@Value", default)]
    pub value: String,
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct PathwayGraphicsXml {
    #[serde(rename = "@BoardWidth")]
    pub board_width: Option<f64>,
    #[serde(rename = "@BoardHeight")]
    pub board_height: Option<f64>,
}

/// Graphics of data nodes, labels, shapes and (with `RelX`/`RelY`) states.
#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct ShapeGraphicsXml {
    #[serde(rename = "@CenterX")]
    pub center_x: Option<f64>,
    #[serde(rename = "@CenterY")]
    pub center_y: Option<f64>,
    #[serde(rename = "@RelX")]
    pub rel_x: Option<f64>,
    #[serde(rename = "@RelY")]
    pub rel_y: Option<f64>,
    #[serde(rename = "@Width")]
    pub width: Option<f64>,
    #[serde(rename = "@Height")]
    pub height: Option<f64>,
    #[serde(rename = "@Color")]
    pub color: Option<String>,
    #[serde(rename = "@FillColor")]
    pub fill_color: Option<String>,
    #[serde(rename = "@FontName")]
    pub font_name: Option<String>,
    #[serde(rename = "@FontWeight")]
    pub font_weight: Option<String>,
    #[serde(rename = "@FontStyle")]
    pub font_style: Option<String>,
    #[serde(rename = "@FontDecoration")]
    pub font_decoration: Option<String>,
    #[serde(rename = "@FontStrikethru")]
    pub font_strikethru: Option<String>,
    #[serde(rename = "@FontSize")]
    pub font_size: Option<f64>,
    #[serde(rename = "@Align")]
    pub align: Option<String>,
    #[serde(rename = "@Valign")]
    pub valign: Option<String>,
    #[serde(rename = "@LineStyle")]
    pub line_style: Option<String>,
    #[serde(rename = "@LineThickness")]
    pub line_thickness: Option<f64>,
    #[serde(rename = "@ShapeType")]
    pub shape_type: Option<String>,
    #[serde(rename = "@ZOrder")]
    pub z_order: Option<i32>,
    #[serde(rename = "@Rotation")]
    pub rotation: Option<f64>,
}

impl ShapeGraphicsXml {
    /// `Color` colors both the text and the border.
    fn font(&self) -> FontStyle {
        FontStyle {
            text_color: color_or(self.color.as_deref(), defaults::TEXT_COLOR, "Color"),
            font_name: self
                .font_name
                .clone()
                .unwrap_or_else(|| defaults::FONT_NAME.to_owned()),
            bold: self.font_weight.as_deref() == Some("Bold"),
            italic: self.font_style.as_deref() == Some("Italic"),
            underline: self.font_decoration.as_deref() == Some("Underline"),
            strikethru: self.font_strikethru.as_deref() == Some("Strikethru"),
            font_size: self.font_size.unwrap_or(defaults::FONT_SIZE),
            h_align: closed_or(self.align.as_deref(), HAlign::from_name, defaults::H_ALIGN),
            v_align: closed_or(self.valign.as_deref(), VAlign::from_name, defaults::V_ALIGN),
        }
    }

    fn style(&self, types: &mut TypeRegistry) -> ShapeStyle {
        ShapeStyle {
            border_color: color_or(self.color.as_deref(), defaults::BORDER_COLOR, "Color"),
            border_style: line_style(self.line_style.as_deref(), defaults::BORDER_STYLE),
            border_width: self.line_thickness.unwrap_or(defaults::BORDER_WIDTH),
            fill_color: color_or(self.fill_color.as_deref(), defaults::FILL_COLOR, "FillColor"),
            shape_type: self
                .shape_type
                .as_deref()
                .map(|name| types.resolve::<ShapeType>(name))
                .unwrap_or(defaults::SHAPE_TYPE),
            z_order: self.z_order,
            rotation: self.rotation.unwrap_or(defaults::ROTATION),
        }
    }

    fn rect(&self) -> Rect {
        Rect::new(
            self.center_x.unwrap_or_default(),
            self.center_y.unwrap_or_default(),
            self.width.unwrap_or_default(),
            self.height.unwrap_or_default(),
        )
    }
}

fn line_style(value: Option<&str>, default: LineStyle) -> LineStyle {
    match value {
        Some("Broken") => LineStyle::Dashed,
        value => closed_or(value, LineStyle::from_name, default),
    }
}

/// Legacy arrow head names that were renamed in 2021.
fn arrow_head_name(legacy: &str) -> &str {
    match legacy {
        "Line" => "Undirected",
        "Arrow" => "Directed",
        "mim-conversion" => "Conversion",
        "TBar" | "mim-inhibition" => "Inhibition",
        "mim-catalysis" => "Catalysis",
        "mim-stimulation" | "mim-necessary-stimulation" => "Stimulation",
        "mim-binding" => "Binding",
        "mim-translocation" => "Translocation",
        "mim-transcription-translation" => "TranscriptionTranslation",
        other => other,
    }
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct PointXml {
    #[serde(rename = "@X", default)]
    pub x: f64,
    #[serde(rename = "@Y", default)]
    pub y: f64,
    #[serde(rename = "@RelX")]
    pub rel_x: Option<f64>,
    #[serde(rename = "@RelY")]
    pub rel_y: Option<f64>,
    #[serde(rename = "@GraphRef")]
    pub graph_ref: Option<String>,
    #[serde(rename = "@GraphId")]
    pub graph_id: Option<String>,
    #[serde(rename = "@ArrowHead")]
    pub arrow_head: Option<String>,
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct AnchorXml {
    #[serde(rename = "@Position")]
    pub position: Option<f64>,
    #[serde(rename = "@Shape")]
    pub shape: Option<String>,
    #[serde(rename = "@GraphId")]
    pub graph_id: Option<String>,
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct LineGraphicsXml {
    #[serde(rename = "@Color")]
    pub color: Option<String>,
    #[serde(rename = "@LineThickness")]
    pub line_thickness: Option<f64>,
    #[serde(rename = "@LineStyle")]
    pub line_style: Option<String>,
    #[serde(rename = "@ConnectorType")]
    pub connector_type: Option<String>,
    #[serde(rename = "@ZOrder")]
    pub z_order: Option<i32>,
    #[serde(rename = "Point", default)]
    pub points: Vec<PointXml>,
    #[serde(rename = "Anchor", default)]
    pub anchors: Vec<AnchorXml>,
}

impl From<&LineGraphicsXml> for LineGraphics {
    fn from(g: &LineGraphicsXml) -> Self {
        LineGraphics {
            line_color: color_or(g.color.as_deref(), defaults::LINE_COLOR, "Color"),
            line_style: line_style(g.line_style.as_deref(), defaults::LINE_STYLE),
            line_width: g.line_thickness.unwrap_or(defaults::LINE_WIDTH),
            connector_type: closed_or(
                g.connector_type.as_deref(),
                ConnectorType::from_name,
                defaults::CONNECTOR_TYPE,
            ),
            z_order: g.z_order,
        }
    }
}

/// Declares a legacy element struct: its own fields followed by the
/// comments, BioPAX refs and attributes every legacy element may carry.
macro_rules! legacy_element {
    ($name:ident { $($(#[$meta:meta])* $field:ident: $ty:ty,)* }) => {
        #[cfg_attr(feature = "debug-derive", derive(Debug))]
        #[derive(Clone, PartialEq, Default, Deserialize)]
        pub struct $name {
            $($(#[$meta])* pub $field: $ty,)*
            #[serde(rename = "Comment", default)]
            pub comments: Vec<CommentXml>,
            #[serde(rename = "BiopaxRef", default)]
            pub biopax_refs: Vec<String>,
            #[serde(rename = "Attribute", default)]
            pub attributes: Vec<AttributeXml>,
        }
    };
}

legacy_element!(DataNodeXml {
    #[serde(rename = "@TextLabel", default)]
    text_label: String,
    #[serde(rename = "@GraphId", default)]
    graph_id: String,
    #[serde(rename = "@GroupRef")]
    group_ref: Option<String>,
    #[serde(rename = "@Type")]
    node_type: Option<String>,
    #[serde(rename = "Graphics")]
    graphics: Option<ShapeGraphicsXml>,
    #[serde(rename = "Xref")]
    xref: Option<XrefXml>,
});

legacy_element!(StateXml {
    #[serde(rename = "@GraphRef", default)]
    graph_ref: String,
    #[serde(rename = "@TextLabel", default)]
    text_label: String,
    #[serde(rename = "@GraphId", default)]
    graph_id: String,
    #[serde(rename = "@StateType")]
    state_type: Option<String>,
    #[serde(rename = "Graphics")]
    graphics: Option<ShapeGraphicsXml>,
    #[serde(rename = "Xref")]
    xref: Option<XrefXml>,
});

legacy_element!(LineXml {
    #[serde(rename = "@GraphId", default)]
    graph_id: String,
    #[serde(rename = "@GroupRef")]
    group_ref: Option<String>,
    #[serde(rename = "Graphics")]
    graphics: Option<LineGraphicsXml>,
    #[serde(rename = "Xref")]
    xref: Option<XrefXml>,
});

legacy_element!(LabelXml {
    #[serde(rename = "@TextLabel", default)]
    text_label: String,
    #[serde(rename = "@GraphId", default)]
    graph_id: String,
    #[serde(rename = "@GroupRef")]
    group_ref: Option<String>,
    #[serde(rename = "@Href")]
    href: Option<String>,
    #[serde(rename = "Graphics")]
    graphics: Option<ShapeGraphicsXml>,
});

legacy_element!(ShapeXml {
    #[serde(rename = "@TextLabel")]
    text_label: Option<String>,
    #[serde(rename = "@GraphId", default)]
    graph_id: String,
    #[serde(rename = "@GroupRef")]
    group_ref: Option<String>,
    #[serde(rename = "Graphics")]
    graphics: Option<ShapeGraphicsXml>,
});

legacy_element!(GroupXml {
    #[serde(rename = "@GroupId", default)]
    group_id: String,
    #[serde(rename = "@GraphId", default)]
    graph_id: String,
    #[serde(rename = "@GroupRef")]
    group_ref: Option<String>,
    #[serde(rename = "@Style")]
    style: Option<String>,
    #[serde(rename = "@TextLabel")]
    text_label: Option<String>,
});

legacy_element!(File {
    #[serde(rename = "@Name", default)]
    name: String,
    #[serde(rename = "@Organism")]
    organism: Option<String>,
    #[serde(rename = "@Data-Source")]
    data_source: Option<String>,
    #[serde(rename = "@Version")]
    version: Option<String>,
    #[serde(rename = "@License")]
    license: Option<String>,
    #[serde(rename = "@Author")]
    author: Option<String>,
    #[serde(rename = "@Maintainer")]
    maintainer: Option<String>,
    #[serde(rename = "@Email")]
    email: Option<String>,
    #[serde(rename = "@Last-Modified")]
    last_modified: Option<String>,
    #[serde(rename = "Graphics")]
    graphics: Option<PathwayGraphicsXml>,
    #[serde(rename = "DataNode", default)]
    data_nodes: Vec<DataNodeXml>,
    #[serde(rename = "State", default)]
    states: Vec<StateXml>,
    #[serde(rename = "Interaction", default)]
    interactions: Vec<LineXml>,
    #[serde(rename = "GraphicalLine", default)]
    graphical_lines: Vec<LineXml>,
    #[serde(rename = "Label", default)]
    labels: Vec<LabelXml>,
    #[serde(rename = "Shape", default)]
    shapes: Vec<ShapeXml>,
    #[serde(rename = "Group", default)]
    groups: Vec<GroupXml>,
});

/// A `bp:PublicationXref` record.
#[derive(Clone, Debug, Default, PartialEq)]
struct Publication {
    rdf_id: String,
    id: String,
    db: String,
}

/// A `bp:openControlledVocabulary` term.
#[derive(Clone, Debug, Default, PartialEq)]
struct OntologyTerm {
    term: String,
    id: String,
    ontology: String,
}

/// The records of the trailing `Biopax` block.  The block holds RDF in
/// foreign namespaces, so it is walked as raw events rather than through
/// serde.
#[derive(Debug, Default, PartialEq)]
struct Biopax {
    publications: Vec<Publication>,
    terms: Vec<OntologyTerm>,
}

enum BiopaxRecord {
    Publication(Publication),
    Term(OntologyTerm),
}

fn rdf_id(e: &BytesStart) -> String {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref().eq_ignore_ascii_case(b"id"))
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
        .unwrap_or_default()
}

impl Biopax {
    fn parse(document: &str) -> Result<Biopax> {
        let mut reader = Reader::from_str(document);
        let mut biopax = Biopax::default();
        let mut in_block = false;
        let mut record: Option<BiopaxRecord> = None;
        let mut field: Option<Vec<u8>> = None;

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    return import_err!(
                        MalformedDocument,
                        format!("at byte {}: {}", reader.error_position(), err)
                    );
                }
            };
            match event {
                Event::Start(ref e) => match e.local_name().as_ref() {
                    b"Biopax" => in_block = true,
                    b"PublicationXref" if in_block => {
                        record = Some(BiopaxRecord::Publication(Publication {
                            rdf_id: rdf_id(e),
                            ..Default::default()
                        }));
                    }
                    b"openControlledVocabulary" if in_block => {
                        record = Some(BiopaxRecord::Term(OntologyTerm::default()));
                    }
                    name if record.is_some() => field = Some(name.to_vec()),
                    _ => {}
                },
                Event::Text(ref text) => {
                    if let (Some(record), Some(field)) = (record.as_mut(), field.as_deref()) {
                        let text = String::from_utf8_lossy(text);
                        let value = match (record, field) {
                            (BiopaxRecord::Publication(p), b"ID") => &mut p.id,
                            (BiopaxRecord::Publication(p), b"DB") => &mut p.db,
                            (BiopaxRecord::Term(t), b"TERM") => &mut t.term,
                            (BiopaxRecord::Term(t), b"ID") => &mut t.id,
                            (BiopaxRecord::Term(t), b"Ontology") => &mut t.ontology,
                            _ => continue,
                        };
                        value.push_str(text.trim());
                    }
                }
                Event::End(ref e) => match e.local_name().as_ref() {
                    b"Biopax" => in_block = false,
                    b"PublicationXref" | b"openControlledVocabulary" => match record.take() {
                        Some(BiopaxRecord::Publication(p)) => biopax.publications.push(p),
                        Some(BiopaxRecord::Term(t)) => biopax.terms.push(t),
                        None => {}
                    },
                    _ => field = None,
                },
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(biopax)
    }
}

fn comments_from(comments: &[CommentXml]) -> Vec<Comment> {
    comments
        .iter()
        .map(|comment| Comment {
            source: non_empty(comment.source.as_deref()),
            text: comment.text.trim().to_owned(),
        })
        .collect()
}

fn properties_from(attributes: &[AttributeXml]) -> BTreeMap<String, String> {
    attributes
        .iter()
        .map(|attr| (attr.key.clone(), attr.value.clone()))
        .collect()
}

macro_rules! with_meta {
    ($element:expr, $x:expr) => {{
        let mut element = $element;
        element.comments = comments_from(&$x.comments);
        element.properties = properties_from(&$x.attributes);
        element
    }};
}

/// Resolves legacy `GroupRef` values, which name a group's `GroupId`.
struct GroupIds(HashMap<String, ElementId>);

impl GroupIds {
    fn resolve(&self, group_ref: &Option<String>) -> Result<Option<String>> {
        let Some(group_ref) = group_ref.as_deref().map(str::trim).filter(|r| !r.is_empty())
        else {
            return Ok(None);
        };
        match self.0.get(group_ref) {
            Some(id) => Ok(Some(id.to_string())),
            None => import_err!(InvalidReference, format!("no group with GroupId {group_ref}")),
        }
    }
}

/// Every `GraphId` the document assigns.
fn graph_ids(file: &File) -> HashSet<&str> {
    let lines = file.interactions.iter().chain(file.graphical_lines.iter());
    let line_parts = lines.clone().filter_map(|line| line.graphics.as_ref()).flat_map(|g| {
        g.points
            .iter()
            .filter_map(|point| point.graph_id.as_deref())
            .chain(g.anchors.iter().filter_map(|anchor| anchor.graph_id.as_deref()))
    });
    file.data_nodes
        .iter()
        .map(|node| node.graph_id.as_str())
        .chain(file.states.iter().map(|state| state.graph_id.as_str()))
        .chain(lines.map(|line| line.graph_id.as_str()))
        .chain(line_parts)
        .chain(file.labels.iter().map(|label| label.graph_id.as_str()))
        .chain(file.shapes.iter().map(|shape| shape.graph_id.as_str()))
        .chain(file.groups.iter().map(|group| group.graph_id.as_str()))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .collect()
}

fn populate(file: File, biopax: Biopax, model: &mut PathwayModel) -> Result<()> {
    let description = file
        .comments
        .iter()
        .find(|comment| comment.source.as_deref() == Some(DESCRIPTION_SOURCE))
        .and_then(|comment| non_empty(Some(&comment.text)));
    let comments: Vec<CommentXml> = file
        .comments
        .iter()
        .filter(|comment| comment.source.as_deref() != Some(DESCRIPTION_SOURCE))
        .cloned()
        .collect();
    let mut properties = properties_from(&file.attributes);
    for (key, value) in [
        ("Maintainer", &file.maintainer),
        ("Email", &file.email),
        ("Last-Modified", &file.last_modified),
    ] {
        if let Some(value) = non_empty(value.as_deref()) {
            properties.insert(key.to_owned(), value);
        }
    }

    let graphics = file.graphics.clone().unwrap_or_default();
    model.update_pathway(|pathway| {
        pathway.title = file.name.clone();
        pathway.organism = non_empty(file.organism.as_deref());
        pathway.source = non_empty(file.data_source.as_deref());
        pathway.version = non_empty(file.version.as_deref());
        pathway.license = non_empty(file.license.as_deref());
        pathway.description = description;
        pathway.authors = non_empty(file.author.as_deref())
            .map(|name| {
                vec![Author {
                    name,
                    ..Default::default()
                }]
            })
            .unwrap_or_default();
        pathway.board_width = graphics.board_width.unwrap_or(defaults::BOARD_WIDTH);
        pathway.board_height = graphics.board_height.unwrap_or(defaults::BOARD_HEIGHT);
        pathway.comments = comments_from(&comments);
        pathway.properties = properties;
    });

    let mut citations = ValueIds::default();
    for publication in biopax.publications.iter() {
        let content = CitationContent {
            xref: requested_id(&publication.id).map(|_| Xref::new(&publication.id, &publication.db)),
            url_link: None,
        };
        let id = add_with_id(
            model,
            PathwayElement::new(ElementKind::Citation(content)),
            &publication.rdf_id,
            None,
        )?;
        citations.insert(publication.rdf_id.clone(), id);
    }
    for term in biopax.terms.iter() {
        let mut content = AnnotationContent::new(&term.term, AnnotationType::Ontology);
        content.xref = requested_id(&term.id).map(|_| Xref::new(&term.id, &term.ontology));
        let annotation = model.add_or_reuse_annotation(content)?;
        model.link_annotation_ref(RefSource::Pathway, &annotation)?;
    }

    // GroupId and GraphId are separate namespaces: a group without a
    // GraphId only takes its GroupId as element id when nothing else does
    let graph_ids = graph_ids(&file);
    let mut group_ids = GroupIds(HashMap::new());
    let mut linked: Vec<(ElementId, &[String])> = vec![];
    let mut group_elements = Vec::with_capacity(file.groups.len());
    for group in file.groups.iter() {
        let group_type = match group.style.as_deref().map(str::trim) {
            None | Some("") | Some("None") => defaults::GROUP_TYPE,
            Some(style) => model.types_mut().resolve::<GroupType>(style),
        };
        let mut content = Group::new(group_type);
        content.text_label = group.text_label.clone().unwrap_or_default();
        let element = with_meta!(PathwayElement::new(ElementKind::Group(content)), group);
        let group_id = group.group_id.trim();
        let element_id = if !group.graph_id.trim().is_empty() {
            group.graph_id.clone()
        } else if !group_id.is_empty()
            && !graph_ids.contains(group_id)
            && model.find_by_id(group_id).is_none()
        {
            group_id.to_owned()
        } else {
            let id = model.unused_id(|id| graph_ids.contains(id));
            debug!(group_id, element = %id, "GroupId is taken, generated an element id");
            id.to_string()
        };
        let id = add_with_id(model, element, &element_id, None)?;
        group_ids.0.insert(group.group_id.trim().to_owned(), id.clone());
        group_elements.push(id.clone());
        linked.push((id, &group.biopax_refs));
    }

    let default_graphics = ShapeGraphicsXml::default();
    for node in file.data_nodes.iter() {
        let g = node.graphics.as_ref().unwrap_or(&default_graphics);
        let node_type = match node.node_type.as_deref().map(str::trim) {
            None | Some("") | Some("Unknown") => defaults::DATA_NODE_TYPE,
            Some(name) => model.types_mut().resolve::<DataNodeType>(name),
        };
        let mut content = DataNode::new(node.text_label.clone(), node_type);
        content.xref = read_xref(&node.xref);
        content.rect = g.rect();
        content.font = g.font();
        content.style = g.style(model.types_mut());
        let element = with_meta!(PathwayElement::new(ElementKind::DataNode(content)), node);
        let group = group_ids.resolve(&node.group_ref)?;
        let id = add_with_id(model, element, &node.graph_id, group.as_ref())?;
        linked.push((id, &node.biopax_refs));
    }

    for state in file.states.iter() {
        let Some(node) = requested_id(&state.graph_ref) else {
            return import_err!(InvalidReference, "State without GraphRef".to_owned());
        };
        let g = state.graphics.as_ref().unwrap_or(&default_graphics);
        let mut content = State::new(node, state.text_label.clone());
        content.state_type = state
            .state_type
            .as_deref()
            .map(|name| model.types_mut().resolve::<StateType>(name))
            .unwrap_or(defaults::STATE_TYPE);
        content.xref = read_xref(&state.xref);
        content.rel_x = g.rel_x.unwrap_or_default();
        content.rel_y = g.rel_y.unwrap_or_default();
        content.width = g.width.unwrap_or_default();
        content.height = g.height.unwrap_or_default();
        content.font = g.font();
        content.style = g.style(model.types_mut());
        let element = with_meta!(PathwayElement::new(ElementKind::State(content)), state);
        let id = add_with_id(model, element, &state.graph_id, None)?;
        linked.push((id, &state.biopax_refs));
    }

    let mut point_links: Vec<(ElementId, ElementId)> = vec![];
    let lines = file
        .interactions
        .iter()
        .map(|line| (line, true))
        .chain(file.graphical_lines.iter().map(|line| (line, false)));
    for (line, is_interaction) in lines {
        let graphics = line.graphics.clone().unwrap_or_default();
        let mut content = LineElement::new();
        content.graphics = LineGraphics::from(&graphics);
        let kind = if is_interaction {
            content.xref = read_xref(&line.xref);
            ElementKind::Interaction(content)
        } else {
            ElementKind::GraphicalLine(content)
        };
        let element = with_meta!(PathwayElement::new(kind), line);
        let group = group_ids.resolve(&line.group_ref)?;
        let id = add_with_id(model, element, &line.graph_id, group.as_ref())?;

        for point in graphics.points.iter() {
            let mut content = LinePoint::new(id.clone(), point.x, point.y);
            content.arrow_head = point
                .arrow_head
                .as_deref()
                .map(|name| model.types_mut().resolve::<ArrowHeadType>(arrow_head_name(name)))
                .unwrap_or(defaults::ARROW_HEAD);
            content.rel_x = point.rel_x;
            content.rel_y = point.rel_y;
            let element = PathwayElement::new(ElementKind::LinePoint(content));
            let point_id = add_with_id(
                model,
                element,
                point.graph_id.as_deref().unwrap_or_default(),
                None,
            )?;
            if let Some(target) = point.graph_ref.as_deref().and_then(requested_id) {
                point_links.push((point_id, target));
            }
        }
        for anchor in graphics.anchors.iter() {
            let mut content = Anchor::new(
                id.clone(),
                anchor.position.unwrap_or(defaults::ANCHOR_POSITION),
            );
            content.shape_type = anchor
                .shape
                .as_deref()
                .map(|name| model.types_mut().resolve::<AnchorShapeType>(name))
                .unwrap_or(defaults::ANCHOR_SHAPE);
            let element = PathwayElement::new(ElementKind::Anchor(content));
            add_with_id(model, element, anchor.graph_id.as_deref().unwrap_or_default(), None)?;
        }
        linked.push((id, &line.biopax_refs));
    }

    for label in file.labels.iter() {
        let g = label.graphics.as_ref().unwrap_or(&default_graphics);
        let mut content = Label::new(label.text_label.clone());
        content.href = non_empty(label.href.as_deref());
        content.rect = g.rect();
        content.font = g.font();
        content.style = g.style(model.types_mut());
        let element = with_meta!(PathwayElement::new(ElementKind::Label(content)), label);
        let group = group_ids.resolve(&label.group_ref)?;
        let id = add_with_id(model, element, &label.graph_id, group.as_ref())?;
        linked.push((id, &label.biopax_refs));
    }

    for shape in file.shapes.iter() {
        let g = shape.graphics.as_ref().unwrap_or(&default_graphics);
        let mut content = Shape::new(defaults::SHAPE_TYPE);
        content.text_label = shape.text_label.clone().unwrap_or_default();
        content.rect = g.rect();
        content.font = g.font();
        content.style = g.style(model.types_mut());
        let element = with_meta!(PathwayElement::new(ElementKind::Shape(content)), shape);
        let group = group_ids.resolve(&shape.group_ref)?;
        let id = add_with_id(model, element, &shape.graph_id, group.as_ref())?;
        linked.push((id, &shape.biopax_refs));
    }

    for (group, id) in file.groups.iter().zip(group_elements.iter()) {
        if let Some(parent) = group_ids.resolve(&group.group_ref)? {
            model.set_group(id, Some(&ElementId::from(parent)))?;
        }
    }
    for (point, target) in point_links {
        model.set_element_ref(&point, Some(&target))?;
    }

    for biopax_ref in file.biopax_refs.iter() {
        let citation = citations.get(biopax_ref)?.clone();
        model.link_citation_ref(RefSource::Pathway, &citation)?;
    }
    for (id, biopax_refs) in linked {
        for biopax_ref in biopax_refs.iter() {
            let citation = citations.get(biopax_ref)?.clone();
            model.link_citation_ref(&id, &citation)?;
        }
    }

    debug!(
        publications = biopax.publications.len(),
        terms = biopax.terms.len(),
        "read legacy pathway"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorCode;
    use crate::datamodel::ObjectType;
    use crate::gpml::{ReadOptions, read_str};
    use crate::types::Color;

    const LEGACY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Pathway xmlns="http://pathvisio.org/GPML/2013a" Name="Legacy" Organism="Homo sapiens">
    <Comment Source="WikiPathways-description">A small pathway.</Comment>
    <Comment>Drawn by hand.</Comment>
    <BiopaxRef>pub1</BiopaxRef>
    <Graphics BoardWidth="400" BoardHeight="300"/>
    <DataNode TextLabel="TP53" GraphId="n1" Type="Unknown" GroupRef="grp">
        <Attribute Key="note" Value="tumor suppressor"/>
        <BiopaxRef>pub1</BiopaxRef>
        <Graphics CenterX="100" CenterY="100" Width="80" Height="20" Color="ff0000" LineStyle="Broken" LineThickness="2"/>
        <Xref Database="Entrez Gene" ID="7157"/>
    </DataNode>
    <DataNode TextLabel="MDM2" GraphId="n2" Type="GeneProduct">
        <Graphics CenterX="300" CenterY="100" Width="80" Height="20"/>
        <Xref Database="" ID=""/>
    </DataNode>
    <State GraphRef="n1" TextLabel="P" GraphId="s1" StateType="ProteinModification">
        <Graphics RelX="1.0" RelY="-1.0" Width="15" Height="15"/>
    </State>
    <Interaction GraphId="i1">
        <Graphics ZOrder="12288" LineThickness="1.5">
            <Point X="140" Y="100" GraphRef="n1" RelX="1.0" RelY="0.0" GraphId="p1"/>
            <Point X="260" Y="100" GraphRef="n2" RelX="-1.0" RelY="0.0" GraphId="p2" ArrowHead="mim-inhibition"/>
            <Anchor Position="0.5" Shape="Circle" GraphId="a1"/>
        </Graphics>
        <Xref Database="" ID=""/>
    </Interaction>
    <Group GroupId="grp" GraphId="g1" Style="Complex"/>
    <Group GroupId="empty" GraphId="g2" Style="None"/>
    <InfoBox CenterX="0" CenterY="0"/>
    <Biopax>
        <bp:PublicationXref xmlns:bp="http://www.biopax.org/release/biopax-level3.owl#" xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" rdf:id="pub1">
            <bp:ID rdf:datatype="http://www.w3.org/2001/XMLSchema#string">8479518</bp:ID>
            <bp:DB rdf:datatype="http://www.w3.org/2001/XMLSchema#string">PubMed</bp:DB>
            <bp:TITLE rdf:datatype="http://www.w3.org/2001/XMLSchema#string">p53</bp:TITLE>
        </bp:PublicationXref>
        <bp:openControlledVocabulary xmlns:bp="http://www.biopax.org/release/biopax-level3.owl#">
            <bp:TERM>apoptosis pathway</bp:TERM>
            <bp:ID>PW:0000009</bp:ID>
            <bp:Ontology>Pathway Ontology</bp:Ontology>
        </bp:openControlledVocabulary>
    </Biopax>
</Pathway>"#;

    #[test]
    fn test_biopax_block() {
        let biopax = Biopax::parse(LEGACY).unwrap();
        assert_eq!(
            vec![Publication {
                rdf_id: "pub1".to_owned(),
                id: "8479518".to_owned(),
                db: "PubMed".to_owned(),
            }],
            biopax.publications
        );
        assert_eq!("apoptosis pathway", biopax.terms[0].term);
        assert_eq!("Pathway Ontology", biopax.terms[0].ontology);
    }

    #[test]
    fn test_legacy_mapping() {
        let model = read_str(LEGACY, &ReadOptions::default()).unwrap();
        let pathway = model.pathway();
        assert_eq!("Legacy", pathway.title);
        assert_eq!(Some("A small pathway."), pathway.description.as_deref());
        assert_eq!(1, pathway.comments.len());
        assert_eq!(400.0, pathway.board_width);

        let n1 = model.find_by_id("n1").unwrap();
        let node = n1.as_data_node().unwrap();
        assert_eq!(DataNodeType::UNDEFINED, node.data_node_type);
        assert_eq!(Color::rgb(255, 0, 0), node.font.text_color);
        assert_eq!(Color::rgb(255, 0, 0), node.style.border_color);
        assert_eq!(LineStyle::Dashed, node.style.border_style);
        assert_eq!(2.0, node.style.border_width);
        assert_eq!(Some("tumor suppressor"), n1.properties.get("note").map(String::as_str));
        assert_eq!(Some(&ElementId::from("g1")), n1.group_ref());
        assert_eq!(1, n1.refs().len());

        let n2 = model.find_by_id("n2").unwrap();
        assert_eq!(None, n2.as_data_node().unwrap().xref);

        let state = model.find_by_id("s1").unwrap().as_state().unwrap();
        assert_eq!(ElementId::from("n1"), state.data_node);
        assert_eq!(vec![ElementId::from("s1")], node.states().to_vec());

        let p2 = model.find_by_id("p2").unwrap().as_point().unwrap();
        assert_eq!(ArrowHeadType::INHIBITION, p2.arrow_head);
        assert_eq!(Some(&ElementId::from("n2")), p2.element_ref());
        let a1 = model.find_by_id("a1").unwrap().as_anchor().unwrap();
        assert_eq!(AnchorShapeType::CIRCLE, a1.shape_type);

        let line = model.find_by_id("i1").unwrap().as_line().unwrap();
        assert_eq!(1.5, line.graphics.line_width);
        assert_eq!(Some(12288), line.graphics.z_order);

        let group = model.find_by_id("g1").unwrap().as_group().unwrap();
        assert_eq!(GroupType::COMPLEX, group.group_type);
        // the member-less group is pruned on read
        assert!(model.find_by_id("g2").is_none());
    }

    #[test]
    fn test_biopax_refs_become_citations() {
        let model = read_str(LEGACY, &ReadOptions::default()).unwrap();
        let citation = model.find_by_id("pub1").unwrap().as_citation().unwrap();
        assert_eq!(Some(Xref::new("8479518", "PubMed")), citation.xref);
        assert_eq!(2, model.back_refs(&ElementId::from("pub1")).len());

        let annotations: Vec<_> = model.elements_of_type(ObjectType::Annotation).collect();
        assert_eq!(1, annotations.len());
        let annotation = annotations[0].as_annotation().unwrap();
        assert_eq!(AnnotationType::Ontology, annotation.annotation_type);
        assert_eq!(2, model.pathway().refs().len());
    }

    #[test]
    fn test_unknown_group_ref() {
        let doc = LEGACY.replace(r#"GroupRef="grp""#, r#"GroupRef="nowhere""#);
        let err = read_str(&doc, &ReadOptions::default()).unwrap_err();
        assert_eq!(ErrorCode::InvalidReference, err.code);
    }

    #[test]
    fn test_arrow_head_names() {
        assert_eq!("Undirected", arrow_head_name("Line"));
        assert_eq!("Inhibition", arrow_head_name("TBar"));
        assert_eq!("Stimulation", arrow_head_name("mim-necessary-stimulation"));
        assert_eq!("Binding", arrow_head_name("Binding"));
    }
}
