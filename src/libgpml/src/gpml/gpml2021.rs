// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! GPML 2021, the current generation: read and written.

use std::collections::BTreeMap;

use quick_xml::Writer;
use serde::Deserialize;

use super::schema::GPML_2021;
use super::{
    Attrs, FormatReader, FormatWriter, SchemaVersion, ToXml, ValueIds, XmlWriter, add_with_id,
    closed_or, color_or, defaults, finish_writer, malformed, new_writer, non_empty,
    requested_id, write_empty_tag, write_tag, write_tag_end, write_tag_start_with_attrs,
    write_tag_with_attrs,
};
use crate::common::Result;
use crate::datamodel::{
    Anchor, AnnotationContent, Author, CitationContent, Comment, DataNode, ElementKind,
    EvidenceContent, FontStyle, Group, Label, LineElement, LineGraphics, LinePoint, ObjectType,
    PathwayElement, Rect, Shape, ShapeStyle, State, Xref,
};
use crate::ids::ElementId;
use crate::model::PathwayModel;
use crate::refs::{RefKind, RefSource};
use crate::types::{
    AnchorShapeType, AnnotationType, ArrowHeadType, ConnectorType, DataNodeType, GroupType,
    HAlign, LineStyle, ShapeType, StateType, TypeRegistry, VAlign,
};

/// Reader and writer for `http://pathvisio.org/GPML/2021`.
#[derive(Copy, Clone, Debug, Default)]
pub struct Gpml2021;

impl SchemaVersion for Gpml2021 {
    fn namespace(&self) -> &'static str {
        super::GPML_2021_NS
    }

    fn validate(&self, document: &str) -> Result<()> {
        GPML_2021.validate(document)
    }
}

impl FormatReader for Gpml2021 {
    fn read_from_root(&self, document: &str, model: &mut PathwayModel) -> Result<()> {
        let file: File = quick_xml::de::from_str(document).map_err(malformed)?;
        populate(file, model)
    }
}

impl FormatWriter for Gpml2021 {
    fn create_document(&self, model: &PathwayModel) -> Result<String> {
        let file = File::from(model);
        let mut writer = new_writer()?;
        file.write_xml(&mut writer)?;
        finish_writer(writer)
    }
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct XrefXml {
    #[serde(rename = "@identifier", default)]
    pub identifier: String,
    #[serde(rename = "@dataSource", default)]
    pub data_source: String,
}

impl ToXml<XmlWriter> for XrefXml {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        let attrs = Attrs::new()
            .with("identifier", &self.identifier)
            .with("dataSource", &self.data_source);
        write_empty_tag(writer, "Xref", &attrs)
    }
}

impl From<&XrefXml> for Xref {
    fn from(xref: &XrefXml) -> Self {
        Xref::new(xref.identifier.trim(), xref.data_source.trim())
    }
}

impl From<&Xref> for XrefXml {
    fn from(xref: &Xref) -> Self {
        XrefXml {
            identifier: xref.identifier.clone(),
            data_source: xref.data_source.clone(),
        }
    }
}

fn read_xref(xref: &Option<XrefXml>) -> Option<Xref> {
    xref.as_ref()
        .map(Xref::from)
        .filter(|xref| !xref.identifier.is_empty() || !xref.data_source.is_empty())
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct CommentXml {
    #[serde(rename = "@source")]
    pub source: Option<String>,
    #[serde(rename = "$text", default)]
    pub text: String,
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct PropertyXml {
    #[serde(rename = "@key", default)]
    pub key: String,
    #[serde(rename = "@value", default)]
    pub value: String,
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct RefXml {
    #[serde(rename = "@elementRef", default)]
    pub element_ref: String,
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct AnnotationRefXml {
    #[serde(rename = "@elementRef", default)]
    pub element_ref: String,
    #[serde(rename = "CitationRef", default)]
    pub citation_refs: Vec<RefXml>,
    #[serde(rename = "EvidenceRef", default)]
    pub evidence_refs: Vec<RefXml>,
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct UrlLinkXml {
    #[serde(rename = "@link", default)]
    pub link: String,
}

/// The children every referencing element carries after its own content.
#[derive(Default)]
struct Meta {
    comments: Vec<CommentXml>,
    properties: Vec<PropertyXml>,
    annotation_refs: Vec<AnnotationRefXml>,
    citation_refs: Vec<RefXml>,
    evidence_refs: Vec<RefXml>,
}

macro_rules! meta_of {
    ($x:expr) => {
        Meta {
            comments: $x.comments.clone(),
            properties: $x.properties.clone(),
            annotation_refs: $x.annotation_refs.clone(),
            citation_refs: $x.citation_refs.clone(),
            evidence_refs: $x.evidence_refs.clone(),
        }
    };
}

/// Move model-side metadata into the fields of an XML element struct.
macro_rules! set_meta {
    ($x:expr, $meta:expr) => {{
        let meta = $meta;
        $x.comments = meta.comments;
        $x.properties = meta.properties;
        $x.annotation_refs = meta.annotation_refs;
        $x.citation_refs = meta.citation_refs;
        $x.evidence_refs = meta.evidence_refs;
    }};
}

impl ToXml<XmlWriter> for Meta {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        for comment in self.comments.iter() {
            let attrs = Attrs::new().with_opt("source", comment.source.as_ref());
            write_tag_with_attrs(writer, "Comment", &comment.text, &attrs)?;
        }
        for property in self.properties.iter() {
            let attrs = Attrs::new()
                .with("key", &property.key)
                .with("value", &property.value);
            write_empty_tag(writer, "Property", &attrs)?;
        }
        for annotation_ref in self.annotation_refs.iter() {
            let attrs = Attrs::new().with("elementRef", &annotation_ref.element_ref);
            if annotation_ref.citation_refs.is_empty() && annotation_ref.evidence_refs.is_empty() {
                write_empty_tag(writer, "AnnotationRef", &attrs)?;
                continue;
            }
            write_tag_start_with_attrs(writer, "AnnotationRef", &attrs)?;
            write_refs(writer, "CitationRef", &annotation_ref.citation_refs)?;
            write_refs(writer, "EvidenceRef", &annotation_ref.evidence_refs)?;
            write_tag_end(writer, "AnnotationRef")?;
        }
        write_refs(writer, "CitationRef", &self.citation_refs)?;
        write_refs(writer, "EvidenceRef", &self.evidence_refs)
    }
}

fn write_refs(writer: &mut Writer<XmlWriter>, tag: &str, refs: &[RefXml]) -> Result<()> {
    for r in refs.iter() {
        write_empty_tag(writer, tag, &Attrs::new().with("elementRef", &r.element_ref))?;
    }
    Ok(())
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct AuthorXml {
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@username")]
    pub username: Option<String>,
    #[serde(rename = "@order")]
    pub order: Option<i32>,
    #[serde(rename = "Xref")]
    pub xref: Option<XrefXml>,
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct AuthorsXml {
    #[serde(rename = "Author", default)]
    pub authors: Vec<AuthorXml>,
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct PathwayGraphicsXml {
    #[serde(rename = "@boardWidth")]
    pub board_width: Option<f64>,
    #[serde(rename = "@boardHeight")]
    pub board_height: Option<f64>,
    #[serde(rename = "@backgroundColor")]
    pub background_color: Option<String>,
}

/// Graphics of data nodes, states, labels, shapes and groups.  States
/// position themselves with relX/relY, everything else with a center.
#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct ShapeGraphicsXml {
    #[serde(rename = "@centerX")]
    pub center_x: Option<f64>,
    #[serde(rename = "@centerY")]
    pub center_y: Option<f64>,
    #[serde(rename = "@relX")]
    pub rel_x: Option<f64>,
    #[serde(rename = "@relY")]
    pub rel_y: Option<f64>,
    #[serde(rename = "@width")]
    pub width: Option<f64>,
    #[serde(rename = "@height")]
    pub height: Option<f64>,
    #[serde(rename = "@textColor")]
    pub text_color: Option<String>,
    #[serde(rename = "@fontName")]
    pub font_name: Option<String>,
    #[serde(rename = "@fontWeight")]
    pub font_weight: Option<String>,
    #[serde(rename = "@fontStyle")]
    pub font_style: Option<String>,
    #[serde(rename = "@fontDecoration")]
    pub font_decoration: Option<String>,
    #[serde(rename = "@fontStrikethru")]
    pub font_strikethru: Option<String>,
    #[serde(rename = "@fontSize")]
    pub font_size: Option<f64>,
    #[serde(rename = "@hAlign")]
    pub h_align: Option<String>,
    #[serde(rename = "@vAlign")]
    pub v_align: Option<String>,
    #[serde(rename = "@borderColor")]
    pub border_color: Option<String>,
    #[serde(rename = "@borderStyle")]
    pub border_style: Option<String>,
    #[serde(rename = "@borderWidth")]
    pub border_width: Option<f64>,
    #[serde(rename = "@fillColor")]
    pub fill_color: Option<String>,
    #[serde(rename = "@shapeType")]
    pub shape_type: Option<String>,
    #[serde(rename = "@zOrder")]
    pub z_order: Option<i32>,
    #[serde(rename = "@rotation")]
    pub rotation: Option<f64>,
}

impl ShapeGraphicsXml {
    fn font(&self) -> FontStyle {
        FontStyle {
            text_color: color_or(self.text_color.as_deref(), defaults::TEXT_COLOR, "textColor"),
            font_name: self
                .font_name
                .clone()
                .unwrap_or_else(|| defaults::FONT_NAME.to_owned()),
            bold: self.font_weight.as_deref() == Some("Bold"),
            italic: self.font_style.as_deref() == Some("Italic"),
            underline: self.font_decoration.as_deref() == Some("Underline"),
            strikethru: self.font_strikethru.as_deref() == Some("Strikethru"),
            font_size: self.font_size.unwrap_or(defaults::FONT_SIZE),
            h_align: closed_or(self.h_align.as_deref(), HAlign::from_name, defaults::H_ALIGN),
            v_align: closed_or(self.v_align.as_deref(), VAlign::from_name, defaults::V_ALIGN),
        }
    }

    fn style(&self, types: &mut TypeRegistry) -> ShapeStyle {
        ShapeStyle {
            border_color: color_or(
                self.border_color.as_deref(),
                defaults::BORDER_COLOR,
                "borderColor",
            ),
            border_style: closed_or(
                self.border_style.as_deref(),
                LineStyle::from_name,
                defaults::BORDER_STYLE,
            ),
            border_width: self.border_width.unwrap_or(defaults::BORDER_WIDTH),
            fill_color: color_or(self.fill_color.as_deref(), defaults::FILL_COLOR, "fillColor"),
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

    fn from_parts(font: &FontStyle, style: &ShapeStyle) -> Self {
        let flag = |on: bool, name: &str| (if on { name } else { "Normal" }).to_owned();
        ShapeGraphicsXml {
            text_color: Some(font.text_color.to_hex()),
            font_name: Some(font.font_name.clone()),
            font_weight: Some(flag(font.bold, "Bold")),
            font_style: Some(flag(font.italic, "Italic")),
            font_decoration: Some(flag(font.underline, "Underline")),
            font_strikethru: Some(flag(font.strikethru, "Strikethru")),
            font_size: Some(font.font_size),
            h_align: Some(font.h_align.as_str().to_owned()),
            v_align: Some(font.v_align.as_str().to_owned()),
            border_color: Some(style.border_color.to_hex()),
            border_style: Some(style.border_style.as_str().to_owned()),
            border_width: Some(style.border_width),
            fill_color: Some(style.fill_color.to_hex()),
            shape_type: Some(style.shape_type.as_str().to_owned()),
            z_order: style.z_order,
            rotation: Some(style.rotation),
            ..Default::default()
        }
    }

    fn with_rect(mut self, rect: &Rect) -> Self {
        self.center_x = Some(rect.center_x);
        self.center_y = Some(rect.center_y);
        self.width = Some(rect.width);
        self.height = Some(rect.height);
        self
    }
}

impl ToXml<XmlWriter> for ShapeGraphicsXml {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        let attrs = Attrs::new()
            .with_opt("centerX", self.center_x)
            .with_opt("centerY", self.center_y)
            .with_opt("relX", self.rel_x)
            .with_opt("relY", self.rel_y)
            .with_opt("width", self.width)
            .with_opt("height", self.height)
            .with_opt("textColor", self.text_color.as_ref())
            .with_opt("fontName", self.font_name.as_ref())
            .with_opt("fontWeight", self.font_weight.as_ref())
            .with_opt("fontStyle", self.font_style.as_ref())
            .with_opt("fontDecoration", self.font_decoration.as_ref())
            .with_opt("fontStrikethru", self.font_strikethru.as_ref())
            .with_opt("fontSize", self.font_size)
            .with_opt("hAlign", self.h_align.as_ref())
            .with_opt("vAlign", self.v_align.as_ref())
            .with_opt("borderColor", self.border_color.as_ref())
            .with_opt("borderStyle", self.border_style.as_ref())
            .with_opt("borderWidth", self.border_width)
            .with_opt("fillColor", self.fill_color.as_ref())
            .with_opt("shapeType", self.shape_type.as_ref())
            .with_opt("zOrder", self.z_order)
            .with_opt("rotation", self.rotation);
        write_empty_tag(writer, "Graphics", &attrs)
    }
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct LineGraphicsXml {
    #[serde(rename = "@lineColor")]
    pub line_color: Option<String>,
    #[serde(rename = "@lineStyle")]
    pub line_style: Option<String>,
    #[serde(rename = "@lineWidth")]
    pub line_width: Option<f64>,
    #[serde(rename = "@connectorType")]
    pub connector_type: Option<String>,
    #[serde(rename = "@zOrder")]
    pub z_order: Option<i32>,
}

impl From<&LineGraphicsXml> for LineGraphics {
    fn from(g: &LineGraphicsXml) -> Self {
        LineGraphics {
            line_color: color_or(g.line_color.as_deref(), defaults::LINE_COLOR, "lineColor"),
            line_style: closed_or(g.line_style.as_deref(), LineStyle::from_name, defaults::LINE_STYLE),
            line_width: g.line_width.unwrap_or(defaults::LINE_WIDTH),
            connector_type: closed_or(
                g.connector_type.as_deref(),
                ConnectorType::from_name,
                defaults::CONNECTOR_TYPE,
            ),
            z_order: g.z_order,
        }
    }
}

impl From<&LineGraphics> for LineGraphicsXml {
    fn from(g: &LineGraphics) -> Self {
        LineGraphicsXml {
            line_color: Some(g.line_color.to_hex()),
            line_style: Some(g.line_style.as_str().to_owned()),
            line_width: Some(g.line_width),
            connector_type: Some(g.connector_type.as_str().to_owned()),
            z_order: g.z_order,
        }
    }
}

impl ToXml<XmlWriter> for LineGraphicsXml {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        let attrs = Attrs::new()
            .with_opt("lineColor", self.line_color.as_ref())
            .with_opt("lineStyle", self.line_style.as_ref())
            .with_opt("lineWidth", self.line_width)
            .with_opt("connectorType", self.connector_type.as_ref())
            .with_opt("zOrder", self.z_order);
        write_empty_tag(writer, "Graphics", &attrs)
    }
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct PointXml {
    #[serde(rename = "@elementId", default)]
    pub element_id: String,
    #[serde(rename = "@x", default)]
    pub x: f64,
    #[serde(rename = "@y", default)]
    pub y: f64,
    #[serde(rename = "@elementRef")]
    pub element_ref: Option<String>,
    #[serde(rename = "@relX")]
    pub rel_x: Option<f64>,
    #[serde(rename = "@relY")]
    pub rel_y: Option<f64>,
    #[serde(rename = "@arrowHead")]
    pub arrow_head: Option<String>,
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct AnchorXml {
    #[serde(rename = "@elementId", default)]
    pub element_id: String,
    #[serde(rename = "@position")]
    pub position: Option<f64>,
    #[serde(rename = "@shapeType")]
    pub shape_type: Option<String>,
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct WaypointsXml {
    #[serde(rename = "Point", default)]
    pub points: Vec<PointXml>,
    #[serde(rename = "Anchor", default)]
    pub anchors: Vec<AnchorXml>,
}

impl ToXml<XmlWriter> for WaypointsXml {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        write_tag_start_with_attrs(writer, "Waypoints", &Attrs::new())?;
        for point in self.points.iter() {
            let attrs = Attrs::new()
                .with("elementId", &point.element_id)
                .with("x", point.x)
                .with("y", point.y)
                .with_opt("elementRef", point.element_ref.as_ref())
                .with_opt("relX", point.rel_x)
                .with_opt("relY", point.rel_y)
                .with_opt("arrowHead", point.arrow_head.as_ref());
            write_empty_tag(writer, "Point", &attrs)?;
        }
        for anchor in self.anchors.iter() {
            let attrs = Attrs::new()
                .with("elementId", &anchor.element_id)
                .with_opt("position", anchor.position)
                .with_opt("shapeType", anchor.shape_type.as_ref());
            write_empty_tag(writer, "Anchor", &attrs)?;
        }
        write_tag_end(writer, "Waypoints")
    }
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct StateXml {
    #[serde(rename = "@elementId", default)]
    pub element_id: String,
    #[serde(rename = "@textLabel", default)]
    pub text_label: String,
    #[serde(rename = "@type")]
    pub state_type: Option<String>,
    #[serde(rename = "Xref")]
    pub xref: Option<XrefXml>,
    #[serde(rename = "Graphics")]
    pub graphics: Option<ShapeGraphicsXml>,
    #[serde(rename = "Comment", default)]
    pub comments: Vec<CommentXml>,
    #[serde(rename = "Property", default)]
    pub properties: Vec<PropertyXml>,
    #[serde(rename = "AnnotationRef", default)]
    pub annotation_refs: Vec<AnnotationRefXml>,
    #[serde(rename = "CitationRef", default)]
    pub citation_refs: Vec<RefXml>,
    #[serde(rename = "EvidenceRef", default)]
    pub evidence_refs: Vec<RefXml>,
}

impl ToXml<XmlWriter> for StateXml {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        let attrs = Attrs::new()
            .with("elementId", &self.element_id)
            .with("textLabel", &self.text_label)
            .with_opt("type", self.state_type.as_ref());
        write_tag_start_with_attrs(writer, "State", &attrs)?;
        if let Some(ref xref) = self.xref {
            xref.write_xml(writer)?;
        }
        if let Some(ref graphics) = self.graphics {
            graphics.write_xml(writer)?;
        }
        meta_of!(self).write_xml(writer)?;
        write_tag_end(writer, "State")
    }
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct StatesXml {
    #[serde(rename = "State", default)]
    pub states: Vec<StateXml>,
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct DataNodeXml {
    #[serde(rename = "@elementId", default)]
    pub element_id: String,
    #[serde(rename = "@textLabel", default)]
    pub text_label: String,
    #[serde(rename = "@type")]
    pub node_type: Option<String>,
    #[serde(rename = "@groupRef")]
    pub group_ref: Option<String>,
    #[serde(rename = "@aliasRef")]
    pub alias_ref: Option<String>,
    #[serde(rename = "Xref")]
    pub xref: Option<XrefXml>,
    #[serde(rename = "States")]
    pub states: Option<StatesXml>,
    #[serde(rename = "Graphics")]
    pub graphics: Option<ShapeGraphicsXml>,
    #[serde(rename = "Comment", default)]
    pub comments: Vec<CommentXml>,
    #[serde(rename = "Property", default)]
    pub properties: Vec<PropertyXml>,
    #[serde(rename = "AnnotationRef", default)]
    pub annotation_refs: Vec<AnnotationRefXml>,
    #[serde(rename = "CitationRef", default)]
    pub citation_refs: Vec<RefXml>,
    #[serde(rename = "EvidenceRef", default)]
    pub evidence_refs: Vec<RefXml>,
}

impl ToXml<XmlWriter> for DataNodeXml {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        let attrs = Attrs::new()
            .with("elementId", &self.element_id)
            .with("textLabel", &self.text_label)
            .with_opt("type", self.node_type.as_ref())
            .with_opt("groupRef", self.group_ref.as_ref())
            .with_opt("aliasRef", self.alias_ref.as_ref());
        write_tag_start_with_attrs(writer, "DataNode", &attrs)?;
        if let Some(ref xref) = self.xref {
            xref.write_xml(writer)?;
        }
        if let Some(StatesXml { ref states }) = self.states
            && !states.is_empty()
        {
            write_tag_start_with_attrs(writer, "States", &Attrs::new())?;
            for state in states.iter() {
                state.write_xml(writer)?;
            }
            write_tag_end(writer, "States")?;
        }
        if let Some(ref graphics) = self.graphics {
            graphics.write_xml(writer)?;
        }
        meta_of!(self).write_xml(writer)?;
        write_tag_end(writer, "DataNode")
    }
}

/// An `Interaction` or a `GraphicalLine`; only interactions carry an xref.
#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct LineXml {
    #[serde(rename = "@elementId", default)]
    pub element_id: String,
    #[serde(rename = "@groupRef")]
    pub group_ref: Option<String>,
    #[serde(rename = "Xref")]
    pub xref: Option<XrefXml>,
    #[serde(rename = "Waypoints")]
    pub waypoints: Option<WaypointsXml>,
    #[serde(rename = "Graphics")]
    pub graphics: Option<LineGraphicsXml>,
    #[serde(rename = "Comment", default)]
    pub comments: Vec<CommentXml>,
    #[serde(rename = "Property", default)]
    pub properties: Vec<PropertyXml>,
    #[serde(rename = "AnnotationRef", default)]
    pub annotation_refs: Vec<AnnotationRefXml>,
    #[serde(rename = "CitationRef", default)]
    pub citation_refs: Vec<RefXml>,
    #[serde(rename = "EvidenceRef", default)]
    pub evidence_refs: Vec<RefXml>,
}

impl LineXml {
    fn write_as(&self, writer: &mut Writer<XmlWriter>, tag: &str) -> Result<()> {
        let attrs = Attrs::new()
            .with("elementId", &self.element_id)
            .with_opt("groupRef", self.group_ref.as_ref());
        write_tag_start_with_attrs(writer, tag, &attrs)?;
        if let Some(ref xref) = self.xref {
            xref.write_xml(writer)?;
        }
        if let Some(ref waypoints) = self.waypoints {
            waypoints.write_xml(writer)?;
        }
        if let Some(ref graphics) = self.graphics {
            graphics.write_xml(writer)?;
        }
        meta_of!(self).write_xml(writer)?;
        write_tag_end(writer, tag)
    }
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct LabelXml {
    #[serde(rename = "@elementId", default)]
    pub element_id: String,
    #[serde(rename = "@textLabel", default)]
    pub text_label: String,
    #[serde(rename = "@href")]
    pub href: Option<String>,
    #[serde(rename = "@groupRef")]
    pub group_ref: Option<String>,
    #[serde(rename = "Graphics")]
    pub graphics: Option<ShapeGraphicsXml>,
    #[serde(rename = "Comment", default)]
    pub comments: Vec<CommentXml>,
    #[serde(rename = "Property", default)]
    pub properties: Vec<PropertyXml>,
    #[serde(rename = "AnnotationRef", default)]
    pub annotation_refs: Vec<AnnotationRefXml>,
    #[serde(rename = "CitationRef", default)]
    pub citation_refs: Vec<RefXml>,
    #[serde(rename = "EvidenceRef", default)]
    pub evidence_refs: Vec<RefXml>,
}

impl ToXml<XmlWriter> for LabelXml {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        let attrs = Attrs::new()
            .with("elementId", &self.element_id)
            .with("textLabel", &self.text_label)
            .with_opt("href", self.href.as_ref())
            .with_opt("groupRef", self.group_ref.as_ref());
        write_tag_start_with_attrs(writer, "Label", &attrs)?;
        if let Some(ref graphics) = self.graphics {
            graphics.write_xml(writer)?;
        }
        meta_of!(self).write_xml(writer)?;
        write_tag_end(writer, "Label")
    }
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct ShapeXml {
    #[serde(rename = "@elementId", default)]
    pub element_id: String,
    #[serde(rename = "@textLabel")]
    pub text_label: Option<String>,
    #[serde(rename = "@groupRef")]
    pub group_ref: Option<String>,
    #[serde(rename = "Graphics")]
    pub graphics: Option<ShapeGraphicsXml>,
    #[serde(rename = "Comment", default)]
    pub comments: Vec<CommentXml>,
    #[serde(rename = "Property", default)]
    pub properties: Vec<PropertyXml>,
    #[serde(rename = "AnnotationRef", default)]
    pub annotation_refs: Vec<AnnotationRefXml>,
    #[serde(rename = "CitationRef", default)]
    pub citation_refs: Vec<RefXml>,
    #[serde(rename = "EvidenceRef", default)]
    pub evidence_refs: Vec<RefXml>,
}

impl ToXml<XmlWriter> for ShapeXml {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        let attrs = Attrs::new()
            .with("elementId", &self.element_id)
            .with_opt("textLabel", self.text_label.as_ref())
            .with_opt("groupRef", self.group_ref.as_ref());
        write_tag_start_with_attrs(writer, "Shape", &attrs)?;
        if let Some(ref graphics) = self.graphics {
            graphics.write_xml(writer)?;
        }
        meta_of!(self).write_xml(writer)?;
        write_tag_end(writer, "Shape")
    }
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct GroupXml {
    #[serde(rename = "@elementId", default)]
    pub element_id: String,
    #[serde(rename = "@type")]
    pub group_type: Option<String>,
    #[serde(rename = "@textLabel")]
    pub text_label: Option<String>,
    #[serde(rename = "@groupRef")]
    pub group_ref: Option<String>,
    #[serde(rename = "Xref")]
    pub xref: Option<XrefXml>,
    #[serde(rename = "Graphics")]
    pub graphics: Option<ShapeGraphicsXml>,
    #[serde(rename = "Comment", default)]
    pub comments: Vec<CommentXml>,
    #[serde(rename = "Property", default)]
    pub properties: Vec<PropertyXml>,
    #[serde(rename = "AnnotationRef", default)]
    pub annotation_refs: Vec<AnnotationRefXml>,
    #[serde(rename = "CitationRef", default)]
    pub citation_refs: Vec<RefXml>,
    #[serde(rename = "EvidenceRef", default)]
    pub evidence_refs: Vec<RefXml>,
}

impl ToXml<XmlWriter> for GroupXml {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        let attrs = Attrs::new()
            .with("elementId", &self.element_id)
            .with_opt("type", self.group_type.as_ref())
            .with_opt("textLabel", self.text_label.as_ref())
            .with_opt("groupRef", self.group_ref.as_ref());
        write_tag_start_with_attrs(writer, "Group", &attrs)?;
        if let Some(ref xref) = self.xref {
            xref.write_xml(writer)?;
        }
        if let Some(ref graphics) = self.graphics {
            graphics.write_xml(writer)?;
        }
        meta_of!(self).write_xml(writer)?;
        write_tag_end(writer, "Group")
    }
}

/// An `Annotation`, `Citation` or `Evidence` record.
#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
pub struct ValueXml {
    #[serde(rename = "@elementId", default)]
    pub element_id: String,
    #[serde(rename = "@value")]
    pub value: Option<String>,
    #[serde(rename = "@type")]
    pub annotation_type: Option<String>,
    #[serde(rename = "Xref")]
    pub xref: Option<XrefXml>,
    #[serde(rename = "UrlLink")]
    pub url_link: Option<UrlLinkXml>,
}

impl ValueXml {
    fn write_as(&self, writer: &mut Writer<XmlWriter>, tag: &str) -> Result<()> {
        let attrs = Attrs::new()
            .with("elementId", &self.element_id)
            .with_opt("value", self.value.as_ref())
            .with_opt("type", self.annotation_type.as_ref());
        if self.xref.is_none() && self.url_link.is_none() {
            return write_empty_tag(writer, tag, &attrs);
        }
        write_tag_start_with_attrs(writer, tag, &attrs)?;
        if let Some(ref xref) = self.xref {
            xref.write_xml(writer)?;
        }
        if let Some(ref url_link) = self.url_link {
            write_empty_tag(writer, "UrlLink", &Attrs::new().with("link", &url_link.link))?;
        }
        write_tag_end(writer, tag)
    }

    fn url_link(&self) -> Option<String> {
        self.url_link
            .as_ref()
            .and_then(|url| non_empty(Some(&url.link)))
    }
}

macro_rules! collection {
    ($name:ident, $tag:expr, $item:ty) => {
        #[cfg_attr(feature = "debug-derive", derive(Debug))]
        #[derive(Clone, PartialEq, Default, Deserialize)]
        pub struct $name {
            #[serde(rename = $tag, default)]
            pub items: Vec<$item>,
        }
    };
}

collection!(DataNodesXml, "DataNode", DataNodeXml);
collection!(InteractionsXml, "Interaction", LineXml);
collection!(GraphicalLinesXml, "GraphicalLine", LineXml);
collection!(LabelsXml, "Label", LabelXml);
collection!(ShapesXml, "Shape", ShapeXml);
collection!(GroupsXml, "Group", GroupXml);
collection!(AnnotationsXml, "Annotation", ValueXml);
collection!(CitationsXml, "Citation", ValueXml);
collection!(EvidencesXml, "Evidence", ValueXml);

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq, Default, Deserialize)]
#[serde(rename = "Pathway")]
pub struct File {
    #[serde(rename = "@title", default)]
    pub title: String,
    #[serde(rename = "@organism")]
    pub organism: Option<String>,
    #[serde(rename = "@source")]
    pub source: Option<String>,
    #[serde(rename = "@version")]
    pub version: Option<String>,
    #[serde(rename = "@license")]
    pub license: Option<String>,
    #[serde(rename = "Xref")]
    pub xref: Option<XrefXml>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Authors")]
    pub authors: Option<AuthorsXml>,
    #[serde(rename = "Comment", default)]
    pub comments: Vec<CommentXml>,
    #[serde(rename = "Property", default)]
    pub properties: Vec<PropertyXml>,
    #[serde(rename = "AnnotationRef", default)]
    pub annotation_refs: Vec<AnnotationRefXml>,
    #[serde(rename = "CitationRef", default)]
    pub citation_refs: Vec<RefXml>,
    #[serde(rename = "EvidenceRef", default)]
    pub evidence_refs: Vec<RefXml>,
    #[serde(rename = "Graphics")]
    pub graphics: Option<PathwayGraphicsXml>,
    #[serde(rename = "DataNodes")]
    pub data_nodes: Option<DataNodesXml>,
    #[serde(rename = "Interactions")]
    pub interactions: Option<InteractionsXml>,
    #[serde(rename = "GraphicalLines")]
    pub graphical_lines: Option<GraphicalLinesXml>,
    #[serde(rename = "Labels")]
    pub labels: Option<LabelsXml>,
    #[serde(rename = "Shapes")]
    pub shapes: Option<ShapesXml>,
    #[serde(rename = "Groups")]
    pub groups: Option<GroupsXml>,
    #[serde(rename = "Annotations")]
    pub annotations: Option<AnnotationsXml>,
    #[serde(rename = "Citations")]
    pub citations: Option<CitationsXml>,
    #[serde(rename = "Evidences")]
    pub evidences: Option<EvidencesXml>,
}

fn write_collection<T>(
    writer: &mut Writer<XmlWriter>,
    tag: &str,
    items: &[T],
    write_item: impl Fn(&T, &mut Writer<XmlWriter>) -> Result<()>,
) -> Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    write_tag_start_with_attrs(writer, tag, &Attrs::new())?;
    for item in items.iter() {
        write_item(item, writer)?;
    }
    write_tag_end(writer, tag)
}

fn items<C, T>(collection: &Option<C>, get: impl Fn(&C) -> &[T]) -> &[T] {
    collection.as_ref().map(get).unwrap_or(&[])
}

impl ToXml<XmlWriter> for File {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        let attrs = Attrs::new()
            .with("xmlns", super::GPML_2021_NS)
            .with("title", &self.title)
            .with_opt("organism", self.organism.as_ref())
            .with_opt("source", self.source.as_ref())
            .with_opt("version", self.version.as_ref())
            .with_opt("license", self.license.as_ref());
        write_tag_start_with_attrs(writer, "Pathway", &attrs)?;

        if let Some(ref xref) = self.xref {
            xref.write_xml(writer)?;
        }
        if let Some(ref description) = self.description {
            write_tag(writer, "Description", description)?;
        }
        if let Some(ref authors) = self.authors {
            write_collection(writer, "Authors", &authors.authors, |author, writer| {
                let attrs = Attrs::new()
                    .with("name", &author.name)
                    .with_opt("username", author.username.as_ref())
                    .with_opt("order", author.order);
                match author.xref {
                    None => write_empty_tag(writer, "Author", &attrs),
                    Some(ref xref) => {
                        write_tag_start_with_attrs(writer, "Author", &attrs)?;
                        xref.write_xml(writer)?;
                        write_tag_end(writer, "Author")
                    }
                }
            })?;
        }
        meta_of!(self).write_xml(writer)?;
        if let Some(ref graphics) = self.graphics {
            let attrs = Attrs::new()
                .with_opt("boardWidth", graphics.board_width)
                .with_opt("boardHeight", graphics.board_height)
                .with_opt("backgroundColor", graphics.background_color.as_ref());
            write_empty_tag(writer, "Graphics", &attrs)?;
        }

        write_collection(writer, "DataNodes", items(&self.data_nodes, |c| &c.items), |n, w| {
            n.write_xml(w)
        })?;
        write_collection(
            writer,
            "Interactions",
            items(&self.interactions, |c| &c.items),
            |line, w| line.write_as(w, "Interaction"),
        )?;
        write_collection(
            writer,
            "GraphicalLines",
            items(&self.graphical_lines, |c| &c.items),
            |line, w| line.write_as(w, "GraphicalLine"),
        )?;
        write_collection(writer, "Labels", items(&self.labels, |c| &c.items), |l, w| {
            l.write_xml(w)
        })?;
        write_collection(writer, "Shapes", items(&self.shapes, |c| &c.items), |s, w| {
            s.write_xml(w)
        })?;
        write_collection(writer, "Groups", items(&self.groups, |c| &c.items), |g, w| {
            g.write_xml(w)
        })?;
        write_collection(
            writer,
            "Annotations",
            items(&self.annotations, |c| &c.items),
            |v, w| v.write_as(w, "Annotation"),
        )?;
        write_collection(
            writer,
            "Citations",
            items(&self.citations, |c| &c.items),
            |v, w| v.write_as(w, "Citation"),
        )?;
        write_collection(
            writer,
            "Evidences",
            items(&self.evidences, |c| &c.items),
            |v, w| v.write_as(w, "Evidence"),
        )?;

        write_tag_end(writer, "Pathway")
    }
}

// model -> file

fn meta_from(
    model: &PathwayModel,
    source: &RefSource,
    comments: &[Comment],
    properties: &BTreeMap<String, String>,
) -> Meta {
    let mut meta = Meta {
        comments: comments
            .iter()
            .map(|comment| CommentXml {
                source: comment.source.clone(),
                text: comment.text.clone(),
            })
            .collect(),
        properties: properties
            .iter()
            .map(|(key, value)| PropertyXml {
                key: key.clone(),
                value: value.clone(),
            })
            .collect(),
        ..Default::default()
    };

    for id in model.refs_of(source) {
        let Some(record) = model.ref_record(*id) else {
            continue;
        };
        let element_ref = record.target.to_string();
        match record.kind {
            RefKind::Annotation => {
                let mut annotation_ref = AnnotationRefXml {
                    element_ref,
                    ..Default::default()
                };
                for nested in record.refs().iter().filter_map(|id| model.ref_record(*id)) {
                    let r = RefXml {
                        element_ref: nested.target.to_string(),
                    };
                    match nested.kind {
                        RefKind::Citation => annotation_ref.citation_refs.push(r),
                        RefKind::Evidence => annotation_ref.evidence_refs.push(r),
                        RefKind::Annotation => {}
                    }
                }
                meta.annotation_refs.push(annotation_ref);
            }
            RefKind::Citation => meta.citation_refs.push(RefXml { element_ref }),
            RefKind::Evidence => meta.evidence_refs.push(RefXml { element_ref }),
        }
    }
    meta
}

fn element_meta(model: &PathwayModel, element: &PathwayElement) -> Meta {
    meta_from(
        model,
        &RefSource::Element(element.id().clone()),
        &element.comments,
        &element.properties,
    )
}

fn group_ref_of(element: &PathwayElement) -> Option<String> {
    element.group_ref().map(|id| id.to_string())
}

fn state_xml(model: &PathwayModel, element: &PathwayElement, state: &State) -> StateXml {
    let mut graphics = ShapeGraphicsXml::from_parts(&state.font, &state.style);
    graphics.rel_x = Some(state.rel_x);
    graphics.rel_y = Some(state.rel_y);
    graphics.width = Some(state.width);
    graphics.height = Some(state.height);
    let mut xml = StateXml {
        element_id: element.id().to_string(),
        text_label: state.text_label.clone(),
        state_type: Some(state.state_type.as_str().to_owned()),
        xref: state.xref.as_ref().map(XrefXml::from),
        graphics: Some(graphics),
        ..Default::default()
    };
    set_meta!(xml, element_meta(model, element));
    xml
}

fn line_xml(model: &PathwayModel, element: &PathwayElement, line: &LineElement) -> LineXml {
    let points = line
        .points()
        .iter()
        .filter_map(|id| model.find_by_id(id.as_str()))
        .filter_map(|e| e.as_point().map(|p| (e.id(), p)))
        .map(|(id, point)| PointXml {
            element_id: id.to_string(),
            x: point.x,
            y: point.y,
            element_ref: point.element_ref().map(|id| id.to_string()),
            rel_x: point.rel_x,
            rel_y: point.rel_y,
            arrow_head: Some(point.arrow_head.as_str().to_owned()),
        })
        .collect();
    let anchors = line
        .anchors()
        .iter()
        .filter_map(|id| model.find_by_id(id.as_str()))
        .filter_map(|e| e.as_anchor().map(|a| (e.id(), a)))
        .map(|(id, anchor)| AnchorXml {
            element_id: id.to_string(),
            position: Some(anchor.position),
            shape_type: Some(anchor.shape_type.as_str().to_owned()),
        })
        .collect();

    let mut xml = LineXml {
        element_id: element.id().to_string(),
        group_ref: group_ref_of(element),
        xref: line.xref.as_ref().map(XrefXml::from),
        waypoints: Some(WaypointsXml { points, anchors }),
        graphics: Some(LineGraphicsXml::from(&line.graphics)),
        ..Default::default()
    };
    set_meta!(xml, element_meta(model, element));
    xml
}

fn value_xml(element: &PathwayElement) -> ValueXml {
    let mut xml = ValueXml {
        element_id: element.id().to_string(),
        ..Default::default()
    };
    let (xref, url_link) = match &element.kind {
        ElementKind::Annotation(content) => {
            xml.value = Some(content.value.clone());
            xml.annotation_type = Some(content.annotation_type.as_str().to_owned());
            (&content.xref, &content.url_link)
        }
        ElementKind::Citation(content) => (&content.xref, &content.url_link),
        ElementKind::Evidence(content) => {
            xml.value = content.value.clone();
            (&content.xref, &content.url_link)
        }
        _ => return xml,
    };
    xml.xref = xref.as_ref().map(XrefXml::from);
    xml.url_link = url_link.as_ref().map(|link| UrlLinkXml { link: link.clone() });
    xml
}

impl From<&PathwayModel> for File {
    fn from(model: &PathwayModel) -> Self {
        let pathway = model.pathway();
        let mut file = File {
            title: pathway.title.clone(),
            organism: pathway.organism.clone(),
            source: pathway.source.clone(),
            version: pathway.version.clone(),
            license: pathway.license.clone(),
            xref: pathway.xref.as_ref().map(XrefXml::from),
            description: pathway.description.clone(),
            authors: (!pathway.authors.is_empty()).then(|| AuthorsXml {
                authors: pathway
                    .authors
                    .iter()
                    .map(|author| AuthorXml {
                        name: author.name.clone(),
                        username: author.username.clone(),
                        order: author.order,
                        xref: author.xref.as_ref().map(XrefXml::from),
                    })
                    .collect(),
            }),
            graphics: Some(PathwayGraphicsXml {
                board_width: Some(pathway.board_width),
                board_height: Some(pathway.board_height),
                background_color: Some(pathway.background_color.to_hex()),
            }),
            ..Default::default()
        };
        set_meta!(
            file,
            meta_from(model, &RefSource::Pathway, &pathway.comments, &pathway.properties)
        );

        let data_nodes = model
            .elements_of_type(ObjectType::DataNode)
            .filter_map(|element| element.as_data_node().map(|node| (element, node)))
            .map(|(element, node)| {
                let states = node
                    .states()
                    .iter()
                    .filter_map(|id| model.find_by_id(id.as_str()))
                    .filter_map(|e| e.as_state().map(|s| state_xml(model, e, s)))
                    .collect();
                let mut xml = DataNodeXml {
                    element_id: element.id().to_string(),
                    text_label: node.text_label.clone(),
                    node_type: Some(node.data_node_type.as_str().to_owned()),
                    group_ref: group_ref_of(element),
                    alias_ref: node.alias_ref().map(|id| id.to_string()),
                    xref: node.xref.as_ref().map(XrefXml::from),
                    states: Some(StatesXml { states }),
                    graphics: Some(
                        ShapeGraphicsXml::from_parts(&node.font, &node.style).with_rect(&node.rect),
                    ),
                    ..Default::default()
                };
                set_meta!(xml, element_meta(model, element));
                xml
            })
            .collect();
        file.data_nodes = Some(DataNodesXml { items: data_nodes });

        let lines_of = |object_type| {
            model
                .elements_of_type(object_type)
                .filter_map(|element| element.as_line().map(|line| line_xml(model, element, line)))
                .collect::<Vec<_>>()
        };
        file.interactions = Some(InteractionsXml {
            items: lines_of(ObjectType::Interaction),
        });
        file.graphical_lines = Some(GraphicalLinesXml {
            items: lines_of(ObjectType::GraphicalLine),
        });

        let labels = model
            .elements_of_type(ObjectType::Label)
            .filter_map(|element| element.as_label().map(|label| (element, label)))
            .map(|(element, label)| {
                let mut xml = LabelXml {
                    element_id: element.id().to_string(),
                    text_label: label.text_label.clone(),
                    href: label.href.clone(),
                    group_ref: group_ref_of(element),
                    graphics: Some(
                        ShapeGraphicsXml::from_parts(&label.font, &label.style)
                            .with_rect(&label.rect),
                    ),
                    ..Default::default()
                };
                set_meta!(xml, element_meta(model, element));
                xml
            })
            .collect();
        file.labels = Some(LabelsXml { items: labels });

        let shapes = model
            .elements_of_type(ObjectType::Shape)
            .filter_map(|element| element.as_shape().map(|shape| (element, shape)))
            .map(|(element, shape)| {
                let mut xml = ShapeXml {
                    element_id: element.id().to_string(),
                    text_label: non_empty(Some(&shape.text_label)),
                    group_ref: group_ref_of(element),
                    graphics: Some(
                        ShapeGraphicsXml::from_parts(&shape.font, &shape.style)
                            .with_rect(&shape.rect),
                    ),
                    ..Default::default()
                };
                set_meta!(xml, element_meta(model, element));
                xml
            })
            .collect();
        file.shapes = Some(ShapesXml { items: shapes });

        let groups = model
            .elements_of_type(ObjectType::Group)
            .filter_map(|element| element.as_group().map(|group| (element, group)))
            .map(|(element, group)| {
                let mut xml = GroupXml {
                    element_id: element.id().to_string(),
                    group_type: Some(group.group_type.as_str().to_owned()),
                    text_label: non_empty(Some(&group.text_label)),
                    group_ref: group_ref_of(element),
                    xref: group.xref.as_ref().map(XrefXml::from),
                    graphics: Some(
                        ShapeGraphicsXml::from_parts(&group.font, &group.style)
                            .with_rect(&group.rect),
                    ),
                    ..Default::default()
                };
                set_meta!(xml, element_meta(model, element));
                xml
            })
            .collect();
        file.groups = Some(GroupsXml { items: groups });

        let values_of = |object_type| {
            model
                .elements_of_type(object_type)
                .map(value_xml)
                .collect::<Vec<_>>()
        };
        file.annotations = Some(AnnotationsXml {
            items: values_of(ObjectType::Annotation),
        });
        file.citations = Some(CitationsXml {
            items: values_of(ObjectType::Citation),
        });
        file.evidences = Some(EvidencesXml {
            items: values_of(ObjectType::Evidence),
        });

        file
    }
}

// file -> model

fn comments_from(comments: &[CommentXml]) -> Vec<Comment> {
    comments
        .iter()
        .map(|comment| Comment {
            source: non_empty(comment.source.as_deref()),
            text: comment.text.trim().to_owned(),
        })
        .collect()
}

fn properties_from(properties: &[PropertyXml]) -> BTreeMap<String, String> {
    properties
        .iter()
        .map(|property| (property.key.clone(), property.value.clone()))
        .collect()
}

fn with_meta(mut element: PathwayElement, meta: &Meta) -> PathwayElement {
    element.comments = comments_from(&meta.comments);
    element.properties = properties_from(&meta.properties);
    element
}

fn link_meta(model: &mut PathwayModel, source: RefSource, meta: &Meta, values: &ValueIds) -> Result<()> {
    for annotation_ref in meta.annotation_refs.iter() {
        let target = values.get(&annotation_ref.element_ref)?.clone();
        let outer = model.link_annotation_ref(source.clone(), &target)?;
        for citation_ref in annotation_ref.citation_refs.iter() {
            let target = values.get(&citation_ref.element_ref)?.clone();
            model.link_citation_ref(RefSource::Ref(outer), &target)?;
        }
        for evidence_ref in annotation_ref.evidence_refs.iter() {
            let target = values.get(&evidence_ref.element_ref)?.clone();
            model.link_evidence_ref(RefSource::Ref(outer), &target)?;
        }
    }
    for citation_ref in meta.citation_refs.iter() {
        let target = values.get(&citation_ref.element_ref)?.clone();
        model.link_citation_ref(source.clone(), &target)?;
    }
    for evidence_ref in meta.evidence_refs.iter() {
        let target = values.get(&evidence_ref.element_ref)?.clone();
        model.link_evidence_ref(source.clone(), &target)?;
    }
    Ok(())
}

fn populate(file: File, model: &mut PathwayModel) -> Result<()> {
    let pathway_meta = meta_of!(file);
    let graphics = file.graphics.clone().unwrap_or_default();
    model.update_pathway(|pathway| {
        pathway.title = file.title.clone();
        pathway.organism = non_empty(file.organism.as_deref());
        pathway.source = non_empty(file.source.as_deref());
        pathway.version = non_empty(file.version.as_deref());
        pathway.license = non_empty(file.license.as_deref());
        pathway.description = non_empty(file.description.as_deref());
        pathway.xref = read_xref(&file.xref);
        pathway.authors = file
            .authors
            .as_ref()
            .map(|authors| {
                authors
                    .authors
                    .iter()
                    .map(|author| Author {
                        name: author.name.clone(),
                        username: non_empty(author.username.as_deref()),
                        order: author.order,
                        xref: read_xref(&author.xref),
                    })
                    .collect()
            })
            .unwrap_or_default();
        pathway.board_width = graphics.board_width.unwrap_or(defaults::BOARD_WIDTH);
        pathway.board_height = graphics.board_height.unwrap_or(defaults::BOARD_HEIGHT);
        pathway.background_color = color_or(
            graphics.background_color.as_deref(),
            defaults::BACKGROUND_COLOR,
            "backgroundColor",
        );
        pathway.comments = comments_from(&pathway_meta.comments);
        pathway.properties = properties_from(&pathway_meta.properties);
    });

    // value objects first so refs can be resolved as elements arrive
    let mut values = ValueIds::default();
    for annotation in items(&file.annotations, |c| &c.items) {
        let annotation_type = closed_or(
            annotation.annotation_type.as_deref(),
            AnnotationType::from_name,
            defaults::ANNOTATION_TYPE,
        );
        let content = AnnotationContent {
            value: annotation.value.clone().unwrap_or_default(),
            annotation_type,
            xref: read_xref(&annotation.xref),
            url_link: annotation.url_link(),
        };
        let id = add_with_id(model, PathwayElement::new(ElementKind::Annotation(content)), &annotation.element_id, None)?;
        values.insert(annotation.element_id.clone(), id);
    }
    for citation in items(&file.citations, |c| &c.items) {
        let content = CitationContent {
            xref: read_xref(&citation.xref),
            url_link: citation.url_link(),
        };
        let id = add_with_id(model, PathwayElement::new(ElementKind::Citation(content)), &citation.element_id, None)?;
        values.insert(citation.element_id.clone(), id);
    }
    for evidence in items(&file.evidences, |c| &c.items) {
        let content = EvidenceContent {
            value: non_empty(evidence.value.as_deref()),
            xref: read_xref(&evidence.xref),
            url_link: evidence.url_link(),
        };
        let id = add_with_id(model, PathwayElement::new(ElementKind::Evidence(content)), &evidence.element_id, None)?;
        values.insert(evidence.element_id.clone(), id);
    }

    // (element, its metadata) for the final ref pass
    let mut linked: Vec<(ElementId, Meta)> = vec![];
    let default_graphics = ShapeGraphicsXml::default();

    let groups = items(&file.groups, |c| &c.items);
    for group in groups {
        let g = group.graphics.as_ref().unwrap_or(&default_graphics);
        let mut content = Group::new(
            group
                .group_type
                .as_deref()
                .map(|name| model.types_mut().resolve::<GroupType>(name))
                .unwrap_or(defaults::GROUP_TYPE),
        );
        content.text_label = group.text_label.clone().unwrap_or_default();
        content.xref = read_xref(&group.xref);
        content.rect = g.rect();
        content.font = g.font();
        content.style = g.style(model.types_mut());
        let meta = meta_of!(group);
        let element = with_meta(PathwayElement::new(ElementKind::Group(content)), &meta);
        let id = add_with_id(model, element, &group.element_id, None)?;
        linked.push((id, meta));
    }

    let mut point_links: Vec<(ElementId, ElementId)> = vec![];
    let mut alias_links: Vec<(ElementId, ElementId)> = vec![];

    for node in items(&file.data_nodes, |c| &c.items) {
        let g = node.graphics.as_ref().unwrap_or(&default_graphics);
        let node_type = node
            .node_type
            .as_deref()
            .map(|name| model.types_mut().resolve::<DataNodeType>(name))
            .unwrap_or(defaults::DATA_NODE_TYPE);
        let mut content = DataNode::new(node.text_label.clone(), node_type);
        content.xref = read_xref(&node.xref);
        content.rect = g.rect();
        content.font = g.font();
        content.style = g.style(model.types_mut());
        let meta = meta_of!(node);
        let element = with_meta(PathwayElement::new(ElementKind::DataNode(content)), &meta);
        let id = add_with_id(model, element, &node.element_id, node.group_ref.as_ref())?;
        if let Some(alias) = node.alias_ref.as_deref().and_then(requested_id) {
            alias_links.push((id.clone(), alias));
        }

        for state in node.states.iter().flat_map(|states| states.states.iter()) {
            let g = state.graphics.as_ref().unwrap_or(&default_graphics);
            let mut content = State::new(id.clone(), state.text_label.clone());
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
            let meta = meta_of!(state);
            let element = with_meta(PathwayElement::new(ElementKind::State(content)), &meta);
            let state_id = add_with_id(model, element, &state.element_id, None)?;
            linked.push((state_id, meta));
        }
        linked.push((id, meta));
    }

    let interactions = items(&file.interactions, |c| &c.items);
    let graphical_lines = items(&file.graphical_lines, |c| &c.items);
    for (line, is_interaction) in interactions
        .iter()
        .map(|line| (line, true))
        .chain(graphical_lines.iter().map(|line| (line, false)))
    {
        let mut content = LineElement::new();
        if let Some(ref graphics) = line.graphics {
            content.graphics = LineGraphics::from(graphics);
        }
        let meta = meta_of!(line);
        let kind = if is_interaction {
            content.xref = read_xref(&line.xref);
            ElementKind::Interaction(content)
        } else {
            ElementKind::GraphicalLine(content)
        };
        let element = with_meta(PathwayElement::new(kind), &meta);
        let id = add_with_id(model, element, &line.element_id, line.group_ref.as_ref())?;

        let waypoints = line.waypoints.clone().unwrap_or_default();
        for point in waypoints.points.iter() {
            let mut content = LinePoint::new(id.clone(), point.x, point.y);
            content.arrow_head = point
                .arrow_head
                .as_deref()
                .map(|name| model.types_mut().resolve::<ArrowHeadType>(name))
                .unwrap_or(defaults::ARROW_HEAD);
            content.rel_x = point.rel_x;
            content.rel_y = point.rel_y;
            let element = PathwayElement::new(ElementKind::LinePoint(content));
            let point_id = add_with_id(model, element, &point.element_id, None)?;
            if let Some(target) = point.element_ref.as_deref().and_then(requested_id) {
                point_links.push((point_id, target));
            }
        }
        for anchor in waypoints.anchors.iter() {
            let mut content = Anchor::new(id.clone(), anchor.position.unwrap_or(defaults::ANCHOR_POSITION));
            content.shape_type = anchor
                .shape_type
                .as_deref()
                .map(|name| model.types_mut().resolve::<AnchorShapeType>(name))
                .unwrap_or(defaults::ANCHOR_SHAPE);
            add_with_id(model, PathwayElement::new(ElementKind::Anchor(content)), &anchor.element_id, None)?;
        }
        linked.push((id, meta));
    }

    for label in items(&file.labels, |c| &c.items) {
        let g = label.graphics.as_ref().unwrap_or(&default_graphics);
        let mut content = Label::new(label.text_label.clone());
        content.href = non_empty(label.href.as_deref());
        content.rect = g.rect();
        content.font = g.font();
        content.style = g.style(model.types_mut());
        let meta = meta_of!(label);
        let element = with_meta(PathwayElement::new(ElementKind::Label(content)), &meta);
        let id = add_with_id(model, element, &label.element_id, label.group_ref.as_ref())?;
        linked.push((id, meta));
    }

    for shape in items(&file.shapes, |c| &c.items) {
        let g = shape.graphics.as_ref().unwrap_or(&default_graphics);
        let mut content = Shape::new(defaults::SHAPE_TYPE);
        content.text_label = shape.text_label.clone().unwrap_or_default();
        content.rect = g.rect();
        content.font = g.font();
        content.style = g.style(model.types_mut());
        let meta = meta_of!(shape);
        let element = with_meta(PathwayElement::new(ElementKind::Shape(content)), &meta);
        let id = add_with_id(model, element, &shape.element_id, shape.group_ref.as_ref())?;
        linked.push((id, meta));
    }

    for group in groups {
        if let (Some(id), Some(parent)) = (
            requested_id(&group.element_id),
            group.group_ref.as_deref().and_then(requested_id),
        ) {
            model.set_group(&id, Some(&parent))?;
        }
    }
    for (point, target) in point_links {
        model.set_element_ref(&point, Some(&target))?;
    }
    for (node, group) in alias_links {
        model.set_alias_ref(&node, Some(&group))?;
    }

    link_meta(model, RefSource::Pathway, &pathway_meta, &values)?;
    for (id, meta) in linked.iter() {
        link_meta(model, RefSource::Element(id.clone()), meta, &values)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorCode;
    use crate::gpml::{ReadOptions, WriteOptions, read_str, write_string};
    use crate::types::Color;

    const SHAPE_WITHOUT_BORDER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Pathway xmlns="http://pathvisio.org/GPML/2021" title="Shapes">
    <Shapes>
        <Shape elementId="s1">
            <Graphics centerX="100" centerY="50" width="30" height="30" shapeType="Oval"/>
        </Shape>
    </Shapes>
</Pathway>"#;

    #[test]
    fn test_missing_border_width_defaults() {
        let model = read_str(SHAPE_WITHOUT_BORDER, &ReadOptions { validate: false }).unwrap();
        let shape = model.find_by_id("s1").unwrap().as_shape().unwrap();
        assert_eq!(1.0, shape.style.border_width);
        assert_eq!(ShapeType::OVAL, shape.style.shape_type);
        assert_eq!(Color::BLACK, shape.style.border_color);
        assert_eq!(12.0, shape.font.font_size);
        assert_eq!(LineStyle::Solid, shape.style.border_style);
    }

    #[test]
    fn test_write_then_read() {
        let mut model = read_str(SHAPE_WITHOUT_BORDER, &ReadOptions::default()).unwrap();
        let document = write_string(&mut model, &WriteOptions::default()).unwrap();
        assert!(document.contains(r#"borderWidth="1""#));
        assert!(document.contains(r#"shapeType="Oval""#));

        let again = read_str(&document, &ReadOptions::default()).unwrap();
        assert_eq!(
            model.find_by_id("s1").unwrap().kind,
            again.find_by_id("s1").unwrap().kind
        );
    }

    #[test]
    fn test_write_to_stream() {
        let model = read_str(SHAPE_WITHOUT_BORDER, &ReadOptions::default()).unwrap();
        let mut out = vec![];
        Gpml2021.write_to_stream(&model, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("<?xml"));
        assert!(text.contains(super::super::GPML_2021_NS));
    }

    #[test]
    fn test_dangling_group_ref_fails() {
        let doc = SHAPE_WITHOUT_BORDER.replace(r#"elementId="s1""#, r#"elementId="s1" groupRef="g9""#);
        let err = read_str(&doc, &ReadOptions { validate: false }).unwrap_err();
        assert_eq!(crate::common::ErrorKind::Import, err.kind);
        assert_eq!(ErrorCode::InvalidReference, err.code);
    }

    #[test]
    fn test_unknown_shape_type_is_registered() {
        let doc = SHAPE_WITHOUT_BORDER.replace("Oval", "Ribosome");
        let model = read_str(&doc, &ReadOptions::default()).unwrap();
        let shape = model.find_by_id("s1").unwrap().as_shape().unwrap();
        assert_eq!("Ribosome", shape.style.shape_type.as_str());
        assert!(model.types().is_registered::<ShapeType>("Ribosome"));
    }

    #[test]
    fn test_malformed_document() {
        let doc = SHAPE_WITHOUT_BORDER.replace(r#"centerX="100""#, r#"centerX="wide""#);
        let err = read_str(&doc, &ReadOptions { validate: false }).unwrap_err();
        assert_eq!(ErrorCode::MalformedDocument, err.code);

        let err = read_str(&doc, &ReadOptions::default()).unwrap_err();
        assert_eq!(ErrorCode::SchemaValidationFailed, err.code);
    }
}
