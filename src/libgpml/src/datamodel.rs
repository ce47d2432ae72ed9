// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use float_cmp::approx_eq;

use crate::common::{Error, ErrorCode, ErrorKind, Result};
use crate::gpml::defaults;
use crate::ids::ElementId;
use crate::refs::RefId;
use crate::types::{
    AnchorShapeType, AnnotationType, ArrowHeadType, Color, ConnectorType, DataNodeType,
    GroupType, HAlign, LineStyle, ShapeType, StateType, VAlign,
};

/// Identity of a `PathwayModel`, used to tell which model an element is
/// attached to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelId(u64);

impl ModelId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ModelId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Detached,
    Attached(ModelId),
    Terminated,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectType {
    Pathway,
    DataNode,
    State,
    Interaction,
    GraphicalLine,
    LinePoint,
    Anchor,
    Label,
    Shape,
    Group,
    Annotation,
    Citation,
    Evidence,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Pathway => "Pathway",
            ObjectType::DataNode => "DataNode",
            ObjectType::State => "State",
            ObjectType::Interaction => "Interaction",
            ObjectType::GraphicalLine => "GraphicalLine",
            ObjectType::LinePoint => "LinePoint",
            ObjectType::Anchor => "Anchor",
            ObjectType::Label => "Label",
            ObjectType::Shape => "Shape",
            ObjectType::Group => "Group",
            ObjectType::Annotation => "Annotation",
            ObjectType::Citation => "Citation",
            ObjectType::Evidence => "Evidence",
        }
    }

    /// Elements that may belong to a group.
    pub fn is_groupable(&self) -> bool {
        matches!(
            self,
            ObjectType::DataNode
                | ObjectType::Label
                | ObjectType::Shape
                | ObjectType::Group
                | ObjectType::Interaction
                | ObjectType::GraphicalLine
        )
    }

    /// Elements that carry comments, dynamic properties and
    /// annotation/citation/evidence refs.
    pub fn is_referencing(&self) -> bool {
        matches!(
            self,
            ObjectType::Pathway
                | ObjectType::DataNode
                | ObjectType::State
                | ObjectType::Interaction
                | ObjectType::GraphicalLine
                | ObjectType::Label
                | ObjectType::Shape
                | ObjectType::Group
        )
    }

    pub fn is_value_object(&self) -> bool {
        matches!(
            self,
            ObjectType::Annotation | ObjectType::Citation | ObjectType::Evidence
        )
    }

    /// Elements a line point may attach to.
    pub fn is_linkable(&self) -> bool {
        matches!(
            self,
            ObjectType::DataNode
                | ObjectType::State
                | ObjectType::Label
                | ObjectType::Shape
                | ObjectType::Group
                | ObjectType::Anchor
        )
    }

    pub fn is_line(&self) -> bool {
        matches!(self, ObjectType::Interaction | ObjectType::GraphicalLine)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A cross-reference into an external database.  The pair is opaque to this
/// library and compared structurally.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Xref {
    pub identifier: String,
    pub data_source: String,
}

impl Xref {
    pub fn new(identifier: impl Into<String>, data_source: impl Into<String>) -> Self {
        Xref {
            identifier: identifier.into(),
            data_source: data_source.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Comment {
    pub source: Option<String>,
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub username: Option<String>,
    pub order: Option<i32>,
    pub xref: Option<Xref>,
}

/// Position and size of a shaped element; x/y name the center.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(center_x: f64, center_y: f64, width: f64, height: f64) -> Self {
        Rect {
            center_x,
            center_y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f64 {
        self.center_x - self.width / 2.0
    }

    pub fn top(&self) -> f64 {
        self.center_y - self.height / 2.0
    }

    pub fn right(&self) -> f64 {
        self.center_x + self.width / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.center_y + self.height / 2.0
    }

    pub fn approx_eq(&self, other: &Rect) -> bool {
        approx_eq!(f64, self.center_x, other.center_x, epsilon = 1e-6)
            && approx_eq!(f64, self.center_y, other.center_y, epsilon = 1e-6)
            && approx_eq!(f64, self.width, other.width, epsilon = 1e-6)
            && approx_eq!(f64, self.height, other.height, epsilon = 1e-6)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FontStyle {
    pub text_color: Color,
    pub font_name: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethru: bool,
    pub font_size: f64,
    pub h_align: HAlign,
    pub v_align: VAlign,
}

impl Default for FontStyle {
    fn default() -> Self {
        FontStyle {
            text_color: defaults::TEXT_COLOR,
            font_name: defaults::FONT_NAME.to_owned(),
            bold: false,
            italic: false,
            underline: false,
            strikethru: false,
            font_size: defaults::FONT_SIZE,
            h_align: defaults::H_ALIGN,
            v_align: defaults::V_ALIGN,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShapeStyle {
    pub border_color: Color,
    pub border_style: LineStyle,
    pub border_width: f64,
    pub fill_color: Color,
    pub shape_type: ShapeType,
    pub z_order: Option<i32>,
    pub rotation: f64,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        ShapeStyle {
            border_color: defaults::BORDER_COLOR,
            border_style: defaults::BORDER_STYLE,
            border_width: defaults::BORDER_WIDTH,
            fill_color: defaults::FILL_COLOR,
            shape_type: defaults::SHAPE_TYPE,
            z_order: None,
            rotation: defaults::ROTATION,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineGraphics {
    pub line_color: Color,
    pub line_style: LineStyle,
    pub line_width: f64,
    pub connector_type: ConnectorType,
    pub z_order: Option<i32>,
}

impl Default for LineGraphics {
    fn default() -> Self {
        LineGraphics {
            line_color: defaults::LINE_COLOR,
            line_style: defaults::LINE_STYLE,
            line_width: defaults::LINE_WIDTH,
            connector_type: defaults::CONNECTOR_TYPE,
            z_order: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DataNode {
    pub text_label: String,
    pub data_node_type: DataNodeType,
    pub xref: Option<Xref>,
    pub rect: Rect,
    pub font: FontStyle,
    pub style: ShapeStyle,
    pub(crate) alias_ref: Option<ElementId>,
    pub(crate) states: Vec<ElementId>,
}

impl DataNode {
    pub fn new(text_label: impl Into<String>, data_node_type: DataNodeType) -> Self {
        DataNode {
            text_label: text_label.into(),
            data_node_type,
            xref: None,
            rect: Rect::default(),
            font: FontStyle::default(),
            style: ShapeStyle::default(),
            alias_ref: None,
            states: vec![],
        }
    }

    /// The group this node stands in for, if it is an alias node.
    pub fn alias_ref(&self) -> Option<&ElementId> {
        self.alias_ref.as_ref()
    }

    pub fn states(&self) -> &[ElementId] {
        &self.states
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct State {
    pub data_node: ElementId,
    pub text_label: String,
    pub state_type: StateType,
    pub xref: Option<Xref>,
    pub rel_x: f64,
    pub rel_y: f64,
    pub width: f64,
    pub height: f64,
    pub font: FontStyle,
    pub style: ShapeStyle,
}

impl State {
    pub fn new(data_node: ElementId, text_label: impl Into<String>) -> Self {
        State {
            data_node,
            text_label: text_label.into(),
            state_type: defaults::STATE_TYPE,
            xref: None,
            rel_x: 0.0,
            rel_y: 0.0,
            width: 0.0,
            height: 0.0,
            font: FontStyle::default(),
            style: ShapeStyle::default(),
        }
    }
}

/// Shared content of interactions and graphical lines.  Points and anchors
/// are separate elements owned by the line; the first point is the start
/// and the last point the end.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineElement {
    pub xref: Option<Xref>,
    pub graphics: LineGraphics,
    pub(crate) points: Vec<ElementId>,
    pub(crate) anchors: Vec<ElementId>,
}

impl LineElement {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn points(&self) -> &[ElementId] {
        &self.points
    }

    pub fn anchors(&self) -> &[ElementId] {
        &self.anchors
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinePoint {
    pub line: ElementId,
    pub x: f64,
    pub y: f64,
    pub arrow_head: ArrowHeadType,
    pub rel_x: Option<f64>,
    pub rel_y: Option<f64>,
    pub(crate) element_ref: Option<ElementId>,
}

impl LinePoint {
    pub fn new(line: ElementId, x: f64, y: f64) -> Self {
        LinePoint {
            line,
            x,
            y,
            arrow_head: defaults::ARROW_HEAD,
            rel_x: None,
            rel_y: None,
            element_ref: None,
        }
    }

    /// The element this point is attached to, if any.
    pub fn element_ref(&self) -> Option<&ElementId> {
        self.element_ref.as_ref()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Anchor {
    pub line: ElementId,
    pub position: f64,
    pub shape_type: AnchorShapeType,
}

impl Anchor {
    pub fn new(line: ElementId, position: f64) -> Self {
        Anchor {
            line,
            position,
            shape_type: defaults::ANCHOR_SHAPE,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub text_label: String,
    pub href: Option<String>,
    pub rect: Rect,
    pub font: FontStyle,
    pub style: ShapeStyle,
}

impl Label {
    pub fn new(text_label: impl Into<String>) -> Self {
        Label {
            text_label: text_label.into(),
            href: None,
            rect: Rect::default(),
            font: FontStyle::default(),
            style: ShapeStyle::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub text_label: String,
    pub rect: Rect,
    pub font: FontStyle,
    pub style: ShapeStyle,
}

impl Shape {
    pub fn new(shape_type: ShapeType) -> Self {
        Shape {
            text_label: String::new(),
            rect: Rect::default(),
            font: FontStyle::default(),
            style: ShapeStyle {
                shape_type,
                ..Default::default()
            },
        }
    }
}

/// A group's rect is derived from its members (see `geometry`); the stored
/// value is the last computed bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    pub group_type: GroupType,
    pub text_label: String,
    pub xref: Option<Xref>,
    pub rect: Rect,
    pub font: FontStyle,
    pub style: ShapeStyle,
    pub(crate) members: Vec<ElementId>,
}

impl Group {
    pub fn new(group_type: GroupType) -> Self {
        Group {
            group_type,
            text_label: String::new(),
            xref: None,
            rect: Rect::default(),
            font: FontStyle::default(),
            style: ShapeStyle::default(),
            members: vec![],
        }
    }

    pub fn members(&self) -> &[ElementId] {
        &self.members
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AnnotationContent {
    pub value: String,
    pub annotation_type: AnnotationType,
    pub xref: Option<Xref>,
    pub url_link: Option<String>,
}

impl AnnotationContent {
    pub fn new(value: impl Into<String>, annotation_type: AnnotationType) -> Self {
        AnnotationContent {
            value: value.into(),
            annotation_type,
            xref: None,
            url_link: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CitationContent {
    pub xref: Option<Xref>,
    pub url_link: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct EvidenceContent {
    pub value: Option<String>,
    pub xref: Option<Xref>,
    pub url_link: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ElementKind {
    DataNode(DataNode),
    State(State),
    Interaction(LineElement),
    GraphicalLine(LineElement),
    LinePoint(LinePoint),
    Anchor(Anchor),
    Label(Label),
    Shape(Shape),
    Group(Group),
    Annotation(AnnotationContent),
    Citation(CitationContent),
    Evidence(EvidenceContent),
}

impl ElementKind {
    pub fn object_type(&self) -> ObjectType {
        match self {
            ElementKind::DataNode(_) => ObjectType::DataNode,
            ElementKind::State(_) => ObjectType::State,
            ElementKind::Interaction(_) => ObjectType::Interaction,
            ElementKind::GraphicalLine(_) => ObjectType::GraphicalLine,
            ElementKind::LinePoint(_) => ObjectType::LinePoint,
            ElementKind::Anchor(_) => ObjectType::Anchor,
            ElementKind::Label(_) => ObjectType::Label,
            ElementKind::Shape(_) => ObjectType::Shape,
            ElementKind::Group(_) => ObjectType::Group,
            ElementKind::Annotation(_) => ObjectType::Annotation,
            ElementKind::Citation(_) => ObjectType::Citation,
            ElementKind::Evidence(_) => ObjectType::Evidence,
        }
    }
}

/// One element of a pathway.  Constructed detached, then handed to
/// `PathwayModel::add`; the model owns it from then on and all mutation goes
/// through the model so that change events fire.
#[derive(Clone, Debug)]
pub struct PathwayElement {
    pub(crate) id: ElementId,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) group_ref: Option<ElementId>,
    pub(crate) refs: Vec<RefId>,
    pub(crate) back_refs: Vec<RefId>,
    pub comments: Vec<Comment>,
    pub properties: BTreeMap<String, String>,
    pub kind: ElementKind,
}

impl PathwayElement {
    pub fn new(kind: ElementKind) -> Self {
        PathwayElement {
            id: ElementId::default(),
            lifecycle: Lifecycle::Detached,
            group_ref: None,
            refs: vec![],
            back_refs: vec![],
            comments: vec![],
            properties: BTreeMap::new(),
            kind,
        }
    }

    /// Request a specific id; `add` fails if it is already in use.
    pub fn with_id(mut self, id: impl Into<ElementId>) -> Self {
        self.id = id.into();
        self
    }

    /// Request membership in an existing group when added.
    pub fn with_group(mut self, group: impl Into<ElementId>) -> Self {
        self.group_ref = Some(group.into());
        self
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn object_type(&self) -> ObjectType {
        self.kind.object_type()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn group_ref(&self) -> Option<&ElementId> {
        self.group_ref.as_ref()
    }

    /// Refs owned by this element, in the order they were linked.
    pub fn refs(&self) -> &[RefId] {
        &self.refs
    }

    /// For annotations, citations and evidence: the refs pointing here.
    pub fn back_refs(&self) -> &[RefId] {
        &self.back_refs
    }

    /// A detached copy of this element's own content, suitable for adding to
    /// any model.  Links to other elements (refs, group, states, points,
    /// anchors, members, point attachments) are not copied.
    pub fn detached_copy(&self) -> PathwayElement {
        let mut kind = self.kind.clone();
        match &mut kind {
            ElementKind::DataNode(node) => {
                node.states.clear();
                node.alias_ref = None;
            }
            ElementKind::Interaction(line) | ElementKind::GraphicalLine(line) => {
                line.points.clear();
                line.anchors.clear();
            }
            ElementKind::LinePoint(point) => point.element_ref = None,
            ElementKind::Group(group) => group.members.clear(),
            _ => {}
        }
        PathwayElement {
            comments: self.comments.clone(),
            properties: self.properties.clone(),
            ..PathwayElement::new(kind)
        }
    }

    pub fn as_data_node(&self) -> Option<&DataNode> {
        match &self.kind {
            ElementKind::DataNode(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_state(&self) -> Option<&State> {
        match &self.kind {
            ElementKind::State(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_line(&self) -> Option<&LineElement> {
        match &self.kind {
            ElementKind::Interaction(line) | ElementKind::GraphicalLine(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_point(&self) -> Option<&LinePoint> {
        match &self.kind {
            ElementKind::LinePoint(point) => Some(point),
            _ => None,
        }
    }

    pub fn as_anchor(&self) -> Option<&Anchor> {
        match &self.kind {
            ElementKind::Anchor(anchor) => Some(anchor),
            _ => None,
        }
    }

    pub fn as_label(&self) -> Option<&Label> {
        match &self.kind {
            ElementKind::Label(label) => Some(label),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<&Shape> {
        match &self.kind {
            ElementKind::Shape(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match &self.kind {
            ElementKind::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_annotation(&self) -> Option<&AnnotationContent> {
        match &self.kind {
            ElementKind::Annotation(content) => Some(content),
            _ => None,
        }
    }

    pub fn as_citation(&self) -> Option<&CitationContent> {
        match &self.kind {
            ElementKind::Citation(content) => Some(content),
            _ => None,
        }
    }

    pub fn as_evidence(&self) -> Option<&EvidenceContent> {
        match &self.kind {
            ElementKind::Evidence(content) => Some(content),
            _ => None,
        }
    }

    pub(crate) fn line_mut(&mut self) -> Option<&mut LineElement> {
        match &mut self.kind {
            ElementKind::Interaction(line) | ElementKind::GraphicalLine(line) => Some(line),
            _ => None,
        }
    }

    pub(crate) fn group_mut(&mut self) -> Option<&mut Group> {
        match &mut self.kind {
            ElementKind::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn rect(&self) -> Option<&Rect> {
        match &self.kind {
            ElementKind::DataNode(node) => Some(&node.rect),
            ElementKind::Label(label) => Some(&label.rect),
            ElementKind::Shape(shape) => Some(&shape.rect),
            ElementKind::Group(group) => Some(&group.rect),
            _ => None,
        }
    }

    pub(crate) fn rect_mut(&mut self) -> Option<&mut Rect> {
        match &mut self.kind {
            ElementKind::DataNode(node) => Some(&mut node.rect),
            ElementKind::Label(label) => Some(&mut label.rect),
            ElementKind::Shape(shape) => Some(&mut shape.rect),
            ElementKind::Group(group) => Some(&mut group.rect),
            _ => None,
        }
    }

    pub fn font(&self) -> Option<&FontStyle> {
        match &self.kind {
            ElementKind::DataNode(node) => Some(&node.font),
            ElementKind::State(state) => Some(&state.font),
            ElementKind::Label(label) => Some(&label.font),
            ElementKind::Shape(shape) => Some(&shape.font),
            ElementKind::Group(group) => Some(&group.font),
            _ => None,
        }
    }

    fn font_mut(&mut self) -> Option<&mut FontStyle> {
        match &mut self.kind {
            ElementKind::DataNode(node) => Some(&mut node.font),
            ElementKind::State(state) => Some(&mut state.font),
            ElementKind::Label(label) => Some(&mut label.font),
            ElementKind::Shape(shape) => Some(&mut shape.font),
            ElementKind::Group(group) => Some(&mut group.font),
            _ => None,
        }
    }

    pub fn style(&self) -> Option<&ShapeStyle> {
        match &self.kind {
            ElementKind::DataNode(node) => Some(&node.style),
            ElementKind::State(state) => Some(&state.style),
            ElementKind::Label(label) => Some(&label.style),
            ElementKind::Shape(shape) => Some(&shape.style),
            ElementKind::Group(group) => Some(&group.style),
            _ => None,
        }
    }

    fn style_mut(&mut self) -> Option<&mut ShapeStyle> {
        match &mut self.kind {
            ElementKind::DataNode(node) => Some(&mut node.style),
            ElementKind::State(state) => Some(&mut state.style),
            ElementKind::Label(label) => Some(&mut label.style),
            ElementKind::Shape(shape) => Some(&mut shape.style),
            ElementKind::Group(group) => Some(&mut group.style),
            _ => None,
        }
    }

    pub fn text_label(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::DataNode(node) => Some(&node.text_label),
            ElementKind::State(state) => Some(&state.text_label),
            ElementKind::Label(label) => Some(&label.text_label),
            ElementKind::Shape(shape) => Some(&shape.text_label),
            ElementKind::Group(group) => Some(&group.text_label),
            _ => None,
        }
    }

    fn text_label_mut(&mut self) -> Option<&mut String> {
        match &mut self.kind {
            ElementKind::DataNode(node) => Some(&mut node.text_label),
            ElementKind::State(state) => Some(&mut state.text_label),
            ElementKind::Label(label) => Some(&mut label.text_label),
            ElementKind::Shape(shape) => Some(&mut shape.text_label),
            ElementKind::Group(group) => Some(&mut group.text_label),
            _ => None,
        }
    }

    pub fn xref(&self) -> Option<&Xref> {
        match &self.kind {
            ElementKind::DataNode(node) => node.xref.as_ref(),
            ElementKind::State(state) => state.xref.as_ref(),
            ElementKind::Interaction(line) => line.xref.as_ref(),
            ElementKind::Group(group) => group.xref.as_ref(),
            ElementKind::Annotation(content) => content.xref.as_ref(),
            ElementKind::Citation(content) => content.xref.as_ref(),
            ElementKind::Evidence(content) => content.xref.as_ref(),
            _ => None,
        }
    }

    fn xref_mut(&mut self) -> Option<&mut Option<Xref>> {
        match &mut self.kind {
            ElementKind::DataNode(node) => Some(&mut node.xref),
            ElementKind::State(state) => Some(&mut state.xref),
            ElementKind::Interaction(line) => Some(&mut line.xref),
            ElementKind::Group(group) => Some(&mut group.xref),
            _ => None,
        }
    }

    fn width_mut(&mut self) -> Option<&mut f64> {
        match &mut self.kind {
            ElementKind::State(state) => Some(&mut state.width),
            ElementKind::DataNode(node) => Some(&mut node.rect.width),
            ElementKind::Label(label) => Some(&mut label.rect.width),
            ElementKind::Shape(shape) => Some(&mut shape.rect.width),
            ElementKind::Group(group) => Some(&mut group.rect.width),
            _ => None,
        }
    }

    fn height_mut(&mut self) -> Option<&mut f64> {
        match &mut self.kind {
            ElementKind::State(state) => Some(&mut state.height),
            ElementKind::DataNode(node) => Some(&mut node.rect.height),
            ElementKind::Label(label) => Some(&mut label.rect.height),
            ElementKind::Shape(shape) => Some(&mut shape.rect.height),
            ElementKind::Group(group) => Some(&mut group.rect.height),
            _ => None,
        }
    }

    /// Read one property, or `None` if this kind of element lacks it.
    pub fn get(&self, tag: PropertyTag) -> Option<Property> {
        use PropertyTag as T;
        let referencing = self.object_type().is_referencing();
        match tag {
            T::TextLabel => self
                .text_label()
                .map(|label| Property::TextLabel(label.to_owned())),
            T::Href => self
                .as_label()
                .map(|label| Property::Href(label.href.clone())),
            T::Xref => match &self.kind {
                ElementKind::DataNode(_)
                | ElementKind::State(_)
                | ElementKind::Interaction(_)
                | ElementKind::Group(_) => Some(Property::Xref(self.xref().cloned())),
                _ => None,
            },
            T::DataNodeType => self
                .as_data_node()
                .map(|node| Property::DataNodeType(node.data_node_type.clone())),
            T::StateType => self
                .as_state()
                .map(|state| Property::StateType(state.state_type.clone())),
            T::GroupType => self
                .as_group()
                .map(|group| Property::GroupType(group.group_type.clone())),
            T::CenterX => self.rect().map(|rect| Property::CenterX(rect.center_x)),
            T::CenterY => self.rect().map(|rect| Property::CenterY(rect.center_y)),
            T::Width => match &self.kind {
                ElementKind::State(state) => Some(Property::Width(state.width)),
                _ => self.rect().map(|rect| Property::Width(rect.width)),
            },
            T::Height => match &self.kind {
                ElementKind::State(state) => Some(Property::Height(state.height)),
                _ => self.rect().map(|rect| Property::Height(rect.height)),
            },
            T::RelX => match &self.kind {
                ElementKind::State(state) => Some(Property::RelX(state.rel_x)),
                _ => None,
            },
            T::RelY => match &self.kind {
                ElementKind::State(state) => Some(Property::RelY(state.rel_y)),
                _ => None,
            },
            T::TextColor => self.font().map(|font| Property::TextColor(font.text_color)),
            T::FontName => self
                .font()
                .map(|font| Property::FontName(font.font_name.clone())),
            T::FontWeight => self.font().map(|font| Property::FontWeight(font.bold)),
            T::FontStyle => self.font().map(|font| Property::FontStyle(font.italic)),
            T::FontDecoration => self
                .font()
                .map(|font| Property::FontDecoration(font.underline)),
            T::FontStrikethru => self
                .font()
                .map(|font| Property::FontStrikethru(font.strikethru)),
            T::FontSize => self.font().map(|font| Property::FontSize(font.font_size)),
            T::HAlign => self.font().map(|font| Property::HAlign(font.h_align)),
            T::VAlign => self.font().map(|font| Property::VAlign(font.v_align)),
            T::BorderColor => self
                .style()
                .map(|style| Property::BorderColor(style.border_color)),
            T::BorderStyle => self
                .style()
                .map(|style| Property::BorderStyle(style.border_style)),
            T::BorderWidth => self
                .style()
                .map(|style| Property::BorderWidth(style.border_width)),
            T::FillColor => self
                .style()
                .map(|style| Property::FillColor(style.fill_color)),
            T::ShapeType => self
                .style()
                .map(|style| Property::ShapeType(style.shape_type.clone())),
            T::ZOrder => match &self.kind {
                ElementKind::Interaction(line) | ElementKind::GraphicalLine(line) => {
                    Some(Property::ZOrder(line.graphics.z_order))
                }
                _ => self.style().map(|style| Property::ZOrder(style.z_order)),
            },
            T::Rotation => self.style().map(|style| Property::Rotation(style.rotation)),
            T::LineColor => self
                .as_line()
                .map(|line| Property::LineColor(line.graphics.line_color)),
            T::LineStyle => self
                .as_line()
                .map(|line| Property::LineStyle(line.graphics.line_style)),
            T::LineWidth => self
                .as_line()
                .map(|line| Property::LineWidth(line.graphics.line_width)),
            T::ConnectorType => self
                .as_line()
                .map(|line| Property::ConnectorType(line.graphics.connector_type)),
            T::X => self.as_point().map(|point| Property::X(point.x)),
            T::Y => self.as_point().map(|point| Property::Y(point.y)),
            T::ArrowHead => self
                .as_point()
                .map(|point| Property::ArrowHead(point.arrow_head.clone())),
            T::Position => self
                .as_anchor()
                .map(|anchor| Property::Position(anchor.position)),
            T::AnchorShape => self
                .as_anchor()
                .map(|anchor| Property::AnchorShape(anchor.shape_type.clone())),
            T::GroupRef => self
                .object_type()
                .is_groupable()
                .then(|| Property::GroupRef(self.group_ref.clone())),
            T::ElementRef => self
                .as_point()
                .map(|point| Property::ElementRef(point.element_ref.clone())),
            T::AliasRef => self
                .as_data_node()
                .map(|node| Property::AliasRef(node.alias_ref.clone())),
            T::Comments => referencing.then(|| Property::Comments(self.comments.clone())),
            T::DynamicProperties => {
                referencing.then(|| Property::DynamicProperties(self.properties.clone()))
            }
        }
    }

    /// Write one property.  Returns whether the stored value changed.  Link
    /// properties are stored as given; `PathwayModel` checks their targets
    /// and keeps the reverse lists in step.
    pub(crate) fn set(&mut self, property: Property) -> Result<bool> {
        let tag = property.tag();
        let object_type = self.object_type();
        let unsupported = move || {
            Error::new(
                ErrorKind::Model,
                ErrorCode::UnsupportedProperty,
                Some(format!("{object_type} has no {tag:?} property")),
            )
        };
        let referencing = object_type.is_referencing();

        let changed = match property {
            Property::TextLabel(v) => replace(self.text_label_mut().ok_or_else(unsupported)?, v),
            Property::Href(v) => match &mut self.kind {
                ElementKind::Label(label) => replace(&mut label.href, v),
                _ => return Err(unsupported()),
            },
            Property::Xref(v) => replace(self.xref_mut().ok_or_else(unsupported)?, v),
            Property::DataNodeType(v) => match &mut self.kind {
                ElementKind::DataNode(node) => replace(&mut node.data_node_type, v),
                _ => return Err(unsupported()),
            },
            Property::StateType(v) => match &mut self.kind {
                ElementKind::State(state) => replace(&mut state.state_type, v),
                _ => return Err(unsupported()),
            },
            Property::GroupType(v) => match &mut self.kind {
                ElementKind::Group(group) => replace(&mut group.group_type, v),
                _ => return Err(unsupported()),
            },
            Property::CenterX(v) => {
                replace(&mut self.rect_mut().ok_or_else(unsupported)?.center_x, v)
            }
            Property::CenterY(v) => {
                replace(&mut self.rect_mut().ok_or_else(unsupported)?.center_y, v)
            }
            Property::Width(v) => replace(self.width_mut().ok_or_else(unsupported)?, v),
            Property::Height(v) => replace(self.height_mut().ok_or_else(unsupported)?, v),
            Property::RelX(v) => match &mut self.kind {
                ElementKind::State(state) => replace(&mut state.rel_x, v),
                _ => return Err(unsupported()),
            },
            Property::RelY(v) => match &mut self.kind {
                ElementKind::State(state) => replace(&mut state.rel_y, v),
                _ => return Err(unsupported()),
            },
            Property::TextColor(v) => {
                replace(&mut self.font_mut().ok_or_else(unsupported)?.text_color, v)
            }
            Property::FontName(v) => {
                replace(&mut self.font_mut().ok_or_else(unsupported)?.font_name, v)
            }
            Property::FontWeight(v) => replace(&mut self.font_mut().ok_or_else(unsupported)?.bold, v),
            Property::FontStyle(v) => {
                replace(&mut self.font_mut().ok_or_else(unsupported)?.italic, v)
            }
            Property::FontDecoration(v) => {
                replace(&mut self.font_mut().ok_or_else(unsupported)?.underline, v)
            }
            Property::FontStrikethru(v) => {
                replace(&mut self.font_mut().ok_or_else(unsupported)?.strikethru, v)
            }
            Property::FontSize(v) => {
                replace(&mut self.font_mut().ok_or_else(unsupported)?.font_size, v)
            }
            Property::HAlign(v) => replace(&mut self.font_mut().ok_or_else(unsupported)?.h_align, v),
            Property::VAlign(v) => replace(&mut self.font_mut().ok_or_else(unsupported)?.v_align, v),
            Property::BorderColor(v) => {
                replace(&mut self.style_mut().ok_or_else(unsupported)?.border_color, v)
            }
            Property::BorderStyle(v) => {
                replace(&mut self.style_mut().ok_or_else(unsupported)?.border_style, v)
            }
            Property::BorderWidth(v) => {
                replace(&mut self.style_mut().ok_or_else(unsupported)?.border_width, v)
            }
            Property::FillColor(v) => {
                replace(&mut self.style_mut().ok_or_else(unsupported)?.fill_color, v)
            }
            Property::ShapeType(v) => {
                replace(&mut self.style_mut().ok_or_else(unsupported)?.shape_type, v)
            }
            Property::ZOrder(v) => match &mut self.kind {
                ElementKind::Interaction(line) | ElementKind::GraphicalLine(line) => {
                    replace(&mut line.graphics.z_order, v)
                }
                _ => replace(&mut self.style_mut().ok_or_else(unsupported)?.z_order, v),
            },
            Property::Rotation(v) => {
                replace(&mut self.style_mut().ok_or_else(unsupported)?.rotation, v)
            }
            Property::LineColor(v) => replace(
                &mut self.line_mut().ok_or_else(unsupported)?.graphics.line_color,
                v,
            ),
            Property::LineStyle(v) => replace(
                &mut self.line_mut().ok_or_else(unsupported)?.graphics.line_style,
                v,
            ),
            Property::LineWidth(v) => replace(
                &mut self.line_mut().ok_or_else(unsupported)?.graphics.line_width,
                v,
            ),
            Property::ConnectorType(v) => replace(
                &mut self.line_mut().ok_or_else(unsupported)?.graphics.connector_type,
                v,
            ),
            Property::X(v) => match &mut self.kind {
                ElementKind::LinePoint(point) => replace(&mut point.x, v),
                _ => return Err(unsupported()),
            },
            Property::Y(v) => match &mut self.kind {
                ElementKind::LinePoint(point) => replace(&mut point.y, v),
                _ => return Err(unsupported()),
            },
            Property::ArrowHead(v) => match &mut self.kind {
                ElementKind::LinePoint(point) => replace(&mut point.arrow_head, v),
                _ => return Err(unsupported()),
            },
            Property::Position(v) => match &mut self.kind {
                ElementKind::Anchor(anchor) => replace(&mut anchor.position, v),
                _ => return Err(unsupported()),
            },
            Property::AnchorShape(v) => match &mut self.kind {
                ElementKind::Anchor(anchor) => replace(&mut anchor.shape_type, v),
                _ => return Err(unsupported()),
            },
            Property::GroupRef(v) if object_type.is_groupable() => replace(&mut self.group_ref, v),
            Property::ElementRef(v) => match &mut self.kind {
                ElementKind::LinePoint(point) => replace(&mut point.element_ref, v),
                _ => return Err(unsupported()),
            },
            Property::AliasRef(v) => match &mut self.kind {
                ElementKind::DataNode(node) => replace(&mut node.alias_ref, v),
                _ => return Err(unsupported()),
            },
            Property::Comments(v) if referencing => replace(&mut self.comments, v),
            Property::DynamicProperties(v) if referencing => replace(&mut self.properties, v),
            Property::GroupRef(_) | Property::Comments(_) | Property::DynamicProperties(_) => {
                return Err(unsupported());
            }
        };

        Ok(changed)
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// Names of the properties that can be read and written generically.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyTag {
    TextLabel,
    Href,
    Xref,
    DataNodeType,
    StateType,
    GroupType,
    CenterX,
    CenterY,
    Width,
    Height,
    RelX,
    RelY,
    TextColor,
    FontName,
    FontWeight,
    FontStyle,
    FontDecoration,
    FontStrikethru,
    FontSize,
    HAlign,
    VAlign,
    BorderColor,
    BorderStyle,
    BorderWidth,
    FillColor,
    ShapeType,
    ZOrder,
    Rotation,
    LineColor,
    LineStyle,
    LineWidth,
    ConnectorType,
    X,
    Y,
    ArrowHead,
    Position,
    AnchorShape,
    GroupRef,
    ElementRef,
    AliasRef,
    Comments,
    DynamicProperties,
}

impl PropertyTag {
    pub const ALL: [PropertyTag; 42] = [
        PropertyTag::TextLabel,
        PropertyTag::Href,
        PropertyTag::Xref,
        PropertyTag::DataNodeType,
        PropertyTag::StateType,
        PropertyTag::GroupType,
        PropertyTag::CenterX,
        PropertyTag::CenterY,
        PropertyTag::Width,
        PropertyTag::Height,
        PropertyTag::RelX,
        PropertyTag::RelY,
        PropertyTag::TextColor,
        PropertyTag::FontName,
        PropertyTag::FontWeight,
        PropertyTag::FontStyle,
        PropertyTag::FontDecoration,
        PropertyTag::FontStrikethru,
        PropertyTag::FontSize,
        PropertyTag::HAlign,
        PropertyTag::VAlign,
        PropertyTag::BorderColor,
        PropertyTag::BorderStyle,
        PropertyTag::BorderWidth,
        PropertyTag::FillColor,
        PropertyTag::ShapeType,
        PropertyTag::ZOrder,
        PropertyTag::Rotation,
        PropertyTag::LineColor,
        PropertyTag::LineStyle,
        PropertyTag::LineWidth,
        PropertyTag::ConnectorType,
        PropertyTag::X,
        PropertyTag::Y,
        PropertyTag::ArrowHead,
        PropertyTag::Position,
        PropertyTag::AnchorShape,
        PropertyTag::GroupRef,
        PropertyTag::ElementRef,
        PropertyTag::AliasRef,
        PropertyTag::Comments,
        PropertyTag::DynamicProperties,
    ];

    /// Properties that point at another element of the same model.
    pub fn is_link(&self) -> bool {
        matches!(
            self,
            PropertyTag::GroupRef | PropertyTag::ElementRef | PropertyTag::AliasRef
        )
    }

    /// Properties whose change moves or resizes the element's outline.
    pub fn is_geometry(&self) -> bool {
        matches!(
            self,
            PropertyTag::CenterX
                | PropertyTag::CenterY
                | PropertyTag::Width
                | PropertyTag::Height
                | PropertyTag::RelX
                | PropertyTag::RelY
                | PropertyTag::Rotation
                | PropertyTag::X
                | PropertyTag::Y
                | PropertyTag::Position
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Property {
    TextLabel(String),
    Href(Option<String>),
    Xref(Option<Xref>),
    DataNodeType(DataNodeType),
    StateType(StateType),
    GroupType(GroupType),
    CenterX(f64),
    CenterY(f64),
    Width(f64),
    Height(f64),
    RelX(f64),
    RelY(f64),
    TextColor(Color),
    FontName(String),
    FontWeight(bool),
    FontStyle(bool),
    FontDecoration(bool),
    FontStrikethru(bool),
    FontSize(f64),
    HAlign(HAlign),
    VAlign(VAlign),
    BorderColor(Color),
    BorderStyle(LineStyle),
    BorderWidth(f64),
    FillColor(Color),
    ShapeType(ShapeType),
    ZOrder(Option<i32>),
    Rotation(f64),
    LineColor(Color),
    LineStyle(LineStyle),
    LineWidth(f64),
    ConnectorType(ConnectorType),
    X(f64),
    Y(f64),
    ArrowHead(ArrowHeadType),
    Position(f64),
    AnchorShape(AnchorShapeType),
    GroupRef(Option<ElementId>),
    ElementRef(Option<ElementId>),
    AliasRef(Option<ElementId>),
    Comments(Vec<Comment>),
    DynamicProperties(BTreeMap<String, String>),
}

impl Property {
    pub fn tag(&self) -> PropertyTag {
        match self {
            Property::TextLabel(_) => PropertyTag::TextLabel,
            Property::Href(_) => PropertyTag::Href,
            Property::Xref(_) => PropertyTag::Xref,
            Property::DataNodeType(_) => PropertyTag::DataNodeType,
            Property::StateType(_) => PropertyTag::StateType,
            Property::GroupType(_) => PropertyTag::GroupType,
            Property::CenterX(_) => PropertyTag::CenterX,
            Property::CenterY(_) => PropertyTag::CenterY,
            Property::Width(_) => PropertyTag::Width,
            Property::Height(_) => PropertyTag::Height,
            Property::RelX(_) => PropertyTag::RelX,
            Property::RelY(_) => PropertyTag::RelY,
            Property::TextColor(_) => PropertyTag::TextColor,
            Property::FontName(_) => PropertyTag::FontName,
            Property::FontWeight(_) => PropertyTag::FontWeight,
            Property::FontStyle(_) => PropertyTag::FontStyle,
            Property::FontDecoration(_) => PropertyTag::FontDecoration,
            Property::FontStrikethru(_) => PropertyTag::FontStrikethru,
            Property::FontSize(_) => PropertyTag::FontSize,
            Property::HAlign(_) => PropertyTag::HAlign,
            Property::VAlign(_) => PropertyTag::VAlign,
            Property::BorderColor(_) => PropertyTag::BorderColor,
            Property::BorderStyle(_) => PropertyTag::BorderStyle,
            Property::BorderWidth(_) => PropertyTag::BorderWidth,
            Property::FillColor(_) => PropertyTag::FillColor,
            Property::ShapeType(_) => PropertyTag::ShapeType,
            Property::ZOrder(_) => PropertyTag::ZOrder,
            Property::Rotation(_) => PropertyTag::Rotation,
            Property::LineColor(_) => PropertyTag::LineColor,
            Property::LineStyle(_) => PropertyTag::LineStyle,
            Property::LineWidth(_) => PropertyTag::LineWidth,
            Property::ConnectorType(_) => PropertyTag::ConnectorType,
            Property::X(_) => PropertyTag::X,
            Property::Y(_) => PropertyTag::Y,
            Property::ArrowHead(_) => PropertyTag::ArrowHead,
            Property::Position(_) => PropertyTag::Position,
            Property::AnchorShape(_) => PropertyTag::AnchorShape,
            Property::GroupRef(_) => PropertyTag::GroupRef,
            Property::ElementRef(_) => PropertyTag::ElementRef,
            Property::AliasRef(_) => PropertyTag::AliasRef,
            Property::Comments(_) => PropertyTag::Comments,
            Property::DynamicProperties(_) => PropertyTag::DynamicProperties,
        }
    }
}

/// Pathway-level metadata.  The pathway itself is a `PathwayObject` of type
/// `Pathway`: it owns refs, comments and dynamic properties like any other
/// referencing element, but is not stored in the element map.
#[derive(Clone, Debug, PartialEq)]
pub struct Pathway {
    pub title: String,
    pub organism: Option<String>,
    pub source: Option<String>,
    pub version: Option<String>,
    pub license: Option<String>,
    pub description: Option<String>,
    pub xref: Option<Xref>,
    pub authors: Vec<Author>,
    pub board_width: f64,
    pub board_height: f64,
    pub background_color: Color,
    pub comments: Vec<Comment>,
    pub properties: BTreeMap<String, String>,
    pub(crate) refs: Vec<RefId>,
}

impl Pathway {
    pub fn refs(&self) -> &[RefId] {
        &self.refs
    }
}

impl Default for Pathway {
    fn default() -> Self {
        Pathway {
            title: String::new(),
            organism: None,
            source: None,
            version: None,
            license: None,
            description: None,
            xref: None,
            authors: vec![],
            board_width: defaults::BOARD_WIDTH,
            board_height: defaults::BOARD_HEIGHT,
            background_color: defaults::BACKGROUND_COLOR,
            comments: vec![],
            properties: BTreeMap::new(),
            refs: vec![],
        }
    }
}

#[test]
fn test_get_set_property() {
    let mut element = PathwayElement::new(ElementKind::DataNode(DataNode::new(
        "TP53",
        DataNodeType::GENE_PRODUCT,
    )));
    assert_eq!(
        Some(Property::TextLabel("TP53".to_owned())),
        element.get(PropertyTag::TextLabel)
    );
    assert!(!element.set(Property::TextLabel("TP53".to_owned())).unwrap());
    assert!(element.set(Property::TextLabel("MDM2".to_owned())).unwrap());
    assert_eq!(
        Some(Property::TextLabel("MDM2".to_owned())),
        element.get(PropertyTag::TextLabel)
    );

    assert!(element.set(Property::BorderWidth(2.0)).unwrap());
    assert_eq!(
        Some(Property::BorderWidth(2.0)),
        element.get(PropertyTag::BorderWidth)
    );

    assert_eq!(None, element.get(PropertyTag::LineColor));
    let err = element.set(Property::LineColor(Color::BLACK)).unwrap_err();
    assert_eq!(ErrorCode::UnsupportedProperty, err.code);
}

#[test]
fn test_property_tags_match() {
    let element = PathwayElement::new(ElementKind::Shape(Shape::new(ShapeType::OVAL)));
    for tag in [
        PropertyTag::TextLabel,
        PropertyTag::CenterX,
        PropertyTag::Width,
        PropertyTag::FontSize,
        PropertyTag::ShapeType,
        PropertyTag::Rotation,
        PropertyTag::Comments,
    ] {
        let property = element.get(tag).unwrap();
        assert_eq!(tag, property.tag());
    }
}

#[test]
fn test_state_size_properties() {
    let mut element =
        PathwayElement::new(ElementKind::State(State::new(ElementId::from("n1"), "P")));
    assert!(element.set(Property::Width(10.0)).unwrap());
    assert!(element.set(Property::RelX(1.0)).unwrap());
    assert_eq!(Some(Property::Width(10.0)), element.get(PropertyTag::Width));
    assert_eq!(None, element.get(PropertyTag::CenterX));
}

#[test]
fn test_detached_copy_drops_links() {
    let mut node = DataNode::new("A", DataNodeType::PROTEIN);
    node.states.push(ElementId::from("s1"));
    let mut element = PathwayElement::new(ElementKind::DataNode(node)).with_id("n1");
    element.lifecycle = Lifecycle::Terminated;
    element.refs.push(RefId(4));
    element.comments.push(Comment {
        source: None,
        text: "note".to_owned(),
    });

    let copy = element.detached_copy();
    assert!(copy.id().is_empty());
    assert_eq!(Lifecycle::Detached, copy.lifecycle());
    assert!(copy.refs().is_empty());
    assert!(copy.as_data_node().unwrap().states().is_empty());
    assert_eq!(1, copy.comments.len());
}
