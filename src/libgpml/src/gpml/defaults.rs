// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Values substituted for optional GPML attributes that are absent from a
//! document.  The same literals back the `Default` impls in `datamodel`, so
//! a freshly constructed element and one read from a minimal file agree.

use crate::types::{
    AnchorShapeType, AnnotationType, ArrowHeadType, Color, ConnectorType, DataNodeType,
    GroupType, HAlign, LineStyle, ShapeType, StateType, VAlign,
};

pub const LINE_COLOR: Color = Color::BLACK;
pub const LINE_STYLE: LineStyle = LineStyle::Solid;
pub const LINE_WIDTH: f64 = 1.0;
pub const CONNECTOR_TYPE: ConnectorType = ConnectorType::Straight;
pub const ARROW_HEAD: ArrowHeadType = ArrowHeadType::UNDIRECTED;
pub const ANCHOR_SHAPE: AnchorShapeType = AnchorShapeType::SQUARE;
pub const ANCHOR_POSITION: f64 = 0.5;

pub const TEXT_COLOR: Color = Color::BLACK;
pub const FONT_NAME: &str = "Arial";
pub const FONT_SIZE: f64 = 12.0;
pub const H_ALIGN: HAlign = HAlign::Center;
pub const V_ALIGN: VAlign = VAlign::Middle;

pub const BORDER_COLOR: Color = Color::BLACK;
pub const BORDER_STYLE: LineStyle = LineStyle::Solid;
pub const BORDER_WIDTH: f64 = 1.0;
pub const FILL_COLOR: Color = Color::WHITE;
pub const SHAPE_TYPE: ShapeType = ShapeType::RECTANGLE;
pub const ROTATION: f64 = 0.0;

pub const DATA_NODE_TYPE: DataNodeType = DataNodeType::UNDEFINED;
pub const STATE_TYPE: StateType = StateType::UNDEFINED;
pub const GROUP_TYPE: GroupType = GroupType::GROUP;
pub const ANNOTATION_TYPE: AnnotationType = AnnotationType::Undefined;

pub const BOARD_WIDTH: f64 = 0.0;
pub const BOARD_HEIGHT: f64 = 0.0;
pub const BACKGROUND_COLOR: Color = Color::WHITE;

/// Space left between a group's outline and the bounds of its members.
pub const GROUP_PADDING: f64 = 8.0;
