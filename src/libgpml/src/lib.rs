// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! An object model for biological pathway diagrams, and a reader and
//! writer for the GPML files they are stored in.
//!
//! A [`PathwayModel`] owns every element of one pathway.  Elements are
//! addressed by [`ElementId`]; links between them (group membership, line
//! endpoints, aliases and annotation/citation/evidence refs) are kept
//! consistent in both directions by the model, and removing an element
//! unlinks everything that pointed at it.

#![forbid(unsafe_code)]

pub mod common;
pub mod datamodel;
pub mod events;
mod geometry;
pub mod gpml;
pub mod ids;
mod lifecycle;
mod model;
pub mod refs;
pub mod types;

pub use self::common::{Error, ErrorCode, ErrorKind, Result};
pub use self::datamodel::{
    Anchor, AnnotationContent, Author, CitationContent, Comment, DataNode, ElementKind,
    EvidenceContent, FontStyle, Group, Label, Lifecycle, LineElement, LineGraphics, LinePoint,
    ObjectType, Pathway, PathwayElement, Property, PropertyTag, Rect, Shape, ShapeStyle, State,
    Xref,
};
pub use self::events::{EventKind, ListenerId, PathwayEvent};
pub use self::geometry::{point_along, polyline_bounds, rotated_bounds, union};
pub use self::gpml::{ReadOptions, WriteOptions, read, read_str, write, write_string};
#[cfg(feature = "file_io")]
pub use self::gpml::{read_from_path, write_to_path};
pub use self::ids::ElementId;
pub use self::model::PathwayModel;
pub use self::refs::{RefId, RefKind, RefRecord, RefSource};
pub use self::types::Color;
