// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use crate::datamodel::{ElementKind, ObjectType, Rect};
use crate::events::{EventKind, PathwayEvent};
use crate::gpml::defaults::GROUP_PADDING;
use crate::ids::ElementId;
use crate::model::PathwayModel;

/// Axis-aligned bounds of `rect` turned by `rotation` radians about its
/// center.
pub fn rotated_bounds(rect: &Rect, rotation: f64) -> Rect {
    if rotation == 0.0 {
        return *rect;
    }
    let (sin, cos) = rotation.sin_cos();
    let width = (rect.width * cos).abs() + (rect.height * sin).abs();
    let height = (rect.width * sin).abs() + (rect.height * cos).abs();
    Rect::new(rect.center_x, rect.center_y, width, height)
}

pub fn union(a: &Rect, b: &Rect) -> Rect {
    from_edges(
        a.left().min(b.left()),
        a.top().min(b.top()),
        a.right().max(b.right()),
        a.bottom().max(b.bottom()),
    )
}

fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Rect {
    Rect::new(
        (left + right) / 2.0,
        (top + bottom) / 2.0,
        right - left,
        bottom - top,
    )
}

/// Bounds of a polyline; `None` without points.
pub fn polyline_bounds(points: &[(f64, f64)]) -> Option<Rect> {
    let (&(x0, y0), rest) = points.split_first()?;
    let (mut left, mut top, mut right, mut bottom) = (x0, y0, x0, y0);
    for &(x, y) in rest {
        left = left.min(x);
        top = top.min(y);
        right = right.max(x);
        bottom = bottom.max(y);
    }
    Some(from_edges(left, top, right, bottom))
}

/// The point a fraction `position` of the way along a polyline, measured by
/// length.
pub fn point_along(points: &[(f64, f64)], position: f64) -> Option<(f64, f64)> {
    let first = *points.first()?;
    let segments: Vec<f64> = points
        .windows(2)
        .map(|w| (w[1].0 - w[0].0).hypot(w[1].1 - w[0].1))
        .collect();
    let total: f64 = segments.iter().sum();
    if total == 0.0 {
        return Some(first);
    }

    let mut remaining = position.clamp(0.0, 1.0) * total;
    for (i, length) in segments.iter().enumerate() {
        if remaining <= *length && *length > 0.0 {
            let t = remaining / length;
            let (a, b) = (points[i], points[i + 1]);
            return Some((a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t));
        }
        remaining -= length;
    }
    points.last().copied()
}

impl PathwayModel {
    fn line_coordinates(&self, line: &ElementId) -> Vec<(f64, f64)> {
        let Some(line) = self.find_by_id(line.as_str()).and_then(|e| e.as_line()) else {
            return vec![];
        };
        line.points()
            .iter()
            .filter_map(|id| self.find_by_id(id.as_str()).and_then(|e| e.as_point()))
            .map(|point| (point.x, point.y))
            .collect()
    }

    /// Where an anchor sits on its line.
    pub fn anchor_coordinates(&self, anchor: &ElementId) -> Option<(f64, f64)> {
        let anchor = self.find_by_id(anchor.as_str())?.as_anchor()?;
        point_along(&self.line_coordinates(&anchor.line), anchor.position)
    }

    /// Axis-aligned bounds of an element as drawn.  Shapes include their
    /// rotation; a state is placed relative to its data node; points and
    /// anchors have zero size.
    pub fn bounds_of(&self, id: &ElementId) -> Option<Rect> {
        let element = self.find_by_id(id.as_str())?;
        match &element.kind {
            ElementKind::DataNode(node) => Some(rotated_bounds(&node.rect, node.style.rotation)),
            ElementKind::Label(label) => Some(rotated_bounds(&label.rect, label.style.rotation)),
            ElementKind::Shape(shape) => Some(rotated_bounds(&shape.rect, shape.style.rotation)),
            ElementKind::Group(group) => Some(group.rect),
            ElementKind::State(state) => {
                let parent = self.find_by_id(state.data_node.as_str())?.rect()?;
                Some(Rect::new(
                    parent.center_x + state.rel_x * parent.width / 2.0,
                    parent.center_y + state.rel_y * parent.height / 2.0,
                    state.width,
                    state.height,
                ))
            }
            ElementKind::Interaction(_) | ElementKind::GraphicalLine(_) => {
                polyline_bounds(&self.line_coordinates(id))
            }
            ElementKind::LinePoint(point) => Some(Rect::new(point.x, point.y, 0.0, 0.0)),
            ElementKind::Anchor(_) => {
                let (x, y) = self.anchor_coordinates(id)?;
                Some(Rect::new(x, y, 0.0, 0.0))
            }
            ElementKind::Annotation(_) | ElementKind::Citation(_) | ElementKind::Evidence(_) => {
                None
            }
        }
    }

    /// The union of the members' bounds plus padding; `None` for a group
    /// none of whose members has a position.
    pub fn group_bounds(&self, group: &ElementId) -> Option<Rect> {
        let group = self.find_by_id(group.as_str())?.as_group()?;
        let bounds = group
            .members()
            .iter()
            .filter_map(|member| self.bounds_of(member))
            .reduce(|a, b| union(&a, &b))?;
        Some(Rect::new(
            bounds.center_x,
            bounds.center_y,
            bounds.width + 2.0 * GROUP_PADDING,
            bounds.height + 2.0 * GROUP_PADDING,
        ))
    }

    /// Recompute the stored bounds of `group` and of the groups enclosing
    /// it, firing `Resized` for each one that moved.
    pub(crate) fn refresh_group_bounds(&mut self, group: &ElementId) {
        let chain: Vec<ElementId> = self.group_chain(group).collect();
        for group in chain.iter() {
            let Some(bounds) = self.group_bounds(group) else {
                break;
            };
            let Some(rect) = self.elements.get_mut(group).and_then(|e| e.rect_mut()) else {
                break;
            };
            if rect.approx_eq(&bounds) {
                break;
            }
            *rect = bounds;
            self.events.push(PathwayEvent::element(
                EventKind::Resized,
                ObjectType::Group,
                group,
            ));
        }
    }

    /// Refresh the group containing `id`.  Points, anchors and states count
    /// as part of the element that owns them.
    pub(crate) fn refresh_enclosing_groups(&mut self, id: &ElementId) {
        let Some(element) = self.elements.get(id) else {
            return;
        };
        let owner = match &element.kind {
            ElementKind::LinePoint(point) => self.elements.get(&point.line),
            ElementKind::Anchor(anchor) => self.elements.get(&anchor.line),
            ElementKind::State(state) => self.elements.get(&state.data_node),
            _ => Some(element),
        };
        if let Some(group) = owner.and_then(|owner| owner.group_ref.clone()) {
            self.refresh_group_bounds(&group);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_rotated_bounds() {
        let rect = Rect::new(10.0, 10.0, 40.0, 20.0);
        let turned = rotated_bounds(&rect, FRAC_PI_2);
        assert!(approx_eq!(f64, 20.0, turned.width, epsilon = 1e-9));
        assert!(approx_eq!(f64, 40.0, turned.height, epsilon = 1e-9));
        assert_eq!(rect, rotated_bounds(&rect, 0.0));
    }

    #[test]
    fn test_union_and_polyline() {
        let a = Rect::new(0.0, 0.0, 2.0, 2.0);
        let b = Rect::new(10.0, 0.0, 2.0, 4.0);
        assert!(union(&a, &b).approx_eq(&Rect::new(5.0, 0.0, 12.0, 4.0)));

        assert_eq!(None, polyline_bounds(&[]));
        let line = polyline_bounds(&[(0.0, 0.0), (10.0, 5.0), (4.0, -5.0)]).unwrap();
        assert!(line.approx_eq(&Rect::new(5.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_point_along() {
        let points = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)];
        assert_eq!(Some((0.0, 0.0)), point_along(&points, 0.0));
        assert_eq!(Some((10.0, 0.0)), point_along(&points, 0.5));
        assert_eq!(Some((10.0, 5.0)), point_along(&points, 0.75));
        assert_eq!(Some((10.0, 10.0)), point_along(&points, 1.0));
        assert_eq!(None, point_along(&[], 0.5));
    }
}
