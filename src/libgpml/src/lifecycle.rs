// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! The removal cascade.  Every step only drops links, so a cascade cannot
//! fail part way through.

use tracing::trace;

use crate::datamodel::{ElementKind, ObjectType, PathwayElement, PropertyTag};
use crate::events::{EventKind, PathwayEvent};
use crate::ids::ElementId;
use crate::model::PathwayModel;
use crate::refs::RefSource;

impl PathwayModel {
    /// Terminate `id` and what depends on it:
    ///
    /// 1. leave the parent group (a group emptied this way stays until it is
    ///    pruned); a group being removed releases its members
    /// 2. unlink the refs it owns, removing value objects that orphans
    /// 3. a value object drops every ref pointing at it
    /// 4. states, points and anchors owned by it are terminated too
    /// 5. points attached to it are detached and aliases of it cleared
    ///
    /// Returns `None` if `id` is not live, which makes the cascade
    /// idempotent.
    pub(crate) fn terminate(&mut self, id: &ElementId) -> Option<PathwayElement> {
        let element = self.elements.get(id)?;
        let object_type = element.object_type();
        let group = element.group_ref.clone();
        trace!(element = %id, %object_type, "terminating");
        self.events
            .push(PathwayEvent::element(EventKind::Deleted, object_type, id));

        if let Some(group) = &group {
            self.leave_group(id, group);
        }
        if object_type == ObjectType::Group {
            self.release_members(id);
        }

        self.unlink_refs_of(&RefSource::Element(id.clone()));

        if object_type.is_value_object() {
            let back_refs = self
                .elements
                .get(id)
                .map(|element| element.back_refs.clone())
                .unwrap_or_default();
            for r in back_refs.into_iter().rev() {
                // the orphan reported here is this element
                self.detach_ref(r);
            }
        }

        let children = match self.elements.get_mut(id).map(|element| &mut element.kind) {
            Some(ElementKind::DataNode(node)) => std::mem::take(&mut node.states),
            Some(ElementKind::Interaction(line)) | Some(ElementKind::GraphicalLine(line)) => {
                let mut children = std::mem::take(&mut line.points);
                children.append(&mut line.anchors);
                children
            }
            _ => vec![],
        };
        for child in children.iter() {
            self.terminate(child);
        }

        self.leave_parent(id);
        if object_type.is_linkable() {
            self.detach_points_from(id);
        }
        if object_type == ObjectType::Group {
            self.clear_aliases_of(id);
        }

        self.forget(id, object_type)
    }

    fn release_members(&mut self, group: &ElementId) {
        let members = match self.elements.get_mut(group).and_then(|g| g.group_mut()) {
            Some(g) => std::mem::take(&mut g.members),
            None => return,
        };
        for member in members.iter() {
            if let Some(element) = self.elements.get_mut(member) {
                element.group_ref = None;
                let event = PathwayEvent::element(
                    EventKind::PropertyChanged(PropertyTag::GroupRef),
                    element.object_type(),
                    member,
                );
                self.events.push(event);
            }
        }
    }

    /// Remove a state, point or anchor from its owner's list.
    fn leave_parent(&mut self, id: &ElementId) {
        let (parent, is_point) = match self.elements.get(id).map(|element| &element.kind) {
            Some(ElementKind::State(state)) => (state.data_node.clone(), false),
            Some(ElementKind::LinePoint(point)) => (point.line.clone(), true),
            Some(ElementKind::Anchor(anchor)) => (anchor.line.clone(), false),
            _ => return,
        };
        match self.elements.get_mut(&parent).map(|element| &mut element.kind) {
            Some(ElementKind::DataNode(node)) => node.states.retain(|state| state != id),
            Some(ElementKind::Interaction(line)) | Some(ElementKind::GraphicalLine(line)) => {
                line.points.retain(|point| point != id);
                line.anchors.retain(|anchor| anchor != id);
            }
            _ => return,
        }
        if is_point {
            self.refresh_enclosing_groups(&parent);
        }
    }

    fn detach_points_from(&mut self, target: &ElementId) {
        let points = self.element_ids_of_type(ObjectType::LinePoint).to_vec();
        for point in points.iter() {
            if let Some(element) = self.elements.get_mut(point)
                && let ElementKind::LinePoint(p) = &mut element.kind
                && p.element_ref.as_ref() == Some(target)
            {
                p.element_ref = None;
                self.events.push(PathwayEvent::element(
                    EventKind::PropertyChanged(PropertyTag::ElementRef),
                    ObjectType::LinePoint,
                    point,
                ));
            }
        }
    }

    fn clear_aliases_of(&mut self, group: &ElementId) {
        let nodes = self.element_ids_of_type(ObjectType::DataNode).to_vec();
        for node in nodes.iter() {
            if let Some(element) = self.elements.get_mut(node)
                && let ElementKind::DataNode(n) = &mut element.kind
                && n.alias_ref.as_ref() == Some(group)
            {
                n.alias_ref = None;
                self.events.push(PathwayEvent::element(
                    EventKind::PropertyChanged(PropertyTag::AliasRef),
                    ObjectType::DataNode,
                    node,
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::common::ErrorCode;
    use crate::datamodel::{
        AnnotationContent, CitationContent, DataNode, ElementKind, Group, LineElement, LinePoint,
        ObjectType, PathwayElement, Property, Rect, State, Xref,
    };
    use crate::events::EventKind;
    use crate::ids::ElementId;
    use crate::model::PathwayModel;
    use crate::refs::RefSource;
    use crate::types::{AnnotationType, DataNodeType, GroupType};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn add_node(model: &mut PathwayModel, label: &str) -> ElementId {
        let mut node = DataNode::new(label, DataNodeType::METABOLITE);
        node.rect = Rect::new(50.0, 50.0, 60.0, 20.0);
        model
            .add(PathwayElement::new(ElementKind::DataNode(node)))
            .unwrap()
    }

    #[test]
    fn test_terminate_unlinks_refs_both_ways() {
        let mut model = PathwayModel::new();
        let node = add_node(&mut model, "glucose");
        let other = add_node(&mut model, "pyruvate");

        let shared = model
            .add_or_reuse_annotation(AnnotationContent::new("sugar", AnnotationType::Ontology))
            .unwrap();
        let private = model
            .add_or_reuse_citation(CitationContent {
                xref: Some(Xref::new("1", "PubMed")),
                url_link: None,
            })
            .unwrap();
        model.link_annotation_ref(&node, &shared).unwrap();
        model.link_annotation_ref(&other, &shared).unwrap();
        model.link_citation_ref(&node, &private).unwrap();

        let removed = model.remove(&node).unwrap().unwrap();
        assert!(removed.refs().is_empty());
        assert!(model.find_by_id(private.as_str()).is_none());
        assert_eq!(1, model.back_refs(&shared).len());
        assert_eq!(1, model.ref_count());
    }

    #[test]
    fn test_remove_is_idempotent_and_final() {
        let mut model = PathwayModel::new();
        let node = add_node(&mut model, "A");
        let removed = model.remove(&node).unwrap().unwrap();
        assert!(model.remove(&node).unwrap().is_none());
        assert!(model.is_terminated(node.as_str()));

        let err = model
            .set_property(&node, Property::TextLabel("B".to_owned()))
            .unwrap_err();
        assert_eq!(ErrorCode::UseAfterTerminate, err.code);

        let err = model.add(removed).unwrap_err();
        assert_eq!(ErrorCode::UseAfterTerminate, err.code);

        let err = model.remove(&ElementId::from("never")).unwrap_err();
        assert_eq!(ErrorCode::InvalidReference, err.code);
    }

    #[test]
    fn test_remove_cascades_to_children_and_links() {
        let mut model = PathwayModel::new();
        let node = add_node(&mut model, "A");
        let state = model
            .add(PathwayElement::new(ElementKind::State(State::new(node.clone(), "P"))))
            .unwrap();
        let line = model
            .add(PathwayElement::new(ElementKind::Interaction(LineElement::new())))
            .unwrap();
        let start = model
            .add(PathwayElement::new(ElementKind::LinePoint(LinePoint::new(line.clone(), 0.0, 0.0))))
            .unwrap();
        model
            .add(PathwayElement::new(ElementKind::LinePoint(LinePoint::new(line.clone(), 9.0, 9.0))))
            .unwrap();
        model.set_element_ref(&start, Some(&node)).unwrap();

        model.remove(&node).unwrap();
        assert!(model.find_by_id(state.as_str()).is_none());
        let start = model.find_by_id(start.as_str()).unwrap();
        assert_eq!(None, start.as_point().unwrap().element_ref());

        model.remove(&line).unwrap();
        assert_eq!(0, model.elements_of_type(ObjectType::LinePoint).count());
        assert!(model.is_empty());
    }

    #[test]
    fn test_removing_last_member_keeps_group() {
        let mut model = PathwayModel::new();
        let group = model
            .add(PathwayElement::new(ElementKind::Group(Group::new(GroupType::GROUP))))
            .unwrap();
        let member = model
            .add(PathwayElement::new(ElementKind::DataNode(DataNode::new("A", DataNodeType::PROTEIN))).with_group(group.clone()))
            .unwrap();

        model.remove(&member).unwrap();
        let g = model.find_by_id(group.as_str()).unwrap();
        assert!(g.as_group().unwrap().members().is_empty());

        assert_eq!(vec![group.clone()], model.prune_empty_groups());
        assert!(model.find_by_id(group.as_str()).is_none());
    }

    #[test]
    fn test_removing_group_releases_members() {
        let mut model = PathwayModel::new();
        let group = model
            .add(PathwayElement::new(ElementKind::Group(Group::new(GroupType::COMPLEX))))
            .unwrap();
        let member = model
            .add(PathwayElement::new(ElementKind::DataNode(DataNode::new("A", DataNodeType::PROTEIN))).with_group(group.clone()))
            .unwrap();
        let alias = add_node(&mut model, "alias");
        model.set_alias_ref(&alias, Some(&group)).unwrap();

        model.remove(&group).unwrap();
        assert_eq!(None, model.find_by_id(member.as_str()).unwrap().group_ref());
        let alias = model.find_by_id(alias.as_str()).unwrap();
        assert_eq!(None, alias.as_data_node().unwrap().alias_ref());
    }

    #[test]
    fn test_deleted_fires_before_cascade_events() {
        let mut model = PathwayModel::new();
        let node = add_node(&mut model, "A");
        let state = model
            .add(PathwayElement::new(ElementKind::State(State::new(node.clone(), "P"))))
            .unwrap();
        let log = Rc::new(RefCell::new(vec![]));
        {
            let log = log.clone();
            model.subscribe(move |event| {
                log.borrow_mut()
                    .push((event.kind, event.element.clone().unwrap()));
            });
        }
        model.remove(&node).unwrap();
        assert_eq!(
            vec![(EventKind::Deleted, node), (EventKind::Deleted, state)],
            *log.borrow()
        );
    }

    #[test]
    fn test_removing_value_object_drops_its_refs() {
        let mut model = PathwayModel::new();
        let a = add_node(&mut model, "A");
        let b = add_node(&mut model, "B");
        let annotation = model
            .add_or_reuse_annotation(AnnotationContent::new("x", AnnotationType::Undefined))
            .unwrap();
        model.link_annotation_ref(&a, &annotation).unwrap();
        model.link_annotation_ref(&b, &annotation).unwrap();
        model.link_annotation_ref(RefSource::Pathway, &annotation).unwrap();

        model.remove(&annotation).unwrap();
        assert_eq!(0, model.ref_count());
        assert!(model.refs_of(&RefSource::from(&a)).is_empty());
        assert!(model.pathway().refs().is_empty());
    }
}
