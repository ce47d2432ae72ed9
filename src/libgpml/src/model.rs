// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::common::Result;
use crate::datamodel::{
    ElementKind, Lifecycle, ModelId, ObjectType, Pathway, PathwayElement, Property, PropertyTag,
};
use crate::events::{EventKind, EventQueue, ListenerId, PathwayEvent};
use crate::ids::{ElementId, IdAllocator};
use crate::model_err;
use crate::refs::{RefId, RefRecord};
use crate::types::TypeRegistry;

/// The container that owns every element of one pathway diagram.
///
/// All mutation goes through the model: it checks identifiers and link
/// targets, keeps the reverse lists (group members, data node states, line
/// points and anchors, value object back refs) in step and queues change
/// events, which are handed to listeners once an operation has finished
/// updating its bookkeeping.
pub struct PathwayModel {
    id: ModelId,
    pub(crate) pathway: Pathway,
    pub(crate) elements: HashMap<ElementId, PathwayElement>,
    by_type: HashMap<ObjectType, Vec<ElementId>>,
    ids: IdAllocator,
    pub(crate) refs: HashMap<RefId, RefRecord>,
    pub(crate) next_ref: u64,
    // ids of removed elements; grows until `forget_terminated` or until an
    // id is added again
    terminated: HashSet<ElementId>,
    types: TypeRegistry,
    pub(crate) events: EventQueue,
}

impl std::fmt::Debug for PathwayModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathwayModel")
            .field("id", &self.id)
            .field("pathway", &self.pathway)
            .field("elements", &self.elements.len())
            .finish_non_exhaustive()
    }
}

impl PathwayModel {
    pub fn new() -> Self {
        Self::with_allocator(IdAllocator::new())
    }

    /// A model whose generated ids come from the given RNG seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_allocator(IdAllocator::with_seed(seed))
    }

    fn with_allocator(ids: IdAllocator) -> Self {
        PathwayModel {
            id: ModelId::next(),
            pathway: Pathway::default(),
            elements: HashMap::new(),
            by_type: HashMap::new(),
            ids,
            refs: HashMap::new(),
            next_ref: 0,
            terminated: HashSet::new(),
            types: TypeRegistry::new(),
            events: EventQueue::default(),
        }
    }

    pub fn model_id(&self) -> ModelId {
        self.id
    }

    pub fn pathway(&self) -> &Pathway {
        &self.pathway
    }

    /// Edit pathway metadata in place.  Fires one `AllPropertiesChanged`
    /// for the pathway if anything changed.
    pub fn update_pathway<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut Pathway),
    {
        let before = self.pathway.clone();
        f(&mut self.pathway);
        // refs are managed through link/unlink only
        self.pathway.refs = before.refs.clone();
        let changed = self.pathway != before;
        if changed {
            self.events
                .push(PathwayEvent::pathway(EventKind::AllPropertiesChanged));
            self.events.flush();
        }
        changed
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&PathwayElement> {
        self.elements.get(id)
    }

    /// True once an element with this id has been removed, until the id is
    /// handed out again.
    pub fn is_terminated(&self, id: &str) -> bool {
        self.terminated.contains(id)
    }

    /// Live elements of one type in the order they were added.
    pub fn elements_of_type(
        &self,
        object_type: ObjectType,
    ) -> impl Iterator<Item = &PathwayElement> + '_ {
        self.element_ids_of_type(object_type)
            .iter()
            .filter_map(|id| self.elements.get(id))
    }

    pub fn element_ids_of_type(&self, object_type: ObjectType) -> &[ElementId] {
        self.by_type
            .get(&object_type)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn live_element(&self, id: &ElementId) -> Result<&PathwayElement> {
        match self.elements.get(id) {
            Some(element) => Ok(element),
            None if self.terminated.contains(id) => {
                model_err!(InvalidReference, format!("{id} has been removed"))
            }
            None => model_err!(InvalidReference, format!("no element {id}")),
        }
    }

    /// Like `live_element`, but reports a removed element as used after
    /// termination: this is the check for mutating calls.
    fn mutable_element(&self, id: &ElementId) -> Result<&PathwayElement> {
        match self.elements.get(id) {
            Some(element) => Ok(element),
            None if self.terminated.contains(id) => model_err!(UseAfterTerminate, id.to_string()),
            None => model_err!(InvalidReference, format!("no element {id}")),
        }
    }

    fn expect_type(&self, id: &ElementId, check: fn(&ObjectType) -> bool, role: &str) -> Result<()> {
        let object_type = self.live_element(id)?.object_type();
        if check(&object_type) {
            Ok(())
        } else {
            model_err!(
                InvalidReference,
                format!("{object_type} {id} cannot be used as {role}")
            )
        }
    }

    /// Attach an element to this model and return its id.
    ///
    /// An element without an id gets a fresh one; an explicit id must not
    /// be in use.  Value objects equal to one already present are not added
    /// again: the existing id is returned instead.
    pub fn add(&mut self, mut element: PathwayElement) -> Result<ElementId> {
        match element.lifecycle {
            Lifecycle::Attached(_) => {
                return model_err!(AlreadyAttached, element.id.to_string());
            }
            Lifecycle::Terminated => {
                return model_err!(UseAfterTerminate, element.id.to_string());
            }
            Lifecycle::Detached => {}
        }

        if let Some(existing) = self.find_equivalent(&element.kind) {
            trace!(element = %existing, "reusing equivalent value object");
            return Ok(existing);
        }

        if !element.id.is_empty() && !self.ids.validate(&element.id) {
            return model_err!(DuplicateIdentifier, element.id.to_string());
        }
        self.check_links(&element)?;

        // links are rebuilt as the owning elements are added
        element.refs.clear();
        element.back_refs.clear();
        match &mut element.kind {
            ElementKind::DataNode(node) => node.states.clear(),
            ElementKind::Interaction(line) | ElementKind::GraphicalLine(line) => {
                line.points.clear();
                line.anchors.clear();
            }
            ElementKind::Group(group) => group.members.clear(),
            _ => {}
        }

        let id = if element.id.is_empty() {
            self.ids.allocate()
        } else {
            self.ids.register(&element.id)?;
            element.id.clone()
        };
        self.terminated.remove(&id);
        element.id = id.clone();
        element.lifecycle = Lifecycle::Attached(self.id);

        let object_type = element.object_type();
        let group = element.group_ref.clone();
        let parent = match &element.kind {
            ElementKind::State(state) => Some(state.data_node.clone()),
            ElementKind::LinePoint(point) => Some(point.line.clone()),
            ElementKind::Anchor(anchor) => Some(anchor.line.clone()),
            _ => None,
        };

        self.elements.insert(id.clone(), element);
        self.by_type.entry(object_type).or_default().push(id.clone());

        if let Some(parent) = parent
            && let Some(parent) = self.elements.get_mut(&parent)
        {
            match (&mut parent.kind, object_type) {
                (ElementKind::DataNode(node), ObjectType::State) => node.states.push(id.clone()),
                (ElementKind::Interaction(line), ObjectType::LinePoint)
                | (ElementKind::GraphicalLine(line), ObjectType::LinePoint) => {
                    line.points.push(id.clone())
                }
                (ElementKind::Interaction(line), ObjectType::Anchor)
                | (ElementKind::GraphicalLine(line), ObjectType::Anchor) => {
                    line.anchors.push(id.clone())
                }
                _ => {}
            }
        }

        self.events
            .push(PathwayEvent::element(EventKind::Added, object_type, &id));
        if let Some(group) = group {
            if let Some(group) = self.elements.get_mut(&group).and_then(|g| g.group_mut()) {
                group.members.push(id.clone());
            }
            self.refresh_group_bounds(&group);
        } else if matches!(object_type, ObjectType::LinePoint) {
            self.refresh_enclosing_groups(&id);
        }
        self.events.flush();

        Ok(id)
    }

    /// Check the links an element carries into the model before it is
    /// attached.
    fn check_links(&self, element: &PathwayElement) -> Result<()> {
        if let Some(group) = &element.group_ref {
            if !element.object_type().is_groupable() {
                return model_err!(
                    InvalidReference,
                    format!("{} cannot belong to a group", element.object_type())
                );
            }
            self.expect_type(group, |t| *t == ObjectType::Group, "a group")?;
        }
        match &element.kind {
            ElementKind::DataNode(node) => {
                if let Some(alias) = &node.alias_ref {
                    self.expect_type(alias, |t| *t == ObjectType::Group, "an alias target")?;
                }
            }
            ElementKind::State(state) => {
                self.expect_type(&state.data_node, |t| *t == ObjectType::DataNode, "a state owner")?;
            }
            ElementKind::LinePoint(point) => {
                self.expect_type(&point.line, ObjectType::is_line, "a line")?;
                if let Some(target) = &point.element_ref {
                    self.expect_type(target, ObjectType::is_linkable, "a point target")?;
                }
            }
            ElementKind::Anchor(anchor) => {
                self.expect_type(&anchor.line, ObjectType::is_line, "a line")?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Remove an element and everything that only exists because of it.
    ///
    /// Returns the removed element, marked terminated.  Removing an element
    /// that was already removed is a no-op returning `None`.
    pub fn remove(&mut self, id: &ElementId) -> Result<Option<PathwayElement>> {
        if self.terminated.contains(id) {
            return Ok(None);
        }
        self.live_element(id)?;
        let removed = self.terminate(id);
        self.events.flush();
        Ok(removed)
    }

    /// Set one property.  A value equal to the current one changes nothing
    /// and fires nothing; otherwise one `PropertyChanged` fires, plus
    /// `Resized` for geometry changes.
    pub fn set_property(&mut self, id: &ElementId, property: Property) -> Result<bool> {
        match property {
            Property::GroupRef(group) => return self.set_group(id, group.as_ref()),
            Property::ElementRef(target) => return self.set_element_ref(id, target.as_ref()),
            Property::AliasRef(group) => return self.set_alias_ref(id, group.as_ref()),
            _ => {}
        }

        let element = self.mutable_element(id)?;
        let object_type = element.object_type();
        let tag = property.tag();
        if object_type == ObjectType::Group
            && matches!(
                tag,
                PropertyTag::CenterX | PropertyTag::CenterY | PropertyTag::Width | PropertyTag::Height
            )
        {
            return model_err!(
                UnsupportedProperty,
                format!("group bounds are derived from members, cannot set {tag:?}")
            );
        }

        let changed = match self.elements.get_mut(id) {
            Some(element) => element.set(property)?,
            None => false,
        };
        if !changed {
            return Ok(false);
        }

        self.events.push(PathwayEvent::element(
            EventKind::PropertyChanged(tag),
            object_type,
            id,
        ));
        if tag.is_geometry() {
            self.events
                .push(PathwayEvent::element(EventKind::Resized, object_type, id));
            self.refresh_enclosing_groups(id);
        }
        self.events.flush();

        Ok(true)
    }

    /// Copy every plain property of `source` onto the element `id`, which
    /// must be of the same type.  Links and derived group bounds are left
    /// alone.  Fires a single `AllPropertiesChanged` if anything changed.
    pub fn copy_properties(&mut self, id: &ElementId, source: &PathwayElement) -> Result<bool> {
        let target_type = self.mutable_element(id)?.object_type();
        if target_type != source.object_type() || target_type.is_value_object() {
            return model_err!(
                UnsupportedProperty,
                format!("cannot copy {} properties onto {target_type}", source.object_type())
            );
        }

        let mut changed = false;
        let mut resized = false;
        if let Some(element) = self.elements.get_mut(id) {
            for tag in PropertyTag::ALL {
                if tag.is_link() || (target_type == ObjectType::Group && tag.is_geometry()) {
                    continue;
                }
                if let Some(property) = source.get(tag)
                    && element.set(property)?
                {
                    changed = true;
                    resized |= tag.is_geometry();
                }
            }
        }

        if changed {
            self.events.push(PathwayEvent::element(
                EventKind::AllPropertiesChanged,
                target_type,
                id,
            ));
            if resized {
                self.events
                    .push(PathwayEvent::element(EventKind::Resized, target_type, id));
                self.refresh_enclosing_groups(id);
            }
            self.events.flush();
        }
        Ok(changed)
    }

    /// Move a groupable element into `group`, or out of any group for
    /// `None`.  A group left without members is kept until the next read or
    /// write prunes it.
    pub fn set_group(&mut self, id: &ElementId, group: Option<&ElementId>) -> Result<bool> {
        let element = self.mutable_element(id)?;
        let object_type = element.object_type();
        if !object_type.is_groupable() {
            return model_err!(
                UnsupportedProperty,
                format!("{object_type} cannot belong to a group")
            );
        }
        let old = element.group_ref.clone();
        if old.as_ref() == group {
            return Ok(false);
        }
        if let Some(group) = group {
            self.expect_type(group, |t| *t == ObjectType::Group, "a group")?;
            if self.group_chain(group).any(|ancestor| ancestor == *id) {
                return model_err!(
                    InvalidReference,
                    format!("{group} is nested inside {id}")
                );
            }
        }

        if let Some(old) = &old {
            self.leave_group(id, old);
        }
        if let Some(element) = self.elements.get_mut(id) {
            element.group_ref = group.cloned();
        }
        if let Some(group) = group {
            if let Some(g) = self.elements.get_mut(group).and_then(|g| g.group_mut()) {
                g.members.push(id.clone());
            }
            self.refresh_group_bounds(group);
        }

        self.events.push(PathwayEvent::element(
            EventKind::PropertyChanged(PropertyTag::GroupRef),
            object_type,
            id,
        ));
        self.events.flush();
        Ok(true)
    }

    /// Drop `id` from the member list of `group` and refresh the group's
    /// bounds.  Does not touch the member's own group ref.
    pub(crate) fn leave_group(&mut self, id: &ElementId, group: &ElementId) {
        let emptied = match self.elements.get_mut(group).and_then(|g| g.group_mut()) {
            Some(g) => {
                g.members.retain(|member| member != id);
                g.members.is_empty()
            }
            None => return,
        };
        if emptied {
            debug!(group = %group, "group left without members");
        } else {
            self.refresh_group_bounds(group);
        }
    }

    /// The groups enclosing `group`, innermost first, starting with `group`
    /// itself.
    pub(crate) fn group_chain<'a>(
        &'a self,
        group: &ElementId,
    ) -> impl Iterator<Item = ElementId> + 'a {
        let mut next = Some(group.clone());
        let mut seen = HashSet::new();
        std::iter::from_fn(move || {
            let current = next.take()?;
            if !seen.insert(current.clone()) {
                return None;
            }
            next = self
                .elements
                .get(&current)
                .and_then(|element| element.group_ref.clone());
            Some(current)
        })
    }

    /// Attach a line point to an element, or detach it with `None`.
    pub fn set_element_ref(&mut self, point: &ElementId, target: Option<&ElementId>) -> Result<bool> {
        let element = self.mutable_element(point)?;
        if element.object_type() != ObjectType::LinePoint {
            return model_err!(
                UnsupportedProperty,
                format!("{} has no element ref", element.object_type())
            );
        }
        if let Some(target) = target {
            self.expect_type(target, ObjectType::is_linkable, "a point target")?;
        }
        self.set_link(point, Property::ElementRef(target.cloned()))
    }

    /// Make a data node stand in for a group, or clear the alias with
    /// `None`.
    pub fn set_alias_ref(&mut self, node: &ElementId, group: Option<&ElementId>) -> Result<bool> {
        let element = self.mutable_element(node)?;
        if element.object_type() != ObjectType::DataNode {
            return model_err!(
                UnsupportedProperty,
                format!("{} has no alias ref", element.object_type())
            );
        }
        if let Some(group) = group {
            self.expect_type(group, |t| *t == ObjectType::Group, "an alias target")?;
        }
        self.set_link(node, Property::AliasRef(group.cloned()))
    }

    fn set_link(&mut self, id: &ElementId, property: Property) -> Result<bool> {
        let tag = property.tag();
        let (changed, object_type) = match self.elements.get_mut(id) {
            Some(element) => (element.set(property)?, element.object_type()),
            None => return Ok(false),
        };
        if changed {
            self.events.push(PathwayEvent::element(
                EventKind::PropertyChanged(tag),
                object_type,
                id,
            ));
            self.events.flush();
        }
        Ok(changed)
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&PathwayEvent) + 'static,
    {
        self.events.subscribe(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Remove every group without members, repeating until none is left:
    /// removing an empty group can empty its own parent.  Returns the ids of
    /// the removed groups.
    pub fn prune_empty_groups(&mut self) -> Vec<ElementId> {
        let mut pruned = vec![];
        loop {
            let empty: Vec<ElementId> = self
                .elements_of_type(ObjectType::Group)
                .filter(|element| element.as_group().is_some_and(|g| g.members.is_empty()))
                .map(|element| element.id.clone())
                .collect();
            if empty.is_empty() {
                break;
            }
            for id in empty {
                debug!(group = %id, "pruning empty group");
                self.terminate(&id);
                pruned.push(id);
            }
        }
        self.events.flush();
        pruned
    }

    /// Drop the record of removed ids.  Afterwards mutating calls on those
    /// ids report `InvalidReference` instead of `UseAfterTerminate`; the
    /// removed elements themselves stay terminated and cannot be re-added.
    pub fn forget_terminated(&mut self) -> usize {
        let count = self.terminated.len();
        self.terminated.clear();
        count
    }

    /// A generated id that is not live and that `taken` does not claim.
    /// Nothing is reserved: the caller adds an element under it next.
    pub(crate) fn unused_id(&mut self, taken: impl Fn(&str) -> bool) -> ElementId {
        loop {
            let id = self.ids.allocate();
            self.ids.release(&id);
            if !taken(id.as_str()) {
                return id;
            }
        }
    }

    // the remaining helpers are used by the lifecycle cascade

    pub(crate) fn forget(&mut self, id: &ElementId, object_type: ObjectType) -> Option<PathwayElement> {
        let mut element = self.elements.remove(id)?;
        if let Some(ids) = self.by_type.get_mut(&object_type) {
            ids.retain(|other| other != id);
        }
        self.ids.release(id);
        self.terminated.insert(id.clone());
        element.lifecycle = Lifecycle::Terminated;
        Some(element)
    }
}

impl Default for PathwayModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorCode;
    use crate::datamodel::{DataNode, Group, Label, LineElement, LinePoint, Rect, State};
    use crate::types::{DataNodeType, GroupType};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn node(label: &str) -> PathwayElement {
        let mut node = DataNode::new(label, DataNodeType::PROTEIN);
        node.rect = Rect::new(100.0, 100.0, 80.0, 20.0);
        PathwayElement::new(ElementKind::DataNode(node))
    }

    #[test]
    fn test_find_by_id_after_add() {
        let mut model = PathwayModel::new();
        let a = model.add(node("A")).unwrap();
        let b = model.add(node("B").with_id("b")).unwrap();
        assert_eq!(ElementId::from("b"), b);
        assert_ne!(a, b);

        let found = model.find_by_id(a.as_str()).unwrap();
        assert_eq!(&a, found.id());
        assert_eq!(Lifecycle::Attached(model.model_id()), found.lifecycle());
        assert_eq!(Some("A"), found.text_label());

        let ids: Vec<_> = model
            .elements_of_type(ObjectType::DataNode)
            .map(|e| e.id().clone())
            .collect();
        assert_eq!(vec![a, b], ids);
    }

    #[test]
    fn test_add_rejects_duplicates_and_attached() {
        let mut model = PathwayModel::new();
        model.add(node("A").with_id("a")).unwrap();
        let err = model.add(node("B").with_id("a")).unwrap_err();
        assert_eq!(ErrorCode::DuplicateIdentifier, err.code);

        let attached = model.find_by_id("a").unwrap().clone();
        let mut other = PathwayModel::new();
        let err = other.add(attached.clone()).unwrap_err();
        assert_eq!(ErrorCode::AlreadyAttached, err.code);

        let id = other.add(attached.detached_copy()).unwrap();
        assert!(other.find_by_id(id.as_str()).is_some());
    }

    #[test]
    fn test_add_wires_parents() {
        let mut model = PathwayModel::new();
        let n = model.add(node("A")).unwrap();
        let s = model
            .add(PathwayElement::new(ElementKind::State(State::new(n.clone(), "P"))))
            .unwrap();
        assert_eq!(&[s], model.find_by_id(n.as_str()).unwrap().as_data_node().unwrap().states());

        let line = model
            .add(PathwayElement::new(ElementKind::Interaction(LineElement::new())))
            .unwrap();
        let p1 = model
            .add(PathwayElement::new(ElementKind::LinePoint(LinePoint::new(line.clone(), 0.0, 0.0))))
            .unwrap();
        let p2 = model
            .add(PathwayElement::new(ElementKind::LinePoint(LinePoint::new(line.clone(), 5.0, 5.0))))
            .unwrap();
        assert_eq!(&[p1, p2], model.find_by_id(line.as_str()).unwrap().as_line().unwrap().points());

        let err = model
            .add(PathwayElement::new(ElementKind::State(State::new(line, "bad"))))
            .unwrap_err();
        assert_eq!(ErrorCode::InvalidReference, err.code);
    }

    #[test]
    fn test_set_property_fires_only_on_change() {
        let mut model = PathwayModel::new();
        let id = model.add(node("A")).unwrap();
        let seen = Rc::new(RefCell::new(vec![]));
        {
            let seen = seen.clone();
            model.subscribe(move |event| seen.borrow_mut().push(event.kind));
        }

        assert!(!model
            .set_property(&id, Property::TextLabel("A".to_owned()))
            .unwrap());
        assert!(seen.borrow().is_empty());

        assert!(model.set_property(&id, Property::CenterX(10.0)).unwrap());
        assert_eq!(
            vec![
                EventKind::PropertyChanged(PropertyTag::CenterX),
                EventKind::Resized
            ],
            *seen.borrow()
        );
    }

    #[test]
    fn test_group_bounds_follow_members() {
        let mut model = PathwayModel::new();
        let group = model
            .add(PathwayElement::new(ElementKind::Group(Group::new(GroupType::GROUP))))
            .unwrap();
        let a = model.add(node("A").with_group(group.clone())).unwrap();
        let rect = *model.find_by_id(group.as_str()).unwrap().rect().unwrap();
        assert!(rect.approx_eq(&Rect::new(100.0, 100.0, 96.0, 36.0)));

        let resized = Rc::new(RefCell::new(vec![]));
        {
            let resized = resized.clone();
            model.subscribe(move |event| {
                if event.kind == EventKind::Resized {
                    resized.borrow_mut().push(event.element.clone().unwrap());
                }
            });
        }
        model.set_property(&a, Property::CenterX(200.0)).unwrap();
        assert_eq!(vec![a.clone(), group.clone()], *resized.borrow());
        let rect = *model.find_by_id(group.as_str()).unwrap().rect().unwrap();
        assert!(rect.approx_eq(&Rect::new(200.0, 100.0, 96.0, 36.0)));

        let err = model.set_property(&group, Property::Width(5.0)).unwrap_err();
        assert_eq!(ErrorCode::UnsupportedProperty, err.code);
    }

    #[test]
    fn test_set_group_rejects_cycles() {
        let mut model = PathwayModel::new();
        let outer = model
            .add(PathwayElement::new(ElementKind::Group(Group::new(GroupType::GROUP))))
            .unwrap();
        let inner = model
            .add(
                PathwayElement::new(ElementKind::Group(Group::new(GroupType::COMPLEX)))
                    .with_group(outer.clone()),
            )
            .unwrap();
        let err = model.set_group(&outer, Some(&inner)).unwrap_err();
        assert_eq!(ErrorCode::InvalidReference, err.code);

        let label = model
            .add(PathwayElement::new(ElementKind::Label(Label::new("note"))))
            .unwrap();
        assert!(model.set_group(&label, Some(&inner)).unwrap());
        assert!(!model.set_group(&label, Some(&inner)).unwrap());
        assert!(model.set_group(&label, None).unwrap());
        assert!(model.find_by_id(inner.as_str()).unwrap().as_group().unwrap().members().is_empty());
    }

    #[test]
    fn test_copy_properties() {
        let mut model = PathwayModel::new();
        let a = model.add(node("A")).unwrap();
        let mut template = node("B");
        template.comments.push(crate::datamodel::Comment {
            source: None,
            text: "copied".to_owned(),
        });

        let count = Rc::new(RefCell::new(0));
        {
            let count = count.clone();
            model.subscribe(move |event| {
                if event.kind == EventKind::AllPropertiesChanged {
                    *count.borrow_mut() += 1;
                }
            });
        }
        assert!(model.copy_properties(&a, &template).unwrap());
        assert!(!model.copy_properties(&a, &template).unwrap());
        assert_eq!(1, *count.borrow());
        let copied = model.find_by_id(a.as_str()).unwrap();
        assert_eq!(Some("B"), copied.text_label());
        assert_eq!(1, copied.comments.len());

        let label = PathwayElement::new(ElementKind::Label(Label::new("x")));
        let err = model.copy_properties(&a, &label).unwrap_err();
        assert_eq!(ErrorCode::UnsupportedProperty, err.code);
    }

    #[test]
    fn test_seeded_ids_repeat() {
        let mut a = PathwayModel::with_seed(7);
        let mut b = PathwayModel::with_seed(7);
        for label in ["A", "B", "C"] {
            assert_eq!(a.add(node(label)).unwrap(), b.add(node(label)).unwrap());
        }
        assert_ne!(a.model_id(), b.model_id());

        let mut model = PathwayModel::new();
        let id = model.add(node("A")).unwrap();
        assert!(id.as_str().starts_with("id"));
    }

    #[test]
    fn test_forget_terminated() {
        let mut model = PathwayModel::new();
        let a = model.add(node("A")).unwrap();
        let b = model.add(node("B")).unwrap();
        model.remove(&a).unwrap();
        model.remove(&b).unwrap();
        assert!(model.is_terminated(a.as_str()));

        assert_eq!(2, model.forget_terminated());
        assert_eq!(0, model.forget_terminated());
        assert!(!model.is_terminated(a.as_str()));
        let err = model
            .set_property(&a, Property::TextLabel("A2".to_owned()))
            .unwrap_err();
        assert_eq!(ErrorCode::InvalidReference, err.code);

        // the id itself is free again
        let again = model.add(node("A").with_id(a.clone())).unwrap();
        assert_eq!(a, again);
    }

    #[test]
    fn test_update_pathway() {
        let mut model = PathwayModel::new();
        assert!(model.update_pathway(|p| p.title = "Apoptosis".to_owned()));
        assert!(!model.update_pathway(|p| p.title = "Apoptosis".to_owned()));
        assert_eq!("Apoptosis", model.pathway().title);
    }
}
