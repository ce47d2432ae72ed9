// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Shared annotation, citation and evidence records and the refs that join
//! them to the elements (or the pathway) citing them.
//!
//! Value objects are deduplicated by content: adding one equal to a record
//! already in the model hands back the existing id.  Each ref is owned by
//! its source's ref list; the value object only keeps a back list of ref
//! ids.  When unlinking leaves a value object with an empty back list, it is
//! removed from the model.

use std::fmt;

use tracing::debug;

use crate::common::Result;
use crate::datamodel::{
    AnnotationContent, CitationContent, ElementKind, EvidenceContent, ObjectType,
    PathwayElement,
};
use crate::ids::ElementId;
use crate::model::PathwayModel;
use crate::model_err;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefId(pub(crate) u64);

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ref{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RefKind {
    Annotation,
    Citation,
    Evidence,
}

impl RefKind {
    pub fn target_type(&self) -> ObjectType {
        match self {
            RefKind::Annotation => ObjectType::Annotation,
            RefKind::Citation => ObjectType::Citation,
            RefKind::Evidence => ObjectType::Evidence,
        }
    }
}

/// Who owns a ref.  Citation and evidence refs may hang off an annotation
/// ref, qualifying that annotation for one particular source.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RefSource {
    Pathway,
    Element(ElementId),
    Ref(RefId),
}

impl From<ElementId> for RefSource {
    fn from(id: ElementId) -> Self {
        RefSource::Element(id)
    }
}

impl From<&ElementId> for RefSource {
    fn from(id: &ElementId) -> Self {
        RefSource::Element(id.clone())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RefRecord {
    pub kind: RefKind,
    pub source: RefSource,
    pub target: ElementId,
    pub(crate) refs: Vec<RefId>,
}

impl RefRecord {
    /// Citation and evidence refs nested under an annotation ref.
    pub fn refs(&self) -> &[RefId] {
        &self.refs
    }
}

impl PathwayModel {
    /// Return the id of an annotation with this content, adding one if the
    /// model has none.  Existing records are never modified.
    pub fn add_or_reuse_annotation(&mut self, content: AnnotationContent) -> Result<ElementId> {
        self.add(PathwayElement::new(ElementKind::Annotation(content)))
    }

    pub fn add_or_reuse_citation(&mut self, content: CitationContent) -> Result<ElementId> {
        self.add(PathwayElement::new(ElementKind::Citation(content)))
    }

    pub fn add_or_reuse_evidence(&mut self, content: EvidenceContent) -> Result<ElementId> {
        self.add(PathwayElement::new(ElementKind::Evidence(content)))
    }

    /// Find a live value object whose content equals `kind`.
    pub(crate) fn find_equivalent(&self, kind: &ElementKind) -> Option<ElementId> {
        let object_type = kind.object_type();
        if !object_type.is_value_object() {
            return None;
        }
        self.element_ids_of_type(object_type)
            .iter()
            .find(|id| {
                self.elements
                    .get(*id)
                    .is_some_and(|element| element.kind == *kind)
            })
            .cloned()
    }

    pub fn link_annotation_ref(
        &mut self,
        source: impl Into<RefSource>,
        annotation: &ElementId,
    ) -> Result<RefId> {
        self.link_ref(RefKind::Annotation, source.into(), annotation)
    }

    pub fn link_citation_ref(
        &mut self,
        source: impl Into<RefSource>,
        citation: &ElementId,
    ) -> Result<RefId> {
        self.link_ref(RefKind::Citation, source.into(), citation)
    }

    pub fn link_evidence_ref(
        &mut self,
        source: impl Into<RefSource>,
        evidence: &ElementId,
    ) -> Result<RefId> {
        self.link_ref(RefKind::Evidence, source.into(), evidence)
    }

    fn link_ref(&mut self, kind: RefKind, source: RefSource, target: &ElementId) -> Result<RefId> {
        self.check_ref_source(kind, &source)?;

        let target_type = self.live_element(target)?.object_type();
        if target_type != kind.target_type() {
            return model_err!(
                InvalidReference,
                format!("{target} is a {target_type}, not a {}", kind.target_type())
            );
        }

        self.next_ref += 1;
        let id = RefId(self.next_ref);
        match &source {
            RefSource::Pathway => self.pathway.refs.push(id),
            RefSource::Element(element) => {
                if let Some(element) = self.elements.get_mut(element) {
                    element.refs.push(id);
                }
            }
            RefSource::Ref(parent) => {
                if let Some(parent) = self.refs.get_mut(parent) {
                    parent.refs.push(id);
                }
            }
        }
        if let Some(value) = self.elements.get_mut(target) {
            value.back_refs.push(id);
        }
        self.refs.insert(
            id,
            RefRecord {
                kind,
                source,
                target: target.clone(),
                refs: vec![],
            },
        );

        Ok(id)
    }

    fn check_ref_source(&self, kind: RefKind, source: &RefSource) -> Result<()> {
        match source {
            RefSource::Pathway => Ok(()),
            RefSource::Element(id) => {
                let object_type = self.live_element(id)?.object_type();
                if object_type.is_referencing() {
                    Ok(())
                } else {
                    model_err!(InvalidReference, format!("{object_type} {id} cannot own refs"))
                }
            }
            RefSource::Ref(parent) => match self.refs.get(parent) {
                Some(record) if record.kind == RefKind::Annotation && kind != RefKind::Annotation => {
                    Ok(())
                }
                Some(_) => model_err!(
                    InvalidReference,
                    format!("{parent} cannot own a {kind:?} ref")
                ),
                None => model_err!(InvalidReference, format!("unknown ref {parent}")),
            },
        }
    }

    /// Remove one ref from both its endpoints.  Refs nested under it go
    /// first, and any value object left without refs is removed.
    pub fn unlink_ref(&mut self, id: RefId) -> Result<()> {
        if !self.refs.contains_key(&id) {
            return model_err!(InvalidReference, format!("unknown ref {id}"));
        }
        if let Some(orphan) = self.detach_ref(id) {
            self.remove_orphan(&orphan);
        }
        self.events.flush();
        Ok(())
    }

    /// Unlink every ref owned by `source`, newest first.
    pub fn unlink_all_refs(&mut self, source: impl Into<RefSource>) -> Result<()> {
        let source = source.into();
        if let RefSource::Element(ref id) = source {
            self.live_element(id)?;
        }
        self.unlink_refs_of(&source);
        self.events.flush();
        Ok(())
    }

    pub(crate) fn unlink_refs_of(&mut self, source: &RefSource) {
        let owned = self.refs_of(source).to_vec();
        for id in owned.into_iter().rev() {
            if let Some(orphan) = self.detach_ref(id) {
                self.remove_orphan(&orphan);
            }
        }
    }

    /// Drop a ref record and its entries in the source's ref list and the
    /// target's back list.  Returns the target if that left it unreferenced;
    /// the caller decides whether to remove it.
    pub(crate) fn detach_ref(&mut self, id: RefId) -> Option<ElementId> {
        let record = self.refs.remove(&id)?;

        for nested in record.refs.iter().rev() {
            if let Some(orphan) = self.detach_ref(*nested) {
                self.remove_orphan(&orphan);
            }
        }

        match &record.source {
            RefSource::Pathway => self.pathway.refs.retain(|r| *r != id),
            RefSource::Element(element) => {
                if let Some(element) = self.elements.get_mut(element) {
                    element.refs.retain(|r| *r != id);
                }
            }
            RefSource::Ref(parent) => {
                if let Some(parent) = self.refs.get_mut(parent) {
                    parent.refs.retain(|r| *r != id);
                }
            }
        }

        let target = self.elements.get_mut(&record.target)?;
        target.back_refs.retain(|r| *r != id);
        if target.back_refs.is_empty() {
            Some(record.target)
        } else {
            None
        }
    }

    fn remove_orphan(&mut self, id: &ElementId) {
        debug!(element = %id, "removing unreferenced value object");
        self.terminate(id);
    }

    /// Refs owned by `source`, oldest first.
    pub fn refs_of(&self, source: &RefSource) -> &[RefId] {
        match source {
            RefSource::Pathway => &self.pathway.refs,
            RefSource::Element(id) => self
                .elements
                .get(id)
                .map(|element| element.refs.as_slice())
                .unwrap_or(&[]),
            RefSource::Ref(id) => self
                .refs
                .get(id)
                .map(|record| record.refs.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// Refs pointing at a value object.
    pub fn back_refs(&self, value: &ElementId) -> &[RefId] {
        self.elements
            .get(value)
            .map(|element| element.back_refs.as_slice())
            .unwrap_or(&[])
    }

    pub fn ref_record(&self, id: RefId) -> Option<&RefRecord> {
        self.refs.get(&id)
    }

    pub fn ref_count(&self) -> usize {
        self.refs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorCode;
    use crate::datamodel::{DataNode, Xref};
    use crate::types::{AnnotationType, DataNodeType};

    fn model_with_node() -> (PathwayModel, ElementId) {
        let mut model = PathwayModel::new();
        let node = model
            .add(PathwayElement::new(ElementKind::DataNode(DataNode::new(
                "TP53",
                DataNodeType::GENE_PRODUCT,
            ))))
            .unwrap();
        (model, node)
    }

    fn apoptosis() -> AnnotationContent {
        let mut content = AnnotationContent::new("apoptotic process", AnnotationType::Ontology);
        content.xref = Some(Xref::new("GO:0006915", "Gene Ontology"));
        content
    }

    #[test]
    fn test_dedup_and_ref_counting() {
        let (mut model, node) = model_with_node();

        let a = model.add_or_reuse_annotation(apoptosis()).unwrap();
        let b = model.add_or_reuse_annotation(apoptosis()).unwrap();
        assert_eq!(a, b);
        assert_eq!(1, model.elements_of_type(ObjectType::Annotation).count());

        let r1 = model.link_annotation_ref(&node, &a).unwrap();
        let r2 = model.link_annotation_ref(RefSource::Pathway, &b).unwrap();
        assert_eq!(&[r1, r2], model.back_refs(&a));

        model.unlink_ref(r1).unwrap();
        assert!(model.find_by_id(a.as_str()).is_some());
        assert_eq!(&[r2], model.back_refs(&a));
        assert!(model.refs_of(&RefSource::Element(node.clone())).is_empty());

        model.unlink_ref(r2).unwrap();
        assert!(model.find_by_id(a.as_str()).is_none());
        assert_eq!(0, model.ref_count());
        assert!(model.pathway().refs().is_empty());
    }

    #[test]
    fn test_different_content_is_not_merged() {
        let mut model = PathwayModel::new();
        let a = model.add_or_reuse_annotation(apoptosis()).unwrap();
        let mut other = apoptosis();
        other.annotation_type = AnnotationType::Taxonomy;
        let b = model.add_or_reuse_annotation(other).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_nested_refs_go_first() {
        let (mut model, node) = model_with_node();
        let annotation = model.add_or_reuse_annotation(apoptosis()).unwrap();
        let citation = model
            .add_or_reuse_citation(CitationContent {
                xref: Some(Xref::new("123456", "PubMed")),
                url_link: None,
            })
            .unwrap();

        let outer = model.link_annotation_ref(&node, &annotation).unwrap();
        let inner = model.link_citation_ref(RefSource::Ref(outer), &citation).unwrap();
        assert_eq!(&[inner], model.ref_record(outer).unwrap().refs());

        model.unlink_ref(outer).unwrap();
        assert!(model.ref_record(inner).is_none());
        assert!(model.find_by_id(citation.as_str()).is_none());
        assert!(model.find_by_id(annotation.as_str()).is_none());
    }

    #[test]
    fn test_invalid_endpoints() {
        let (mut model, node) = model_with_node();
        let annotation = model.add_or_reuse_annotation(apoptosis()).unwrap();

        let err = model.link_citation_ref(&node, &annotation).unwrap_err();
        assert_eq!(ErrorCode::InvalidReference, err.code);

        let err = model
            .link_annotation_ref(&ElementId::from("missing"), &annotation)
            .unwrap_err();
        assert_eq!(ErrorCode::InvalidReference, err.code);

        let outer = model.link_annotation_ref(&node, &annotation).unwrap();
        let err = model
            .link_annotation_ref(RefSource::Ref(outer), &annotation)
            .unwrap_err();
        assert_eq!(ErrorCode::InvalidReference, err.code);

        let err = model.unlink_ref(RefId(999)).unwrap_err();
        assert_eq!(ErrorCode::InvalidReference, err.code);
    }

    #[test]
    fn test_unlink_all_refs_orphans_targets() {
        let (mut model, node) = model_with_node();
        let shared = model.add_or_reuse_annotation(apoptosis()).unwrap();
        let own = model
            .add_or_reuse_evidence(EvidenceContent {
                value: Some("inferred".to_owned()),
                ..Default::default()
            })
            .unwrap();
        model.link_annotation_ref(&node, &shared).unwrap();
        model.link_annotation_ref(RefSource::Pathway, &shared).unwrap();
        model.link_evidence_ref(&node, &own).unwrap();

        model.unlink_all_refs(&node).unwrap();
        assert!(model.refs_of(&RefSource::from(&node)).is_empty());
        assert!(model.find_by_id(own.as_str()).is_none());
        assert_eq!(1, model.back_refs(&shared).len());
    }

    proptest::proptest! {
        #[test]
        fn prop_dedup_keeps_one_record_per_content(
            values in proptest::collection::vec(0u8..4, 1..30),
        ) {
            let mut model = PathwayModel::new();
            let mut linked = 0;
            for v in values.iter() {
                let id = model
                    .add_or_reuse_annotation(AnnotationContent::new(
                        format!("term {v}"),
                        AnnotationType::Ontology,
                    ))
                    .unwrap();
                model.link_annotation_ref(RefSource::Pathway, &id).unwrap();
                linked += 1;
            }
            let distinct: std::collections::HashSet<_> = values.iter().collect();
            proptest::prop_assert_eq!(
                distinct.len(),
                model.elements_of_type(ObjectType::Annotation).count()
            );
            proptest::prop_assert_eq!(linked, model.ref_count());
        }
    }
}
