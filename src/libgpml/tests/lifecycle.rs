// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::cell::RefCell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use libgpml::types::{AnnotationType, DataNodeType, GroupType};
use libgpml::{
    AnnotationContent, DataNode, ElementId, ElementKind, ErrorCode, EventKind, Group, ObjectType,
    PathwayElement, PathwayModel, Property, PropertyTag, ReadOptions, Rect, RefSource,
    WriteOptions, read_str, write_string,
};

static SMALL_PATHWAY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Pathway xmlns="http://pathvisio.org/GPML/2021" title="Glycolysis">
  <AnnotationRef elementRef="go" />
  <DataNodes>
    <DataNode elementId="glc" textLabel="glucose" type="Metabolite" groupRef="sugars">
      <Graphics centerX="50" centerY="50" width="60" height="20" />
      <AnnotationRef elementRef="go" />
    </DataNode>
    <DataNode elementId="g6p" textLabel="G6P" type="Metabolite" groupRef="sugars">
      <States>
        <State elementId="g6p_p" textLabel="P" type="ProteinModification">
          <Graphics relX="1" relY="1" width="10" height="10" />
        </State>
      </States>
      <Graphics centerX="150" centerY="50" width="60" height="20" />
    </DataNode>
  </DataNodes>
  <Interactions>
    <Interaction elementId="hk">
      <Waypoints>
        <Point elementId="hk1" x="80" y="50" elementRef="glc" />
        <Point elementId="hk2" x="120" y="50" elementRef="g6p" arrowHead="Conversion" />
      </Waypoints>
      <Graphics lineWidth="1" />
    </Interaction>
  </Interactions>
  <Groups>
    <Group elementId="sugars" type="Group">
      <Graphics centerX="0" centerY="0" width="0" height="0" />
    </Group>
  </Groups>
  <Annotations>
    <Annotation elementId="go" value="glycolytic process" type="Ontology" />
  </Annotations>
</Pathway>"#;

fn small_pathway() -> PathwayModel {
    read_str(SMALL_PATHWAY, &ReadOptions::default()).unwrap()
}

fn record_events(model: &mut PathwayModel) -> Rc<RefCell<Vec<(EventKind, ObjectType)>>> {
    let log = Rc::new(RefCell::new(vec![]));
    let sink = log.clone();
    model.subscribe(move |event| sink.borrow_mut().push((event.kind, event.object_type)));
    log
}

#[test]
fn added_elements_are_found() {
    let mut model = small_pathway();
    let mut node = DataNode::new("ATP", DataNodeType::METABOLITE);
    node.rect = Rect::new(100.0, 120.0, 40.0, 20.0);
    let atp = model
        .add(PathwayElement::new(ElementKind::DataNode(node)).with_id("atp"))
        .unwrap();

    assert_eq!(Some("ATP"), model.find_by_id("atp").unwrap().text_label());
    assert_eq!(ElementId::from("atp"), atp);

    let err = model
        .add(PathwayElement::new(ElementKind::DataNode(DataNode::new("ADP", DataNodeType::METABOLITE))).with_id("glc"))
        .unwrap_err();
    assert_eq!(ErrorCode::DuplicateIdentifier, err.code);
}

#[test]
fn equal_annotations_are_shared() {
    let mut model = small_pathway();
    let content = AnnotationContent::new("glycolytic process", AnnotationType::Ontology);
    let reused = model.add_or_reuse_annotation(content).unwrap();
    assert_eq!(ElementId::from("go"), reused);
    assert_eq!(1, model.elements_of_type(ObjectType::Annotation).count());

    let g6p = ElementId::from("g6p");
    model.link_annotation_ref(&g6p, &reused).unwrap();
    assert_eq!(3, model.back_refs(&reused).len());

    // the annotation survives as long as anything still refers to it
    model.unlink_all_refs(&g6p).unwrap();
    model.unlink_all_refs(RefSource::Pathway).unwrap();
    assert!(model.find_by_id("go").is_some());
    model.unlink_all_refs(&ElementId::from("glc")).unwrap();
    assert!(model.find_by_id("go").is_none());
    assert_eq!(0, model.ref_count());
}

#[test]
fn removing_a_node_cascades() {
    let mut model = small_pathway();
    let log = record_events(&mut model);

    let removed = model.remove(&ElementId::from("g6p")).unwrap().unwrap();
    assert!(removed.as_data_node().unwrap().states().is_empty());
    assert!(model.find_by_id("g6p_p").is_none());
    assert!(model.is_terminated("g6p_p"));

    let hk2 = model.find_by_id("hk2").unwrap().as_point().unwrap();
    assert_eq!(None, hk2.element_ref());

    let sugars = model.find_by_id("sugars").unwrap().as_group().unwrap();
    assert_eq!(&[ElementId::from("glc")], sugars.members());

    let log = log.borrow();
    assert_eq!((EventKind::Deleted, ObjectType::DataNode), log[0]);
    assert!(log.contains(&(EventKind::Deleted, ObjectType::State)));
    assert!(log.contains(&(
        EventKind::PropertyChanged(PropertyTag::ElementRef),
        ObjectType::LinePoint
    )));
    assert!(log.contains(&(EventKind::Resized, ObjectType::Group)));
}

#[test]
fn removed_elements_stay_removed() {
    let mut model = small_pathway();
    let glc = ElementId::from("glc");
    model.remove(&glc).unwrap();
    assert!(model.remove(&glc).unwrap().is_none());

    let err = model
        .set_property(&glc, Property::TextLabel("fructose".to_owned()))
        .unwrap_err();
    assert_eq!(ErrorCode::UseAfterTerminate, err.code);

    // glc's ref went with it; the pathway's ref keeps the annotation alive
    assert!(model.find_by_id("go").is_some());
}

#[test]
fn emptied_group_is_pruned_on_write() {
    let mut model = small_pathway();
    let extra = model
        .add(PathwayElement::new(ElementKind::Group(Group::new(GroupType::COMPLEX))))
        .unwrap();
    model
        .set_group(&ElementId::from("glc"), Some(&extra))
        .unwrap();
    model
        .set_group(&ElementId::from("g6p"), Some(&extra))
        .unwrap();
    assert!(model.find_by_id("sugars").unwrap().as_group().unwrap().members().is_empty());

    let document = write_string(&mut model, &WriteOptions::default()).unwrap();
    assert!(!document.contains("sugars"));
    assert!(model.is_terminated("sugars"));

    let reread = read_str(&document, &ReadOptions::default()).unwrap();
    let group = reread.find_by_id(extra.as_str()).unwrap().as_group().unwrap();
    assert_eq!(GroupType::COMPLEX, group.group_type);
    assert_eq!(2, group.members().len());
}

#[test]
fn unsubscribed_listener_hears_nothing() {
    let mut model = small_pathway();
    let count = Rc::new(RefCell::new(0));
    let listener = {
        let count = count.clone();
        model.subscribe(move |_| *count.borrow_mut() += 1)
    };
    model
        .set_property(&ElementId::from("glc"), Property::TextLabel("D-glucose".to_owned()))
        .unwrap();
    assert_eq!(1, *count.borrow());

    assert!(model.unsubscribe(listener));
    model.remove(&ElementId::from("hk")).unwrap();
    assert_eq!(1, *count.borrow());
}

#[test]
fn failing_listener_leaves_model_consistent() {
    let mut model = small_pathway();
    model.subscribe(|_| panic!("listener failed"));

    let fru = DataNode::new("fructose", DataNodeType::METABOLITE);
    let element = PathwayElement::new(ElementKind::DataNode(fru))
        .with_id("fru")
        .with_group("sugars");
    assert!(catch_unwind(AssertUnwindSafe(|| model.add(element))).is_err());
    let fru = model.find_by_id("fru").unwrap();
    assert_eq!(Some(&ElementId::from("sugars")), fru.group_ref());
    let sugars = model.find_by_id("sugars").unwrap().as_group().unwrap();
    assert_eq!(3, sugars.members().len());

    let glc = ElementId::from("glc");
    let renamed = catch_unwind(AssertUnwindSafe(|| {
        model.set_property(&glc, Property::TextLabel("D-glucose".to_owned()))
    }));
    assert!(renamed.is_err());
    assert_eq!(Some("D-glucose"), model.find_by_id("glc").unwrap().text_label());

    let g6p = ElementId::from("g6p");
    assert!(catch_unwind(AssertUnwindSafe(|| model.remove(&g6p))).is_err());
    assert!(model.find_by_id("g6p").is_none());
    assert!(model.find_by_id("g6p_p").is_none());
    assert!(model.is_terminated("g6p"));
    let hk2 = model.find_by_id("hk2").unwrap().as_point().unwrap();
    assert_eq!(None, hk2.element_ref());
    let sugars = model.find_by_id("sugars").unwrap().as_group().unwrap();
    assert_eq!(
        &[ElementId::from("glc"), ElementId::from("fru")],
        sugars.members()
    );

    // glc and the pathway still hold their refs to go
    let go = ElementId::from("go");
    assert_eq!(2, model.back_refs(&go).len());
    assert_eq!(1, model.refs_of(&RefSource::from(&glc)).len());
    assert_eq!(1, model.refs_of(&RefSource::Pathway).len());
}
