// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::path::Path;

use libgpml::types::{ArrowHeadType, GroupType, LineStyle};
use libgpml::{
    ElementId, ObjectType, PathwayModel, ReadOptions, RefKind, RefSource, WriteOptions,
    read_from_path, read_str, write_string,
};

static EQUIVALENT_MODELS: &[(&str, &str)] =
    &[("test/gpml/mapk_2013a.gpml", "test/gpml/mapk_2021.gpml")];

static STRUCTURAL_TYPES: &[ObjectType] = &[
    ObjectType::DataNode,
    ObjectType::State,
    ObjectType::Interaction,
    ObjectType::GraphicalLine,
    ObjectType::LinePoint,
    ObjectType::Anchor,
    ObjectType::Label,
    ObjectType::Shape,
    ObjectType::Group,
];

fn open(path: &str) -> PathwayModel {
    let file_path = format!("../../{path}");
    read_from_path(Path::new(&file_path), &ReadOptions::default()).unwrap()
}

fn sorted_ids(model: &PathwayModel, object_type: ObjectType) -> Vec<ElementId> {
    let mut ids = model.element_ids_of_type(object_type).to_vec();
    ids.sort();
    ids
}

/// The pathway's refs as (kind, value summary) pairs; annotation ids are
/// generated by the legacy reader so only content is compared.
fn pathway_refs(model: &PathwayModel) -> Vec<(RefKind, String)> {
    model
        .refs_of(&RefSource::Pathway)
        .iter()
        .map(|r| {
            let record = model.ref_record(*r).unwrap();
            let target = model.find_by_id(record.target.as_str()).unwrap();
            let summary = match (target.as_annotation(), target.as_citation()) {
                (Some(annotation), _) => annotation.value.clone(),
                (_, Some(citation)) => format!("{:?}", citation.xref),
                _ => unreachable!(),
            };
            (record.kind, summary)
        })
        .collect()
}

#[test]
fn legacy_matches_current() {
    for &(legacy_path, current_path) in EQUIVALENT_MODELS {
        eprintln!("model: {legacy_path}");
        let legacy = open(legacy_path);
        let current = open(current_path);

        for &object_type in STRUCTURAL_TYPES {
            let ids = sorted_ids(&current, object_type);
            assert_eq!(ids, sorted_ids(&legacy, object_type), "{object_type}");

            for id in ids.iter() {
                let expected = current.find_by_id(id.as_str()).unwrap();
                let actual = legacy.find_by_id(id.as_str()).unwrap();
                assert_eq!(expected.kind, actual.kind, "{object_type} {id}");
                assert_eq!(expected.group_ref(), actual.group_ref(), "{id}");
                assert_eq!(expected.comments, actual.comments, "{id}");
                assert_eq!(expected.properties, actual.properties, "{id}");
                assert_eq!(expected.refs().len(), actual.refs().len(), "{id}");
            }
        }

        let (expected, actual) = (current.pathway(), legacy.pathway());
        assert_eq!(expected.title, actual.title);
        assert_eq!(expected.organism, actual.organism);
        assert_eq!(expected.version, actual.version);
        assert_eq!(expected.license, actual.license);
        assert_eq!(expected.description, actual.description);
        assert_eq!(expected.comments, actual.comments);
        assert_eq!(expected.properties, actual.properties);
        assert_eq!(expected.board_width, actual.board_width);
        assert_eq!(expected.board_height, actual.board_height);

        assert_eq!(pathway_refs(&current), pathway_refs(&legacy));
    }
}

#[test]
fn legacy_value_objects() {
    let legacy = open("test/gpml/mapk_2013a.gpml");
    let current = open("test/gpml/mapk_2021.gpml");

    let citation = legacy.find_by_id("c1").unwrap().as_citation().unwrap();
    assert_eq!(current.find_by_id("c1").unwrap().as_citation().unwrap(), citation);

    let legacy_annotations: Vec<_> = legacy
        .elements_of_type(ObjectType::Annotation)
        .filter_map(|element| element.as_annotation())
        .collect();
    let current_annotations: Vec<_> = current
        .elements_of_type(ObjectType::Annotation)
        .filter_map(|element| element.as_annotation())
        .collect();
    assert_eq!(current_annotations, legacy_annotations);
}

#[test]
fn legacy_names_are_translated() {
    let legacy = open("test/gpml/mapk_2013a.gpml");

    let atp = legacy.find_by_id("atp").unwrap().as_data_node().unwrap();
    assert_eq!(LineStyle::Dashed, atp.style.border_style);

    let act2 = legacy.find_by_id("act2").unwrap().as_point().unwrap();
    assert_eq!(ArrowHeadType::STIMULATION, act2.arrow_head);
    let div2 = legacy.find_by_id("div2").unwrap().as_point().unwrap();
    assert_eq!(ArrowHeadType::UNDIRECTED, div2.arrow_head);

    let grp = legacy.find_by_id("grp").unwrap().as_group().unwrap();
    assert_eq!(GroupType::COMPLEX, grp.group_type);
    // GroupRef="cascade" resolves through the group's GroupId
    assert_eq!(Some(&ElementId::from("grp")), legacy.find_by_id("raf").unwrap().group_ref());
    // the Style="None" group had no members
    assert!(legacy.find_by_id("old").is_none());
}

#[test]
fn legacy_is_written_as_current() {
    let mut legacy = open("test/gpml/mapk_2013a.gpml");
    let document = write_string(&mut legacy, &WriteOptions::default()).unwrap();
    assert!(document.contains("http://pathvisio.org/GPML/2021"));
    assert!(document.contains(r#"arrowHead="Catalysis""#));
    assert!(!document.contains("GraphId"));

    let reread = read_str(&document, &ReadOptions::default()).unwrap();
    assert_eq!(legacy.len(), reread.len());
}

#[test]
fn group_id_shared_with_graph_id() {
    let legacy = open("test/gpml/group_id_collision_2013a.gpml");

    let a1 = legacy.find_by_id("a1").unwrap();
    assert_eq!(ObjectType::DataNode, a1.object_type());

    let groups = legacy.element_ids_of_type(ObjectType::Group);
    assert_eq!(1, groups.len());
    let group_id = &groups[0];
    assert_ne!(&ElementId::from("a1"), group_id);

    assert_eq!(Some(group_id), a1.group_ref());
    assert_eq!(Some(group_id), legacy.find_by_id("n2").unwrap().group_ref());
    let group = legacy.find_by_id(group_id.as_str()).unwrap().as_group().unwrap();
    assert_eq!(GroupType::COMPLEX, group.group_type);
    assert_eq!(2, group.members().len());
}
