// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use float_cmp::approx_eq;

use libgpml::types::{ArrowHeadType, ShapeType};
use libgpml::{
    ErrorCode, ErrorKind, ObjectType, PathwayModel, ReadOptions, RefSource, WriteOptions,
    read, read_from_path, read_str, write_string, write_to_path,
};

static CURRENT_MODELS: &[&str] = &[
    "test/gpml/mapk_2021.gpml",
    "test/gpml/empty_group_2021.gpml",
];

fn open(path: &str) -> PathwayModel {
    let file_path = format!("../../{path}");
    let f = File::open(file_path).unwrap();
    let mut f = BufReader::new(f);
    read(&mut f, &ReadOptions::default()).unwrap()
}

#[test]
fn roundtrips_model() {
    for &path in CURRENT_MODELS {
        eprintln!("model: {path}");

        let mut model = open(path);
        let first = write_string(&mut model, &WriteOptions::default()).unwrap();

        let mut reread = read_str(&first, &ReadOptions::default()).unwrap();
        assert_eq!(model.len(), reread.len());
        let second = write_string(&mut reread, &WriteOptions::default()).unwrap();

        assert_eq!(first, second);
    }
}

#[test]
fn roundtrip_keeps_structure() {
    let mut model = open("test/gpml/mapk_2021.gpml");
    let document = write_string(&mut model, &WriteOptions::default()).unwrap();
    let model = read_str(&document, &ReadOptions::default()).unwrap();

    let pathway = model.pathway();
    assert_eq!("MAPK signaling", pathway.title);
    assert_eq!(Some("Core MAPK cascade."), pathway.description.as_deref());
    assert_eq!(Some("draft"), pathway.properties.get("status").map(String::as_str));
    assert_eq!(2, model.refs_of(&RefSource::Pathway).len());

    let mek = model.find_by_id("mek").unwrap();
    assert_eq!("Also known as MEK1.", mek.comments[0].text);
    assert_eq!(1, mek.as_data_node().unwrap().states().len());

    let cat2 = model.find_by_id("cat2").unwrap().as_point().unwrap();
    assert_eq!(ArrowHeadType::CATALYSIS, cat2.arrow_head);
    assert_eq!(Some("actanchor"), cat2.element_ref().map(|id| id.as_str()));

    let cell = model.find_by_id("cell").unwrap().as_shape().unwrap();
    assert_eq!(ShapeType::ROUNDED_RECTANGLE, cell.style.shape_type);
    assert!(approx_eq!(f64, 3.0, cell.style.border_width));

    let raf = model.find_by_id("raf").unwrap();
    assert_eq!(1, raf.refs().len());
    assert_eq!(2, model.back_refs(&"c1".into()).len());
}

#[test]
fn group_bounds_are_recomputed() {
    let model = open("test/gpml/mapk_2021.gpml");
    let group = model.find_by_id("grp").unwrap().as_group().unwrap();
    assert_eq!(2, group.members().len());

    // raf and mek span x 60..290, y 87.5..112.5, plus 8 on every side
    assert!(approx_eq!(f64, 175.0, group.rect.center_x));
    assert!(approx_eq!(f64, 100.0, group.rect.center_y));
    assert!(approx_eq!(f64, 246.0, group.rect.width));
    assert!(approx_eq!(f64, 41.0, group.rect.height));
}

#[test]
fn empty_groups_are_pruned() {
    let mut model = open("test/gpml/empty_group_2021.gpml");
    assert!(model.find_by_id("full").is_some());
    assert!(model.find_by_id("empty").is_none());

    let document = write_string(&mut model, &WriteOptions::default()).unwrap();
    assert!(document.contains(r#"elementId="full""#));
    assert!(!document.contains("leftover"));

    // a group emptied after reading is pruned by the writer
    model.remove(&"n1".into()).unwrap();
    let document = write_string(&mut model, &WriteOptions::default()).unwrap();
    assert!(!document.contains("<Group "));
    assert_eq!(0, model.element_ids_of_type(ObjectType::Group).len());
}

#[test]
fn file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mapk.gpml");

    let mut model = read_from_path(Path::new("../../test/gpml/mapk_2021.gpml"), &ReadOptions::default()).unwrap();
    write_to_path(&mut model, &path, &WriteOptions::default()).unwrap();

    let reread = read_from_path(&path, &ReadOptions::default()).unwrap();
    assert_eq!(model.len(), reread.len());
    assert_eq!(model.pathway().title, reread.pathway().title);
}

#[test]
fn missing_file() {
    let err = read_from_path(Path::new("../../test/gpml/missing.gpml"), &ReadOptions::default())
        .unwrap_err();
    assert_eq!(ErrorKind::Import, err.kind);
    assert_eq!(ErrorCode::IoFailure, err.code);
}

#[test]
fn unknown_namespace() {
    let err = read_from_path(
        Path::new("../../test/gpml/unknown_namespace.gpml"),
        &ReadOptions::default(),
    )
    .unwrap_err();
    assert_eq!(ErrorKind::Import, err.kind);
    assert_eq!(ErrorCode::UnrecognizedFormat, err.code);
    assert!(err.get_details().unwrap().contains("http://pathvisio.org/GPML/2010a"));
}

#[test]
fn missing_border_width() {
    let options = ReadOptions { validate: false };
    let model = read_from_path(
        Path::new("../../test/gpml/shape_without_border_width.gpml"),
        &options,
    )
    .unwrap();
    let nucleus = model.find_by_id("nucleus").unwrap().as_shape().unwrap();
    assert!(approx_eq!(f64, 1.0, nucleus.style.border_width));
    assert_eq!(ShapeType::OVAL, nucleus.style.shape_type);
}
