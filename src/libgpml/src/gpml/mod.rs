// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Reading and writing GPML documents.
//!
//! The root element's namespace picks the schema generation.  Both
//! generations can be read; only the current one (2021) is written.

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use tracing::{debug, warn};

use crate::common::{Error, ErrorKind, Result};
use crate::datamodel::PathwayElement;
use crate::ids::ElementId;
use crate::model::PathwayModel;
use crate::types::Color;
use crate::{export_err, import_err, model_err};

pub mod defaults;
mod gpml2013a;
mod gpml2021;
pub mod schema;

pub use self::gpml2013a::Gpml2013a;
pub use self::gpml2021::Gpml2021;

pub const GPML_2013A_NS: &str = "http://pathvisio.org/GPML/2013a";
pub const GPML_2021_NS: &str = "http://pathvisio.org/GPML/2021";

pub(crate) trait ToXml<W: Clone + Write> {
    fn write_xml(&self, writer: &mut Writer<W>) -> Result<()>;
}

pub(crate) type XmlWriter = Cursor<Vec<u8>>;

/// One GPML schema generation.
pub trait SchemaVersion {
    /// The namespace of the root element of documents in this generation.
    fn namespace(&self) -> &'static str;

    /// Check a whole document against this generation's schema.
    fn validate(&self, document: &str) -> Result<()>;
}

pub trait FormatReader: SchemaVersion {
    /// Populate `model` from a document already known to be in this
    /// generation.
    fn read_from_root(&self, document: &str, model: &mut PathwayModel) -> Result<()>;
}

pub trait FormatWriter: SchemaVersion {
    fn create_document(&self, model: &PathwayModel) -> Result<String>;

    fn write_to_stream(&self, model: &PathwayModel, out: &mut dyn Write) -> Result<()> {
        let document = self.create_document(model)?;
        out.write_all(document.as_bytes()).map_err(xml_error)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ReadOptions {
    /// Run a full schema pass before populating the model.
    pub validate: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions { validate: true }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WriteOptions {
    /// Check the produced document against the schema before writing it.
    pub validate: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions { validate: true }
    }
}

/// The known schema generations, dispatched on namespace.
pub struct FormatRegistry {
    readers: Vec<Box<dyn FormatReader>>,
    writer: Box<dyn FormatWriter>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        FormatRegistry {
            readers: vec![Box::new(Gpml2013a), Box::new(Gpml2021)],
            writer: Box::new(Gpml2021),
        }
    }

    /// Add a reader, replacing any registered for the same namespace.
    pub fn register_reader(&mut self, reader: Box<dyn FormatReader>) {
        self.readers
            .retain(|existing| existing.namespace() != reader.namespace());
        self.readers.push(reader);
    }

    pub fn reader_for(&self, namespace: &str) -> Option<&dyn FormatReader> {
        self.readers
            .iter()
            .find(|reader| reader.namespace() == namespace)
            .map(|reader| reader.as_ref())
    }

    pub fn current_writer(&self) -> &dyn FormatWriter {
        self.writer.as_ref()
    }

    pub fn read_str(&self, document: &str, options: &ReadOptions) -> Result<PathwayModel> {
        let namespace = detect_namespace(document)?;
        let Some(reader) = self.reader_for(&namespace) else {
            return import_err!(UnrecognizedFormat, namespace);
        };
        debug!(namespace, validate = options.validate, "reading GPML");

        if options.validate {
            reader.validate(document).map_err(|err| err.in_codec(ErrorKind::Import))?;
        }

        let mut model = PathwayModel::new();
        reader
            .read_from_root(document, &mut model)
            .map_err(|err| err.in_codec(ErrorKind::Import))?;
        model.prune_empty_groups();

        Ok(model)
    }

    pub fn read(&self, input: &mut dyn Read, options: &ReadOptions) -> Result<PathwayModel> {
        let mut document = String::new();
        match input.read_to_string(&mut document) {
            Ok(_) => {}
            // bytes that are not UTF-8 are a broken document, not a broken stream
            Err(err) if err.kind() == std::io::ErrorKind::InvalidData => {
                return import_err!(MalformedDocument, err.to_string());
            }
            Err(err) => return import_err!(IoFailure, err.to_string()),
        }
        self.read_str(&document, options)
    }

    /// Serialize `model` with the current writer.  Empty groups are pruned
    /// from the model first.
    pub fn write_string(&self, model: &mut PathwayModel, options: &WriteOptions) -> Result<String> {
        let pruned = model.prune_empty_groups();
        if !pruned.is_empty() {
            debug!(count = pruned.len(), "pruned empty groups before writing");
        }

        let document = self
            .writer
            .create_document(model)
            .map_err(|err| err.in_codec(ErrorKind::Export))?;
        if options.validate {
            self.writer
                .validate(&document)
                .map_err(|err| err.in_codec(ErrorKind::Export))?;
        }
        Ok(document)
    }

    pub fn write(
        &self,
        model: &mut PathwayModel,
        out: &mut dyn Write,
        options: &WriteOptions,
    ) -> Result<()> {
        let document = self.write_string(model, options)?;
        out.write_all(document.as_bytes()).map_err(xml_error)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a GPML document of either generation.
pub fn read(input: &mut dyn Read, options: &ReadOptions) -> Result<PathwayModel> {
    FormatRegistry::new().read(input, options)
}

pub fn read_str(document: &str, options: &ReadOptions) -> Result<PathwayModel> {
    FormatRegistry::new().read_str(document, options)
}

/// Write `model` as a GPML 2021 document.
pub fn write(model: &mut PathwayModel, out: &mut dyn Write, options: &WriteOptions) -> Result<()> {
    FormatRegistry::new().write(model, out, options)
}

pub fn write_string(model: &mut PathwayModel, options: &WriteOptions) -> Result<String> {
    FormatRegistry::new().write_string(model, options)
}

#[cfg(feature = "file_io")]
pub fn read_from_path(path: &std::path::Path, options: &ReadOptions) -> Result<PathwayModel> {
    let mut file = std::fs::File::open(path).map_err(|err| {
        Error::new(
            ErrorKind::Import,
            crate::common::ErrorCode::IoFailure,
            Some(format!("{}: {err}", path.display())),
        )
    })?;
    read(&mut file, options)
}

#[cfg(feature = "file_io")]
pub fn write_to_path(
    model: &mut PathwayModel,
    path: &std::path::Path,
    options: &WriteOptions,
) -> Result<()> {
    let document = write_string(model, options)?;
    std::fs::write(path, document).map_err(|err| {
        Error::new(
            ErrorKind::Export,
            crate::common::ErrorCode::IoFailure,
            Some(format!("{}: {err}", path.display())),
        )
    })
}

/// The namespace of the document's root element.
pub fn detect_namespace(document: &str) -> Result<String> {
    let mut reader = NsReader::from_str(document);
    loop {
        match reader.read_resolved_event() {
            Ok((ResolveResult::Bound(ns), Event::Start(_) | Event::Empty(_))) => {
                return Ok(String::from_utf8_lossy(ns.as_ref()).into_owned());
            }
            Ok((_, Event::Start(e) | Event::Empty(e))) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                return import_err!(
                    UnrecognizedFormat,
                    format!("root element {name} has no namespace")
                );
            }
            Ok((_, Event::Eof)) => {
                return import_err!(MalformedDocument, "no root element".to_owned());
            }
            Ok(_) => {}
            Err(err) => {
                return import_err!(
                    MalformedDocument,
                    format!("at byte {}: {err}", reader.error_position())
                );
            }
        }
    }
}

pub(crate) fn xml_error(err: std::io::Error) -> Error {
    Error::new(
        ErrorKind::Export,
        crate::common::ErrorCode::IoFailure,
        Some(err.to_string()),
    )
}

pub(crate) fn malformed(err: quick_xml::DeError) -> Error {
    Error::new(
        ErrorKind::Import,
        crate::common::ErrorCode::MalformedDocument,
        Some(err.to_string()),
    )
}

pub(crate) fn new_writer() -> Result<Writer<XmlWriter>> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 4);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;
    Ok(writer)
}

pub(crate) fn finish_writer(writer: Writer<XmlWriter>) -> Result<String> {
    let result = writer.into_inner().into_inner();
    match String::from_utf8(result) {
        Ok(document) => Ok(document),
        Err(_err) => export_err!(MalformedDocument, "problem converting to UTF-8".to_owned()),
    }
}

/// Attribute list for a start tag, skipping optional values that are
/// absent.
#[derive(Default)]
pub(crate) struct Attrs(Vec<(&'static str, String)>);

impl Attrs {
    pub(crate) fn new() -> Self {
        Default::default()
    }

    pub(crate) fn with(mut self, name: &'static str, value: impl ToString) -> Self {
        self.0.push((name, value.to_string()));
        self
    }

    pub(crate) fn with_opt<T: ToString>(mut self, name: &'static str, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.0.push((name, value.to_string()));
        }
        self
    }

    pub(crate) fn as_pairs(&self) -> Vec<(&str, &str)> {
        self.0
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
            .collect()
    }
}

pub(crate) fn write_tag_start_with_attrs(
    writer: &mut Writer<XmlWriter>,
    tag_name: &str,
    attrs: &Attrs,
) -> Result<()> {
    let mut elem = BytesStart::new(tag_name);
    for attr in attrs.as_pairs() {
        elem.push_attribute(attr);
    }
    writer.write_event(Event::Start(elem)).map_err(xml_error)
}

pub(crate) fn write_tag_end(writer: &mut Writer<XmlWriter>, tag_name: &str) -> Result<()> {
    writer
        .write_event(Event::End(BytesEnd::new(tag_name)))
        .map_err(xml_error)
}

pub(crate) fn write_tag_text(writer: &mut Writer<XmlWriter>, content: &str) -> Result<()> {
    writer
        .write_event(Event::Text(BytesText::new(content)))
        .map_err(xml_error)
}

/// An element with no children.
pub(crate) fn write_empty_tag(
    writer: &mut Writer<XmlWriter>,
    tag_name: &str,
    attrs: &Attrs,
) -> Result<()> {
    let mut elem = BytesStart::new(tag_name);
    for attr in attrs.as_pairs() {
        elem.push_attribute(attr);
    }
    writer.write_event(Event::Empty(elem)).map_err(xml_error)
}

pub(crate) fn write_tag(writer: &mut Writer<XmlWriter>, tag_name: &str, content: &str) -> Result<()> {
    write_tag_with_attrs(writer, tag_name, content, &Attrs::new())
}

pub(crate) fn write_tag_with_attrs(
    writer: &mut Writer<XmlWriter>,
    tag_name: &str,
    content: &str,
    attrs: &Attrs,
) -> Result<()> {
    write_tag_start_with_attrs(writer, tag_name, attrs)?;

    write_tag_text(writer, content)?;

    write_tag_end(writer, tag_name)
}

/// Parse an optional color attribute, falling back to `default` when it is
/// absent or unreadable.
pub(crate) fn color_or(value: Option<&str>, default: Color, attr: &str) -> Color {
    match value {
        None => default,
        Some(value) => Color::parse(value).unwrap_or_else(|| {
            warn!(attr, value, "unreadable color, using default");
            default
        }),
    }
}

/// Trim whitespace around an element's text; `None` if nothing remains.
pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Parse an optional closed-enum attribute, falling back to `default` for
/// absent or unknown names.
pub(crate) fn closed_or<T: Copy>(value: Option<&str>, parse: fn(&str) -> Option<T>, default: T) -> T {
    match value {
        None => default,
        Some(name) => parse(name).unwrap_or_else(|| {
            warn!(value = name, "unknown value, using default");
            default
        }),
    }
}

/// Maps document ids of annotations, citations and evidences to model ids.
/// Equal records in one document collapse into a single model element.
#[derive(Default)]
pub(crate) struct ValueIds(HashMap<String, ElementId>);

impl ValueIds {
    pub(crate) fn insert(&mut self, file_id: impl Into<String>, id: ElementId) {
        self.0.insert(file_id.into(), id);
    }

    pub(crate) fn get(&self, file_id: &str) -> Result<&ElementId> {
        match self.0.get(file_id.trim()) {
            Some(id) => Ok(id),
            None => model_err!(
                InvalidReference,
                format!("no annotation, citation or evidence {file_id}")
            ),
        }
    }
}

pub(crate) fn requested_id(element_id: &str) -> Option<ElementId> {
    let id = element_id.trim();
    (!id.is_empty()).then(|| ElementId::from(id))
}

/// Add `element` under the id a document gave it, if any, inside the group
/// named by `group_ref`.
pub(crate) fn add_with_id(
    model: &mut PathwayModel,
    element: PathwayElement,
    element_id: &str,
    group_ref: Option<&String>,
) -> Result<ElementId> {
    let mut element = match requested_id(element_id) {
        Some(id) => element.with_id(id),
        None => element,
    };
    if let Some(group) = group_ref.and_then(|group| requested_id(group)) {
        element = element.with_group(group);
    }
    model.add(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorCode;

    #[test]
    fn test_detect_namespace() {
        let doc = r#"<?xml version="1.0"?><!-- c --><Pathway xmlns="http://pathvisio.org/GPML/2021" title="x"/>"#;
        assert_eq!(GPML_2021_NS, detect_namespace(doc).unwrap());

        let doc = r#"<gpml:Pathway xmlns:gpml="http://pathvisio.org/GPML/2013a"></gpml:Pathway>"#;
        assert_eq!(GPML_2013A_NS, detect_namespace(doc).unwrap());

        let err = detect_namespace("<Pathway/>").unwrap_err();
        assert_eq!(ErrorCode::UnrecognizedFormat, err.code);

        let err = detect_namespace("   ").unwrap_err();
        assert_eq!(ErrorCode::MalformedDocument, err.code);
    }

    #[test]
    fn test_unrecognized_namespace() {
        let doc = r#"<Pathway xmlns="http://example.org/not-gpml" title="x"/>"#;
        let err = read_str(doc, &ReadOptions::default()).unwrap_err();
        assert_eq!(ErrorKind::Import, err.kind);
        assert_eq!(ErrorCode::UnrecognizedFormat, err.code);
        assert_eq!(Some("http://example.org/not-gpml".to_owned()), err.details);
    }

    #[test]
    fn test_read_rejects_invalid_utf8() {
        let mut bytes = br#"<Pathway xmlns="http://pathvisio.org/GPML/2021" title="x"#.to_vec();
        bytes.push(0xFF);
        bytes.extend_from_slice(br#""/>"#);

        let err = read(&mut bytes.as_slice(), &ReadOptions::default()).unwrap_err();
        assert_eq!(ErrorKind::Import, err.kind);
        assert_eq!(ErrorCode::MalformedDocument, err.code);
    }

    #[test]
    fn test_registry_dispatch() {
        let registry = FormatRegistry::new();
        assert!(registry.reader_for(GPML_2013A_NS).is_some());
        assert!(registry.reader_for(GPML_2021_NS).is_some());
        assert!(registry.reader_for("urn:other").is_none());
        assert_eq!(GPML_2021_NS, registry.current_writer().namespace());
    }

    #[test]
    fn test_attrs_skip_absent() {
        let attrs = Attrs::new()
            .with("a", 1.5)
            .with_opt::<String>("b", None)
            .with_opt("c", Some("x"));
        assert_eq!(vec![("a", "1.5"), ("c", "x")], attrs.as_pairs());
    }
}
