// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::{error, result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NoError, // will never be produced
    DuplicateIdentifier,
    AlreadyAttached,
    InvalidReference,
    UnsupportedProperty,
    UseAfterTerminate,
    UnrecognizedFormat,
    SchemaValidationFailed,
    MalformedDocument,
    IoFailure,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorCode::*;
        let name = match self {
            NoError => "no_error",
            DuplicateIdentifier => "duplicate_identifier",
            AlreadyAttached => "already_attached",
            InvalidReference => "invalid_reference",
            UnsupportedProperty => "unsupported_property",
            UseAfterTerminate => "use_after_terminate",
            UnrecognizedFormat => "unrecognized_format",
            SchemaValidationFailed => "schema_validation_failed",
            MalformedDocument => "malformed_document",
            IoFailure => "io_failure",
        };

        write!(f, "{name}")
    }
}

/// Where an error was raised: graph contract violations are `Model`,
/// anything surfacing out of a read is `Import` and out of a write is
/// `Export`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Model,
    Import,
    Export,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, code: ErrorCode, details: Option<String>) -> Self {
        Error {
            kind,
            code,
            details,
        }
    }

    pub fn get_details(&self) -> Option<String> {
        self.details.clone()
    }

    /// Re-tag an error raised while populating or serializing a model so
    /// that it surfaces as a single codec-level error, keeping the root
    /// cause's code and details.
    pub(crate) fn in_codec(self, kind: ErrorKind) -> Self {
        Error { kind, ..self }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::Model => "ModelError",
            ErrorKind::Import => "ImportError",
            ErrorKind::Export => "ExportError",
        };
        match self.details {
            Some(ref details) => write!(f, "{}{{{}: {}}}", kind, self.code, details),
            None => write!(f, "{}{{{}}}", kind, self.code),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

#[macro_export]
macro_rules! model_err(
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Model,
            ErrorCode::$code,
            Some($str),
        ))
    }}
);

#[macro_export]
macro_rules! import_err(
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Import,
            ErrorCode::$code,
            Some($str),
        ))
    }}
);

#[macro_export]
macro_rules! export_err(
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Export,
            ErrorCode::$code,
            Some($str),
        ))
    }}
);

#[test]
fn test_error_display() {
    let err = Error::new(
        ErrorKind::Import,
        ErrorCode::UnrecognizedFormat,
        Some("urn:example".to_owned()),
    );
    assert_eq!("ImportError{unrecognized_format: urn:example}", err.to_string());

    let err = Error::new(ErrorKind::Model, ErrorCode::UseAfterTerminate, None);
    assert_eq!("ModelError{use_after_terminate}", err.to_string());
}

#[test]
fn test_in_codec_keeps_root_cause() {
    let err = Error::new(
        ErrorKind::Model,
        ErrorCode::DuplicateIdentifier,
        Some("a1".to_owned()),
    )
    .in_codec(ErrorKind::Import);
    assert_eq!(ErrorKind::Import, err.kind);
    assert_eq!(ErrorCode::DuplicateIdentifier, err.code);
    assert_eq!(Some("a1".to_owned()), err.get_details());
}
