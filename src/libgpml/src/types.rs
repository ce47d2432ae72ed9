// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Value types shared by elements: the open, name-keyed type registries
//! (shapes, arrow heads, ...), closed style enums and `Color`.

use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use tracing::debug;

/// A type whose set of values is open: GPML files may name values this
/// library does not know about, and those get registered on first sight.
pub trait RegisteredType: Clone {
    const KIND: &'static str;

    fn builtins() -> &'static [&'static str];
    fn from_registered(name: &str) -> Self;
    fn name(&self) -> &str;
}

macro_rules! registered_type {
    ($(#[$meta:meta])* $name:ident, $kind:expr, [$($konst:ident => $value:expr),* $(,)?]) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Cow<'static, str>);

        impl $name {
            $(pub const $konst: $name = $name(Cow::Borrowed($value));)*

            const BUILTINS: &'static [&'static str] = &[$($value),*];

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl RegisteredType for $name {
            const KIND: &'static str = $kind;

            fn builtins() -> &'static [&'static str] {
                Self::BUILTINS
            }

            fn from_registered(name: &str) -> Self {
                $name(Cow::Owned(name.to_owned()))
            }

            fn name(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

registered_type!(
    /// Outline of a data node, label, shape, group or state.
    ShapeType,
    "shape_type",
    [
        NONE => "None",
        RECTANGLE => "Rectangle",
        ROUNDED_RECTANGLE => "RoundedRectangle",
        OVAL => "Oval",
        TRIANGLE => "Triangle",
        PENTAGON => "Pentagon",
        HEXAGON => "Hexagon",
        OCTAGON => "Octagon",
        BRACE => "Brace",
        ARC => "Arc",
        MITOCHONDRIA => "Mitochondria",
        NUCLEUS => "Nucleus",
        ENDOPLASMIC_RETICULUM => "EndoplasmicReticulum",
        GOLGI_APPARATUS => "GolgiApparatus",
        SARCOPLASMIC_RETICULUM => "SarcoplasmicReticulum",
        ORGANELLE => "Organelle",
    ]
);

registered_type!(
    ArrowHeadType,
    "arrow_head_type",
    [
        UNDIRECTED => "Undirected",
        DIRECTED => "Directed",
        CONVERSION => "Conversion",
        INHIBITION => "Inhibition",
        CATALYSIS => "Catalysis",
        STIMULATION => "Stimulation",
        BINDING => "Binding",
        TRANSLOCATION => "Translocation",
        TRANSCRIPTION_TRANSLATION => "TranscriptionTranslation",
    ]
);

registered_type!(
    AnchorShapeType,
    "anchor_shape_type",
    [
        NONE => "None",
        SQUARE => "Square",
        CIRCLE => "Circle",
    ]
);

registered_type!(
    DataNodeType,
    "data_node_type",
    [
        UNDEFINED => "Undefined",
        GENE_PRODUCT => "GeneProduct",
        DNA => "Dna",
        RNA => "Rna",
        PROTEIN => "Protein",
        COMPLEX => "Complex",
        METABOLITE => "Metabolite",
        PATHWAY => "Pathway",
        DISEASE => "Disease",
        PHENOTYPE => "Phenotype",
        ALIAS => "Alias",
        EVENT => "Event",
        CELL => "Cell",
        ORGAN => "Organ",
    ]
);

registered_type!(
    StateType,
    "state_type",
    [
        UNDEFINED => "Undefined",
        PROTEIN_MODIFICATION => "ProteinModification",
        GENETIC_VARIANT => "GeneticVariant",
        EPIGENETIC_MODIFICATION => "EpigeneticModification",
    ]
);

registered_type!(
    GroupType,
    "group_type",
    [
        GROUP => "Group",
        TRANSPARENT => "Transparent",
        COMPLEX => "Complex",
        PATHWAY => "Pathway",
        ANALOG => "Analog",
        PARALOG => "Paralog",
    ]
);

/// Per-model registry of the names known for each `RegisteredType`.
///
/// Every registry starts with the builtin names.  Lookups are exact first
/// and then case-insensitive, returning the canonical spelling.  There is no
/// process-wide state: each `PathwayModel` owns one registry and readers
/// register unknown names into the model they populate.
#[derive(Clone, Debug)]
pub struct TypeRegistry {
    known: HashMap<&'static str, BTreeSet<String>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut registry = TypeRegistry {
            known: HashMap::new(),
        };
        registry.seed::<ShapeType>();
        registry.seed::<ArrowHeadType>();
        registry.seed::<AnchorShapeType>();
        registry.seed::<DataNodeType>();
        registry.seed::<StateType>();
        registry.seed::<GroupType>();
        registry
    }

    fn seed<T: RegisteredType>(&mut self) {
        let names = self.known.entry(T::KIND).or_default();
        names.extend(T::builtins().iter().map(|name| name.to_string()));
    }

    pub fn lookup<T: RegisteredType>(&self, name: &str) -> Option<T> {
        let names = self.known.get(T::KIND)?;
        if names.contains(name) {
            return Some(T::from_registered(name));
        }
        names
            .iter()
            .find(|known| known.eq_ignore_ascii_case(name))
            .map(|known| T::from_registered(known))
    }

    /// Look `name` up, registering it if it is new.
    pub fn resolve<T: RegisteredType>(&mut self, name: &str) -> T {
        match self.lookup(name) {
            Some(value) => value,
            None => self.register(name),
        }
    }

    pub fn register<T: RegisteredType>(&mut self, name: &str) -> T {
        let names = self.known.entry(T::KIND).or_default();
        if names.insert(name.to_owned()) {
            debug!(kind = T::KIND, name, "registered new type name");
        }
        T::from_registered(name)
    }

    pub fn is_registered<T: RegisteredType>(&self, name: &str) -> bool {
        self.known
            .get(T::KIND)
            .is_some_and(|names| names.contains(name))
    }

    pub fn names<T: RegisteredType>(&self) -> Vec<&str> {
        self.known
            .get(T::KIND)
            .map(|names| names.iter().map(|name| name.as_str()).collect())
            .unwrap_or_default()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $value:expr),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),*
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($value => Some($name::$variant),)*
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

string_enum!(LineStyle {
    Solid => "Solid",
    Dashed => "Dashed",
    Double => "Double",
});

string_enum!(ConnectorType {
    Straight => "Straight",
    Elbow => "Elbow",
    Curved => "Curved",
    Segmented => "Segmented",
});

string_enum!(HAlign {
    Left => "Left",
    Center => "Center",
    Right => "Right",
});

string_enum!(VAlign {
    Top => "Top",
    Middle => "Middle",
    Bottom => "Bottom",
});

string_enum!(AnnotationType {
    Ontology => "Ontology",
    Taxonomy => "Taxonomy",
    Undefined => "Undefined",
});

/// An sRGB color with alpha.  GPML writes colors as `rrggbb`, or
/// `rrggbbaa` when not fully opaque.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color {
        r: 255,
        g: 255,
        b: 255,
        a: 0,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    /// Parse a hex color (with or without a leading `#`, 6 or 8 digits) or
    /// one of the color names legacy files use.
    pub fn parse(input: &str) -> Option<Color> {
        let input = input.trim();
        let named = match input.to_ascii_lowercase().as_str() {
            "transparent" => Some(Color::TRANSPARENT),
            "black" => Some(Color::BLACK),
            "white" => Some(Color::WHITE),
            "red" => Some(Color::rgb(255, 0, 0)),
            "green" => Some(Color::rgb(0, 255, 0)),
            "blue" => Some(Color::rgb(0, 0, 255)),
            "gray" | "grey" => Some(Color::rgb(128, 128, 128)),
            _ => None,
        };
        if named.is_some() {
            return named;
        }

        let hex = input.strip_prefix('#').unwrap_or(input);
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Color {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if hex.len() == 8 { channel(6)? } else { 255 },
        })
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[test]
fn test_color_parse() {
    assert_eq!(Some(Color::BLACK), Color::parse("000000"));
    assert_eq!(Some(Color::rgb(0x99, 0x66, 0xff)), Color::parse("#9966FF"));
    assert_eq!(
        Some(Color {
            r: 255,
            g: 255,
            b: 255,
            a: 0
        }),
        Color::parse("ffffff00")
    );
    assert_eq!(Some(Color::TRANSPARENT), Color::parse("Transparent"));
    assert_eq!(Some(Color::rgb(255, 0, 0)), Color::parse("Red"));
    assert_eq!(None, Color::parse("fffff"));
    assert_eq!(None, Color::parse("gggggg"));
}

#[test]
fn test_color_hex() {
    assert_eq!("000000", Color::BLACK.to_hex());
    assert_eq!("ffffff00", Color::TRANSPARENT.to_hex());
    let color = Color::rgb(0x12, 0xab, 0x0f);
    assert_eq!(Some(color), Color::parse(&color.to_hex()));
}

#[test]
fn test_registry_lookup() {
    let mut registry = TypeRegistry::new();
    assert_eq!(
        Some(ShapeType::RECTANGLE),
        registry.lookup::<ShapeType>("Rectangle")
    );
    assert_eq!(Some(ShapeType::OVAL), registry.lookup::<ShapeType>("oval"));
    assert_eq!(None, registry.lookup::<ShapeType>("Blob"));

    let blob: ShapeType = registry.resolve("Blob");
    assert_eq!("Blob", blob.as_str());
    assert!(registry.is_registered::<ShapeType>("Blob"));
    // registration is per kind
    assert!(!registry.is_registered::<ArrowHeadType>("Blob"));

    let other = TypeRegistry::new();
    assert!(!other.is_registered::<ShapeType>("Blob"));
}

#[test]
fn test_registered_constant_equals_resolved() {
    let mut registry = TypeRegistry::new();
    let resolved: ArrowHeadType = registry.resolve("Conversion");
    assert_eq!(ArrowHeadType::CONVERSION, resolved);
    assert!(registry.names::<AnchorShapeType>().contains(&"Square"));
}

#[test]
fn test_string_enums() {
    assert_eq!(Some(LineStyle::Dashed), LineStyle::from_name("Dashed"));
    assert_eq!(None, LineStyle::from_name("Broken"));
    assert_eq!("Elbow", ConnectorType::Elbow.as_str());
    assert_eq!(Some(VAlign::Middle), VAlign::from_name("Middle"));
    assert_eq!("Ontology", AnnotationType::Ontology.to_string());
}
