// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Datatype classes and wire byte order.

use std::fmt;

/// Datatype class, as tagged in the FOM `dataTypes` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DatatypeKind {
    /// `basicData`: primitive wire encoding.
    Basic,
    /// `simpleData`: scalar alias of a basic representation.
    Simple,
    /// `enumeratedData`: named values over a basic representation.
    Enumerated,
    /// `arrayData`: homogeneous collection.
    Array,
    /// `fixedRecordData`: ordered heterogeneous fields.
    FixedRecord,
    /// `variantRecordData`: discriminated union.
    VariantRecord,
    /// `NA` or any unrecognized tag. Also marks forward references that
    /// were still under construction.
    Unresolved,
}

impl DatatypeKind {
    /// Every kind that can be declared in a schema, in OMT section order.
    pub const CLASSIFIED: [DatatypeKind; 6] = [
        DatatypeKind::Basic,
        DatatypeKind::Simple,
        DatatypeKind::Enumerated,
        DatatypeKind::Array,
        DatatypeKind::FixedRecord,
        DatatypeKind::VariantRecord,
    ];

    /// Map a schema tag to its kind.
    ///
    /// Never fails: `NA` and unknown tags map to [`DatatypeKind::Unresolved`].
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "basicData" => Self::Basic,
            "simpleData" => Self::Simple,
            "enumeratedData" => Self::Enumerated,
            "arrayData" => Self::Array,
            "fixedRecordData" => Self::FixedRecord,
            "variantRecordData" => Self::VariantRecord,
            _ => Self::Unresolved,
        }
    }

    /// Schema tag for this kind.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Basic => "basicData",
            Self::Simple => "simpleData",
            Self::Enumerated => "enumeratedData",
            Self::Array => "arrayData",
            Self::FixedRecord => "fixedRecordData",
            Self::VariantRecord => "variantRecordData",
            Self::Unresolved => "NA",
        }
    }
}

impl fmt::Display for DatatypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Byte order of a basic representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Parse the schema spelling (`LITTLE`, `Big`, ...), case-insensitive.
    pub fn from_schema(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("little") {
            Some(Self::Little)
        } else if value.eq_ignore_ascii_case("big") {
            Some(Self::Big)
        } else {
            None
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Little => f.write_str("LITTLE"),
            Self::Big => f.write_str("BIG"),
        }
    }
}
