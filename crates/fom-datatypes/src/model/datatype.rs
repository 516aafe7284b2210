// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Datatype descriptors.

use super::kind::{ByteOrder, DatatypeKind};
use std::num::NonZeroU32;

/// Non-owning reference to another datatype, resolved by name through the
/// registry.
///
/// A reference of kind [`DatatypeKind::Unresolved`] points at a datatype
/// that was still under construction when the reference was taken (a
/// cyclic declaration).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatatypeRef {
    /// Referenced datatype name.
    pub name: String,
    /// Kind of the referenced datatype.
    pub kind: DatatypeKind,
}

impl DatatypeRef {
    /// Create a reference.
    pub fn new(name: impl Into<String>, kind: DatatypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Create a cycle-point placeholder reference.
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self::new(name, DatatypeKind::Unresolved)
    }

    /// False for cycle-point placeholders.
    pub fn is_resolved(&self) -> bool {
        self.kind != DatatypeKind::Unresolved
    }
}

/// Kind-specific payload of a [`Datatype`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    Basic(BasicDescriptor),
    Simple(SimpleDescriptor),
    Enumerated(EnumeratedDescriptor),
    Array(ArrayDescriptor),
    FixedRecord(FixedRecordDescriptor),
    VariantRecord(VariantRecordDescriptor),
    /// Placeholder, name only.
    Unresolved,
}

/// A complete, immutable datatype descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datatype {
    name: String,
    definition: Definition,
}

impl Datatype {
    /// Create a descriptor.
    pub fn new(name: impl Into<String>, definition: Definition) -> Self {
        Self {
            name: name.into(),
            definition,
        }
    }

    /// Create a basic descriptor.
    pub fn basic(name: impl Into<String>, byte_size: NonZeroU32, byte_order: ByteOrder) -> Self {
        Self::new(
            name,
            Definition::Basic(BasicDescriptor {
                byte_size,
                byte_order,
            }),
        )
    }

    /// Create a simple (alias) descriptor.
    pub fn simple(name: impl Into<String>, representation: DatatypeRef) -> Self {
        Self::new(name, Definition::Simple(SimpleDescriptor { representation }))
    }

    /// Create an enumerated descriptor.
    pub fn enumerated(
        name: impl Into<String>,
        representation: DatatypeRef,
        enumerators: Vec<Enumerator>,
    ) -> Self {
        Self::new(
            name,
            Definition::Enumerated(EnumeratedDescriptor {
                representation,
                enumerators,
            }),
        )
    }

    /// Create a placeholder.
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self::new(name, Definition::Unresolved)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// Kind of this descriptor; fixed at construction.
    pub fn kind(&self) -> DatatypeKind {
        match &self.definition {
            Definition::Basic(_) => DatatypeKind::Basic,
            Definition::Simple(_) => DatatypeKind::Simple,
            Definition::Enumerated(_) => DatatypeKind::Enumerated,
            Definition::Array(_) => DatatypeKind::Array,
            Definition::FixedRecord(_) => DatatypeKind::FixedRecord,
            Definition::VariantRecord(_) => DatatypeKind::VariantRecord,
            Definition::Unresolved => DatatypeKind::Unresolved,
        }
    }

    /// Reference to this descriptor, as stored by referencing datatypes.
    pub fn to_ref(&self) -> DatatypeRef {
        DatatypeRef::new(self.name.clone(), self.kind())
    }

    pub fn byte_size(&self) -> Option<u32> {
        match &self.definition {
            Definition::Basic(b) => Some(b.byte_size.get()),
            _ => None,
        }
    }

    pub fn byte_order(&self) -> Option<ByteOrder> {
        match &self.definition {
            Definition::Basic(b) => Some(b.byte_order),
            _ => None,
        }
    }

    /// Representation of a simple or enumerated type.
    pub fn representation(&self) -> Option<&DatatypeRef> {
        match &self.definition {
            Definition::Simple(s) => Some(&s.representation),
            Definition::Enumerated(e) => Some(&e.representation),
            _ => None,
        }
    }

    pub fn enumerators(&self) -> Option<&[Enumerator]> {
        match &self.definition {
            Definition::Enumerated(e) => Some(&e.enumerators),
            _ => None,
        }
    }

    pub fn element_type(&self) -> Option<&DatatypeRef> {
        match &self.definition {
            Definition::Array(a) => Some(&a.element_type),
            _ => None,
        }
    }

    pub fn dimensions(&self) -> Option<&[Dimension]> {
        match &self.definition {
            Definition::Array(a) => Some(&a.dimensions),
            _ => None,
        }
    }

    /// Fields of a fixed record, in declaration order.
    pub fn fields(&self) -> Option<&[Field]> {
        match &self.definition {
            Definition::FixedRecord(r) => Some(&r.fields),
            _ => None,
        }
    }

    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields()?.iter().find(|f| f.name == name)
    }

    /// Discriminant name and type of a variant record.
    pub fn discriminant(&self) -> Option<(&str, &DatatypeRef)> {
        match &self.definition {
            Definition::VariantRecord(v) => Some((&v.discriminant_name, &v.discriminant_type)),
            _ => None,
        }
    }

    /// Alternatives of a variant record, in declaration order.
    pub fn alternatives(&self) -> Option<&[Alternative]> {
        match &self.definition {
            Definition::VariantRecord(v) => Some(&v.alternatives),
            _ => None,
        }
    }

    /// Alternative selected by a discriminant enumerator name.
    pub fn alternative_for(&self, enumerator: &str) -> Option<&Alternative> {
        self.alternatives()?
            .iter()
            .find(|alt| alt.applies_to(enumerator))
    }

    /// Every nested datatype reference, in declaration order.
    pub fn references(&self) -> Vec<&DatatypeRef> {
        match &self.definition {
            Definition::Basic(_) | Definition::Unresolved => Vec::new(),
            Definition::Simple(s) => vec![&s.representation],
            Definition::Enumerated(e) => vec![&e.representation],
            Definition::Array(a) => vec![&a.element_type],
            Definition::FixedRecord(r) => r.fields.iter().map(|f| &f.datatype).collect(),
            Definition::VariantRecord(v) => std::iter::once(&v.discriminant_type)
                .chain(v.alternatives.iter().filter_map(|a| a.datatype.as_ref()))
                .collect(),
        }
    }
}

/// Basic representation: size and byte order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicDescriptor {
    /// Size in bytes.
    pub byte_size: NonZeroU32,
    pub byte_order: ByteOrder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleDescriptor {
    pub representation: DatatypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumeratedDescriptor {
    pub representation: DatatypeRef,
    /// Enumerators in declaration order.
    pub enumerators: Vec<Enumerator>,
}

impl EnumeratedDescriptor {
    /// Get enumerator by name.
    pub fn enumerator(&self, name: &str) -> Option<&Enumerator> {
        self.enumerators.iter().find(|e| e.name == name)
    }
}

/// Enumerator: name and its textual value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Enumerator {
    pub name: String,
    pub value: String,
}

impl Enumerator {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayDescriptor {
    pub element_type: DatatypeRef,
    pub dimensions: Vec<Dimension>,
}

/// Array dimension.
///
/// Dynamic cardinality is encoded by [`Dimension::DYNAMIC`] in either bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimension {
    pub lower_bound: i32,
    pub upper_bound: i32,
}

impl Dimension {
    /// Sentinel bound for dynamic cardinality.
    pub const DYNAMIC: i32 = -1;

    /// Fixed cardinality `n`.
    pub fn fixed(cardinality: i32) -> Self {
        Self::bounded(cardinality, cardinality)
    }

    /// Cardinality range `[lower..upper]`.
    pub fn bounded(lower_bound: i32, upper_bound: i32) -> Self {
        Self {
            lower_bound,
            upper_bound,
        }
    }

    /// Dynamic cardinality.
    pub fn dynamic() -> Self {
        Self::fixed(Self::DYNAMIC)
    }

    pub fn is_dynamic(&self) -> bool {
        self.lower_bound == Self::DYNAMIC || self.upper_bound == Self::DYNAMIC
    }

    /// Element count for fixed-size dimensions.
    pub fn cardinality(&self) -> Option<u32> {
        if self.is_dynamic() || self.lower_bound != self.upper_bound {
            return None;
        }
        u32::try_from(self.upper_bound).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedRecordDescriptor {
    /// Fields in wire order.
    pub fields: Vec<Field>,
}

/// Fixed record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub datatype: DatatypeRef,
}

impl Field {
    pub fn new(name: impl Into<String>, datatype: DatatypeRef) -> Self {
        Self {
            name: name.into(),
            datatype,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecordDescriptor {
    pub discriminant_name: String,
    pub discriminant_type: DatatypeRef,
    /// Alternatives in declaration order.
    pub alternatives: Vec<Alternative>,
}

/// Variant record alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub name: String,
    /// Payload type; `None` for alternatives declared with `NA`.
    pub datatype: Option<DatatypeRef>,
    /// Discriminant enumerators selecting this alternative.
    pub enumerators: Vec<Enumerator>,
}

impl Alternative {
    pub fn new(
        name: impl Into<String>,
        datatype: Option<DatatypeRef>,
        enumerators: Vec<Enumerator>,
    ) -> Self {
        Self {
            name: name.into(),
            datatype,
            enumerators,
        }
    }

    /// True when `enumerator` selects this alternative.
    pub fn applies_to(&self, enumerator: &str) -> bool {
        self.enumerators.iter().any(|e| e.name == enumerator)
    }
}
