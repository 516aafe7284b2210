// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! FOM datatype model.
//!
//! One closed type, [`Datatype`], covers every datatype class declared in a
//! FOM. Nested datatypes are never owned: they are named through
//! [`DatatypeRef`] and resolved by the registry.

mod datatype;
mod kind;

pub use datatype::{
    Alternative, ArrayDescriptor, BasicDescriptor, Datatype, DatatypeRef, Definition, Dimension,
    EnumeratedDescriptor, Enumerator, Field, FixedRecordDescriptor, SimpleDescriptor,
    VariantRecordDescriptor,
};
pub use kind::{ByteOrder, DatatypeKind};
