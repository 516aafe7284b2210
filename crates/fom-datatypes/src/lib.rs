// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! FOM datatype metadata for HLA federates.
//!
//! Resolves the declared datatype of an attribute or parameter from the
//! `dataTypes` section of a Federation Object Model, producing typed,
//! cached descriptors.
//!
//! # Features
//!
//! - **Datatype model**: basic, simple, enumerated, array, fixed record and
//!   variant record descriptors in one closed [`Datatype`] type
//! - **Registry**: lazy, identity-cached construction with forward-reference
//!   and cycle handling
//! - **Bridge service**: handle-based lookups with on-demand FOM fetch
//!
//! # Example
//!
//! ```rust
//! use fom_datatypes::{ByteOrder, DatatypeKind, DatatypeRegistry};
//!
//! let fom = r#"<objectModel><dataTypes>
//!     <basicData name="HLAinteger32BE" size="4" endianness="BIG"/>
//!     <simpleData name="PayRate" representation="HLAinteger32BE"/>
//! </dataTypes></objectModel>"#;
//!
//! let registry = DatatypeRegistry::new();
//! registry.initialize(fom).unwrap();
//!
//! let pay_rate = registry.get_attribute_datatype("PayRate", "simpleData").unwrap();
//! assert_eq!(pay_rate.kind(), DatatypeKind::Simple);
//!
//! let basic = registry.resolve(pay_rate.representation().unwrap()).unwrap();
//! assert_eq!(basic.byte_size(), Some(4));
//! assert_eq!(basic.byte_order(), Some(ByteOrder::Big));
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod model;
pub mod registry;
pub mod schema;

pub use bridge::{
    AttributeHandle, BridgeError, DatatypeService, InteractionClassHandle, ObjectClassHandle,
    ParameterHandle, RuntimeBridge, ServiceError, Symbol, SymbolHandle,
};
pub use config::{ConfigError, RegistryConfig};
pub use error::{LookupError, SchemaError};
pub use model::{
    Alternative, ByteOrder, Datatype, DatatypeKind, DatatypeRef, Definition, Dimension,
    Enumerator, Field,
};
pub use registry::{CycleReport, DatatypeRegistry, RegistryStats};
pub use schema::SchemaDocument;
