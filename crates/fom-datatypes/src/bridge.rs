// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Handle-based datatype lookups for the federate ambassador.
//!
//! The runtime side of a federation knows attributes and parameters by
//! handle. [`RuntimeBridge`] turns a handle into the datatype name and class
//! tag declared in the FOM, and supplies the FOM text itself. The
//! [`DatatypeService`] combines a bridge with a shared [`DatatypeRegistry`],
//! pulling the FOM through the bridge the first time a lookup finds the
//! registry uninitialized.

use crate::error::{LookupError, SchemaError};
use crate::model::Datatype;
use crate::registry::DatatypeRegistry;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectClassHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InteractionClassHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParameterHandle(pub u32);

/// Attribute or parameter whose datatype is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolHandle {
    Attribute(ObjectClassHandle, AttributeHandle),
    Parameter(InteractionClassHandle, ParameterHandle),
}

impl fmt::Display for SymbolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute(class, attribute) => {
                write!(f, "attribute {} of object class {}", attribute.0, class.0)
            }
            Self::Parameter(class, parameter) => {
                write!(f, "parameter {} of interaction class {}", parameter.0, class.0)
            }
        }
    }
}

/// Datatype name and class tag declared for a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Datatype name.
    pub name: String,
    /// Datatype class tag (`simpleData`, ...).
    pub kind_tag: String,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind_tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind_tag: kind_tag.into(),
        }
    }
}

/// Errors reported by a [`RuntimeBridge`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("unknown handle: {0}")]
    UnknownHandle(SymbolHandle),

    #[error("runtime unavailable: {0}")]
    Unavailable(String),
}

/// Runtime collaborator resolving handles and supplying the FOM text.
pub trait RuntimeBridge: Send + Sync {
    fn resolve_symbol(&self, handle: &SymbolHandle) -> Result<Symbol, BridgeError>;

    fn fetch_schema_document(&self) -> Result<String, BridgeError>;
}

/// Errors returned by [`DatatypeService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Datatype lookups by attribute and parameter handle.
pub struct DatatypeService<B: RuntimeBridge> {
    bridge: B,
    registry: Arc<DatatypeRegistry>,
    fetch_lock: Mutex<()>,
}

impl<B: RuntimeBridge> DatatypeService<B> {
    pub fn new(bridge: B, registry: Arc<DatatypeRegistry>) -> Self {
        Self {
            bridge,
            registry,
            fetch_lock: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &Arc<DatatypeRegistry> {
        &self.registry
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn attribute_datatype(
        &self,
        class: ObjectClassHandle,
        attribute: AttributeHandle,
    ) -> Result<Arc<Datatype>, ServiceError> {
        self.datatype(&SymbolHandle::Attribute(class, attribute))
    }

    pub fn parameter_datatype(
        &self,
        class: InteractionClassHandle,
        parameter: ParameterHandle,
    ) -> Result<Arc<Datatype>, ServiceError> {
        self.datatype(&SymbolHandle::Parameter(class, parameter))
    }

    /// Resolve the datatype declared for `handle`.
    pub fn datatype(&self, handle: &SymbolHandle) -> Result<Arc<Datatype>, ServiceError> {
        let symbol = self.bridge.resolve_symbol(handle)?;
        self.ensure_initialized()?;

        let datatype = match handle {
            SymbolHandle::Attribute(..) => self
                .registry
                .get_attribute_datatype(&symbol.name, &symbol.kind_tag)?,
            SymbolHandle::Parameter(..) => self
                .registry
                .get_parameter_datatype(&symbol.name, &symbol.kind_tag)?,
        };
        Ok(datatype)
    }

    /// Fetch the FOM through the bridge unless the registry already has one.
    ///
    /// The fetch happens at most once per successful initialization; a
    /// failed fetch is retried by the next lookup.
    fn ensure_initialized(&self) -> Result<(), ServiceError> {
        if self.registry.is_initialized() {
            return Ok(());
        }

        let _fetch = self.fetch_lock.lock();
        if self.registry.is_initialized() {
            return Ok(());
        }

        log::debug!("fetching FOM schema document from runtime");
        let schema = self.bridge.fetch_schema_document()?;
        self.registry.initialize(&schema)?;
        Ok(())
    }
}
