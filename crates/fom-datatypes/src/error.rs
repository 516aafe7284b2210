// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types.

use crate::model::DatatypeKind;
use thiserror::Error;

/// Schema document errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The schema text is not well-formed XML.
    #[error("failed to parse FOM schema: {0}")]
    ParseFailure(String),
}

/// Datatype lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("datatype registry is not initialized")]
    NotInitialized,

    #[error("datatype '{name}' ({kind}) not found in the FOM")]
    NotFound { kind: DatatypeKind, name: String },

    /// Construction for this kind is not compiled in.
    #[error("construction of {0} is not supported by this build")]
    Unsupported(DatatypeKind),

    /// Soft error: resolution completed with a placeholder at `name`.
    #[error("cyclic datatype reference to '{name}' (via {})", .path.join(" -> "))]
    CyclicReference { name: String, path: Vec<String> },

    /// The declaration violates a datatype invariant.
    #[error("malformed datatype '{name}': {reason}")]
    Malformed { name: String, reason: String },

    #[error("datatype '{name}' nests deeper than {limit} levels")]
    DepthExceeded { name: String, limit: usize },
}

impl LookupError {
    pub(crate) fn malformed(name: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(kind: DatatypeKind, name: &str) -> Self {
        Self::NotFound {
            kind,
            name: name.to_string(),
        }
    }
}
