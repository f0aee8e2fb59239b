// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for conversion, reference handling and marshalling.

use crate::marshal::FieldPath;
use crate::types::TypeKey;
use thiserror::Error;

/// Result type for [`Bridge`](crate::Bridge) operations.
pub type Result<T> = std::result::Result<T, Error>;

/// No converter chain could produce the requested target type.
///
/// A converter declining a value is not an error; it only shows up here when
/// every candidate (and the canonical fallback) declined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// No converter accepted the value, directly or via canonical fallback.
    #[error("no conversion from {from} to {to}")]
    NoConverter { from: TypeKey, to: TypeKey },

    /// A converter rejected the value with a hard error.
    #[error("conversion from {from} to {to} failed: {reason}")]
    Failed {
        from: TypeKey,
        to: TypeKey,
        reason: String,
    },

    /// Canonical fallback hops kept producing new values.
    #[error("canonical fallback from {from} to {to} exceeded {limit} hops")]
    FallbackDepthExceeded {
        from: TypeKey,
        to: TypeKey,
        limit: usize,
    },
}

impl ConversionError {
    pub fn no_converter(from: TypeKey, to: TypeKey) -> Self {
        Self::NoConverter { from, to }
    }

    pub fn failed(from: TypeKey, to: TypeKey, reason: impl Into<String>) -> Self {
        Self::Failed {
            from,
            to,
            reason: reason.into(),
        }
    }

    /// Source type named by the error.
    pub fn from_type(&self) -> TypeKey {
        match self {
            Self::NoConverter { from, .. }
            | Self::Failed { from, .. }
            | Self::FallbackDepthExceeded { from, .. } => *from,
        }
    }

    /// Target type named by the error.
    pub fn to_type(&self) -> TypeKey {
        match self {
            Self::NoConverter { to, .. }
            | Self::Failed { to, .. }
            | Self::FallbackDepthExceeded { to, .. } => *to,
        }
    }
}

/// Handle resolution contract violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleStateError {
    /// `resolve` called on a handle that already references an object.
    #[error("reference handle '{id}' is already resolved")]
    AlreadyResolved { id: String },

    /// The referenced object was required but the handle is still unresolved.
    #[error("reference handle '{id}' is not resolved")]
    Unresolved { id: String },
}

/// Failures while dereferencing an imported handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error(transparent)]
    State(#[from] HandleStateError),

    /// The stub factory could not produce a local object.
    #[error("stub factory failed for '{id}': {reason}")]
    StubFactory { id: String, reason: String },
}

/// Failure while walking a structure, with the path of the offending value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarshalError {
    #[error("conversion failed at '{path}': {error}")]
    Conversion {
        path: FieldPath,
        #[source]
        error: ConversionError,
    },

    /// A reference token was met while no reference scope was active.
    #[error("reference token '{token}' at '{path}' needs an active reference scope")]
    NoActiveScope { path: FieldPath, token: String },

    #[error("nesting deeper than {limit} levels at '{path}'")]
    DepthExceeded { path: FieldPath, limit: usize },
}

impl MarshalError {
    /// Path of the value that caused the failure.
    pub fn path(&self) -> &FieldPath {
        match self {
            Self::Conversion { path, .. }
            | Self::NoActiveScope { path, .. }
            | Self::DepthExceeded { path, .. } => path,
        }
    }
}

/// Top-level error for [`Bridge`](crate::Bridge) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    HandleState(#[from] HandleStateError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Marshal(#[from] MarshalError),
}
