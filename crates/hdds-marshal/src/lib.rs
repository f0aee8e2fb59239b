// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # hdds-marshal - type-directed conversion and cross-boundary references
//!
//! Runtime services for values that travel between execution contexts:
//!
//! - a conversion registry that picks, per runtime type, among competing
//!   prioritized converters (with a two-hop canonical fallback)
//! - a reference broker that exports objects as `ipc://resolve/<uuid>` tokens
//!   and re-identifies them on the way back
//! - a structural marshaller walking named-argument records, maps, arrays,
//!   lists and lazy sequences
//!
//! ## Quick Start
//!
//! ```rust
//! use hdds_marshal::{Bridge, NamedArgs, Object, TypeKey, Value};
//!
//! struct Session {
//!     user: String,
//! }
//!
//! let bridge = Bridge::builder().build();
//! bridge.mark_referenceable(TypeKey::of::<Session>());
//!
//! let session = Object::new(Session { user: "ada".into() });
//! let call = Value::args(
//!     NamedArgs::new()
//!         .with("session", session.clone())
//!         .with("limit", 10),
//! );
//!
//! // Outbound: the session becomes a token
//! let outbound = bridge.marshal(&call).unwrap();
//! let token = outbound.as_args().unwrap().get("session").unwrap();
//! assert!(token.as_str().unwrap().starts_with("ipc://resolve/"));
//!
//! // Inbound: the token is the same session again
//! let inbound = bridge.unmarshal(&outbound).unwrap();
//! let back = inbound.as_args().unwrap().get("session").unwrap();
//! assert_eq!(back.downcast_ref::<Session>().unwrap().user, "ada");
//! assert!(back.as_object().unwrap().same(&session));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                 Bridge (session facade)                             |
//! +---------------------------------------------------------------------+
//! |   StructuralMarshaller: marshal / unmarshal walk                   |
//! +----------------------------------+----------------------------------+
//! |   ConversionRegistry             |   ReferenceScope                 |
//! |   -> ConversionAggregator / T    |   -> ReferenceHandle             |
//! +----------------------------------+----------------------------------+
//! |   TypeKey / TypeHierarchy        |   Value model                    |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`convert`] - converters, aggregators and the registry
//! - [`reference`] - handles, scopes, stub factories
//! - [`marshal`] - the structural walk and built-in boundary converters
//! - [`types`] - type keys, marker types, supertype hierarchy
//! - [`value`] - dynamic value model
//! - [`config`] - constants and [`BridgeConfig`]

/// Session facade tying the registry, the marshaller and a scope together.
mod bridge;
/// Constants and runtime configuration.
pub mod config;
/// Type-directed conversion (converters, aggregators, registry).
pub mod convert;
/// Error types.
pub mod error;
/// Recursive marshal / unmarshal walk.
pub mod marshal;
/// Cross-boundary object references.
pub mod reference;
/// Runtime type descriptors and the supertype hierarchy.
pub mod types;
/// Dynamic value model.
pub mod value;

pub use bridge::{Bridge, BridgeBuilder};
pub use config::{BridgeConfig, CachePolicy};
pub use convert::{ConversionRegistry, Converter, ConverterRef, FnConverter};
pub use error::{ConversionError, Error, HandleStateError, MarshalError, ReferenceError, Result};
pub use marshal::StructuralMarshaller;
pub use reference::{ReferenceHandle, ReferenceScope, StubFactory};
pub use types::{TypeHierarchy, TypeKey};
pub use value::{NamedArgs, Object, Value};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
