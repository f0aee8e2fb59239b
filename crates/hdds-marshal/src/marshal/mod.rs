// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural marshalling across execution boundaries.
//!
//! [`StructuralMarshaller::marshal`] walks named-argument records, maps,
//! arrays, lists and lazy sequences, sending every leaf through
//! `convert(value, Boundary)`. [`StructuralMarshaller::unmarshal`] walks the
//! same shapes and turns `ipc://` tokens back into objects (or unresolved
//! handles) through the ambient reference scope.
//!
//! ```
//! use hdds_marshal::convert::ConversionRegistry;
//! use hdds_marshal::marshal::{install_boundary_converters, StructuralMarshaller};
//! use hdds_marshal::reference::ReferenceScope;
//! use hdds_marshal::{NamedArgs, Object, Value};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(ConversionRegistry::new());
//! install_boundary_converters(&registry);
//! let marshaller = StructuralMarshaller::new(Arc::clone(&registry));
//!
//! let scope = ReferenceScope::new();
//! let _active = scope.enter();
//! let session = Object::new(String::from("session"));
//! let handle = scope.export_object(&session);
//!
//! let args = Value::args(NamedArgs::new().with("target", handle.clone()).with("n", 3));
//! let outbound = marshaller.marshal(&args).unwrap();
//! assert_eq!(
//!     outbound.as_args().unwrap().get("target"),
//!     Some(Value::from(handle.id()))
//! );
//!
//! let inbound = marshaller.unmarshal(&outbound).unwrap();
//! let target = inbound.as_args().unwrap().get("target").unwrap();
//! assert!(target.as_object().unwrap().same(&session));
//! ```

mod boundary;
mod path;
mod walker;

pub use boundary::{
    install_boundary_converters, ExportConverter, HandleTokenConverter, PassthroughConverter,
};
pub use path::{FieldPath, PathSegment};
pub use walker::StructuralMarshaller;
