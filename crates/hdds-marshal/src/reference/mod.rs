// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Cross-boundary object references.
//!
//! A [`ReferenceScope`] hands out [`ReferenceHandle`]s for local objects
//! (export) and for ids received from the other side (import). Exported
//! objects keep one handle per identity for the lifetime of the scope;
//! imported handles stay unresolved until a [`StubFactory`] (or an explicit
//! [`ReferenceScope::resolve`]) attaches an object, exactly once.
//!
//! ```
//! use hdds_marshal::reference::ReferenceScope;
//! use hdds_marshal::Object;
//!
//! let scope = ReferenceScope::new();
//! let object = Object::new(String::from("session"));
//!
//! let handle = scope.export_object(&object);
//! assert!(handle.id().starts_with("ipc://resolve/"));
//! assert_eq!(scope.export_object(&object), handle);
//!
//! let imported = scope.import_handle(handle.id());
//! assert!(imported.object().unwrap().same(&object));
//! ```

mod ambient;
mod handle;
mod scope;
mod stub;

pub use ambient::ScopeGuard;
pub use handle::ReferenceHandle;
pub use scope::ReferenceScope;
pub use stub::StubFactory;

pub(crate) use ambient::install as install_scope;
