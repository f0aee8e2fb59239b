// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type descriptors used as dispatch keys.
//!
//! - [`TypeKey`]: identity of a Rust type (`TypeId`) plus its name for diagnostics
//! - Marker types ([`AnyType`], [`Canonical`], [`Boundary`], ...): dispatch-only,
//!   never instantiated
//! - [`TypeHierarchy`]: explicit supertype relation (parent chain + capabilities)
//!   linearized once per type and shared by every aggregator

mod hierarchy;
mod key;

pub use hierarchy::TypeHierarchy;
pub use key::{AnyType, Boundary, Canonical, Referenceable, TypeKey, Undefined};

#[cfg(test)]
mod tests;
