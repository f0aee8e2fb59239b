// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeKey and dispatch marker types.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Universal target type. Every value satisfies it and every type has it as
/// its implicit root supertype.
pub enum AnyType {}

/// Requests the most normalized representation of a value. Used for the
/// two-hop fallback conversion.
pub enum Canonical {}

/// Target type used when a value is about to cross an execution boundary.
pub enum Boundary {}

/// Runtime type of `Value::Null`.
pub enum Undefined {}

/// Capability marking objects that are exported by reference when marshaled.
pub enum Referenceable {}

/// Runtime type descriptor.
///
/// Equality and hashing use the `TypeId` only; the name is carried for
/// error messages and logs.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    #[inline]
    #[must_use]
    pub fn any() -> Self {
        Self::of::<AnyType>()
    }

    #[inline]
    #[must_use]
    pub fn canonical() -> Self {
        Self::of::<Canonical>()
    }

    #[inline]
    #[must_use]
    pub fn boundary() -> Self {
        Self::of::<Boundary>()
    }

    #[inline]
    #[must_use]
    pub fn undefined() -> Self {
        Self::of::<Undefined>()
    }

    #[inline]
    #[must_use]
    pub fn referenceable() -> Self {
        Self::of::<Referenceable>()
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified name as reported by `std::any::type_name`.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name, generics stripped
    /// (`alloc::vec::Vec<i64>` -> `Vec`).
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        last_segment(self.name)
    }

    /// True for the dispatch-only marker types.
    #[must_use]
    pub fn is_marker(&self) -> bool {
        *self == Self::any()
            || *self == Self::canonical()
            || *self == Self::boundary()
            || *self == Self::undefined()
            || *self == Self::referenceable()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            Some(element) => write!(f, "[{}]", last_segment(element)),
            None => f.write_str(self.short_name()),
        }
    }
}

fn last_segment(name: &'static str) -> &'static str {
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}
