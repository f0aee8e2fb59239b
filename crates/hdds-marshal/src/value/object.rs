// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-erased object with identity.

use crate::types::TypeKey;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Identity of an [`Object`] allocation.
///
/// Stable for as long as any clone of the object is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

/// Shared, type-erased application object.
///
/// Clones share the allocation and compare identical; two objects built from
/// equal values are distinct.
#[derive(Clone)]
pub struct Object {
    ty: TypeKey,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Object {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            ty: TypeKey::of::<T>(),
            inner: value,
        }
    }

    #[inline]
    pub fn type_key(&self) -> TypeKey {
        self.ty
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    #[inline]
    pub fn id(&self) -> ObjectId {
        ObjectId(Arc::as_ptr(&self.inner).cast::<()>() as usize)
    }

    /// Identity comparison.
    #[inline]
    pub fn same(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object<{}>@{:#x}", self.ty, self.id().0)
    }
}
