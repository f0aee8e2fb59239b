// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reference handles: opaque stand-ins for objects crossing a boundary.

use super::scope::{ReferenceScope, ScopeShared};
use super::stub::StubFactory;
use crate::error::{HandleStateError, ReferenceError};
use crate::value::Object;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock, Weak};

struct HandleInner {
    id: Arc<str>,
    scope: Weak<ScopeShared>,
    /// Set once: `unresolved -> resolved`, never reversed.
    object: OnceLock<Object>,
}

/// Token standing in for an object that crossed (or will cross) an execution
/// boundary.
///
/// Clones share state; equality is identity of the underlying handle, so two
/// handles are equal exactly when a scope handed out the same handle twice.
#[derive(Clone)]
pub struct ReferenceHandle {
    inner: Arc<HandleInner>,
}

impl ReferenceHandle {
    /// Export side: the object is known, the handle starts resolved.
    pub(crate) fn exported(id: Arc<str>, scope: Weak<ScopeShared>, object: Object) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                id,
                scope,
                object: OnceLock::from(object),
            }),
        }
    }

    /// Import side: only the id is known.
    pub(crate) fn imported(id: Arc<str>, scope: Weak<ScopeShared>) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                id,
                scope,
                object: OnceLock::new(),
            }),
        }
    }

    /// `ipc://resolve/<id>` token.
    #[inline]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.inner.object.get().is_some()
    }

    /// Referenced object, once resolved.
    #[inline]
    pub fn object(&self) -> Option<&Object> {
        self.inner.object.get()
    }

    /// Referenced object, or [`HandleStateError::Unresolved`].
    pub fn require(&self) -> Result<&Object, HandleStateError> {
        self.object().ok_or_else(|| HandleStateError::Unresolved {
            id: self.id().to_string(),
        })
    }

    /// Owning scope, unless it was dropped.
    pub fn scope(&self) -> Option<ReferenceScope> {
        self.inner.scope.upgrade().map(ReferenceScope::from_shared)
    }

    /// Attach the referenced object to an imported handle.
    ///
    /// Meant for stub factories. The transition is one-way: a second call
    /// fails with [`HandleStateError::AlreadyResolved`] and leaves the
    /// referenced object untouched. On success the owning scope indexes the
    /// object so that exporting it later yields this handle.
    pub fn resolve(&self, object: Object) -> Result<(), HandleStateError> {
        match self.scope() {
            Some(scope) => scope.resolve(self, object),
            None => self.attach(object),
        }
    }

    /// Referenced object, creating it through `factory` on first use.
    ///
    /// When two threads race, the factory may run twice but only one object
    /// is attached; both callers receive that object.
    pub fn get_or_resolve(&self, factory: &dyn StubFactory) -> Result<Object, ReferenceError> {
        if let Some(object) = self.object() {
            return Ok(object.clone());
        }

        let stub = factory
            .create_stub(self)
            .map_err(|reason| ReferenceError::StubFactory {
                id: self.id().to_string(),
                reason,
            })?;
        if self.resolve(stub).is_err() {
            log::debug!("[reference] '{}' resolved concurrently, using winner", self.id());
        }
        Ok(self.require()?.clone())
    }

    /// Set the object without touching any index. Caller holds the scope lock
    /// when the handle belongs to a live scope.
    pub(crate) fn attach(&self, object: Object) -> Result<(), HandleStateError> {
        self.inner
            .object
            .set(object)
            .map_err(|_| HandleStateError::AlreadyResolved {
                id: self.id().to_string(),
            })
    }

    pub(crate) fn belongs_to(&self, scope: &Arc<ScopeShared>) -> bool {
        std::ptr::eq(self.inner.scope.as_ptr(), Arc::as_ptr(scope))
    }
}

impl PartialEq for ReferenceHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ReferenceHandle {}

impl Hash for ReferenceHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.inner), state);
    }
}

impl fmt::Debug for ReferenceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceHandle")
            .field("id", &self.id())
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

impl fmt::Display for ReferenceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
