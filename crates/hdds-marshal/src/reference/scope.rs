// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-session handle store, indexed by id and by object identity.

use super::ambient::{self, ScopeGuard};
use super::handle::ReferenceHandle;
use crate::config::RESOLVE_PREFIX;
use crate::error::HandleStateError;
use crate::value::{Object, ObjectId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Default)]
struct ScopeState {
    /// Every handle the scope produced.
    by_id: HashMap<Arc<str>, ReferenceHandle>,
    /// Resolved handles only.
    by_identity: HashMap<ObjectId, ReferenceHandle>,
    disposed: bool,
}

pub(crate) struct ScopeShared {
    state: Mutex<ScopeState>,
}

/// Reference broker for one session.
///
/// Cloning yields another view of the same scope. Both indices are updated
/// under a single lock, so concurrent exports of one object all observe the
/// handle created by the first of them.
///
/// After [`dispose`](Self::dispose) the scope behaves as an empty scope:
/// exports and imports still succeed but produce handles that are not
/// indexed.
#[derive(Clone)]
pub struct ReferenceScope {
    shared: Arc<ScopeShared>,
}

impl ReferenceScope {
    pub fn new() -> Self {
        let scope = Self {
            shared: Arc::new(ScopeShared {
                state: Mutex::new(ScopeState::default()),
            }),
        };
        log::debug!("[reference] scope {:p} created", Arc::as_ptr(&scope.shared));
        scope
    }

    pub(crate) fn from_shared(shared: Arc<ScopeShared>) -> Self {
        Self { shared }
    }

    /// Handle standing for `object`.
    ///
    /// Returns the handle already exported for this exact object (identity,
    /// not equality), or creates a resolved one with a fresh
    /// `ipc://resolve/<uuid>` id.
    pub fn export_object(&self, object: &Object) -> ReferenceHandle {
        let mut state = self.shared.state.lock();
        if state.disposed {
            log::warn!("[reference] export on disposed scope, handle is not indexed");
            return ReferenceHandle::exported(
                fresh_id(),
                Arc::downgrade(&self.shared),
                object.clone(),
            );
        }
        if let Some(existing) = state.by_identity.get(&object.id()) {
            return existing.clone();
        }

        let handle =
            ReferenceHandle::exported(fresh_id(), Arc::downgrade(&self.shared), object.clone());
        state.by_id.insert(Arc::from(handle.id()), handle.clone());
        state.by_identity.insert(object.id(), handle.clone());
        log::trace!("[reference] exported {:?} as '{}'", object, handle.id());
        handle
    }

    /// Handle for a token received from the other side of the boundary.
    ///
    /// Ids this scope exported come back as their resolved handle; unknown
    /// ids get an unresolved handle, indexed by id only until resolved.
    pub fn import_handle(&self, id: &str) -> ReferenceHandle {
        let mut state = self.shared.state.lock();
        if state.disposed {
            log::warn!("[reference] import of '{}' on disposed scope, handle is not indexed", id);
            return ReferenceHandle::imported(Arc::from(id), Arc::downgrade(&self.shared));
        }
        if let Some(existing) = state.by_id.get(id) {
            return existing.clone();
        }

        let id: Arc<str> = Arc::from(id);
        let handle = ReferenceHandle::imported(Arc::clone(&id), Arc::downgrade(&self.shared));
        state.by_id.insert(id, handle.clone());
        log::trace!("[reference] imported unresolved '{}'", handle.id());
        handle
    }

    /// Attach `object` to an unresolved handle and index it by identity.
    ///
    /// Fails with [`HandleStateError::AlreadyResolved`] if the handle already
    /// references an object; that object stays in place. If `object` was
    /// already exported under another handle, the identity index keeps the
    /// earlier handle.
    pub fn resolve(
        &self,
        handle: &ReferenceHandle,
        object: Object,
    ) -> Result<(), HandleStateError> {
        if !handle.belongs_to(&self.shared) {
            return handle.resolve(object);
        }
        let mut state = self.shared.state.lock();
        let identity = object.id();
        handle.attach(object)?;
        if !state.disposed {
            state
                .by_identity
                .entry(identity)
                .or_insert_with(|| handle.clone());
        }
        log::trace!("[reference] resolved '{}'", handle.id());
        Ok(())
    }

    /// Handle registered under `id`, if any.
    pub fn lookup(&self, id: &str) -> Option<ReferenceHandle> {
        self.shared.state.lock().by_id.get(id).cloned()
    }

    /// Handle already standing for `object`, if any.
    pub fn handle_for(&self, object: &Object) -> Option<ReferenceHandle> {
        self.shared
            .state
            .lock()
            .by_identity
            .get(&object.id())
            .cloned()
    }

    /// Number of handles indexed by id.
    pub fn size(&self) -> usize {
        self.shared.state.lock().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Clear both indices. Handles already handed out keep working.
    pub fn dispose(&self) {
        let mut state = self.shared.state.lock();
        if state.disposed {
            return;
        }
        log::debug!(
            "[reference] scope {:p} disposed ({} handles)",
            Arc::as_ptr(&self.shared),
            state.by_id.len()
        );
        state.by_id.clear();
        state.by_identity.clear();
        state.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.state.lock().disposed
    }

    /// Make this scope the ambient scope of the current thread until the
    /// guard drops.
    pub fn enter(&self) -> ScopeGuard {
        ambient::install(Some(self.clone()))
    }

    /// Ambient scope of the current thread.
    pub fn current() -> Option<ReferenceScope> {
        ambient::current()
    }

    /// Identity comparison.
    #[inline]
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Default for ReferenceScope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReferenceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("ReferenceScope")
            .field("handles", &state.by_id.len())
            .field("exported", &state.by_identity.len())
            .field("disposed", &state.disposed)
            .finish()
    }
}

fn fresh_id() -> Arc<str> {
    Arc::from(format!("{}{}", RESOLVE_PREFIX, Uuid::new_v4()))
}
