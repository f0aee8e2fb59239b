// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Thread-local ambient reference scope.

use super::scope::ReferenceScope;
use std::cell::RefCell;
use std::marker::PhantomData;

thread_local! {
    static CURRENT: RefCell<Option<ReferenceScope>> = const { RefCell::new(None) };
}

/// Restores the previously active scope when dropped.
///
/// Guards nest; they must be dropped on the thread that created them, which
/// the type enforces by not being `Send`.
#[must_use = "the scope is only active while the guard is alive"]
pub struct ScopeGuard {
    previous: Option<ReferenceScope>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|current| *current.borrow_mut() = previous);
    }
}

impl std::fmt::Debug for ScopeGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeGuard")
            .field("restores", &self.previous.is_some())
            .finish()
    }
}

/// Install `scope` (possibly none) as the ambient scope.
pub(crate) fn install(scope: Option<ReferenceScope>) -> ScopeGuard {
    let previous = CURRENT.with(|current| current.replace(scope));
    ScopeGuard {
        previous,
        _not_send: PhantomData,
    }
}

pub(crate) fn current() -> Option<ReferenceScope> {
    CURRENT.with(|current| current.borrow().clone())
}
