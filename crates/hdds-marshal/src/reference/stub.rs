// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::handle::ReferenceHandle;
use crate::value::Object;

/// Creates the local stand-in object for an imported handle.
///
/// Called the first time an unresolved handle is dereferenced through
/// [`ReferenceHandle::get_or_resolve`]. Closures of the matching signature
/// implement the trait.
pub trait StubFactory: Send + Sync {
    fn create_stub(&self, handle: &ReferenceHandle) -> Result<Object, String>;
}

impl<F> StubFactory for F
where
    F: Fn(&ReferenceHandle) -> Result<Object, String> + Send + Sync,
{
    fn create_stub(&self, handle: &ReferenceHandle) -> Result<Object, String> {
        self(handle)
    }
}
