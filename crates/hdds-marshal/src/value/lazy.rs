// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Lazily produced value sequences.

use super::Value;
use crate::error::MarshalError;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Item pulled from a [`LazySeq`]. Errors come from on-demand marshalling.
pub type LazyItem = Result<Value, MarshalError>;

type Source = Box<dyn Iterator<Item = LazyItem> + Send>;

/// Shared pull-once sequence.
///
/// Clones share the same cursor: an element pulled through one clone is not
/// seen by the others. The sequence may be drained on another thread than the
/// one that built it.
#[derive(Clone)]
pub struct LazySeq {
    source: Arc<Mutex<Source>>,
}

impl LazySeq {
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: Send + 'static,
    {
        Self::from_results(values.into_iter().map(Ok))
    }

    pub fn from_results<I>(items: I) -> Self
    where
        I: IntoIterator<Item = LazyItem>,
        I::IntoIter: Send + 'static,
    {
        Self {
            source: Arc::new(Mutex::new(Box::new(items.into_iter()))),
        }
    }

    /// Pull the next element.
    pub fn pull(&self) -> Option<LazyItem> {
        self.source.lock().next()
    }

    /// Drain the remaining elements, stopping at the first error.
    pub fn drain(&self) -> Result<Vec<Value>, MarshalError> {
        let mut values = Vec::new();
        while let Some(item) = self.pull() {
            values.push(item?);
        }
        Ok(values)
    }

    /// Identity comparison.
    #[inline]
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.source, &other.source)
    }
}

impl Iterator for LazySeq {
    type Item = LazyItem;

    fn next(&mut self) -> Option<Self::Item> {
        self.pull()
    }
}

impl fmt::Debug for LazySeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LazySeq@{:p}", Arc::as_ptr(&self.source))
    }
}
