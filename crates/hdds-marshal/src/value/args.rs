// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Named-argument records.

use super::Value;
use parking_lot::RwLock;
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

thread_local! {
    /// Record pairs being compared on this thread, by address.
    static COMPARING: RefCell<Vec<(usize, usize)>> = const { RefCell::new(Vec::new()) };
    /// Records being formatted on this thread, by address.
    static FORMATTING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Pops the entry pushed on a visit stack when dropped.
struct Visit<T: 'static> {
    stack: &'static std::thread::LocalKey<RefCell<Vec<T>>>,
}

impl<T: PartialEq + 'static> Visit<T> {
    /// Push `entry`, or `None` when it is already on the stack.
    fn enter(stack: &'static std::thread::LocalKey<RefCell<Vec<T>>>, entry: T) -> Option<Self> {
        stack.with(|visiting| {
            let mut visiting = visiting.borrow_mut();
            if visiting.contains(&entry) {
                return None;
            }
            visiting.push(entry);
            Some(Self { stack })
        })
    }
}

impl<T: 'static> Drop for Visit<T> {
    fn drop(&mut self) {
        self.stack.with(|visiting| {
            visiting.borrow_mut().pop();
        });
    }
}

/// One `name = value` binding with a mutable value slot.
pub struct Binding {
    name: Arc<str>,
    value: RwLock<Value>,
}

impl Binding {
    pub fn new(name: impl Into<Arc<str>>, value: Value) -> Self {
        Self {
            name: name.into(),
            value: RwLock::new(value),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the current value.
    pub fn value(&self) -> Value {
        self.value.read().clone()
    }

    /// Overwrite the slot, returning the previous value.
    pub fn set(&self, value: Value) -> Value {
        std::mem::replace(&mut *self.value.write(), value)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}", self.name, self.value())
    }
}

/// Ordered record of named arguments.
///
/// The binding list is fixed at construction; the values are mutable through
/// a shared reference, which is what in-place unmarshalling relies on.
///
/// A record may hold itself, directly or through nested values. Equality
/// treats a pair of records met again during the same comparison as equal,
/// and `Debug` prints a record met again during its own formatting as
/// `NamedArgs@<address>`.
///
/// ```
/// use hdds_marshal::{NamedArgs, Value};
///
/// let args = NamedArgs::new().with("x", 1).with("y", "two");
/// assert_eq!(args.len(), 2);
/// assert_eq!(args.get("x"), Some(Value::Int(1)));
/// ```
#[derive(Default)]
pub struct NamedArgs {
    bindings: Vec<Binding>,
}

impl NamedArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding (builder style).
    #[must_use]
    pub fn with(mut self, name: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        self.bindings.push(Binding::new(name, value.into()));
        self
    }

    pub fn from_pairs<N, I>(pairs: I) -> Self
    where
        N: Into<Arc<str>>,
        I: IntoIterator<Item = (N, Value)>,
    {
        Self {
            bindings: pairs
                .into_iter()
                .map(|(name, value)| Binding::new(name, value))
                .collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Binding> {
        self.bindings.iter()
    }

    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.binding(name).map(Binding::value)
    }

    /// Overwrite an existing binding. Returns false when `name` is unknown.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> bool {
        match self.binding(name) {
            Some(binding) => {
                binding.set(value.into());
                true
            }
            None => false,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(Binding::name)
    }
}

impl Clone for NamedArgs {
    /// Snapshot copy: new slots holding the current values.
    fn clone(&self) -> Self {
        Self::from_pairs(
            self.bindings
                .iter()
                .map(|b| (Arc::clone(&b.name), b.value())),
        )
    }
}

impl NamedArgs {
    #[inline]
    fn address(&self) -> usize {
        self as *const Self as usize
    }
}

impl PartialEq for NamedArgs {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if self.len() != other.len() {
            return false;
        }
        let Some(_visit) = Visit::enter(&COMPARING, (self.address(), other.address())) else {
            return true;
        };
        self.iter()
            .zip(other.iter())
            .all(|(a, b)| a.name() == b.name() && a.value() == b.value())
    }
}

impl fmt::Debug for NamedArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(_visit) = Visit::enter(&FORMATTING, self.address()) else {
            return write!(f, "NamedArgs@{:p}", self);
        };
        f.debug_list().entries(self.bindings.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a NamedArgs {
    type Item = &'a Binding;
    type IntoIter = std::slice::Iter<'a, Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
