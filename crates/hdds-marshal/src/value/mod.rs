// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic value model walked by the converter registry and the marshaller.
//!
//! Composite variants are reference-counted so that "unchanged" can be
//! expressed as "same allocation": [`Value::same_ref`] compares pointers for
//! shared variants and values for scalars.

mod args;
mod lazy;
mod object;

pub use args::{Binding, NamedArgs};
pub use lazy::{LazyItem, LazySeq};
pub use object::{Object, ObjectId};

use crate::reference::ReferenceHandle;
use crate::types::TypeKey;
use std::collections::BTreeMap;
use std::sync::Arc;

/// String-keyed map of values.
pub type ValueMap = BTreeMap<String, Value>;

/// A dynamic value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),

    // Composites
    Args(Arc<NamedArgs>),
    Map(Arc<ValueMap>),
    Array(Arc<[Value]>),
    List(Arc<Vec<Value>>),
    Lazy(LazySeq),

    // Leaves with identity
    Object(Object),
    Handle(ReferenceHandle),
}

impl Value {
    pub fn object<T: std::any::Any + Send + Sync>(value: T) -> Self {
        Self::Object(Object::new(value))
    }

    pub fn args(args: NamedArgs) -> Self {
        Self::Args(Arc::new(args))
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Map(Arc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Array(items.into_iter().collect())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::List(Arc::new(items.into_iter().collect()))
    }

    /// Runtime type used for converter dispatch.
    pub fn type_key(&self) -> TypeKey {
        match self {
            Self::Null => TypeKey::undefined(),
            Self::Bool(_) => TypeKey::of::<bool>(),
            Self::Int(_) => TypeKey::of::<i64>(),
            Self::Float(_) => TypeKey::of::<f64>(),
            Self::Str(_) => TypeKey::of::<str>(),
            Self::Args(_) => TypeKey::of::<NamedArgs>(),
            Self::Map(_) => TypeKey::of::<ValueMap>(),
            Self::Array(_) => TypeKey::of::<[Value]>(),
            Self::List(_) => TypeKey::of::<Vec<Value>>(),
            Self::Lazy(_) => TypeKey::of::<LazySeq>(),
            Self::Object(o) => o.type_key(),
            Self::Handle(_) => TypeKey::of::<ReferenceHandle>(),
        }
    }

    /// Short variant name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Args(_) => "args",
            Self::Map(_) => "map",
            Self::Array(_) => "array",
            Self::List(_) => "list",
            Self::Lazy(_) => "lazy",
            Self::Object(_) => "object",
            Self::Handle(_) => "handle",
        }
    }

    /// Reference identity: pointer equality for shared variants, value
    /// equality for scalars (which have no identity of their own).
    pub fn same_ref(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Str(a), Self::Str(b)) => Arc::ptr_eq(a, b) || a == b,
            (Self::Args(a), Self::Args(b)) => Arc::ptr_eq(a, b),
            (Self::Map(a), Self::Map(b)) => Arc::ptr_eq(a, b),
            (Self::Array(a), Self::Array(b)) => Arc::ptr_eq(a, b),
            (Self::List(a), Self::List(b)) => Arc::ptr_eq(a, b),
            (Self::Lazy(a), Self::Lazy(b)) => a.same(b),
            (Self::Object(a), Self::Object(b)) => a.same(b),
            (Self::Handle(a), Self::Handle(b)) => a == b,
            _ => false,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_args(&self) -> Option<&Arc<NamedArgs>> {
        match self {
            Self::Args(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_handle(&self) -> Option<&ReferenceHandle> {
        match self {
            Self::Handle(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow the payload of an `Object` value as `T`.
    pub fn downcast_ref<T: std::any::Any>(&self) -> Option<&T> {
        self.as_object().and_then(Object::downcast_ref::<T>)
    }
}

impl PartialEq for Value {
    /// Structural equality. Objects, handles and lazy sequences compare by
    /// identity.
    fn eq(&self, other: &Self) -> bool {
        if self.same_ref(other) {
            return true;
        }
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Args(a), Self::Args(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v.into())
    }
}

impl From<Arc<str>> for Value {
    fn from(v: Arc<str>) -> Self {
        Self::Str(v)
    }
}

impl From<NamedArgs> for Value {
    fn from(v: NamedArgs) -> Self {
        Self::args(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(Arc::new(v))
    }
}

impl From<ValueMap> for Value {
    fn from(v: ValueMap) -> Self {
        Self::Map(Arc::new(v))
    }
}

impl From<LazySeq> for Value {
    fn from(v: LazySeq) -> Self {
        Self::Lazy(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Self::Object(v)
    }
}

impl From<ReferenceHandle> for Value {
    fn from(v: ReferenceHandle) -> Self {
        Self::Handle(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
