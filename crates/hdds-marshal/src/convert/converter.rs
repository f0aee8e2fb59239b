// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Converter trait and closure-backed converters.

use super::ConversionRegistry;
use crate::error::ConversionError;
use crate::types::TypeKey;
use crate::value::{Object, Value};
use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

/// Outcome of a single converter.
///
/// - `Ok(Some(v))`: converted (`v` may be `Value::Null`)
/// - `Ok(None)`: not applicable, the next candidate is tried
/// - `Err(_)`: hard failure, surfaced to the caller
pub type ConvertResult = Result<Option<Value>, ConversionError>;

/// Shared converter reference, as stored by the registry.
pub type ConverterRef = Arc<dyn Converter>;

/// One conversion rule from `source_type` to `target_type`.
///
/// Candidates are tried in ascending `priority`; equal priorities keep
/// registration order.
pub trait Converter: Send + Sync {
    fn source_type(&self) -> TypeKey;

    fn target_type(&self) -> TypeKey;

    fn priority(&self) -> i32 {
        0
    }

    /// Convert `value`. The registry is available for nested conversions.
    fn convert(&self, value: &Value, registry: &ConversionRegistry) -> ConvertResult;

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

type ConvertFn = dyn Fn(&Value, &ConversionRegistry) -> ConvertResult + Send + Sync;

/// Converter backed by a closure.
///
/// ```
/// use hdds_marshal::convert::{ConversionRegistry, FnConverter};
/// use hdds_marshal::Value;
///
/// struct Celsius(f64);
/// struct Fahrenheit(f64);
///
/// let registry = ConversionRegistry::new();
/// registry.register(FnConverter::typed::<Celsius, Fahrenheit, _>(0, |c| {
///     Some(Fahrenheit(c.0 * 9.0 / 5.0 + 32.0))
/// }));
///
/// let converted = registry
///     .convert_to::<Fahrenheit>(&Value::object(Celsius(100.0)))
///     .unwrap();
/// assert_eq!(converted.downcast_ref::<Fahrenheit>().unwrap().0, 212.0);
/// ```
pub struct FnConverter {
    source: TypeKey,
    target: TypeKey,
    priority: i32,
    name: Cow<'static, str>,
    func: Box<ConvertFn>,
}

impl FnConverter {
    pub fn new<F>(source: TypeKey, target: TypeKey, priority: i32, func: F) -> Self
    where
        F: Fn(&Value, &ConversionRegistry) -> ConvertResult + Send + Sync + 'static,
    {
        Self {
            source,
            target,
            priority,
            name: Cow::Owned(format!("{}->{}", source, target)),
            func: Box::new(func),
        }
    }

    /// Converter between two object types. Values that are not an `S`
    /// object, and `None` returned by `func`, are reported as not applicable.
    pub fn typed<S, T, F>(priority: i32, func: F) -> Self
    where
        S: Any + Send + Sync,
        T: Any + Send + Sync,
        F: Fn(&S) -> Option<T> + Send + Sync + 'static,
    {
        Self::new(
            TypeKey::of::<S>(),
            TypeKey::of::<T>(),
            priority,
            move |value, _| {
                Ok(value
                    .downcast_ref::<S>()
                    .and_then(&func)
                    .map(|t| Value::Object(Object::new(t))))
            },
        )
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }
}

impl Converter for FnConverter {
    fn source_type(&self) -> TypeKey {
        self.source
    }

    fn target_type(&self) -> TypeKey {
        self.target
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn convert(&self, value: &Value, registry: &ConversionRegistry) -> ConvertResult {
        (self.func)(value, registry)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for FnConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnConverter")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish()
    }
}
