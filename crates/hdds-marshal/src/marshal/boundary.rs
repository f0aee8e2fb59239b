// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in converters to the `Boundary` marker type.

use crate::convert::{ConversionRegistry, ConvertResult, Converter, ConverterRef};
use crate::error::ConversionError;
use crate::reference::{ReferenceHandle, ReferenceScope};
use crate::types::TypeKey;
use crate::value::Value;
use std::sync::Arc;

/// Handle -> its `ipc://resolve/<id>` token.
#[derive(Debug, Default, Clone, Copy)]
pub struct HandleTokenConverter;

impl Converter for HandleTokenConverter {
    fn source_type(&self) -> TypeKey {
        TypeKey::of::<ReferenceHandle>()
    }

    fn target_type(&self) -> TypeKey {
        TypeKey::boundary()
    }

    fn convert(&self, value: &Value, _: &ConversionRegistry) -> ConvertResult {
        Ok(value.as_handle().map(|handle| Value::from(handle.id())))
    }

    fn name(&self) -> &str {
        "handle-token"
    }
}

/// Objects whose type declares the `Referenceable` capability are exported
/// through the ambient [`ReferenceScope`] and replaced by their token.
///
/// Fails when no scope is active.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExportConverter;

impl Converter for ExportConverter {
    fn source_type(&self) -> TypeKey {
        TypeKey::referenceable()
    }

    fn target_type(&self) -> TypeKey {
        TypeKey::boundary()
    }

    fn convert(&self, value: &Value, _: &ConversionRegistry) -> ConvertResult {
        let Some(object) = value.as_object() else {
            return Ok(None);
        };
        let scope = ReferenceScope::current().ok_or_else(|| {
            ConversionError::failed(
                object.type_key(),
                TypeKey::boundary(),
                "no active reference scope to export into",
            )
        })?;
        Ok(Some(Value::from(scope.export_object(object).id())))
    }

    fn name(&self) -> &str {
        "export-referenceable"
    }
}

/// Any value crosses unchanged. Registered last so every other boundary
/// rule takes precedence.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughConverter;

impl Converter for PassthroughConverter {
    fn source_type(&self) -> TypeKey {
        TypeKey::any()
    }

    fn target_type(&self) -> TypeKey {
        TypeKey::boundary()
    }

    fn priority(&self) -> i32 {
        i32::MAX
    }

    fn convert(&self, value: &Value, _: &ConversionRegistry) -> ConvertResult {
        Ok(Some(value.clone()))
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}

/// Register the built-in boundary converters, returning them for later
/// unregistration.
pub fn install_boundary_converters(registry: &ConversionRegistry) -> Vec<ConverterRef> {
    let converters: Vec<ConverterRef> = vec![
        Arc::new(HandleTokenConverter),
        Arc::new(ExportConverter),
        Arc::new(PassthroughConverter),
    ];
    for converter in &converters {
        registry.register_converter(Arc::clone(converter));
    }
    converters
}
