// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conversion registry: the single entry point for "convert X to T".

use super::aggregator::{AggregatorStats, ConversionAggregator};
use super::converter::{Converter, ConverterRef};
use crate::config::BridgeConfig;
use crate::error::ConversionError;
use crate::types::{TypeHierarchy, TypeKey};
use crate::value::Value;
use dashmap::DashMap;
use std::sync::{Arc, OnceLock};

/// Process-wide registry, created on first use with default configuration.
static GLOBAL_REGISTRY: OnceLock<Arc<ConversionRegistry>> = OnceLock::new();

/// Owns one [`ConversionAggregator`] per target type.
///
/// Registries are plain context objects: create one per application (or per
/// test) and pass it where conversions happen. [`ConversionRegistry::global`]
/// exists for callers that need a process-wide instance.
pub struct ConversionRegistry {
    hierarchy: Arc<TypeHierarchy>,
    aggregators: DashMap<TypeKey, Arc<ConversionAggregator>>,
    config: BridgeConfig,
}

impl ConversionRegistry {
    pub fn new() -> Self {
        Self::with_config(BridgeConfig::default())
    }

    pub fn with_config(config: BridgeConfig) -> Self {
        Self::with_hierarchy(Arc::new(TypeHierarchy::new()), config)
    }

    /// Registry sharing an existing type hierarchy.
    pub fn with_hierarchy(hierarchy: Arc<TypeHierarchy>, config: BridgeConfig) -> Self {
        Self {
            hierarchy,
            aggregators: DashMap::new(),
            config,
        }
    }

    /// Process-wide registry.
    ///
    /// Initialized by the first call to [`install_global`](Self::install_global)
    /// or, failing that, lazily with [`BridgeConfig::default`]. It lives until
    /// process exit.
    pub fn global() -> &'static Arc<ConversionRegistry> {
        GLOBAL_REGISTRY.get_or_init(|| Arc::new(Self::new()))
    }

    /// Install `registry` as the process-wide instance.
    ///
    /// Fails (returning the argument) if the global registry already exists.
    pub fn install_global(
        registry: Arc<ConversionRegistry>,
    ) -> Result<(), Arc<ConversionRegistry>> {
        GLOBAL_REGISTRY.set(registry)
    }

    #[inline]
    pub fn hierarchy(&self) -> &Arc<TypeHierarchy> {
        &self.hierarchy
    }

    #[inline]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    // ===================================================================
    // Conversion
    // ===================================================================

    /// Convert `value` to `target`.
    ///
    /// - `Null` converts to `Null`
    /// - values already satisfying `target` (or any value when `target` is
    ///   `AnyType`) are returned unchanged, without invoking a converter
    /// - otherwise the aggregator for `target` picks the converter
    pub fn convert(&self, value: &Value, target: TypeKey) -> Result<Value, ConversionError> {
        self.convert_at_depth(value, target, 0)
    }

    /// [`convert`](Self::convert) with the target given as a type parameter.
    pub fn convert_to<T: ?Sized + 'static>(
        &self,
        value: &Value,
    ) -> Result<Value, ConversionError> {
        self.convert(value, TypeKey::of::<T>())
    }

    pub(crate) fn convert_at_depth(
        &self,
        value: &Value,
        target: TypeKey,
        depth: usize,
    ) -> Result<Value, ConversionError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        if self.hierarchy.is_assignable(value.type_key(), target) {
            return Ok(value.clone());
        }
        self.aggregator_or_insert(target).convert(value, self, depth)
    }

    // ===================================================================
    // Registration
    // ===================================================================

    /// Register a converter, returning the shared reference needed to
    /// unregister it.
    pub fn register<C: Converter + 'static>(&self, converter: C) -> ConverterRef {
        let converter: ConverterRef = Arc::new(converter);
        self.register_converter(Arc::clone(&converter));
        converter
    }

    /// Register an already shared converter under its target type.
    pub fn register_converter(&self, converter: ConverterRef) {
        self.aggregator_or_insert(converter.target_type()).register(converter);
    }

    /// Unregister a converter (matched by identity). Returns false if it was
    /// not registered.
    pub fn unregister_converter(&self, converter: &ConverterRef) -> bool {
        self.aggregator(converter.target_type())
            .is_some_and(|aggregator| aggregator.unregister(converter))
    }

    // ===================================================================
    // Introspection
    // ===================================================================

    /// Aggregator for `target`, if one was ever created.
    pub fn aggregator(&self, target: TypeKey) -> Option<Arc<ConversionAggregator>> {
        self.aggregators
            .get(&target)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn stats(&self, target: TypeKey) -> Option<AggregatorStats> {
        self.aggregator(target).map(|aggregator| aggregator.stats())
    }

    /// Target types with an aggregator.
    pub fn targets(&self) -> Vec<TypeKey> {
        self.aggregators.iter().map(|entry| *entry.key()).collect()
    }

    /// The shard guard is released before returning, so conversions may
    /// re-enter the registry.
    fn aggregator_or_insert(&self, target: TypeKey) -> Arc<ConversionAggregator> {
        if let Some(existing) = self.aggregator(target) {
            return existing;
        }
        let entry = self.aggregators.entry(target).or_insert_with(|| {
            log::debug!("[convert] created aggregator for {}", target);
            Arc::new(ConversionAggregator::new(
                target,
                Arc::clone(&self.hierarchy),
                self.config.cache_policy,
            ))
        });
        Arc::clone(entry.value())
    }
}

impl Default for ConversionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConversionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionRegistry")
            .field("targets", &self.aggregators.len())
            .field("config", &self.config)
            .finish()
    }
}
