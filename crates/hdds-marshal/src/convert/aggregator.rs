// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-target-type converter collection with a resolved-list cache.
//!
//! Two levels:
//! - `exact`: source type -> converters registered for exactly that type
//! - `resolved`: runtime type -> priority-sorted candidates gathered over the
//!   type's linearized supertypes
//!
//! The resolved cache is an immutable snapshot behind `ArcSwap`: lookups are a
//! single atomic load, misses rebuild one entry and publish a new snapshot
//! (recompute-and-replace). Two threads missing on the same type may both
//! rebuild; the results are identical.

use super::converter::ConverterRef;
use super::ConversionRegistry;
use crate::config::CachePolicy;
use crate::error::ConversionError;
use crate::types::{TypeHierarchy, TypeKey};
use crate::value::Value;
use arc_swap::ArcSwap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Snapshot of resolved candidate lists.
///
/// `generation` is the converter-set generation the snapshot is valid for;
/// `hierarchy_generation` the type hierarchy generation.
#[derive(Default)]
struct ResolvedCache {
    generation: u64,
    hierarchy_generation: u64,
    entries: HashMap<TypeKey, Arc<[ConverterRef]>>,
}

/// Cache hit/miss statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorStats {
    pub hits: u64,
    pub misses: u64,
    pub cached_types: usize,
    pub converters: usize,
}

/// All converters producing one target type.
pub struct ConversionAggregator {
    target: TypeKey,
    hierarchy: Arc<TypeHierarchy>,
    policy: CachePolicy,
    exact: RwLock<HashMap<TypeKey, Vec<ConverterRef>>>,
    resolved: ArcSwap<ResolvedCache>,
    generation: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ConversionAggregator {
    pub fn new(target: TypeKey, hierarchy: Arc<TypeHierarchy>, policy: CachePolicy) -> Self {
        let hierarchy_generation = hierarchy.generation();
        Self {
            target,
            hierarchy,
            policy,
            exact: RwLock::new(HashMap::new()),
            resolved: ArcSwap::from_pointee(ResolvedCache {
                hierarchy_generation,
                ..ResolvedCache::default()
            }),
            generation: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn target(&self) -> TypeKey {
        self.target
    }

    // ===================================================================
    // Registration
    // ===================================================================

    /// Add a converter under its exact source type.
    pub fn register(&self, converter: ConverterRef) {
        let source = converter.source_type();
        let mut exact = self.exact.write();
        log::debug!(
            "[convert] registered '{}' ({} -> {}, priority {})",
            converter.name(),
            source,
            self.target,
            converter.priority()
        );
        exact.entry(source).or_default().push(converter);
        self.invalidate_locked(source);
    }

    /// Remove a converter (matched by identity). Returns false if unknown.
    pub fn unregister(&self, converter: &ConverterRef) -> bool {
        let source = converter.source_type();
        let mut exact = self.exact.write();
        let Some(list) = exact.get_mut(&source) else {
            return false;
        };
        let before = list.len();
        list.retain(|c| !Arc::ptr_eq(c, converter));
        if list.len() == before {
            return false;
        }
        if list.is_empty() {
            exact.remove(&source);
        }
        log::debug!(
            "[convert] unregistered '{}' ({} -> {})",
            converter.name(),
            source,
            self.target
        );
        self.invalidate_locked(source);
        true
    }

    /// Drop cached lists that may contain converters for `source`.
    ///
    /// Caller holds the `exact` write lock, so no resolver can read the
    /// converter set between the bump and the publish.
    fn invalidate_locked(&self, source: TypeKey) {
        if self.policy == CachePolicy::Historical {
            return;
        }
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let hierarchy = &self.hierarchy;
        self.resolved.rcu(|current| {
            let entries = current
                .entries
                .iter()
                .filter(|(ty, _)| !hierarchy.supertypes(**ty).contains(&source))
                .map(|(ty, list)| (*ty, Arc::clone(list)))
                .collect();
            ResolvedCache {
                generation,
                hierarchy_generation: current.hierarchy_generation,
                entries,
            }
        });
    }

    // ===================================================================
    // Resolution
    // ===================================================================

    /// Priority-sorted candidates for values of runtime type `ty`.
    pub fn resolve(&self, ty: TypeKey) -> Arc<[ConverterRef]> {
        let hierarchy_generation = self.hierarchy.generation();
        {
            let cache = self.resolved.load();
            if cache.hierarchy_generation == hierarchy_generation {
                if let Some(hit) = cache.entries.get(&ty) {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Arc::clone(hit);
                }
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let (generation, list) = {
            let exact = self.exact.read();
            let generation = self.generation.load(Ordering::Acquire);
            (generation, self.collect(&exact, ty))
        };
        self.publish(ty, &list, generation, hierarchy_generation);
        list
    }

    fn collect(
        &self,
        exact: &HashMap<TypeKey, Vec<ConverterRef>>,
        ty: TypeKey,
    ) -> Arc<[ConverterRef]> {
        let mut candidates: Vec<ConverterRef> = self
            .hierarchy
            .supertypes(ty)
            .iter()
            .filter_map(|supertype| exact.get(supertype))
            .flatten()
            .cloned()
            .collect();
        // Stable: equal priorities keep discovery order
        candidates.sort_by_key(|c| c.priority());
        log::trace!(
            "[convert] resolved {} candidate(s) for {} -> {}",
            candidates.len(),
            ty,
            self.target
        );
        candidates.into()
    }

    fn publish(
        &self,
        ty: TypeKey,
        list: &Arc<[ConverterRef]>,
        generation: u64,
        hierarchy_generation: u64,
    ) {
        self.resolved.rcu(|current| {
            // A registration or a newer hierarchy made this list stale
            if current.generation != generation
                || current.hierarchy_generation > hierarchy_generation
            {
                return Arc::clone(current);
            }
            let mut entries = if current.hierarchy_generation == hierarchy_generation {
                current.entries.clone()
            } else {
                HashMap::new()
            };
            entries.insert(ty, Arc::clone(list));
            Arc::new(ResolvedCache {
                generation,
                hierarchy_generation,
                entries,
            })
        });
    }

    // ===================================================================
    // Conversion
    // ===================================================================

    /// Try candidates in order; fall back to the canonical two-hop path when
    /// all of them decline.
    pub(crate) fn convert(
        &self,
        value: &Value,
        registry: &ConversionRegistry,
        depth: usize,
    ) -> Result<Value, ConversionError> {
        let source = value.type_key();
        for converter in self.resolve(source).iter() {
            if let Some(converted) = converter.convert(value, registry)? {
                return Ok(converted);
            }
        }
        self.canonical_fallback(value, source, registry, depth)
    }

    fn canonical_fallback(
        &self,
        value: &Value,
        source: TypeKey,
        registry: &ConversionRegistry,
        depth: usize,
    ) -> Result<Value, ConversionError> {
        let canonical_key = TypeKey::canonical();
        if self.target == canonical_key {
            return Err(ConversionError::no_converter(source, self.target));
        }
        let limit = registry.config().max_fallback_depth;
        if depth >= limit {
            return Err(ConversionError::FallbackDepthExceeded {
                from: source,
                to: self.target,
                limit,
            });
        }

        let canonical = registry
            .convert_at_depth(value, canonical_key, depth + 1)
            .map_err(|e| self.rename_no_converter(e, source))?;
        if canonical.same_ref(value) {
            log::trace!(
                "[convert] {} is its own canonical form, no path to {}",
                source,
                self.target
            );
            return Err(ConversionError::no_converter(source, self.target));
        }

        log::trace!(
            "[convert] canonical fallback {} -> {} -> {}",
            source,
            canonical.type_key(),
            self.target
        );
        registry
            .convert_at_depth(&canonical, self.target, depth + 1)
            .map_err(|e| self.rename_no_converter(e, source))
    }

    /// Report fallback dead ends against the original source and target.
    fn rename_no_converter(&self, error: ConversionError, source: TypeKey) -> ConversionError {
        match error {
            ConversionError::NoConverter { .. } => {
                ConversionError::no_converter(source, self.target)
            }
            other => other,
        }
    }

    // ===================================================================
    // Introspection
    // ===================================================================

    /// Number of registered converters.
    pub fn len(&self) -> usize {
        self.exact.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> AggregatorStats {
        AggregatorStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            cached_types: self.resolved.load().entries.len(),
            converters: self.len(),
        }
    }
}

impl std::fmt::Debug for ConversionAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionAggregator")
            .field("target", &self.target)
            .field("policy", &self.policy)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests;
