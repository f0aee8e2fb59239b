// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tests for ConversionAggregator caching.

use super::*;
use crate::convert::FnConverter;
use crate::types::Referenceable;

struct Animal;
struct Dog;
struct Target;

fn decline(source: TypeKey, priority: i32) -> ConverterRef {
    Arc::new(FnConverter::new(
        source,
        TypeKey::of::<Target>(),
        priority,
        |_, _| Ok(None),
    ))
}

fn aggregator(policy: CachePolicy) -> (Arc<TypeHierarchy>, ConversionAggregator) {
    let hierarchy = Arc::new(TypeHierarchy::new());
    hierarchy.set_parent(TypeKey::of::<Dog>(), TypeKey::of::<Animal>());
    let aggregator = ConversionAggregator::new(
        TypeKey::of::<Target>(),
        Arc::clone(&hierarchy),
        policy,
    );
    (hierarchy, aggregator)
}

#[test]
fn test_resolve_walks_parent_and_sorts_by_priority() {
    let (_, aggregator) = aggregator(CachePolicy::Invalidate);
    let on_animal = decline(TypeKey::of::<Animal>(), 1);
    let on_dog = decline(TypeKey::of::<Dog>(), 5);
    let on_any = decline(TypeKey::any(), 0);
    aggregator.register(Arc::clone(&on_dog));
    aggregator.register(Arc::clone(&on_animal));
    aggregator.register(Arc::clone(&on_any));

    let resolved = aggregator.resolve(TypeKey::of::<Dog>());
    assert_eq!(resolved.len(), 3);
    assert!(Arc::ptr_eq(&resolved[0], &on_any));
    assert!(Arc::ptr_eq(&resolved[1], &on_animal));
    assert!(Arc::ptr_eq(&resolved[2], &on_dog));

    // Animal does not see Dog converters
    let resolved = aggregator.resolve(TypeKey::of::<Animal>());
    assert_eq!(resolved.len(), 2);
}

#[test]
fn test_equal_priorities_keep_registration_order() {
    let (_, aggregator) = aggregator(CachePolicy::Invalidate);
    let mut registered = Vec::new();
    for _ in 0..8 {
        let converter = decline(TypeKey::of::<Dog>(), 3);
        aggregator.register(Arc::clone(&converter));
        registered.push(converter);
    }

    let resolved = aggregator.resolve(TypeKey::of::<Dog>());
    for (a, b) in resolved.iter().zip(registered.iter()) {
        assert!(Arc::ptr_eq(a, b));
    }
}

#[test]
fn test_second_resolve_hits_cache() {
    let (_, aggregator) = aggregator(CachePolicy::Invalidate);
    aggregator.register(decline(TypeKey::of::<Dog>(), 0));

    let first = aggregator.resolve(TypeKey::of::<Dog>());
    let second = aggregator.resolve(TypeKey::of::<Dog>());
    assert!(Arc::ptr_eq(&first, &second));

    let stats = aggregator.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.cached_types, 1);
    assert_eq!(stats.converters, 1);
}

#[test]
fn test_late_registration_invalidates_affected_entries() {
    let (_, aggregator) = aggregator(CachePolicy::Invalidate);
    aggregator.register(decline(TypeKey::of::<Dog>(), 0));
    struct Unrelated;

    assert_eq!(aggregator.resolve(TypeKey::of::<Dog>()).len(), 1);
    assert_eq!(aggregator.resolve(TypeKey::of::<Unrelated>()).len(), 0);
    assert_eq!(aggregator.stats().cached_types, 2);

    aggregator.register(decline(TypeKey::of::<Animal>(), 0));

    // Dog's list was dropped, Unrelated's kept
    assert_eq!(aggregator.stats().cached_types, 1);
    assert_eq!(aggregator.resolve(TypeKey::of::<Dog>()).len(), 2);
}

#[test]
fn test_historical_policy_serves_stale_lists() {
    let (_, aggregator) = aggregator(CachePolicy::Historical);
    aggregator.register(decline(TypeKey::of::<Dog>(), 0));
    assert_eq!(aggregator.resolve(TypeKey::of::<Dog>()).len(), 1);

    aggregator.register(decline(TypeKey::of::<Animal>(), 0));
    assert_eq!(aggregator.resolve(TypeKey::of::<Dog>()).len(), 1);
    assert_eq!(aggregator.len(), 2);
}

#[test]
fn test_unregister_invalidates_and_reports_unknown() {
    let (_, aggregator) = aggregator(CachePolicy::Invalidate);
    let converter = decline(TypeKey::of::<Animal>(), 0);
    aggregator.register(Arc::clone(&converter));
    assert_eq!(aggregator.resolve(TypeKey::of::<Dog>()).len(), 1);

    assert!(aggregator.unregister(&converter));
    assert!(!aggregator.unregister(&converter));
    assert!(aggregator.resolve(TypeKey::of::<Dog>()).is_empty());
    assert!(aggregator.is_empty());
}

#[test]
fn test_hierarchy_change_drops_cached_lists() {
    let (hierarchy, aggregator) = aggregator(CachePolicy::Invalidate);
    aggregator.register(decline(TypeKey::of::<Referenceable>(), 0));
    assert!(aggregator.resolve(TypeKey::of::<Dog>()).is_empty());

    hierarchy.add_capability(TypeKey::of::<Animal>(), TypeKey::of::<Referenceable>());
    assert_eq!(aggregator.resolve(TypeKey::of::<Dog>()).len(), 1);
}

#[test]
fn test_concurrent_resolve_and_register() {
    let (_, aggregator) = aggregator(CachePolicy::Invalidate);
    let aggregator = Arc::new(aggregator);

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let aggregator = Arc::clone(&aggregator);
            std::thread::spawn(move || {
                for _ in 0..500 {
                    let _ = aggregator.resolve(TypeKey::of::<Dog>());
                }
            })
        })
        .collect();
    for priority in 0..50 {
        aggregator.register(decline(TypeKey::of::<Animal>(), priority));
    }
    for reader in readers {
        reader.join().expect("reader thread");
    }

    // Whatever the interleaving, nothing stale survives the last registration
    assert_eq!(aggregator.resolve(TypeKey::of::<Dog>()).len(), 50);
}
