// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dispatch tests for ConversionRegistry.

use super::*;
use crate::config::{BridgeConfig, CachePolicy};
use crate::error::ConversionError;
use crate::types::{Canonical, TypeKey};
use crate::value::{Object, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, PartialEq)]
struct Source(i64);
#[derive(Debug, PartialEq)]
struct Target(i64);
#[derive(Debug, PartialEq)]
struct Normalized(i64);

fn source_to_target<F>(priority: i32, func: F) -> FnConverter
where
    F: Fn(&Source) -> Option<Target> + Send + Sync + 'static,
{
    FnConverter::typed::<Source, Target, _>(priority, func)
}

#[test]
fn test_doubling_converter_scenario() {
    let registry = ConversionRegistry::new();
    registry.register(source_to_target(0, |s| Some(Target(s.0 * 2))));

    let converted = registry
        .convert_to::<Target>(&Value::object(Source(21)))
        .expect("convert");
    assert_eq!(converted.downcast_ref::<Target>(), Some(&Target(42)));
}

#[test]
fn test_lower_priority_tried_first() {
    let registry = ConversionRegistry::new();
    registry.register(source_to_target(2, |_| Some(Target(2))));
    registry.register(source_to_target(1, |_| Some(Target(1))));

    let converted = registry
        .convert_to::<Target>(&Value::object(Source(0)))
        .expect("convert");
    assert_eq!(converted.downcast_ref::<Target>(), Some(&Target(1)));
}

#[test]
fn test_decline_falls_through_to_next_candidate() {
    let registry = ConversionRegistry::new();
    let first_calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&first_calls);
    registry.register(source_to_target(1, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        None
    }));
    registry.register(source_to_target(2, |s| Some(Target(s.0 + 100))));

    let converted = registry
        .convert_to::<Target>(&Value::object(Source(1)))
        .expect("convert");
    assert_eq!(converted.downcast_ref::<Target>(), Some(&Target(101)));
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_first_success_short_circuits() {
    let registry = ConversionRegistry::new();
    let later_calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&later_calls);
    registry.register(source_to_target(1, |_| Some(Target(1))));
    registry.register(source_to_target(2, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Some(Target(2))
    }));

    registry
        .convert_to::<Target>(&Value::object(Source(0)))
        .expect("convert");
    assert_eq!(later_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_legitimate_null_result_is_not_a_decline() {
    let registry = ConversionRegistry::new();
    registry.register(FnConverter::new(
        TypeKey::of::<Source>(),
        TypeKey::of::<Target>(),
        1,
        |_, _| Ok(Some(Value::Null)),
    ));
    registry.register(source_to_target(2, |_| Some(Target(2))));

    let converted = registry
        .convert_to::<Target>(&Value::object(Source(0)))
        .expect("convert");
    assert!(converted.is_null());
}

#[test]
fn test_null_and_assignable_values_bypass_converters() {
    let registry = ConversionRegistry::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    registry.register(FnConverter::new(
        TypeKey::any(),
        TypeKey::of::<Source>(),
        0,
        move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        },
    ));

    assert!(registry
        .convert_to::<Source>(&Value::Null)
        .expect("null")
        .is_null());

    let object = Object::new(Source(5));
    let same = registry
        .convert_to::<Source>(&Value::Object(object.clone()))
        .expect("identity");
    assert!(same.as_object().expect("object").same(&object));

    let anything = Value::from("text");
    assert!(registry
        .convert(&anything, TypeKey::any())
        .expect("any")
        .same_ref(&anything));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_value_satisfying_declared_supertype_is_returned_unchanged() {
    struct Shape;
    let registry = ConversionRegistry::new();
    registry
        .hierarchy()
        .set_parent(TypeKey::of::<Source>(), TypeKey::of::<Shape>());

    let value = Value::object(Source(3));
    let converted = registry.convert_to::<Shape>(&value).expect("assignable");
    assert!(converted.same_ref(&value));
}

#[test]
fn test_converter_registered_on_parent_applies_to_child() {
    struct Base;
    let registry = ConversionRegistry::new();
    registry
        .hierarchy()
        .set_parent(TypeKey::of::<Source>(), TypeKey::of::<Base>());
    registry.register(FnConverter::new(
        TypeKey::of::<Base>(),
        TypeKey::of::<Target>(),
        0,
        |value, _| Ok(value.downcast_ref::<Source>().map(|s| Value::object(Target(s.0)))),
    ));

    let converted = registry
        .convert_to::<Target>(&Value::object(Source(9)))
        .expect("convert via parent");
    assert_eq!(converted.downcast_ref::<Target>(), Some(&Target(9)));
}

#[test]
fn test_no_converter_error_names_both_types() {
    let registry = ConversionRegistry::new();
    let err = registry
        .convert_to::<Target>(&Value::object(Source(1)))
        .expect_err("no converter");
    assert_eq!(
        err,
        ConversionError::no_converter(TypeKey::of::<Source>(), TypeKey::of::<Target>())
    );
    let message = err.to_string();
    assert!(message.contains("Source"));
    assert!(message.contains("Target"));
}

#[test]
fn test_canonical_fallback_two_hops() {
    let registry = ConversionRegistry::new();
    registry.register(FnConverter::new(
        TypeKey::of::<Source>(),
        TypeKey::canonical(),
        0,
        |_, _| Ok(None),
    ));
    registry.register(FnConverter::new(
        TypeKey::of::<Source>(),
        TypeKey::canonical(),
        1,
        |value, _| {
            Ok(value
                .downcast_ref::<Source>()
                .map(|s| Value::object(Normalized(s.0))))
        },
    ));
    registry.register(FnConverter::typed::<Normalized, Target, _>(0, |n| {
        Some(Target(n.0 * 10))
    }));

    let converted = registry
        .convert_to::<Target>(&Value::object(Source(4)))
        .expect("fallback");
    assert_eq!(converted.downcast_ref::<Target>(), Some(&Target(40)));
}

#[test]
fn test_fallback_fails_when_canonical_form_is_the_input() {
    let registry = ConversionRegistry::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    registry.register(FnConverter::new(
        TypeKey::of::<Source>(),
        TypeKey::canonical(),
        0,
        move |value, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Some(value.clone()))
        },
    ));

    let err = registry
        .convert_to::<Target>(&Value::object(Source(1)))
        .expect_err("identity canonical");
    assert!(matches!(err, ConversionError::NoConverter { .. }));
    assert_eq!(err.from_type(), TypeKey::of::<Source>());
    assert_eq!(err.to_type(), TypeKey::of::<Target>());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_canonical_target_never_falls_back() {
    let registry = ConversionRegistry::new();
    let err = registry
        .convert_to::<Canonical>(&Value::object(Source(1)))
        .expect_err("no canonical converter");
    assert_eq!(err.to_type(), TypeKey::canonical());
}

#[test]
fn test_canonical_cycle_is_bounded() {
    // Source <-> Normalized canonicalize into each other forever
    let registry =
        ConversionRegistry::with_config(BridgeConfig::default().with_max_fallback_depth(4));
    registry.register(FnConverter::new(
        TypeKey::of::<Source>(),
        TypeKey::canonical(),
        0,
        |v, _| Ok(v.downcast_ref::<Source>().map(|s| Value::object(Normalized(s.0)))),
    ));
    registry.register(FnConverter::new(
        TypeKey::of::<Normalized>(),
        TypeKey::canonical(),
        0,
        |v, _| Ok(v.downcast_ref::<Normalized>().map(|n| Value::object(Source(n.0)))),
    ));

    let err = registry
        .convert_to::<Target>(&Value::object(Source(1)))
        .expect_err("cycle");
    assert!(matches!(
        err,
        ConversionError::FallbackDepthExceeded { limit: 4, .. }
    ));
}

#[test]
fn test_hard_failure_is_surfaced() {
    let registry = ConversionRegistry::new();
    registry.register(FnConverter::new(
        TypeKey::of::<Source>(),
        TypeKey::of::<Target>(),
        0,
        |_, _| {
            Err(ConversionError::failed(
                TypeKey::of::<Source>(),
                TypeKey::of::<Target>(),
                "overflow",
            ))
        },
    ));
    registry.register(source_to_target(1, |_| Some(Target(0))));

    let err = registry
        .convert_to::<Target>(&Value::object(Source(1)))
        .expect_err("hard failure");
    assert!(matches!(err, ConversionError::Failed { ref reason, .. } if reason == "overflow"));
}

#[test]
fn test_converter_can_use_registry_for_nested_values() {
    let registry = ConversionRegistry::new();
    registry.register(source_to_target(0, |s| Some(Target(s.0))));
    registry.register(FnConverter::new(
        TypeKey::of::<Vec<Value>>(),
        TypeKey::of::<Target>(),
        0,
        |value, registry| {
            let Value::List(items) = value else {
                return Ok(None);
            };
            let mut total = 0;
            for item in items.iter() {
                let converted = registry.convert_to::<Target>(item)?;
                total += converted.downcast_ref::<Target>().map_or(0, |t| t.0);
            }
            Ok(Some(Value::object(Target(total))))
        },
    ));

    let list = Value::list(vec![Value::object(Source(1)), Value::object(Source(2))]);
    let converted = registry.convert_to::<Target>(&list).expect("nested");
    assert_eq!(converted.downcast_ref::<Target>(), Some(&Target(3)));
}

#[test]
fn test_late_registration_is_visible_after_first_convert() {
    let registry = ConversionRegistry::new();
    assert!(registry.convert_to::<Target>(&Value::object(Source(1))).is_err());

    registry.register(source_to_target(0, |s| Some(Target(s.0))));
    let converted = registry
        .convert_to::<Target>(&Value::object(Source(1)))
        .expect("late registration");
    assert_eq!(converted.downcast_ref::<Target>(), Some(&Target(1)));
}

#[test]
fn test_historical_policy_keeps_stale_resolution() {
    let registry = ConversionRegistry::with_config(
        BridgeConfig::default().with_cache_policy(CachePolicy::Historical),
    );
    // Creates the aggregator and caches an empty list for Source
    assert!(registry.convert_to::<Target>(&Value::object(Source(1))).is_err());

    registry.register(source_to_target(0, |s| Some(Target(s.0))));
    assert!(registry.convert_to::<Target>(&Value::object(Source(1))).is_err());
}

#[test]
fn test_unregister_converter() {
    let registry = ConversionRegistry::new();
    let converter = registry.register(source_to_target(0, |s| Some(Target(s.0))));
    assert!(registry.convert_to::<Target>(&Value::object(Source(1))).is_ok());

    assert!(registry.unregister_converter(&converter));
    assert!(!registry.unregister_converter(&converter));
    assert!(registry.convert_to::<Target>(&Value::object(Source(1))).is_err());
}

#[test]
fn test_random_registration_order_respects_priorities() {
    let mut priorities: Vec<i32> = (0..16).collect();
    fastrand::shuffle(&mut priorities);

    let registry = ConversionRegistry::new();
    for priority in priorities {
        let tag = i64::from(priority);
        registry.register(source_to_target(priority, move |_| Some(Target(tag))));
    }

    let converted = registry
        .convert_to::<Target>(&Value::object(Source(0)))
        .expect("convert");
    assert_eq!(converted.downcast_ref::<Target>(), Some(&Target(0)));
}

#[test]
fn test_concurrent_convert_and_register() {
    let registry = Arc::new(ConversionRegistry::new());
    registry.register(source_to_target(10, |s| Some(Target(s.0))));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                for i in 0..200 {
                    let converted = registry
                        .convert_to::<Target>(&Value::object(Source(i)))
                        .expect("convert");
                    assert!(converted.downcast_ref::<Target>().is_some());
                }
            })
        })
        .collect();
    for priority in 0..10 {
        registry.register(source_to_target(priority + 20, |_| None));
    }
    for worker in workers {
        worker.join().expect("worker");
    }

    let stats = registry.stats(TypeKey::of::<Target>()).expect("stats");
    assert_eq!(stats.converters, 11);
}
