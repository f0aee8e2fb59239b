// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tests for TypeKey and TypeHierarchy.

use super::*;

trait Shape {}
struct Polygon;
struct Square;
struct Circle;

#[test]
fn test_type_key_identity_and_names() {
    let a = TypeKey::of::<Square>();
    let b = TypeKey::of::<Square>();
    assert_eq!(a, b);
    assert_ne!(a, TypeKey::of::<Circle>());
    assert_eq!(a.short_name(), "Square");
    assert_eq!(TypeKey::of::<Vec<i64>>().short_name(), "Vec");
    assert_eq!(TypeKey::of::<[Square]>().to_string(), "[Square]");
}

#[test]
fn test_markers() {
    assert!(TypeKey::any().is_marker());
    assert!(TypeKey::canonical().is_marker());
    assert!(TypeKey::boundary().is_marker());
    assert!(TypeKey::of::<Referenceable>().is_marker());
    assert!(!TypeKey::of::<Square>().is_marker());
}

#[test]
fn test_undeclared_type_linearizes_to_self_and_any() {
    let hierarchy = TypeHierarchy::new();
    let supertypes = hierarchy.supertypes(TypeKey::of::<Circle>());
    assert_eq!(
        supertypes.as_ref(),
        &[TypeKey::of::<Circle>(), TypeKey::any()]
    );
}

#[test]
fn test_linearization_order_capabilities_before_parent() {
    let hierarchy = TypeHierarchy::new();
    let square = TypeKey::of::<Square>();
    let polygon = TypeKey::of::<Polygon>();
    let shape = TypeKey::of::<dyn Shape>();

    hierarchy.declare(polygon, None, &[shape]);
    hierarchy.declare(square, Some(polygon), &[TypeKey::of::<Referenceable>()]);

    let supertypes = hierarchy.supertypes(square);
    assert_eq!(
        supertypes.as_ref(),
        &[
            square,
            TypeKey::of::<Referenceable>(),
            polygon,
            shape,
            TypeKey::any()
        ]
    );
    assert!(hierarchy.is_assignable(square, shape));
    assert!(hierarchy.is_assignable(square, TypeKey::any()));
    assert!(!hierarchy.is_assignable(polygon, square));
}

#[test]
fn test_cycles_are_cut() {
    let hierarchy = TypeHierarchy::new();
    let square = TypeKey::of::<Square>();
    let polygon = TypeKey::of::<Polygon>();
    hierarchy.set_parent(square, polygon);
    hierarchy.set_parent(polygon, square);

    let supertypes = hierarchy.supertypes(square);
    assert_eq!(supertypes.as_ref(), &[square, polygon, TypeKey::any()]);
}

#[test]
fn test_declaration_invalidates_linearization() {
    let hierarchy = TypeHierarchy::new();
    let square = TypeKey::of::<Square>();
    let polygon = TypeKey::of::<Polygon>();

    let before = hierarchy.generation();
    assert!(!hierarchy.is_assignable(square, polygon));

    hierarchy.set_parent(square, polygon);
    assert!(hierarchy.generation() > before);
    assert!(hierarchy.is_assignable(square, polygon));
}

#[test]
fn test_add_capability_is_idempotent() {
    let hierarchy = TypeHierarchy::new();
    let square = TypeKey::of::<Square>();
    let shape = TypeKey::of::<dyn Shape>();
    hierarchy.add_capability(square, shape);
    hierarchy.add_capability(square, shape);

    assert_eq!(hierarchy.len(), 1);
    assert_eq!(hierarchy.supertypes(square).len(), 3);
}
