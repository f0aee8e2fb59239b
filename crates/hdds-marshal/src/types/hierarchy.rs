// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Explicit supertype relation for runtime dispatch.
//!
//! Rust has no inheritance, so the "parent type" and "implemented capability"
//! edges walked during converter resolution are declared here. Each type is
//! linearized once (self, capabilities depth-first, parent chain, then
//! [`AnyType`](super::AnyType)) and the result is cached until the next
//! declaration.

use super::TypeKey;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct Supertypes {
    parent: Option<TypeKey>,
    capabilities: Vec<TypeKey>,
}

/// Shared, thread-safe supertype registry.
pub struct TypeHierarchy {
    declared: RwLock<HashMap<TypeKey, Supertypes>>,
    linearized: DashMap<TypeKey, Arc<[TypeKey]>>,
    generation: AtomicU64,
}

impl TypeHierarchy {
    #[must_use]
    pub fn new() -> Self {
        Self {
            declared: RwLock::new(HashMap::new()),
            linearized: DashMap::new(),
            generation: AtomicU64::new(0),
        }
    }

    /// Declare (or replace) the parent and capability set of `ty`.
    pub fn declare(&self, ty: TypeKey, parent: Option<TypeKey>, capabilities: &[TypeKey]) {
        self.update(ty, |entry| {
            entry.parent = parent;
            entry.capabilities = capabilities.to_vec();
        });
        log::debug!(
            "[hierarchy] declared {} (parent={:?}, capabilities={})",
            ty,
            parent.map(|p| p.short_name()),
            capabilities.len()
        );
    }

    /// Set the parent type of `ty`, keeping its capabilities.
    pub fn set_parent(&self, ty: TypeKey, parent: TypeKey) {
        self.update(ty, |entry| entry.parent = Some(parent));
    }

    /// Add one capability to `ty`. Adding the same capability twice is a no-op.
    pub fn add_capability(&self, ty: TypeKey, capability: TypeKey) {
        self.update(ty, |entry| {
            if !entry.capabilities.contains(&capability) {
                entry.capabilities.push(capability);
            }
        });
    }

    /// Linearized supertypes of `ty`, starting with `ty` itself and ending
    /// with `AnyType`. Cycles in declarations are cut at the first revisit.
    pub fn supertypes(&self, ty: TypeKey) -> Arc<[TypeKey]> {
        if let Some(hit) = self.linearized.get(&ty) {
            return Arc::clone(hit.value());
        }

        // Holding the read guard while publishing keeps `declare` from
        // clearing the cache between compute and insert.
        let declared = self.declared.read();
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        Self::visit(&declared, ty, &mut order, &mut seen);
        let any = TypeKey::any();
        if seen.insert(any) {
            order.push(any);
        }

        let linearized: Arc<[TypeKey]> = order.into();
        self.linearized.insert(ty, Arc::clone(&linearized));
        linearized
    }

    /// True when a value of runtime type `ty` already satisfies `target`.
    pub fn is_assignable(&self, ty: TypeKey, target: TypeKey) -> bool {
        ty == target || target == TypeKey::any() || self.supertypes(ty).contains(&target)
    }

    /// Incremented on every declaration.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Number of types with explicit declarations.
    pub fn len(&self) -> usize {
        self.declared.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.declared.read().is_empty()
    }

    fn update(&self, ty: TypeKey, apply: impl FnOnce(&mut Supertypes)) {
        let mut declared = self.declared.write();
        apply(declared.entry(ty).or_default());
        self.linearized.clear();
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    fn visit(
        declared: &HashMap<TypeKey, Supertypes>,
        ty: TypeKey,
        order: &mut Vec<TypeKey>,
        seen: &mut HashSet<TypeKey>,
    ) {
        if !seen.insert(ty) {
            return;
        }
        order.push(ty);

        let Some(entry) = declared.get(&ty) else {
            return;
        };
        for capability in &entry.capabilities {
            Self::visit(declared, *capability, order, seen);
        }
        if let Some(parent) = entry.parent {
            Self::visit(declared, parent, order, seen);
        }
    }
}

impl Default for TypeHierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeHierarchy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeHierarchy")
            .field("declared", &self.len())
            .field("generation", &self.generation())
            .finish()
    }
}
