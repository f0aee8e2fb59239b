// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Recursive structural walk for marshal and unmarshal.

use super::path::{FieldPath, PathSegment};
use crate::config::is_reference_token;
use crate::convert::ConversionRegistry;
use crate::error::{ConversionError, MarshalError};
use crate::reference::{install_scope, ReferenceScope};
use crate::types::TypeKey;
use crate::value::{LazySeq, NamedArgs, Value, ValueMap};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Marshal,
    Unmarshal,
}

/// Walks nested values applying boundary rules.
///
/// - `marshal`: containers are rebuilt only when a child changed, otherwise
///   the original container is returned; leaves go through
///   `convert(value, Boundary)` and stay unchanged when no boundary converter
///   applies.
/// - `unmarshal`: reference tokens (`ipc://...`) are imported through the
///   ambient [`ReferenceScope`]; named-argument records are updated in place,
///   other containers are copy-on-write as for `marshal`. Record updates are
///   written only once the whole walk succeeded: on error every record is
///   left as it was.
///
/// Lazy sequences are wrapped: elements are walked when pulled, under the
/// scope that was active when the sequence was wrapped.
#[derive(Clone)]
pub struct StructuralMarshaller {
    registry: Arc<ConversionRegistry>,
    max_depth: usize,
}

impl StructuralMarshaller {
    pub fn new(registry: Arc<ConversionRegistry>) -> Self {
        let max_depth = registry.config().max_marshal_depth;
        Self {
            registry,
            max_depth,
        }
    }

    #[inline]
    pub fn registry(&self) -> &Arc<ConversionRegistry> {
        &self.registry
    }

    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Outbound transform.
    pub fn marshal(&self, value: &Value) -> Result<Value, MarshalError> {
        Walk::new(self, Direction::Marshal, FieldPath::root()).run(value, 0)
    }

    /// Inbound transform. Needs an ambient scope as soon as a reference token
    /// is met. Records are only modified when the call returns `Ok`.
    pub fn unmarshal(&self, value: &Value) -> Result<Value, MarshalError> {
        Walk::new(self, Direction::Unmarshal, FieldPath::root()).run(value, 0)
    }
}

impl std::fmt::Debug for StructuralMarshaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuralMarshaller")
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

struct Walk<'a> {
    marshaller: &'a StructuralMarshaller,
    direction: Direction,
    path: FieldPath,
    /// Named-argument records on the current descent, by address.
    active: Vec<usize>,
    /// Record updates held back until the walk succeeds: (record, binding index, value).
    staged: Vec<(Arc<NamedArgs>, usize, Value)>,
}

impl<'a> Walk<'a> {
    fn new(marshaller: &'a StructuralMarshaller, direction: Direction, path: FieldPath) -> Self {
        Self {
            marshaller,
            direction,
            path,
            active: Vec::new(),
            staged: Vec::new(),
        }
    }

    /// Walk `value`, then apply staged record updates if nothing failed.
    fn run(mut self, value: &Value, depth: usize) -> Result<Value, MarshalError> {
        let walked = self.value(value, depth)?;
        for (args, index, next) in self.staged {
            if let Some(binding) = args.iter().nth(index) {
                binding.set(next);
            }
        }
        Ok(walked)
    }

    fn value(&mut self, value: &Value, depth: usize) -> Result<Value, MarshalError> {
        let limit = self.marshaller.max_depth;
        if depth > limit {
            return Err(MarshalError::DepthExceeded {
                path: self.path.clone(),
                limit,
            });
        }

        match value {
            Value::Args(args) => self.args(value, args, depth),
            Value::Map(map) => {
                let children = map
                    .iter()
                    .map(|(key, child)| (PathSegment::Key(key.clone()), child.clone()));
                Ok(match self.children(children, depth)? {
                    Some(values) => {
                        let rebuilt: ValueMap = map.keys().cloned().zip(values).collect();
                        Value::Map(Arc::new(rebuilt))
                    }
                    None => value.clone(),
                })
            }
            Value::Array(items) => Ok(match self.indexed(items, depth)? {
                Some(values) => Value::Array(values.into()),
                None => value.clone(),
            }),
            Value::List(items) => Ok(match self.indexed(items, depth)? {
                Some(values) => Value::List(Arc::new(values)),
                None => value.clone(),
            }),
            Value::Lazy(seq) => Ok(Value::Lazy(self.lazy(seq, depth))),
            _ => self.leaf(value),
        }
    }

    /// Walk children in order. `Some` holds every new child when at least
    /// one of them changed identity.
    fn children<I>(
        &mut self,
        children: I,
        depth: usize,
    ) -> Result<Option<Vec<Value>>, MarshalError>
    where
        I: IntoIterator<Item = (PathSegment, Value)>,
    {
        let mut walked = Vec::new();
        let mut changed = false;
        for (segment, child) in children {
            self.path.push(segment);
            let result = self.value(&child, depth + 1);
            self.path.pop();
            let next = result?;
            changed |= !next.same_ref(&child);
            walked.push(next);
        }
        Ok(changed.then_some(walked))
    }

    fn indexed(
        &mut self,
        items: &[Value],
        depth: usize,
    ) -> Result<Option<Vec<Value>>, MarshalError> {
        let children = items
            .iter()
            .enumerate()
            .map(|(index, child)| (PathSegment::Index(index), child.clone()));
        self.children(children, depth)
    }

    // ===================================================================
    // Named arguments
    // ===================================================================

    fn args(
        &mut self,
        value: &Value,
        args: &Arc<NamedArgs>,
        depth: usize,
    ) -> Result<Value, MarshalError> {
        let address = Arc::as_ptr(args) as usize;
        if self.active.contains(&address) {
            log::trace!("[marshal] named arguments cycle at '{}', left as is", self.path);
            return Ok(value.clone());
        }

        self.active.push(address);
        let result = match self.direction {
            Direction::Marshal => self.rebuild_args(value, args, depth),
            Direction::Unmarshal => self.update_args(args, depth).map(|()| value.clone()),
        };
        self.active.pop();
        result
    }

    /// Copy-on-write: a new record only when a binding changed.
    fn rebuild_args(
        &mut self,
        value: &Value,
        args: &NamedArgs,
        depth: usize,
    ) -> Result<Value, MarshalError> {
        let children = args
            .iter()
            .map(|binding| (PathSegment::Field(Arc::from(binding.name())), binding.value()));
        Ok(match self.children(children, depth)? {
            Some(values) => Value::args(NamedArgs::from_pairs(args.names().zip(values))),
            None => value.clone(),
        })
    }

    /// In place: changed bindings are staged for the record's slots.
    fn update_args(&mut self, args: &Arc<NamedArgs>, depth: usize) -> Result<(), MarshalError> {
        for (index, binding) in args.iter().enumerate() {
            let current = binding.value();
            self.path.push(PathSegment::Field(Arc::from(binding.name())));
            let result = self.value(&current, depth + 1);
            self.path.pop();
            let next = result?;
            if !next.same_ref(&current) {
                self.staged.push((Arc::clone(args), index, next));
            }
        }
        Ok(())
    }

    // ===================================================================
    // Lazy sequences
    // ===================================================================

    fn lazy(&self, seq: &LazySeq, depth: usize) -> LazySeq {
        let marshaller = self.marshaller.clone();
        let direction = self.direction;
        let path = self.path.clone();
        let scope = ReferenceScope::current();
        let source = seq.clone();
        let mut index = 0;

        // The source pull and the element walk both run under the captured scope
        LazySeq::from_results(std::iter::from_fn(move || {
            let _guard = install_scope(scope.clone());
            let item = source.pull()?;
            let segment = PathSegment::Index(index);
            index += 1;
            Some(item.and_then(|element| {
                Walk::new(&marshaller, direction, path.child(segment)).run(&element, depth + 1)
            }))
        }))
    }

    // ===================================================================
    // Leaves
    // ===================================================================

    fn leaf(&self, value: &Value) -> Result<Value, MarshalError> {
        match self.direction {
            Direction::Marshal => self.export_leaf(value),
            Direction::Unmarshal => self.import_leaf(value),
        }
    }

    fn export_leaf(&self, value: &Value) -> Result<Value, MarshalError> {
        let boundary = TypeKey::boundary();
        match self.marshaller.registry.convert(value, boundary) {
            Ok(converted) => Ok(converted),
            // No boundary rule for this leaf
            Err(ConversionError::NoConverter { from, to })
                if from == value.type_key() && to == boundary =>
            {
                Ok(value.clone())
            }
            Err(error) => Err(MarshalError::Conversion {
                path: self.path.clone(),
                error,
            }),
        }
    }

    fn import_leaf(&self, value: &Value) -> Result<Value, MarshalError> {
        let Value::Str(text) = value else {
            return Ok(value.clone());
        };
        if !is_reference_token(text) {
            return Ok(value.clone());
        }

        let scope = ReferenceScope::current().ok_or_else(|| MarshalError::NoActiveScope {
            path: self.path.clone(),
            token: text.to_string(),
        })?;
        let handle = scope.import_handle(text);
        if let Some(object) = handle.object().cloned() {
            return Ok(Value::Object(object));
        }
        Ok(Value::Handle(handle))
    }
}
