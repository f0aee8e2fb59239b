// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Session facade over the registry, the marshaller and a reference scope.

use crate::config::BridgeConfig;
use crate::convert::{ConversionRegistry, Converter, ConverterRef};
use crate::error::{HandleStateError, Result};
use crate::marshal::{install_boundary_converters, StructuralMarshaller};
use crate::reference::{ReferenceHandle, ReferenceScope, StubFactory};
use crate::types::TypeKey;
use crate::value::{Object, Value};
use std::sync::Arc;

/// One boundary session.
///
/// Marshal and unmarshal run with the bridge's scope installed as the ambient
/// scope, so exported objects and imported tokens land in that scope.
///
/// ```
/// use hdds_marshal::{Bridge, Object, Value};
///
/// let bridge = Bridge::builder().build();
/// let counter = Object::new(42_u32);
///
/// let outbound = bridge.marshal(&Value::Object(counter.clone())).unwrap();
/// // u32 is not referenceable: it crosses unchanged
/// assert!(outbound.as_object().unwrap().same(&counter));
///
/// let handle = bridge.export_object(&counter);
/// let inbound = bridge.unmarshal(&Value::from(handle.id())).unwrap();
/// assert!(inbound.as_object().unwrap().same(&counter));
/// assert_eq!(bridge.size(), 1);
/// ```
pub struct Bridge {
    registry: Arc<ConversionRegistry>,
    marshaller: StructuralMarshaller,
    scope: ReferenceScope,
    stub_factory: Option<Arc<dyn StubFactory>>,
}

impl Bridge {
    pub fn builder() -> BridgeBuilder {
        BridgeBuilder::new()
    }

    #[inline]
    pub fn registry(&self) -> &Arc<ConversionRegistry> {
        &self.registry
    }

    #[inline]
    pub fn marshaller(&self) -> &StructuralMarshaller {
        &self.marshaller
    }

    #[inline]
    pub fn scope(&self) -> &ReferenceScope {
        &self.scope
    }

    // ===================================================================
    // Conversion
    // ===================================================================

    pub fn convert(&self, value: &Value, target: TypeKey) -> Result<Value> {
        Ok(self.registry.convert(value, target)?)
    }

    pub fn convert_to<T: ?Sized + 'static>(&self, value: &Value) -> Result<Value> {
        Ok(self.registry.convert_to::<T>(value)?)
    }

    pub fn register_converter<C: Converter + 'static>(&self, converter: C) -> ConverterRef {
        self.registry.register(converter)
    }

    pub fn unregister_converter(&self, converter: &ConverterRef) -> bool {
        self.registry.unregister_converter(converter)
    }

    /// Declare the supertypes of `ty` in the shared type hierarchy.
    pub fn declare_type(&self, ty: TypeKey, parent: Option<TypeKey>, capabilities: &[TypeKey]) {
        self.registry.hierarchy().declare(ty, parent, capabilities);
    }

    /// Give `ty` the `Referenceable` capability: marshaled objects of that
    /// type are exported and replaced by their token.
    pub fn mark_referenceable(&self, ty: TypeKey) {
        self.registry
            .hierarchy()
            .add_capability(ty, TypeKey::referenceable());
    }

    // ===================================================================
    // Marshalling
    // ===================================================================

    pub fn marshal(&self, value: &Value) -> Result<Value> {
        let _active = self.scope.enter();
        Ok(self.marshaller.marshal(value)?)
    }

    pub fn unmarshal(&self, value: &Value) -> Result<Value> {
        let _active = self.scope.enter();
        Ok(self.marshaller.unmarshal(value)?)
    }

    // ===================================================================
    // References
    // ===================================================================

    pub fn export_object(&self, object: &Object) -> ReferenceHandle {
        self.scope.export_object(object)
    }

    pub fn import_handle(&self, id: &str) -> ReferenceHandle {
        self.scope.import_handle(id)
    }

    /// Object behind `handle`, creating a stub through the configured
    /// factory on first use.
    pub fn dereference(&self, handle: &ReferenceHandle) -> Result<Object> {
        if let Some(object) = handle.object() {
            return Ok(object.clone());
        }
        match &self.stub_factory {
            Some(factory) => Ok(handle.get_or_resolve(factory.as_ref())?),
            None => Err(HandleStateError::Unresolved {
                id: handle.id().to_string(),
            }
            .into()),
        }
    }

    /// Number of handles in the session scope.
    pub fn size(&self) -> usize {
        self.scope.size()
    }

    /// End the session: the scope is cleared and behaves as empty afterwards.
    pub fn dispose(&self) {
        self.scope.dispose();
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("registry", &self.registry)
            .field("scope", &self.scope)
            .field("stub_factory", &self.stub_factory.is_some())
            .finish()
    }
}

/// Builder for [`Bridge`].
pub struct BridgeBuilder {
    config: BridgeConfig,
    registry: Option<Arc<ConversionRegistry>>,
    scope: Option<ReferenceScope>,
    stub_factory: Option<Arc<dyn StubFactory>>,
    boundary_converters: bool,
}

impl BridgeBuilder {
    fn new() -> Self {
        Self {
            config: BridgeConfig::default(),
            registry: None,
            scope: None,
            stub_factory: None,
            boundary_converters: true,
        }
    }

    /// Configuration for a registry created by [`build`](Self::build).
    /// Ignored when an existing registry is supplied.
    #[must_use]
    pub fn config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Share an existing registry instead of creating one.
    #[must_use]
    pub fn registry(mut self, registry: Arc<ConversionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use the process-wide registry.
    #[must_use]
    pub fn global_registry(self) -> Self {
        self.registry(Arc::clone(ConversionRegistry::global()))
    }

    /// Join an existing session scope instead of opening a new one.
    #[must_use]
    pub fn scope(mut self, scope: ReferenceScope) -> Self {
        self.scope = Some(scope);
        self
    }

    #[must_use]
    pub fn stub_factory(mut self, factory: impl StubFactory + 'static) -> Self {
        self.stub_factory = Some(Arc::new(factory));
        self
    }

    /// Install the built-in boundary converters (default: true). Only
    /// applies to a registry created by [`build`](Self::build).
    #[must_use]
    pub fn boundary_converters(mut self, enabled: bool) -> Self {
        self.boundary_converters = enabled;
        self
    }

    pub fn build(self) -> Bridge {
        let registry = match self.registry {
            Some(registry) => registry,
            None => {
                let registry = ConversionRegistry::with_config(self.config);
                if self.boundary_converters {
                    install_boundary_converters(&registry);
                }
                Arc::new(registry)
            }
        };
        let scope = self.scope.unwrap_or_default();
        log::debug!("[bridge] session opened ({:?})", registry);

        Bridge {
            marshaller: StructuralMarshaller::new(Arc::clone(&registry)),
            registry,
            scope,
            stub_factory: self.stub_factory,
        }
    }
}

impl Default for BridgeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
