//! Primitive type registry
//!
//! Maps a primitive type identifier to the factory for its state machine.
//! Built once at startup through [`RegistryBuilder`]; the resulting
//! [`PrimitiveTypeRegistry`] has no mutating methods, so it can be shared
//! behind an `Arc` and read concurrently without locking.

use crate::error::{Error, Result};
use crate::primitive::{factory, Factory, Primitive, PrimitiveStateMachine};
use crate::types::PrimitiveType;
use std::collections::BTreeMap;
use std::fmt;

/// Collects registrations before the registry is frozen
#[derive(Default)]
pub struct RegistryBuilder {
    factories: BTreeMap<PrimitiveType, Factory>,
}

impl RegistryBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `primitive_type`
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if the identifier is empty
    /// - `DuplicatePrimitiveType` if the type is already registered; the
    ///   existing registration is kept
    pub fn register(
        &mut self,
        primitive_type: impl Into<PrimitiveType>,
        factory: Factory,
    ) -> Result<&mut Self> {
        let primitive_type = primitive_type.into();
        if primitive_type.as_str().is_empty() {
            return Err(Error::InvalidConfiguration {
                reason: "primitive type identifier is empty".to_string(),
            });
        }
        if self.factories.contains_key(&primitive_type) {
            return Err(Error::DuplicatePrimitiveType { primitive_type });
        }
        tracing::debug!(target: "sharedmem::registry", primitive_type = %primitive_type, "registered primitive type");
        self.factories.insert(primitive_type, factory);
        Ok(self)
    }

    /// Register a typed [`Primitive`] under `primitive_type`
    pub fn register_primitive<P: Primitive>(
        &mut self,
        primitive_type: impl Into<PrimitiveType>,
    ) -> Result<&mut Self> {
        self.register(primitive_type, factory::<P>())
    }

    /// Freeze into a read-only registry
    ///
    /// # Errors
    ///
    /// `EmptyRegistry` if nothing was registered.
    pub fn build(self) -> Result<PrimitiveTypeRegistry> {
        if self.factories.is_empty() {
            return Err(Error::EmptyRegistry);
        }
        Ok(PrimitiveTypeRegistry {
            factories: self.factories,
        })
    }
}

/// Immutable mapping from primitive type to state-machine factory
pub struct PrimitiveTypeRegistry {
    factories: BTreeMap<PrimitiveType, Factory>,
}

impl PrimitiveTypeRegistry {
    /// Start a new registry
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// True if `primitive_type` is registered
    pub fn contains(&self, primitive_type: &PrimitiveType) -> bool {
        self.factories.contains_key(primitive_type)
    }

    /// Create a fresh instance of `primitive_type`
    ///
    /// Returns `None` for unregistered types.
    pub fn create(&self, primitive_type: &PrimitiveType) -> Option<Box<dyn PrimitiveStateMachine>> {
        self.factories.get(primitive_type).map(|make| make())
    }

    /// Registered types in sorted order
    pub fn types(&self) -> impl Iterator<Item = &PrimitiveType> {
        self.factories.keys()
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Always false for a built registry
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for PrimitiveTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimitiveTypeRegistry")
            .field("types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
