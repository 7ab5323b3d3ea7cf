//! Protocol construction
//!
//! ```ignore
//! use sharedmem_executor::ProtocolBuilder;
//!
//! let protocol = ProtocolBuilder::new()
//!     .register_primitive::<Counter>("counter")
//!     .register_primitive::<Map>("map")
//!     .build()?;
//! ```
//!
//! Registration errors are held until [`ProtocolBuilder::build`], so a
//! misconfigured builder never yields a usable partition.

use crate::executor::Executor;
use crate::partition::Partition;
use crate::protocol::{Protocol, PARTITION_COUNT};
use sharedmem_core::{Error, Factory, PartitionId, Primitive, PrimitiveType, RegistryBuilder, Result};
use std::sync::Arc;

/// Builder for a [`Protocol`]
#[derive(Default)]
pub struct ProtocolBuilder {
    registry: RegistryBuilder,
    /// First registration error, reported by `build`
    error: Option<Error>,
}

impl ProtocolBuilder {
    /// Create a builder with no registered primitive types
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `primitive_type`
    pub fn register(mut self, primitive_type: impl Into<PrimitiveType>, factory: Factory) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.registry.register(primitive_type, factory) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Register a typed [`Primitive`] under `primitive_type`
    pub fn register_primitive<P: Primitive>(mut self, primitive_type: impl Into<PrimitiveType>) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.registry.register_primitive::<P>(primitive_type) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Run a batch of registrations against the underlying registry builder
    ///
    /// Used to plug in a whole family of primitives at once.
    pub fn register_with<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut RegistryBuilder) -> Result<()>,
    {
        if self.error.is_none() {
            if let Err(e) = f(&mut self.registry) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Validate the registrations and create every partition
    ///
    /// # Errors
    ///
    /// The first ConfigurationError hit while registering, or
    /// `EmptyRegistry` if nothing was registered. No partition exists when
    /// this fails.
    pub fn build(self) -> Result<Protocol> {
        if let Some(e) = self.error {
            tracing::warn!(target: "sharedmem::protocol", error = %e, "protocol configuration rejected");
            return Err(e);
        }
        let registry = Arc::new(self.registry.build()?);

        let partitions = (1..=PARTITION_COUNT)
            .map(|id| Partition::new(Executor::new(PartitionId(id), Arc::clone(&registry))))
            .collect();

        tracing::info!(
            target: "sharedmem::protocol",
            partitions = PARTITION_COUNT,
            primitive_types = registry.len(),
            "protocol started"
        );
        Ok(Protocol::new(partitions, registry))
    }
}
