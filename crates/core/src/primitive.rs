//! Primitive state-machine contract
//!
//! Every pluggable primitive (counter, map, lock, ...) is a deterministic
//! state machine. Identical input sequences must yield identical output
//! sequences, since nothing beneath this layer orders or replays operations.
//!
//! Two levels are provided:
//! - [`PrimitiveStateMachine`]: the object-safe, payload-level contract the
//!   executor dispatches to
//! - [`Primitive`]: a typed contract; [`Typed`] adapts it to the payload level
//!   by decoding inputs and encoding outputs with serde

use crate::error::DomainError;
use crate::payload::Payload;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Payload-level primitive state machine
///
/// # Contract
///
/// - `apply` is the only way state changes
/// - An `apply` that returns `Err` must leave state exactly as it was
/// - `query` never changes state
/// - Both are deterministic and never block
pub trait PrimitiveStateMachine: Send + Sync {
    /// Apply a mutating operation
    fn apply(&mut self, input: &Payload) -> Result<Payload, DomainError>;

    /// Evaluate a read-only operation against current state
    fn query(&self, input: &Payload) -> Result<Payload, DomainError>;
}

/// Constructor producing a fresh, empty state-machine instance
pub type Factory = Arc<dyn Fn() -> Box<dyn PrimitiveStateMachine> + Send + Sync>;

/// Typed primitive state machine
///
/// Implementors describe their operations as serde types. `Default` is the
/// empty initial state of a newly referenced instance. `Clone` lets the
/// adapter roll back an apply whose output cannot be encoded.
pub trait Primitive: Default + Clone + Send + Sync + 'static {
    /// Mutating operation
    type Input: DeserializeOwned;
    /// Result of a mutating operation
    type Output: Serialize;
    /// Read-only operation
    type QueryInput: DeserializeOwned;
    /// Result of a read-only operation
    type QueryOutput: Serialize;

    /// Apply a mutating operation; on `Err`, state must be unchanged
    fn apply(&mut self, input: Self::Input) -> Result<Self::Output, DomainError>;

    /// Evaluate a read-only operation
    fn query(&self, input: Self::QueryInput) -> Result<Self::QueryOutput, DomainError>;
}

/// Adapter from [`Primitive`] to [`PrimitiveStateMachine`]
///
/// A payload that fails to decode is rejected before the primitive sees it.
#[derive(Debug, Default)]
pub struct Typed<P>(P);

impl<P: Primitive> Typed<P> {
    /// Wrap a typed primitive
    pub fn new(primitive: P) -> Self {
        Typed(primitive)
    }

    /// Access the typed state
    pub fn inner(&self) -> &P {
        &self.0
    }
}

impl<P: Primitive> PrimitiveStateMachine for Typed<P> {
    fn apply(&mut self, input: &Payload) -> Result<Payload, DomainError> {
        let input: P::Input = input.decode()?;
        let snapshot = self.0.clone();
        let output = self.0.apply(input)?;
        Payload::encode(&output).map_err(|e| {
            self.0 = snapshot;
            e
        })
    }

    fn query(&self, input: &Payload) -> Result<Payload, DomainError> {
        let input: P::QueryInput = input.decode()?;
        let output = self.0.query(input)?;
        Payload::encode(&output)
    }
}

/// Factory creating `Typed<P>` instances from `P::default()`
pub fn factory<P: Primitive>() -> Factory {
    Arc::new(|| Box::new(Typed::<P>::default()) as Box<dyn PrimitiveStateMachine>)
}
