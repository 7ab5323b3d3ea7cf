//! Public types for the sharedmem API.
//!
//! This module re-exports types from internal crates with a clean public interface.

// ============================================================================
// Identifiers and messages
// ============================================================================

pub use sharedmem_core::{PartitionId, PrimitiveId, PrimitiveType};
pub use sharedmem_core::{Proposal, ProposalOutput, Query, QueryOutput};
pub use sharedmem_core::Payload;

// ============================================================================
// Errors
// ============================================================================

pub use sharedmem_core::{DomainError, Error, ErrorKind, Result};

// ============================================================================
// Output streams and cancellation
// ============================================================================

pub use sharedmem_core::{OutputReceiver, OutputStream, StreamEvent};
pub use sharedmem_core::{CancelHandle, Context, DoneCause};

// ============================================================================
// Primitive contract and registry
// ============================================================================

pub use sharedmem_core::{factory, Factory, Primitive, PrimitiveStateMachine, Typed};
pub use sharedmem_core::{PrimitiveTypeRegistry, RegistryBuilder};

// ============================================================================
// Execution layer
// ============================================================================

pub use sharedmem_executor::{
    Executor, ExecutorState, Partition, Protocol, ProtocolBuilder, StateMachine, PARTITION_COUNT,
};
