//! Core types for sharedmem
//!
//! This crate defines the vocabulary every other layer speaks:
//! - Identifiers and request/response messages ([`types`])
//! - JSON operation payloads ([`payload`])
//! - The error taxonomy ([`error`])
//! - Output streams with exactly-once completion ([`stream`])
//! - Caller cancellation scopes ([`context`])
//! - The primitive state-machine contract ([`primitive`])
//! - The immutable primitive type registry ([`registry`])

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod error;
pub mod payload;
pub mod primitive;
pub mod registry;
pub mod stream;
pub mod types;

// Re-exports
pub use context::{CancelHandle, Context, DoneCause};
pub use error::{DomainError, Error, ErrorKind, Result};
pub use payload::Payload;
pub use primitive::{factory, Factory, Primitive, PrimitiveStateMachine, Typed};
pub use registry::{PrimitiveTypeRegistry, RegistryBuilder};
pub use stream::{OutputReceiver, OutputStream, StreamEvent};
pub use types::{
    PartitionId, PrimitiveId, PrimitiveType, Proposal, ProposalOutput, Query, QueryOutput,
};
