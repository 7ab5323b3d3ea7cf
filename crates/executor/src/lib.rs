//! Partitioned execution layer for sharedmem
//!
//! Request path:
//!
//! ```text
//! caller -> Protocol (resolve PartitionId) -> Partition -> Executor (guard)
//!        -> StateMachine (route, apply or evaluate) -> OutputStream
//! ```
//!
//! - [`StateMachine`]: every primitive instance of one partition, created
//!   lazily and routed by [`PrimitiveId`](sharedmem_core::PrimitiveId)
//! - [`Executor`]: single-writer / multi-reader gate with close and
//!   cancellation
//! - [`Partition`]: stable identity over an executor
//! - [`Protocol`]: the fixed set of [`PARTITION_COUNT`] partitions, built by
//!   [`ProtocolBuilder`]
//!
//! Partitions never coordinate. Each one is its own unit of ordering and of
//! parallelism.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod executor;
pub mod partition;
pub mod protocol;
pub mod state_machine;

pub use builder::ProtocolBuilder;
pub use executor::{Executor, ExecutorState};
pub use partition::Partition;
pub use protocol::{Protocol, PARTITION_COUNT};
pub use state_machine::StateMachine;
