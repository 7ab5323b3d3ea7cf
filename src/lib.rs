//! sharedmem: in-memory partitioned execution for distributed primitives
//!
//! A [`Protocol`] owns a fixed set of partitions. Each partition runs its own
//! deterministic state machine holding every primitive instance (counters,
//! maps, locks, elections and so on) routed to it. Proposals on a partition
//! apply one at a time in acceptance order; queries run concurrently with
//! each other and never observe a half-applied proposal.
//!
//! # Quick start
//!
//! ```no_run
//! use serde_json::json;
//! use sharedmem::{stream, Context, PartitionId, PrimitiveId, Proposal};
//!
//! # async fn run() -> sharedmem::Result<()> {
//! let protocol = sharedmem::new_protocol()?;
//! let counter = PrimitiveId::new("counter", "c1");
//!
//! let (out, rx) = stream::channel();
//! protocol
//!     .propose(
//!         &Context::background(),
//!         PartitionId(1),
//!         Proposal::new(counter, json!({"op": "increment"})),
//!         out,
//!     )
//!     .await?;
//! let applied = rx.single().await;
//! # let _ = applied;
//! # Ok(())
//! # }
//! ```
//!
//! Partition selection (for example hashing a key into
//! `1..=PARTITION_COUNT`) belongs to the caller.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod types;

pub use types::*;

/// Output stream channel constructor
pub use sharedmem_core::stream;

/// Built-in primitives
pub use sharedmem_primitives as primitives;

/// Protocol with [`PARTITION_COUNT`] partitions and every built-in primitive
///
/// # Errors
///
/// A ConfigurationError if the built-in registrations conflict.
pub fn new_protocol() -> Result<Protocol> {
    builder().build()
}

/// Builder preloaded with every built-in primitive
///
/// Add custom primitive types before calling `build`. Reusing a built-in
/// type identifier fails the build with `DuplicatePrimitiveType`.
pub fn builder() -> ProtocolBuilder {
    ProtocolBuilder::new().register_with(sharedmem_primitives::register_all)
}
