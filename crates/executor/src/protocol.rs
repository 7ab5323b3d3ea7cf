//! Protocol: the fixed set of partitions
//!
//! Built once by [`ProtocolBuilder`](crate::ProtocolBuilder). Every
//! partition gets its own executor and state machine; the only thing they
//! share is the read-only primitive type registry. The partition set never
//! changes after construction.

use crate::partition::Partition;
use sharedmem_core::{
    Context, Error, OutputStream, PartitionId, PrimitiveTypeRegistry, Proposal, ProposalOutput,
    Query, QueryOutput, Result,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Number of partitions every protocol owns
///
/// Partition IDs are `1..=PARTITION_COUNT`.
pub const PARTITION_COUNT: u32 = 3;

/// Owner of the partition set
#[derive(Debug)]
pub struct Protocol {
    partitions: BTreeMap<PartitionId, Partition>,
    registry: Arc<PrimitiveTypeRegistry>,
}

impl Protocol {
    pub(crate) fn new(partitions: Vec<Partition>, registry: Arc<PrimitiveTypeRegistry>) -> Self {
        Self {
            partitions: partitions.into_iter().map(|p| (p.id(), p)).collect(),
            registry,
        }
    }

    /// Every partition, each exactly once
    pub fn partitions(&self) -> impl Iterator<Item = &Partition> {
        self.partitions.values()
    }

    /// Resolve a partition by id
    pub fn partition(&self, id: PartitionId) -> Option<&Partition> {
        self.partitions.get(&id)
    }

    /// Number of partitions
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// Always false for a built protocol
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Registry shared by every partition
    pub fn registry(&self) -> &Arc<PrimitiveTypeRegistry> {
        &self.registry
    }

    /// Route a proposal to `partition_id`
    ///
    /// # Errors
    ///
    /// `PartitionNotFound` for an id this protocol does not own, otherwise
    /// whatever [`Executor::propose`](crate::Executor::propose) returns.
    pub async fn propose(
        &self,
        ctx: &Context,
        partition_id: PartitionId,
        proposal: Proposal,
        stream: OutputStream<ProposalOutput>,
    ) -> Result<()> {
        self.resolve(partition_id)?
            .executor()
            .propose(ctx, proposal, stream)
            .await
    }

    /// Route a query to `partition_id`
    ///
    /// # Errors
    ///
    /// Same as [`Protocol::propose`].
    pub async fn query(
        &self,
        ctx: &Context,
        partition_id: PartitionId,
        query: Query,
        stream: OutputStream<QueryOutput>,
    ) -> Result<()> {
        self.resolve(partition_id)?
            .executor()
            .query(ctx, query, stream)
            .await
    }

    /// Close every partition's executor
    pub async fn close(&self) {
        for partition in self.partitions.values() {
            partition.executor().close().await;
        }
        tracing::info!(target: "sharedmem::protocol", "protocol closed");
    }

    fn resolve(&self, partition_id: PartitionId) -> Result<&Partition> {
        self.partition(partition_id).ok_or_else(|| {
            tracing::warn!(target: "sharedmem::protocol", partition = %partition_id, "request for unknown partition");
            Error::PartitionNotFound { partition_id }
        })
    }
}
