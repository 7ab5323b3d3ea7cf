//! Partition identity

use crate::executor::Executor;
use sharedmem_core::PartitionId;

/// A partition: stable identity plus the executor that serves it
///
/// Holds no state of its own. Callers address partitions by id and never
/// depend on how the executor behind them works.
#[derive(Debug)]
pub struct Partition {
    id: PartitionId,
    executor: Executor,
}

impl Partition {
    pub(crate) fn new(executor: Executor) -> Self {
        Self {
            id: executor.partition_id(),
            executor,
        }
    }

    /// Partition identifier
    pub fn id(&self) -> PartitionId {
        self.id
    }

    /// Executor serving this partition
    pub fn executor(&self) -> &Executor {
        &self.executor
    }
}
