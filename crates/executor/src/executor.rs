//! Partition executor
//!
//! The executor is the concurrency gate in front of one partition's
//! [`StateMachine`].
//!
//! # Access discipline
//!
//! - `propose` holds the write guard: at most one proposal in flight, no
//!   query concurrent with it
//! - `query` holds the read guard: any number of queries run together
//! - The guard is FIFO-fair (tokio RwLock), so proposals apply in the order
//!   their callers started waiting
//!
//! # Suspension
//!
//! The only await point is acquiring the guard. That wait races the caller's
//! [`Context`] and the executor's close signal. Once the guard is held the
//! state machine runs synchronously to completion.
//!
//! # Lifecycle
//!
//! `Active -> Closed`, one way. Closing wakes every waiter with
//! `Error::Closed`; holders of the guard finish normally.

use crate::state_machine::StateMachine;
use sharedmem_core::{
    Context, DoneCause, Error, OutputStream, PartitionId, PrimitiveTypeRegistry, Proposal,
    ProposalOutput, Query, QueryOutput, Result,
};
use std::sync::Arc;
use tokio::sync::{watch, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Executor lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    /// Accepting proposals and queries
    Active,
    /// Rejecting every call with `Error::Closed`
    Closed,
}

/// Concurrency gate owning one partition's state machine
#[derive(Debug)]
pub struct Executor {
    partition_id: PartitionId,
    state_machine: RwLock<StateMachine>,
    state: watch::Sender<ExecutorState>,
}

impl Executor {
    /// Create an executor with a fresh state machine
    pub fn new(partition_id: PartitionId, registry: Arc<PrimitiveTypeRegistry>) -> Self {
        let (state, _) = watch::channel(ExecutorState::Active);
        Self {
            partition_id,
            state_machine: RwLock::new(StateMachine::new(registry)),
            state,
        }
    }

    /// Partition this executor serves
    pub fn partition_id(&self) -> PartitionId {
        self.partition_id
    }

    /// Current lifecycle state
    pub fn state(&self) -> ExecutorState {
        *self.state.borrow()
    }

    /// True once `close` has been called
    pub fn is_closed(&self) -> bool {
        self.state() == ExecutorState::Closed
    }

    /// Submit a proposal
    ///
    /// Waits for exclusive access, applies the proposal and releases access.
    /// The outcome (value or domain error) is written to `stream`; the
    /// returned error only reports that the proposal was not applied.
    ///
    /// # Errors
    ///
    /// - `Closed`: the executor is or became closed before the guard was held
    /// - `Cancelled` / `DeadlineExceeded`: `ctx` finished while waiting
    /// - `UnknownPrimitiveType`: the proposal names an unregistered type
    pub async fn propose(
        &self,
        ctx: &Context,
        proposal: Proposal,
        stream: OutputStream<ProposalOutput>,
    ) -> Result<()> {
        let mut state_machine = self.write(ctx).await?;
        state_machine.propose(&proposal, stream)
    }

    /// Submit a query
    ///
    /// Waits for shared access, evaluates the query and releases access.
    /// Same split between returned error and streamed outcome as `propose`.
    pub async fn query(
        &self,
        ctx: &Context,
        query: Query,
        stream: OutputStream<QueryOutput>,
    ) -> Result<()> {
        let state_machine = self.read(ctx).await?;
        state_machine.query(&query, stream)
    }

    /// Close the executor
    ///
    /// New calls and current waiters fail with `Closed`. Returns once every
    /// in-flight holder of the guard has finished. Idempotent.
    pub async fn close(&self) {
        let transitioned = self.state.send_if_modified(|state| {
            if *state == ExecutorState::Active {
                *state = ExecutorState::Closed;
                true
            } else {
                false
            }
        });
        if transitioned {
            tracing::info!(target: "sharedmem::executor", partition = %self.partition_id, "executor closed");
        }
        // Drain: the write guard is granted only after current holders release.
        let _drained = self.state_machine.write().await;
    }

    async fn write(&self, ctx: &Context) -> Result<RwLockWriteGuard<'_, StateMachine>> {
        self.admit(ctx)?;
        let guard = tokio::select! {
            biased;
            _ = self.closed() => return Err(self.closed_error()),
            cause = ctx.done() => return Err(self.cancel_error(cause)),
            guard = self.state_machine.write() => guard,
        };
        // Closed while the grant was in flight
        self.admit_held()?;
        Ok(guard)
    }

    async fn read(&self, ctx: &Context) -> Result<RwLockReadGuard<'_, StateMachine>> {
        self.admit(ctx)?;
        let guard = tokio::select! {
            biased;
            _ = self.closed() => return Err(self.closed_error()),
            cause = ctx.done() => return Err(self.cancel_error(cause)),
            guard = self.state_machine.read() => guard,
        };
        self.admit_held()?;
        Ok(guard)
    }

    /// Fail fast before waiting
    fn admit(&self, ctx: &Context) -> Result<()> {
        if self.is_closed() {
            return Err(self.closed_error());
        }
        if let Some(cause) = ctx.err() {
            return Err(self.cancel_error(cause));
        }
        Ok(())
    }

    fn admit_held(&self) -> Result<()> {
        if self.is_closed() {
            return Err(self.closed_error());
        }
        Ok(())
    }

    /// Resolves once the executor is closed
    async fn closed(&self) {
        let mut rx = self.state.subscribe();
        loop {
            if *rx.borrow_and_update() == ExecutorState::Closed {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    fn closed_error(&self) -> Error {
        Error::Closed {
            partition_id: self.partition_id,
        }
    }

    fn cancel_error(&self, cause: DoneCause) -> Error {
        tracing::debug!(target: "sharedmem::executor", partition = %self.partition_id, ?cause, "gave up waiting for partition");
        match cause {
            DoneCause::Cancelled => Error::Cancelled {
                partition_id: self.partition_id,
            },
            DoneCause::DeadlineExceeded => Error::DeadlineExceeded {
                partition_id: self.partition_id,
            },
        }
    }
}
