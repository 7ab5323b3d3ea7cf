//! Aggregate state machine
//!
//! Holds every live primitive instance of one partition and routes proposals
//! and queries to them.
//!
//! # Design
//!
//! - FxHashMap keyed by PrimitiveId: O(1) routing, fast non-crypto hash
//! - Instances are created lazily by the first proposal that names them
//! - Creation is part of the apply step: if that first proposal fails, the
//!   new instance is discarded and the partition is as if it never happened
//!
//! Callers (the executor) provide exclusion: `propose` takes `&mut self`,
//! `query` takes `&self`.

use rustc_hash::FxHashMap;
use sharedmem_core::{
    DomainError, Error, OutputStream, Payload, PrimitiveId, PrimitiveStateMachine,
    PrimitiveTypeRegistry, Proposal, ProposalOutput, Query, QueryOutput, Result,
};
use std::fmt;
use std::sync::Arc;

/// All primitive instances of one partition
pub struct StateMachine {
    registry: Arc<PrimitiveTypeRegistry>,
    instances: FxHashMap<PrimitiveId, Box<dyn PrimitiveStateMachine>>,
    /// Acceptance index of the last routed proposal
    index: u64,
}

impl StateMachine {
    /// Create an empty state machine backed by `registry`
    pub fn new(registry: Arc<PrimitiveTypeRegistry>) -> Self {
        Self {
            registry,
            instances: FxHashMap::default(),
            index: 0,
        }
    }

    /// Apply a proposal and write its outcome to `stream`
    ///
    /// # Errors
    ///
    /// `UnknownPrimitiveType` if the type is not registered. Nothing is
    /// touched in that case, including the index.
    pub fn propose(
        &mut self,
        proposal: &Proposal,
        stream: OutputStream<ProposalOutput>,
    ) -> Result<()> {
        let id = &proposal.primitive;
        if !self.registry.contains(&id.primitive_type) {
            return Err(Error::UnknownPrimitiveType {
                primitive_type: id.primitive_type.clone(),
            });
        }

        self.index += 1;
        let index = self.index;

        let result = match self.instances.get_mut(id) {
            Some(instance) => instance.apply(&proposal.payload),
            None => self.create_and_apply(proposal),
        };

        match &result {
            Ok(_) => {
                tracing::debug!(target: "sharedmem::state_machine", primitive = %id, index, "applied proposal")
            }
            Err(e) => {
                tracing::debug!(target: "sharedmem::state_machine", primitive = %id, index, error = %e, "proposal rejected")
            }
        }

        stream.result(result.map(|payload| ProposalOutput { index, payload }));
        Ok(())
    }

    /// Evaluate a query and write its outcome to `stream`
    ///
    /// A missing instance is reported on the stream as NotFound.
    ///
    /// # Errors
    ///
    /// `UnknownPrimitiveType` if the type is not registered.
    pub fn query(&self, query: &Query, stream: OutputStream<QueryOutput>) -> Result<()> {
        let id = &query.primitive;
        if !self.registry.contains(&id.primitive_type) {
            return Err(Error::UnknownPrimitiveType {
                primitive_type: id.primitive_type.clone(),
            });
        }

        let result = match self.instances.get(id) {
            Some(instance) => instance.query(&query.payload),
            None => Err(DomainError::not_found(format!("primitive '{}'", id))),
        };
        tracing::trace!(target: "sharedmem::state_machine", primitive = %id, index = self.index, ok = result.is_ok(), "evaluated query");

        let index = self.index;
        stream.result(result.map(|payload| QueryOutput { index, payload }));
        Ok(())
    }

    /// Create the instance named by `proposal` and apply it
    ///
    /// The instance is only kept if the proposal succeeds.
    fn create_and_apply(
        &mut self,
        proposal: &Proposal,
    ) -> std::result::Result<Payload, DomainError> {
        let id = &proposal.primitive;
        let mut instance = self
            .registry
            .create(&id.primitive_type)
            .ok_or_else(|| DomainError::aborted(format!("no factory for '{}'", id.primitive_type)))?;
        let output = instance.apply(&proposal.payload)?;
        tracing::debug!(target: "sharedmem::state_machine", primitive = %id, "created primitive instance");
        self.instances.insert(id.clone(), instance);
        Ok(output)
    }

    /// Acceptance index of the last routed proposal
    pub fn index(&self) -> u64 {
        self.index
    }

    /// True if the instance exists
    pub fn contains(&self, id: &PrimitiveId) -> bool {
        self.instances.contains_key(id)
    }

    /// Number of live instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// True if no instance exists
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("index", &self.index)
            .field("instances", &self.instances.len())
            .finish()
    }
}
