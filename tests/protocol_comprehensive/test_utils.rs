//! Shared helpers for the protocol test suite

use serde_json::Value as Json;
use sharedmem::{
    stream, Context, DomainError, PartitionId, PrimitiveId, Proposal, ProposalOutput, Protocol,
    Query, QueryOutput,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Protocol with every built-in primitive
pub fn protocol() -> Protocol {
    init_tracing();
    sharedmem::new_protocol().unwrap()
}

/// Submit a proposal and return its streamed outcome
///
/// Panics on a submission or routing error.
pub async fn propose(
    protocol: &Protocol,
    partition: u32,
    primitive: &PrimitiveId,
    op: Json,
) -> Result<ProposalOutput, DomainError> {
    let (out, rx) = stream::channel();
    protocol
        .propose(
            &Context::background(),
            PartitionId(partition),
            Proposal::new(primitive.clone(), op),
            out,
        )
        .await
        .unwrap();
    rx.single().await
}

/// Submit a query and return its streamed outcome
pub async fn query(
    protocol: &Protocol,
    partition: u32,
    primitive: &PrimitiveId,
    op: Json,
) -> Result<QueryOutput, DomainError> {
    let (out, rx) = stream::channel();
    protocol
        .query(
            &Context::background(),
            PartitionId(partition),
            Query::new(primitive.clone(), op),
            out,
        )
        .await
        .unwrap();
    rx.single().await
}

/// Read a counter's value
pub async fn counter_value(protocol: &Protocol, partition: u32, name: &str) -> i64 {
    let out = query(
        protocol,
        partition,
        &PrimitiveId::new("counter", name),
        serde_json::json!({"op": "get"}),
    )
    .await
    .unwrap();
    out.payload["value"].as_i64().unwrap()
}
