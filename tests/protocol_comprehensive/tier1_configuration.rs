//! Tier 1: Construction and configuration

use crate::test_utils::*;
use serde_json::json;
use sharedmem::primitives::{Counter, COUNTER};
use sharedmem::{
    DomainError, Error, ErrorKind, Payload, Primitive, PrimitiveId, ProtocolBuilder, PARTITION_COUNT,
};

#[test]
fn new_protocol_owns_three_partitions() {
    let protocol = protocol();
    assert_eq!(PARTITION_COUNT, 3);

    let mut ids: Vec<u32> = protocol.partitions().map(|p| p.id().as_u32()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn new_protocol_registers_every_builtin() {
    let protocol = protocol();
    let types: Vec<&str> = protocol.registry().types().map(|t| t.as_str()).collect();
    assert_eq!(
        types,
        vec![
            "counter",
            "countermap",
            "election",
            "indexedmap",
            "lock",
            "map",
            "multimap",
            "set",
            "value",
        ]
    );
}

#[test]
fn duplicate_type_fails_construction() {
    let err = sharedmem::builder()
        .register_primitive::<Counter>(COUNTER)
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(matches!(err, Error::DuplicatePrimitiveType { .. }));
}

#[test]
fn duplicate_in_fresh_builder_fails_construction() {
    let err = ProtocolBuilder::new()
        .register_primitive::<Counter>("c")
        .register_primitive::<Counter>("c")
        .build()
        .unwrap_err();
    assert!(err.is_configuration());
}

/// Custom primitive registered next to the built-ins
#[derive(Default, Clone)]
struct Echo;

impl Primitive for Echo {
    type Input = String;
    type Output = String;
    type QueryInput = String;
    type QueryOutput = String;

    fn apply(&mut self, input: String) -> Result<String, DomainError> {
        Ok(input)
    }

    fn query(&self, input: String) -> Result<String, DomainError> {
        Ok(input)
    }
}

#[tokio::test]
async fn custom_primitive_plugs_in_next_to_builtins() {
    init_tracing();
    let protocol = sharedmem::builder()
        .register_primitive::<Echo>("echo")
        .build()
        .unwrap();

    let echo = PrimitiveId::new("echo", "e");
    let out = propose(&protocol, 2, &echo, json!("hello")).await.unwrap();
    assert_eq!(out.payload, Payload::from(json!("hello")));
    let out = query(&protocol, 2, &echo, json!("again")).await.unwrap();
    assert_eq!(out.payload, Payload::from(json!("again")));
}
