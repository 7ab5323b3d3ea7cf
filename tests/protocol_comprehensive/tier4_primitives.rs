//! Tier 4: Built-in primitives through the full request path

use crate::test_utils::*;
use serde_json::json;
use sharedmem::primitives::election::Term;
use sharedmem::primitives::indexedmap::IndexedMapOutput;
use sharedmem::primitives::lock::LockStatus;
use sharedmem::primitives::map::MapOutput;
use sharedmem::primitives::value::VersionedValue;
use sharedmem::{DomainError, Payload, PrimitiveId};

#[tokio::test]
async fn lock_conflicts_until_released() {
    let protocol = protocol();
    let lock = PrimitiveId::new("lock", "l");

    let granted: LockStatus = propose(&protocol, 1, &lock, json!({"op": "acquire", "owner": "a"}))
        .await
        .unwrap()
        .payload
        .decode()
        .unwrap();
    let first = granted.holder.unwrap();
    assert_eq!(first.owner, "a");

    let err = propose(&protocol, 1, &lock, json!({"op": "acquire", "owner": "b"}))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict { .. }));

    propose(&protocol, 1, &lock, json!({"op": "release", "owner": "a"}))
        .await
        .unwrap();
    let granted: LockStatus = propose(&protocol, 1, &lock, json!({"op": "acquire", "owner": "b"}))
        .await
        .unwrap()
        .payload
        .decode()
        .unwrap();
    assert!(granted.holder.unwrap().version > first.version);
}

#[tokio::test]
async fn map_versions_guard_updates() {
    let protocol = protocol();
    let map = PrimitiveId::new("map", "m");

    let put: MapOutput = propose(&protocol, 2, &map, json!({"op": "put", "key": "k", "value": "v1"}))
        .await
        .unwrap()
        .payload
        .decode()
        .unwrap();
    let MapOutput::Entry(entry) = put else {
        panic!("expected entry, got {:?}", put);
    };

    let err = propose(
        &protocol,
        2,
        &map,
        json!({"op": "update", "key": "k", "value": "v2", "prev_version": entry.version + 1}),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Conflict { .. }));

    propose(
        &protocol,
        2,
        &map,
        json!({"op": "update", "key": "k", "value": "v2", "prev_version": entry.version}),
    )
    .await
    .unwrap();

    let got: MapOutput = query(&protocol, 2, &map, json!({"op": "get", "key": "k"}))
        .await
        .unwrap()
        .payload
        .decode()
        .unwrap();
    assert!(matches!(got, MapOutput::Entry(e) if e.value == "v2"));

    let err = query(&protocol, 2, &map, json!({"op": "get", "key": "absent"}))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn election_follows_candidate_queue() {
    let protocol = protocol();
    let election = PrimitiveId::new("election", "e");

    for candidate in ["a", "b", "c"] {
        propose(&protocol, 3, &election, json!({"op": "enter", "candidate": candidate}))
            .await
            .unwrap();
    }
    let term: Term = propose(&protocol, 3, &election, json!({"op": "withdraw", "candidate": "a"}))
        .await
        .unwrap()
        .payload
        .decode()
        .unwrap();
    assert_eq!(term.leader.as_deref(), Some("b"));
    assert_eq!(term.term, 2);

    let term: Term = propose(&protocol, 3, &election, json!({"op": "anoint", "candidate": "c"}))
        .await
        .unwrap()
        .payload
        .decode()
        .unwrap();
    assert_eq!(term.leader.as_deref(), Some("c"));
    assert_eq!(term.candidates, vec!["c".to_string(), "b".to_string()]);
}

#[tokio::test]
async fn failed_first_proposal_creates_nothing() {
    let protocol = protocol();
    let election = PrimitiveId::new("election", "never");

    let err = propose(&protocol, 1, &election, json!({"op": "withdraw", "candidate": "x"}))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = query(&protocol, 1, &election, json!({"op": "get_term"}))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn malformed_payload_is_invalid_argument_and_no_op() {
    let protocol = protocol();
    let value = PrimitiveId::new("value", "v");

    propose(&protocol, 1, &value, json!({"op": "set", "value": "a"}))
        .await
        .unwrap();
    let err = propose(&protocol, 1, &value, json!({"op": "explode"}))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidArgument { .. }));

    let current: VersionedValue = query(&protocol, 1, &value, json!({"op": "get"}))
        .await
        .unwrap()
        .payload
        .decode()
        .unwrap();
    assert_eq!(current.value.as_deref(), Some("a"));
    assert_eq!(current.version, 1);
}

#[tokio::test]
async fn indexed_map_keeps_insertion_order() {
    let protocol = protocol();
    let imap = PrimitiveId::new("indexedmap", "i");

    for (key, value) in [("x", "1"), ("y", "2"), ("z", "3")] {
        propose(&protocol, 2, &imap, json!({"op": "append", "key": key, "value": value}))
            .await
            .unwrap();
    }
    propose(&protocol, 2, &imap, json!({"op": "remove", "key": "y"}))
        .await
        .unwrap();

    let entries: IndexedMapOutput = query(&protocol, 2, &imap, json!({"op": "entries"}))
        .await
        .unwrap()
        .payload
        .decode()
        .unwrap();
    let IndexedMapOutput::Entries(entries) = entries else {
        panic!("expected entries, got {:?}", entries);
    };
    let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["x", "z"]);
}

#[tokio::test]
async fn set_multimap_and_countermap_round_trip() {
    let protocol = protocol();

    let set = PrimitiveId::new("set", "s");
    propose(&protocol, 1, &set, json!({"op": "add", "element": "a"})).await.unwrap();
    assert!(matches!(
        propose(&protocol, 1, &set, json!({"op": "add", "element": "a"})).await,
        Err(DomainError::AlreadyExists { .. })
    ));

    let multimap = PrimitiveId::new("multimap", "mm");
    propose(&protocol, 1, &multimap, json!({"op": "put_all", "key": "k", "values": ["a", "b"]}))
        .await
        .unwrap();
    let out = query(&protocol, 1, &multimap, json!({"op": "contains_entry", "key": "k", "value": "b"}))
        .await
        .unwrap();
    assert_eq!(out.payload, Payload::from(json!({"contains": true})));

    let countermap = PrimitiveId::new("countermap", "cm");
    propose(&protocol, 1, &countermap, json!({"op": "increment", "key": "k", "delta": 4}))
        .await
        .unwrap();
    let out = query(&protocol, 1, &countermap, json!({"op": "get", "key": "k"}))
        .await
        .unwrap();
    assert_eq!(out.payload, Payload::from(json!({"value": 4})));
}
