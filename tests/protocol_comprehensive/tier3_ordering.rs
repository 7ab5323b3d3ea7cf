//! Tier 3: Ordering and visibility under concurrency

use crate::test_utils::*;
use parking_lot::Mutex;
use proptest::prelude::*;
use serde_json::json;
use sharedmem::primitives::counter::{Counter, CounterInput};
use sharedmem::{stream, Context, Error, PartitionId, Payload, Primitive, PrimitiveId, Proposal};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn hundred_concurrent_increments_count_exactly_once() {
    let protocol = Arc::new(protocol());
    let c = PrimitiveId::new("counter", "hits");

    let mut tasks = Vec::new();
    for _ in 0..100 {
        let protocol = Arc::clone(&protocol);
        let c = c.clone();
        tasks.push(tokio::spawn(async move {
            propose(&protocol, 1, &c, json!({"op": "increment"}))
                .await
                .unwrap()
                .index
        }));
    }

    let mut indexes = Vec::new();
    for task in tasks {
        indexes.push(task.await.unwrap());
    }
    indexes.sort_unstable();
    assert_eq!(indexes, (1..=100).collect::<Vec<u64>>());
    assert_eq!(counter_value(&protocol, 1, "hits").await, 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn partitions_progress_in_parallel() {
    let protocol = Arc::new(protocol());

    let mut tasks = Vec::new();
    for partition in 1..=3u32 {
        for _ in 0..50 {
            let protocol = Arc::clone(&protocol);
            tasks.push(tokio::spawn(async move {
                let c = PrimitiveId::new("counter", "c");
                propose(&protocol, partition, &c, json!({"op": "increment"}))
                    .await
                    .unwrap();
            }));
        }
    }
    for task in tasks {
        task.await.unwrap();
    }

    for partition in 1..=3 {
        assert_eq!(counter_value(&protocol, partition, "c").await, 50);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn query_after_propose_observes_effect() {
    let protocol = Arc::new(protocol());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let mut tasks = Vec::new();
    for worker in 0..4 {
        let protocol = Arc::clone(&protocol);
        let seen = Arc::clone(&seen);
        tasks.push(tokio::spawn(async move {
            let name = format!("w{}", worker);
            let c = PrimitiveId::new("counter", name.as_str());
            for expected in 1..=25 {
                propose(&protocol, 2, &c, json!({"op": "increment"})).await.unwrap();
                let value = counter_value(&protocol, 2, &name).await;
                assert_eq!(value, expected);
            }
            seen.lock().push(worker);
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    assert_eq!(seen.lock().len(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failed_proposals_are_no_ops_under_concurrency() {
    let protocol = Arc::new(protocol());
    let c = PrimitiveId::new("counter", "cas");
    propose(&protocol, 3, &c, json!({"op": "set", "value": 0})).await.unwrap();

    // Only one compare_and_set from 0 can win
    let mut tasks = Vec::new();
    for i in 1..=16 {
        let protocol = Arc::clone(&protocol);
        let c = c.clone();
        tasks.push(tokio::spawn(async move {
            propose(&protocol, 3, &c, json!({"op": "compare_and_set", "expect": 0, "update": i}))
                .await
                .is_ok()
        }));
    }
    let mut winners = 0;
    for task in tasks {
        if task.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
    assert_ne!(counter_value(&protocol, 3, "cas").await, 0);
}

#[tokio::test]
async fn cancelled_context_is_submission_error() {
    let protocol = protocol();
    let (ctx, handle) = Context::with_cancel();
    handle.cancel();

    let (out, _rx) = stream::channel();
    let err = protocol
        .propose(
            &ctx,
            PartitionId(1),
            Proposal::new(PrimitiveId::new("counter", "c"), json!({"op": "increment"})),
            out,
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        Error::Cancelled {
            partition_id: PartitionId(1)
        }
    );
    assert!(err.is_submission());

    // The rejected call left no trace
    let out = propose(&protocol, 1, &PrimitiveId::new("counter", "c"), json!({"op": "increment"}))
        .await
        .unwrap();
    assert_eq!(out.index, 1);
}

#[tokio::test]
async fn expired_deadline_is_submission_error() {
    let protocol = protocol();
    let ctx = Context::with_timeout(Duration::ZERO);

    let (out, _rx) = stream::channel();
    let err = protocol
        .propose(
            &ctx,
            PartitionId(2),
            Proposal::new(PrimitiveId::new("counter", "c"), json!({"op": "increment"})),
            out,
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        Error::DeadlineExceeded {
            partition_id: PartitionId(2)
        }
    );
}

fn counter_op() -> impl Strategy<Value = CounterInput> {
    prop_oneof![
        (-3i64..4).prop_map(|value| CounterInput::Set { value }),
        (-3i64..4).prop_map(|delta| CounterInput::Increment { delta }),
        (-3i64..4).prop_map(|delta| CounterInput::Decrement { delta }),
        (-3i64..4, -3i64..4).prop_map(|(expect, update)| CounterInput::CompareAndSet { expect, update }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Concurrent submission equals sequential replay in acceptance order
    #[test]
    fn prop_concurrent_equals_sequential_replay(
        ops in prop::collection::vec((0usize..3, counter_op()), 1..40)
    ) {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .enable_all()
            .build()
            .unwrap();

        let (accepted, observed) = runtime.block_on(async {
            let protocol = Arc::new(protocol());
            let mut tasks = Vec::new();
            for (slot, op) in ops.clone() {
                let protocol = Arc::clone(&protocol);
                tasks.push(tokio::spawn(async move {
                    let name = format!("n{}", slot);
                    let c = PrimitiveId::new("counter", name.as_str());
                    let payload = Payload::encode(&op).unwrap();
                    let (out, rx) = stream::channel();
                    protocol
                        .propose(&Context::background(), PartitionId(1), Proposal::new(c, payload), out)
                        .await
                        .unwrap();
                    let outcome = rx.single().await;
                    (slot, op, outcome)
                }));
            }

            let mut accepted = Vec::new();
            for task in tasks {
                accepted.push(task.await.unwrap());
            }

            let mut observed = BTreeMap::new();
            for slot in 0..3usize {
                let name = format!("n{}", slot);
                let c = PrimitiveId::new("counter", name.as_str());
                if let Ok(out) = query(&protocol, 1, &c, json!({"op": "get"})).await {
                    observed.insert(slot, out.payload["value"].as_i64().unwrap());
                }
            }
            (accepted, observed)
        });

        // Every routed proposal got a distinct index
        let mut by_index: Vec<_> = accepted
            .into_iter()
            .map(|(slot, op, outcome)| {
                let index = match &outcome {
                    Ok(out) => Some(out.index),
                    Err(_) => None,
                };
                (index, slot, op, outcome)
            })
            .collect();
        let succeeded = by_index.iter().filter(|(i, ..)| i.is_some()).count();
        by_index.sort_by_key(|(i, ..)| *i);

        // Replay successes in index order; failures never changed state
        let mut replay: BTreeMap<usize, Counter> = BTreeMap::new();
        let mut replayed = 0;
        for (index, slot, op, outcome) in by_index {
            if index.is_none() {
                continue;
            }
            let counter = replay.entry(slot).or_default();
            let expected = counter.apply(op).map(|v| Payload::encode(&v).unwrap());
            let actual = outcome.map(|out| out.payload);
            prop_assert_eq!(actual, expected);
            replayed += 1;
        }
        prop_assert_eq!(replayed, succeeded);

        for (slot, value) in observed {
            let counter = replay.get(&slot);
            prop_assert!(counter.is_some());
            if let Some(counter) = counter {
                let expected = counter.query(sharedmem::primitives::counter::CounterQuery::Get).unwrap();
                prop_assert_eq!(value, expected.value);
            }
        }
    }
}
