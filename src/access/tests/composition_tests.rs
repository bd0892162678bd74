//! Composite policy evaluation tests
//!
//! Sequential ordering, short-circuiting, nesting, and randomized checks of
//! the `all`/`any` result rules.

use futures::future::FutureExt;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use warden_access::{AccessControl, Outcome, Policy};

/// Leaf that records its label when evaluated
fn recording(
    access: &AccessControl<()>,
    log: &Arc<Mutex<Vec<&'static str>>>,
    label: &'static str,
    allow: bool,
) -> Policy<()> {
    let log = Arc::clone(log);
    access.can(move |_: &()| {
        log.lock().unwrap().push(label);
        if allow {
            Outcome::Bool(true)
        } else {
            Outcome::Message(label.to_string())
        }
    })
}

fn counting(access: &AccessControl<()>, calls: &Arc<AtomicUsize>, allow: bool) -> Policy<()> {
    let calls = Arc::clone(calls);
    access.can(move |_: &()| {
        calls.fetch_add(1, Ordering::SeqCst);
        allow
    })
}

// ============================================================================
// SHORT-CIRCUIT
// ============================================================================

#[tokio::test]
async fn test_all_stops_at_first_denial() {
    let access = AccessControl::<()>::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let policy = access
        .all([
            recording(&access, &log, "a", true),
            recording(&access, &log, "b", false),
            recording(&access, &log, "c", true),
        ])
        .unwrap();

    let error = policy.authorize(&()).await.unwrap_err();
    assert_eq!(error.to_string(), "b");
    assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_any_stops_at_first_allowance() {
    let access = AccessControl::<()>::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let policy = access
        .any([
            recording(&access, &log, "a", false),
            recording(&access, &log, "b", true),
            recording(&access, &log, "c", true),
        ])
        .unwrap();

    assert!(policy.check(&()).await);
    assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_any_evaluates_everything_when_all_deny() {
    let access = AccessControl::<()>::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let policy = access
        .any([
            counting(&access, &calls, false),
            counting(&access, &calls, false),
            counting(&access, &calls, false),
        ])
        .unwrap();

    assert!(!policy.check(&()).await);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_async_factors_run_sequentially() {
    let access = AccessControl::<()>::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let slow_log = Arc::clone(&log);
    let slow = access.can_async(move |_: &()| {
        let log = Arc::clone(&slow_log);
        async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            log.lock().unwrap().push("slow");
            Outcome::Bool(true)
        }
        .boxed()
    });
    let fast = recording(&access, &log, "fast", true);

    let policy = access.all([slow, fast]).unwrap();
    assert!(policy.check(&()).await);
    assert_eq!(*log.lock().unwrap(), vec!["slow", "fast"]);
}

#[tokio::test]
async fn test_each_evaluation_reruns_predicates() {
    let access = AccessControl::<()>::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let policy = access.all([counting(&access, &calls, true)]).unwrap();

    for _ in 0..3 {
        assert!(policy.check(&()).await);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

// ============================================================================
// NESTING AND SHARING
// ============================================================================

#[tokio::test]
async fn test_nested_composites() {
    let access = AccessControl::<u32>::new();

    let positive = access.can(|n: &u32| *n > 0);
    let even = access.can(|n: &u32| *n % 2 == 0);
    let small = access.can(|n: &u32| *n < 100);
    let magic = access.can(|n: &u32| *n == 777);

    let policy = access
        .any([
            access.all([&positive, &even, &small]).unwrap(),
            magic.clone(),
        ])
        .unwrap();

    assert!(policy.check(&42).await);
    assert!(policy.check(&777).await);
    assert!(!policy.check(&43).await);
    assert!(!policy.check(&0).await);
    assert!(!policy.check(&200).await);
}

#[tokio::test]
async fn test_shared_policy_evaluated_concurrently() {
    let access = AccessControl::<u64>::new();
    let policy = access
        .all([access.can(|n: &u64| n % 3 == 0), access.can(|n: &u64| *n > 10)])
        .unwrap();

    let mut handles = Vec::new();
    for n in 0..32u64 {
        let policy = policy.clone();
        handles.push(tokio::spawn(async move { (n, policy.check(&n).await) }));
    }

    for handle in handles {
        let (n, allowed) = handle.await.unwrap();
        assert_eq!(allowed, n % 3 == 0 && n > 10);
    }
}

// ============================================================================
// PROPERTIES
// ============================================================================

/// Leaves allowing or denying with their index as the message
fn indexed_factors(access: &AccessControl<()>, outcomes: &[bool]) -> Vec<Policy<()>> {
    outcomes
        .iter()
        .enumerate()
        .map(|(i, allow)| {
            if *allow {
                access.allow()
            } else {
                access.deny_with(i.to_string())
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_all_returns_first_denial(outcomes in prop::collection::vec(any::<bool>(), 1..12)) {
        let access = AccessControl::<()>::new();
        let policy = access.all(indexed_factors(&access, &outcomes)).unwrap();
        let result = tokio_test::block_on(policy.inspect(&()));

        match outcomes.iter().position(|allow| !allow) {
            Some(first) => {
                prop_assert!(!result.allowed());
                prop_assert_eq!(result.error().unwrap().to_string(), first.to_string());
            }
            None => prop_assert!(result.allowed()),
        }
    }

    #[test]
    fn prop_any_returns_first_allowance_or_last_denial(
        outcomes in prop::collection::vec(any::<bool>(), 1..12)
    ) {
        let access = AccessControl::<()>::new();
        let policy = access.any(indexed_factors(&access, &outcomes)).unwrap();
        let result = tokio_test::block_on(policy.inspect(&()));

        if outcomes.iter().any(|allow| *allow) {
            prop_assert!(result.allowed());
            prop_assert!(result.error().is_none());
        } else {
            let last = outcomes.len() - 1;
            prop_assert_eq!(result.error().unwrap().to_string(), last.to_string());
        }
    }

    #[test]
    fn prop_check_agrees_with_inspect(outcomes in prop::collection::vec(any::<bool>(), 1..8)) {
        let access = AccessControl::<()>::new();
        let every = access.all(indexed_factors(&access, &outcomes)).unwrap();
        let some = access.any(indexed_factors(&access, &outcomes)).unwrap();

        tokio_test::block_on(async {
            assert_eq!(every.check(&()).await, every.inspect(&()).await.allowed());
            assert_eq!(some.check(&()).await, some.inspect(&()).await.allowed());
            assert_eq!(every.authorize(&()).await.is_ok(), outcomes.iter().all(|a| *a));
            assert_eq!(some.authorize(&()).await.is_ok(), outcomes.iter().any(|a| *a));
        });
    }
}
