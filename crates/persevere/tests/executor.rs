// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(missing_docs, reason = "This is a test module")]

//! Integration tests for the retry executor using only public API.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::FutureExt;
use persevere::{Error, RetryConfig, RetryExecutor};
use rstest::rstest;
use tick::{Clock, ClockControl};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("attempt {0} failed")]
struct AttemptError(u32);

fn auto_clock() -> Clock {
    ClockControl::new().auto_advance_timers(true).to_clock()
}

#[rstest]
#[case::no_retries(RetryConfig::new().max_retries(0))]
#[case::defaults(RetryConfig::new())]
#[case::with_delays(RetryConfig::new().max_retries(3).backoff_delays([Duration::from_secs(1)]))]
#[tokio::test]
async fn success_returns_first_value_without_delay(#[case] config: RetryConfig) {
    let clock = auto_clock();
    let stopwatch = clock.stopwatch();
    let calls = AtomicU32::new(0);
    let calls = &calls;

    let executor = RetryExecutor::new(&clock).config(config);
    let value = executor
        .execute(move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, AttemptError>("done")
        })
        .await
        .unwrap();

    assert_eq!(value, "done");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(stopwatch.elapsed(), Duration::ZERO);
}

#[rstest]
#[case(1, 1)]
#[case(2, 5)]
#[case(5, 5)]
#[tokio::test]
async fn fails_k_times_then_succeeds(#[case] failures: u32, #[case] max_retries: u32) {
    let calls = AtomicU32::new(0);
    let calls = &calls;

    let executor = RetryExecutor::new(&auto_clock())
        .max_retries(max_retries)
        .backoff_delays([Duration::from_millis(3)]);

    let value = executor
        .execute(move || async move {
            let index = calls.fetch_add(1, Ordering::SeqCst);
            if index < failures { Err(AttemptError(index)) } else { Ok(index) }
        })
        .await
        .unwrap();

    assert_eq!(value, failures);
    assert_eq!(calls.load(Ordering::SeqCst), failures + 1);
}

#[tokio::test]
async fn zero_retries_fails_once_with_both_flags() {
    let calls = AtomicU32::new(0);
    let calls = &calls;

    let executor = RetryExecutor::new(&Clock::new_frozen())
        .max_retries(0)
        .backoff_delays([Duration::from_secs(60)]);

    let error = executor
        .execute(move || async move {
            let index = calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(AttemptError(index))
        })
        .await
        .unwrap_err();

    let exhausted = error.into_exhausted().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(exhausted.was_thrown_from_retry(), Some(true));
    assert_eq!(exhausted.was_thrown_on_final_retry(), Some(true));
    assert!(!exhausted.is_invariant_violation());
    assert_eq!(exhausted.downcast_cause::<AttemptError>(), Some(&AttemptError(0)));
}

#[tokio::test]
async fn exhausted_after_all_attempts_with_clamped_delay() {
    let clock = auto_clock();
    let stopwatch = clock.stopwatch();
    let calls = AtomicU32::new(0);
    let calls = &calls;
    let delays = Arc::new(Mutex::new(Vec::new()));
    let delays_clone = Arc::clone(&delays);

    let executor = RetryExecutor::new(&clock)
        .max_retries(3)
        .backoff_delays([Duration::from_millis(10)])
        .on_failure(move |_error, args| delays_clone.lock().unwrap().push(args.retry_delay()));

    let error = executor
        .execute(move || async move {
            let index = calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(AttemptError(index))
        })
        .await
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(
        *delays.lock().unwrap(),
        vec![
            Some(Duration::from_millis(10)),
            Some(Duration::from_millis(10)),
            Some(Duration::from_millis(10)),
            None,
        ]
    );
    assert!(stopwatch.elapsed() >= Duration::from_millis(30));

    let exhausted = error.as_exhausted().unwrap();
    assert_eq!(exhausted.was_thrown_from_retry(), Some(true));
    assert_eq!(exhausted.was_thrown_on_final_retry(), Some(true));
}

#[tokio::test]
async fn cause_is_the_error_of_the_final_attempt() {
    let calls = AtomicU32::new(0);
    let calls = &calls;

    let executor = RetryExecutor::new(&auto_clock()).max_retries(3);

    let error = executor
        .execute(move || async move {
            let index = calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(AttemptError(index))
        })
        .await
        .unwrap_err();

    let cause = error.into_exhausted().unwrap().into_cause().unwrap();
    assert_eq!(*cause.downcast::<AttemptError>().unwrap(), AttemptError(3));
}

#[tokio::test]
async fn missing_operation_makes_no_attempt() {
    let calls = AtomicU32::new(0);
    let calls = &calls;

    let executor = RetryExecutor::new(&Clock::new_frozen());

    let present = move || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok::<_, AttemptError>(())
    };
    let operation = Some(present).filter(|_| false);

    let error = executor.execute_optional(operation).await.unwrap_err();

    assert!(matches!(error, Error::InvalidArgument { .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn present_optional_operation_runs() {
    let executor = RetryExecutor::new(&Clock::new_frozen());

    let value = executor
        .execute_optional(Some(|| async { Ok::<_, AttemptError>(11) }))
        .await
        .unwrap();

    assert_eq!(value, 11);
}

#[test]
fn dropping_execution_during_backoff_stops_retries() {
    // timers of a frozen clock never fire, so the execution parks in its first backoff wait
    let clock = Clock::new_frozen();
    let calls = AtomicU32::new(0);
    let calls = &calls;

    let executor = RetryExecutor::new(&clock)
        .max_retries(3)
        .backoff_delays([Duration::from_secs(10)]);

    {
        let mut execution = Box::pin(executor.execute(move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(AttemptError(0))
        }));

        assert!((&mut execution).now_or_never().is_none());
        assert!((&mut execution).now_or_never().is_none());
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn backoff_wait_does_not_block_other_tasks() {
    let clock = Clock::new_tokio();
    let other_task_ran = AtomicBool::new(false);
    let other_task_ran = &other_task_ran;
    let observed = AtomicBool::new(false);
    let observed = &observed;
    let calls = AtomicU32::new(0);
    let calls = &calls;

    let executor = RetryExecutor::new(&clock)
        .max_retries(1)
        .backoff_delays([Duration::from_millis(50)]);

    let (result, ()) = tokio::join!(
        executor.execute(move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(AttemptError(0));
            }

            observed.store(other_task_ran.load(Ordering::SeqCst), Ordering::SeqCst);
            Ok(())
        }),
        async move {
            other_task_ran.store(true, Ordering::SeqCst);
        }
    );

    result.unwrap();
    assert!(observed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn executor_is_reusable_across_executions() {
    let executor = RetryExecutor::new(&auto_clock()).max_retries(1);

    let first = executor.execute(|| async { Err::<u32, _>(AttemptError(0)) }).await;
    let second = executor.execute(|| async { Ok::<_, AttemptError>(2) }).await;

    first.unwrap_err();
    assert_eq!(second.unwrap(), 2);
}

#[tokio::test]
async fn accepts_any_error_type() {
    let executor = RetryExecutor::new(&auto_clock()).max_retries(0);

    let error = executor
        .execute(|| async { Err::<(), _>(std::io::Error::new(std::io::ErrorKind::TimedOut, "slow")) })
        .await
        .unwrap_err();

    let exhausted = error.into_exhausted().unwrap();
    assert_eq!(exhausted.downcast_cause::<std::io::Error>().unwrap().kind(), std::io::ErrorKind::TimedOut);

    let error = executor.execute(|| async { Err::<(), _>(format!("code {}", 42)) }).await.unwrap_err();
    assert_eq!(error.as_exhausted().unwrap().cause().unwrap().to_string(), "code 42");
}
