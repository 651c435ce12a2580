//! Integration tests for retry functionality.

use super::*;
use std::panic;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

type TryFn = fn(usize, usize) -> Result<(), String>;

const SCHEDULING_SLACK: Duration = Duration::from_millis(200);

fn always_ok(_: usize, _: usize) -> Result<(), String> {
    Ok(())
}

fn fail_with(message: &'static str) -> impl FnMut(usize, usize) -> Result<(), String> {
    move |_, _| Err(message.to_string())
}

fn panic_with(message: &'static str) -> impl FnMut(usize, usize) -> Result<(), String> {
    move |_, _| -> Result<(), String> { panic::panic_any(message.to_string()) }
}

#[test]
fn test_interval_sequence_returns_ok_on_success() {
    let result = with_interval_sequence(&[Duration::ZERO], Some(always_ok));
    assert_eq!(result, Ok(()));
}

#[test]
fn test_interval_sequence_collects_single_error() {
    let result = with_interval_sequence(&[], Some(fail_with("Error A")));

    let aggregate = result.unwrap_err().into_aggregate().unwrap();
    assert_eq!(aggregate.len(), 1);
    assert_eq!(aggregate.failures()[0].to_string(), "Error A");
}

#[test]
fn test_interval_sequence_recovers_from_panic() {
    let result = with_interval_sequence(&[], Some(panic_with("Panic A")));

    let aggregate = result.unwrap_err().into_aggregate().unwrap();
    assert_eq!(aggregate.len(), 1);
    assert_eq!(aggregate.failures()[0], AttemptFailure::Error("Panic A".to_string()));
}

#[test]
fn test_interval_sequence_collects_all_errors_in_order() {
    let result = with_interval_sequence(
        &[Duration::ZERO],
        Some(|attempt: usize, _: usize| Err::<(), _>(format!("Error {}", attempt))),
    );

    let aggregate = result.unwrap_err().into_aggregate().unwrap();
    assert_eq!(
        aggregate.errors().cloned().collect::<Vec<_>>(),
        vec!["Error 0", "Error 1"]
    );
}

#[test]
fn test_interval_sequence_rejects_missing_operation() {
    let result = with_interval_sequence(&[Duration::ZERO], None::<TryFn>);
    assert_eq!(result, Err(RetryError::NilOperation));
}

#[test]
fn test_fixed_interval_returns_ok_on_success() {
    let result = with_fixed_interval(Duration::ZERO, 1, Some(always_ok));
    assert_eq!(result, Ok(()));
}

#[test]
fn test_fixed_interval_collects_single_error() {
    let result = with_fixed_interval(Duration::ZERO, 0, Some(fail_with("Error A")));

    let aggregate = result.unwrap_err().into_aggregate().unwrap();
    assert_eq!(aggregate.len(), 1);
    assert_eq!(aggregate.failures()[0].to_string(), "Error A");
}

#[test]
fn test_fixed_interval_recovers_from_panic() {
    let result = with_fixed_interval(Duration::ZERO, 0, Some(panic_with("Panic A")));

    let aggregate = result.unwrap_err().into_aggregate().unwrap();
    assert_eq!(aggregate.failures(), &[AttemptFailure::Error("Panic A".to_string())]);
}

#[test]
fn test_fixed_interval_collects_all_errors_in_order() {
    let result = with_fixed_interval(
        Duration::ZERO,
        1,
        Some(|attempt: usize, _: usize| Err::<(), _>(format!("Error {}", attempt))),
    );

    let aggregate = result.unwrap_err().into_aggregate().unwrap();
    assert_eq!(
        aggregate.errors().cloned().collect::<Vec<_>>(),
        vec!["Error 0", "Error 1"]
    );
}

#[test]
fn test_fixed_interval_rejects_missing_operation() {
    let result = with_fixed_interval(Duration::from_nanos(1), 1, None::<TryFn>);
    assert_eq!(result, Err(RetryError::NilOperation));
}

#[test]
fn test_succeeds_on_last_attempt() {
    let attempts = Arc::new(AtomicU32::new(0));

    let result = with_interval_sequence(
        &[Duration::ZERO; 4],
        Some({
            let attempts = attempts.clone();
            move |attempt: usize, limit: usize| {
                attempts.fetch_add(1, Ordering::SeqCst);
                if attempt == limit - 1 {
                    Ok(())
                } else {
                    Err(format!("Error {}", attempt))
                }
            }
        }),
    );

    assert_eq!(result, Ok(()));
    assert_eq!(attempts.load(Ordering::SeqCst), 5);
}

#[test]
fn test_attempt_and_limit_passed_to_operation() {
    let mut calls = Vec::new();

    let result: Result<(), RetryError<()>> =
        RetryExecutor::with_fixed_interval(Duration::ZERO, 3).run(|attempt, limit| {
            calls.push((attempt, limit));
            Err(())
        });

    assert!(result.is_err());
    assert_eq!(calls, vec![(0, 4), (1, 4), (2, 4), (3, 4)]);
}

#[test]
fn test_success_value_is_returned() {
    let executor = RetryExecutor::with_fixed_interval(Duration::ZERO, 5);

    let result = executor.run(|attempt, _| {
        if attempt == 2 {
            Ok(attempt * 10)
        } else {
            Err("not yet")
        }
    });

    assert_eq!(result, Ok(20));
}

#[test]
fn test_panic_lands_at_its_attempt_position() {
    let result = with_interval_sequence(
        &[Duration::ZERO, Duration::ZERO],
        Some(|attempt: usize, _: usize| -> Result<(), String> {
            match attempt {
                1 => panic::panic_any("exploded".to_string()),
                _ => Err(format!("Error {}", attempt)),
            }
        }),
    );

    let aggregate = result.unwrap_err().into_aggregate().unwrap();
    assert_eq!(
        aggregate.failures(),
        &[
            AttemptFailure::Error("Error 0".to_string()),
            AttemptFailure::Error("exploded".to_string()),
            AttemptFailure::Error("Error 2".to_string()),
        ]
    );
}

#[test]
fn test_non_error_panic_payload_is_wrapped() {
    let result = with_interval_sequence(
        &[Duration::ZERO],
        Some(|attempt: usize, _: usize| -> Result<(), std::io::Error> {
            if attempt == 0 {
                panic!("lost connection");
            }
            Ok(())
        }),
    );

    assert!(result.is_ok());

    let result = with_interval_sequence(
        &[],
        Some(|_: usize, _: usize| -> Result<(), std::io::Error> { panic!("lost connection") }),
    );
    let aggregate = result.unwrap_err().into_aggregate().unwrap();
    assert_eq!(aggregate.panics(), 1);
    assert_eq!(
        aggregate.first().and_then(AttemptFailure::panic_message),
        Some("lost connection")
    );
}

#[test]
fn test_waits_follow_interval_sequence() {
    let interval = Duration::from_millis(10);
    let start = Instant::now();

    let result = with_interval_sequence(
        &[interval; 4],
        Some(|attempt: usize, limit: usize| {
            if attempt != limit - 1 {
                Err(format!("Error {}", attempt))
            } else {
                Ok(())
            }
        }),
    );

    let elapsed = start.elapsed();
    assert_eq!(result, Ok(()));
    assert!(
        elapsed >= Duration::from_millis(40),
        "Expected at least 40ms, got {:?}",
        elapsed
    );
    // The final attempt has no trailing wait.
    assert!(
        elapsed < interval * 4 + SCHEDULING_SLACK,
        "Expected about 40ms, got {:?}",
        elapsed
    );
}

#[test]
fn test_success_skips_remaining_waits() {
    let start = Instant::now();

    let result = with_fixed_interval(Duration::from_secs(5), 10, Some(always_ok));

    assert_eq!(result, Ok(()));
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn test_caller_intervals_untouched() {
    let waits = vec![Duration::ZERO, Duration::from_millis(1)];

    for _ in 0..2 {
        let result = with_interval_sequence(&waits, Some(fail_with("again")));
        assert_eq!(result.unwrap_err().aggregate().map(ErrorAggregate::len), Some(3));
    }

    assert_eq!(waits, vec![Duration::ZERO, Duration::from_millis(1)]);
}

#[test]
fn test_hooks_called_for_each_failure() {
    let hook_calls = Arc::new(AtomicU32::new(0));
    let executor = RetryExecutor::with_fixed_interval(Duration::from_millis(1), 5);

    let result = executor.run_with_hooks(
        |attempt, _| if attempt < 2 { Err("transient") } else { Ok("success") },
        {
            let hook_calls = hook_calls.clone();
            move |event: &RetryEvent<'_, &str>| {
                assert_eq!(event.limit, 6);
                assert_eq!(event.next_delay, Some(Duration::from_millis(1)));
                hook_calls.fetch_add(1, Ordering::SeqCst);
            }
        },
    );

    assert_eq!(result, Ok("success"));
    assert_eq!(hook_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_hook_marks_final_failure() {
    let mut finals = Vec::new();

    let result: Result<(), _> = RetryExecutor::with_fixed_interval(Duration::ZERO, 1)
        .run_with_hooks(|_, _| Err("down"), |event: &RetryEvent<'_, &str>| {
            finals.push(event.is_final())
        });

    assert!(result.is_err());
    assert_eq!(finals, vec![false, true]);
}

#[test]
fn test_concurrent_runs_share_nothing() {
    let executor = Arc::new(RetryExecutor::with_fixed_interval(Duration::from_millis(1), 3));

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let executor = executor.clone();
            thread::spawn(move || {
                executor.run(|attempt, _| {
                    if attempt == worker {
                        Ok(worker)
                    } else {
                        Err(format!("worker {} attempt {}", worker, attempt))
                    }
                })
            })
        })
        .collect();

    for (worker, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Ok(worker));
    }
}
