//! End-to-end dispatch scenarios for the concurrent, sequential and single
//! handler disciplines.

mod common;

use common::*;
use multicast_callback::{
    Callback, CallbackError, CallbackSequential, CallbackSequentialOf1Arg, CancellationToken,
    Handler, HandlerRegistration, HandlerResult, Invoke, MethodCallback, MulticastCallback,
    SequentialCallback,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_cancellation_does_not_wait_for_stragglers() {
    let straggler_done = Arc::new(AtomicBool::new(false));
    let done = straggler_done.clone();

    let callback = Callback::from(Handler::action(move || {
        std::thread::sleep(Duration::from_millis(2000));
        done.store(true, Ordering::SeqCst);
        Ok(())
    }));
    callback.add(Handler::cancelable_task(|token| async move {
        tokio::select! {
            _ = token.cancelled() => anyhow::bail!("observed cancellation"),
            _ = tokio::time::sleep(Duration::from_millis(2000)) => Ok(()),
        }
    }));

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let err = callback.invoke_async((), &token).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, CallbackError::Cancelled), "unexpected error: {err}");
    assert!(elapsed >= Duration::from_millis(900), "returned too early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(1700), "waited for stragglers: {elapsed:?}");
    assert!(!straggler_done.load(Ordering::SeqCst));

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(straggler_done.load(Ordering::SeqCst));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_mixed_shapes_each_run_once() {
    let log = ExecutionLog::new();
    let callback = MulticastCallback::add_to(None, log.sync_handler(1));
    let callback = MulticastCallback::add_to(Some(callback), log.async_handler(2, Duration::ZERO));
    let callback = MulticastCallback::add_to(Some(callback), log.cancelable_handler(3));

    callback
        .invoke_async((), &CancellationToken::new())
        .await
        .unwrap();

    let mut entries = log.entries();
    entries.sort_unstable();
    assert_eq!(entries, vec![1, 2, 3]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_add_then_remove_round_trip() {
    let counter = Arc::new(AtomicUsize::new(0));
    let extra_counter = Arc::new(AtomicUsize::new(0));
    let callback = Callback::from(counting_handler(&counter));

    let extra = counting_handler(&extra_counter);
    let callback = MulticastCallback::add_to(Some(callback), extra.clone());
    let callback = MulticastCallback::remove_from(Some(callback), &extra).unwrap();

    callback
        .invoke_async((), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(callback.len(), 1);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(extra_counter.load(Ordering::SeqCst), 0);
}

#[test]
fn remove_from_absent_callback_is_usage_error() {
    let handler = Handler::action(|| Ok(()));

    let err = Callback::remove_from(None, &handler).unwrap_err();
    assert!(matches!(err, CallbackError::MissingRegistry));

    let err = CallbackSequential::remove_from(None, &handler).unwrap_err();
    assert!(matches!(err, CallbackError::MissingRegistry));

    let callback = Callback::new();
    assert!(!callback.remove(&handler));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sequential_early_stop_on_failure() {
    let log = ExecutionLog::new();
    let callback = SequentialCallback::with_handler(log.sync_handler(1));
    callback.add(log.failing_handler(2));
    callback.add(log.sync_handler(3));

    let err = callback
        .invoke_async((), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(log.entries(), vec![1, 2]);
    assert_eq!(err.handler_error().unwrap().to_string(), "handler 2 failed");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sequential_waits_for_slow_handlers_before_advancing() {
    let log = ExecutionLog::new();
    let callback = CallbackSequential::new();
    callback.add(log.async_handler(1, Duration::from_millis(80)));
    callback.add(log.sync_handler(2));
    callback.add(log.async_handler(3, Duration::from_millis(10)));
    callback.add(log.cancelable_handler(4));

    callback
        .invoke_async((), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(log.entries(), vec![1, 2, 3, 4]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sequential_handlers_observe_prior_side_effects() {
    let total = Arc::new(AtomicUsize::new(0));
    let callback: CallbackSequentialOf1Arg<usize> = SequentialCallback::new();

    for expected_before in 0..5 {
        let total = total.clone();
        callback.add(Handler::sync(move |step: usize| {
            assert_eq!(total.load(Ordering::SeqCst), expected_before * step);
            total.fetch_add(step, Ordering::SeqCst);
            Ok(())
        }));
    }

    callback
        .invoke_async(3, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(total.load(Ordering::SeqCst), 15);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blocking_invoke_inside_multi_thread_runtime() {
    let counter = Arc::new(AtomicUsize::new(0));
    let callback = Callback::from(counting_handler(&counter));
    callback.add(counting_handler(&counter));

    callback.invoke((), &CancellationToken::new()).unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn blocking_invoke_without_runtime() {
    let log = ExecutionLog::new();
    let callback = CallbackSequential::from(log.sync_handler(1));
    callback.add(log.async_handler(2, Duration::from_millis(5)));

    callback.invoke((), &CancellationToken::new()).unwrap();
    assert_eq!(log.entries(), vec![1, 2]);

    let single = MethodCallback::from(log.sync_handler(3));
    single.invoke((), &CancellationToken::new()).unwrap();
    assert_eq!(log.entries(), vec![1, 2, 3]);
}

#[tokio::test]
async fn blocking_invoke_on_current_thread_runtime_is_rejected() {
    let callback = Callback::from(Handler::action(|| Ok(())));
    let err = callback.invoke((), &CancellationToken::new()).unwrap_err();
    assert!(matches!(err, CallbackError::BlockingContext));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn handler_panic_surfaces_as_failure() {
    let callback = Callback::from(Handler::action(|| {
        if true {
            panic!("sync handler exploded");
        }
        Ok(())
    }));

    let err = callback
        .invoke_async((), &CancellationToken::new())
        .await
        .unwrap_err();
    let message = err.handler_error().unwrap().to_string();
    assert!(message.contains("sync handler exploded"), "unexpected: {message}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn async_closure_panic_before_future_surfaces_as_failure() {
    let counter = Arc::new(AtomicUsize::new(0));
    let callback = Callback::from(counting_handler(&counter));
    callback.add(Handler::task(|| -> std::future::Ready<HandlerResult> {
        panic!("async closure exploded")
    }));

    let err = callback
        .invoke_async((), &CancellationToken::new())
        .await
        .unwrap_err();
    let message = err.handler_error().unwrap().to_string();
    assert!(message.contains("async closure exploded"), "unexpected: {message}");
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    let sequential = CallbackSequential::from(Handler::task(|| -> std::future::Ready<HandlerResult> {
        panic!("sequential closure exploded")
    }));
    let err = sequential
        .invoke_async((), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.handler_error().is_some());

    let single = MethodCallback::from(Handler::task(|| -> std::future::Ready<HandlerResult> {
        panic!("single closure exploded")
    }));
    let err = single
        .invoke_async((), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.handler_error().is_some());
}
