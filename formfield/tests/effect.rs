use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use formfield::effect::Effect;
use formfield::state::State;

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn test_initial_evaluation_is_synchronous() {
    let state = State::new(0);
    let initial = Arc::new(AtomicU64::new(0));

    let seen = Arc::clone(&initial);
    let _effect = Effect::builder().watch(&state).spawn(move |cx| {
        if cx.is_initial() {
            seen.fetch_add(1, Ordering::SeqCst);
        }
    });

    assert_eq!(initial.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_changes_in_window_coalesce_to_latest() {
    let state = State::new(0);
    let runs = Arc::new(Mutex::new(Vec::new()));

    let cell = state.clone();
    let sink = Arc::clone(&runs);
    let _effect = Effect::builder()
        .watch(&state)
        .rate_limit(Duration::from_millis(100))
        .spawn(move |cx| {
            if !cx.is_initial() {
                sink.lock().unwrap().push(cell.get());
            }
        });

    state.set(1);
    advance(20).await;
    state.set(2);
    advance(20).await;
    state.set(3);
    advance(200).await;

    assert_eq!(*runs.lock().unwrap(), vec![3]);

    state.set(4);
    advance(200).await;
    assert_eq!(*runs.lock().unwrap(), vec![3, 4]);
}

#[tokio::test(start_paused = true)]
async fn test_watches_multiple_cells() {
    let a = State::new(0);
    let b = State::new(String::new());
    let runs = Arc::new(AtomicU64::new(0));

    let counter = Arc::clone(&runs);
    let _effect = Effect::builder()
        .watch(&a)
        .watch(&b)
        .rate_limit(Duration::from_millis(50))
        .spawn(move |cx| {
            if !cx.is_initial() {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

    a.set(1);
    advance(100).await;
    b.set("x".to_string());
    advance(100).await;

    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_dispose_stops_reacting() {
    let state = State::new(0);
    let runs = Arc::new(AtomicU64::new(0));

    let counter = Arc::clone(&runs);
    let mut effect = Effect::builder().watch(&state).spawn(move |cx| {
        if !cx.is_initial() {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });
    assert_eq!(state.listener_count(), 1);

    effect.dispose();
    assert!(effect.is_disposed());
    assert_eq!(state.listener_count(), 0);

    state.set(1);
    advance(100).await;
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_drop_releases_subscriptions() {
    let state = State::new(0);
    let effect = Effect::builder().watch(&state).spawn(|_| {});
    assert_eq!(state.listener_count(), 1);
    drop(effect);
    assert_eq!(state.listener_count(), 0);
}
