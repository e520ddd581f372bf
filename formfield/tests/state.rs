use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use formfield::state::{State, Subscription};

#[test]
fn test_clone_shares_cell() {
    let a = State::new(1);
    let b = a.clone();
    b.set(2);
    assert_eq!(a.get(), 2);
    assert!(a.ptr_eq(&b));
    assert!(a.is_dirty());
    a.clear_dirty();
    assert!(!b.is_dirty());
}

#[test]
fn test_listeners_receive_new_value() {
    let state = State::new(String::new());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&seen);
    let _sub = state.subscribe(move |v: &String| sink.lock().unwrap().push(v.clone()));

    state.set("a".to_string());
    state.update(|v| v.push('b'));

    assert_eq!(*seen.lock().unwrap(), vec!["a".to_string(), "ab".to_string()]);
}

#[test]
fn test_set_if_changed_skips_equal_values() {
    let state = State::new(5);
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&calls);
    let _sub = state.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert!(!state.set_if_changed(5));
    assert!(state.set_if_changed(6));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Plain set always notifies.
    state.set(6);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_dropping_subscription_unsubscribes() {
    let state = State::new(0);
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&calls);
    let sub = state.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(state.listener_count(), 1);

    state.set(1);
    drop(sub);
    state.set(2);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(state.listener_count(), 0);
}

#[test]
fn test_combined_subscription_releases_all() {
    let a = State::new(0);
    let b = State::new(false);

    let sub = Subscription::combine([a.subscribe(|_| {}), b.subscribe(|_| {})]);
    assert!(sub.is_active());
    assert_eq!(a.listener_count(), 1);
    assert_eq!(b.listener_count(), 1);

    sub.unsubscribe();
    assert_eq!(a.listener_count(), 0);
    assert_eq!(b.listener_count(), 0);
}

#[test]
fn test_listener_may_write_other_cells() {
    let source = State::new(1);
    let mirror = State::new(0);

    let target = mirror.clone();
    let _sub = source.subscribe(move |v| target.set(*v * 10));

    source.set(4);
    assert_eq!(mirror.get(), 40);
}

#[test]
fn test_listener_may_read_its_own_cell() {
    let state = State::new(1);
    let read_back = Arc::new(AtomicUsize::new(0));

    let cell = state.clone();
    let out = Arc::clone(&read_back);
    let _sub = state.subscribe(move |_| {
        out.store(cell.get(), Ordering::SeqCst);
    });

    state.set(7);
    assert_eq!(read_back.load(Ordering::SeqCst), 7);
}
