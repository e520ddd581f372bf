use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use formfield::field::FieldState;
use formfield::gate::ActivationGate;
use formfield::state::State;
use formfield::validation::rules;

fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let hook_count = Arc::clone(&count);
    (count, move || {
        hook_count.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn test_new_gate_is_disarmed() {
    let focus = State::new(true);
    let can_validate = State::new(true);
    let gate = ActivationGate::new(&focus, &can_validate);

    assert!(!gate.is_armed());
    assert_eq!(focus.listener_count(), 0);
    focus.set(false);
    assert_eq!(gate.activations(), 0);
    assert!(can_validate.get());
}

#[test]
fn test_arm_closes_gate_until_blur() {
    let focus = State::new(true);
    let can_validate = State::new(true);
    let gate = ActivationGate::new(&focus, &can_validate);

    gate.arm();
    assert!(gate.is_armed());
    assert!(!can_validate.get());

    focus.set(true);
    assert!(!can_validate.get());

    focus.set(false);
    assert!(can_validate.get());
    assert!(!gate.is_armed());
    assert_eq!(gate.activations(), 1);
}

#[test]
fn test_hook_runs_once_per_cycle() {
    let focus = State::new(false);
    let can_validate = State::new(true);
    let (count, hook) = counter();
    let gate = ActivationGate::new(&focus, &can_validate).with_hook(hook);

    gate.arm();
    focus.set(true);
    focus.set(false);
    focus.set(true);
    focus.set(false);

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(gate.activations(), 1);
    // The watch detached after activating.
    assert_eq!(focus.listener_count(), 0);
}

#[test]
fn test_rearm_starts_new_cycle() {
    let focus = State::new(true);
    let can_validate = State::new(true);
    let (count, hook) = counter();
    let gate = ActivationGate::new(&focus, &can_validate).with_hook(hook);

    gate.arm();
    focus.set(false);
    assert!(can_validate.get());

    gate.arm();
    assert!(!can_validate.get());
    focus.set(true);
    focus.set(false);

    assert!(can_validate.get());
    assert_eq!(count.load(Ordering::SeqCst), 2);
    assert_eq!(gate.activations(), 2);
}

#[test]
fn test_rearming_armed_gate_keeps_one_watch() {
    let focus = State::new(true);
    let can_validate = State::new(true);
    let gate = ActivationGate::new(&focus, &can_validate);

    gate.arm();
    gate.arm();
    assert_eq!(focus.listener_count(), 1);

    focus.set(false);
    assert_eq!(gate.activations(), 1);
}

#[test]
fn test_disarm_leaves_gate_closed() {
    let focus = State::new(true);
    let can_validate = State::new(true);
    let gate = ActivationGate::new(&focus, &can_validate);

    gate.arm();
    gate.disarm();
    focus.set(false);

    assert!(!can_validate.get());
    assert_eq!(gate.activations(), 0);
    assert_eq!(focus.listener_count(), 0);
}

#[test]
fn test_dropping_gate_stops_watching() {
    let focus = State::new(true);
    let can_validate = State::new(true);
    let gate = ActivationGate::new(&focus, &can_validate);
    gate.arm();
    assert_eq!(focus.listener_count(), 1);

    drop(gate);
    assert_eq!(focus.listener_count(), 0);
}

#[test]
fn test_gate_never_closes_open_target() {
    let focus = State::new(true);
    let can_validate = State::new(false);
    let gate = ActivationGate::new(&focus, &can_validate);
    gate.arm();

    // Something else opened the gate before the blur.
    can_validate.set(true);
    focus.set(false);

    assert!(can_validate.get());
    assert_eq!(gate.activations(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_field_validates_after_first_blur() {
    let focus = State::new(false);
    let field = FieldState::new(String::new())
        .with_validators([rules::min_length::<String>(3, "Too short")]);
    let _gate = field.gate_until_blur(&focus);
    assert!(!field.can_validate());

    focus.set(true);
    field.set_value("a".to_string());
    tokio::time::sleep(Duration::from_millis(150)).await;
    field.set_value("ab".to_string());
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(field.request_count(), 0);

    focus.set(false);
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(field.can_validate());
    assert_eq!(field.request_count(), 1);
    assert_eq!(field.error().as_deref(), Some("Too short"));

    // Once open, edits validate while focused too.
    focus.set(true);
    field.set_value("abc".to_string());
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(field.has_success());
}
