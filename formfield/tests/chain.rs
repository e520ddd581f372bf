use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use formfield::config::FaultPolicy;
use formfield::validation::{
    ChainError, ValidationOutcome, ValidationResponse, Validator, ValidatorChain, ValidatorFault,
};

/// A synchronous validator that counts its invocations.
fn counting(calls: &Arc<AtomicUsize>, message: Option<&'static str>) -> Validator<String> {
    let calls = Arc::clone(calls);
    Validator::sync(move |_: &String| {
        calls.fetch_add(1, Ordering::SeqCst);
        message.map(str::to_string)
    })
}

#[tokio::test]
async fn test_all_valid_resolves_no_error() {
    let calls = Arc::new(AtomicUsize::new(0));
    let validators = vec![
        counting(&calls, None),
        counting(&calls, None),
        counting(&calls, None),
    ];

    let outcome = ValidatorChain::default()
        .run(&"x".to_string(), &validators)
        .await
        .unwrap();

    assert_eq!(outcome, ValidationOutcome::NoError);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_empty_list_resolves_no_error() {
    let outcome = ValidatorChain::default()
        .run(&"x".to_string(), &Vec::<Validator<String>>::new())
        .await
        .unwrap();
    assert!(outcome.is_valid());
}

#[tokio::test]
async fn test_short_circuits_on_first_error() {
    let before = Arc::new(AtomicUsize::new(0));
    let failing = Arc::new(AtomicUsize::new(0));
    let after = Arc::new(AtomicUsize::new(0));
    let validators = vec![
        counting(&before, None),
        counting(&failing, Some("first error")),
        counting(&after, Some("second error")),
        counting(&after, None),
    ];

    let outcome = ValidatorChain::default()
        .run(&"x".to_string(), &validators)
        .await
        .unwrap();

    assert_eq!(outcome, ValidationOutcome::Error("first error".to_string()));
    assert_eq!(before.load(Ordering::SeqCst), 1);
    assert_eq!(failing.load(Ordering::SeqCst), 1);
    assert_eq!(after.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_deferred_error_short_circuits() {
    let after = Arc::new(AtomicUsize::new(0));
    let validators = vec![
        Validator::deferred(|v: &String| {
            let taken = v == "taken";
            async move {
                tokio::time::sleep(Duration::from_millis(300)).await;
                taken.then(|| "Already in use".to_string())
            }
        }),
        counting(&after, None),
    ];

    let chain = ValidatorChain::default();
    let outcome = chain.run(&"taken".to_string(), &validators).await.unwrap();
    assert_eq!(outcome.message(), Some("Already in use"));
    assert_eq!(after.load(Ordering::SeqCst), 0);

    let outcome = chain.run(&"free".to_string(), &validators).await.unwrap();
    assert!(outcome.is_valid());
    assert_eq!(after.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_message_counts_as_valid() {
    let after = Arc::new(AtomicUsize::new(0));
    let validators = vec![
        Validator::new(|_: &String| ValidationResponse::Invalid(String::new())),
        Validator::deferred(|_: &String| async { Some(String::new()) }),
        counting(&after, None),
    ];

    let outcome = ValidatorChain::default()
        .run(&"x".to_string(), &validators)
        .await
        .unwrap();

    assert!(outcome.is_valid());
    assert_eq!(after.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_ignored_fault_continues_chain() {
    let validators = vec![
        Validator::fallible(|_: &String| async { Err(ValidatorFault::new("connection reset")) }),
        Validator::sync(|_: &String| Some("second error".to_string())),
    ];

    let outcome = ValidatorChain::new(FaultPolicy::Ignore)
        .run(&"x".to_string(), &validators)
        .await
        .unwrap();

    assert_eq!(outcome, ValidationOutcome::Error("second error".to_string()));
}

#[tokio::test]
async fn test_reported_fault_stops_chain() {
    let after = Arc::new(AtomicUsize::new(0));
    let validators = vec![
        Validator::sync(|_: &String| None),
        Validator::new(|_: &String| ValidatorFault::new("backend down").into()).named("remote"),
        counting(&after, None),
    ];

    let err = ValidatorChain::new(FaultPolicy::Report)
        .run(&"x".to_string(), &validators)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ChainError::Faulted {
            index: 1,
            validator: Some("remote".to_string()),
            fault: ValidatorFault::new("backend down"),
        }
    );
    assert!(err.to_string().contains("remote"));
    assert_eq!(after.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_panicking_validator_is_a_fault() {
    let validators = vec![Validator::sync(|_: &String| -> Option<String> {
        panic!("boom");
    })];

    let err = ValidatorChain::new(FaultPolicy::Report)
        .run(&"x".to_string(), &validators)
        .await
        .unwrap_err();
    assert!(err.fault().message.contains("boom"));

    let outcome = ValidatorChain::new(FaultPolicy::Ignore)
        .run(&"x".to_string(), &validators)
        .await
        .unwrap();
    assert!(outcome.is_valid());
}

#[tokio::test]
async fn test_panicking_future_is_a_fault() {
    let validators = vec![Validator::deferred(|_: &String| async {
        if true {
            panic!("async boom");
        }
        None
    })];

    let err = ValidatorChain::new(FaultPolicy::Report)
        .run(&"x".to_string(), &validators)
        .await
        .unwrap_err();
    assert!(err.fault().message.contains("async boom"));
}
