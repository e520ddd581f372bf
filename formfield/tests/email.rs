use formfield::validation::{
    INVALID_EMAIL_MESSAGE, ValidationOutcome, ValidatorChain, email, is_valid_email,
};

#[test]
fn test_accepts_common_addresses() {
    assert!(is_valid_email("a@b.com"));
    assert!(is_valid_email("first.last@example.co.uk"));
    assert!(is_valid_email("user+tag@sub-domain.example.org"));
    assert!(is_valid_email("\"quoted name\"@example.com"));
    assert!(is_valid_email("root@[192.168.0.1]"));
}

#[test]
fn test_rejects_malformed_addresses() {
    assert!(!is_valid_email(""));
    assert!(!is_valid_email("not-an-email"));
    assert!(!is_valid_email("user@localhost"));
    assert!(!is_valid_email("user@example.c"));
    assert!(!is_valid_email("two@@example.com"));
    assert!(!is_valid_email("spaces in@example.com"));
    assert!(!is_valid_email(".leading@example.com"));
}

#[tokio::test]
async fn test_email_validator_messages() {
    let validators = vec![email::<String>()];
    let chain = ValidatorChain::default();

    let ok = chain.run(&"a@b.com".to_string(), &validators).await.unwrap();
    assert_eq!(ok, ValidationOutcome::NoError);

    let bad = chain
        .run(&"not-an-email".to_string(), &validators)
        .await
        .unwrap();
    assert_eq!(bad, ValidationOutcome::Error(INVALID_EMAIL_MESSAGE.to_string()));
}

#[tokio::test]
async fn test_email_validator_flags_empty_string() {
    let outcome = ValidatorChain::default()
        .run(&String::new(), &[email::<String>()])
        .await
        .unwrap();
    assert_eq!(outcome.message(), Some("The provided email is not valid"));
}

#[test]
fn test_email_validator_is_deferred() {
    let validator = email::<&'static str>();
    assert_eq!(validator.name(), Some("email"));
    assert!(matches!(
        validator.call(&"a@b.com"),
        formfield::validation::ValidationResponse::Deferred(_)
    ));
}
