//! Email address validator.

use std::sync::LazyLock;

use regex::Regex;

use super::validator::Validator;

/// Message reported for an address that does not look like an email.
pub const INVALID_EMAIL_MESSAGE: &str = "The provided email is not valid";

/// Local part, `@`, then either a dotted domain ending in a 2+ letter TLD
/// or a bracketed IPv4 literal.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .expect("email pattern is valid")
});

/// Check whether `address` has the shape of an email address.
pub fn is_valid_email(address: &str) -> bool {
    EMAIL_PATTERN.is_match(address)
}

/// Validator reporting [`INVALID_EMAIL_MESSAGE`] for malformed addresses.
///
/// The empty string is reported as invalid; callers that allow an empty
/// field should check `has_value` first or put the rule behind `required`.
pub fn email<T>() -> Validator<T>
where
    T: AsRef<str> + 'static,
{
    Validator::deferred(|value: &T| {
        let valid = is_valid_email(value.as_ref());
        async move { (!valid).then(|| INVALID_EMAIL_MESSAGE.to_string()) }
    })
    .named("email")
}
