//! Built-in rules for string fields.

use regex::Regex;

use super::validator::Validator;

/// Require the value to be non-blank.
pub fn required<T>(msg: impl Into<String>) -> Validator<T>
where
    T: AsRef<str> + 'static,
{
    let msg = msg.into();
    Validator::sync(move |v: &T| v.as_ref().trim().is_empty().then(|| msg.clone())).named("required")
}

/// Require minimum length (in characters).
pub fn min_length<T>(min: usize, msg: impl Into<String>) -> Validator<T>
where
    T: AsRef<str> + 'static,
{
    let msg = msg.into();
    Validator::sync(move |v: &T| (v.as_ref().chars().count() < min).then(|| msg.clone()))
        .named("min_length")
}

/// Require maximum length (in characters).
pub fn max_length<T>(max: usize, msg: impl Into<String>) -> Validator<T>
where
    T: AsRef<str> + 'static,
{
    let msg = msg.into();
    Validator::sync(move |v: &T| (v.as_ref().chars().count() > max).then(|| msg.clone()))
        .named("max_length")
}

/// Require the value to match a regex pattern.
pub fn pattern<T>(pattern: &str, msg: impl Into<String>) -> Result<Validator<T>, regex::Error>
where
    T: AsRef<str> + 'static,
{
    let re = Regex::new(pattern)?;
    let msg = msg.into();
    Ok(Validator::sync(move |v: &T| (!re.is_match(v.as_ref())).then(|| msg.clone())).named("pattern"))
}

/// Require the value to equal another value.
pub fn equals<T>(other: impl Into<String>, msg: impl Into<String>) -> Validator<T>
where
    T: AsRef<str> + 'static,
{
    let other = other.into();
    let msg = msg.into();
    Validator::sync(move |v: &T| (v.as_ref() != other).then(|| msg.clone())).named("equals")
}

/// Require the value to contain a substring.
pub fn contains<T>(substr: impl Into<String>, msg: impl Into<String>) -> Validator<T>
where
    T: AsRef<str> + 'static,
{
    let substr = substr.into();
    let msg = msg.into();
    Validator::sync(move |v: &T| (!v.as_ref().contains(substr.as_str())).then(|| msg.clone()))
        .named("contains")
}
