//! Validator functions and their responses.

use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::error::ValidatorFault;

/// Type alias for boxed futures used in async validation.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a deferred validator eventually resolves to.
pub type DeferredResult = Result<Option<String>, ValidatorFault>;

type CheckFn<T> = dyn Fn(&T) -> ValidationResponse + Send + Sync;

/// The immediate answer of a validator.
pub enum ValidationResponse {
    /// No error.
    Valid,
    /// Error message. An empty message counts as no error.
    Invalid(String),
    /// The answer is not known yet.
    Deferred(BoxFuture<'static, DeferredResult>),
    /// The validator failed to produce an answer.
    Faulted(ValidatorFault),
}

impl ValidationResponse {
    /// Wrap a future as a deferred response
    pub fn deferred<Fut>(fut: Fut) -> Self
    where
        Fut: Future<Output = DeferredResult> + Send + 'static,
    {
        Self::Deferred(Box::pin(fut))
    }
}

impl From<Option<String>> for ValidationResponse {
    fn from(message: Option<String>) -> Self {
        match message {
            Some(msg) => Self::Invalid(msg),
            None => Self::Valid,
        }
    }
}

impl From<String> for ValidationResponse {
    fn from(message: String) -> Self {
        Self::Invalid(message)
    }
}

impl From<&str> for ValidationResponse {
    fn from(message: &str) -> Self {
        Self::Invalid(message.to_string())
    }
}

impl From<ValidatorFault> for ValidationResponse {
    fn from(fault: ValidatorFault) -> Self {
        Self::Faulted(fault)
    }
}

impl std::fmt::Debug for ValidationResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Valid => f.write_str("Valid"),
            Self::Invalid(msg) => f.debug_tuple("Invalid").field(msg).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
            Self::Faulted(fault) => f.debug_tuple("Faulted").field(fault).finish(),
        }
    }
}

/// A single validation rule over values of type `T`.
///
/// Validators are stateless and cheap to clone; their only identity is
/// their position in a field's validator list (plus an optional name used
/// in log lines and fault reports).
///
/// # Example
///
/// ```
/// use formfield::validation::Validator;
///
/// let not_admin = Validator::sync(|v: &String| {
///     (v == "admin").then(|| "That name is reserved".to_string())
/// });
///
/// let available = Validator::deferred(|v: &String| {
///     let taken = v == "taken";
///     async move { taken.then(|| "Already in use".to_string()) }
/// })
/// .named("username-available");
/// # let _ = (not_admin, available);
/// ```
pub struct Validator<T> {
    name: Option<Cow<'static, str>>,
    check: Arc<CheckFn<T>>,
}

impl<T> Validator<T> {
    /// Create a validator from a closure returning a full [`ValidationResponse`].
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&T) -> ValidationResponse + Send + Sync + 'static,
    {
        Self {
            name: None,
            check: Arc::new(f),
        }
    }

    /// Create a synchronous validator.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        Self::new(move |v| f(v).into())
    }

    /// Create an asynchronous validator.
    ///
    /// The closure receives the value by reference and must capture whatever
    /// it needs into the returned future.
    pub fn deferred<F, Fut>(f: F) -> Self
    where
        F: Fn(&T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<String>> + Send + 'static,
    {
        Self::new(move |v| {
            let fut = f(v);
            ValidationResponse::deferred(async move { Ok(fut.await) })
        })
    }

    /// Create an asynchronous validator that may fault.
    pub fn fallible<F, Fut>(f: F) -> Self
    where
        F: Fn(&T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DeferredResult> + Send + 'static,
    {
        Self::new(move |v| ValidationResponse::deferred(f(v)))
    }

    /// Attach a name used in logs and fault reports.
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The validator's name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Invoke the validator.
    pub fn call(&self, value: &T) -> ValidationResponse {
        (self.check)(value)
    }
}

impl<T> Clone for Validator<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            check: Arc::clone(&self.check),
        }
    }
}

impl<T> std::fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
