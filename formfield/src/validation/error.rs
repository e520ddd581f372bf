//! Validator fault types.

use std::any::Any;

use thiserror::Error;

/// An unexpected failure inside a validator.
///
/// This is distinct from a validation error: a validation error is a message
/// describing what is wrong with the value, while a fault means the
/// validator itself could not produce an answer (a lost connection, a
/// panic, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidatorFault {
    /// Fault description
    pub message: String,
}

impl ValidatorFault {
    /// Create a new fault
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Fault for a validator that panicked
    pub fn panicked(message: impl Into<String>) -> Self {
        Self::new(format!("validator panicked: {}", message.into()))
    }
}

impl From<String> for ValidatorFault {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ValidatorFault {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Error returned by a chain run under [`FaultPolicy::Report`](crate::config::FaultPolicy::Report).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// A validator faulted; the validators after it were not invoked.
    #[error("validator #{index}{} faulted: {fault}", name_suffix(.validator))]
    Faulted {
        /// Position of the faulting validator in the list.
        index: usize,
        /// Name of the validator, if it was given one.
        validator: Option<String>,
        /// The fault itself.
        fault: ValidatorFault,
    },
}

impl ChainError {
    /// The underlying fault
    pub fn fault(&self) -> &ValidatorFault {
        match self {
            Self::Faulted { fault, .. } => fault,
        }
    }
}

fn name_suffix(name: &Option<String>) -> String {
    name.as_ref()
        .map(|n| format!(" ({n})"))
        .unwrap_or_default()
}

/// Extract a human-readable message from a panic payload.
///
/// Panics can contain either `&str` or `String` payloads. This function
/// attempts to extract either, falling back to a generic message.
pub fn extract_panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
