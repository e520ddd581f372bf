//! Sequential, short-circuiting validator runner.

use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;

use super::error::{ChainError, ValidatorFault, extract_panic_message};
use super::result::ValidationOutcome;
use super::validator::{ValidationResponse, Validator};
use crate::config::FaultPolicy;

/// Runs a value through an ordered list of validators.
///
/// Validators are invoked one at a time, in order. The first one to report
/// a non-empty message ends the run; the validators after it are never
/// invoked. A deferred validator is awaited before moving on. No timeout is
/// applied here: a validator that never resolves keeps the run pending.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatorChain {
    policy: FaultPolicy,
}

/// What a single validator had to say.
enum Verdict {
    Pass,
    Fail(String),
    Fault(ValidatorFault),
}

impl ValidatorChain {
    /// Create a chain runner with the given fault policy
    pub fn new(policy: FaultPolicy) -> Self {
        Self { policy }
    }

    /// The fault policy in effect
    pub fn policy(&self) -> FaultPolicy {
        self.policy
    }

    /// Run `value` through `validators`.
    ///
    /// Under [`FaultPolicy::Ignore`] this never returns `Err`.
    pub async fn run<T>(
        &self,
        value: &T,
        validators: &[Validator<T>],
    ) -> Result<ValidationOutcome, ChainError> {
        for (index, validator) in validators.iter().enumerate() {
            match invoke(validator, value).await {
                Verdict::Pass => {}
                Verdict::Fail(message) => return Ok(ValidationOutcome::Error(message)),
                Verdict::Fault(fault) => match self.policy {
                    FaultPolicy::Ignore => {
                        log::warn!(
                            "Validator #{} ({}) faulted, treating as valid: {}",
                            index,
                            validator.name().unwrap_or("unnamed"),
                            fault
                        );
                    }
                    FaultPolicy::Report => {
                        return Err(ChainError::Faulted {
                            index,
                            validator: validator.name().map(str::to_string),
                            fault,
                        });
                    }
                },
            }
        }

        Ok(ValidationOutcome::NoError)
    }
}

async fn invoke<T>(validator: &Validator<T>, value: &T) -> Verdict {
    let response = match panic::catch_unwind(AssertUnwindSafe(|| validator.call(value))) {
        Ok(response) => response,
        Err(payload) => return Verdict::Fault(ValidatorFault::panicked(extract_panic_message(&payload))),
    };

    match response {
        ValidationResponse::Valid => Verdict::Pass,
        ValidationResponse::Invalid(message) => message_verdict(Some(message)),
        ValidationResponse::Faulted(fault) => Verdict::Fault(fault),
        ValidationResponse::Deferred(fut) => match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(Ok(message)) => message_verdict(message),
            Ok(Err(fault)) => Verdict::Fault(fault),
            Err(payload) => Verdict::Fault(ValidatorFault::panicked(extract_panic_message(&payload))),
        },
    }
}

fn message_verdict(message: Option<String>) -> Verdict {
    match message {
        Some(message) if !message.is_empty() => Verdict::Fail(message),
        _ => Verdict::Pass,
    }
}
