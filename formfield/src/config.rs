//! Field configuration types.

use std::time::Duration;

/// Default window over which value changes are coalesced.
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

/// Default error shown when a validator faults under [`FaultPolicy::Report`].
pub const DEFAULT_FAULT_MESSAGE: &str = "Validation could not be completed";

/// Per-field configuration.
///
/// Build one with `FieldConfig::default()` and the builder methods, then
/// hand it to [`FieldState::with_config`](crate::field::FieldState::with_config).
#[derive(Debug, Clone)]
pub struct FieldConfig {
    /// Value changes inside this window trigger a single validation of the
    /// latest value at the end of the window.
    pub rate_limit: Duration,

    /// What to do when a validator faults.
    pub fault_policy: FaultPolicy,

    /// Error committed to the field when a run faults under
    /// [`FaultPolicy::Report`].
    pub fault_message: String,

    /// Abort the previous in-flight run when a newer one starts.
    /// Results of superseded runs are discarded either way.
    pub cancel_superseded: bool,

    /// Initial value of the `can_validate` gate.
    pub can_validate: bool,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            rate_limit: DEFAULT_RATE_LIMIT,
            fault_policy: FaultPolicy::default(),
            fault_message: DEFAULT_FAULT_MESSAGE.to_string(),
            cancel_superseded: false,
            can_validate: true,
        }
    }
}

impl FieldConfig {
    /// Set the rate-limit window.
    pub fn rate_limit(mut self, window: Duration) -> Self {
        self.rate_limit = window;
        self
    }

    /// Validate on the next scheduler tick instead of after a window.
    pub fn immediate(mut self) -> Self {
        self.rate_limit = Duration::ZERO;
        self
    }

    /// Set the fault policy.
    pub fn fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }

    /// Set the error committed for a reported fault.
    pub fn fault_message(mut self, message: impl Into<String>) -> Self {
        self.fault_message = message.into();
        self
    }

    /// Abort superseded runs instead of letting them finish unobserved.
    pub fn cancel_superseded(mut self) -> Self {
        self.cancel_superseded = true;
        self
    }

    /// Start with validation suppressed until something enables it.
    pub fn gated(mut self) -> Self {
        self.can_validate = false;
        self
    }
}

/// Behavior when a validator faults (returns a fault or panics).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FaultPolicy {
    /// Log the fault and treat the validator as having reported no error.
    /// The chain moves on to the next validator.
    #[default]
    Ignore,

    /// Stop the chain and report the fault. The field shows
    /// [`FieldConfig::fault_message`] as its error.
    Report,
}
