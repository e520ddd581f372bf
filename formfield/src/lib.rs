//! Reactive form fields with debounced, race-free async validation.
//!
//! The crate is built from a few layers:
//!
//! - [`state`]: observable cells with RAII subscriptions.
//! - [`effect`]: rate-limited reactions over cells.
//! - [`validation`]: validators and the short-circuiting chain that runs them.
//! - [`field`]: [`FieldState`](field::FieldState), which ties a value to its
//!   validators and exposes error/validating/success flags.
//! - [`gate`]: hold validation back until a field first loses focus.
//! - [`layout`]: headless input and select models for a view layer.

pub mod config;
pub mod effect;
pub mod field;
pub mod gate;
pub mod layout;
pub mod state;
pub mod validation;

pub mod prelude {
    pub use crate::config::{FaultPolicy, FieldConfig};
    pub use crate::effect::{Effect, EffectContext};
    pub use crate::field::{FieldId, FieldState, FieldStatus, FieldValue};
    pub use crate::gate::ActivationGate;
    pub use crate::layout::{
        InputAttributes, InputClasses, InputLayout, InputType, SelectInputLayout,
        SelectInputValue, ValueUpdate,
    };
    pub use crate::state::{State, Subscription};
    pub use crate::validation::{
        ChainError, ValidationOutcome, ValidationResponse, Validator, ValidatorChain,
        ValidatorFault, email, rules,
    };
}
