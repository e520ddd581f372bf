//! Validators and the chain that runs them.
//!
//! A [`Validator`] maps a value to an optional error message, possibly
//! asynchronously. A [`ValidatorChain`] runs an ordered list of them and
//! stops at the first error.
//!
//! # Example
//!
//! ```
//! use formfield::validation::{ValidationOutcome, ValidatorChain, rules};
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! rt.block_on(async {
//!     let validators = vec![
//!         rules::required::<String>("Email is required"),
//!         formfield::validation::email(),
//!     ];
//!     let outcome = ValidatorChain::default()
//!         .run(&"not-an-email".to_string(), &validators)
//!         .await
//!         .unwrap();
//!     assert_eq!(
//!         outcome,
//!         ValidationOutcome::Error("The provided email is not valid".into())
//!     );
//! });
//! ```

mod chain;
mod email;
mod error;
mod result;
pub mod rules;
mod validator;

pub use chain::ValidatorChain;
pub use email::{INVALID_EMAIL_MESSAGE, email, is_valid_email};
pub use error::{ChainError, ValidatorFault, extract_panic_message};
pub use result::ValidationOutcome;
pub use validator::{BoxFuture, DeferredResult, ValidationResponse, Validator};
