//! Headless view models that consume field state.
//!
//! These types hold what a view needs to render an input (focus, CSS state
//! flags, error text) without doing any rendering themselves.

mod input;
mod select;

pub use input::{InputAttributes, InputClasses, InputLayout, InputType, ValueUpdate};
pub use select::{DEFAULT_SEARCH_TEXT, SelectInputLayout, SelectInputValue};
