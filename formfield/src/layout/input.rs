//! Text/number/password/email input layout.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::config::FieldConfig;
use crate::field::{FieldState, FieldValue};
use crate::gate::ActivationGate;
use crate::state::{State, Subscription};
use crate::validation::email;

/// The HTML-ish `type` of an input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Text,
    Number,
    Password,
    Email,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Password => "password",
            Self::Email => "email",
        }
    }
}

/// When the view pushes edits into the field value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueUpdate {
    /// On every input event.
    #[default]
    Input,
    /// On key release.
    Keyup,
}

/// Declarative attributes of an input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputAttributes<T> {
    pub label: String,
    pub value: Option<T>,
    pub key: Option<String>,
    pub name: Option<String>,
    pub spellcheck: bool,
    pub auto_complete: Option<String>,
    #[serde(rename = "type")]
    pub input_type: InputType,
}

impl<T> InputAttributes<T> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: None,
            key: None,
            name: None,
            spellcheck: false,
            auto_complete: None,
            input_type: InputType::default(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn value(mut self, value: T) -> Self {
        self.value = Some(value);
        self
    }

    pub fn input_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    /// Fill in defaults: `key` falls back to `name` and `name` to `key`.
    pub fn resolve(mut self) -> Self {
        if self.key.is_none() {
            self.key = self.name.clone();
        }
        if self.name.is_none() {
            self.name = self.key.clone();
        }
        self
    }
}

/// CSS state flags of an input group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputClasses {
    pub is_focused: bool,
    pub has_value: bool,
    pub has_error: bool,
    pub has_success: bool,
}

impl InputClasses {
    /// Class list for the form group element.
    pub fn class_list(&self) -> Vec<&'static str> {
        let mut classes = vec!["md-form-group", "md-label-floating"];
        for (on, class) in [
            (self.is_focused, "is-focused"),
            (self.has_value, "has-value"),
            (self.has_error, "has-error"),
            (self.has_success, "has-success"),
        ] {
            if on {
                classes.push(class);
            }
        }
        classes
    }
}

/// Headless model of a labelled input bound to a [`FieldState`].
///
/// The view renders [`css_classes`](Self::css_classes) and
/// [`error_text`](Self::error_text), forwards focus changes through
/// [`focus`](Self::focus)/[`blur`](Self::blur), and writes edits into
/// [`field`](Self::field).
pub struct InputLayout<T> {
    attributes: InputAttributes<T>,
    field: FieldState<T>,
    has_focus: State<bool>,
    value_update: ValueUpdate,
    gate: Mutex<Option<ActivationGate>>,
    _trace: Subscription,
}

impl<T> InputLayout<T>
where
    T: FieldValue + Clone + PartialEq + std::fmt::Debug + Send + Sync + Default + 'static,
{
    /// Create a layout with a default-configured field.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn new(attributes: InputAttributes<T>) -> Self {
        Self::with_config(attributes, FieldConfig::default())
    }

    /// Create a layout whose field uses `config`.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn with_config(attributes: InputAttributes<T>, config: FieldConfig) -> Self {
        let attributes = attributes.resolve();
        let initial = attributes.value.clone().unwrap_or_default();
        let field = FieldState::with_config(initial, config);

        let key = attributes.key.clone().unwrap_or_default();
        let trace = field
            .value_state()
            .subscribe(move |v| log::trace!("[input {}] value changed: {:?}", key, v));

        Self {
            attributes,
            field,
            has_focus: State::new(false),
            value_update: ValueUpdate::default(),
            gate: Mutex::new(None),
            _trace: trace,
        }
    }

    /// Update the value on key release and hold validation back until the
    /// input first loses focus.
    pub fn with_keyup_value_update(mut self) -> Self {
        self.value_update = ValueUpdate::Keyup;
        let gate = self.field.gate_until_blur(&self.has_focus);
        *self.gate.get_mut().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(gate);
        self
    }

    pub fn attributes(&self) -> &InputAttributes<T> {
        &self.attributes
    }

    pub fn field(&self) -> &FieldState<T> {
        &self.field
    }

    pub fn value_update(&self) -> ValueUpdate {
        self.value_update
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus.get()
    }

    /// The focus cell, for binding by a view
    pub fn focus_state(&self) -> State<bool> {
        self.has_focus.clone()
    }

    pub fn focus(&self) {
        self.has_focus.set_if_changed(true);
    }

    pub fn blur(&self) {
        self.has_focus.set_if_changed(false);
    }

    /// Element id of the error text, `"<key>-error"`.
    pub fn error_id(&self) -> String {
        format!("{}-error", self.attributes.key.as_deref().unwrap_or_default())
    }

    /// The error to show under the input, if any.
    pub fn error_text(&self) -> Option<String> {
        if self.field.has_error() {
            self.field.error()
        } else {
            None
        }
    }

    pub fn css_classes(&self) -> InputClasses {
        let status = self.field.status();
        InputClasses {
            is_focused: self.has_focus.get(),
            has_value: status.has_value,
            has_error: status.has_error,
            has_success: status.has_success,
        }
    }

    /// Replace the value without validating it. Validation resumes the
    /// next time the input loses focus.
    pub fn reset(&self, value: T) {
        self.field.reset(value);
        let mut gate = self.gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        gate.get_or_insert_with(|| {
            ActivationGate::new(&self.has_focus, self.field.can_validate_state())
        })
        .arm();
    }

    /// Tear down the field and stop watching focus.
    pub fn dispose(&self) {
        if let Ok(mut gate) = self.gate.lock() {
            gate.take();
        }
        self.field.dispose();
    }

    /// How many times the blur gate has opened validation.
    pub fn activations(&self) -> u64 {
        self.gate
            .lock()
            .ok()
            .and_then(|gate| gate.as_ref().map(ActivationGate::activations))
            .unwrap_or(0)
    }
}

impl<T> InputLayout<T>
where
    T: FieldValue + AsRef<str> + Clone + PartialEq + std::fmt::Debug + Send + Sync + Default + 'static,
{
    /// An email input: email type, the email validator, and validation held
    /// back until the first blur.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn email(attributes: InputAttributes<T>) -> Self {
        let layout = Self::new(attributes.input_type(InputType::Email)).with_keyup_value_update();
        layout.field.set_validators([email()]);
        layout
    }
}
