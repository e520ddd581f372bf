//! Dropdown select layout.

use serde::{Deserialize, Serialize};

use crate::config::FieldConfig;
use crate::field::FieldState;
use crate::state::{State, Subscription};

/// Default text of the search box and its placeholder.
pub const DEFAULT_SEARCH_TEXT: &str = "Search here..";

/// One option of a select input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectInputValue {
    pub disabled: bool,
    pub active: bool,
    pub value: Option<String>,
    pub label: Option<String>,
}

impl SelectInputValue {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            label: Some(label.into()),
            ..Default::default()
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// Headless model of a dropdown select bound to a [`FieldState`].
///
/// Choosing an option writes its value into the field, which in turn
/// closes the dropdown.
pub struct SelectInputLayout {
    field: FieldState<Option<String>>,
    items: State<Vec<SelectInputValue>>,
    has_focus: State<bool>,
    open_focused: State<bool>,
    search_text: State<String>,
    placeholder: String,
    label: String,
    _close_on_select: Subscription,
}

impl SelectInputLayout {
    /// Create an empty select.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn new() -> Self {
        Self::with_config(FieldConfig::default())
    }

    /// Create an empty select whose field uses `config`.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn with_config(config: FieldConfig) -> Self {
        let field = FieldState::with_config(None, config);
        let has_focus = State::new(false);

        let focus = has_focus.clone();
        let close_on_select = field.value_state().subscribe(move |_| {
            focus.set_if_changed(false);
        });

        Self {
            field,
            items: State::new(Vec::new()),
            has_focus,
            open_focused: State::new(false),
            search_text: State::new(DEFAULT_SEARCH_TEXT.to_string()),
            placeholder: DEFAULT_SEARCH_TEXT.to_string(),
            label: "label".to_string(),
            _close_on_select: close_on_select,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_items(self, items: impl IntoIterator<Item = SelectInputValue>) -> Self {
        self.set_items(items);
        self
    }

    pub fn set_items(&self, items: impl IntoIterator<Item = SelectInputValue>) {
        self.items.set(items.into_iter().collect());
    }

    pub fn items(&self) -> Vec<SelectInputValue> {
        self.items.get()
    }

    pub fn field(&self) -> &FieldState<Option<String>> {
        &self.field
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn search_text(&self) -> String {
        self.search_text.get()
    }

    pub fn set_search_text(&self, text: impl Into<String>) {
        self.search_text.set_if_changed(text.into());
    }

    /// Whether the dropdown is open
    pub fn has_focus(&self) -> bool {
        self.has_focus.get()
    }

    /// Whether the dropdown has been opened at least once
    pub fn open_focused(&self) -> bool {
        self.open_focused.get()
    }

    /// Open or close the dropdown.
    pub fn toggle_dropdown(&self) {
        let open = !self.has_focus.get();
        self.has_focus.set(open);
        if open {
            self.open_focused.set_if_changed(true);
        }
    }

    /// Choose the option at `index`.
    ///
    /// The option becomes the only active one and its value is written to
    /// the field. Returns `false` (and changes nothing) when the index is out
    /// of range or the option is disabled.
    pub fn select_value(&self, index: usize) -> bool {
        let mut chosen = None;
        self.items.update(|items| {
            let Some(item) = items.get(index) else {
                return;
            };
            if item.disabled {
                return;
            }
            for (i, item) in items.iter_mut().enumerate() {
                item.active = i == index;
            }
            chosen = Some(items[index].value.clone());
        });

        match chosen {
            Some(value) => {
                self.field.set_value(value);
                // Re-selecting the current value does not touch the field,
                // so close explicitly.
                self.has_focus.set_if_changed(false);
                true
            }
            None => false,
        }
    }

    /// The active option, if any
    pub fn selected(&self) -> Option<SelectInputValue> {
        self.items.with(|items| items.iter().find(|i| i.active).cloned())
    }

    /// Tear down the field.
    pub fn dispose(&self) {
        self.field.dispose();
    }
}

impl Default for SelectInputLayout {
    fn default() -> Self {
        Self::new()
    }
}
