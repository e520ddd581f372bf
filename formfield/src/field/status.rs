use uuid::Uuid;

/// Unique identifier for a field, used to tell fields apart in log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(Uuid);

impl FieldId {
    /// Create a new unique field ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for FieldId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of everything a view needs to render a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldStatus {
    /// The value is filled in.
    pub has_value: bool,
    /// The last committed run reported an error.
    pub has_error: bool,
    /// A run has completed without error.
    pub has_success: bool,
    /// The last committed error message.
    pub error: Option<String>,
    /// A run is in flight.
    pub validating: bool,
}
