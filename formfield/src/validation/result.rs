/// Result of one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ValidationOutcome {
    /// Every validator passed.
    #[default]
    NoError,
    /// The first validator to fail reported this message.
    Error(String),
}

impl ValidationOutcome {
    /// Check if the run passed.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::NoError)
    }

    /// Check if the run reported an error.
    pub fn is_error(&self) -> bool {
        !self.is_valid()
    }

    /// Get the error message (if any).
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::NoError => None,
            Self::Error(msg) => Some(msg),
        }
    }

    /// Convert into the optional error message stored on a field.
    pub fn into_message(self) -> Option<String> {
        match self {
            Self::NoError => None,
            Self::Error(msg) => Some(msg),
        }
    }
}

impl From<Option<String>> for ValidationOutcome {
    fn from(message: Option<String>) -> Self {
        match message {
            Some(msg) if !msg.is_empty() => Self::Error(msg),
            _ => Self::NoError,
        }
    }
}
