use std::error::Error;
use std::fmt::{Display, Formatter};

/// Insert/patch validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is absent or blank.
    MissingField {
        record: &'static str,
        field: &'static str,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { record, field } => {
                write!(f, "{record} validation failed: `{field}` is required")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    record: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField { record, field });
    }
    Ok(())
}

pub(crate) fn require<T>(
    record: &'static str,
    field: &'static str,
    value: Option<T>,
) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingField { record, field })
}
