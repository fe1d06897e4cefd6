use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecastError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RecastError {
    /// Name of the offending input field, if the error is a validation failure.
    pub fn field(&self) -> Option<&str> {
        match self {
            RecastError::InvalidInput { field, .. } => Some(field),
            RecastError::Serialization(_) => None,
        }
    }
}

impl From<serde_json::Error> for RecastError {
    fn from(e: serde_json::Error) -> Self {
        RecastError::Serialization(e.to_string())
    }
}
