use crate::report::ErrorReport;

/// Errors that can occur while registering validators or checking instances.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A validator was configured with inconsistent options.
    #[error("validator `{validator}` configuration validation failed: {message}")]
    Configuration { validator: String, message: String },

    /// No schema registered for the instance's type.
    #[error("no schema registered for type {0}")]
    NoSchema(String),

    /// One or more fields failed their validators.
    #[error("validation failed for {type_name}: {report}")]
    ValidationFailed {
        type_name: String,
        report: ErrorReport,
    },

    /// The field key cannot be used as a string property name.
    #[error("can only validate string-named fields, got {0}")]
    UnsupportedFieldKey(String),

    /// The instance or payload could not be converted to or from JSON.
    #[error("instance is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl SchemaError {
    /// Build a configuration error for the named validator.
    pub fn configuration(validator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            validator: validator.into(),
            message: message.into(),
        }
    }

    /// The per-field report, if this is a validation failure.
    pub fn report(&self) -> Option<&ErrorReport> {
        match self {
            Self::ValidationFailed { report, .. } => Some(report),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SchemaError>;
