use thiserror::Error;

#[derive(Error, Debug)]
pub enum VacancyError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to replace store file: {0}")]
    PersistError(#[from] tempfile::PersistError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

impl VacancyError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    /// Short message suitable for printing to a terminal user.
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(_) => "Could not reach the vacancies API".to_string(),
            Self::IoError(e) => format!("File system error: {}", e),
            Self::SerializationError(_) => "Could not encode vacancy data".to_string(),
            Self::PersistError(e) => format!("Could not save the store file: {}", e.error),
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::ConfigValidationError { field, message } => {
                format!("Configuration field '{}' is invalid: {}", field, message)
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            Self::ValidationError { message } => message.clone(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ApiError(_) => "Check your network connection and the configured endpoint",
            Self::IoError(_) | Self::PersistError(_) => {
                "Check that the data directory exists and is writable"
            }
            Self::SerializationError(_) => "Inspect the record that failed to encode",
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration file or the command-line flags"
            }
            Self::ValidationError { .. } => "Provide a non-empty title and link",
        }
    }
}

pub type Result<T> = std::result::Result<T, VacancyError>;
