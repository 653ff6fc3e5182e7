use thiserror::Error;

/// Errors raised while locating, parsing or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A loaded value breaks a rule. `field` is the dotted settings path,
    /// e.g. `database.url`.
    #[error("Invalid value for {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("Unknown environment '{0}', expected one of: development, test, staging, production")]
    InvalidEnvironment(String),

    /// Two sources that cannot be combined were both given.
    #[error("Conflicting configuration sources: {0}")]
    MutualExclusivityError(String),

    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        ConfigError::FileNotFound(path.into())
    }

    pub fn mutual_exclusivity(message: impl Into<String>) -> Self {
        ConfigError::MutualExclusivityError(message.into())
    }
}
