//! Error types for erd_peewee

use thiserror::Error;

/// Result type for erd_peewee operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for erd_peewee
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Data model error in {element}: {message}")]
    DataModelError { element: String, message: String },

    #[error("Type mapping error: {0}")]
    TypeMappingError(String),

    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// Build a data model error for the given element
    pub fn data_model(element: impl Into<String>, message: impl Into<String>) -> Self {
        Error::DataModelError {
            element: element.into(),
            message: message.into(),
        }
    }
}

/// Convert Serde JSON errors to erd_peewee errors
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert Serde YAML errors to erd_peewee errors
impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert TOML deserialization errors to erd_peewee errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}
