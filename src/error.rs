//! Error types for cruce
//!
//! Provides structured error types with context for better debugging
//! and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for cruce operations
#[derive(Debug, Error)]
pub enum Error {
    // ==========================================================================
    // Workbook Errors
    // ==========================================================================
    #[error("Workbook directory '{path}' does not exist")]
    WorkbookNotFound { path: PathBuf },

    #[error("Sheet '{title}' does not exist")]
    SheetNotFound { title: String },

    #[error("Sheet '{title}' is not valid: {message}")]
    SheetParse { title: String, message: String },

    // ==========================================================================
    // Validation Errors
    // ==========================================================================
    #[error("Invalid {kind} '{value}': {reason}")]
    InvalidIdentifier {
        kind: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Reserved name '{name}' cannot be used")]
    ReservedName { name: String },

    // ==========================================================================
    // Query Errors
    // ==========================================================================
    #[error("Condition parse error: {message}")]
    ParseError { message: String },

    #[error(transparent)]
    MalformedCondition(#[from] cruceql::MalformedCondition),

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    #[error("Invalid configuration: {message}")]
    ConfigError { message: String },

    // ==========================================================================
    // IO Errors
    // ==========================================================================
    #[error("Failed to read file '{path}': {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ==========================================================================
    // Serialization Errors
    // ==========================================================================
    #[error("Failed to parse YAML: {message}")]
    YamlParseError { message: String },

    #[error("Failed to parse JSON: {message}")]
    JsonParseError { message: String },

    // ==========================================================================
    // Catch-all
    // ==========================================================================
    #[error("{0}")]
    Other(String),
}

/// Result type alias for cruce operations
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Conversions from external error types
// =============================================================================

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::YamlParseError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::JsonParseError {
            message: err.to_string(),
        }
    }
}

impl From<cruceql::ParseError> for Error {
    fn from(err: cruceql::ParseError) -> Self {
        Error::ParseError {
            message: err.to_string(),
        }
    }
}

impl From<crate::validation::ValidationError> for Error {
    fn from(err: crate::validation::ValidationError) -> Self {
        use crate::validation::ValidationError;

        match err {
            ValidationError::InvalidIdentifier(kind, value, reason) => Error::InvalidIdentifier {
                kind,
                value,
                reason,
            },
            ValidationError::TooLong(kind, value, _max) => Error::InvalidIdentifier {
                kind,
                value,
                reason: "exceeds maximum length",
            },
            ValidationError::Empty(kind) => Error::InvalidIdentifier {
                kind,
                value: String::new(),
                reason: "cannot be empty",
            },
            ValidationError::Reserved(name) => Error::ReservedName { name },
        }
    }
}

// =============================================================================
// Error Display Helpers
// =============================================================================

impl Error {
    /// Returns a user-friendly suggestion for fixing the error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::WorkbookNotFound { .. } => Some("Create one first with: cruce init"),
            Error::SheetNotFound { .. } => Some("List available sheets with: cruce sheets"),
            Error::SheetParse { .. } => {
                Some("Sheets must be JSON objects with 'headers' and 'rows' arrays")
            }
            Error::InvalidIdentifier { .. } => {
                Some("Sheet titles cannot contain '/', '\\', '..' or control characters")
            }
            Error::ParseError { .. } => {
                Some("Write conditions as: Edad >= 40, Sexo IN [F, M], Dx CONTAINS 'texto'")
            }
            Error::MalformedCondition(_) => Some(
                "Operators are equals, greaterThanOrEqual, lessThanOrEqual, \
                 in (array) and includes",
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::SheetNotFound {
            title: "Laboratorio".to_string(),
        };
        assert_eq!(err.to_string(), "Sheet 'Laboratorio' does not exist");
    }

    #[test]
    fn test_error_suggestion() {
        let err = Error::SheetNotFound {
            title: "Laboratorio".to_string(),
        };
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_malformed_condition_converts() {
        let spec = cruceql::ConditionSpec::new("Edad", "between", "40");
        let malformed = cruceql::Condition::try_from(spec).unwrap_err();
        let err = Error::from(malformed);

        assert!(err.to_string().contains("unknown operator 'between'"));
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_validation_error_converts() {
        let err = Error::from(crate::validation::validate_sheet_title("../x").unwrap_err());
        assert!(matches!(err, Error::InvalidIdentifier { kind: "sheet title", .. }));
    }
}
