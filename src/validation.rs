//! Input validation for cruce
//!
//! Sheet titles become file names inside the workbook, so they are checked
//! for path traversal before any file is touched. Field names and national
//! IDs only need to be non-empty.

use thiserror::Error;

/// Validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid {0} '{1}': {2}")]
    InvalidIdentifier(&'static str, String, &'static str),

    #[error("{0} '{1}' is too long (max {2} characters)")]
    TooLong(&'static str, String, usize),

    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("Reserved name: '{0}'")]
    Reserved(String),
}

/// Spreadsheet services cap tab titles at 100 characters
pub const MAX_SHEET_TITLE_LENGTH: usize = 100;

/// Maximum length for field names
pub const MAX_FIELD_NAME_LENGTH: usize = 255;

/// Names that cannot be used as file stems on every platform
const RESERVED_NAMES: &[&str] = &[
    "con", "prn", "aux", "nul",
    "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8", "com9",
    "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

/// Validate a sheet title
///
/// Rules:
/// - Must be 1-100 characters
/// - Spaces and accented letters are fine ("Eco mamaria", "Oftalmología")
/// - No path separators, `..`, or control characters
/// - Cannot start with a dot or start/end with whitespace
/// - Cannot be a reserved device name (case-insensitive)
pub fn validate_sheet_title(title: &str) -> Result<(), ValidationError> {
    const KIND: &str = "sheet title";

    if title.is_empty() {
        return Err(ValidationError::Empty(KIND));
    }

    if title.chars().count() > MAX_SHEET_TITLE_LENGTH {
        return Err(ValidationError::TooLong(KIND, title.to_string(), MAX_SHEET_TITLE_LENGTH));
    }

    if title.contains("..") || title.contains('/') || title.contains('\\') {
        return Err(ValidationError::InvalidIdentifier(
            KIND,
            title.to_string(),
            "contains path traversal characters",
        ));
    }

    if title.chars().any(char::is_control) {
        return Err(ValidationError::InvalidIdentifier(
            KIND,
            title.to_string(),
            "contains control characters",
        ));
    }

    if title.starts_with('.') {
        return Err(ValidationError::InvalidIdentifier(
            KIND,
            title.to_string(),
            "cannot start with a dot",
        ));
    }

    if title.trim() != title {
        return Err(ValidationError::InvalidIdentifier(
            KIND,
            title.to_string(),
            "cannot start or end with whitespace",
        ));
    }

    if RESERVED_NAMES.contains(&title.to_lowercase().as_str()) {
        return Err(ValidationError::Reserved(title.to_string()));
    }

    Ok(())
}

/// Validate a field (column) name
pub fn validate_field_name(name: &str) -> Result<(), ValidationError> {
    const KIND: &str = "field name";

    if name.trim().is_empty() {
        return Err(ValidationError::Empty(KIND));
    }

    if name.chars().count() > MAX_FIELD_NAME_LENGTH {
        return Err(ValidationError::TooLong(KIND, name.to_string(), MAX_FIELD_NAME_LENGTH));
    }

    Ok(())
}

/// Normalize a national ID for lookups: surrounding whitespace is dropped
pub fn normalize_dni(dni: &str) -> Result<String, ValidationError> {
    let dni = dni.trim();
    if dni.is_empty() {
        return Err(ValidationError::Empty("DNI"));
    }
    Ok(dni.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_sheet_titles() {
        assert!(validate_sheet_title("Pacientes").is_ok());
        assert!(validate_sheet_title("Eco mamaria").is_ok());
        assert!(validate_sheet_title("Oftalmología").is_ok());
        assert!(validate_sheet_title("Espirometria (2024)").is_ok());
    }

    #[test]
    fn test_path_traversal_blocked() {
        assert!(validate_sheet_title("..").is_err());
        assert!(validate_sheet_title("../secret").is_err());
        assert!(validate_sheet_title("foo/bar").is_err());
        assert!(validate_sheet_title("foo\\bar").is_err());
        assert!(validate_sheet_title(".hidden").is_err());
    }

    #[test]
    fn test_whitespace_and_control_characters() {
        assert!(validate_sheet_title(" Pacientes").is_err());
        assert!(validate_sheet_title("Pacientes ").is_err());
        assert!(validate_sheet_title("Paci\nentes").is_err());
    }

    #[test]
    fn test_reserved_names() {
        assert!(matches!(validate_sheet_title("CON"), Err(ValidationError::Reserved(_))));
        assert!(validate_sheet_title("nul").is_err());
    }

    #[test]
    fn test_empty_and_too_long() {
        assert!(validate_sheet_title("").is_err());
        assert!(validate_sheet_title(&"a".repeat(101)).is_err());
        assert!(validate_sheet_title(&"á".repeat(100)).is_ok());
    }

    #[test]
    fn test_field_names() {
        assert!(validate_field_name("Presion Arterial (mmhg)").is_ok());
        assert!(validate_field_name("   ").is_err());
    }

    #[test]
    fn test_normalize_dni() {
        assert_eq!(normalize_dni(" 30111222 ").unwrap(), "30111222");
        assert!(normalize_dni("  ").is_err());
    }
}
