use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

use crate::shared::constants::MAX_OBJECT_NAME_BYTES;

lazy_static! {
    /// Regex for validating storage object names
    /// Must be non-empty and free of ASCII control characters
    /// - Valid: "report.pdf", "exports/2024/q1 summary.csv", "données.txt"
    /// - Invalid: "", "line\nbreak", "tab\there"
    pub static ref OBJECT_NAME_REGEX: Regex = Regex::new(r"^[^\x00-\x1F\x7F]+$").unwrap();
}

/// Validate a storage object name against S3 key rules
pub fn validate_object_name(name: &str) -> Result<(), ValidationError> {
    if name.len() > MAX_OBJECT_NAME_BYTES {
        let mut error = ValidationError::new("object_name_too_long");
        error.message = Some(Cow::Owned(format!(
            "fileName must be at most {} bytes",
            MAX_OBJECT_NAME_BYTES
        )));
        return Err(error);
    }

    if !OBJECT_NAME_REGEX.is_match(name) {
        let mut error = ValidationError::new("invalid_object_name");
        error.message = Some(Cow::Borrowed(
            "fileName must be non-empty and contain no control characters",
        ));
        return Err(error);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_name_regex_valid() {
        assert!(OBJECT_NAME_REGEX.is_match("report.pdf"));
        assert!(OBJECT_NAME_REGEX.is_match("exports/2024/q1 summary.csv"));
        assert!(OBJECT_NAME_REGEX.is_match("données.txt"));
        assert!(OBJECT_NAME_REGEX.is_match("a"));
    }

    #[test]
    fn test_object_name_regex_invalid() {
        assert!(!OBJECT_NAME_REGEX.is_match("")); // empty
        assert!(!OBJECT_NAME_REGEX.is_match("line\nbreak")); // newline
        assert!(!OBJECT_NAME_REGEX.is_match("tab\there")); // tab
        assert!(!OBJECT_NAME_REGEX.is_match("del\x7f")); // DEL
    }

    #[test]
    fn test_validate_object_name_length_is_in_bytes() {
        // 512 two-byte characters = 1024 bytes
        let at_limit = "é".repeat(512);
        assert!(validate_object_name(&at_limit).is_ok());

        let over_limit = "é".repeat(513);
        let err = validate_object_name(&over_limit).unwrap_err();
        assert_eq!(err.code, "object_name_too_long");
    }
}
