//! Validation helpers for DTOs.

use validator::ValidationError;

/// Exact length of a match identifier token.
pub const MATCH_ID_LENGTH: usize = 16;

/// Validates that a match identifier is exactly 16 lowercase alphanumeric
/// characters. Runs before any storage lookup.
///
/// # Examples
///
/// ```ignore
/// validate_match_id("m4tch0001abcdef0") // Ok
/// validate_match_id("M4TCH0001ABCDEF0") // Err - uppercase
/// validate_match_id("m4tch0001")        // Err - too short
/// ```
pub fn validate_match_id(id: &str) -> Result<(), ValidationError> {
    if id.len() != MATCH_ID_LENGTH {
        let mut err = ValidationError::new("match_id_length");
        err.message = Some(
            format!(
                "match ID must be exactly {} characters (got {})",
                MATCH_ID_LENGTH,
                id.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() && !c.is_ascii_uppercase())
    {
        let mut err = ValidationError::new("match_id_format");
        err.message = Some("match ID must contain only lowercase alphanumeric characters".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_match_id_valid() {
        assert!(validate_match_id("m4tch0001abcdef0").is_ok());
        assert!(validate_match_id("0000000000000000").is_ok());
        assert!(validate_match_id("abcdefghijklmnop").is_ok());
    }

    #[test]
    fn test_validate_match_id_invalid_length() {
        assert!(validate_match_id("m4tch0001abcdef").is_err()); // too short
        assert!(validate_match_id("m4tch0001abcdef01").is_err()); // too long
        assert!(validate_match_id("").is_err()); // empty
    }

    #[test]
    fn test_validate_match_id_invalid_format() {
        assert!(validate_match_id("M4TCH0001ABCDEF0").is_err()); // uppercase
        assert!(validate_match_id("m4tch-001abcdef0").is_err()); // punctuation
        assert!(validate_match_id("m4tch 001abcdef0").is_err()); // space
        assert!(validate_match_id("m4tch0001abcdéf0").is_err()); // non-ascii
    }
}
