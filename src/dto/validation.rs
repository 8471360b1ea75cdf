//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a lobby code is exactly 6 uppercase alphanumeric characters.
///
/// # Examples
///
/// ```ignore
/// validate_lobby_code("AB12CD") // Ok
/// validate_lobby_code("ab12cd") // Err - lowercase
/// validate_lobby_code("AB12C")  // Err - too short
/// ```
pub fn validate_lobby_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != 6 {
        let mut err = ValidationError::new("lobby_code_length");
        err.message =
            Some(format!("Lobby code must be exactly 6 characters (got {})", code.len()).into());
        return Err(err);
    }

    if !code
        .bytes()
        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    {
        let mut err = ValidationError::new("lobby_code_format");
        err.message = Some("Lobby code must contain only A-Z and 0-9".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a display name is 1-24 characters with no control characters.
pub fn validate_player_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 24 {
        let mut err = ValidationError::new("player_name_length");
        err.message = Some("Player name must be 1-24 characters".into());
        return Err(err);
    }

    if trimmed.chars().any(char::is_control) {
        let mut err = ValidationError::new("player_name_format");
        err.message = Some("Player name must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_lobby_code_valid() {
        assert!(validate_lobby_code("AB12CD").is_ok());
        assert!(validate_lobby_code("000000").is_ok());
        assert!(validate_lobby_code("ZZZZZZ").is_ok());
    }

    #[test]
    fn test_validate_lobby_code_invalid_length() {
        assert!(validate_lobby_code("AB12C").is_err()); // too short
        assert!(validate_lobby_code("AB12CDE").is_err()); // too long
        assert!(validate_lobby_code("").is_err()); // empty
    }

    #[test]
    fn test_validate_lobby_code_invalid_format() {
        assert!(validate_lobby_code("ab12cd").is_err()); // lowercase
        assert!(validate_lobby_code("AB 2CD").is_err()); // space
        assert!(validate_lobby_code("AB12C!").is_err()); // punctuation
    }

    #[test]
    fn test_validate_player_name() {
        assert!(validate_player_name("ada").is_ok());
        assert!(validate_player_name("  ada  ").is_ok()); // trimmed
        assert!(validate_player_name("").is_err());
        assert!(validate_player_name("   ").is_err());
        assert!(validate_player_name(&"x".repeat(25)).is_err());
        assert!(validate_player_name("a\tb").is_err());
    }
}
