//! Username type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    /// The input string is empty (after trimming).
    #[error("username cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("username must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a control character.
    #[error("username cannot contain control characters")]
    ControlCharacter,
}

/// A login name.
///
/// ## Constraints
///
/// - Surrounding whitespace is trimmed
/// - Length: 1-50 characters
/// - No control characters
///
/// ## Examples
///
/// ```
/// use homebase_core::Username;
///
/// assert_eq!(Username::parse("  alice ").unwrap().as_str(), "alice");
/// assert!(Username::parse("   ").is_err());
/// assert!(Username::parse(&"x".repeat(51)).is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type), sqlx(transparent))]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Maximum length of a username in characters.
    pub const MAX_LENGTH: usize = 50;

    /// Parse a `Username` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, longer than
    /// 50 characters, or contains control characters.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(UsernameError::Empty);
        }

        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if trimmed.chars().any(char::is_control) {
            return Err(UsernameError::ControlCharacter);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Username {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_usernames() {
        assert!(Username::parse("admin").is_ok());
        assert!(Username::parse("jane.doe").is_ok());
        assert!(Username::parse("Jane Doe").is_ok());
        assert!(Username::parse(&"a".repeat(50)).is_ok());
    }

    #[test]
    fn test_parse_trims() {
        assert_eq!(Username::parse("\t bob \n").unwrap().as_str(), "bob");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Username::parse(""), Err(UsernameError::Empty));
        assert_eq!(Username::parse("   "), Err(UsernameError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        assert!(matches!(
            Username::parse(&"a".repeat(51)),
            Err(UsernameError::TooLong { max: 50 })
        ));
    }

    #[test]
    fn test_parse_control_character() {
        assert_eq!(
            Username::parse("bad\u{7}name"),
            Err(UsernameError::ControlCharacter)
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        assert!(Username::parse(&"é".repeat(50)).is_ok());
    }
}
