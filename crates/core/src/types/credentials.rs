//! Login and registration input validation.
//!
//! The backend owns authentication; these checks only catch obviously bad
//! input before a round trip.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Minimum password length accepted by the registration form.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Errors from validating credentials input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The email is empty after trimming.
    #[error("email cannot be empty")]
    EmptyEmail,
    /// The email is longer than RFC 5321 allows.
    #[error("email must be at most {max} characters")]
    EmailTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The email has no `@`, or nothing on one side of it.
    #[error("email must look like name@domain")]
    MalformedEmail,
    /// The password is shorter than [`MIN_PASSWORD_LENGTH`].
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum length.
        min: usize,
    },
    /// The display name is empty.
    #[error("name cannot be empty")]
    EmptyName,
}

/// A normalized email address: trimmed and lower-cased.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse and normalize an email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, too long, or lacks a
    /// non-empty local part and domain around a single `@`.
    pub fn parse(s: &str) -> Result<Self, CredentialError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CredentialError::EmptyEmail);
        }
        if trimmed.len() > Self::MAX_LENGTH {
            return Err(CredentialError::EmailTooLong {
                max: Self::MAX_LENGTH,
            });
        }

        match trimmed.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(trimmed.to_lowercase()))
            }
            _ => Err(CredentialError::MalformedEmail),
        }
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Check a new password against the registration rules.
///
/// # Errors
///
/// Returns [`CredentialError::PasswordTooShort`] below the minimum length.
pub fn validate_password(password: &str) -> Result<(), CredentialError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CredentialError::PasswordTooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

/// Check a display name is present.
///
/// # Errors
///
/// Returns [`CredentialError::EmptyName`] for blank names.
pub fn validate_name(name: &str) -> Result<(), CredentialError> {
    if name.trim().is_empty() {
        return Err(CredentialError::EmptyName);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let email = Email::parse("  Rose@Petalbox.Shop ").unwrap();
        assert_eq!(email.as_str(), "rose@petalbox.shop");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(Email::parse(""), Err(CredentialError::EmptyEmail));
        assert_eq!(Email::parse("   "), Err(CredentialError::EmptyEmail));
        assert_eq!(Email::parse("no-at"), Err(CredentialError::MalformedEmail));
        assert_eq!(Email::parse("@shop.vn"), Err(CredentialError::MalformedEmail));
        assert_eq!(Email::parse("a@"), Err(CredentialError::MalformedEmail));
        assert_eq!(Email::parse("a@b@c"), Err(CredentialError::MalformedEmail));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(CredentialError::EmailTooLong { .. })
        ));
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn test_name_rules() {
        assert_eq!(validate_name("  "), Err(CredentialError::EmptyName));
        assert!(validate_name("Lan").is_ok());
    }
}
