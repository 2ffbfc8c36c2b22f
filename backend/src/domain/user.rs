//! User identity primitives.
//!
//! Credential verification happens behind the `LoginService` port; the
//! domain only deals in validated identifiers and the admin capability flag
//! carried by the session.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    InvalidId,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Construct from an already parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity resolved by the login port and persisted in the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub is_admin: bool,
}

/// Validation errors raised when constructing [`LoginCredentials`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    EmptyEmail,
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Credentials presented to the login port.
///
/// ## Invariants
/// - `email` and `password` are non-empty once trimmed of whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: String,
}

impl LoginCredentials {
    /// Fallible constructor enforcing the non-empty invariants.
    pub fn try_from_parts(
        email: &str,
        password: &str,
    ) -> Result<Self, LoginValidationError> {
        if email.trim().is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.trim().is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: email.to_owned(),
            password: password.to_owned(),
        })
    }

    /// Account email address.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Presented password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn user_id_rejects_non_uuid_input() {
        assert_eq!(UserId::new("not-a-uuid"), Err(UserValidationError::InvalidId));
    }

    #[test]
    fn user_id_round_trips_display() {
        let id = UserId::random();
        let reparsed = UserId::new(id.to_string()).expect("display output parses");
        assert_eq!(reparsed, id);
    }

    #[rstest]
    #[case("  ", "password", LoginValidationError::EmptyEmail)]
    #[case("ada@zd.md", "", LoginValidationError::EmptyPassword)]
    fn credentials_reject_blank_parts(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        assert_eq!(LoginCredentials::try_from_parts(email, password), Err(expected));
    }
}
