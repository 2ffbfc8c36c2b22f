//! Driving port for credential authentication.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::error::Error;
use crate::domain::user::{AuthenticatedUser, LoginCredentials, UserId};

/// Verifies credentials and resolves the account they belong to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Authenticate the credentials, returning an unauthorized error on
    /// mismatch. The error message never distinguishes an unknown email
    /// from a wrong password.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<AuthenticatedUser, Error>;
}

/// Fixture accepting a single hard-coded admin account.
#[derive(Debug, Clone)]
pub struct FixtureLoginService {
    pub email: String,
    pub password: String,
    pub user: AuthenticatedUser,
}

impl Default for FixtureLoginService {
    fn default() -> Self {
        Self {
            email: "admin@zd.md".to_owned(),
            password: "password".to_owned(),
            user: AuthenticatedUser {
                id: UserId::from_uuid(Uuid::from_u128(1)),
                is_admin: true,
            },
        }
    }
}

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<AuthenticatedUser, Error> {
        if credentials.email() == self.email && credentials.password() == self.password {
            Ok(self.user)
        } else {
            Err(Error::unauthorized("invalid email or password"))
        }
    }
}
