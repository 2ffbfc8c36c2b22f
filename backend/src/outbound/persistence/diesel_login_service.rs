//! PostgreSQL-backed `LoginService` implementation using Diesel ORM.
//!
//! Passwords are stored as hex-encoded SHA-256 digests; authentication
//! compares digests rather than plaintext. An unknown email and a wrong
//! password produce the same error so the endpoint does not leak which
//! accounts exist.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use sha2::{Digest, Sha256};

use crate::domain::ports::LoginService;
use crate::domain::{AuthenticatedUser, Error, LoginCredentials, UserId};

use super::error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::UserCredentialsRow;
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Message shared by every credential failure.
const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Diesel-backed implementation of the login port.
#[derive(Clone)]
pub struct DieselLoginService {
    pool: DbPool,
}

impl DieselLoginService {
    /// Create a new service with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain errors.
fn map_pool_error(error: PoolError) -> Error {
    map_basic_pool_error(error, Error::service_unavailable)
}

/// Map Diesel errors to domain errors.
fn map_diesel_error(error: diesel::result::Error) -> Error {
    map_basic_diesel_error(error, Error::internal, Error::service_unavailable)
}

/// Hex-encoded SHA-256 digest of a password, matching the stored format.
fn password_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[async_trait]
impl LoginService for DieselLoginService {
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedUser, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserCredentialsRow> = users::table
            .filter(users::email.eq(credentials.email()))
            .select(UserCredentialsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let Some(row) = row else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        if row.password_hash != password_digest(credentials.password()) {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        Ok(AuthenticatedUser {
            id: UserId::from_uuid(row.id),
            is_admin: row.is_admin,
        })
    }
}
