//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations such as persisting the authenticated user or
//! requiring the admin capability.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{AuthenticatedUser, Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const IS_ADMIN_KEY: &str = "is_admin";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user in the session cookie.
    pub fn persist_user(&self, user: &AuthenticatedUser) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user.id.to_string())
            .and_then(|()| self.0.insert(IS_ADMIN_KEY, user.is_admin))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the current user id from the session, if present.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let id = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match id {
            Some(raw) => match UserId::new(raw) {
                Ok(id) => Ok(Some(id)),
                Err(error) => {
                    tracing::warn!("invalid user id in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Whether the session carries the admin capability.
    pub fn is_admin(&self) -> Result<bool, Error> {
        self.0
            .get::<bool>(IS_ADMIN_KEY)
            .map(|flag| flag.unwrap_or(false))
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))
    }

    /// Require an authenticated user id or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Require an authenticated admin, returning `401` when no user is
    /// logged in and `403` when the user lacks the admin capability.
    pub fn require_admin(&self) -> Result<UserId, Error> {
        let user_id = self.require_user_id()?;
        if !self.is_admin()? {
            return Err(Error::forbidden("admin access required"));
        }
        Ok(user_id)
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
