//! Typed access to the per-request session.
//!
//! The session itself is owned by `tower-sessions`; this wrapper only fixes the key names the
//! pipeline uses and the get/put/remove/pop semantics handlers rely on.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{de::DeserializeOwned, Serialize};
use tower_sessions::Session;

use crate::error::{AppError, AppResult};

pub const AUTHENTICATED_USER_ID: &str = "authenticatedUserID";
pub const FLASH: &str = "flash";
pub const CSRF_TOKEN: &str = "csrf_token";

#[derive(Clone, Debug)]
pub struct SessionState(Session);

impl SessionState {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Writing to a request without a session creates one.
    pub async fn put<T: Serialize + Send + Sync>(&self, key: &str, value: T) -> AppResult<()> {
        self.0.insert(key, value).await?;
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        Ok(self.0.get(key).await?)
    }

    pub async fn remove(&self, key: &str) -> AppResult<()> {
        self.0.remove_value(key).await?;
        Ok(())
    }

    /// Reads and clears `key` in one step; absent or non-string values yield `""`.
    pub async fn pop_string(&self, key: &str) -> AppResult<String> {
        let value = self.0.remove_value(key).await?;
        Ok(value.and_then(|v| v.as_str().map(str::to_owned)).unwrap_or_default())
    }

    pub async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.0.get_value(key).await?.is_some())
    }

    /// Issues a fresh session id while keeping the data, used on privilege changes.
    pub async fn renew(&self) -> AppResult<()> {
        self.0.cycle_id().await?;
        Ok(())
    }
}

impl<S> FromRequestParts<S> for SessionState
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(SessionState)
            .ok_or_else(|| AppError::Session("session layer is not installed".into()))
    }
}
