//! Strongly typed per-request context threaded through the dynamic middleware chain.
//!
//! Each stage takes the context out of the request, enriches it and puts it back before
//! calling the next stage, so later stages and handlers only ever see a richer value.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, extract::Request, http::request::Parts};

/// Authentication state of one request.
///
/// Starts `Unchecked`; the authentication resolver moves it to exactly one of the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unchecked,
    Anonymous,
    Authenticated { user_id: i64 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub auth: AuthState,
    /// Anti-forgery token of the session, for embedding in rendered forms.
    pub csrf_token: Option<String>,
}

impl RequestContext {
    pub fn is_authenticated(&self) -> bool {
        matches!(self.auth, AuthState::Authenticated { .. })
    }

    pub fn user_id(&self) -> Option<i64> {
        match self.auth {
            AuthState::Authenticated { user_id } => Some(user_id),
            _ => None,
        }
    }

    /// Removes the context from `req`, or starts a fresh one.
    pub fn take(req: &mut Request) -> Self {
        req.extensions_mut().remove::<Self>().unwrap_or_default()
    }

    pub fn attach(self, req: &mut Request) {
        req.extensions_mut().insert(self);
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_default())
    }
}
