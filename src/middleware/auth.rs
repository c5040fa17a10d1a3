use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    context::{AuthState, RequestContext},
    error::{AppError, AppResult},
    models::{ModelError, UserStore},
    session::{SessionState, AUTHENTICATED_USER_ID},
    state::AppState,
};

pub const LOGIN_PATH: &str = "/user/login";

/// Resolves the session's stored user id into a verified authentication state.
///
/// A session without a user id is anonymous and costs no lookup. Otherwise the user is
/// fetched on every request so that deleted or deactivated accounts lose access at once:
///
/// * unknown or inactive user: the id is dropped from the session, request continues anonymous
/// * lookup failure: the pipeline stops with a 500 and `next` is never called
/// * active user: the request continues authenticated
pub async fn authenticate(
    State(state): State<AppState>,
    session: SessionState,
    mut req: Request,
    next: Next,
) -> AppResult<Response> {
    let mut ctx = RequestContext::take(&mut req);
    ctx.auth = resolve(state.users.as_ref(), &session).await?;
    ctx.attach(&mut req);
    Ok(next.run(req).await)
}

pub async fn resolve(users: &dyn UserStore, session: &SessionState) -> AppResult<AuthState> {
    let Some(user_id) = session.get::<i64>(AUTHENTICATED_USER_ID).await? else {
        return Ok(AuthState::Anonymous);
    };

    match users.get(user_id).await {
        Ok(user) if user.active => Ok(AuthState::Authenticated { user_id }),
        Ok(_) | Err(ModelError::NoRecord) => {
            tracing::info!(user_id, "Session refers to a missing or inactive user, signing out");
            session.remove(AUTHENTICATED_USER_ID).await?;
            Ok(AuthState::Anonymous)
        }
        Err(e) => Err(AppError::Internal(
            anyhow::Error::new(e).context(format!("looking up session user {}", user_id)),
        )),
    }
}

/// Gate for routes that need a signed-in user.
///
/// Anonymous requests are redirected to the login page without reaching the handler.
/// Authenticated responses are marked `Cache-Control: no-store`.
pub async fn require_authentication(ctx: RequestContext, req: Request, next: Next) -> Response {
    if !ctx.is_authenticated() {
        return Redirect::to(LOGIN_PATH).into_response();
    }
    let mut res = next.run(req).await;
    res.headers_mut().insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    res
}
