//! Route table and middleware pipeline.
//!
//! - `snippets`: home page, showing and creating snippets
//! - `users`: signup, login and logout
//!
//! Layer order matters. In axum the layer added last runs first, so the chains below are
//! written innermost first:
//!
//! ```text
//! recover -> log_request -> security_headers -> [routing]
//!     dynamic routes: [method match] -> session -> csrf -> authenticate -> (require_authentication) -> handler
//!     /static:        ServeDir
//! ```

use std::any::Any;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::{Html, Response},
    routing::{get, post},
    Router,
};
use chrono::{Datelike, Utc};
use time::Duration;
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir};
use tower_sessions::{cookie::SameSite, Expiry, SessionManagerLayer, SessionStore};

use crate::{
    config::{AppConfig, SessionConfig},
    context::RequestContext,
    error::{status_response, AppResult},
    middleware::{auth, csrf, logging, recover, security_headers},
    session::{SessionState, FLASH},
    state::AppState,
    templates::{self, Page, TemplateData},
};

pub mod snippets;
pub mod users;

/// Builds the complete application: dynamic routes, static files and the baseline chain.
pub fn app<S>(state: AppState, store: S) -> Router
where
    S: SessionStore + Clone,
{
    let config = state.config.clone();
    let dynamic = dynamic_routes(state, store);
    let app = Router::new()
        .merge(dynamic)
        .nest_service("/static", ServeDir::new(&config.server.static_dir))
        .fallback(not_found);
    with_baseline(app, config)
}

/// Routes that need session context, wrapped in session -> csrf -> authenticate.
///
/// The chain is attached with `route_layer`, so it only runs once path and method have both
/// matched. A known path with the wrong method gets its 405 without touching the session or
/// the CSRF check.
pub fn dynamic_routes<S>(state: AppState, store: S) -> Router
where
    S: SessionStore + Clone,
{
    let gate = || from_fn(auth::require_authentication);

    Router::new()
        .route("/", get(snippets::home))
        .route(
            "/snippet/create",
            get(snippets::create_snippet_form)
                .merge(post(snippets::create_snippet).route_layer(gate())),
        )
        .route("/snippet/{id}", get(snippets::show_snippet))
        .route("/user/signup", get(users::signup_form).post(users::signup))
        .route("/user/login", get(users::login_form).post(users::login))
        .route("/user/logout", post(users::logout).route_layer(gate()))
        .method_not_allowed_fallback(method_not_allowed)
        .route_layer(from_fn_with_state(state.clone(), auth::authenticate))
        .route_layer(from_fn(csrf::csrf_protection))
        .route_layer(session_layer(store, &state.config.session))
        .with_state(state)
}

/// Wraps any router in recover -> log_request -> security_headers.
pub fn with_baseline(router: Router, config: Arc<AppConfig>) -> Router {
    let panic_config = config.clone();
    let on_panic =
        move |err: Box<dyn Any + Send + 'static>| recover::handle_panic(&panic_config, err);
    router
        .layer(from_fn_with_state(config, security_headers::security_headers_middleware))
        .layer(from_fn(logging::log_request))
        .layer(CatchPanicLayer::custom(on_panic))
}

/// Session cookies are always `Secure`: the server only speaks HTTPS.
pub fn session_layer<S>(store: S, cfg: &SessionConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(cfg.cookie_name.clone())
        .with_http_only(true)
        .with_secure(true)
        .with_path("/")
        .with_same_site(SameSite::Strict)
        .with_expiry(Expiry::OnInactivity(Duration::hours(cfg.lifetime_hours)))
}

/// Fills the data every page needs and renders `page`.
///
/// Reading the flash message removes it from the session, so it is shown once.
pub async fn render(
    ctx: &RequestContext,
    session: &SessionState,
    page: Page,
    mut td: TemplateData,
) -> AppResult<Html<String>> {
    td.current_year = Utc::now().year();
    td.flash = session.pop_string(FLASH).await?;
    td.is_authenticated = ctx.is_authenticated();
    td.csrf_token = ctx.csrf_token.clone().unwrap_or_default();
    Ok(Html(templates::render(page, &td)))
}

pub async fn not_found() -> Response {
    status_response(StatusCode::NOT_FOUND)
}

/// The `Allow` header is added by the method router.
pub async fn method_not_allowed() -> Response {
    status_response(StatusCode::METHOD_NOT_ALLOWED)
}
