//! Last line of defence against panics in the handler chain.

use std::any::Any;
use std::backtrace::Backtrace;

use axum::{
    http::{header::CONNECTION, HeaderValue, StatusCode},
    response::Response,
};

use crate::config::AppConfig;
use crate::error::status_response;
use crate::middleware::security_headers::apply_security_headers;

/// Response for a request whose handling panicked: a generic 500 that also closes the
/// connection, since the handler may have left it in an unknown state.
///
/// The panic unwinds past the security headers stage, so the headers are written here too.
/// Used with `tower_http::catch_panic::CatchPanicLayer::custom`.
pub fn handle_panic(cfg: &AppConfig, err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    let error_id = uuid::Uuid::new_v4();
    tracing::error!(%error_id, panic = %detail, "Recovered from panic while handling request");

    let mut res = status_response(StatusCode::INTERNAL_SERVER_ERROR);
    res.headers_mut().insert(CONNECTION, HeaderValue::from_static("close"));
    apply_security_headers(res.headers_mut(), cfg);
    res
}

/// Routes panic reports (with a stack trace) through `tracing` instead of stderr.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let backtrace = Backtrace::force_capture();
        tracing::error!(location = ?info.location(), "panic: {}\n{}", info, backtrace);
    }));
}
