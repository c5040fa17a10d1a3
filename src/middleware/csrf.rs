//! Cross-Site Request Forgery (CSRF) protection middleware.
//!
//! Every session carries a random token. Safe requests get the token issued (if the session
//! has none yet) and exposed through [`RequestContext::csrf_token`] so templates can embed it.
//! State-changing requests must echo the token back in the `csrf_token` form field or the
//! `X-CSRF-Token` header; anything else is rejected before the handler runs.
//!
//! The binding between browser and token is the session cookie, which is `HttpOnly`,
//! `Secure` and scoped to `/` (see `routes::session_layer`).

use axum::{
    body::{self, Body},
    extract::Request,
    http::{header::CONTENT_TYPE, HeaderMap, Method},
    middleware::Next,
    response::Response,
};

use crate::{
    context::RequestContext,
    error::{AppError, AppResult},
    session::{SessionState, CSRF_TOKEN},
};

pub const CSRF_HEADER: &str = "x-csrf-token";
pub const CSRF_FORM_FIELD: &str = "csrf_token";

/// Upper bound for buffering a form body while looking for the token.
const MAX_FORM_BYTES: usize = 1024 * 1024;

pub async fn csrf_protection(session: SessionState, mut req: Request, next: Next) -> AppResult<Response> {
    let expected: Option<String> = session.get(CSRF_TOKEN).await?;

    if is_safe_method(req.method()) {
        let token = match expected {
            Some(token) => token,
            None => {
                let token = generate_csrf_token();
                session.put(CSRF_TOKEN, &token).await?;
                token
            }
        };
        let mut ctx = RequestContext::take(&mut req);
        ctx.csrf_token = Some(token);
        ctx.attach(&mut req);
        return Ok(next.run(req).await);
    }

    let Some(expected) = expected else {
        tracing::warn!(method = %req.method(), uri = %req.uri(), "CSRF check failed: session has no token");
        return Err(AppError::Forbidden("missing CSRF session token".into()));
    };

    let (submitted, mut req) = submitted_token(req).await?;
    match submitted {
        Some(token) if tokens_match(&token, &expected) => {}
        _ => {
            tracing::warn!(method = %req.method(), uri = %req.uri(), "CSRF check failed: token mismatch");
            return Err(AppError::Forbidden("CSRF token mismatch".into()));
        }
    }

    let mut ctx = RequestContext::take(&mut req);
    ctx.csrf_token = Some(expected);
    ctx.attach(&mut req);
    Ok(next.run(req).await)
}

fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE)
}

/// 32 random bytes, hex encoded.
pub fn generate_csrf_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// Looks for the token in the header first, then in an urlencoded body.
///
/// The body is buffered and put back so handlers can still extract the form.
async fn submitted_token(req: Request) -> AppResult<(Option<String>, Request)> {
    if let Some(token) = header_token(req.headers()) {
        return Ok((Some(token), req));
    }
    if !is_urlencoded(req.headers()) {
        return Ok((None, req));
    }

    let (parts, body) = req.into_parts();
    let bytes = body::to_bytes(body, MAX_FORM_BYTES)
        .await
        .map_err(|e| AppError::BadRequest(format!("unreadable form body: {}", e)))?;
    let token = url::form_urlencoded::parse(&bytes)
        .find(|(k, _)| k == CSRF_FORM_FIELD)
        .map(|(_, v)| v.into_owned());
    Ok((token, Request::from_parts(parts, Body::from(bytes))))
}

fn header_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

fn is_urlencoded(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

/// Constant-time comparison so the check does not leak how much of the token matched.
fn tokens_match(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        return false;
    }
    let mut diff = 0u8;
    for (a, b) in provided.iter().zip(expected) {
        diff |= a ^ b;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::HeaderValue;

    #[test]
    fn test_tokens_match() {
        let token = generate_csrf_token();
        assert_eq!(token.len(), 64);
        assert!(tokens_match(&token, &token));
        assert!(!tokens_match(&token, &generate_csrf_token()));
        assert!(!tokens_match("", &token));
        assert!(!tokens_match(&token[..63], &token));
    }

    #[test]
    fn test_header_token() {
        let mut headers = HeaderMap::new();
        assert!(header_token(&headers).is_none());
        headers.insert(CSRF_HEADER, HeaderValue::from_static("abc"));
        assert_eq!(header_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn test_safe_methods() {
        assert!(is_safe_method(&Method::GET));
        assert!(is_safe_method(&Method::HEAD));
        assert!(is_safe_method(&Method::OPTIONS));
        for m in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            assert!(!is_safe_method(&m));
        }
    }
}
