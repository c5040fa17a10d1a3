//! Integration and unit tests that exercise more than one module.
//!
//! - **pipeline_tests**: baseline chain, routing, CSRF and end-to-end flows through the router
//! - **auth_tests**: authentication resolver and authorization gate
//! - **db_tests**: SQLite storage implementations
//! - **config_tests**: configuration loading and validation
//! - **error_tests**: error to response mapping

pub mod config_tests;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use crate::config::AppConfig;
use crate::models::{MemorySnippetStore, MemoryUserStore};
use crate::state::AppState;

pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.auth.bcrypt_cost = 4;
    cfg
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }
}

/// Drives the full application in-process, carrying the session cookie between requests
/// like a browser would.
pub struct TestApp {
    pub router: Router,
    pub users: Arc<MemoryUserStore>,
    pub snippets: Arc<MemorySnippetStore>,
    cookie: Option<String>,
}

impl TestApp {
    pub fn new() -> Self {
        let cfg = test_config();
        let users = Arc::new(MemoryUserStore::new(cfg.auth.bcrypt_cost));
        let snippets = Arc::new(MemorySnippetStore::new(cfg.snippets.latest_limit as usize));
        let state = AppState::new(snippets.clone(), users.clone(), cfg);
        let router = crate::routes::app(state, MemoryStore::default());
        Self { router, users, snippets, cookie: None }
    }

    pub fn forget_cookie(&mut self) {
        self.cookie = None;
    }

    pub async fn send(&mut self, mut req: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            req.headers_mut().insert(header::COOKIE, cookie.parse().unwrap());
        }
        let res = self.router.clone().oneshot(req).await.unwrap();
        if let Some(set) = res.headers().get(header::SET_COOKIE).and_then(|v| v.to_str().ok()) {
            let pair = set.split(';').next().unwrap_or_default().trim().to_string();
            let has_value = pair.split_once('=').map(|(_, v)| !v.is_empty()).unwrap_or(false);
            self.cookie = if has_value { Some(pair) } else { None };
        }
        let status = res.status();
        let headers = res.headers().clone();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        TestResponse { status, headers, body: String::from_utf8_lossy(&bytes).into_owned() }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new()).extend_pairs(fields).finish();
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(req).await
    }

    /// Loads a page with a form and returns the CSRF token embedded in it.
    pub async fn csrf_token(&mut self) -> String {
        let res = self.get("/user/login").await;
        assert_eq!(res.status, StatusCode::OK);
        extract_csrf_token(&res.body).expect("login page embeds a CSRF token")
    }

    pub async fn signup(&mut self, name: &str, email: &str, password: &str) -> TestResponse {
        let token = self.csrf_token().await;
        self.post_form(
            "/user/signup",
            &[("csrf_token", token.as_str()), ("name", name), ("email", email), ("password", password)],
        )
        .await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        let token = self.csrf_token().await;
        self.post_form("/user/login", &[("csrf_token", token.as_str()), ("email", email), ("password", password)])
            .await
    }

    /// Signs up and logs in a fresh user; returns the CSRF token of the new session.
    pub async fn signed_in(&mut self) -> String {
        let res = self.signup("Alice", "alice@example.com", "pa55word-long").await;
        assert_eq!(res.status, StatusCode::SEE_OTHER);
        let res = self.login("alice@example.com", "pa55word-long").await;
        assert_eq!(res.location(), Some("/snippet/create"));
        self.csrf_token().await
    }
}

pub fn extract_csrf_token(body: &str) -> Option<String> {
    let marker = r#"name="csrf_token" value=""#;
    let start = body.find(marker)? + marker.len();
    let end = body[start..].find('"')? + start;
    Some(body[start..end].to_string())
}
