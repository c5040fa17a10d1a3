//! # Snipbox
//!
//! A small server-rendered site for sharing short-lived text snippets, with optional user
//! signup and login.
//!
//! ## Architecture
//!
//! - **Axum**: routing and the middleware pipeline
//! - **tower-sessions**: server-side sessions (SQLite backed in production)
//! - **SQLx**: snippet and user storage on SQLite
//! - **Tokio**: async runtime
//!
//! ## Core Components
//!
//! - [`config`]: layered configuration (embedded defaults, files, environment)
//! - [`context`]: the typed per-request context and authentication state
//! - [`db`]: schema initialization
//! - [`error`]: error type and HTTP error responses
//! - [`forms`]: declarative form validation
//! - [`middleware`]: recovery, logging, security headers, CSRF, authentication
//! - [`models`]: storage traits with SQLite and in-memory implementations
//! - [`routes`]: handlers and the pipeline builder
//! - [`session`]: typed session accessor
//! - [`state`]: shared application state
//! - [`templates`]: HTML pages

pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
pub mod templates;

#[cfg(test)]
mod tests;
