//! Storage collaborators for snippets and users.
//!
//! Handlers only see the [`SnippetStore`] and [`UserStore`] traits. The SQLite backed
//! implementations live in [`sqlite`]; [`memory`] provides in-process doubles with the same
//! semantics for tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub mod memory;
pub mod sqlite;

pub use memory::{MemorySnippetStore, MemoryUserStore};
pub use sqlite::{SqliteSnippetStore, SqliteUserStore};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("models: no matching record found")]
    NoRecord,
    #[error("models: invalid credentials")]
    InvalidCredentials,
    #[error("models: duplicate email")]
    DuplicateEmail,
    #[error("models: database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("models: password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("models: blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Snippet {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created: DateTime<Utc>,
    pub active: bool,
}

#[async_trait]
pub trait SnippetStore: Send + Sync {
    /// Stores a snippet that expires `expires_days` from now and returns its id.
    async fn insert(&self, title: &str, content: &str, expires_days: i64) -> Result<i64, ModelError>;

    /// Returns an unexpired snippet or [`ModelError::NoRecord`].
    async fn get(&self, id: i64) -> Result<Snippet, ModelError>;

    /// Unexpired snippets, newest first, bounded by the configured limit.
    async fn latest(&self) -> Result<Vec<Snippet>, ModelError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`ModelError::DuplicateEmail`] when the address is taken.
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<(), ModelError>;

    /// Returns the id of the active user owning `email` if `password` matches.
    async fn authenticate(&self, email: &str, password: &str) -> Result<i64, ModelError>;

    async fn get(&self, id: i64) -> Result<User, ModelError>;
}

pub(crate) async fn hash_password(password: &str, cost: u32) -> Result<String, ModelError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hashed)
}

pub(crate) async fn verify_password(password: &str, hashed: &str) -> Result<bool, ModelError> {
    let password = password.to_owned();
    let hashed = hashed.to_owned();
    let ok = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hashed)).await??;
    Ok(ok)
}
