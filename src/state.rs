use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::{
    MemorySnippetStore, MemoryUserStore, SnippetStore, SqliteSnippetStore, SqliteUserStore, UserStore,
};

/// The shared application state.
///
/// Built once at startup and cloned into every request; all members are read-only or
/// internally synchronized. The storage backends are chosen here, at construction time.
#[derive(Clone)]
pub struct AppState {
    /// Snippet storage (SQLite in production, in-memory in tests).
    pub snippets: Arc<dyn SnippetStore>,
    /// User storage, consulted on every request with a signed-in session.
    pub users: Arc<dyn UserStore>,
    /// The application configuration.
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(snippets: Arc<dyn SnippetStore>, users: Arc<dyn UserStore>, config: AppConfig) -> Self {
        Self { snippets, users, config: Arc::new(config) }
    }

    /// State backed by the SQLite pool.
    pub fn sqlite(db: sqlx::SqlitePool, config: AppConfig) -> Self {
        let snippets = SqliteSnippetStore::new(db.clone(), config.snippets.latest_limit);
        let users = SqliteUserStore::new(db, config.auth.bcrypt_cost);
        Self::new(Arc::new(snippets), Arc::new(users), config)
    }

    /// State backed by in-memory stores.
    pub fn in_memory(config: AppConfig) -> Self {
        let snippets = MemorySnippetStore::new(config.snippets.latest_limit as usize);
        let users = MemoryUserStore::new(config.auth.bcrypt_cost);
        Self::new(Arc::new(snippets), Arc::new(users), config)
    }
}
