use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;

use super::{hash_password, verify_password, ModelError, Snippet, SnippetStore, User, UserStore};

/// In-process snippet storage with the same expiry and ordering rules as the SQLite store.
pub struct MemorySnippetStore {
    snippets: RwLock<Vec<Snippet>>,
    latest_limit: usize,
}

impl MemorySnippetStore {
    pub fn new(latest_limit: usize) -> Self {
        Self { snippets: RwLock::new(Vec::new()), latest_limit }
    }
}

#[async_trait]
impl SnippetStore for MemorySnippetStore {
    async fn insert(&self, title: &str, content: &str, expires_days: i64) -> Result<i64, ModelError> {
        let mut snippets = self.snippets.write().await;
        let created = Utc::now();
        let id = snippets.len() as i64 + 1;
        snippets.push(Snippet {
            id,
            title: title.to_string(),
            content: content.to_string(),
            created,
            expires: created + Duration::days(expires_days),
        });
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Snippet, ModelError> {
        let now = Utc::now();
        self.snippets
            .read()
            .await
            .iter()
            .find(|s| s.id == id && s.expires > now)
            .cloned()
            .ok_or(ModelError::NoRecord)
    }

    async fn latest(&self) -> Result<Vec<Snippet>, ModelError> {
        let now = Utc::now();
        let snippets = self.snippets.read().await;
        Ok(snippets
            .iter()
            .rev()
            .filter(|s| s.expires > now)
            .take(self.latest_limit)
            .cloned()
            .collect())
    }
}

struct StoredUser {
    user: User,
    hashed_password: String,
}

/// In-process user storage. Hashing still goes through bcrypt with the given cost.
pub struct MemoryUserStore {
    users: RwLock<Vec<StoredUser>>,
    bcrypt_cost: u32,
}

impl MemoryUserStore {
    pub fn new(bcrypt_cost: u32) -> Self {
        Self { users: RwLock::new(Vec::new()), bcrypt_cost }
    }

    /// Marks the account inactive; returns false for unknown ids.
    pub async fn deactivate(&self, id: i64) -> bool {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.user.id == id) {
            Some(stored) => {
                stored.user.active = false;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<(), ModelError> {
        let hashed_password = hash_password(password, self.bcrypt_cost).await?;
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.user.email == email) {
            return Err(ModelError::DuplicateEmail);
        }
        let id = users.iter().map(|u| u.user.id).max().unwrap_or(0) + 1;
        users.push(StoredUser {
            user: User {
                id,
                name: name.to_string(),
                email: email.to_string(),
                created: Utc::now(),
                active: true,
            },
            hashed_password,
        });
        Ok(())
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<i64, ModelError> {
        let found = {
            let users = self.users.read().await;
            users
                .iter()
                .find(|u| u.user.email == email && u.user.active)
                .map(|u| (u.user.id, u.hashed_password.clone()))
        };
        let Some((id, hashed)) = found else {
            return Err(ModelError::InvalidCredentials);
        };
        if !verify_password(password, &hashed).await? {
            return Err(ModelError::InvalidCredentials);
        }
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<User, ModelError> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.user.id == id)
            .map(|u| u.user.clone())
            .ok_or(ModelError::NoRecord)
    }
}
