use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use super::{hash_password, verify_password, ModelError, Snippet, SnippetStore, User, UserStore};

pub struct SqliteSnippetStore {
    pool: SqlitePool,
    latest_limit: i64,
}

impl SqliteSnippetStore {
    pub fn new(pool: SqlitePool, latest_limit: u32) -> Self {
        Self { pool, latest_limit: i64::from(latest_limit) }
    }
}

#[async_trait]
impl SnippetStore for SqliteSnippetStore {
    async fn insert(&self, title: &str, content: &str, expires_days: i64) -> Result<i64, ModelError> {
        let created = Utc::now();
        let expires = created + Duration::days(expires_days);
        let res = sqlx::query(
            r#"INSERT INTO snippets (title, content, created, expires)
               VALUES (?1, ?2, ?3, ?4)"#,
        )
        .bind(title)
        .bind(content)
        .bind(created)
        .bind(expires)
        .execute(&self.pool)
        .await?;
        Ok(res.last_insert_rowid())
    }

    async fn get(&self, id: i64) -> Result<Snippet, ModelError> {
        sqlx::query_as::<_, Snippet>(
            r#"SELECT id, title, content, created, expires
               FROM snippets
               WHERE expires > ?1 AND id = ?2"#,
        )
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ModelError::NoRecord)
    }

    async fn latest(&self) -> Result<Vec<Snippet>, ModelError> {
        let rows = sqlx::query_as::<_, Snippet>(
            r#"SELECT id, title, content, created, expires
               FROM snippets
               WHERE expires > ?1
               ORDER BY created DESC, id DESC
               LIMIT ?2"#,
        )
        .bind(Utc::now())
        .bind(self.latest_limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

pub struct SqliteUserStore {
    pool: SqlitePool,
    bcrypt_cost: u32,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool, bcrypt_cost: u32) -> Self {
        Self { pool, bcrypt_cost }
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<(), ModelError> {
        let hashed = hash_password(password, self.bcrypt_cost).await?;
        let res = sqlx::query(
            r#"INSERT INTO users (name, email, hashed_password, created, active)
               VALUES (?1, ?2, ?3, ?4, 1)"#,
        )
        .bind(name)
        .bind(email)
        .bind(hashed)
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(ModelError::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<i64, ModelError> {
        let row: Option<(i64, String)> =
            sqlx::query_as("SELECT id, hashed_password FROM users WHERE email = ?1 AND active = 1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        let Some((id, hashed)) = row else {
            return Err(ModelError::InvalidCredentials);
        };
        if !verify_password(password, &hashed).await? {
            return Err(ModelError::InvalidCredentials);
        }
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<User, ModelError> {
        sqlx::query_as::<_, User>("SELECT id, name, email, created, active FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ModelError::NoRecord)
    }
}
