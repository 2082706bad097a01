//! User store collaborator: durable identities keyed by email.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Durable identity record. Created on first successful sign-in via either
/// path, never deleted here, and never field-synced on repeat logins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    /// Present only for credential-registered users.
    pub password_digest: Option<String>,
    /// Origin tag, e.g. "google" or "credentials".
    pub provider: String,
}

/// Fields for creating a new [`UserRecord`].
#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub password_digest: Option<String>,
    pub provider: String,
}

/// Store interface consumed by the validator and the reconciler.
///
/// Email uniqueness is assumed, not enforced, by the callers: concurrent
/// first-time sign-ins for the same email may both attempt a create, and the
/// store's own uniqueness behavior decides the outcome.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>>;

    async fn create(&self, user: NewUser) -> Result<UserRecord>;
}

pub type DynUserStore = Arc<dyn UserStore>;

/// Postgres-backed user store.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: &sqlx::postgres::PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        image: row.get("image"),
        password_digest: row.get("password_digest"),
        provider: row.get("provider"),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        // First match wins if duplicates slipped past the unique index.
        let query = r"
            SELECT id, email, name, image, password_digest, provider
            FROM users WHERE email = $1 LIMIT 1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user by email")?;

        Ok(row.as_ref().map(record_from_row))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        let query = r"
            SELECT id, email, name, image, password_digest, provider
            FROM users WHERE id = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user by id")?;

        Ok(row.as_ref().map(record_from_row))
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord> {
        let query = r"
            INSERT INTO users (email, name, image, password_digest, provider)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, name, image, password_digest, provider
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.image)
            .bind(&user.password_digest)
            .bind(&user.provider)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to insert user")?;

        Ok(record_from_row(&row))
    }
}

/// In-memory user store for tests.
#[cfg(test)]
pub(crate) struct MemoryUserStore {
    users: tokio::sync::RwLock<Vec<UserRecord>>,
    /// When set, every store call returns an error. Simulates outages.
    fail: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl MemoryUserStore {
    pub(crate) fn new() -> Self {
        Self {
            users: tokio::sync::RwLock::new(Vec::new()),
            fail: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub(crate) async fn with_user(self, user: UserRecord) -> Self {
        self.users.write().await.push(user);
        self
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.fail
            .store(failing, std::sync::atomic::Ordering::SeqCst);
    }

    pub(crate) async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            anyhow::bail!("store unavailable");
        }
        Ok(())
    }
}

#[cfg(test)]
#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        self.check()?;
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        self.check()?;
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.id == id)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord> {
        self.check()?;
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            image: user.image,
            password_digest: user.password_digest,
            provider: user.provider,
        };
        self.users.write().await.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
pub(crate) fn test_user(email: &str) -> UserRecord {
    UserRecord {
        id: Uuid::new_v4(),
        email: email.to_string(),
        name: Some("Test User".to_string()),
        image: None,
        password_digest: None,
        provider: "credentials".to_string(),
    }
}
