use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::models::UserId;

/// Key under which the active user id is kept in client storage.
pub const USER_ID_KEY: &str = "userId";

/// Durable home of the session identity. Every call site that needs the
/// stored user id goes through this.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn get(&self) -> Result<Option<UserId>, AppError>;
    async fn set(&self, user_id: &UserId) -> Result<(), AppError>;
    async fn clear(&self) -> Result<(), AppError>;
}

pub struct SqliteSessionStore {
    db: SqlitePool,
}

impl SqliteSessionStore {
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // One connection: `sqlite::memory:` would otherwise hand out a fresh database per connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { db: pool })
    }

    pub async fn get_value(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT value FROM client_storage WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.db)
            .await
    }

    pub async fn set_value(&self, key: &str, value: &str) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO client_storage (key, value, stored_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                stored_at = excluded.stored_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    pub async fn remove_value(&self, key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM client_storage WHERE key = ?1")
            .bind(key)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionStore {
    async fn get(&self) -> Result<Option<UserId>, AppError> {
        let value = self.get_value(USER_ID_KEY).await?;
        Ok(value.map(UserId::new).filter(|id| !id.is_empty()))
    }

    async fn set(&self, user_id: &UserId) -> Result<(), AppError> {
        self.set_value(USER_ID_KEY, user_id.as_str()).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        self.remove_value(USER_ID_KEY).await?;
        Ok(())
    }
}

/// Process-local storage, gone when the process exits.
#[derive(Default)]
pub struct MemorySessionStore {
    slot: RwLock<Option<UserId>>,
}

impl MemorySessionStore {
    pub fn with_user(user_id: UserId) -> Self {
        Self {
            slot: RwLock::new(Some(user_id)),
        }
    }
}

#[async_trait]
impl SessionRepository for MemorySessionStore {
    async fn get(&self) -> Result<Option<UserId>, AppError> {
        Ok(self.slot.read().await.clone())
    }

    async fn set(&self, user_id: &UserId) -> Result<(), AppError> {
        *self.slot.write().await = Some(user_id.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        *self.slot.write().await = None;
        Ok(())
    }
}
