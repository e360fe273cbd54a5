use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::ingest::models::ResumeRecord;

/// Persistence for the single resume record each user owns.
/// Carried in `AppState` as `Arc<dyn ResumeStore>`.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Overwrites the user's resume record.
    async fn save(&self, user_id: &str, record: &ResumeRecord) -> Result<()>;

    /// Database failures surface to the caller as `AppError::Database`.
    async fn load(&self, user_id: &str) -> Result<Option<ResumeRecord>, sqlx::Error>;
}

/// Stores the record in the `users.resume` JSONB column, keyed by the auth provider's id.
pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn save(&self, user_id: &str, record: &ResumeRecord) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users SET resume = $1, updated_at = NOW() WHERE external_id = $2",
        )
        .bind(Json(record))
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("no user row for external id {user_id}"));
        }
        Ok(())
    }

    async fn load(&self, user_id: &str) -> Result<Option<ResumeRecord>, sqlx::Error> {
        let row: Option<Option<Json<ResumeRecord>>> =
            sqlx::query_scalar("SELECT resume FROM users WHERE external_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.flatten().map(|Json(record)| record))
    }
}
