//! PostgreSQL storage backend.

use async_trait::async_trait;
use sqlx::PgPool;

use muraciet_core::application::NewApplication;
use muraciet_core::types::{DbId, Timestamp, UserId};

use crate::models::{Application, BlacklistEntry, APPLICATION_COLUMNS, BLACKLIST_COLUMNS};
use crate::storage::{ResolveOutcome, Storage};
use crate::DbError;

const SCHEMA: &str = "\
    CREATE TABLE IF NOT EXISTS applications (\
        id BIGSERIAL PRIMARY KEY,\
        submitter_id BIGINT NOT NULL,\
        submitter_handle VARCHAR(255),\
        fullname VARCHAR(255) NOT NULL,\
        phone VARCHAR(20) NOT NULL,\
        id_kind VARCHAR(8) NOT NULL,\
        id_code VARCHAR(7) NOT NULL,\
        category VARCHAR(16) NOT NULL,\
        body TEXT NOT NULL,\
        photo_ref TEXT,\
        status VARCHAR(16) NOT NULL DEFAULT 'waiting',\
        reply_text TEXT,\
        notes TEXT,\
        created_at TIMESTAMPTZ NOT NULL,\
        updated_at TIMESTAMPTZ NOT NULL\
    );\
    CREATE INDEX IF NOT EXISTS idx_applications_submitter \
        ON applications (submitter_id, created_at DESC);\
    CREATE INDEX IF NOT EXISTS idx_applications_status ON applications (status);\
    CREATE TABLE IF NOT EXISTS blacklist (\
        id BIGSERIAL PRIMARY KEY,\
        submitter_id BIGINT NOT NULL UNIQUE,\
        reason VARCHAR(255),\
        created_at TIMESTAMPTZ NOT NULL\
    );";

pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn bootstrap(&self) -> Result<(), DbError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_application(&self, new: &NewApplication) -> Result<DbId, DbError> {
        let id = sqlx::query_scalar(
            "INSERT INTO applications \
             (submitter_id, submitter_handle, fullname, phone, id_kind, id_code, \
              category, body, photo_ref, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'waiting', $10, $10) \
             RETURNING id",
        )
        .bind(new.submitter_id)
        .bind(new.submitter_handle.as_deref())
        .bind(&new.fullname)
        .bind(&new.phone)
        .bind(new.id_kind.as_str())
        .bind(&new.id_code)
        .bind(new.category.as_str())
        .bind(&new.body)
        .bind(new.photo_ref.as_deref())
        .bind(new.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn get_application(&self, id: DbId) -> Result<Option<Application>, DbError> {
        let query = format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1");
        Ok(sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_by_submitter(&self, submitter_id: UserId) -> Result<Vec<Application>, DbError> {
        let query = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications \
             WHERE submitter_id = $1 ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as(&query)
            .bind(submitter_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_by_status(&self, status: &str) -> Result<Vec<Application>, DbError> {
        let query = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications \
             WHERE status = $1 ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as(&query)
            .bind(status)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count_since(&self, submitter_id: UserId, since: Timestamp) -> Result<i64, DbError> {
        Ok(sqlx::query_scalar(
            "SELECT COUNT(*) FROM applications WHERE submitter_id = $1 AND created_at >= $2",
        )
        .bind(submitter_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn count_rejected_since(
        &self,
        submitter_id: UserId,
        since: Timestamp,
    ) -> Result<i64, DbError> {
        Ok(sqlx::query_scalar(
            "SELECT COUNT(*) FROM applications \
             WHERE submitter_id = $1 AND status = 'rejected' AND updated_at >= $2",
        )
        .bind(submitter_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn resolve(
        &self,
        id: DbId,
        status: &str,
        reply_text: &str,
        notes: &str,
        now: Timestamp,
    ) -> Result<ResolveOutcome, DbError> {
        let result = sqlx::query(
            "UPDATE applications \
             SET status = $2, reply_text = $3, notes = $4, updated_at = $5 \
             WHERE id = $1 AND status IN ('waiting', 'processing')",
        )
        .bind(id)
        .bind(status)
        .bind(reply_text)
        .bind(notes)
        .bind(now)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() > 0 {
            return Ok(ResolveOutcome::Applied);
        }
        match self.get_application(id).await? {
            Some(_) => Ok(ResolveOutcome::NotPending),
            None => Ok(ResolveOutcome::Missing),
        }
    }

    async fn update_reply(
        &self,
        id: DbId,
        reply_text: &str,
        notes_suffix: &str,
        now: Timestamp,
    ) -> Result<ResolveOutcome, DbError> {
        let result = sqlx::query(
            "UPDATE applications \
             SET reply_text = $2, notes = COALESCE(notes, '') || $3, updated_at = $4 \
             WHERE id = $1 AND status = 'answered'",
        )
        .bind(id)
        .bind(reply_text)
        .bind(notes_suffix)
        .bind(now)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() > 0 {
            return Ok(ResolveOutcome::Applied);
        }
        match self.get_application(id).await? {
            Some(_) => Ok(ResolveOutcome::NotPending),
            None => Ok(ResolveOutcome::Missing),
        }
    }

    async fn overdue_applications(&self, cutoff: Timestamp) -> Result<Vec<Application>, DbError> {
        let query = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications \
             WHERE status IN ('waiting', 'processing') AND created_at <= $1 \
             ORDER BY created_at ASC"
        );
        Ok(sqlx::query_as(&query)
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_all(&self, limit: i64) -> Result<Vec<Application>, DbError> {
        let query = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications \
             ORDER BY created_at DESC LIMIT $1"
        );
        Ok(sqlx::query_as(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn delete_all_applications(&self) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM applications")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn is_blacklisted(&self, submitter_id: UserId) -> Result<bool, DbError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM blacklist WHERE submitter_id = $1")
                .bind(submitter_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    async fn add_to_blacklist(
        &self,
        submitter_id: UserId,
        reason: Option<&str>,
        now: Timestamp,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            "INSERT INTO blacklist (submitter_id, reason, created_at) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (submitter_id) DO NOTHING",
        )
        .bind(submitter_id)
        .bind(reason)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_from_blacklist(&self, submitter_id: UserId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM blacklist WHERE submitter_id = $1")
            .bind(submitter_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_blacklist(&self) -> Result<Vec<BlacklistEntry>, DbError> {
        let query = format!("SELECT {BLACKLIST_COLUMNS} FROM blacklist ORDER BY created_at DESC");
        Ok(sqlx::query_as(&query).fetch_all(&self.pool).await?)
    }
}
