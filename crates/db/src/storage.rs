//! The storage seam between the bot and its database.
//!
//! One trait, two implementations ([`crate::postgres::PgStorage`] and
//! [`crate::sqlite::SqliteStorage`]), selected once at startup by
//! [`crate::connect`]. Methods are zero-logic SQL wrappers; every call is
//! one self-contained session, nothing is shared across tasks.

use async_trait::async_trait;

use muraciet_core::application::NewApplication;
use muraciet_core::types::{DbId, Timestamp, UserId};

use crate::models::{Application, BlacklistEntry};
use crate::DbError;

/// Result of a guarded status transition.
///
/// The `UPDATE` behind [`Storage::resolve`] only matches rows still open,
/// and the one behind [`Storage::update_reply`] only rows already answered,
/// so a lost race surfaces here instead of double-applying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The row was in the expected state and has been updated.
    Applied,
    /// The row exists but some other executor got there first.
    NotPending,
    /// No row with that id.
    Missing,
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Create the schema if it does not exist yet. Called once at startup.
    async fn bootstrap(&self) -> Result<(), DbError>;

    // -- applications --

    /// Persist a confirmed submission with status `waiting`, returning the
    /// assigned id.
    async fn insert_application(&self, new: &NewApplication) -> Result<DbId, DbError>;

    async fn get_application(&self, id: DbId) -> Result<Option<Application>, DbError>;

    /// All applications by one submitter, newest first.
    async fn list_by_submitter(&self, submitter_id: UserId) -> Result<Vec<Application>, DbError>;

    /// All applications with the given stored status, newest first.
    async fn list_by_status(&self, status: &str) -> Result<Vec<Application>, DbError>;

    /// How many applications the submitter created at or after `since`.
    async fn count_since(&self, submitter_id: UserId, since: Timestamp) -> Result<i64, DbError>;

    /// How many of the submitter's applications were rejected at or after
    /// `since` (window over `updated_at`, when the rejection happened).
    async fn count_rejected_since(
        &self,
        submitter_id: UserId,
        since: Timestamp,
    ) -> Result<i64, DbError>;

    /// Transition an open application to `answered` or `rejected`, storing
    /// the reply text and notes. Guarded on the row still being open.
    async fn resolve(
        &self,
        id: DbId,
        status: &str,
        reply_text: &str,
        notes: &str,
        now: Timestamp,
    ) -> Result<ResolveOutcome, DbError>;

    /// Overwrite the reply text of an already-answered application and
    /// append `notes_suffix` to its notes. Guarded on status `answered`.
    async fn update_reply(
        &self,
        id: DbId,
        reply_text: &str,
        notes_suffix: &str,
        now: Timestamp,
    ) -> Result<ResolveOutcome, DbError>;

    /// Open applications created at or before `cutoff`, oldest first.
    async fn overdue_applications(&self, cutoff: Timestamp) -> Result<Vec<Application>, DbError>;

    /// Full-table scan, newest first, bounded. Used by the export.
    async fn list_all(&self, limit: i64) -> Result<Vec<Application>, DbError>;

    /// Delete every application, returning how many rows went. Admin only.
    async fn delete_all_applications(&self) -> Result<u64, DbError>;

    // -- blacklist --

    async fn is_blacklisted(&self, submitter_id: UserId) -> Result<bool, DbError>;

    /// Add a submitter to the blacklist. Returns `false` when the id was
    /// already listed (no row written, existing reason kept).
    async fn add_to_blacklist(
        &self,
        submitter_id: UserId,
        reason: Option<&str>,
        now: Timestamp,
    ) -> Result<bool, DbError>;

    /// Remove a submitter from the blacklist. Returns `false` when the id
    /// was not listed.
    async fn remove_from_blacklist(&self, submitter_id: UserId) -> Result<bool, DbError>;

    async fn list_blacklist(&self) -> Result<Vec<BlacklistEntry>, DbError>;
}
