//! Row models for the `applications` and `blacklist` tables.
//!
//! Rows carry the wire strings exactly as stored; the typed accessors parse
//! them into the core vocabularies and fail on values no deployment should
//! contain.

use serde::Serialize;
use sqlx::FromRow;

use muraciet_core::application::{Category, IdKind, Status};
use muraciet_core::error::CoreError;
use muraciet_core::projection::SummaryFields;
use muraciet_core::types::{DbId, Timestamp, UserId};

/// Column list for `applications` queries.
pub(crate) const APPLICATION_COLUMNS: &str = "id, submitter_id, submitter_handle, fullname, \
     phone, id_kind, id_code, category, body, photo_ref, status, reply_text, notes, \
     created_at, updated_at";

/// Column list for `blacklist` queries.
pub(crate) const BLACKLIST_COLUMNS: &str = "id, submitter_id, reason, created_at";

/// A row from the `applications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Application {
    pub id: DbId,
    pub submitter_id: UserId,
    pub submitter_handle: Option<String>,
    pub fullname: String,
    pub phone: String,
    pub id_kind: String,
    pub id_code: String,
    pub category: String,
    pub body: String,
    pub photo_ref: Option<String>,
    pub status: String,
    pub reply_text: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Application {
    pub fn status(&self) -> Result<Status, CoreError> {
        Status::parse(&self.status)
    }

    pub fn category(&self) -> Result<Category, CoreError> {
        Category::parse(&self.category)
    }

    pub fn id_kind(&self) -> Result<IdKind, CoreError> {
        IdKind::parse(&self.id_kind)
    }

    /// Borrow the fields every summary rendering needs.
    pub fn summary_fields(&self) -> Result<SummaryFields<'_>, CoreError> {
        Ok(SummaryFields {
            fullname: &self.fullname,
            phone: &self.phone,
            id_kind: self.id_kind()?,
            id_code: &self.id_code,
            category: self.category()?,
            body: &self.body,
            created_at: self.created_at,
        })
    }
}

/// A row from the `blacklist` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BlacklistEntry {
    pub id: DbId,
    pub submitter_id: UserId,
    pub reason: Option<String>,
    pub created_at: Timestamp,
}
