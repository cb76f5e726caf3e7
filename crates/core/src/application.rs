//! Application record vocabulary: lifecycle status, category, identity
//! document kind, and the insert payload produced by a finished intake.
//!
//! Wire values must match what is stored in the `applications` table
//! (`status`, `category`, `id_kind` columns) and what the CSV export and
//! channel messages render.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Timestamp, UserId};

/// Maximum characters of body text used when a short label is needed
/// (SLA digest lines).
pub const SHORT_LABEL_CHARS: usize = 30;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of an application.
///
/// `Processing` exists in stored data from earlier deployments; it is parsed
/// and treated as open but never produced by this bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Waiting,
    Processing,
    Answered,
    Rejected,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Waiting => "waiting",
            Status::Processing => "processing",
            Status::Answered => "answered",
            Status::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "waiting" => Ok(Status::Waiting),
            "processing" => Ok(Status::Processing),
            "answered" => Ok(Status::Answered),
            "rejected" => Ok(Status::Rejected),
            other => Err(CoreError::UnknownValue {
                field: "status",
                value: other.to_string(),
            }),
        }
    }

    /// Azerbaijani label used in the CSV export.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Waiting => "Gözləyir 🟡",
            Status::Processing => "Baxılır 🔵",
            Status::Answered => "Cavablandırıldı ✉️",
            Status::Rejected => "İmtina edildi 🚫",
        }
    }

    /// Open statuses still count against the SLA.
    pub fn is_open(&self) -> bool {
        matches!(self, Status::Waiting | Status::Processing)
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// What kind of submission the citizen chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Complaint,
    Suggestion,
    Application,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Complaint => "complaint",
            Category::Suggestion => "suggestion",
            Category::Application => "application",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "complaint" => Ok(Category::Complaint),
            "suggestion" => Ok(Category::Suggestion),
            "application" => Ok(Category::Application),
            other => Err(CoreError::UnknownValue {
                field: "category",
                value: other.to_string(),
            }),
        }
    }

    /// Azerbaijani label shown on buttons, summaries, and the export.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Complaint => "Şikayət",
            Category::Suggestion => "Təklif",
            Category::Application => "Ərizə",
        }
    }
}

// ---------------------------------------------------------------------------
// Identity document kind
// ---------------------------------------------------------------------------

/// Which identity code the citizen submitted.
///
/// FIN is the 7-character code on ID cards; PIN is the 5-6 character code
/// on older documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdKind {
    Fin,
    Pin,
}

impl IdKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdKind::Fin => "fin",
            IdKind::Pin => "pin",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "fin" => Ok(IdKind::Fin),
            "pin" => Ok(IdKind::Pin),
            other => Err(CoreError::UnknownValue {
                field: "id_kind",
                value: other.to_string(),
            }),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IdKind::Fin => "FIN",
            IdKind::Pin => "PIN",
        }
    }
}

// ---------------------------------------------------------------------------
// Insert payload
// ---------------------------------------------------------------------------

/// A validated, complete submission ready to be persisted.
///
/// `created_at` is the instant the body was accepted, which is also the
/// timestamp the citizen saw in the confirmation summary.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub submitter_id: UserId,
    pub submitter_handle: Option<String>,
    pub fullname: String,
    pub phone: String,
    pub id_kind: IdKind,
    pub id_code: String,
    pub category: Category,
    pub body: String,
    pub photo_ref: Option<String>,
    pub created_at: Timestamp,
}

/// Head of the body text, used where a one-line label is needed.
pub fn short_label(body: &str) -> String {
    body.chars().take(SHORT_LABEL_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trip() {
        for status in [
            Status::Waiting,
            Status::Processing,
            Status::Answered,
            Status::Rejected,
        ] {
            assert_eq!(Status::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn status_rejects_unknown() {
        assert!(Status::parse("done").is_err());
        assert!(Status::parse("").is_err());
    }

    #[test]
    fn only_waiting_and_processing_are_open() {
        assert!(Status::Waiting.is_open());
        assert!(Status::Processing.is_open());
        assert!(!Status::Answered.is_open());
        assert!(!Status::Rejected.is_open());
    }

    #[test]
    fn category_labels() {
        assert_eq!(Category::Complaint.label(), "Şikayət");
        assert_eq!(Category::Suggestion.label(), "Təklif");
        assert_eq!(Category::Application.label(), "Ərizə");
    }

    #[test]
    fn id_kind_round_trip() {
        assert_eq!(IdKind::parse("fin").unwrap(), IdKind::Fin);
        assert_eq!(IdKind::parse("pin").unwrap(), IdKind::Pin);
        assert!(IdKind::parse("FIN").is_err());
    }

    #[test]
    fn short_label_respects_char_boundaries() {
        assert_eq!(short_label("qaz xətti"), "qaz xətti");
        let long = "ə".repeat(40);
        assert_eq!(short_label(&long).chars().count(), 30);
    }
}
