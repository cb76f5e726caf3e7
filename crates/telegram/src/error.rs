//! Errors from the Bot API layer.

use crate::types::ResponseParameters;

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with `ok: false`.
    #[error("Telegram API error ({code}): {description}")]
    Api {
        code: i64,
        description: String,
        parameters: Option<ResponseParameters>,
    },

    /// The API answered `ok: true` but without a result payload.
    #[error("Telegram API returned an empty result")]
    EmptyResult,
}

impl TelegramError {
    /// New chat id when the failure was a group-to-supergroup migration.
    pub fn migrate_to_chat_id(&self) -> Option<i64> {
        match self {
            TelegramError::Api { parameters, .. } => {
                parameters.and_then(|p| p.migrate_to_chat_id)
            }
            _ => None,
        }
    }

    /// A 409 means another getUpdates consumer is live; the poll loop
    /// backs off instead of crashing.
    pub fn is_conflict(&self) -> bool {
        matches!(self, TelegramError::Api { code: 409, .. })
    }
}
