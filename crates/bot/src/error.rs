//! Error type for update handling.

use muraciet_core::error::CoreError;
use muraciet_db::DbError;
use muraciet_telegram::TelegramError;

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Telegram(#[from] TelegramError),
}
