//! Minimal Telegram Bot API client: typed wire structs, long polling,
//! message sending and in-place editing, callback answers, document upload.
//!
//! Deliberately not a full API binding; only the endpoints this service
//! calls are wrapped.

pub mod client;
pub mod error;
pub mod types;

pub use client::{BotApi, POLL_TIMEOUT_SECS};
pub use error::TelegramError;
pub use types::{
    CallbackQuery, Chat, InlineKeyboardButton, InlineKeyboardMarkup, Message, Update, User,
};
