//! Delivery to the executor moderation channel and in-place message edits.
//!
//! Channel sends detect the group-to-supergroup migration error, adopt the
//! new chat id, and retry exactly once. Edits of already-posted messages
//! are best-effort: a failure is logged, never shown to anyone, and never
//! rolls back a transition that already committed.

use muraciet_core::application::NewApplication;
use muraciet_core::projection::{self, CAPTION_LIMIT};
use muraciet_core::texts;
use muraciet_core::types::DbId;
use muraciet_telegram::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::error::BotError;
use crate::session::PendingOrigin;
use crate::state::AppState;

pub const CB_EXEC_REPLY: &str = "exec_reply:";
pub const CB_EXEC_REJECT: &str = "exec_reject:";
pub const CB_EXEC_EDIT: &str = "exec_edit:";

/// Action affordances under a fresh channel post.
pub fn action_keyboard(record_id: DbId) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::row(vec![
        InlineKeyboardButton::callback(texts::BTN_EXEC_REPLY, format!("{CB_EXEC_REPLY}{record_id}")),
        InlineKeyboardButton::callback(
            texts::BTN_EXEC_REJECT,
            format!("{CB_EXEC_REJECT}{record_id}"),
        ),
    ])
}

/// The persistent edit affordance on an answered post.
pub fn edit_keyboard(record_id: DbId) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::row(vec![InlineKeyboardButton::callback(
        texts::BTN_EXEC_EDIT_REPLY,
        format!("{CB_EXEC_EDIT}{record_id}"),
    )])
}

/// Post a newly persisted record to the executor channel.
pub async fn deliver_application(
    state: &AppState,
    record_id: DbId,
    new: &NewApplication,
    now: muraciet_core::types::Timestamp,
) -> Result<(), BotError> {
    let fields = projection::SummaryFields {
        fullname: &new.fullname,
        phone: &new.phone,
        id_kind: new.id_kind,
        id_code: &new.id_code,
        category: new.category,
        body: &new.body,
        created_at: new.created_at,
    };
    let status_line =
        projection::pending_status_line(new.created_at, now, state.config.overdue_display_days);
    let post = projection::channel_post(
        record_id,
        &fields,
        new.submitter_handle.as_deref(),
        new.submitter_id,
        status_line,
    );
    let keyboard = action_keyboard(record_id);
    send_channel_message(state, &post, new.photo_ref.as_deref(), Some(&keyboard)).await
}

/// Send to the executor channel, retrying once on chat migration.
///
/// A no-op when no channel is configured. Photo captions are clamped to
/// the caption ceiling; executors see the full text in the detail view.
pub async fn send_channel_message(
    state: &AppState,
    text: &str,
    photo_ref: Option<&str>,
    reply_markup: Option<&InlineKeyboardMarkup>,
) -> Result<(), BotError> {
    let Some(chat_id) = state.channel.get() else {
        tracing::warn!("Executor channel not configured; message not routed");
        return Ok(());
    };
    match send_once(state, chat_id, text, photo_ref, reply_markup).await {
        Ok(()) => Ok(()),
        Err(error) => match error.migrate_to_chat_id() {
            Some(new_id) => {
                state.channel.migrate(new_id);
                send_once(state, new_id, text, photo_ref, reply_markup).await?;
                Ok(())
            }
            None => Err(error.into()),
        },
    }
}

async fn send_once(
    state: &AppState,
    chat_id: i64,
    text: &str,
    photo_ref: Option<&str>,
    reply_markup: Option<&InlineKeyboardMarkup>,
) -> Result<(), muraciet_telegram::TelegramError> {
    match photo_ref {
        Some(file_id) => {
            let caption = projection::clamp_utf16(text, CAPTION_LIMIT);
            state
                .api
                .send_photo(chat_id, file_id, &caption, reply_markup)
                .await?;
        }
        None => {
            state.api.send_message(chat_id, text, reply_markup).await?;
        }
    }
    Ok(())
}

/// Rewrite an already-posted channel message in place. Best-effort.
pub async fn edit_origin(
    state: &AppState,
    origin: &PendingOrigin,
    content: &str,
    reply_markup: Option<&InlineKeyboardMarkup>,
) {
    let result = if origin.has_photo {
        state
            .api
            .edit_message_caption(origin.chat_id, origin.message_id, content, reply_markup)
            .await
    } else {
        state
            .api
            .edit_message_text(origin.chat_id, origin.message_id, content, reply_markup)
            .await
    };
    if let Err(error) = result {
        tracing::warn!(
            chat_id = origin.chat_id,
            message_id = origin.message_id,
            error = %error,
            "Failed to edit origin message"
        );
    }
}

/// Best-effort direct message to every administrator.
pub async fn notify_admins(state: &AppState, text: &str) {
    for &admin_id in &state.config.admin_user_ids {
        if let Err(error) = state.api.send_message(admin_id, text, None).await {
            tracing::warn!(admin_id, error = %error, "Failed to notify admin");
        }
    }
}
