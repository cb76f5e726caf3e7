//! Admin command surface.
//!
//! Everything except `/help` is gated on `ADMIN_USER_IDS`. Non-admin
//! invocations get a visible refusal and an informational log entry,
//! nothing more.

use muraciet_core::projection;
use muraciet_core::texts;
use muraciet_core::timefmt;
use muraciet_telegram::{CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, User};

use crate::error::BotError;
use crate::export;
use crate::state::AppState;

pub const CB_CLEARALL_CONFIRM: &str = "confirm_clearall";
pub const CB_CLEARALL_CANCEL: &str = "cancel_clearall";

/// Ceiling for listing messages (headroom under the 4096 text limit).
const LIST_LIMIT: usize = 4000;

async fn require_admin(state: &AppState, user: &User, chat_id: i64) -> Result<bool, BotError> {
    if state.config.is_admin(user.id) {
        return Ok(true);
    }
    tracing::info!(user_id = user.id, "Admin command from non-admin");
    state.api.send_message(chat_id, texts::NOT_PERMITTED, None).await?;
    Ok(false)
}

pub async fn blacklist(state: &AppState, user: &User, chat_id: i64) -> Result<(), BotError> {
    if !require_admin(state, user, chat_id).await? {
        return Ok(());
    }
    let entries = state.storage.list_blacklist().await?;
    if entries.is_empty() {
        state.api.send_message(chat_id, texts::BLACKLIST_EMPTY, None).await?;
        return Ok(());
    }
    let mut message = texts::BLACKLIST_HEADER.to_string();
    for entry in &entries {
        message.push_str(&format!(
            "• {} — {} ({})\n",
            entry.submitter_id,
            entry.reason.as_deref().unwrap_or(texts::NO_REASON),
            timefmt::date(entry.created_at),
        ));
    }
    let message = projection::clamp_utf16(&message, LIST_LIMIT);
    state.api.send_message(chat_id, &message, None).await?;
    Ok(())
}

pub async fn ban(state: &AppState, user: &User, chat_id: i64, args: &str) -> Result<(), BotError> {
    if !require_admin(state, user, chat_id).await? {
        return Ok(());
    }
    let mut parts = args.splitn(2, char::is_whitespace);
    let Some(id_arg) = parts.next().filter(|s| !s.is_empty()) else {
        state.api.send_message(chat_id, texts::BAN_USAGE, None).await?;
        return Ok(());
    };
    let Ok(target) = id_arg.parse::<i64>() else {
        state.api.send_message(chat_id, texts::USER_ID_NUMERIC, None).await?;
        return Ok(());
    };
    let reason = parts
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(texts::DEFAULT_BAN_REASON);

    let added = state
        .storage
        .add_to_blacklist(target, Some(reason), chrono::Utc::now())
        .await?;
    let notice = if added {
        tracing::info!(target, admin_id = user.id, "Submitter banned");
        texts::banned(target)
    } else {
        texts::ALREADY_BLACKLISTED.to_string()
    };
    state.api.send_message(chat_id, &notice, None).await?;
    Ok(())
}

pub async fn unban(state: &AppState, user: &User, chat_id: i64, args: &str) -> Result<(), BotError> {
    if !require_admin(state, user, chat_id).await? {
        return Ok(());
    }
    let arg = args.trim();
    if arg.is_empty() {
        state.api.send_message(chat_id, texts::UNBAN_USAGE, None).await?;
        return Ok(());
    }
    let Ok(target) = arg.parse::<i64>() else {
        state.api.send_message(chat_id, texts::USER_ID_NUMERIC, None).await?;
        return Ok(());
    };
    let removed = state.storage.remove_from_blacklist(target).await?;
    let notice = if removed {
        tracing::info!(target, admin_id = user.id, "Submitter unbanned");
        texts::unbanned(target)
    } else {
        texts::NOT_BLACKLISTED.to_string()
    };
    state.api.send_message(chat_id, &notice, None).await?;
    Ok(())
}

pub async fn export(state: &AppState, user: &User, chat_id: i64) -> Result<(), BotError> {
    if !require_admin(state, user, chat_id).await? {
        return Ok(());
    }
    let records = state.storage.list_all(state.config.export_limit).await?;
    if records.is_empty() {
        state.api.send_message(chat_id, texts::EXPORT_EMPTY, None).await?;
        return Ok(());
    }
    let count = records.len();
    let csv = match export::render_csv(&records) {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!(error = %error, "CSV rendering failed");
            state.api.send_message(chat_id, texts::EXPORT_FAILED, None).await?;
            return Ok(());
        }
    };
    let filename = format!("muracietler_{}.csv", chrono::Utc::now().format("%Y%m%d"));
    state
        .api
        .send_document(chat_id, &filename, csv, texts::EXPORT_CAPTION)
        .await?;
    tracing::info!(count, admin_id = user.id, "Export delivered");
    Ok(())
}

/// `/clearall`: a confirm/cancel round trip before anything is deleted.
pub async fn clearall(state: &AppState, user: &User, chat_id: i64) -> Result<(), BotError> {
    if !require_admin(state, user, chat_id).await? {
        return Ok(());
    }
    let keyboard = InlineKeyboardMarkup::row(vec![
        InlineKeyboardButton::callback(texts::BTN_CLEARALL_YES, CB_CLEARALL_CONFIRM),
        InlineKeyboardButton::callback(texts::BTN_CLEARALL_NO, CB_CLEARALL_CANCEL),
    ]);
    state
        .api
        .send_message(chat_id, texts::CLEARALL_WARNING, Some(&keyboard))
        .await?;
    Ok(())
}

/// The confirm/cancel button under the `/clearall` warning. The warning
/// message is edited in place with the result.
pub async fn on_clearall_action(
    state: &AppState,
    cb: &CallbackQuery,
    confirmed: bool,
) -> Result<(), BotError> {
    if let Err(error) = state.api.answer_callback_query(&cb.id, None, false, None).await {
        tracing::debug!(error = %error, "Failed to answer callback query");
    }
    let Some(message) = cb.message.as_ref() else {
        return Ok(());
    };
    if !state.config.is_admin(cb.from.id) {
        tracing::info!(user_id = cb.from.id, "Clear-all action from non-admin");
        state
            .api
            .send_message(message.chat.id, texts::NOT_PERMITTED, None)
            .await?;
        return Ok(());
    }
    let result = if confirmed {
        let count = state.storage.delete_all_applications().await?;
        tracing::warn!(count, admin_id = cb.from.id, "All applications deleted");
        texts::cleared(count)
    } else {
        texts::CLEARALL_CANCELLED.to_string()
    };
    state
        .api
        .edit_message_text(message.chat.id, message.message_id, &result, None)
        .await?;
    Ok(())
}

pub async fn chat_id(state: &AppState, user: &User, chat_id: i64) -> Result<(), BotError> {
    if !require_admin(state, user, chat_id).await? {
        return Ok(());
    }
    state
        .api
        .send_message(chat_id, &texts::chat_id_reply(chat_id), None)
        .await?;
    Ok(())
}

pub async fn ping(state: &AppState, user: &User, chat_id: i64) -> Result<(), BotError> {
    if !require_admin(state, user, chat_id).await? {
        return Ok(());
    }
    state.api.send_message(chat_id, texts::PONG, None).await?;
    Ok(())
}

pub async fn help(state: &AppState, chat_id: i64) -> Result<(), BotError> {
    state.api.send_message(chat_id, texts::HELP, None).await?;
    Ok(())
}
