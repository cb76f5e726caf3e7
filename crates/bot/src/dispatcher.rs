//! Long-poll loop and update routing.
//!
//! Every update is handled in its own spawned task so a slow delivery
//! never blocks polling. Routing precedence for private text messages:
//! commands, then a pending executor action, then the intake session;
//! stray text outside any dialog is ignored.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use muraciet_core::texts;
use muraciet_telegram::{CallbackQuery, Message, Update};

use crate::error::BotError;
use crate::handlers::{admin, executor, intake};
use crate::routing::{CB_EXEC_EDIT, CB_EXEC_REJECT, CB_EXEC_REPLY};
use crate::session::ActionKind;
use crate::state::AppState;

/// Poll for updates until `cancel` fires.
pub async fn run(state: Arc<AppState>, cancel: CancellationToken) {
    if let Err(error) = state.api.drop_pending_updates().await {
        tracing::warn!(error = %error, "Failed to drop pending updates");
    }

    let mut offset = 0i64;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Dispatcher stopping");
                break;
            }
            result = state.api.get_updates(offset) => match result {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        let state = Arc::clone(&state);
                        tokio::spawn(async move {
                            if let Err(error) = handle_update(&state, update).await {
                                tracing::error!(error = %error, "Update handling failed");
                            }
                        });
                    }
                }
                Err(error) if error.is_conflict() => {
                    // A second live instance; keep polling, it resolves
                    // itself when the other one stops.
                    tracing::warn!("getUpdates conflict: another instance is polling");
                    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                }
                Err(error) => {
                    tracing::warn!(error = %error, "Polling failed");
                    tokio::time::sleep(std::time::Duration::from_secs(2)).await;
                }
            }
        }
    }
}

async fn handle_update(state: &AppState, update: Update) -> Result<(), BotError> {
    if let Some(cb) = update.callback_query {
        return on_callback(state, cb).await;
    }
    if let Some(message) = update.message {
        return on_message(state, message).await;
    }
    if let Some(post) = update.channel_post {
        return on_channel_post(state, post).await;
    }
    Ok(())
}

/// A post in a channel the bot was added to. The bot offers no channel
/// surface, so the author gets nudged toward a direct message — except in
/// the executor channel, where our own digests would trigger the nudge.
async fn on_channel_post(state: &AppState, post: Message) -> Result<(), BotError> {
    if state.channel.get() == Some(post.chat.id) {
        return Ok(());
    }
    tracing::debug!(chat_id = post.chat.id, "Channel post nudged");
    state
        .api
        .send_message(post.chat.id, texts::GROUP_NUDGE, None)
        .await?;
    Ok(())
}

async fn on_callback(state: &AppState, cb: CallbackQuery) -> Result<(), BotError> {
    let Some(data) = cb.data.clone() else {
        return Ok(());
    };
    if let Some(id) = data.strip_prefix(CB_EXEC_REPLY) {
        if let Ok(id) = id.parse() {
            return executor::on_action(state, &cb, ActionKind::Reply, id).await;
        }
    }
    if let Some(id) = data.strip_prefix(CB_EXEC_REJECT) {
        if let Ok(id) = id.parse() {
            return executor::on_action(state, &cb, ActionKind::Reject, id).await;
        }
    }
    if let Some(id) = data.strip_prefix(CB_EXEC_EDIT) {
        if let Ok(id) = id.parse() {
            return executor::on_action(state, &cb, ActionKind::EditReply, id).await;
        }
    }
    match data.as_str() {
        admin::CB_CLEARALL_CONFIRM => admin::on_clearall_action(state, &cb, true).await,
        admin::CB_CLEARALL_CANCEL => admin::on_clearall_action(state, &cb, false).await,
        // Everything else belongs to the intake dialog: choice keys plus
        // the confirm/edit/cancel actions.
        _ => intake::on_callback(state, &cb, &data).await,
    }
}

async fn on_message(state: &AppState, message: Message) -> Result<(), BotError> {
    let Some(user) = message.from.clone() else {
        return Ok(());
    };
    if user.is_bot {
        return Ok(());
    }
    let chat_id = message.chat.id;

    if let Some(text) = message.text.as_deref() {
        if let Some((command, args)) = parse_command(text) {
            return on_command(state, &message, &user, command, args).await;
        }
    }

    if !message.chat.is_private() {
        return Ok(());
    }

    // A pending executor action takes precedence over an intake session.
    if let Some(pending) = state.sessions.take_pending(user.id).await {
        let Some(text) = message.text.as_deref() else {
            let prompt = match pending.kind {
                ActionKind::Reply => texts::reply_fallback_prompt(pending.record_id),
                ActionKind::Reject => texts::reject_fallback_prompt(pending.record_id),
                ActionKind::EditReply => texts::edit_fallback_prompt(pending.record_id),
            };
            state.sessions.restore_pending(user.id, pending).await;
            state.api.send_message(chat_id, &prompt, None).await?;
            return Ok(());
        };
        return executor::complete(state, &user, chat_id, pending, text).await;
    }

    if state.sessions.has_intake(user.id).await {
        return intake::on_message(state, &user, chat_id, &message).await;
    }

    tracing::debug!(user_id = user.id, "Text outside any dialog ignored");
    Ok(())
}

async fn on_command(
    state: &AppState,
    message: &Message,
    user: &muraciet_telegram::User,
    command: &str,
    args: &str,
) -> Result<(), BotError> {
    let chat_id = message.chat.id;
    match command {
        "/start" => {
            if !message.chat.is_private() {
                state.api.send_message(chat_id, texts::GROUP_NUDGE, None).await?;
                return Ok(());
            }
            match executor::parse_start_payload(args.trim()) {
                Some((kind, record_id)) => {
                    executor::on_deep_link(state, user, chat_id, kind, record_id).await
                }
                None => intake::start(state, user, chat_id).await,
            }
        }
        "/help" => admin::help(state, chat_id).await,
        "/ping" => admin::ping(state, user, chat_id).await,
        "/chatid" => admin::chat_id(state, user, chat_id).await,
        "/blacklist" => admin::blacklist(state, user, chat_id).await,
        "/ban" => admin::ban(state, user, chat_id, args).await,
        "/unban" => admin::unban(state, user, chat_id, args).await,
        "/export" => admin::export(state, user, chat_id).await,
        "/clearall" => admin::clearall(state, user, chat_id).await,
        _ => {
            if message.chat.is_private() {
                state.api.send_message(chat_id, texts::UNKNOWN, None).await?;
            }
            Ok(())
        }
    }
}

/// Split `/command arg...`, tolerating the `/command@botname` form used in
/// groups. Returns `None` for non-command text.
fn parse_command(text: &str) -> Option<(&str, &str)> {
    if !text.starts_with('/') {
        return None;
    }
    let (head, args) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
    let command = head.split('@').next().unwrap_or(head);
    Some((command, args))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_parsing_splits_args() {
        assert_eq!(parse_command("/ban 42 spam"), Some(("/ban", "42 spam")));
        assert_eq!(parse_command("/start reply_7"), Some(("/start", "reply_7")));
        assert_eq!(parse_command("/ping"), Some(("/ping", "")));
    }

    #[test]
    fn group_mention_suffix_is_stripped() {
        assert_eq!(parse_command("/chatid@muraciet_bot"), Some(("/chatid", "")));
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse_command("salam"), None);
        assert_eq!(parse_command(""), None);
    }
}
