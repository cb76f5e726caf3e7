//! Executor routing protocol: action entry on channel posts, the private
//! reply/reject/edit dialogs, and completion.
//!
//! Completion order is fixed: notify the submitter, transition the record,
//! then best-effort edit of the origin channel message. A notify failure
//! keeps the pending action so the executor can resend the text; a lost
//! transition race stops before the origin edit.

use chrono::{Duration, Utc};

use muraciet_core::application::Status;
use muraciet_core::projection::{self, CAPTION_LIMIT, TEXT_LIMIT};
use muraciet_core::texts;
use muraciet_core::types::DbId;
use muraciet_db::models::Application;
use muraciet_db::ResolveOutcome;
use muraciet_telegram::{CallbackQuery, User};

use crate::error::BotError;
use crate::routing;
use crate::session::{ActionKind, PendingAction, PendingOrigin};
use crate::state::AppState;

/// Parse a `/start` deep-link payload of the form `{action}_{record_id}`.
pub fn parse_start_payload(payload: &str) -> Option<(ActionKind, DbId)> {
    let (verb, id) = payload.split_once('_')?;
    let kind = match verb {
        "reply" => ActionKind::Reply,
        "reject" => ActionKind::Reject,
        "edit" => ActionKind::EditReply,
        _ => return None,
    };
    Some((kind, id.parse().ok()?))
}

fn deep_link(bot_username: &str, kind: ActionKind, record_id: DbId) -> String {
    format!(
        "https://t.me/{bot_username}?start={}_{record_id}",
        kind.verb()
    )
}

/// An executor pressed an action button on a channel post.
///
/// Verifies the origin, strips the affordances, records the pending
/// association, and redirects the executor to a private exchange.
pub async fn on_action(
    state: &AppState,
    cb: &CallbackQuery,
    kind: ActionKind,
    record_id: DbId,
) -> Result<(), BotError> {
    let Some(message) = cb.message.as_ref() else {
        return Ok(());
    };

    if state.channel.get() != Some(message.chat.id) {
        tracing::info!(
            user_id = cb.from.id,
            chat_id = message.chat.id,
            "Action from outside the executor channel"
        );
        state
            .api
            .answer_callback_query(&cb.id, Some(texts::EXECUTOR_GROUP_ONLY), true, None)
            .await?;
        return Ok(());
    }

    let Some(record) = state.storage.get_application(record_id).await? else {
        state
            .api
            .answer_callback_query(&cb.id, Some(texts::RECORD_NOT_FOUND), true, None)
            .await?;
        return Ok(());
    };
    let status = record.status()?;
    let notice = match kind {
        ActionKind::EditReply if status != Status::Answered => Some(texts::EDIT_ONLY_ANSWERED),
        ActionKind::Reply | ActionKind::Reject if !status.is_open() => {
            Some(texts::ALREADY_HANDLED)
        }
        _ => None,
    };
    if let Some(notice) = notice {
        state
            .api
            .answer_callback_query(&cb.id, Some(notice), true, None)
            .await?;
        return Ok(());
    }

    // Remove the affordances so a second executor cannot enter the same
    // dialog from the post.
    if let Err(error) = state
        .api
        .edit_message_reply_markup(message.chat.id, message.message_id, None)
        .await
    {
        tracing::warn!(record_id, error = %error, "Failed to strip action buttons");
    }

    let origin = PendingOrigin {
        chat_id: message.chat.id,
        message_id: message.message_id,
        content: message.content().unwrap_or_default().to_string(),
        has_photo: message.photo.is_some(),
    };
    state
        .sessions
        .set_pending(
            cb.from.id,
            PendingAction {
                record_id,
                kind,
                origin: Some(origin),
            },
        )
        .await;
    tracing::info!(record_id, actor_id = cb.from.id, action = kind.verb(), "Action entered");

    let url = deep_link(&state.bot_username, kind, record_id);
    state
        .api
        .answer_callback_query(&cb.id, None, false, Some(&url))
        .await?;
    Ok(())
}

/// The executor arrived in the private exchange via the deep link: show
/// the full record detail and ask for the free text.
pub async fn on_deep_link(
    state: &AppState,
    user: &User,
    chat_id: i64,
    kind: ActionKind,
    record_id: DbId,
) -> Result<(), BotError> {
    let Some(record) = state.storage.get_application(record_id).await? else {
        state
            .api
            .send_message(chat_id, texts::RECORD_NOT_FOUND, None)
            .await?;
        return Ok(());
    };
    let status = record.status()?;
    let notice = match kind {
        ActionKind::EditReply if status != Status::Answered => Some(texts::EDIT_ONLY_ANSWERED),
        ActionKind::Reply | ActionKind::Reject if !status.is_open() => {
            Some(texts::ALREADY_HANDLED)
        }
        _ => None,
    };
    if let Some(notice) = notice {
        state.api.send_message(chat_id, notice, None).await?;
        return Ok(());
    }

    // Keep the origin association from the button press when it is still
    // around; after a restart the dialog works without it, minus the
    // channel-message edit.
    let origin = state
        .sessions
        .take_pending(user.id)
        .await
        .filter(|p| p.record_id == record_id && p.kind == kind)
        .and_then(|p| p.origin);
    state
        .sessions
        .set_pending(user.id, PendingAction { record_id, kind, origin })
        .await;

    send_detail(state, chat_id, &record, kind).await
}

async fn send_detail(
    state: &AppState,
    chat_id: i64,
    record: &Application,
    kind: ActionKind,
) -> Result<(), BotError> {
    let mut prompt = String::new();
    if kind == ActionKind::EditReply {
        if let Some(reply) = record.reply_text.as_deref() {
            prompt.push_str(&texts::current_reply(reply));
            prompt.push_str("\n\n");
        }
    }
    prompt.push_str(match kind {
        ActionKind::Reply => texts::REPLY_DM_PROMPT,
        ActionKind::Reject => texts::REJECT_DM_PROMPT,
        ActionKind::EditReply => texts::EDIT_DM_PROMPT,
    });

    let detail = projection::detail_view(&record.summary_fields()?, &prompt);
    match record.photo_ref.as_deref() {
        Some(file_id) if projection::utf16_len(&detail) <= CAPTION_LIMIT => {
            state.api.send_photo(chat_id, file_id, &detail, None).await?;
        }
        Some(file_id) => {
            // The full summary never reaches the executor truncated: short
            // caption on the photo, complete detail as a separate message.
            state
                .api
                .send_photo(chat_id, file_id, texts::PHOTO_CAPTION_FALLBACK, None)
                .await?;
            state.api.send_message(chat_id, &detail, None).await?;
        }
        None => {
            state.api.send_message(chat_id, &detail, None).await?;
        }
    }
    Ok(())
}

/// Free text from an actor with a pending action: complete it.
///
/// The caller has already removed the pending action from the store; this
/// function restores it on transient failures.
pub async fn complete(
    state: &AppState,
    user: &User,
    chat_id: i64,
    pending: PendingAction,
    text: &str,
) -> Result<(), BotError> {
    let record = match state.storage.get_application(pending.record_id).await {
        Ok(record) => record,
        Err(error) => {
            tracing::error!(record_id = pending.record_id, error = %error, "Load failed during completion");
            state.sessions.restore_pending(user.id, pending).await;
            state.api.send_message(chat_id, texts::GENERIC_ERROR, None).await?;
            return Ok(());
        }
    };
    let Some(record) = record else {
        state
            .api
            .send_message(chat_id, texts::RECORD_NOT_FOUND, None)
            .await?;
        return Ok(());
    };

    let actor = projection::actor_handle(user.username.as_deref(), user.id);
    match pending.kind {
        ActionKind::Reply => complete_reply(state, user, chat_id, pending, &record, &actor, text).await,
        ActionKind::Reject => {
            complete_reject(state, user, chat_id, pending, &record, &actor, text).await
        }
        ActionKind::EditReply => {
            complete_edit(state, user, chat_id, pending, &record, &actor, text).await
        }
    }
}

async fn complete_reply(
    state: &AppState,
    user: &User,
    chat_id: i64,
    pending: PendingAction,
    record: &Application,
    actor: &str,
    text: &str,
) -> Result<(), BotError> {
    if notify_submitter(state, user, chat_id, &pending, record, &texts::reply_notification(text))
        .await?
        .is_none()
    {
        return Ok(());
    }

    let outcome = transition(
        state,
        user,
        chat_id,
        &pending,
        Status::Answered,
        text,
        &format!("Replied by {actor}"),
    )
    .await?;
    if outcome != ResolveOutcome::Applied {
        return Ok(());
    }
    tracing::info!(record_id = record.id, actor_id = user.id, "Application answered");

    if let Some(origin) = &pending.origin {
        let rewritten =
            projection::rewrite_status_line(&origin.content, &projection::marker_answered(actor));
        let limit = if origin.has_photo { CAPTION_LIMIT } else { TEXT_LIMIT };
        let content = projection::with_reply_block(&rewritten, text, limit);
        routing::edit_origin(state, origin, &content, Some(&routing::edit_keyboard(record.id)))
            .await;
    }
    state.api.send_message(chat_id, texts::REPLY_SENT, None).await?;
    Ok(())
}

async fn complete_reject(
    state: &AppState,
    user: &User,
    chat_id: i64,
    pending: PendingAction,
    record: &Application,
    actor: &str,
    reason: &str,
) -> Result<(), BotError> {
    if notify_submitter(state, user, chat_id, &pending, record, &texts::reject_notification(reason))
        .await?
        .is_none()
    {
        return Ok(());
    }

    let outcome = transition(
        state,
        user,
        chat_id,
        &pending,
        Status::Rejected,
        reason,
        &format!("Rejected by {actor}: {reason}"),
    )
    .await?;
    if outcome != ResolveOutcome::Applied {
        return Ok(());
    }
    tracing::info!(record_id = record.id, actor_id = user.id, "Application rejected");

    if let Some(origin) = &pending.origin {
        let rewritten =
            projection::rewrite_status_line(&origin.content, &projection::marker_rejected(actor));
        let limit = if origin.has_photo { CAPTION_LIMIT } else { TEXT_LIMIT };
        let content = projection::with_reply_block(&rewritten, reason, limit);
        routing::edit_origin(state, origin, &content, None).await;
    }
    state.api.send_message(chat_id, texts::REJECT_SENT, None).await?;

    auto_blacklist(state, record).await;
    Ok(())
}

async fn complete_edit(
    state: &AppState,
    user: &User,
    chat_id: i64,
    pending: PendingAction,
    record: &Application,
    actor: &str,
    text: &str,
) -> Result<(), BotError> {
    if notify_submitter(
        state,
        user,
        chat_id,
        &pending,
        record,
        &texts::updated_reply_notification(text),
    )
    .await?
    .is_none()
    {
        return Ok(());
    }

    let outcome = match state
        .storage
        .update_reply(record.id, text, &format!("; edited by {actor}"), Utc::now())
        .await
    {
        Ok(outcome) => outcome,
        Err(error) => {
            tracing::error!(record_id = record.id, error = %error, "Reply edit failed");
            state.sessions.restore_pending(user.id, pending).await;
            state.api.send_message(chat_id, texts::GENERIC_ERROR, None).await?;
            return Ok(());
        }
    };
    match outcome {
        ResolveOutcome::Applied => {}
        ResolveOutcome::NotPending => {
            state
                .api
                .send_message(chat_id, texts::EDIT_ONLY_ANSWERED, None)
                .await?;
            return Ok(());
        }
        ResolveOutcome::Missing => {
            state
                .api
                .send_message(chat_id, texts::RECORD_NOT_FOUND, None)
                .await?;
            return Ok(());
        }
    }
    tracing::info!(record_id = record.id, actor_id = user.id, "Reply edited");

    // Only the reply block changes; the status line and header written at
    // completion time stay as they are.
    if let Some(origin) = &pending.origin {
        let limit = if origin.has_photo { CAPTION_LIMIT } else { TEXT_LIMIT };
        let content = projection::with_reply_block(&origin.content, text, limit);
        routing::edit_origin(state, origin, &content, Some(&routing::edit_keyboard(record.id)))
            .await;
    }
    state.api.send_message(chat_id, texts::REPLY_UPDATED, None).await?;
    Ok(())
}

/// Deliver the notification to the submitter. On failure the pending
/// action is restored and `None` returned so the executor can retry.
async fn notify_submitter(
    state: &AppState,
    user: &User,
    chat_id: i64,
    pending: &PendingAction,
    record: &Application,
    notification: &str,
) -> Result<Option<()>, BotError> {
    match state
        .api
        .send_message(record.submitter_id, notification, None)
        .await
    {
        Ok(_) => Ok(Some(())),
        Err(error) => {
            tracing::warn!(
                record_id = record.id,
                submitter_id = record.submitter_id,
                error = %error,
                "Failed to notify submitter"
            );
            state.sessions.restore_pending(user.id, pending.clone()).await;
            state.api.send_message(chat_id, texts::NOTIFY_FAILED, None).await?;
            Ok(None)
        }
    }
}

/// Run the guarded status transition, reporting terminal outcomes to the
/// executor. Transient storage errors restore the pending action.
async fn transition(
    state: &AppState,
    user: &User,
    chat_id: i64,
    pending: &PendingAction,
    status: Status,
    reply_text: &str,
    notes: &str,
) -> Result<ResolveOutcome, BotError> {
    let outcome = match state
        .storage
        .resolve(pending.record_id, status.as_str(), reply_text, notes, Utc::now())
        .await
    {
        Ok(outcome) => outcome,
        Err(error) => {
            tracing::error!(record_id = pending.record_id, error = %error, "Transition failed");
            state.sessions.restore_pending(user.id, pending.clone()).await;
            state.api.send_message(chat_id, texts::GENERIC_ERROR, None).await?;
            return Ok(ResolveOutcome::NotPending);
        }
    };
    match outcome {
        ResolveOutcome::NotPending => {
            state.api.send_message(chat_id, texts::ALREADY_HANDLED, None).await?;
        }
        ResolveOutcome::Missing => {
            state.api.send_message(chat_id, texts::RECORD_NOT_FOUND, None).await?;
        }
        ResolveOutcome::Applied => {}
    }
    Ok(outcome)
}

/// After a rejection: blacklist the submitter once their rejection count
/// crosses the threshold. Best-effort throughout; a failure here never
/// affects the completed rejection.
async fn auto_blacklist(state: &AppState, record: &Application) {
    let submitter_id = record.submitter_id;
    let window = Duration::days(state.policy.reject_window_days);
    let now = Utc::now();

    let counts = async {
        let rejected = state
            .storage
            .count_rejected_since(submitter_id, now - window)
            .await?;
        let listed = state.storage.is_blacklisted(submitter_id).await?;
        Ok::<_, muraciet_db::DbError>((rejected, listed))
    };
    let (rejected, listed) = match counts.await {
        Ok(counts) => counts,
        Err(error) => {
            tracing::warn!(submitter_id, error = %error, "Auto-blacklist check failed");
            return;
        }
    };

    let Some(reason) =
        state
            .policy
            .auto_blacklist_reason(state.config.is_admin(submitter_id), rejected, listed)
    else {
        return;
    };

    match state
        .storage
        .add_to_blacklist(submitter_id, Some(&reason), now)
        .await
    {
        Ok(true) => {
            tracing::warn!(submitter_id, rejected, "Submitter auto-blacklisted");
            if let Err(error) = state
                .api
                .send_message(submitter_id, texts::AUTO_BLACKLIST_NOTICE, None)
                .await
            {
                tracing::warn!(submitter_id, error = %error, "Failed to send blacklist notice");
            }
        }
        Ok(false) => {}
        Err(error) => {
            tracing::warn!(submitter_id, error = %error, "Auto-blacklist insert failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_payload_round_trip() {
        assert_eq!(parse_start_payload("reply_42"), Some((ActionKind::Reply, 42)));
        assert_eq!(parse_start_payload("reject_7"), Some((ActionKind::Reject, 7)));
        assert_eq!(
            parse_start_payload("edit_123"),
            Some((ActionKind::EditReply, 123))
        );
    }

    #[test]
    fn junk_payloads_are_rejected() {
        assert_eq!(parse_start_payload(""), None);
        assert_eq!(parse_start_payload("reply"), None);
        assert_eq!(parse_start_payload("reply_"), None);
        assert_eq!(parse_start_payload("reply_abc"), None);
        assert_eq!(parse_start_payload("approve_5"), None);
    }

    #[test]
    fn deep_link_encodes_action_and_id() {
        assert_eq!(
            deep_link("muraciet_bot", ActionKind::Reply, 42),
            "https://t.me/muraciet_bot?start=reply_42"
        );
        assert_eq!(
            deep_link("muraciet_bot", ActionKind::EditReply, 7),
            "https://t.me/muraciet_bot?start=edit_7"
        );
    }
}
