//! Citizen intake: guards, conversation driving, confirmation.
//!
//! The conversation itself lives in `muraciet_core::intake`; this module
//! maps Telegram updates onto the machine's inputs, renders its outcomes,
//! and owns the confirm/edit/cancel branch including persistence and the
//! hand-off to the executor channel.

use chrono::{Duration, Utc};

use muraciet_core::guard::RateVerdict;
use muraciet_core::intake::{
    Choice, IntakeFlow, IntakeInput, StepOutcome, CB_CANCEL, CB_CONFIRM, CB_EDIT,
};
use muraciet_core::texts;
use muraciet_telegram::{CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, Message, User};

use crate::error::BotError;
use crate::routing;
use crate::state::AppState;

/// `/start` in a private chat: run the entry guards, then open a fresh
/// intake conversation. A `/start` during an active intake discards the
/// old draft and starts over.
pub async fn start(state: &AppState, user: &User, chat_id: i64) -> Result<(), BotError> {
    if !state.config.is_admin(user.id) {
        if state.storage.is_blacklisted(user.id).await? {
            tracing::warn!(user_id = user.id, "Intake refused: blacklisted");
            state
                .api
                .send_message(chat_id, texts::BLACKLISTED_NOTICE, None)
                .await?;
            return Ok(());
        }
        let since = Utc::now() - Duration::hours(24);
        let recent = state.storage.count_since(user.id, since).await?;
        if let RateVerdict::Limited { limit } = state.policy.rate_verdict(false, recent) {
            tracing::warn!(user_id = user.id, recent, limit, "Intake refused: rate limited");
            state
                .api
                .send_message(chat_id, &texts::rate_limited(limit), None)
                .await?;
            return Ok(());
        }
    }

    state.sessions.start_intake(user.id, IntakeFlow::new()).await;
    tracing::info!(user_id = user.id, "Intake started");
    state.api.send_message(chat_id, texts::WELCOME, None).await?;
    Ok(())
}

/// A text or photo message from a submitter with an active intake session.
pub async fn on_message(
    state: &AppState,
    user: &User,
    chat_id: i64,
    message: &Message,
) -> Result<(), BotError> {
    let Some(mut flow) = state.sessions.take_intake(user.id).await else {
        return Ok(());
    };
    let input = match (message.largest_photo(), message.text.as_deref()) {
        (Some(file_id), _) => IntakeInput::Photo(file_id),
        (None, Some(text)) => IntakeInput::Text(text),
        (None, None) => IntakeInput::Text(""),
    };
    let outcome = flow.handle(input, &state.rules, Utc::now());
    state.sessions.restore_intake(user.id, flow).await;
    render(state, chat_id, &outcome).await
}

/// Inline-button press belonging to the intake dialog: either a choice
/// step or one of the confirmation actions.
pub async fn on_callback(state: &AppState, cb: &CallbackQuery, data: &str) -> Result<(), BotError> {
    let user = &cb.from;
    let Some(chat_id) = cb.message.as_ref().map(|m| m.chat.id) else {
        return Ok(());
    };
    // Stop the button spinner regardless of what happens next.
    if let Err(error) = state.api.answer_callback_query(&cb.id, None, false, None).await {
        tracing::debug!(error = %error, "Failed to answer callback query");
    }

    match data {
        CB_CANCEL => {
            state.sessions.end_intake(user.id).await;
            tracing::info!(user_id = user.id, "Intake cancelled");
            state.api.send_message(chat_id, texts::CANCELLED, None).await?;
            Ok(())
        }
        CB_EDIT => {
            let Some(mut flow) = state.sessions.take_intake(user.id).await else {
                return Ok(());
            };
            flow.begin_edit();
            state.sessions.restore_intake(user.id, flow).await;
            state.api.send_message(chat_id, texts::BODY_PROMPT, None).await?;
            Ok(())
        }
        CB_CONFIRM => confirm(state, user, chat_id).await,
        key => {
            let Some(mut flow) = state.sessions.take_intake(user.id).await else {
                return Ok(());
            };
            let outcome = flow.handle(IntakeInput::Choice(key), &state.rules, Utc::now());
            state.sessions.restore_intake(user.id, flow).await;
            render(state, chat_id, &outcome).await
        }
    }
}

/// Confirmation: persist the draft, acknowledge the citizen, then route
/// to the executor channel. Routing failure never rolls back persistence
/// and is surfaced to admins only.
async fn confirm(state: &AppState, user: &User, chat_id: i64) -> Result<(), BotError> {
    let Some(flow) = state.sessions.take_intake(user.id).await else {
        return Ok(());
    };
    if flow.step() != muraciet_core::intake::IntakeStep::Confirm {
        state.sessions.restore_intake(user.id, flow).await;
        state.api.send_message(chat_id, texts::CHOICE_HINT, None).await?;
        return Ok(());
    }

    state.api.send_message(chat_id, texts::CONFIRM_SENT, None).await?;

    let submission = flow.into_submission(user.id, user.username.clone())?;
    let record_id = match state.storage.insert_application(&submission).await {
        Ok(id) => id,
        Err(error) => {
            tracing::error!(user_id = user.id, error = %error, "Failed to persist application");
            state.api.send_message(chat_id, texts::SAVE_FAILED, None).await?;
            return Ok(());
        }
    };
    tracing::info!(record_id, user_id = user.id, "Application persisted");
    state.api.send_message(chat_id, texts::SUCCESS, None).await?;

    if let Err(error) = routing::deliver_application(state, record_id, &submission, Utc::now()).await
    {
        tracing::error!(record_id, error = %error, "Failed to deliver application to executors");
        routing::notify_admins(
            state,
            &format!("⚠️ Müraciət #{record_id} icraçı kanalına çatdırıla bilmədi."),
        )
        .await;
    }
    Ok(())
}

async fn render(state: &AppState, chat_id: i64, outcome: &StepOutcome) -> Result<(), BotError> {
    match outcome {
        StepOutcome::Next(prompt) => {
            let keyboard = (!prompt.choices.is_empty()).then(|| choice_keyboard(prompt.choices));
            state
                .api
                .send_message(chat_id, &prompt.text, keyboard.as_ref())
                .await?;
        }
        StepOutcome::Invalid(error) => {
            state.api.send_message(chat_id, error, None).await?;
        }
    }
    Ok(())
}

fn choice_keyboard(choices: &[Choice]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::column(
        choices
            .iter()
            .map(|c| InlineKeyboardButton::callback(c.label, c.key))
            .collect(),
    )
}
