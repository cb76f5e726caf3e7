//! Minimal Bot API client over [`reqwest`].
//!
//! One async method per endpoint, JSON bodies built with `serde_json::json!`,
//! every response decoded through the [`ApiResponse`] envelope. The HTTP
//! timeout is sized above the long-poll window so `getUpdates` is never cut
//! off by our own client.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::TelegramError;
use crate::types::{ApiResponse, InlineKeyboardMarkup, Message, Update, User};

/// Long-poll window passed to `getUpdates`, in seconds.
pub const POLL_TIMEOUT_SECS: u64 = 30;

/// HTTP timeout; must exceed [`POLL_TIMEOUT_SECS`].
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

pub struct BotApi {
    client: reqwest::Client,
    base_url: String,
}

impl BotApi {
    /// Create a client for the bot identified by `token`.
    ///
    /// Panics only if the TLS backend cannot be initialized, which is a
    /// startup-time fatal.
    pub fn new(token: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: format!("https://api.telegram.org/bot{token}"),
        }
    }

    /// Validate the token and fetch the bot's own identity.
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Drop any backlog accumulated while the process was down.
    pub async fn drop_pending_updates(&self) -> Result<(), TelegramError> {
        let _: bool = self
            .call(
                "deleteWebhook",
                &serde_json::json!({ "drop_pending_updates": true }),
            )
            .await?;
        Ok(())
    }

    /// Long-poll for updates at or after `offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            &serde_json::json!({
                "offset": offset,
                "timeout": POLL_TIMEOUT_SECS,
                "allowed_updates": ["message", "callback_query", "channel_post"],
            }),
        )
        .await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message, TelegramError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(markup) = reply_markup {
            body["reply_markup"] = serde_json::to_value(markup).expect("keyboard serializes");
        }
        self.call("sendMessage", &body).await
    }

    /// Send a photo by its transport file id with a caption.
    pub async fn send_photo(
        &self,
        chat_id: i64,
        file_id: &str,
        caption: &str,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message, TelegramError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "photo": file_id,
            "caption": caption,
        });
        if let Some(markup) = reply_markup {
            body["reply_markup"] = serde_json::to_value(markup).expect("keyboard serializes");
        }
        self.call("sendPhoto", &body).await
    }

    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), TelegramError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
        });
        if let Some(markup) = reply_markup {
            body["reply_markup"] = serde_json::to_value(markup).expect("keyboard serializes");
        }
        let _: serde_json::Value = self.call("editMessageText", &body).await?;
        Ok(())
    }

    pub async fn edit_message_caption(
        &self,
        chat_id: i64,
        message_id: i64,
        caption: &str,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), TelegramError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "caption": caption,
        });
        if let Some(markup) = reply_markup {
            body["reply_markup"] = serde_json::to_value(markup).expect("keyboard serializes");
        }
        let _: serde_json::Value = self.call("editMessageCaption", &body).await?;
        Ok(())
    }

    /// Replace (or with `None`-like empty markup, remove) the inline
    /// keyboard of a sent message.
    pub async fn edit_message_reply_markup(
        &self,
        chat_id: i64,
        message_id: i64,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), TelegramError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
        });
        if let Some(markup) = reply_markup {
            body["reply_markup"] = serde_json::to_value(markup).expect("keyboard serializes");
        }
        let _: serde_json::Value = self.call("editMessageReplyMarkup", &body).await?;
        Ok(())
    }

    /// Answer a callback query, optionally with an alert or a deep-link
    /// redirect to a private chat with the bot.
    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
        show_alert: bool,
        url: Option<&str>,
    ) -> Result<(), TelegramError> {
        let mut body = serde_json::json!({
            "callback_query_id": callback_query_id,
            "show_alert": show_alert,
        });
        if let Some(text) = text {
            body["text"] = serde_json::Value::from(text);
        }
        if let Some(url) = url {
            body["url"] = serde_json::Value::from(url);
        }
        let _: bool = self.call("answerCallbackQuery", &body).await?;
        Ok(())
    }

    /// Upload a document from memory (multipart).
    pub async fn send_document(
        &self,
        chat_id: i64,
        filename: &str,
        bytes: Vec<u8>,
        caption: &str,
    ) -> Result<Message, TelegramError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("document", part);
        let response = self
            .client
            .post(format!("{}/sendDocument", self.base_url))
            .multipart(form)
            .send()
            .await?;
        Self::decode(response.json().await?)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, TelegramError> {
        let response = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .json(body)
            .send()
            .await?;
        Self::decode(response.json().await?)
    }

    fn decode<T>(envelope: ApiResponse<T>) -> Result<T, TelegramError> {
        if envelope.ok {
            envelope.result.ok_or(TelegramError::EmptyResult)
        } else {
            Err(TelegramError::Api {
                code: envelope.error_code.unwrap_or(0),
                description: envelope
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
                parameters: envelope.parameters,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_unwraps_successful_envelope() {
        let envelope = ApiResponse {
            ok: true,
            result: Some(5i64),
            description: None,
            error_code: None,
            parameters: None,
        };
        assert_eq!(BotApi::decode(envelope).unwrap(), 5);
    }

    #[test]
    fn decode_surfaces_api_error_with_migration_id() {
        let envelope: ApiResponse<i64> = serde_json::from_str(
            r#"{
                "ok": false,
                "error_code": 400,
                "description": "group chat was upgraded to a supergroup chat",
                "parameters": {"migrate_to_chat_id": -100777}
            }"#,
        )
        .unwrap();
        let error = BotApi::decode(envelope).unwrap_err();
        assert_eq!(error.migrate_to_chat_id(), Some(-100777));
        assert!(!error.is_conflict());
    }

    #[test]
    fn conflict_is_detected_by_code() {
        let error = TelegramError::Api {
            code: 409,
            description: "terminated by other getUpdates request".to_string(),
            parameters: None,
        };
        assert!(error.is_conflict());
        assert_eq!(error.migrate_to_chat_id(), None);
    }
}
