//! Serde wire types for the slice of the Bot API this service consumes.
//!
//! Only the fields we actually read are declared; unknown fields are
//! ignored by serde's defaults, so API additions do not break decoding.

use serde::{Deserialize, Serialize};

/// Envelope every Bot API method returns.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
    pub parameters: Option<ResponseParameters>,
}

/// Extra error context; `migrate_to_chat_id` is set when a group was
/// upgraded to a supergroup and messages must go to the new id.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ResponseParameters {
    pub migrate_to_chat_id: Option<i64>,
    pub retry_after: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
    pub channel_post: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub photo: Option<Vec<PhotoSize>>,
}

impl Message {
    /// Message body regardless of whether it is a text or media message.
    pub fn content(&self) -> Option<&str> {
        self.text.as_deref().or(self.caption.as_deref())
    }

    /// File id of the largest available photo size, if any.
    pub fn largest_photo(&self) -> Option<&str> {
        self.photo
            .as_deref()?
            .iter()
            .max_by_key(|p| p.width * p.height)
            .map(|p| p.file_id.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Chat {
    pub fn is_private(&self) -> bool {
        self.kind == "private"
    }

    pub fn is_group(&self) -> bool {
        self.kind == "group" || self.kind == "supergroup"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

/// Inline keyboard attached below a message.
#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    /// One button per row, the layout every keyboard in this bot uses.
    pub fn column(buttons: Vec<InlineKeyboardButton>) -> Self {
        Self {
            inline_keyboard: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }

    /// All buttons on a single row.
    pub fn row(buttons: Vec<InlineKeyboardButton>) -> Self {
        Self {
            inline_keyboard: vec![buttons],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl InlineKeyboardButton {
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: Some(data.into()),
            url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_with_callback_query_decodes() {
        let raw = r#"{
            "update_id": 10,
            "callback_query": {
                "id": "77",
                "from": {"id": 5, "is_bot": false, "first_name": "Leyla", "username": "leyla"},
                "message": {
                    "message_id": 3,
                    "chat": {"id": -100123, "type": "supergroup"},
                    "text": "🆔 Müraciət #42"
                },
                "data": "exec_reply:42"
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        let cb = update.callback_query.unwrap();
        assert_eq!(cb.data.as_deref(), Some("exec_reply:42"));
        assert!(cb.message.unwrap().chat.is_group());
    }

    #[test]
    fn channel_post_update_decodes() {
        // Channel posts arrive in their own field, not as `message`.
        let raw = r#"{
            "update_id": 11,
            "channel_post": {
                "message_id": 8,
                "chat": {"id": -100555, "type": "channel"},
                "text": "elan"
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        assert!(update.message.is_none());
        assert!(update.callback_query.is_none());
        let post = update.channel_post.unwrap();
        assert_eq!(post.chat.id, -100555);
        assert_eq!(post.content(), Some("elan"));
    }

    #[test]
    fn largest_photo_picks_by_area() {
        let raw = r#"{
            "message_id": 1,
            "chat": {"id": 9, "type": "private"},
            "caption": "şəkil",
            "photo": [
                {"file_id": "small", "width": 90, "height": 90},
                {"file_id": "big", "width": 800, "height": 600},
                {"file_id": "mid", "width": 320, "height": 240}
            ]
        }"#;
        let message: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(message.largest_photo(), Some("big"));
        assert_eq!(message.content(), Some("şəkil"));
    }

    #[test]
    fn keyboard_serializes_without_null_fields() {
        let markup = InlineKeyboardMarkup::row(vec![InlineKeyboardButton::callback(
            "✉️ Cavablandır",
            "exec_reply:42",
        )]);
        let json = serde_json::to_string(&markup).unwrap();
        assert!(json.contains("\"callback_data\":\"exec_reply:42\""));
        assert!(!json.contains("url"));
    }

    #[test]
    fn migration_parameters_decode() {
        let raw = r#"{
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: group chat was upgraded to a supergroup chat",
            "parameters": {"migrate_to_chat_id": -100999}
        }"#;
        let response: ApiResponse<serde_json::Value> = serde_json::from_str(raw).unwrap();
        assert!(!response.ok);
        assert_eq!(
            response.parameters.and_then(|p| p.migrate_to_chat_id),
            Some(-100999)
        );
    }
}
