//! Map Bot API payloads to domain types and back.
//!
//! Only the fields the storefront uses are deserialized; everything else in an
//! update is ignored.

use crate::domain::{EventKind, InboundEvent, Keyboard, UserRef};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TgMessage>,
    #[serde(default)]
    pub callback_query: Option<TgCallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgMessage {
    pub chat: TgChat,
    #[serde(default)]
    pub from: Option<TgUser>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgChat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgCallbackQuery {
    pub id: String,
    pub from: TgUser,
    #[serde(default)]
    pub message: Option<TgMessage>,
    #[serde(default)]
    pub data: Option<String>,
}

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Option<ResponseParameters>,
}

/// Set on 429 responses: how long to back off before retrying.
#[derive(Debug, Deserialize)]
pub struct ResponseParameters {
    #[serde(default)]
    pub retry_after: Option<u64>,
}

impl From<&TgUser> for UserRef {
    fn from(u: &TgUser) -> Self {
        UserRef {
            id: u.id,
            username: u.username.clone(),
        }
    }
}

/// Map an update to an inbound event.
///
/// * Text message from a user -> `EventKind::Text` (messages from bots and non-text
///   messages are skipped).
/// * Callback query with data -> `EventKind::Button`, addressed to the chat the button
///   was attached to, or the user's private chat when the message is unavailable.
pub fn update_to_event(update: &Update) -> Option<InboundEvent> {
    if let Some(msg) = &update.message {
        let from = msg.from.as_ref().filter(|u| !u.is_bot)?;
        let text = msg.text.as_ref()?;
        return Some(InboundEvent {
            user: from.into(),
            chat_id: msg.chat.id,
            kind: EventKind::Text(text.clone()),
        });
    }
    if let Some(query) = &update.callback_query {
        let data = query.data.as_ref()?;
        let chat_id = query
            .message
            .as_ref()
            .map(|m| m.chat.id)
            .unwrap_or(query.from.id);
        return Some(InboundEvent {
            user: (&query.from).into(),
            chat_id,
            kind: EventKind::Button {
                callback_id: Some(query.id.clone()),
                data: data.clone(),
            },
        });
    }
    None
}

/// Callback query id of an update that will not become an event (e.g. no data),
/// so the adapter can still acknowledge it.
pub fn orphan_callback_id(update: &Update) -> Option<&str> {
    let query = update.callback_query.as_ref()?;
    query.data.is_none().then_some(query.id.as_str())
}

/// Render a keyboard as a Bot API `InlineKeyboardMarkup`.
pub fn keyboard_to_markup(keyboard: &Keyboard) -> Value {
    let rows: Vec<Vec<Value>> = keyboard
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|b| json!({ "text": b.label, "callback_data": b.data }))
                .collect()
        })
        .collect();
    json!({ "inline_keyboard": rows })
}
