//! Inbound events and outbound messages exchanged with the messaging transport.
//!
//! Transport-agnostic: the Telegram adapter maps Bot API updates into `InboundEvent`
//! and renders `OutboundMessage` keyboards as inline keyboards.

use crate::domain::actions::Action;
use crate::domain::entities::UserRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Text(String),
    /// Inline button press. `callback_id` must be acknowledged by the transport.
    Button {
        callback_id: Option<String>,
        data: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub user: UserRef,
    pub chat_id: i64,
    pub kind: EventKind,
}

impl InboundEvent {
    pub fn text(user: UserRef, chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            user,
            chat_id,
            kind: EventKind::Text(text.into()),
        }
    }

    pub fn button(user: UserRef, chat_id: i64, data: impl Into<String>) -> Self {
        Self {
            user,
            chat_id,
            kind: EventKind::Button {
                callback_id: None,
                data: data.into(),
            },
        }
    }

    pub fn callback_id(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Button { callback_id, .. } => callback_id.as_deref(),
            EventKind::Text(_) => None,
        }
    }

    /// Command name without the slash and bot suffix: `/start@shop_bot x` -> `start`.
    pub fn command(&self) -> Option<&str> {
        let EventKind::Text(text) = &self.kind else {
            return None;
        };
        let word = text.split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        Some(name.split('@').next().unwrap_or(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, action: &Action) -> Self {
        Self {
            label: label.into(),
            data: action.to_string(),
        }
    }
}

/// Inline keyboard: rows of buttons.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// One button per row.
    pub fn column(buttons: impl IntoIterator<Item = Button>) -> Self {
        Self {
            rows: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }

    pub fn row(mut self, buttons: Vec<Button>) -> Self {
        self.rows.push(buttons);
        self
    }

    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.buttons().map(|b| b.label.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub chat_id: i64,
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl OutboundMessage {
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}
