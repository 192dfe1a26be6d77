//! Telegram Bot API plumbing: wire types, the HTTP client and the
//! capability traits the rest of the crate depends on.

use async_trait::async_trait;
use thiserror::Error;

pub mod client;
pub mod types;

pub use client::TelegramClient;
pub use types::{
    CallbackQuery, ChatMemberStatus, InlineKeyboardButton, InlineKeyboardMarkup, InlineQuery,
    InlineQueryResult, Message, Update, User,
};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("telegram request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("telegram api error {code:?}: {description}")]
    Api {
        code: Option<i32>,
        description: String,
    },
}

/// Outbound user notification. The webhook reconciler only needs this.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, chat_id: i64, text: &str) -> Result<(), TransportError>;
}

/// Full chat surface used by the conversational handlers.
#[async_trait]
pub trait ChatTransport: Notifier {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message, TransportError>;

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), TransportError>;

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), TransportError>;

    async fn send_photo(
        &self,
        chat_id: i64,
        photo: &str,
        caption: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message, TransportError>;

    async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), TransportError>;

    async fn answer_inline_query(
        &self,
        inline_query_id: &str,
        results: &[InlineQueryResult],
    ) -> Result<(), TransportError>;

    async fn get_chat_member_status(
        &self,
        chat_id: &str,
        user_id: i64,
    ) -> Result<ChatMemberStatus, TransportError>;
}

/// Escapes text for messages sent with `parse_mode=HTML`.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_html;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html("<b>Tom & \"Jerry\"</b>"),
            "&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;"
        );
        assert_eq!(escape_html("Main st. 5"), "Main st. 5");
    }
}
