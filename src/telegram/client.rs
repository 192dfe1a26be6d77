use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

use super::{
    ChatTransport, Notifier, TransportError,
    types::{
        ApiResponse, ChatMember, ChatMemberStatus, InlineKeyboardMarkup, InlineQueryResult,
        Message,
    },
};
use crate::config::TelegramConfig;

const PARSE_MODE: &str = "HTML";

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboardMarkup>,
}

#[derive(Serialize)]
struct EditMessageText<'a> {
    chat_id: i64,
    message_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboardMarkup>,
}

#[derive(Serialize)]
struct SendPhoto<'a> {
    chat_id: i64,
    photo: &'a str,
    caption: &'a str,
    parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboardMarkup>,
}

#[derive(Serialize)]
struct AnswerCallbackQuery<'a> {
    callback_query_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    show_alert: bool,
}

/// Bot API client over HTTPS. Cheap to clone.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(cfg: &TelegramConfig) -> Result<Self, TransportError> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self::with_client(http, &cfg.api_url, &cfg.bot_token))
    }

    pub fn with_client(http: Client, api_url: &str, bot_token: &str) -> Self {
        Self {
            http,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), bot_token),
        }
    }

    async fn call<P, R>(&self, method: &str, params: &P) -> Result<R, TransportError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, method);
        let envelope: ApiResponse<R> = self
            .http
            .post(url)
            .json(params)
            .send()
            .await?
            .json()
            .await?;

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse {
                description,
                error_code,
                ..
            } => Err(TransportError::Api {
                code: error_code,
                description: description.unwrap_or_else(|| format!("{method} failed")),
            }),
        }
    }

    pub async fn set_webhook(&self, url: &str, secret_token: &str) -> Result<(), TransportError> {
        self.call::<_, Value>(
            "setWebhook",
            &json!({
                "url": url,
                "secret_token": secret_token,
                "allowed_updates": ["message", "callback_query", "inline_query"],
            }),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_webhook(&self) -> Result<(), TransportError> {
        self.call::<_, Value>("deleteWebhook", &json!({})).await?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn notify(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        self.send_message(chat_id, text, None).await.map(|_| ())
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message, TransportError> {
        self.call(
            "sendMessage",
            &SendMessage {
                chat_id,
                text,
                parse_mode: PARSE_MODE,
                reply_markup: keyboard,
            },
        )
        .await
    }

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), TransportError> {
        self.call::<_, Value>(
            "editMessageText",
            &EditMessageText {
                chat_id,
                message_id,
                text,
                parse_mode: PARSE_MODE,
                reply_markup: keyboard,
            },
        )
        .await?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), TransportError> {
        self.call::<_, Value>(
            "deleteMessage",
            &json!({ "chat_id": chat_id, "message_id": message_id }),
        )
        .await?;
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo: &str,
        caption: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message, TransportError> {
        self.call(
            "sendPhoto",
            &SendPhoto {
                chat_id,
                photo,
                caption,
                parse_mode: PARSE_MODE,
                reply_markup: keyboard,
            },
        )
        .await
    }

    async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), TransportError> {
        self.call::<_, Value>(
            "answerCallbackQuery",
            &AnswerCallbackQuery {
                callback_query_id,
                text,
                show_alert,
            },
        )
        .await?;
        Ok(())
    }

    async fn answer_inline_query(
        &self,
        inline_query_id: &str,
        results: &[InlineQueryResult],
    ) -> Result<(), TransportError> {
        self.call::<_, Value>(
            "answerInlineQuery",
            &json!({
                "inline_query_id": inline_query_id,
                "results": results,
                "cache_time": 10,
            }),
        )
        .await?;
        Ok(())
    }

    async fn get_chat_member_status(
        &self,
        chat_id: &str,
        user_id: i64,
    ) -> Result<ChatMemberStatus, TransportError> {
        let member: ChatMember = self
            .call(
                "getChatMember",
                &json!({ "chat_id": chat_id, "user_id": user_id }),
            )
            .await?;
        Ok(member.status)
    }
}
