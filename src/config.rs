use std::{env, path::PathBuf, time::Duration};

use anyhow::Context;

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_YOOKASSA_API_URL: &str = "https://api.yookassa.ru/v3";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub telegram: TelegramConfig,
    pub yookassa: YooKassaConfig,
    pub required_chat_ids: Vec<String>,
    pub export_path: PathBuf,
    pub jwt_secret: String,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub api_url: String,
    pub webhook_secret: String,
    /// Public base URL; when present the webhook is registered on startup.
    pub base_webhook_url: Option<String>,
    pub webhook_path: String,
}

impl TelegramConfig {
    pub fn webhook_url(&self) -> Option<String> {
        self.base_webhook_url
            .as_ref()
            .map(|base| format!("{}{}", base.trim_end_matches('/'), self.webhook_path))
    }
}

#[derive(Debug, Clone)]
pub struct YooKassaConfig {
    pub shop_id: String,
    pub secret_key: String,
    pub api_url: String,
    pub return_url: String,
    pub webhook_path: String,
    pub timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);

        let telegram = TelegramConfig {
            bot_token: env::var("BOT_TOKEN").context("BOT_TOKEN is not set")?,
            api_url: env::var("TELEGRAM_API_URL")
                .unwrap_or_else(|_| DEFAULT_TELEGRAM_API_URL.to_string()),
            webhook_secret: env::var("WEBHOOK_SECRET").context("WEBHOOK_SECRET is not set")?,
            base_webhook_url: env::var("BASE_WEBHOOK_URL").ok().filter(|v| !v.is_empty()),
            webhook_path: env::var("WEBHOOK_PATH")
                .unwrap_or_else(|_| "/telegram/webhook".to_string()),
        };

        let timeout_secs = env::var("PAYMENT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(15);
        let yookassa = YooKassaConfig {
            shop_id: env::var("YOOKASSA_SHOP_ID").context("YOOKASSA_SHOP_ID is not set")?,
            secret_key: env::var("YOOKASSA_SECRET_KEY")
                .context("YOOKASSA_SECRET_KEY is not set")?,
            api_url: env::var("YOOKASSA_API_URL")
                .unwrap_or_else(|_| DEFAULT_YOOKASSA_API_URL.to_string()),
            return_url: env::var("YOOKASSA_RETURN_URL")
                .unwrap_or_else(|_| "https://t.me/".to_string()),
            webhook_path: env::var("YOOKASSA_WEBHOOK_PATH")
                .unwrap_or_else(|_| "/yookassa_payment_webhook".to_string()),
            timeout: Duration::from_secs(timeout_secs),
        };

        let required_chat_ids = parse_chat_ids(&env::var("REQUIRED_CHAT_IDS").unwrap_or_default());
        let export_path = env::var("EXPORT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("media/orders_export.jsonl"));
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;

        Ok(Self {
            database_url,
            host,
            port,
            telegram,
            yookassa,
            required_chat_ids,
            export_path,
            jwt_secret,
        })
    }
}

fn parse_chat_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
