#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use storefront_bot::{
    config::{AppConfig, TelegramConfig, YooKassaConfig},
    db::{create_orm_conn, run_migrations},
    entity::{
        categories::ActiveModel as CategoryActive,
        products::{ActiveModel as ProductActive, Model as Product},
        subcategories::ActiveModel as SubcategoryActive,
        users::ActiveModel as UserActive,
    },
    error::AppResult,
    payments::{PaymentGateway, PaymentGatewayError, PaymentIntent, PaymentRequest},
    services::export_service::OrderExporter,
    state::AppState,
    telegram::{
        ChatMemberStatus, ChatTransport, InlineKeyboardMarkup, InlineQueryResult, Message,
        Notifier, TransportError, types::Chat,
    },
};
use uuid::Uuid;

pub const WEBHOOK_SECRET: &str = "test-webhook-secret";
pub const JWT_SECRET: &str = "test-jwt-secret";

pub async fn setup_db() -> anyhow::Result<DatabaseConnection> {
    let orm = create_orm_conn("sqlite::memory:").await?;
    run_migrations(&orm).await?;
    Ok(orm)
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        telegram: TelegramConfig {
            bot_token: "123:TEST".into(),
            api_url: "http://127.0.0.1:9".into(),
            webhook_secret: WEBHOOK_SECRET.into(),
            base_webhook_url: None,
            webhook_path: "/telegram/webhook".into(),
        },
        yookassa: YooKassaConfig {
            shop_id: "shop".into(),
            secret_key: "secret".into(),
            api_url: "http://127.0.0.1:9".into(),
            return_url: "https://t.me/test_bot".into(),
            webhook_path: "/yookassa_payment_webhook".into(),
            timeout: Duration::from_secs(5),
        },
        required_chat_ids: Vec::new(),
        export_path: PathBuf::from("target/test-export.jsonl"),
        jwt_secret: JWT_SECRET.into(),
    }
}

pub struct Harness {
    pub state: AppState,
    pub transport: Arc<FakeTransport>,
    pub gateway: Arc<FakeGateway>,
    pub exporter: Arc<RecordingExporter>,
}

pub async fn harness() -> anyhow::Result<Harness> {
    harness_with(test_config(), FakeGateway::default(), FakeTransport::default()).await
}

pub async fn harness_with(
    config: AppConfig,
    gateway: FakeGateway,
    transport: FakeTransport,
) -> anyhow::Result<Harness> {
    let orm = setup_db().await?;
    let transport = Arc::new(transport);
    let gateway = Arc::new(gateway);
    let exporter = Arc::new(RecordingExporter::default());
    let state = AppState::new(
        orm,
        config,
        transport.clone(),
        gateway.clone(),
        exporter.clone(),
    );
    Ok(Harness {
        state,
        transport,
        gateway,
        exporter,
    })
}

/// Payment provider double: hands out sequential payment ids.
#[derive(Default)]
pub struct FakeGateway {
    pub fail: bool,
    pub requests: Mutex<Vec<PaymentRequest>>,
    counter: AtomicUsize,
}

impl FakeGateway {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<PaymentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_intent(
        &self,
        request: PaymentRequest,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        self.requests.lock().unwrap().push(request);
        if self.fail {
            return Err(PaymentGatewayError::Rejected {
                status: 500,
                body: "provider down".into(),
            });
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(PaymentIntent {
            id: format!("pay-{n}"),
            confirmation_url: format!("https://pay.example/confirm/{n}"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub chat_id: i64,
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallbackAnswer {
    pub id: String,
    pub text: Option<String>,
    pub show_alert: bool,
}

/// Records everything the bot says.
pub struct FakeTransport {
    pub member_status: ChatMemberStatus,
    pub fail_sends: bool,
    pub fail_edits: bool,
    pub sent: Mutex<Vec<Sent>>,
    pub edited: Mutex<Vec<Sent>>,
    pub photos: Mutex<Vec<(i64, String)>>,
    pub notifications: Mutex<Vec<(i64, String)>>,
    pub callbacks: Mutex<Vec<CallbackAnswer>>,
    pub inline_answers: Mutex<Vec<(String, Vec<InlineQueryResult>)>>,
    pub next_message_id: AtomicUsize,
}

impl Default for FakeTransport {
    fn default() -> Self {
        Self {
            member_status: ChatMemberStatus::Member,
            fail_sends: false,
            fail_edits: false,
            sent: Mutex::default(),
            edited: Mutex::default(),
            photos: Mutex::default(),
            notifications: Mutex::default(),
            callbacks: Mutex::default(),
            inline_answers: Mutex::default(),
            next_message_id: AtomicUsize::new(100),
        }
    }
}

impl FakeTransport {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn edited(&self) -> Vec<Sent> {
        self.edited.lock().unwrap().clone()
    }

    /// Sent and edited texts in one list.
    pub fn shown_texts(&self) -> Vec<String> {
        let mut texts: Vec<String> = self.sent().into_iter().map(|m| m.text).collect();
        texts.extend(self.edited().into_iter().map(|m| m.text));
        texts
    }

    pub fn notifications(&self) -> Vec<(i64, String)> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn callbacks(&self) -> Vec<CallbackAnswer> {
        self.callbacks.lock().unwrap().clone()
    }

    fn message(&self, chat_id: i64, text: &str) -> Message {
        Message {
            message_id: self.next_message_id.fetch_add(1, Ordering::SeqCst) as i64,
            from: None,
            chat: Chat {
                id: chat_id,
                kind: "private".into(),
            },
            text: Some(text.to_string()),
        }
    }

    fn refused() -> TransportError {
        TransportError::Api {
            code: Some(403),
            description: "Forbidden: bot was blocked by the user".into(),
        }
    }
}

#[async_trait]
impl Notifier for FakeTransport {
    async fn notify(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        if self.fail_sends {
            return Err(Self::refused());
        }
        self.notifications
            .lock()
            .unwrap()
            .push((chat_id, text.to_string()));
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message, TransportError> {
        if self.fail_sends {
            return Err(Self::refused());
        }
        self.sent.lock().unwrap().push(Sent {
            chat_id,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(self.message(chat_id, text))
    }

    async fn edit_message_text(
        &self,
        chat_id: i64,
        _message_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), TransportError> {
        if self.fail_edits {
            return Err(TransportError::Api {
                code: Some(400),
                description: "Bad Request: message can't be edited".into(),
            });
        }
        self.edited.lock().unwrap().push(Sent {
            chat_id,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }

    async fn delete_message(&self, _chat_id: i64, _message_id: i64) -> Result<(), TransportError> {
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo: &str,
        caption: &str,
        _keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message, TransportError> {
        if self.fail_sends {
            return Err(Self::refused());
        }
        self.photos
            .lock()
            .unwrap()
            .push((chat_id, photo.to_string()));
        Ok(self.message(chat_id, caption))
    }

    async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), TransportError> {
        self.callbacks.lock().unwrap().push(CallbackAnswer {
            id: callback_query_id.to_string(),
            text: text.map(str::to_string),
            show_alert,
        });
        Ok(())
    }

    async fn answer_inline_query(
        &self,
        inline_query_id: &str,
        results: &[InlineQueryResult],
    ) -> Result<(), TransportError> {
        self.inline_answers
            .lock()
            .unwrap()
            .push((inline_query_id.to_string(), results.to_vec()));
        Ok(())
    }

    async fn get_chat_member_status(
        &self,
        _chat_id: &str,
        _user_id: i64,
    ) -> Result<ChatMemberStatus, TransportError> {
        Ok(self.member_status)
    }
}

#[derive(Default)]
pub struct RecordingExporter {
    pub exported: Mutex<Vec<Uuid>>,
}

impl RecordingExporter {
    pub fn exported(&self) -> Vec<Uuid> {
        self.exported.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderExporter for RecordingExporter {
    async fn export_paid(&self, _db: &DatabaseConnection, order_id: Uuid) -> AppResult<()> {
        self.exported.lock().unwrap().push(order_id);
        Ok(())
    }
}

pub async fn seed_user(db: &DatabaseConnection, id: i64, first_name: &str) -> anyhow::Result<()> {
    UserActive {
        id: Set(id),
        first_name: Set(Some(first_name.to_string())),
        last_name: Set(None),
        username: Set(None),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;
    Ok(())
}

/// Inserts a product under a fresh category and subcategory.
pub async fn seed_product(
    db: &DatabaseConnection,
    name: &str,
    price: Decimal,
) -> anyhow::Result<Product> {
    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(format!("{name} category")),
        position: Set(0),
    }
    .insert(db)
    .await?;

    let subcategory = SubcategoryActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(category.id),
        name: Set(format!("{name} subcategory")),
        position: Set(0),
    }
    .insert(db)
    .await?;

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        subcategory_id: Set(subcategory.id),
        name: Set(name.to_string()),
        description: Set(Some(format!("About {name}"))),
        price: Set(price),
        image_url: Set(None),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;
    Ok(product)
}
