use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    config::AppConfig,
    conversation::ConversationStore,
    payments::PaymentGateway,
    services::{
        checkout_service::CheckoutService, export_service::OrderExporter,
        webhook_service::WebhookReconciler,
    },
    telegram::ChatTransport,
};

/// Shared handles injected into the bot dispatcher and the HTTP routes.
#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub transport: Arc<dyn ChatTransport>,
    pub conversations: Arc<ConversationStore>,
    pub checkout: CheckoutService,
    pub reconciler: WebhookReconciler,
}

impl AppState {
    pub fn new<T>(
        orm: DatabaseConnection,
        config: AppConfig,
        transport: Arc<T>,
        payments: Arc<dyn PaymentGateway>,
        exporter: Arc<dyn OrderExporter>,
    ) -> Self
    where
        T: ChatTransport + 'static,
    {
        let conversations = Arc::new(ConversationStore::new());
        let checkout = CheckoutService::new(orm.clone(), conversations.clone(), payments);
        let reconciler = WebhookReconciler::new(orm.clone(), transport.clone(), exporter);

        Self {
            orm,
            config: Arc::new(config),
            transport,
            conversations,
            checkout,
            reconciler,
        }
    }
}
