use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        mailings::CreateMailingRequest,
        orders::{OrderList, OrderWithItems},
    },
    entity::{mailings::MailingStatus, orders::PaymentStatus},
    models::{Mailing, Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::{admin, health, params, payments, telegram},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        telegram::telegram_webhook,
        payments::payment_webhook,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::create_mailing,
        admin::start_mailing
    ),
    components(
        schemas(
            Order,
            OrderItem,
            Mailing,
            PaymentStatus,
            MailingStatus,
            OrderList,
            OrderWithItems,
            CreateMailingRequest,
            payments::WebhookAck,
            params::Pagination,
            params::OrderListQuery,
            Meta,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<Mailing>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Webhooks", description = "Telegram and payment provider callbacks"),
        (name = "Admin", description = "Operator endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
