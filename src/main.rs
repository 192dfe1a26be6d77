use axum::http::{HeaderName, Request, Response};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use std::{net::SocketAddr, sync::Arc, time::Duration};

use storefront_bot::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    payments::yookassa::YooKassaClient,
    routes::create_router,
    services::export_service::JsonlOrderExporter,
    state::AppState,
    telegram::TelegramClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,storefront_bot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let telegram = Arc::new(TelegramClient::new(&config.telegram)?);
    let payments = Arc::new(YooKassaClient::new(config.yookassa.clone())?);
    let exporter = Arc::new(JsonlOrderExporter::new(config.export_path.clone()));

    let webhook_url = config.telegram.webhook_url();
    let webhook_secret = config.telegram.webhook_secret.clone();
    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));

    let router = create_router(&config);
    let state = AppState::new(orm, config, telegram.clone(), payments, exporter);

    match &webhook_url {
        Some(url) => {
            telegram.set_webhook(url, &webhook_secret).await?;
            tracing::info!(%url, "telegram webhook registered");
        }
        None => tracing::warn!("BASE_WEBHOOK_URL is not set; telegram webhook not registered"),
    }

    let concurrency_limit_layer = ConcurrencyLimitLayer::new(100);

    let request_id_header = HeaderName::from_static("x-request-id");
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id
            )
        })
        .on_request(|request: &Request<_>, _span: &tracing::Span| {
            tracing::debug!(
                method = %request.method(),
                uri = %request.uri(),
                "request started"
            );
        })
        .on_response(|response: &Response<_>, latency: Duration, _span: &tracing::Span| {
            tracing::info!(
                status = %response.status(),
                ms = %latency.as_millis(),
                "request finished"
            );
        });

    let app = router
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .layer(concurrency_limit_layer)
        .with_state(state);

    tracing::info!("listening on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if webhook_url.is_some() {
        if let Err(err) = telegram.delete_webhook().await {
            tracing::warn!(error = %err, "failed to remove telegram webhook");
        }
    }
    tracing::info!("shut down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
