use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        mailings::CreateMailingRequest,
        orders::{OrderList, OrderWithItems},
    },
    error::AppResult,
    middleware::auth::AdminUser,
    models::Mailing,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::{mailing_service, order_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_all_orders))
        .route("/orders/{id}", get(get_order_admin))
        .route("/mailings", post(create_mailing))
        .route("/mailings/{id}/start", post(start_mailing))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by payment status: pending, paid, canceled"),
        ("user_id" = Option<i64>, Query, description = "Filter by Telegram user id"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
    (status = 200, description = "List orders (admin only)", body = ApiResponse<OrderList>),
    (status = 401, description = "Unauthorized"),
    (status = 403, description = "Forbidden"),
    (status = 500, description = "Internal Server Error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state.orm, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    params(
    (
        "id" = Uuid, Path, description = "Order ID")
    ),
    responses(
    (status = 200, description = "Get any order with items (admin only)", body = ApiResponse<OrderWithItems>),
    (status = 404, description = "Not Found", ),
    (status = 403, description = "Forbidden", ),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"

)]
pub async fn get_order_admin(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_order(&state.orm, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/mailings",
    request_body = CreateMailingRequest,
    responses(
        (status = 201, description = "Draft mailing created", body = ApiResponse<Mailing>),
        (status = 400, description = "Empty message text"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_mailing(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(payload): Json<CreateMailingRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Mailing>>)> {
    let resp = mailing_service::create(&state.orm, payload).await?;
    tracing::info!(admin = %admin.subject, "mailing drafted");
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/admin/mailings/{id}/start",
    params(
    (
        "id" = Uuid, Path, description = "Mailing ID")
    ),
    responses(
        (status = 202, description = "Mailing is being sent", body = ApiResponse<Mailing>),
        (status = 400, description = "Mailing is not a draft"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn start_mailing(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<ApiResponse<Mailing>>)> {
    let resp = mailing_service::start(&state.orm, state.transport.clone(), id).await?;
    tracing::info!(admin = %admin.subject, mailing_id = %id, "mailing start requested");
    Ok((StatusCode::ACCEPTED, Json(resp)))
}
