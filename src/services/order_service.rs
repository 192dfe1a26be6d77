use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::{Expr, LockType},
};
use uuid::Uuid;

use crate::{
    dto::orders::{OrderList, OrderWithItems},
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
            PaymentStatus,
        },
    },
    error::{AppError, AppResult},
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::cart_service::{self, CartLine},
};

/// Turns the user's cart into a pending order with price snapshots.
///
/// Cart rows and current prices are read inside the same transaction that
/// writes the order, so the stored total always equals the sum of its items.
/// Returns `None` (and writes nothing) when the cart is empty. The cart itself
/// is left untouched.
pub async fn materialize_from_cart(
    db: &DatabaseConnection,
    user_id: i64,
    delivery_info: &str,
) -> AppResult<Option<OrderWithItems>> {
    let txn = db.begin().await?;

    let lines = cart_service::lines_query(user_id)
        .lock(LockType::Update)
        .into_model::<CartLine>()
        .all(&txn)
        .await?;

    if lines.is_empty() {
        return Ok(None);
    }

    let total_amount = cart_service::total(&lines);
    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(Some(user_id)),
        delivery_info: Set(delivery_info.to_string()),
        total_amount: Set(total_amount),
        payment_status: Set(PaymentStatus::Pending),
        payment_id: Set(None),
        created_at: Set(Utc::now().into()),
        paid_at: Set(None),
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for line in &lines {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(Some(line.product_id)),
            price_at_purchase: Set(line.price),
            quantity: Set(line.quantity),
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(item));
    }

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        user_id,
        items = items.len(),
        total = %total_amount,
        "order created"
    );

    Ok(Some(OrderWithItems {
        order: order_from_entity(order),
        items,
    }))
}

pub async fn attach_payment_id<C>(db: &C, order_id: Uuid, payment_id: &str) -> AppResult<()>
where
    C: ConnectionTrait,
{
    let result = Orders::update_many()
        .col_expr(OrderCol::PaymentId, Expr::value(payment_id.to_string()))
        .filter(OrderCol::Id.eq(order_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub async fn get_with_items<C>(db: &C, order_id: Uuid) -> AppResult<OrderWithItems>
where
    C: ConnectionTrait,
{
    let order = Orders::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(db)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(OrderWithItems {
        order: order_from_entity(order),
        items,
    })
}

pub async fn list_orders(
    db: &DatabaseConnection,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::PaymentStatus.eq(status));
    }
    if let Some(user_id) = query.user_id {
        condition = condition.add(OrderCol::UserId.eq(user_id));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(db).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(db)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_order(
    db: &DatabaseConnection,
    order_id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = get_with_items(db, order_id).await?;
    Ok(ApiResponse::success("OK", order, Some(Meta::empty())))
}

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        delivery_info: model.delivery_info,
        total_amount: model.total_amount,
        payment_status: model.payment_status,
        payment_id: model.payment_id,
        created_at: model.created_at.with_timezone(&Utc),
        paid_at: model.paid_at.map(|dt| dt.with_timezone(&Utc)),
    }
}

pub(crate) fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        price_at_purchase: model.price_at_purchase,
        quantity: model.quantity,
    }
}
