use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
    sea_query::{Alias, Expr, OnConflict},
};
use uuid::Uuid;

use crate::{
    entity::{
        cart_items::{self, ActiveModel as CartActive, Column as CartCol, Entity as CartItems},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
};

/// One cart entry joined with the product's current name and price.
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

pub(crate) fn lines_query(user_id: i64) -> Select<CartItems> {
    CartItems::find()
        .select_only()
        .column_as(CartCol::ProductId, "product_id")
        .column_as(CartCol::Quantity, "quantity")
        .column_as(ProdCol::Name, "name")
        .column_as(ProdCol::Price, "price")
        .join(JoinType::InnerJoin, cart_items::Relation::Products.def())
        .filter(CartCol::UserId.eq(user_id))
        .order_by_asc(ProdCol::Name)
}

/// Upper bound for one cart entry, including merged adds.
pub const MAX_QUANTITY: i32 = 1000;

fn quantity_limit_error() -> AppError {
    AppError::Validation(format!(
        "quantity must not exceed {MAX_QUANTITY} per product"
    ))
}

/// Adds `quantity` units, incrementing an existing entry instead of overwriting it.
pub async fn add<C>(db: &C, user_id: i64, product_id: Uuid, quantity: i32) -> AppResult<()>
where
    C: ConnectionTrait,
{
    if quantity < 1 {
        return Err(AppError::Validation(
            "quantity must be greater than 0".to_string(),
        ));
    }
    if quantity > MAX_QUANTITY {
        return Err(quantity_limit_error());
    }

    let product_exists = Products::find_by_id(product_id).count(db).await? > 0;
    if !product_exists {
        return Err(AppError::NotFound);
    }

    let entry = CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        created_at: Set(Utc::now().into()),
    };

    let merged = Expr::col((CartItems, CartCol::Quantity))
        .add(Expr::col((Alias::new("excluded"), CartCol::Quantity)));

    // Single statement, so concurrent adds for the same pair cannot lose an update.
    // The conflict update is skipped when the merged quantity would pass the cap.
    let written = CartItems::insert(entry)
        .on_conflict(
            OnConflict::columns([CartCol::UserId, CartCol::ProductId])
                .value(CartCol::Quantity, merged.clone())
                .action_and_where(Expr::expr(merged).lte(MAX_QUANTITY))
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    if written == 0 {
        return Err(quantity_limit_error());
    }

    tracing::debug!(user_id, %product_id, quantity, "cart entry added");
    Ok(())
}

/// Returns whether an entry was actually removed.
pub async fn remove<C>(db: &C, user_id: i64, product_id: Uuid) -> AppResult<bool>
where
    C: ConnectionTrait,
{
    let result = CartItems::delete_many()
        .filter(CartCol::UserId.eq(user_id))
        .filter(CartCol::ProductId.eq(product_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Removes the given products only, leaving anything else in the cart.
pub async fn remove_products<C>(db: &C, user_id: i64, product_ids: &[Uuid]) -> AppResult<u64>
where
    C: ConnectionTrait,
{
    if product_ids.is_empty() {
        return Ok(0);
    }
    let result = CartItems::delete_many()
        .filter(CartCol::UserId.eq(user_id))
        .filter(CartCol::ProductId.is_in(product_ids.iter().copied()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

pub async fn clear<C>(db: &C, user_id: i64) -> AppResult<u64>
where
    C: ConnectionTrait,
{
    let result = CartItems::delete_many()
        .filter(CartCol::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Entries ordered by product name.
pub async fn list<C>(db: &C, user_id: i64) -> AppResult<Vec<CartLine>>
where
    C: ConnectionTrait,
{
    let lines = lines_query(user_id)
        .into_model::<CartLine>()
        .all(db)
        .await?;
    Ok(lines)
}

pub fn total(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::line_total).sum()
}

/// Display-only total at current prices.
pub async fn cart_total<C>(db: &C, user_id: i64) -> AppResult<Decimal>
where
    C: ConnectionTrait,
{
    Ok(total(&list(db, user_id).await?))
}
