use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use uuid::Uuid;

use crate::{
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{Entity as Orders, PaymentStatus},
        products::Entity as Products,
        users::Entity as Users,
    },
    error::{AppError, AppResult},
};

const DELETED_PRODUCT: &str = "Deleted product";

/// Reporting sink for paid orders.
#[async_trait]
pub trait OrderExporter: Send + Sync {
    async fn export_paid(&self, db: &DatabaseConnection, order_id: Uuid) -> AppResult<()>;
}

#[derive(Debug, Serialize)]
pub struct ExportLine {
    pub product: String,
    pub quantity: i32,
    pub price_at_purchase: Decimal,
}

#[derive(Debug, Serialize)]
pub struct OrderExportRecord {
    pub order_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub user_id: Option<i64>,
    pub first_name: Option<String>,
    pub username: Option<String>,
    pub delivery_info: String,
    pub items: Vec<ExportLine>,
    pub total_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_id: Option<String>,
}

/// Appends one JSON object per line to a file.
pub struct JsonlOrderExporter {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlOrderExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn append(&self, record: &OrderExportRecord) -> AppResult<()> {
        let mut line = serde_json::to_vec(record).map_err(anyhow::Error::from)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(anyhow::Error::from)?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(anyhow::Error::from)?;
        file.write_all(&line).await.map_err(anyhow::Error::from)?;
        file.flush().await.map_err(anyhow::Error::from)?;
        Ok(())
    }
}

pub async fn build_record(db: &DatabaseConnection, order_id: Uuid) -> AppResult<OrderExportRecord> {
    let order = Orders::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound)?;

    let user = match order.user_id {
        Some(user_id) => Users::find_by_id(user_id).one(db).await?,
        None => None,
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .find_also_related(Products)
        .all(db)
        .await?
        .into_iter()
        .map(|(item, product)| ExportLine {
            product: product
                .map(|p| p.name)
                .unwrap_or_else(|| DELETED_PRODUCT.to_string()),
            quantity: item.quantity,
            price_at_purchase: item.price_at_purchase,
        })
        .collect();

    Ok(OrderExportRecord {
        order_id: order.id,
        created_at: order.created_at.with_timezone(&Utc),
        paid_at: order.paid_at.map(|dt| dt.with_timezone(&Utc)),
        user_id: order.user_id,
        first_name: user.as_ref().and_then(|u| u.first_name.clone()),
        username: user.as_ref().and_then(|u| u.username.clone()),
        delivery_info: order.delivery_info,
        items,
        total_amount: order.total_amount,
        payment_status: order.payment_status,
        payment_id: order.payment_id,
    })
}

#[async_trait]
impl OrderExporter for JsonlOrderExporter {
    async fn export_paid(&self, db: &DatabaseConnection, order_id: Uuid) -> AppResult<()> {
        let record = build_record(db, order_id).await?;
        self.append(&record).await?;
        tracing::info!(%order_id, path = %self.path.display(), "order exported");
        Ok(())
    }
}
