mod common;

use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, ModelTrait};
use storefront_bot::{
    entity::products::Entity as Products,
    services::{
        cart_service,
        export_service::{JsonlOrderExporter, OrderExporter, build_record},
        order_service,
    },
};

use common::{seed_product, seed_user, setup_db};

#[tokio::test]
async fn paid_orders_are_appended_as_json_lines() -> anyhow::Result<()> {
    let db = setup_db().await?;
    seed_user(&db, 1, "Ann").await?;
    let tea = seed_product(&db, "Tea", dec!(150.00)).await?;
    cart_service::add(&db, 1, tea.id, 2).await?;
    let first = order_service::materialize_from_cart(&db, 1, "Somewhere")
        .await?
        .expect("order");
    cart_service::add(&db, 1, tea.id, 1).await?;
    let second = order_service::materialize_from_cart(&db, 1, "Elsewhere")
        .await?
        .expect("order");

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("exports/orders.jsonl");
    let exporter = JsonlOrderExporter::new(&path);
    exporter.export_paid(&db, first.order.id).await?;
    exporter.export_paid(&db, second.order.id).await?;

    let contents = std::fs::read_to_string(&path)?;
    let lines: Vec<serde_json::Value> = contents
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["order_id"], first.order.id.to_string());
    assert_eq!(lines[0]["first_name"], "Ann");
    assert_eq!(lines[0]["items"][0]["product"], "Tea");
    assert_eq!(lines[0]["items"][0]["quantity"], 2);
    assert_eq!(lines[1]["delivery_info"], "Elsewhere");
    Ok(())
}

#[tokio::test]
async fn deleted_products_keep_their_order_lines() -> anyhow::Result<()> {
    let db = setup_db().await?;
    seed_user(&db, 1, "Ann").await?;
    let tea = seed_product(&db, "Tea", dec!(150.00)).await?;
    cart_service::add(&db, 1, tea.id, 1).await?;
    let created = order_service::materialize_from_cart(&db, 1, "Somewhere")
        .await?
        .expect("order");

    let product = Products::find_by_id(tea.id).one(&db).await?.unwrap();
    product.delete(&db).await?;

    let record = build_record(&db, created.order.id).await?;
    assert_eq!(record.items.len(), 1);
    assert_eq!(record.items[0].product, "Deleted product");
    assert_eq!(record.items[0].price_at_purchase, dec!(150.00));
    Ok(())
}
