mod common;

use rust_decimal_macros::dec;
use serde_json::json;
use storefront_bot::{
    entity::orders::{Entity as Orders, PaymentStatus},
    services::{
        cart_service,
        checkout_service::CheckoutStep,
        webhook_service::{ReconcileOutcome, WebhookError},
    },
};
use sea_orm::EntityTrait;
use uuid::Uuid;

use common::{FakeGateway, FakeTransport, Harness, harness, harness_with, seed_product, seed_user, test_config};

const USER: i64 = 4242;

/// Runs a full checkout and returns the order id; its payment id is `pay-1`.
async fn placed_order(h: &Harness) -> anyhow::Result<Uuid> {
    let db = &h.state.orm;
    seed_user(db, USER, "Ann").await?;
    let tea = seed_product(db, "Tea", dec!(150.00)).await?;
    cart_service::add(db, USER, tea.id, 2).await?;

    h.state.checkout.start(USER).await?;
    h.state.checkout.submit_delivery_info(USER, "Somewhere 1");
    match h.state.checkout.confirm(USER).await {
        CheckoutStep::PaymentRequired { order_id, .. } => Ok(order_id),
        other => anyhow::bail!("checkout did not reach payment: {other:?}"),
    }
}

fn notification(event: &str, payment_id: &str, order_id: Uuid) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "type": "notification",
        "event": event,
        "object": {
            "id": payment_id,
            "status": "succeeded",
            "metadata": {
                "order_id": order_id.to_string(),
                "telegram_user_id": USER.to_string()
            }
        }
    }))
    .unwrap()
}

#[tokio::test]
async fn succeeded_payment_marks_order_paid_once() -> anyhow::Result<()> {
    let h = harness().await?;
    let order_id = placed_order(&h).await?;
    let body = notification("payment.succeeded", "pay-1", order_id);

    let outcome = h.state.reconciler.reconcile(&body).await?;
    assert_eq!(
        outcome,
        ReconcileOutcome::Applied {
            order_id,
            status: PaymentStatus::Paid
        }
    );

    let order = Orders::find_by_id(order_id).one(&h.state.orm).await?.unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    assert!(order.paid_at.is_some());

    // Redelivery is acknowledged without side effects.
    assert_eq!(
        h.state.reconciler.reconcile(&body).await?,
        ReconcileOutcome::Duplicate
    );

    let notifications = h.transport.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].0, USER);
    assert!(notifications[0].1.contains(&order_id.to_string()));
    assert_eq!(h.exporter.exported(), vec![order_id]);
    Ok(())
}

// The in-memory pool has one connection, so the two transactions run back to
// back and this covers the check-and-set under redelivery. The `FOR UPDATE`
// row lock itself only takes effect on PostgreSQL.
#[tokio::test]
async fn concurrent_deliveries_apply_exactly_once() -> anyhow::Result<()> {
    let h = harness().await?;
    let order_id = placed_order(&h).await?;
    let body = notification("payment_succeeded", "pay-1", order_id);

    let (first, second) = tokio::join!(
        h.state.reconciler.reconcile(&body),
        h.state.reconciler.reconcile(&body)
    );
    let outcomes = [first?, second?];

    let applied = outcomes
        .iter()
        .filter(|o| matches!(o, ReconcileOutcome::Applied { .. }))
        .count();
    let duplicates = outcomes
        .iter()
        .filter(|o| **o == ReconcileOutcome::Duplicate)
        .count();
    assert_eq!((applied, duplicates), (1, 1));
    assert_eq!(h.transport.notifications().len(), 1);
    assert_eq!(h.exporter.exported().len(), 1);
    Ok(())
}

#[tokio::test]
async fn canceled_payment_cancels_pending_order_without_export() -> anyhow::Result<()> {
    let h = harness().await?;
    let order_id = placed_order(&h).await?;

    let outcome = h
        .state
        .reconciler
        .reconcile(&notification("payment.canceled", "pay-1", order_id))
        .await?;
    assert_eq!(
        outcome,
        ReconcileOutcome::Applied {
            order_id,
            status: PaymentStatus::Canceled
        }
    );

    let order = Orders::find_by_id(order_id).one(&h.state.orm).await?.unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Canceled);
    assert!(order.paid_at.is_none());
    assert_eq!(h.transport.notifications().len(), 1);
    assert!(h.exporter.exported().is_empty());
    Ok(())
}

#[tokio::test]
async fn terminal_orders_do_not_flip() -> anyhow::Result<()> {
    let h = harness().await?;
    let order_id = placed_order(&h).await?;
    h.state
        .reconciler
        .reconcile(&notification("payment.succeeded", "pay-1", order_id))
        .await?;

    let outcome = h
        .state
        .reconciler
        .reconcile(&notification("payment.canceled", "pay-1", order_id))
        .await?;
    assert_eq!(outcome, ReconcileOutcome::Ignored);

    let order = Orders::find_by_id(order_id).one(&h.state.orm).await?.unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    Ok(())
}

#[tokio::test]
async fn foreign_payment_id_is_not_applied() -> anyhow::Result<()> {
    let h = harness().await?;
    let order_id = placed_order(&h).await?;

    let outcome = h
        .state
        .reconciler
        .reconcile(&notification("payment.succeeded", "someone-else", order_id))
        .await?;
    assert_eq!(outcome, ReconcileOutcome::Mismatched);

    let order = Orders::find_by_id(order_id).one(&h.state.orm).await?.unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert!(h.transport.notifications().is_empty());
    Ok(())
}

#[tokio::test]
async fn unrelated_events_are_ignored() -> anyhow::Result<()> {
    let h = harness().await?;
    let body = serde_json::to_vec(&json!({
        "event": "refund.succeeded",
        "object": { "id": "r-1" }
    }))?;

    assert_eq!(
        h.state.reconciler.reconcile(&body).await?,
        ReconcileOutcome::Ignored
    );
    Ok(())
}

#[tokio::test]
async fn bad_payloads_are_client_errors() -> anyhow::Result<()> {
    let h = harness().await?;

    let err = h.state.reconciler.reconcile(b"{not json").await.unwrap_err();
    assert!(matches!(err, WebhookError::Malformed(_)));
    assert_eq!(err.status_code().as_u16(), 400);

    let missing = serde_json::to_vec(&json!({
        "event": "payment.succeeded",
        "object": { "id": "pay-1", "metadata": { "order_id": "not-a-uuid" } }
    }))?;
    let err = h.state.reconciler.reconcile(&missing).await.unwrap_err();
    assert!(matches!(err, WebhookError::MissingCorrelation));

    let unknown = notification("payment.succeeded", "pay-1", Uuid::new_v4());
    let err = h.state.reconciler.reconcile(&unknown).await.unwrap_err();
    assert!(matches!(err, WebhookError::OrderNotFound(_)));
    assert_eq!(err.status_code().as_u16(), 400);
    Ok(())
}

#[tokio::test]
async fn notification_failure_does_not_undo_payment() -> anyhow::Result<()> {
    let transport = FakeTransport {
        fail_sends: true,
        ..FakeTransport::default()
    };
    let h = harness_with(test_config(), FakeGateway::default(), transport).await?;
    let order_id = placed_order(&h).await?;

    let outcome = h
        .state
        .reconciler
        .reconcile(&notification("payment.succeeded", "pay-1", order_id))
        .await?;
    assert!(matches!(outcome, ReconcileOutcome::Applied { .. }));

    let order = Orders::find_by_id(order_id).one(&h.state.orm).await?.unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    assert_eq!(h.exporter.exported(), vec![order_id]);
    Ok(())
}
