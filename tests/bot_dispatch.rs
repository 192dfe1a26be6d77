mod common;

use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::{Value, json};
use storefront_bot::{
    bot::{
        callback::{BackTarget, CallbackData},
        dispatch, texts,
    },
    conversation::ConversationState,
    entity::{
        faqs::ActiveModel as FaqActive,
        orders::{Entity as Orders, PaymentStatus},
        users::Entity as Users,
    },
    services::cart_service,
    telegram::{ChatMemberStatus, Update},
};
use uuid::Uuid;

use common::{FakeGateway, FakeTransport, harness, harness_with, seed_product, test_config};

const USER: i64 = 555;

fn sender() -> Value {
    json!({ "id": USER, "is_bot": false, "first_name": "Ann", "username": "ann" })
}

fn text_update(text: &str) -> Update {
    serde_json::from_value(json!({
        "update_id": 1,
        "message": {
            "message_id": 10,
            "from": sender(),
            "chat": { "id": USER, "type": "private" },
            "text": text
        }
    }))
    .unwrap()
}

fn callback_update(data: &str) -> Update {
    serde_json::from_value(json!({
        "update_id": 2,
        "callback_query": {
            "id": "cb-1",
            "from": sender(),
            "message": {
                "message_id": 11,
                "chat": { "id": USER, "type": "private" },
                "text": "menu"
            },
            "data": data
        }
    }))
    .unwrap()
}

fn inline_update(query: &str) -> Update {
    serde_json::from_value(json!({
        "update_id": 3,
        "inline_query": { "id": "iq-1", "from": sender(), "query": query, "offset": "" }
    }))
    .unwrap()
}

#[tokio::test]
async fn start_registers_user_and_shows_main_menu() -> anyhow::Result<()> {
    let h = harness().await?;

    dispatch(&h.state, text_update("/start")).await?;

    let user = Users::find_by_id(USER).one(&h.state.orm).await?.unwrap();
    assert_eq!(user.first_name.as_deref(), Some("Ann"));

    let sent = h.transport.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text.contains("Ann"));
    assert!(sent[0].keyboard.is_some());
    Ok(())
}

#[tokio::test]
async fn group_messages_are_ignored() -> anyhow::Result<()> {
    let h = harness().await?;
    let update: Update = serde_json::from_value(json!({
        "update_id": 1,
        "message": {
            "message_id": 10,
            "from": sender(),
            "chat": { "id": -100, "type": "supergroup" },
            "text": "/start"
        }
    }))?;

    dispatch(&h.state, update).await?;
    assert!(h.transport.sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn unknown_callback_is_answered_with_alert() -> anyhow::Result<()> {
    let h = harness().await?;

    dispatch(&h.state, callback_update("legacy_button")).await?;

    let answers = h.transport.callbacks();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].text.as_deref(), Some(texts::UNKNOWN_BUTTON));
    assert!(answers[0].show_alert);
    Ok(())
}

#[tokio::test]
async fn quantity_dialog_adds_product_to_cart() -> anyhow::Result<()> {
    let h = harness().await?;
    let tea = seed_product(&h.state.orm, "Tea", dec!(150.00)).await?;
    // First contact registers the user.
    dispatch(&h.state, text_update("/start")).await?;

    let ask = CallbackData::AddToCart {
        product_id: tea.id,
        quantity: None,
    };
    dispatch(&h.state, callback_update(&ask.to_string())).await?;
    assert_eq!(
        h.state.conversations.get(USER),
        ConversationState::AwaitingQuantity { product_id: tea.id }
    );

    dispatch(&h.state, text_update("zero")).await?;
    assert!(
        h.transport
            .shown_texts()
            .contains(&texts::CART_INVALID_QUANTITY.to_string())
    );

    dispatch(&h.state, text_update("3")).await?;
    let confirm = h.transport.sent().last().cloned().unwrap();
    assert!(confirm.text.contains("Tea"));

    let add = CallbackData::AddToCart {
        product_id: tea.id,
        quantity: Some(3),
    };
    dispatch(&h.state, callback_update(&add.to_string())).await?;

    let lines = cart_service::list(&h.state.orm, USER).await?;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 3);
    assert_eq!(h.state.conversations.get(USER), ConversationState::Idle);
    Ok(())
}

#[tokio::test]
async fn stale_product_button_reports_unavailable_item() -> anyhow::Result<()> {
    let h = harness().await?;
    dispatch(&h.state, text_update("/start")).await?;

    let ask = CallbackData::AddToCart {
        product_id: Uuid::new_v4(),
        quantity: None,
    };
    dispatch(&h.state, callback_update(&ask.to_string())).await?;

    assert!(
        h.transport
            .shown_texts()
            .contains(&texts::ITEM_UNAVAILABLE.to_string())
    );
    assert_eq!(h.state.conversations.get(USER), ConversationState::Idle);
    assert_eq!(h.transport.callbacks().len(), 1);
    Ok(())
}

#[tokio::test]
async fn checkout_dialog_ends_with_payment_link() -> anyhow::Result<()> {
    let h = harness().await?;
    let tea = seed_product(&h.state.orm, "Tea", dec!(150.00)).await?;
    dispatch(&h.state, text_update("/start")).await?;
    cart_service::add(&h.state.orm, USER, tea.id, 1).await?;

    dispatch(&h.state, callback_update(&CallbackData::Checkout.to_string())).await?;
    assert_eq!(
        h.state.conversations.get(USER),
        ConversationState::AwaitingDeliveryInfo
    );

    dispatch(&h.state, text_update("Lenina 1")).await?;
    // A second text before confirming replaces the details.
    dispatch(&h.state, text_update("Lenina 2")).await?;
    assert_eq!(
        h.state.conversations.get(USER),
        ConversationState::AwaitingConfirmation {
            delivery_info: "Lenina 2".into()
        }
    );

    dispatch(
        &h.state,
        callback_update(&CallbackData::ConfirmOrder.to_string()),
    )
    .await?;

    let orders = Orders::find().all(&h.state.orm).await?;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].delivery_info, "Lenina 2");
    assert_eq!(orders[0].payment_status, PaymentStatus::Pending);

    let payment_prompt = h.transport.edited().last().cloned().unwrap();
    let keyboard = payment_prompt.keyboard.unwrap();
    assert_eq!(
        keyboard.inline_keyboard[0][0].url.as_deref(),
        Some("https://pay.example/confirm/1")
    );
    Ok(())
}

#[tokio::test]
async fn cancel_button_returns_to_cart() -> anyhow::Result<()> {
    let h = harness().await?;
    let tea = seed_product(&h.state.orm, "Tea", dec!(150.00)).await?;
    dispatch(&h.state, text_update("/start")).await?;
    cart_service::add(&h.state.orm, USER, tea.id, 1).await?;
    dispatch(&h.state, callback_update(&CallbackData::Checkout.to_string())).await?;

    let back = CallbackData::Back(BackTarget::Cart);
    dispatch(&h.state, callback_update(&back.to_string())).await?;

    assert_eq!(h.state.conversations.get(USER), ConversationState::Idle);
    let shown = h.transport.edited().last().cloned().unwrap();
    assert!(shown.text.starts_with(texts::CART_HEADER));
    Ok(())
}

#[tokio::test]
async fn clearing_cart_confirms_with_alert() -> anyhow::Result<()> {
    let h = harness().await?;
    let tea = seed_product(&h.state.orm, "Tea", dec!(150.00)).await?;
    dispatch(&h.state, text_update("/start")).await?;
    cart_service::add(&h.state.orm, USER, tea.id, 2).await?;

    dispatch(&h.state, callback_update(&CallbackData::ClearCart.to_string())).await?;

    assert!(cart_service::list(&h.state.orm, USER).await?.is_empty());
    let answers = h.transport.callbacks();
    assert_eq!(answers[0].text.as_deref(), Some(texts::CART_CLEARED));
    assert!(answers[0].show_alert);
    Ok(())
}

#[tokio::test]
async fn unsubscribed_users_are_stopped_at_the_gate() -> anyhow::Result<()> {
    let mut config = test_config();
    config.required_chat_ids = vec!["@store_news".into()];
    let transport = FakeTransport {
        member_status: ChatMemberStatus::Left,
        ..FakeTransport::default()
    };
    let h = harness_with(config, FakeGateway::default(), transport).await?;

    dispatch(&h.state, text_update("/start")).await?;

    let sent = h.transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, texts::SUBSCRIPTION_REQUIRED);
    let keyboard = sent[0].keyboard.clone().unwrap();
    assert_eq!(
        keyboard.inline_keyboard[0][0].url.as_deref(),
        Some("https://t.me/store_news")
    );
    Ok(())
}

#[tokio::test]
async fn inline_search_answers_with_matching_faqs() -> anyhow::Result<()> {
    let h = harness().await?;
    FaqActive {
        id: Set(Uuid::new_v4()),
        question: Set("How long does delivery take?".into()),
        answer: Set("Usually 2 to 5 business days.".into()),
        keywords: Set(Some("shipping".into())),
        position: Set(0),
        is_active: Set(true),
    }
    .insert(&h.state.orm)
    .await?;

    dispatch(&h.state, inline_update("SHIPPING")).await?;
    dispatch(&h.state, inline_update("refund")).await?;
    dispatch(&h.state, inline_update("  ")).await?;

    let answers = h.transport.inline_answers.lock().unwrap().clone();
    assert_eq!(answers.len(), 3);
    assert_eq!(answers[0].1.len(), 1);
    assert_eq!(answers[0].1[0].title, "How long does delivery take?");
    assert_eq!(answers[1].1[0].title, texts::FAQ_NO_RESULTS);
    assert_eq!(answers[2].1[0].title, texts::FAQ_INLINE_QUERY_PROMPT);
    Ok(())
}

#[tokio::test]
async fn blank_message_on_confirmation_screen_keeps_address() -> anyhow::Result<()> {
    let h = harness().await?;
    let tea = seed_product(&h.state.orm, "Tea", dec!(150.00)).await?;
    dispatch(&h.state, text_update("/start")).await?;
    cart_service::add(&h.state.orm, USER, tea.id, 1).await?;

    dispatch(&h.state, callback_update(&CallbackData::Checkout.to_string())).await?;
    dispatch(&h.state, text_update("Lenina 1")).await?;
    dispatch(&h.state, text_update("   ")).await?;
    dispatch(
        &h.state,
        callback_update(&CallbackData::ConfirmOrder.to_string()),
    )
    .await?;

    let orders = Orders::find().all(&h.state.orm).await?;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].delivery_info, "Lenina 1");
    Ok(())
}
