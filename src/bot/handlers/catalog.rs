use rust_decimal::Decimal;
use uuid::Uuid;

use super::cart;
use crate::{
    bot::{ITEMS_PER_PAGE, keyboards, reply::Reply, texts},
    conversation::ConversationState,
    error::AppResult,
    services::{cart_service, catalog_service},
    state::AppState,
};

pub async fn show_categories(
    state: &AppState,
    reply: Reply<'_>,
    user_id: i64,
    page: u32,
) -> AppResult<()> {
    state.conversations.clear(user_id);
    let categories = catalog_service::categories(&state.orm).await?;
    let text = if categories.is_empty() {
        texts::CATALOG_NO_CATEGORIES
    } else {
        texts::CATALOG_SELECT_CATEGORY
    };
    reply
        .show(text, Some(&keyboards::categories(&categories, page)))
        .await?;
    Ok(())
}

pub async fn show_subcategories(
    state: &AppState,
    reply: Reply<'_>,
    user_id: i64,
    category_id: Uuid,
    page: u32,
) -> AppResult<()> {
    state.conversations.clear(user_id);
    let subcategories = catalog_service::subcategories(&state.orm, category_id).await?;
    let text = if subcategories.is_empty() {
        texts::CATALOG_NO_SUBCATEGORIES
    } else {
        texts::CATALOG_SELECT_SUBCATEGORY
    };
    reply
        .show(
            text,
            Some(&keyboards::subcategories(category_id, &subcategories, page)),
        )
        .await?;
    Ok(())
}

/// Sends the next batch of product cards followed by a navigation message.
pub async fn show_products(
    state: &AppState,
    reply: Reply<'_>,
    subcategory_id: Uuid,
    offset: u32,
) -> AppResult<()> {
    let subcategory = catalog_service::subcategory(&state.orm, subcategory_id).await?;
    let products = catalog_service::products(&state.orm, subcategory_id).await?;
    let start = offset as usize;

    let sent_cards = start < products.len();
    if sent_cards {
        reply.remove_origin().await;
        for product in products.iter().skip(start).take(ITEMS_PER_PAGE) {
            reply
                .send_card(
                    product.image_url.as_deref(),
                    &texts::product_card(product),
                    Some(&keyboards::product_card(product.id)),
                )
                .await?;
        }
    }

    let has_more = start + ITEMS_PER_PAGE < products.len();
    let text = if products.is_empty() {
        texts::CATALOG_NO_PRODUCTS
    } else if has_more {
        texts::CATALOG_SHOW_MORE_PRODUCTS
    } else {
        texts::CATALOG_NO_MORE_PRODUCTS
    };
    let keyboard = keyboards::products_nav(&subcategory, has_more, offset);

    if sent_cards {
        reply.send(text, Some(&keyboard)).await?;
    } else {
        reply.show(text, Some(&keyboard)).await?;
    }
    Ok(())
}

pub async fn ask_quantity(
    state: &AppState,
    reply: Reply<'_>,
    user_id: i64,
    product_id: Uuid,
) -> AppResult<()> {
    // Fails with NotFound for a stale card.
    catalog_service::product(&state.orm, product_id).await?;

    state
        .conversations
        .set(user_id, ConversationState::AwaitingQuantity { product_id });
    reply.show(texts::CART_ENTER_QUANTITY, None).await?;
    Ok(())
}

fn parse_quantity(text: &str) -> Option<i32> {
    text.trim()
        .parse::<i32>()
        .ok()
        .filter(|quantity| (1..=cart_service::MAX_QUANTITY).contains(quantity))
}

/// Free-text reply while a quantity is expected.
pub async fn process_quantity(
    state: &AppState,
    reply: Reply<'_>,
    product_id: Uuid,
    text: &str,
) -> AppResult<()> {
    let Some(quantity) = parse_quantity(text) else {
        reply.send(texts::CART_INVALID_QUANTITY, None).await?;
        return Ok(());
    };

    let (product, subcategory) = catalog_service::product(&state.orm, product_id).await?;
    let total = product.price * Decimal::from(quantity);
    reply
        .send(
            &texts::confirm_add_to_cart(quantity, &product.name, total),
            Some(&keyboards::confirm_quantity(
                product.id,
                quantity,
                subcategory.category_id,
            )),
        )
        .await?;
    Ok(())
}

pub async fn confirm_add(
    state: &AppState,
    reply: Reply<'_>,
    user_id: i64,
    product_id: Uuid,
    quantity: i32,
) -> AppResult<()> {
    cart_service::add(&state.orm, user_id, product_id, quantity).await?;
    state.conversations.clear(user_id);

    reply.show(texts::CART_PRODUCT_ADDED, None).await?;
    let fresh = Reply::new(reply.transport(), reply.chat_id, None);
    cart::show_cart(state, fresh, user_id).await
}
