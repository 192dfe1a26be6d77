use uuid::Uuid;

use crate::{
    bot::{ITEMS_PER_PAGE, keyboards, reply::Reply, texts},
    error::AppResult,
    services::cart_service,
    state::AppState,
};

/// Cart listing. Also the landing screen for checkout cancellation.
pub async fn show_cart(state: &AppState, reply: Reply<'_>, user_id: i64) -> AppResult<()> {
    state.conversations.clear(user_id);

    let lines = cart_service::list(&state.orm, user_id).await?;
    if lines.is_empty() {
        reply
            .show(texts::EMPTY_CART, Some(&keyboards::back_to_main_menu()))
            .await?;
        return Ok(());
    }

    let messages = texts::cart_messages(&lines, cart_service::total(&lines));
    let keyboard = keyboards::cart_main();

    if let [only] = messages.as_slice() {
        reply.show(only, Some(&keyboard)).await?;
        return Ok(());
    }

    reply.remove_origin().await;
    let last = messages.len() - 1;
    for (index, text) in messages.iter().enumerate() {
        let markup = (index == last).then_some(&keyboard);
        reply.send(text, markup).await?;
    }
    Ok(())
}

pub async fn delete_mode(
    state: &AppState,
    reply: Reply<'_>,
    user_id: i64,
    page: u32,
) -> AppResult<()> {
    let lines = cart_service::list(&state.orm, user_id).await?;
    if lines.is_empty() {
        reply
            .show(texts::EMPTY_CART, Some(&keyboards::back_to_main_menu()))
            .await?;
        return Ok(());
    }

    // Removing the last entry of a page moves back one page.
    let last_page = ((lines.len() - 1) / ITEMS_PER_PAGE) as u32;
    let page = page.min(last_page);
    reply
        .show(
            texts::CART_PROMPT_DELETE,
            Some(&keyboards::delete_mode(&lines, page)),
        )
        .await?;
    Ok(())
}

pub async fn delete_item(
    state: &AppState,
    reply: Reply<'_>,
    user_id: i64,
    page: u32,
    product_id: Uuid,
) -> AppResult<&'static str> {
    let removed = cart_service::remove(&state.orm, user_id, product_id).await?;
    delete_mode(state, reply, user_id, page).await?;
    Ok(if removed {
        texts::CART_ITEM_DELETED
    } else {
        texts::CART_ITEM_ALREADY_GONE
    })
}

pub async fn clear(state: &AppState, reply: Reply<'_>, user_id: i64) -> AppResult<&'static str> {
    let removed = cart_service::clear(&state.orm, user_id).await?;
    tracing::debug!(user_id, removed, "cart cleared");
    show_cart(state, reply, user_id).await?;
    Ok(texts::CART_CLEARED)
}
