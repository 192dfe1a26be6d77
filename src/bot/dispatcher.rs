//! Routes one Telegram update to its handler.
//!
//! Every update first registers the sender and passes the subscription gate.
//! Callback queries are always answered, with an alert when the handler
//! produced a notice.

use super::{
    callback::{BackTarget, CallbackData},
    handlers::{cart, catalog, checkout, faq, start},
    keyboards,
    reply::Reply,
    texts,
};
use crate::{
    conversation::ConversationState,
    error::{AppError, AppResult},
    services::{subscription_service, user_service},
    state::AppState,
    telegram::{CallbackQuery, Message, Update, User, escape_html},
};

pub async fn dispatch(state: &AppState, update: Update) -> AppResult<()> {
    let Update {
        update_id,
        message,
        callback_query,
        inline_query,
    } = update;

    if let Some(query) = inline_query {
        return faq::inline_search(state, &query).await;
    }
    if let Some(callback) = callback_query {
        return on_callback(state, callback).await;
    }
    if let Some(message) = message {
        return on_message(state, message).await;
    }

    tracing::debug!(update_id, "update without a supported payload");
    Ok(())
}

fn is_start_command(text: &str) -> bool {
    let command = text.split_whitespace().next().unwrap_or_default();
    command == "/start" || command.starts_with("/start@")
}

async fn passes_gate(state: &AppState, reply: Reply<'_>, user_id: i64) -> AppResult<bool> {
    if state.config.required_chat_ids.is_empty() {
        return Ok(true);
    }

    let missing = subscription_service::missing_subscriptions(
        state.transport.as_ref(),
        &state.config.required_chat_ids,
        user_id,
    )
    .await;
    if missing.is_empty() {
        return Ok(true);
    }

    reply
        .send(
            texts::SUBSCRIPTION_REQUIRED,
            Some(&keyboards::subscription(&missing)),
        )
        .await?;
    Ok(false)
}

async fn on_message(state: &AppState, message: Message) -> AppResult<()> {
    let Some(sender) = message.from.as_ref() else {
        return Ok(());
    };
    if sender.is_bot || !message.chat.is_private() {
        return Ok(());
    }

    user_service::upsert(&state.orm, sender).await?;

    let reply = Reply::new(state.transport.as_ref(), message.chat.id, None);
    if !passes_gate(state, reply, sender.id).await? {
        return Ok(());
    }

    let text = message.text.as_deref().unwrap_or_default();
    let result = route_text(state, reply, sender, text).await.map(|()| None);
    if let Some(notice) = recover(state, reply, sender.id, result).await? {
        reply.send(&escape_html(&notice), None).await?;
    }
    Ok(())
}

async fn route_text(state: &AppState, reply: Reply<'_>, sender: &User, text: &str) -> AppResult<()> {
    if is_start_command(text) {
        return start::main_menu(state, reply, sender).await;
    }

    match state.conversations.get(sender.id) {
        ConversationState::AwaitingQuantity { product_id } => {
            catalog::process_quantity(state, reply, product_id, text).await
        }
        ConversationState::AwaitingDeliveryInfo
        | ConversationState::AwaitingConfirmation { .. } => {
            checkout::delivery_info(state, reply, sender.id, text).await
        }
        ConversationState::Idle => start::main_menu(state, reply, sender).await,
    }
}

async fn on_callback(state: &AppState, callback: CallbackQuery) -> AppResult<()> {
    let sender = &callback.from;
    if sender.is_bot {
        return Ok(());
    }

    user_service::upsert(&state.orm, sender).await?;

    let origin = callback.message.as_ref();
    let reply = Reply::new(
        state.transport.as_ref(),
        origin.map_or(sender.id, |message| message.chat.id),
        origin.map(|message| message.message_id),
    );

    let notice = if !passes_gate(state, reply, sender.id).await? {
        None
    } else {
        match callback.data.as_deref().map(str::parse::<CallbackData>) {
            Some(Ok(data)) => {
                let result = route_callback(state, reply, sender, data).await;
                recover(state, reply, sender.id, result).await?
            }
            Some(Err(err)) => {
                tracing::warn!(user_id = sender.id, error = %err, "unknown callback");
                Some(texts::UNKNOWN_BUTTON.to_string())
            }
            None => Some(texts::UNKNOWN_BUTTON.to_string()),
        }
    };

    if let Err(err) = state
        .transport
        .answer_callback_query(&callback.id, notice.as_deref(), notice.is_some())
        .await
    {
        tracing::debug!(user_id = sender.id, error = %err, "answerCallbackQuery failed");
    }
    Ok(())
}

async fn route_callback(
    state: &AppState,
    reply: Reply<'_>,
    sender: &User,
    data: CallbackData,
) -> AppResult<Option<String>> {
    let user_id = sender.id;
    let done = match data {
        CallbackData::Categories { page } => {
            catalog::show_categories(state, reply, user_id, page).await
        }
        CallbackData::Subcategories { category_id, page } => {
            catalog::show_subcategories(state, reply, user_id, category_id, page).await
        }
        CallbackData::Products {
            subcategory_id,
            offset,
        } => catalog::show_products(state, reply, subcategory_id, offset).await,
        CallbackData::AddToCart {
            product_id,
            quantity: None,
        } => catalog::ask_quantity(state, reply, user_id, product_id).await,
        CallbackData::AddToCart {
            product_id,
            quantity: Some(quantity),
        } => catalog::confirm_add(state, reply, user_id, product_id, quantity).await,
        CallbackData::Back(BackTarget::MainMenu) => start::main_menu(state, reply, sender).await,
        CallbackData::Back(BackTarget::Cart) => checkout::cancel(state, reply, user_id).await,
        CallbackData::Back(BackTarget::Faq) => faq::entry(reply).await,
        CallbackData::DeleteMode { page } => cart::delete_mode(state, reply, user_id, page).await,
        CallbackData::DeleteItem { page, product_id } => {
            let notice = cart::delete_item(state, reply, user_id, page, product_id).await?;
            return Ok(Some(notice.to_string()));
        }
        CallbackData::ClearCart => {
            let notice = cart::clear(state, reply, user_id).await?;
            return Ok(Some(notice.to_string()));
        }
        CallbackData::Checkout => checkout::start(state, reply, user_id).await,
        CallbackData::ConfirmOrder => checkout::confirm(state, reply, user_id).await,
    };
    done.map(|()| None)
}

/// Turns the errors a user can cause into replies; everything else propagates.
async fn recover(
    state: &AppState,
    reply: Reply<'_>,
    user_id: i64,
    result: AppResult<Option<String>>,
) -> AppResult<Option<String>> {
    match result {
        Ok(notice) => Ok(notice),
        Err(AppError::NotFound) => {
            state.conversations.clear(user_id);
            reply
                .send(texts::ITEM_UNAVAILABLE, Some(&keyboards::main_menu()))
                .await?;
            Ok(None)
        }
        Err(AppError::Validation(message)) => Ok(Some(message)),
        Err(AppError::Transport(err)) => {
            tracing::warn!(user_id, error = %err, "reply delivery failed");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
