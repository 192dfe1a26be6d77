use super::cart;
use crate::{
    bot::{keyboards, reply::Reply, texts},
    error::AppResult,
    services::checkout_service::CheckoutStep,
    state::AppState,
};

pub async fn start(state: &AppState, reply: Reply<'_>, user_id: i64) -> AppResult<()> {
    let step = state.checkout.start(user_id).await?;
    render(state, reply, user_id, step).await
}

pub async fn delivery_info(
    state: &AppState,
    reply: Reply<'_>,
    user_id: i64,
    text: &str,
) -> AppResult<()> {
    let step = state.checkout.submit_delivery_info(user_id, text);
    render(state, reply, user_id, step).await
}

pub async fn confirm(state: &AppState, reply: Reply<'_>, user_id: i64) -> AppResult<()> {
    reply.show(texts::ORDER_PROCESSING, None).await?;
    let step = state.checkout.confirm(user_id).await;
    render(state, reply, user_id, step).await
}

pub async fn cancel(state: &AppState, reply: Reply<'_>, user_id: i64) -> AppResult<()> {
    let step = state.checkout.cancel(user_id);
    render(state, reply, user_id, step).await
}

async fn render(
    state: &AppState,
    reply: Reply<'_>,
    user_id: i64,
    step: CheckoutStep,
) -> AppResult<()> {
    match step {
        CheckoutStep::ShowCart => return cart::show_cart(state, reply, user_id).await,
        CheckoutStep::PromptDeliveryInfo => {
            reply
                .show(
                    texts::ORDER_ENTER_DELIVERY_INFO,
                    Some(&keyboards::checkout_cancel()),
                )
                .await?
        }
        CheckoutStep::Reprompt => reply.send(texts::ORDER_EMPTY_DELIVERY_INFO, None).await?,
        CheckoutStep::ConfirmDeliveryInfo { delivery_info } => {
            reply
                .send(
                    &texts::delivery_confirmation(&delivery_info),
                    Some(&keyboards::checkout_confirm()),
                )
                .await?
        }
        CheckoutStep::MissingDeliveryInfo => {
            reply
                .show(
                    texts::ORDER_MISSING_DELIVERY_INFO,
                    Some(&keyboards::back_to_main_menu()),
                )
                .await?
        }
        CheckoutStep::PaymentRequired {
            order_id,
            confirmation_url,
        } => {
            reply
                .show(
                    &texts::payment_required(order_id),
                    Some(&keyboards::payment(&confirmation_url)),
                )
                .await?
        }
        CheckoutStep::Failed => {
            reply
                .show(
                    texts::ORDER_CREATION_ERROR,
                    Some(&keyboards::back_to_main_menu()),
                )
                .await?
        }
    }
    Ok(())
}
