//! User-facing message texts. All of them are sent with HTML parse mode.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    entity::{faqs::Model as Faq, products::Model as Product},
    payments::format_amount,
    services::cart_service::CartLine,
    telegram::escape_html,
};

/// Telegram rejects messages above 4096 characters; keep some headroom.
pub const MAX_MESSAGE_TEXT_LENGTH: usize = 4000;

pub const DEFAULT_USER_NAME: &str = "dear customer";

pub const SUBSCRIPTION_REQUIRED: &str = "🚨 To use the bot, please subscribe to these chats:";
pub const SUBSCRIPTION_CHECK_BUTTON: &str = "✅ Check subscription";

pub const MAIN_MENU_CATALOG_BUTTON: &str = "📦 Catalog";
pub const MAIN_MENU_CART_BUTTON: &str = "🛒 Cart";
pub const MAIN_MENU_FAQ_BUTTON: &str = "❓ FAQ";

pub const CATALOG_SELECT_CATEGORY: &str = "Choose a category:";
pub const CATALOG_NO_CATEGORIES: &str = "There are no categories yet.";
pub const CATALOG_SELECT_SUBCATEGORY: &str = "Choose a subcategory:";
pub const CATALOG_NO_SUBCATEGORIES: &str = "There are no subcategories yet.";
pub const CATALOG_SHOW_MORE_PRODUCTS: &str = "⬇️ Show more products? ⬇️";
pub const CATALOG_NO_MORE_PRODUCTS: &str = "That is everything in this subcategory.";
pub const CATALOG_NO_PRODUCTS: &str = "This subcategory has no products yet.";
pub const ADD_TO_CART_BUTTON: &str = "🛒 Add to cart";
pub const PRODUCT_NO_DESCRIPTION: &str = "No description";

pub const CART_ENTER_QUANTITY: &str =
    "Enter the quantity you want. (Whole numbers only, for example: 1, 5, 10)";
pub const CART_INVALID_QUANTITY: &str = "Invalid quantity.";
pub const CART_PRODUCT_ADDED: &str = "Product added. Opening your cart...";

pub const BACK_TO_MENU_BUTTON: &str = "↩️ Main menu";
pub const BACK_TO_CATEGORIES_BUTTON: &str = "↩️ Back to categories";
pub const BACK_TO_SUBCATEGORIES_BUTTON: &str = "↩️ Back to subcategories";
pub const SHOW_MORE_BUTTON: &str = "⬇️ Show more ⬇️";
pub const PAGINATION_PREV_BUTTON: &str = "⬅️";
pub const PAGINATION_NEXT_BUTTON: &str = "➡️";

pub const CART_DELETE_BUTTON: &str = "🗑️ Remove items";
pub const CART_CLEAR_ALL_BUTTON: &str = "🗑️ Clear all";
pub const CART_CHECKOUT_BUTTON: &str = "✅ Checkout";
pub const CART_FINISH_DELETE_BUTTON: &str = "↩️ Done removing";
pub const CART_REMOVE_ITEM_PREFIX: &str = "❌ ";

pub const EMPTY_CART: &str = "🛒 Your cart is empty.";
pub const CART_HEADER: &str = "🛒 <b>Your cart:</b>\n\n";
pub const CART_PROMPT_DELETE: &str = "Choose the item you want to remove:";
pub const CART_ITEM_DELETED: &str = "Item removed from the cart.";
pub const CART_ITEM_ALREADY_GONE: &str = "That item is already gone.";
pub const CART_CLEARED: &str = "Your cart is now empty.";

pub const ORDER_ENTER_DELIVERY_INFO: &str = "Let's place your order. Please send your delivery \
details (full name, address, phone number).\nExample: John Smith\n10 Baker St., apt. 5\n+79123456789";
pub const ORDER_EMPTY_DELIVERY_INFO: &str = "Please enter your delivery details.";
pub const ORDER_MISSING_DELIVERY_INFO: &str =
    "Could not find your delivery details. Please try again.";
pub const CONFIRM_BUTTON: &str = "✅ Confirm";
pub const CANCEL_BUTTON: &str = "❌ Cancel";
pub const ORDER_PROCESSING: &str = "Processing your order...";
pub const PAYMENT_BUTTON: &str = "Pay for the order";
pub const ORDER_CREATION_ERROR: &str =
    "Something went wrong while creating the order or the payment. Please try again later.";

pub const ITEM_UNAVAILABLE: &str = "This item is no longer available.";
pub const UNKNOWN_BUTTON: &str = "This button is no longer valid.";

pub const FAQ_INLINE_QUERY_PROMPT: &str = "Type your question to search the FAQ...";
pub const FAQ_NO_RESULTS: &str = "Nothing matched your query.";
pub const FAQ_SEARCH_PROMPT: &str = "To find an answer, start typing\n@our_bot your question\nin any chat or right here.";
pub const FAQ_TRY_BUTTON: &str = "Try it";

pub fn money(amount: Decimal) -> String {
    format!("{}₽", format_amount(amount))
}

pub fn welcome(first_name: Option<&str>) -> String {
    let name = first_name
        .filter(|name| !name.trim().is_empty())
        .map(escape_html)
        .unwrap_or_else(|| DEFAULT_USER_NAME.to_string());
    format!("👋 Hi, {name}! Welcome to our shop!")
}

pub fn product_card(product: &Product) -> String {
    let description = product
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .map(escape_html)
        .unwrap_or_else(|| PRODUCT_NO_DESCRIPTION.to_string());
    format!(
        "<b>{}</b>\n<i>{}</i>\nPrice: <b>{}</b>",
        escape_html(&product.name),
        description,
        money(product.price)
    )
}

pub fn confirm_add_to_cart(quantity: i32, product_name: &str, total: Decimal) -> String {
    format!(
        "Add <b>{quantity}</b> pcs. of <b>{}</b> to the cart? Total: <b>{}</b>",
        escape_html(product_name),
        money(total)
    )
}

fn cart_item(number: usize, line: &CartLine) -> String {
    format!(
        "<b>{number}. {}</b>\n   Quantity: <code>{}</code> pcs.\n   Unit price: <code>{}</code>\n   Subtotal: <code>{}</code>\n\n",
        escape_html(&line.name),
        line.quantity,
        money(line.price),
        money(line.line_total())
    )
}

fn cart_summary(total: Decimal) -> String {
    format!("➖➖➖➖➖➖➖➖➖➖➖➖➖\n<b>Total to pay: {}</b>", money(total))
}

/// Cart listing split into messages of at most [`MAX_MESSAGE_TEXT_LENGTH`] characters.
pub fn cart_messages(lines: &[CartLine], total: Decimal) -> Vec<String> {
    let mut messages = Vec::new();
    let mut buffer = CART_HEADER.to_string();

    for (index, line) in lines.iter().enumerate() {
        let item = cart_item(index + 1, line);
        if !buffer.is_empty()
            && buffer.chars().count() + item.chars().count() > MAX_MESSAGE_TEXT_LENGTH
        {
            messages.push(std::mem::take(&mut buffer));
        }
        buffer.push_str(&item);
    }
    if !buffer.is_empty() {
        messages.push(buffer);
    }

    let summary = cart_summary(total);
    match messages.last_mut() {
        Some(last) if last.chars().count() + 1 + summary.chars().count() <= MAX_MESSAGE_TEXT_LENGTH => {
            last.push('\n');
            last.push_str(&summary);
        }
        _ => messages.push(summary),
    }
    messages
}

pub fn remove_item_button(line: &CartLine) -> String {
    format!("{CART_REMOVE_ITEM_PREFIX}{} ({} pcs.)", line.name, line.quantity)
}

/// `delivery_info` is already escaped.
pub fn delivery_confirmation(delivery_info: &str) -> String {
    format!(
        "<b>Please check your delivery details:</b>\n\n<code>{delivery_info}</code>\n\nIs everything correct?"
    )
}

pub fn payment_required(order_id: Uuid) -> String {
    format!(
        "Your order #{order_id} has been created. Please pay for it.\n\
         You will be notified once the payment arrives. Thank you for your purchase!"
    )
}

pub fn order_paid_notification(order_id: Uuid) -> String {
    format!(
        "🎉 Your order #{order_id} has been paid! We are putting it together and will contact \
         you about delivery soon.\nThank you for your purchase!"
    )
}

pub fn order_canceled_notification(order_id: Uuid) -> String {
    format!(
        "❌ The payment for your order #{order_id} was canceled. If this is a mistake, try \
         placing the order again or contact us."
    )
}

pub fn faq_answer(faq: &Faq) -> String {
    format!(
        "<b>Question:</b> {}\n\n<b>Answer:</b> {}",
        escape_html(&faq.question),
        escape_html(&faq.answer)
    )
}
