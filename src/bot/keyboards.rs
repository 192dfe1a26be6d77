use uuid::Uuid;

use super::{
    ITEMS_PER_PAGE,
    callback::{BackTarget, CallbackData},
    texts,
};
use crate::{
    entity::{categories::Model as Category, subcategories::Model as Subcategory},
    services::cart_service::CartLine,
    telegram::{InlineKeyboardButton as Button, InlineKeyboardMarkup as Keyboard},
};

fn button(text: impl Into<String>, data: CallbackData) -> Button {
    Button::callback(text, data.to_string())
}

fn page_bounds(page: u32, len: usize) -> (usize, usize) {
    let start = (page as usize).saturating_mul(ITEMS_PER_PAGE).min(len);
    let end = (start + ITEMS_PER_PAGE).min(len);
    (start, end)
}

fn nav_row(page: u32, has_next: bool, to_page: impl Fn(u32) -> CallbackData) -> Vec<Button> {
    let mut row = Vec::new();
    if page > 0 {
        row.push(button(texts::PAGINATION_PREV_BUTTON, to_page(page - 1)));
    }
    if has_next {
        row.push(button(texts::PAGINATION_NEXT_BUTTON, to_page(page + 1)));
    }
    row
}

pub fn main_menu() -> Keyboard {
    Keyboard::default()
        .button(button(
            texts::MAIN_MENU_CATALOG_BUTTON,
            CallbackData::Categories { page: 0 },
        ))
        .button(button(
            texts::MAIN_MENU_CART_BUTTON,
            CallbackData::Back(BackTarget::Cart),
        ))
        .button(button(
            texts::MAIN_MENU_FAQ_BUTTON,
            CallbackData::Back(BackTarget::Faq),
        ))
}

pub fn back_to_main_menu() -> Keyboard {
    Keyboard::default().button(button(
        texts::BACK_TO_MENU_BUTTON,
        CallbackData::Back(BackTarget::MainMenu),
    ))
}

/// Public chats (`@name`) get a join link; every prompt ends with a re-check button.
pub fn subscription(chat_ids: &[String]) -> Keyboard {
    let mut keyboard = Keyboard::default();
    for chat_id in chat_ids {
        if let Some(name) = chat_id.strip_prefix('@') {
            keyboard = keyboard.button(Button::url(
                format!("👉 {chat_id}"),
                format!("https://t.me/{name}"),
            ));
        }
    }
    keyboard.button(button(
        texts::SUBSCRIPTION_CHECK_BUTTON,
        CallbackData::Back(BackTarget::MainMenu),
    ))
}

pub fn categories(categories: &[Category], page: u32) -> Keyboard {
    let (start, end) = page_bounds(page, categories.len());
    let mut keyboard = Keyboard::default();
    for category in &categories[start..end] {
        keyboard = keyboard.button(button(
            category.name.clone(),
            CallbackData::Subcategories {
                category_id: category.id,
                page: 0,
            },
        ));
    }
    keyboard
        .row(nav_row(page, end < categories.len(), |page| {
            CallbackData::Categories { page }
        }))
        .button(button(
            texts::BACK_TO_MENU_BUTTON,
            CallbackData::Back(BackTarget::MainMenu),
        ))
}

pub fn subcategories(category_id: Uuid, subcategories: &[Subcategory], page: u32) -> Keyboard {
    let (start, end) = page_bounds(page, subcategories.len());
    let mut keyboard = Keyboard::default();
    for subcategory in &subcategories[start..end] {
        keyboard = keyboard.button(button(
            subcategory.name.clone(),
            CallbackData::Products {
                subcategory_id: subcategory.id,
                offset: 0,
            },
        ));
    }
    keyboard
        .row(nav_row(page, end < subcategories.len(), |page| {
            CallbackData::Subcategories { category_id, page }
        }))
        .button(button(
            texts::BACK_TO_CATEGORIES_BUTTON,
            CallbackData::Categories { page: 0 },
        ))
}

pub fn products_nav(subcategory: &Subcategory, has_more: bool, offset: u32) -> Keyboard {
    let mut keyboard = Keyboard::default();
    if has_more {
        keyboard = keyboard.button(button(
            texts::SHOW_MORE_BUTTON,
            CallbackData::Products {
                subcategory_id: subcategory.id,
                offset: offset + ITEMS_PER_PAGE as u32,
            },
        ));
    }
    keyboard.button(button(
        texts::BACK_TO_SUBCATEGORIES_BUTTON,
        CallbackData::Subcategories {
            category_id: subcategory.category_id,
            page: 0,
        },
    ))
}

pub fn product_card(product_id: Uuid) -> Keyboard {
    Keyboard::default().button(button(
        texts::ADD_TO_CART_BUTTON,
        CallbackData::AddToCart {
            product_id,
            quantity: None,
        },
    ))
}

pub fn confirm_quantity(product_id: Uuid, quantity: i32, category_id: Uuid) -> Keyboard {
    Keyboard::default().row(vec![
        button(
            texts::CONFIRM_BUTTON,
            CallbackData::AddToCart {
                product_id,
                quantity: Some(quantity),
            },
        ),
        button(
            texts::CANCEL_BUTTON,
            CallbackData::Subcategories {
                category_id,
                page: 0,
            },
        ),
    ])
}

pub fn cart_main() -> Keyboard {
    Keyboard::default()
        .button(button(
            texts::CART_DELETE_BUTTON,
            CallbackData::DeleteMode { page: 0 },
        ))
        .button(button(texts::CART_CLEAR_ALL_BUTTON, CallbackData::ClearCart))
        .button(button(texts::CART_CHECKOUT_BUTTON, CallbackData::Checkout))
        .button(button(
            texts::BACK_TO_MENU_BUTTON,
            CallbackData::Back(BackTarget::MainMenu),
        ))
}

pub fn delete_mode(lines: &[CartLine], page: u32) -> Keyboard {
    let (start, end) = page_bounds(page, lines.len());
    let mut keyboard = Keyboard::default();
    for line in &lines[start..end] {
        keyboard = keyboard.button(button(
            texts::remove_item_button(line),
            CallbackData::DeleteItem {
                page,
                product_id: line.product_id,
            },
        ));
    }
    keyboard
        .row(nav_row(page, end < lines.len(), |page| {
            CallbackData::DeleteMode { page }
        }))
        .button(button(
            texts::CART_FINISH_DELETE_BUTTON,
            CallbackData::Back(BackTarget::Cart),
        ))
}

pub fn checkout_cancel() -> Keyboard {
    Keyboard::default().button(button(
        texts::CANCEL_BUTTON,
        CallbackData::Back(BackTarget::Cart),
    ))
}

pub fn checkout_confirm() -> Keyboard {
    Keyboard::default()
        .button(button(texts::CONFIRM_BUTTON, CallbackData::ConfirmOrder))
        .button(button(
            texts::CANCEL_BUTTON,
            CallbackData::Back(BackTarget::Cart),
        ))
}

pub fn payment(confirmation_url: &str) -> Keyboard {
    Keyboard::default().button(Button::url(texts::PAYMENT_BUTTON, confirmation_url))
}

pub fn faq_entry() -> Keyboard {
    Keyboard::default()
        .button(Button::inline_search(texts::FAQ_TRY_BUTTON, ""))
        .button(button(
            texts::BACK_TO_MENU_BUTTON,
            CallbackData::Back(BackTarget::MainMenu),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            position: 0,
        }
    }

    #[test]
    fn category_pages_hold_five_entries_and_navigation() {
        let all: Vec<Category> = (0..7).map(|i| category(&format!("c{i}"))).collect();

        let first = categories(&all, 0);
        // 5 entries, a "next" row and the back button.
        assert_eq!(first.inline_keyboard.len(), 7);
        assert_eq!(first.inline_keyboard[5].len(), 1);
        assert_eq!(first.inline_keyboard[5][0].text, texts::PAGINATION_NEXT_BUTTON);

        let second = categories(&all, 1);
        assert_eq!(second.inline_keyboard.len(), 4);
        assert_eq!(second.inline_keyboard[2][0].text, texts::PAGINATION_PREV_BUTTON);
    }

    #[test]
    fn out_of_range_pages_render_only_navigation() {
        let all = vec![category("only")];
        let keyboard = categories(&all, 9);
        assert_eq!(keyboard.inline_keyboard.len(), 2);
    }
}
