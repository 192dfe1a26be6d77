//! Compact `prefix:field:...` encoding for inline button payloads.
//!
//! Telegram caps `callback_data` at 64 bytes, so ids are plain hyphenated
//! UUIDs and every variant stays well under the limit.

use std::{fmt, str::FromStr};

use thiserror::Error;
use uuid::Uuid;

pub const MAX_CALLBACK_DATA_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackTarget {
    MainMenu,
    Cart,
    Faq,
}

impl BackTarget {
    fn as_str(self) -> &'static str {
        match self {
            BackTarget::MainMenu => "main_menu",
            BackTarget::Cart => "cart",
            BackTarget::Faq => "faq",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackData {
    Categories { page: u32 },
    Subcategories { category_id: Uuid, page: u32 },
    Products { subcategory_id: Uuid, offset: u32 },
    Back(BackTarget),
    /// `quantity` is set once the user confirmed the amount.
    AddToCart { product_id: Uuid, quantity: Option<i32> },
    DeleteMode { page: u32 },
    DeleteItem { page: u32, product_id: Uuid },
    ClearCart,
    Checkout,
    ConfirmOrder,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized callback data: {0}")]
pub struct CallbackParseError(String);

impl fmt::Display for CallbackData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackData::Categories { page } => write!(f, "cat:{page}"),
            CallbackData::Subcategories { category_id, page } => {
                write!(f, "subcat:{category_id}:{page}")
            }
            CallbackData::Products {
                subcategory_id,
                offset,
            } => write!(f, "prod:{subcategory_id}:{offset}"),
            CallbackData::Back(target) => write!(f, "back:{}", target.as_str()),
            CallbackData::AddToCart {
                product_id,
                quantity: None,
            } => write!(f, "add_cart:{product_id}"),
            CallbackData::AddToCart {
                product_id,
                quantity: Some(quantity),
            } => write!(f, "add_cart:{product_id}:{quantity}"),
            CallbackData::DeleteMode { page } => write!(f, "del_cart:{page}"),
            CallbackData::DeleteItem { page, product_id } => {
                write!(f, "del_cart:{page}:{product_id}")
            }
            CallbackData::ClearCart => f.write_str("del_cart:all"),
            CallbackData::Checkout => f.write_str("order:0"),
            CallbackData::ConfirmOrder => f.write_str("order:1"),
        }
    }
}

impl FromStr for CallbackData {
    type Err = CallbackParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || CallbackParseError(raw.to_string());
        let parts: Vec<&str> = raw.split(':').collect();

        let parsed = match parts.as_slice() {
            ["cat", page] => CallbackData::Categories {
                page: page.parse().map_err(|_| invalid())?,
            },
            ["subcat", category_id, page] => CallbackData::Subcategories {
                category_id: category_id.parse().map_err(|_| invalid())?,
                page: page.parse().map_err(|_| invalid())?,
            },
            ["prod", subcategory_id, offset] => CallbackData::Products {
                subcategory_id: subcategory_id.parse().map_err(|_| invalid())?,
                offset: offset.parse().map_err(|_| invalid())?,
            },
            ["back", "main_menu"] => CallbackData::Back(BackTarget::MainMenu),
            ["back", "cart"] => CallbackData::Back(BackTarget::Cart),
            ["back", "faq"] => CallbackData::Back(BackTarget::Faq),
            ["add_cart", product_id] => CallbackData::AddToCart {
                product_id: product_id.parse().map_err(|_| invalid())?,
                quantity: None,
            },
            ["add_cart", product_id, quantity] => CallbackData::AddToCart {
                product_id: product_id.parse().map_err(|_| invalid())?,
                quantity: Some(quantity.parse().map_err(|_| invalid())?),
            },
            ["del_cart", "all"] => CallbackData::ClearCart,
            ["del_cart", page] => CallbackData::DeleteMode {
                page: page.parse().map_err(|_| invalid())?,
            },
            ["del_cart", page, product_id] => CallbackData::DeleteItem {
                page: page.parse().map_err(|_| invalid())?,
                product_id: product_id.parse().map_err(|_| invalid())?,
            },
            ["order", "0"] => CallbackData::Checkout,
            ["order", "1"] => CallbackData::ConfirmOrder,
            _ => return Err(invalid()),
        };
        Ok(parsed)
    }
}
