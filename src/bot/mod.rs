//! Conversational surface: routes Telegram updates to handlers.

pub mod callback;
pub mod dispatcher;
pub mod handlers;
pub mod keyboards;
pub mod reply;
pub mod texts;

pub use dispatcher::dispatch;

/// Page size for every paginated list and product batch.
pub const ITEMS_PER_PAGE: usize = 5;
