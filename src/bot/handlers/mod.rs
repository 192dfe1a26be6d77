pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod faq;
pub mod start;
