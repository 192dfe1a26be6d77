pub mod cart_service;
pub mod catalog_service;
pub mod checkout_service;
pub mod export_service;
pub mod faq_service;
pub mod mailing_service;
pub mod order_service;
pub mod subscription_service;
pub mod user_service;
pub mod webhook_service;
