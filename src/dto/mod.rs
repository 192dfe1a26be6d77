pub mod mailings;
pub mod orders;
