pub mod cart_items;
pub mod categories;
pub mod faqs;
pub mod mailings;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod subcategories;
pub mod users;

pub use cart_items::Entity as CartItems;
pub use categories::Entity as Categories;
pub use faqs::Entity as Faqs;
pub use mailings::Entity as Mailings;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use subcategories::Entity as Subcategories;
pub use users::Entity as Users;
