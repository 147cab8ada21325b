pub mod addresses;
pub mod cart_items;
pub mod credit_cards;
pub mod disabled_users;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod promotion_slots;
pub mod users;

pub use addresses::Entity as Addresses;
pub use cart_items::Entity as CartItems;
pub use credit_cards::Entity as CreditCards;
pub use disabled_users::Entity as DisabledUsers;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use promotion_slots::Entity as PromotionSlots;
pub use users::Entity as Users;
