pub mod account_service;
pub mod cart_service;
pub mod checkout_service;
pub mod employee_service;
pub mod order_service;
pub mod promotion_service;

mod convert;
