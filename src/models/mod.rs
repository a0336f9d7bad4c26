pub mod customer;
pub mod invoice;
pub mod loyalty_account;
pub mod loyalty_reward;
pub mod loyalty_tier;
pub mod loyalty_transaction;
pub mod message;
pub mod order;
pub mod order_item;
pub mod product;
pub mod user;
