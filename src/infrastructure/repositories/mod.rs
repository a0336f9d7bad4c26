//! Repository implementations using SeaORM

pub mod account_repository;
pub mod tier_repository;

pub use account_repository::SeaOrmAccountRepository;
pub use tier_repository::SeaOrmTierRepository;
