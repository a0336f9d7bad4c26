//! Services Layer
//!
//! This module contains business logic extracted from HTTP handlers.
//! Handlers stay thin: parse input, call a service, map the result.

pub mod customer_service;
pub mod dashboard_service;
pub mod invoice_service;
pub mod loyalty_service;
pub mod message_service;
pub mod order_service;
pub mod product_service;
pub mod reward_service;
pub mod user_service;

pub use loyalty_service::LoyaltyService;
