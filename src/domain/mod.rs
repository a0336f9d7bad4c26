//! Domain layer - Pure business abstractions
//!
//! This layer contains NO framework dependencies (no SeaORM entities, no Axum).
//! Only trait definitions, the loyalty rules and domain error types.

pub mod errors;
pub mod loyalty;
pub mod repositories;

pub use errors::DomainError;
pub use loyalty::{resolve_tier, tier_name, Tier, TransactionKind, NO_TIER};
pub use repositories::*;
