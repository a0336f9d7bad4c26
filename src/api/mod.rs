pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod invoices;
pub mod loyalty;
pub mod messages;
pub mod orders;
pub mod products;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/me", get(auth::me))
        .route("/users", get(auth::list_users))
        // Customers & KYC
        .route(
            "/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/customers/:id",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
        .route("/customers/:id/kyc", post(customers::submit_kyc))
        .route("/customers/:id/kyc/review", post(customers::review_kyc))
        .route("/customers/:id/loyalty", get(customers::get_customer_loyalty))
        // Catalog & inventory
        .route("/products/low-stock", get(products::low_stock))
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/products/:id/stock", post(products::adjust_stock))
        // Checkout
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route("/orders/:id", get(orders::get_order))
        .route("/orders/:id/cancel", post(orders::cancel_order))
        // Invoices
        .route("/invoices", get(invoices::list_invoices))
        .route("/invoices/:id", get(invoices::get_invoice))
        // Loyalty
        .route(
            "/loyalty/tiers",
            get(loyalty::list_tiers).post(loyalty::create_tier),
        )
        .route("/loyalty/tiers/resolve", get(loyalty::resolve_tier))
        .route("/loyalty/tiers/recalculate", post(loyalty::recalculate_tiers))
        .route(
            "/loyalty/tiers/:id",
            put(loyalty::update_tier).delete(loyalty::delete_tier),
        )
        .route("/loyalty/accounts", post(loyalty::open_account))
        .route("/loyalty/accounts/:id", get(loyalty::get_account))
        .route(
            "/loyalty/accounts/:id/transactions",
            get(loyalty::list_transactions).post(loyalty::create_transaction),
        )
        .route("/loyalty/accounts/:id/redeem", post(loyalty::redeem))
        .route(
            "/loyalty/rewards",
            get(loyalty::list_rewards).post(loyalty::create_reward),
        )
        .route(
            "/loyalty/rewards/:id",
            put(loyalty::update_reward).delete(loyalty::delete_reward),
        )
        // Staff messaging
        .route("/messages", get(messages::inbox).post(messages::send))
        .route("/messages/sent", get(messages::sent))
        .route("/messages/:id/read", post(messages::mark_read))
        // Admin dashboard
        .route("/dashboard/summary", get(dashboard::summary))
        .with_state(state)
}
