use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::auth::login,
        api::loyalty::list_tiers,
        api::loyalty::create_tier,
        api::loyalty::update_tier,
        api::loyalty::delete_tier,
        api::loyalty::recalculate_tiers,
        api::loyalty::resolve_tier,
        api::loyalty::open_account,
        api::loyalty::get_account,
        api::loyalty::list_transactions,
        api::loyalty::create_transaction,
        api::loyalty::redeem,
        api::loyalty::list_rewards,
        api::orders::create_order,
        api::orders::list_orders,
        api::orders::get_order,
        api::orders::cancel_order,
        api::invoices::list_invoices,
        api::invoices::get_invoice,
    ),
    tags(
        (name = "retail-pos", description = "Retail POS, inventory and loyalty API")
    )
)]
pub struct ApiDoc;
