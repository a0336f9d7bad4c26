//! Order Service - checkout and cancellation
//!
//! Stock, order lines and the invoice are written in one database
//! transaction. Loyalty points are applied after the commit.

use sea_orm::sea_query::Expr;
use sea_orm::*;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::infrastructure::config::StoreSettings;
use crate::models::customer::Entity as Customer;
use crate::models::invoice;
use crate::models::order::{self, Entity as Order, STATUS_CANCELLED, STATUS_COMPLETED};
use crate::models::order_item::{self, Entity as OrderItem};
use crate::models::product::{self, Entity as Product};
use crate::services::loyalty_service::{LoyaltyService, PointsOutcome};
use crate::services::{customer_service, invoice_service};

/// One cart line
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLineInput {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderInput {
    /// None for walk-in sales
    pub customer_id: Option<i32>,
    pub items: Vec<OrderLineInput>,
    pub notes: Option<String>,
}

/// Filter parameters for listing orders
#[derive(Debug, Default, Clone)]
pub struct OrderFilter {
    pub customer_id: Option<i32>,
    pub status: Option<String>,
}

/// Order with its lines and related labels
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithDetails {
    #[serde(flatten)]
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
    pub customer_name: Option<String>,
    pub invoice_number: Option<String>,
}

/// Result of a checkout
#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
    pub invoice: invoice::Model,
    pub loyalty: Option<PointsOutcome>,
}

pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Reject empty carts and bad quantities, fold repeated products into one line
fn consolidate_lines(items: &[OrderLineInput]) -> Result<Vec<OrderLineInput>, DomainError> {
    if items.is_empty() {
        return Err(DomainError::Validation(
            "An order needs at least one item".to_string(),
        ));
    }

    let mut lines: Vec<OrderLineInput> = Vec::with_capacity(items.len());
    for item in items {
        if item.quantity <= 0 {
            return Err(DomainError::Validation(format!(
                "Quantity for product {} must be positive",
                item.product_id
            )));
        }
        match lines.iter_mut().find(|l| l.product_id == item.product_id) {
            Some(line) => {
                line.quantity = line.quantity.checked_add(item.quantity).ok_or_else(|| {
                    DomainError::Validation("Quantity is out of range".to_string())
                })?
            }
            None => lines.push(item.clone()),
        }
    }
    Ok(lines)
}

pub async fn place_order(
    db: &DatabaseConnection,
    loyalty: &LoyaltyService,
    settings: &StoreSettings,
    staff_user_id: i32,
    input: PlaceOrderInput,
) -> Result<PlacedOrder, DomainError> {
    let lines = consolidate_lines(&input.items)?;

    if let Some(customer_id) = input.customer_id {
        let customer = customer_service::get_customer(db, customer_id).await?;
        customer_service::ensure_can_order(&customer)?;
    }

    let now = chrono::Utc::now().to_rfc3339();
    let txn = db.begin().await?;

    // 1. Check and reserve stock, price each line
    let mut priced: Vec<(product::Model, i32, f64)> = Vec::with_capacity(lines.len());
    for line in &lines {
        let product = Product::find_by_id(line.product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Product {}", line.product_id)))?;

        if !product.is_active {
            return Err(DomainError::InvalidState(format!(
                "{} is no longer sold",
                product.name
            )));
        }
        if product.stock_quantity < line.quantity {
            return Err(DomainError::InvalidState(format!(
                "Insufficient stock for {}: {} requested, {} available",
                product.name, line.quantity, product.stock_quantity
            )));
        }

        let line_total = round_cents(product.price * line.quantity as f64);

        let mut stock: product::ActiveModel = product.clone().into();
        stock.stock_quantity = Set(product.stock_quantity - line.quantity);
        stock.updated_at = Set(now.clone());
        stock.update(&txn).await?;

        priced.push((product, line.quantity, line_total));
    }

    // 2. Totals
    let subtotal = round_cents(priced.iter().map(|(_, _, total)| total).sum());
    let tax = round_cents(subtotal * settings.tax_rate);
    let total = round_cents(subtotal + tax);

    // 3. Order and lines
    let order = order::ActiveModel {
        reference: Set(uuid::Uuid::new_v4().to_string()),
        customer_id: Set(input.customer_id),
        staff_user_id: Set(staff_user_id),
        status: Set(STATUS_COMPLETED.to_string()),
        subtotal: Set(subtotal),
        tax: Set(tax),
        total: Set(total),
        points_earned: Set(0),
        notes: Set(input.notes),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(priced.len());
    for (product, quantity, line_total) in priced {
        let item = order_item::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(product.id),
            product_name: Set(product.name),
            quantity: Set(quantity),
            unit_price: Set(product.price),
            line_total: Set(line_total),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        items.push(item);
    }

    // 4. Invoice
    let invoice = invoice_service::issue_invoice(&txn, &order).await?;

    txn.commit().await?;
    tracing::info!(
        "Order {} placed by user {}: {} lines, total {:.2}, invoice {}",
        order.id,
        staff_user_id,
        items.len(),
        order.total,
        invoice.invoice_number
    );

    // 5. Loyalty points for identified customers
    let mut order = order;
    let mut loyalty_outcome = None;
    if let Some(customer_id) = order.customer_id {
        match loyalty
            .earn_for_order(
                customer_id,
                order.id,
                order.total,
                settings.points_per_currency_unit,
            )
            .await
        {
            Ok(Some(outcome)) => {
                let points = outcome.transaction.points;
                let mut active: order::ActiveModel = order.clone().into();
                active.points_earned = Set(points);
                match active.update(db).await {
                    Ok(updated) => order = updated,
                    // The sale is already committed
                    Err(e) => {
                        tracing::error!(
                            "Failed to record {} earned points on order {}: {}",
                            points,
                            order.id,
                            e
                        );
                        order.points_earned = points;
                    }
                }
                loyalty_outcome = Some(outcome);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!("Failed to award points for order {}: {}", order.id, e);
            }
        }
    }

    Ok(PlacedOrder {
        order,
        items,
        invoice,
        loyalty: loyalty_outcome,
    })
}

/// Cancel a completed order: restock, void the invoice, take back points
///
/// The status flip is a conditional update inside the transaction, so of two
/// concurrent cancels only one restocks.
pub async fn cancel_order(
    db: &DatabaseConnection,
    loyalty: &LoyaltyService,
    id: i32,
) -> Result<OrderWithDetails, DomainError> {
    let now = chrono::Utc::now().to_rfc3339();
    let txn = db.begin().await?;

    let claimed = Order::update_many()
        .col_expr(order::Column::Status, Expr::value(STATUS_CANCELLED))
        .col_expr(order::Column::UpdatedAt, Expr::value(now.clone()))
        .filter(order::Column::Id.eq(id))
        .filter(order::Column::Status.eq(STATUS_COMPLETED))
        .exec(&txn)
        .await?;

    let order = Order::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| DomainError::not_found("Order"))?;

    if claimed.rows_affected == 0 {
        return Err(DomainError::InvalidState(format!(
            "Order is already {}",
            order.status
        )));
    }

    let items = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order.id))
        .all(&txn)
        .await?;

    for item in &items {
        if let Some(product) = Product::find_by_id(item.product_id).one(&txn).await? {
            let restocked = product.stock_quantity + item.quantity;
            let mut active: product::ActiveModel = product.into();
            active.stock_quantity = Set(restocked);
            active.updated_at = Set(now.clone());
            active.update(&txn).await?;
        }
    }

    invoice_service::void_for_order(&txn, order.id).await?;

    txn.commit().await?;
    tracing::info!("Order {} cancelled", order.id);

    if let Some(customer_id) = order.customer_id {
        if let Err(e) = loyalty
            .reverse_order(customer_id, order.id, order.points_earned)
            .await
        {
            tracing::error!("Failed to reverse points for order {}: {}", order.id, e);
        }
    }

    get_order(db, id).await
}

/// List orders, newest first
pub async fn list_orders(
    db: &DatabaseConnection,
    filter: OrderFilter,
) -> Result<Vec<order::Model>, DomainError> {
    let mut condition = Condition::all();
    if let Some(customer_id) = filter.customer_id {
        condition = condition.add(order::Column::CustomerId.eq(customer_id));
    }
    if let Some(status) = filter.status {
        condition = condition.add(order::Column::Status.eq(status));
    }

    Ok(Order::find()
        .filter(condition)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await?)
}

pub async fn get_order(db: &DatabaseConnection, id: i32) -> Result<OrderWithDetails, DomainError> {
    let (order, customer) = Order::find_by_id(id)
        .find_also_related(Customer)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Order"))?;

    let items = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order.id))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await?;

    let invoice_number = invoice_service::find_by_order(db, order.id)
        .await?
        .map(|i| i.invoice_number);

    Ok(OrderWithDetails {
        order,
        items,
        customer_name: customer.map(|c| c.full_name()),
        invoice_number,
    })
}

/// Completed order count and revenue
pub async fn sales_totals(db: &DatabaseConnection) -> Result<(u64, f64), DomainError> {
    let completed = Order::find()
        .filter(order::Column::Status.eq(STATUS_COMPLETED))
        .all(db)
        .await?;

    let revenue = round_cents(completed.iter().map(|o| o.total).sum());
    Ok((completed.len() as u64, revenue))
}
