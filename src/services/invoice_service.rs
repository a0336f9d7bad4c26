//! Invoice Service - invoices issued for orders
//!
//! Invoices are structured documents; rendering them (PDF, print) is left
//! to the client.

use sea_orm::*;
use serde::Serialize;

use crate::domain::DomainError;
use crate::models::customer::Entity as Customer;
use crate::models::invoice::{self, Entity as Invoice, STATUS_ISSUED, STATUS_VOID};
use crate::models::order::{self, Entity as Order};
use crate::models::order_item::{self, Entity as OrderItem};

/// Filter parameters for listing invoices
#[derive(Debug, Default, Clone)]
pub struct InvoiceFilter {
    pub customer_id: Option<i32>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceCustomer {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceLine {
    pub product_id: i32,
    pub description: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub line_total: f64,
}

/// Everything a client needs to print an invoice
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDocument {
    #[serde(flatten)]
    pub invoice: invoice::Model,
    pub order_reference: String,
    pub customer: Option<InvoiceCustomer>,
    pub lines: Vec<InvoiceLine>,
}

/// INV-YYYYMMDD-NNNNNN, the suffix is the zero-padded order id
pub fn invoice_number(order: &order::Model, issued_on: chrono::NaiveDate) -> String {
    format!("INV-{}-{:06}", issued_on.format("%Y%m%d"), order.id)
}

/// Issue the invoice for a freshly placed order (runs inside the checkout transaction)
pub async fn issue_invoice<C: ConnectionTrait>(
    conn: &C,
    order: &order::Model,
) -> Result<invoice::Model, DomainError> {
    let now = chrono::Utc::now();

    let new_invoice = invoice::ActiveModel {
        invoice_number: Set(invoice_number(order, now.date_naive())),
        order_id: Set(order.id),
        customer_id: Set(order.customer_id),
        subtotal: Set(order.subtotal),
        tax: Set(order.tax),
        total: Set(order.total),
        status: Set(STATUS_ISSUED.to_string()),
        issued_at: Set(now.to_rfc3339()),
        updated_at: Set(now.to_rfc3339()),
        ..Default::default()
    };

    Ok(new_invoice.insert(conn).await?)
}

/// Void the invoice of a cancelled order
pub async fn void_for_order<C: ConnectionTrait>(
    conn: &C,
    order_id: i32,
) -> Result<Option<invoice::Model>, DomainError> {
    let Some(existing) = Invoice::find()
        .filter(invoice::Column::OrderId.eq(order_id))
        .one(conn)
        .await?
    else {
        return Ok(None);
    };

    let mut active: invoice::ActiveModel = existing.into();
    active.status = Set(STATUS_VOID.to_string());
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());
    Ok(Some(active.update(conn).await?))
}

pub async fn list_invoices(
    db: &DatabaseConnection,
    filter: InvoiceFilter,
) -> Result<Vec<invoice::Model>, DomainError> {
    let mut condition = Condition::all();
    if let Some(customer_id) = filter.customer_id {
        condition = condition.add(invoice::Column::CustomerId.eq(customer_id));
    }
    if let Some(status) = filter.status {
        condition = condition.add(invoice::Column::Status.eq(status));
    }

    Ok(Invoice::find()
        .filter(condition)
        .order_by_desc(invoice::Column::Id)
        .all(db)
        .await?)
}

pub async fn find_by_order(
    db: &DatabaseConnection,
    order_id: i32,
) -> Result<Option<invoice::Model>, DomainError> {
    Ok(Invoice::find()
        .filter(invoice::Column::OrderId.eq(order_id))
        .one(db)
        .await?)
}

pub async fn get_invoice_document(
    db: &DatabaseConnection,
    id: i32,
) -> Result<InvoiceDocument, DomainError> {
    let invoice = Invoice::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Invoice"))?;

    let order = Order::find_by_id(invoice.order_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            DomainError::Internal(format!("Invoice {} has no order", invoice.invoice_number))
        })?;

    let customer = match invoice.customer_id {
        Some(customer_id) => Customer::find_by_id(customer_id)
            .one(db)
            .await?
            .map(|c| InvoiceCustomer {
                id: c.id,
                name: c.full_name(),
                email: c.email,
                address: c.address,
            }),
        None => None,
    };

    let lines = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order.id))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|item| InvoiceLine {
            product_id: item.product_id,
            description: item.product_name,
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total,
        })
        .collect();

    Ok(InvoiceDocument {
        invoice,
        order_reference: order.reference,
        customer,
        lines,
    })
}
