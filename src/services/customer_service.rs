//! Customer Service - customer records and the KYC workflow

use sea_orm::*;

use crate::domain::DomainError;
use crate::models::customer::{
    self, CustomerDto, Entity as Customer, KYC_PENDING, KYC_REJECTED, KYC_SUBMITTED, KYC_VERIFIED,
};

/// Filter parameters for listing customers
#[derive(Debug, Default, Clone)]
pub struct CustomerFilter {
    pub kyc_status: Option<String>,
    /// Free text over first name, last name and email
    pub q: Option<String>,
    pub include_inactive: bool,
}

fn validate(dto: &CustomerDto) -> Result<(), DomainError> {
    if dto.first_name.trim().is_empty() || dto.last_name.trim().is_empty() {
        return Err(DomainError::Validation(
            "First and last name are required".to_string(),
        ));
    }
    if let Some(email) = &dto.email {
        if !email.contains('@') {
            return Err(DomainError::Validation(format!(
                "'{}' is not a valid email address",
                email
            )));
        }
    }
    Ok(())
}

async fn ensure_email_free(
    db: &DatabaseConnection,
    email: Option<&str>,
    exclude_id: Option<i32>,
) -> Result<(), DomainError> {
    let Some(email) = email else {
        return Ok(());
    };

    let mut query = Customer::find().filter(customer::Column::Email.eq(email));
    if let Some(id) = exclude_id {
        query = query.filter(customer::Column::Id.ne(id));
    }

    if query.one(db).await?.is_some() {
        return Err(DomainError::Conflict(format!(
            "A customer with email {} already exists",
            email
        )));
    }
    Ok(())
}

fn normalize_email(email: Option<String>) -> Option<String> {
    email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}

/// List customers, newest first
pub async fn list_customers(
    db: &DatabaseConnection,
    filter: CustomerFilter,
) -> Result<Vec<customer::Model>, DomainError> {
    let mut condition = Condition::all();

    if !filter.include_inactive {
        condition = condition.add(customer::Column::IsActive.eq(true));
    }

    if let Some(status) = filter.kyc_status {
        condition = condition.add(customer::Column::KycStatus.eq(status));
    }

    if let Some(q) = filter.q.filter(|q| !q.trim().is_empty()) {
        let q = q.trim().to_string();
        condition = condition.add(
            Condition::any()
                .add(customer::Column::FirstName.contains(&q))
                .add(customer::Column::LastName.contains(&q))
                .add(customer::Column::Email.contains(&q)),
        );
    }

    let customers = Customer::find()
        .filter(condition)
        .order_by_desc(customer::Column::Id)
        .all(db)
        .await?;

    Ok(customers)
}

pub async fn get_customer(
    db: &DatabaseConnection,
    id: i32,
) -> Result<customer::Model, DomainError> {
    Customer::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Customer"))
}

/// Register a customer, KYC starts as pending
pub async fn create_customer(
    db: &DatabaseConnection,
    mut dto: CustomerDto,
) -> Result<customer::Model, DomainError> {
    dto.email = normalize_email(dto.email);
    validate(&dto)?;
    ensure_email_free(db, dto.email.as_deref(), None).await?;

    let now = chrono::Utc::now().to_rfc3339();
    let new_customer = customer::ActiveModel {
        first_name: Set(dto.first_name.trim().to_string()),
        last_name: Set(dto.last_name.trim().to_string()),
        email: Set(dto.email),
        phone: Set(dto.phone),
        address: Set(dto.address),
        kyc_status: Set(KYC_PENDING.to_string()),
        is_active: Set(true),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let saved = new_customer.insert(db).await?;
    tracing::info!("Registered customer {} ({})", saved.id, saved.full_name());
    Ok(saved)
}

pub async fn update_customer(
    db: &DatabaseConnection,
    id: i32,
    mut dto: CustomerDto,
) -> Result<customer::Model, DomainError> {
    dto.email = normalize_email(dto.email);
    validate(&dto)?;
    let existing = get_customer(db, id).await?;
    ensure_email_free(db, dto.email.as_deref(), Some(id)).await?;

    let mut active: customer::ActiveModel = existing.into();
    active.first_name = Set(dto.first_name.trim().to_string());
    active.last_name = Set(dto.last_name.trim().to_string());
    active.email = Set(dto.email);
    active.phone = Set(dto.phone);
    active.address = Set(dto.address);
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    Ok(active.update(db).await?)
}

/// Soft delete: orders and invoices keep pointing at the record
pub async fn deactivate_customer(
    db: &DatabaseConnection,
    id: i32,
) -> Result<customer::Model, DomainError> {
    let existing = get_customer(db, id).await?;

    let mut active: customer::ActiveModel = existing.into();
    active.is_active = Set(false);
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    Ok(active.update(db).await?)
}

/// Customer hands in identity documents
pub async fn submit_kyc(
    db: &DatabaseConnection,
    id: i32,
    document_type: String,
    document_number: String,
) -> Result<customer::Model, DomainError> {
    if document_type.trim().is_empty() || document_number.trim().is_empty() {
        return Err(DomainError::Validation(
            "Document type and number are required".to_string(),
        ));
    }

    let existing = get_customer(db, id).await?;
    if existing.kyc_status != KYC_PENDING && existing.kyc_status != KYC_REJECTED {
        return Err(DomainError::InvalidState(format!(
            "KYC cannot be submitted while status is '{}'",
            existing.kyc_status
        )));
    }

    let mut active: customer::ActiveModel = existing.into();
    active.kyc_status = Set(KYC_SUBMITTED.to_string());
    active.kyc_document_type = Set(Some(document_type.trim().to_string()));
    active.kyc_document_number = Set(Some(document_number.trim().to_string()));
    active.kyc_rejection_reason = Set(None);
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    let saved = active.update(db).await?;
    tracing::info!("KYC submitted for customer {}", saved.id);
    Ok(saved)
}

/// Staff decision on a submitted KYC file
pub async fn review_kyc(
    db: &DatabaseConnection,
    id: i32,
    approve: bool,
    reason: Option<String>,
) -> Result<customer::Model, DomainError> {
    let existing = get_customer(db, id).await?;
    if existing.kyc_status != KYC_SUBMITTED {
        return Err(DomainError::InvalidState(format!(
            "Only submitted KYC files can be reviewed (status is '{}')",
            existing.kyc_status
        )));
    }

    let reason = reason.filter(|r| !r.trim().is_empty());
    if !approve && reason.is_none() {
        return Err(DomainError::Validation(
            "A rejection reason is required".to_string(),
        ));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let mut active: customer::ActiveModel = existing.into();
    if approve {
        active.kyc_status = Set(KYC_VERIFIED.to_string());
        active.kyc_rejection_reason = Set(None);
    } else {
        active.kyc_status = Set(KYC_REJECTED.to_string());
        active.kyc_rejection_reason = Set(reason);
    }
    active.kyc_reviewed_at = Set(Some(now.clone()));
    active.updated_at = Set(now);

    let saved = active.update(db).await?;
    tracing::info!("KYC for customer {} is now {}", saved.id, saved.kyc_status);
    Ok(saved)
}

/// Orders can only be attached to active, KYC-verified customers
pub fn ensure_can_order(customer: &customer::Model) -> Result<(), DomainError> {
    if !customer.is_active {
        return Err(DomainError::InvalidState(format!(
            "Customer {} is inactive",
            customer.id
        )));
    }
    if !customer.is_kyc_verified() {
        return Err(DomainError::InvalidState(format!(
            "Customer {} has not completed KYC verification (status '{}')",
            customer.id, customer.kyc_status
        )));
    }
    Ok(())
}

pub async fn count_active(db: &DatabaseConnection) -> Result<u64, DomainError> {
    Ok(Customer::find()
        .filter(customer::Column::IsActive.eq(true))
        .count(db)
        .await?)
}

pub async fn count_awaiting_review(db: &DatabaseConnection) -> Result<u64, DomainError> {
    Ok(Customer::find()
        .filter(customer::Column::IsActive.eq(true))
        .filter(customer::Column::KycStatus.eq(KYC_SUBMITTED))
        .count(db)
        .await?)
}
