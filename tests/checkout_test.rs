use retail_pos::config::StoreSettings;
use retail_pos::db;
use retail_pos::domain::DomainError;
use retail_pos::infrastructure::AppState;
use retail_pos::models::product::ProductDto;
use retail_pos::models::{customer, order, user};
use retail_pos::services::order_service::{self, OrderLineInput, PlaceOrderInput};
use retail_pos::services::{product_service, LoyaltyService};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set, Statement,
};
use std::path::PathBuf;

async fn insert_staff(db: &DatabaseConnection) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    user::ActiveModel {
        username: Set("cashier".to_string()),
        password_hash: Set("not-a-real-hash".to_string()),
        role: Set(user::ROLE_STAFF.to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create user")
    .id
}

async fn insert_verified_customer(db: &DatabaseConnection) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    customer::ActiveModel {
        first_name: Set("Ada".to_string()),
        last_name: Set("Lovelace".to_string()),
        kyc_status: Set(customer::KYC_VERIFIED.to_string()),
        is_active: Set(true),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create customer")
    .id
}

async fn create_product(db: &DatabaseConnection, sku: &str, price: f64, stock: i32) -> i32 {
    product_service::create_product(
        db,
        ProductDto {
            sku: sku.to_string(),
            name: format!("Product {}", sku),
            description: None,
            category: None,
            price,
            stock_quantity: stock,
            low_stock_threshold: None,
            is_active: None,
        },
    )
    .await
    .expect("Failed to create product")
    .id
}

fn single_line(customer_id: Option<i32>, product_id: i32) -> PlaceOrderInput {
    PlaceOrderInput {
        customer_id,
        items: vec![OrderLineInput {
            product_id,
            quantity: 1,
        }],
        notes: None,
    }
}

/// Removes the database file and its journals when the test ends
struct TempDb(PathBuf);

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut path = self.0.clone().into_os_string();
            path.push(suffix);
            let _ = std::fs::remove_file(path);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_cancels_restock_once() {
    let path = std::env::temp_dir().join(format!("retail_pos_cancel_{}.db", uuid::Uuid::new_v4()));
    let _cleanup = TempDb(path.clone());
    let db = db::init_db(&format!("sqlite://{}?mode=rwc", path.display()))
        .await
        .expect("Failed to init DB");

    let state = AppState::new(db.clone());
    let loyalty: LoyaltyService = state.loyalty();
    let settings = StoreSettings::default();
    let staff_id = insert_staff(&db).await;
    let product_id = create_product(&db, "RACE-1", 4.0, 10).await;

    let mut order_ids = Vec::new();
    let mut cancelled = 0;
    for _ in 0..10 {
        let placed = order_service::place_order(
            &db,
            &loyalty,
            &settings,
            staff_id,
            single_line(None, product_id),
        )
        .await
        .expect("order placed");
        let id = placed.order.id;
        order_ids.push(id);

        let (first, second) = tokio::join!(
            order_service::cancel_order(&db, &loyalty, id),
            order_service::cancel_order(&db, &loyalty, id)
        );
        let succeeded = [first.is_ok(), second.is_ok()]
            .iter()
            .filter(|ok| **ok)
            .count();
        assert!(succeeded <= 1, "order {} was cancelled twice", id);
        cancelled += succeeded;
    }
    assert!(cancelled > 0);

    let mut still_completed = 0;
    for id in &order_ids {
        let stored = order::Entity::find_by_id(*id)
            .one(&db)
            .await
            .unwrap()
            .expect("order exists");
        if stored.status == order::STATUS_COMPLETED {
            still_completed += 1;
        }
    }
    assert_eq!(cancelled + still_completed, order_ids.len());

    let product = product_service::get_product(&db, product_id).await.unwrap();
    assert_eq!(product.stock_quantity, 10 - still_completed as i32);
}

#[tokio::test]
async fn test_cancel_twice_is_refused_without_restock() {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let loyalty = AppState::new(db.clone()).loyalty();
    let staff_id = insert_staff(&db).await;
    let product_id = create_product(&db, "ONCE-1", 3.0, 5).await;

    let placed = order_service::place_order(
        &db,
        &loyalty,
        &StoreSettings::default(),
        staff_id,
        single_line(None, product_id),
    )
    .await
    .unwrap();

    order_service::cancel_order(&db, &loyalty, placed.order.id)
        .await
        .unwrap();
    let again = order_service::cancel_order(&db, &loyalty, placed.order.id).await;
    assert!(matches!(again, Err(DomainError::InvalidState(_))));

    let missing = order_service::cancel_order(&db, &loyalty, 9999).await;
    assert!(matches!(missing, Err(DomainError::NotFound(_))));

    let product = product_service::get_product(&db, product_id).await.unwrap();
    assert_eq!(product.stock_quantity, 5);
}

#[tokio::test]
async fn test_committed_sale_survives_points_bookkeeping_failure() {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let loyalty = AppState::new(db.clone()).loyalty();
    let staff_id = insert_staff(&db).await;
    let customer_id = insert_verified_customer(&db).await;
    let product_id = create_product(&db, "PTS-1", 40.0, 3).await;

    // Any later write of points_earned on an order fails
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "CREATE TRIGGER orders_points_frozen BEFORE UPDATE OF points_earned ON orders \
         BEGIN SELECT RAISE(ABORT, 'points_earned is frozen'); END"
            .to_owned(),
    ))
    .await
    .expect("Failed to create trigger");

    let placed = order_service::place_order(
        &db,
        &loyalty,
        &StoreSettings::default(),
        staff_id,
        single_line(Some(customer_id), product_id),
    )
    .await
    .expect("sale is reported even though points_earned could not be stored");

    assert_eq!(placed.order.points_earned, 40);
    let outcome = placed.loyalty.expect("points awarded");
    assert_eq!(outcome.account.points_balance, 40);

    let stored = order::Entity::find_by_id(placed.order.id)
        .one(&db)
        .await
        .unwrap()
        .expect("order exists");
    assert_eq!(stored.status, order::STATUS_COMPLETED);
    assert_eq!(stored.points_earned, 0);

    let product = product_service::get_product(&db, product_id).await.unwrap();
    assert_eq!(product.stock_quantity, 2);
}
