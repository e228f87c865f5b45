//! Repository for the `orders` table.

use sqlx::PgPool;
use wardrobe_core::types::DbId;

use crate::models::order::{CreateOrder, Order, ORDER_STATUS_PLACED};

const COLUMNS: &str = "\
    id, reference, wardrobe_id, customer_id, destination, snapshot, cut_list, \
    adjustments, base_total, final_price, status, created_at, updated_at";

pub struct OrderRepo;

impl OrderRepo {
    /// Insert an order with a fresh time-ordered reference.
    pub async fn create(pool: &PgPool, input: &CreateOrder) -> Result<Order, sqlx::Error> {
        let query = format!(
            "INSERT INTO orders \
                 (reference, wardrobe_id, customer_id, destination, snapshot, cut_list, \
                  adjustments, base_total, final_price, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(uuid::Uuid::now_v7())
            .bind(input.wardrobe_id)
            .bind(input.customer_id)
            .bind(&input.destination)
            .bind(&input.snapshot)
            .bind(&input.cut_list)
            .bind(&input.adjustments)
            .bind(input.base_total)
            .bind(input.final_price)
            .bind(ORDER_STATUS_PLACED)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Orders previously placed by a customer.
    pub async fn count_for_customer(pool: &PgPool, customer_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
