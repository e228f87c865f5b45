//! Repository for the `pricing_rules` table.

use sqlx::PgPool;

use crate::models::pricing_rule::PricingRuleRow;

const COLUMNS: &str = "\
    id, name, description, enabled, priority, conditions, actions, created_at, updated_at";

pub struct PricingRuleRepo;

impl PricingRuleRepo {
    /// Enabled rules in evaluation order.
    pub async fn list_enabled(pool: &PgPool) -> Result<Vec<PricingRuleRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pricing_rules \
             WHERE enabled \
             ORDER BY priority ASC, created_at ASC, id ASC"
        );
        sqlx::query_as::<_, PricingRuleRow>(&query).fetch_all(pool).await
    }
}
