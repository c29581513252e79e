use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{DbResult, InvestmentRepository};
use crate::database::models::{Investment, InvestmentDetails};
use crate::types::{InvestmentId, TenantId};

pub struct PgInvestmentRepository {
    pool: PgPool,
}

impl PgInvestmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvestmentRepository for PgInvestmentRepository {
    async fn list(&self, tenant: TenantId) -> DbResult<Vec<Investment>> {
        let investments = sqlx::query_as::<_, Investment>(
            "SELECT * FROM investments WHERE tenant_id = $1 ORDER BY created_at DESC",
        )
        .bind(tenant)
        .fetch_all(&self.pool)
        .await?;
        Ok(investments)
    }

    async fn get(&self, tenant: TenantId, id: InvestmentId) -> DbResult<Option<Investment>> {
        let investment = sqlx::query_as::<_, Investment>(
            "SELECT * FROM investments WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant)
        .fetch_optional(&self.pool)
        .await?;
        Ok(investment)
    }

    async fn insert(&self, tenant: TenantId, details: InvestmentDetails) -> DbResult<Investment> {
        let investment = sqlx::query_as::<_, Investment>(
            r#"
            INSERT INTO investments (
                id, tenant_id, asset_type, platform, country, currency,
                initial_amount, current_value, shares, purchase_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(InvestmentId::new())
        .bind(tenant)
        .bind(details.asset_type.as_str())
        .bind(&details.platform)
        .bind(&details.country)
        .bind(details.currency.as_str())
        .bind(details.initial_amount)
        .bind(details.current_value)
        .bind(details.shares)
        .bind(details.purchase_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(investment)
    }

    async fn update(
        &self,
        tenant: TenantId,
        id: InvestmentId,
        details: InvestmentDetails,
        now: DateTime<Utc>,
    ) -> DbResult<Option<Investment>> {
        let investment = sqlx::query_as::<_, Investment>(
            r#"
            UPDATE investments SET
                asset_type = $3, platform = $4, country = $5, currency = $6,
                initial_amount = $7, current_value = $8, shares = $9, purchase_date = $10,
                last_updated = GREATEST(last_updated, $11)
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant)
        .bind(details.asset_type.as_str())
        .bind(&details.platform)
        .bind(&details.country)
        .bind(details.currency.as_str())
        .bind(details.initial_amount)
        .bind(details.current_value)
        .bind(details.shares)
        .bind(details.purchase_date)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(investment)
    }

    async fn delete(&self, tenant: TenantId, id: InvestmentId) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM investments WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
