use async_trait::async_trait;
use sqlx::{postgres::PgArguments, query::QueryAs, PgPool, Postgres};

use super::{DbResult, PolicyRepository};
use crate::database::models::{Policy, PolicyDetails};
use crate::types::{PolicyId, TenantId};

pub struct PgPolicyRepository {
    pool: PgPool,
}

impl PgPolicyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Binds the editable columns as $3..$20, in the order of the column lists below
fn bind_details<'q>(
    query: QueryAs<'q, Postgres, Policy, PgArguments>,
    details: &'q PolicyDetails,
) -> QueryAs<'q, Postgres, Policy, PgArguments> {
    query
        .bind(&details.provider)
        .bind(&details.policy_name)
        .bind(&details.policy_number)
        .bind(details.policy_type.as_str())
        .bind(&details.country)
        .bind(details.start_date)
        .bind(details.maturity_date)
        .bind(details.next_renewal_date)
        .bind(details.last_premium_date)
        .bind(details.premium)
        .bind(details.premium_currency.as_str())
        .bind(details.premium_frequency.map(|f| f.as_str()))
        .bind(&details.nominee)
        .bind(details.beneficiary_type.map(|b| b.as_str()))
        .bind(&details.paid_to)
        .bind(&details.renewal_status)
        .bind(&details.notes)
        .bind(&details.document)
}

#[async_trait]
impl PolicyRepository for PgPolicyRepository {
    async fn list(&self, tenant: TenantId) -> DbResult<Vec<Policy>> {
        let policies = sqlx::query_as::<_, Policy>(
            "SELECT * FROM policies WHERE tenant_id = $1 ORDER BY created_at DESC",
        )
        .bind(tenant)
        .fetch_all(&self.pool)
        .await?;
        Ok(policies)
    }

    async fn get(&self, tenant: TenantId, id: PolicyId) -> DbResult<Option<Policy>> {
        let policy =
            sqlx::query_as::<_, Policy>("SELECT * FROM policies WHERE id = $1 AND tenant_id = $2")
                .bind(id)
                .bind(tenant)
                .fetch_optional(&self.pool)
                .await?;
        Ok(policy)
    }

    async fn insert(&self, tenant: TenantId, details: PolicyDetails) -> DbResult<Policy> {
        let query = sqlx::query_as::<_, Policy>(
            r#"
            INSERT INTO policies (
                id, tenant_id, provider, policy_name, policy_number, policy_type, country,
                start_date, maturity_date, next_renewal_date, last_premium_date, premium,
                premium_currency, premium_frequency, nominee, beneficiary_type, paid_to,
                renewal_status, notes, document
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            RETURNING *
            "#,
        )
        .bind(PolicyId::new())
        .bind(tenant);

        let policy = bind_details(query, &details).fetch_one(&self.pool).await?;
        Ok(policy)
    }

    async fn update(
        &self,
        tenant: TenantId,
        id: PolicyId,
        details: PolicyDetails,
    ) -> DbResult<Option<Policy>> {
        let query = sqlx::query_as::<_, Policy>(
            r#"
            UPDATE policies SET
                provider = $3, policy_name = $4, policy_number = $5, policy_type = $6,
                country = $7, start_date = $8, maturity_date = $9, next_renewal_date = $10,
                last_premium_date = $11, premium = $12, premium_currency = $13,
                premium_frequency = $14, nominee = $15, beneficiary_type = $16, paid_to = $17,
                renewal_status = $18, notes = $19, document = $20
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant);

        let policy = bind_details(query, &details).fetch_optional(&self.pool).await?;
        Ok(policy)
    }

    async fn delete(&self, tenant: TenantId, id: PolicyId) -> DbResult<Option<Policy>> {
        let policy = sqlx::query_as::<_, Policy>(
            "DELETE FROM policies WHERE id = $1 AND tenant_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(tenant)
        .fetch_optional(&self.pool)
        .await?;
        Ok(policy)
    }
}
