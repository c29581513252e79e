use async_trait::async_trait;
use sqlx::PgPool;

use super::{DbResult, TenantRepository};
use crate::database::manager::DatabaseError;
use crate::database::models::{NewTenant, Tenant};
use crate::types::TenantId;

pub struct PgTenantRepository {
    pool: PgPool,
}

impl PgTenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for PgTenantRepository {
    async fn find_by_domain(&self, domain: &str) -> DbResult<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE domain = $1")
            .bind(domain)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tenant)
    }

    async fn get(&self, id: TenantId) -> DbResult<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tenant)
    }

    async fn create(&self, tenant: NewTenant) -> DbResult<Tenant> {
        sqlx::query_as::<_, Tenant>(
            "INSERT INTO tenants (id, name, domain, subdomain) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(TenantId::new())
        .bind(&tenant.name)
        .bind(&tenant.domain)
        .bind(&tenant.subdomain)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, "tenant"))
    }

    async fn list(&self) -> DbResult<Vec<Tenant>> {
        let tenants = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(tenants)
    }

    async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
