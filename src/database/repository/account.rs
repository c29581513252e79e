use async_trait::async_trait;
use sqlx::PgPool;

use super::{AccountRepository, DbResult};
use crate::database::manager::DatabaseError;
use crate::database::models::{Account, NewAccount};
use crate::types::{Role, TenantId, UserId};

pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn find_by_email(&self, email: &str) -> DbResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn get(&self, id: UserId) -> DbResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn create(&self, account: NewAccount) -> DbResult<Account> {
        let mut tx = self.pool.begin().await?;

        // Serializes registrations per tenant until commit, so only one can see it empty
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
            .bind(account.tenant_id)
            .execute(&mut *tx)
            .await?;

        let created = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO users (id, email, password_hash, first_name, last_name, profile_image, tenant_id, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7,
                CASE WHEN EXISTS (SELECT 1 FROM users WHERE tenant_id = $7) THEN $9 ELSE $8 END)
            RETURNING *
            "#,
        )
        .bind(UserId::new())
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.profile.first_name)
        .bind(&account.profile.last_name)
        .bind(&account.profile.profile_image)
        .bind(account.tenant_id)
        .bind(Role::Admin.as_str())
        .bind(Role::Member.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from_write(e, "account"))?;

        tx.commit().await?;
        Ok(created)
    }

    async fn list_for_tenant(&self, tenant: TenantId) -> DbResult<Vec<Account>> {
        let accounts = sqlx::query_as::<_, Account>(
            "SELECT * FROM users WHERE tenant_id = $1 ORDER BY created_at",
        )
        .bind(tenant)
        .fetch_all(&self.pool)
        .await?;
        Ok(accounts)
    }

    async fn set_role(&self, tenant: TenantId, id: UserId, role: Role) -> DbResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            "UPDATE users SET role = $3, updated_at = now() WHERE id = $1 AND tenant_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(tenant)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn set_password_hash(&self, id: UserId, hash: &str) -> DbResult<bool> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(hash)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_tenant(&self, tenant: TenantId, id: UserId) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET tenant_id = NULL, updated_at = now() WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
