//! In-memory repositories with the same contracts as the Postgres ones.
//! Record lists come back newest first; equal timestamps fall back to reverse insertion order.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::models::{
    investment::next_last_updated, Account, Investment, InvestmentDetails, NewAccount, NewTenant,
    Policy, PolicyDetails, SessionRecord, Tenant,
};
use crate::database::repository::{
    AccountRepository, DbResult, InvestmentRepository, PolicyRepository, SessionRepository,
    TenantRepository,
};
use crate::database::DatabaseError;
use crate::types::{InvestmentId, PolicyId, Role, TenantId, UserId};

#[derive(Default)]
pub struct MemoryTenants {
    rows: Mutex<Vec<Tenant>>,
}

#[async_trait]
impl TenantRepository for MemoryTenants {
    async fn find_by_domain(&self, domain: &str) -> DbResult<Option<Tenant>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|t| t.domain.as_deref() == Some(domain)).cloned())
    }

    async fn get(&self, id: TenantId) -> DbResult<Option<Tenant>> {
        Ok(self.rows.lock().unwrap().iter().find(|t| t.id == id).cloned())
    }

    async fn create(&self, tenant: NewTenant) -> DbResult<Tenant> {
        let mut rows = self.rows.lock().unwrap();
        let taken = rows.iter().any(|t| {
            (tenant.domain.is_some() && t.domain == tenant.domain)
                || (tenant.subdomain.is_some() && t.subdomain == tenant.subdomain)
        });
        if taken {
            return Err(DatabaseError::Conflict("Tenant already exists".to_string()));
        }

        let row = Tenant {
            id: TenantId::new(),
            name: tenant.name,
            domain: tenant.domain,
            subdomain: tenant.subdomain,
            created_at: Utc::now(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn list(&self) -> DbResult<Vec<Tenant>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryAccounts {
    rows: Mutex<Vec<Account>>,
}

impl MemoryAccounts {
    fn update<F>(&self, id: UserId, apply: F) -> Option<Account>
    where
        F: FnOnce(&mut Account) -> bool,
    {
        let mut rows = self.rows.lock().unwrap();
        let account = rows.iter_mut().find(|a| a.id == id)?;
        if !apply(account) {
            return None;
        }
        account.updated_at = Utc::now();
        Some(account.clone())
    }
}

#[async_trait]
impl AccountRepository for MemoryAccounts {
    async fn find_by_email(&self, email: &str) -> DbResult<Option<Account>> {
        Ok(self.rows.lock().unwrap().iter().find(|a| a.email == email).cloned())
    }

    async fn get(&self, id: UserId) -> DbResult<Option<Account>> {
        Ok(self.rows.lock().unwrap().iter().find(|a| a.id == id).cloned())
    }

    async fn create(&self, account: NewAccount) -> DbResult<Account> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|a| a.email == account.email) {
            return Err(DatabaseError::Conflict("Account already exists".to_string()));
        }

        let role = if rows.iter().any(|a| a.tenant_id == Some(account.tenant_id)) {
            Role::Member
        } else {
            Role::Admin
        };
        let now = Utc::now();
        let row = Account {
            id: UserId::new(),
            email: account.email,
            password_hash: Some(account.password_hash),
            first_name: account.profile.first_name,
            last_name: account.profile.last_name,
            profile_image: account.profile.profile_image,
            tenant_id: Some(account.tenant_id),
            role,
            created_at: now,
            updated_at: now,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn list_for_tenant(&self, tenant: TenantId) -> DbResult<Vec<Account>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|a| a.tenant_id == Some(tenant))
            .cloned()
            .collect())
    }

    async fn set_role(&self, tenant: TenantId, id: UserId, role: Role) -> DbResult<Option<Account>> {
        Ok(self.update(id, |account| {
            if account.tenant_id != Some(tenant) {
                return false;
            }
            account.role = role;
            true
        }))
    }

    async fn set_password_hash(&self, id: UserId, hash: &str) -> DbResult<bool> {
        Ok(self
            .update(id, |account| {
                account.password_hash = Some(hash.to_string());
                true
            })
            .is_some())
    }

    async fn clear_tenant(&self, tenant: TenantId, id: UserId) -> DbResult<bool> {
        Ok(self
            .update(id, |account| {
                if account.tenant_id != Some(tenant) {
                    return false;
                }
                account.tenant_id = None;
                account.role = Role::Member;
                true
            })
            .is_some())
    }
}

#[derive(Default)]
pub struct MemoryPolicies {
    rows: Mutex<Vec<Policy>>,
}

#[async_trait]
impl PolicyRepository for MemoryPolicies {
    async fn list(&self, tenant: TenantId) -> DbResult<Vec<Policy>> {
        let rows = self.rows.lock().unwrap();
        let mut listed: Vec<Policy> = rows
            .iter()
            .rev()
            .filter(|p| p.tenant_id == tenant)
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }

    async fn get(&self, tenant: TenantId, id: PolicyId) -> DbResult<Option<Policy>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|p| p.tenant_id == tenant && p.id == id)
            .cloned())
    }

    async fn insert(&self, tenant: TenantId, details: PolicyDetails) -> DbResult<Policy> {
        let row = Policy {
            id: PolicyId::new(),
            tenant_id: tenant,
            details,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        tenant: TenantId,
        id: PolicyId,
        details: PolicyDetails,
    ) -> DbResult<Option<Policy>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .iter_mut()
            .find(|p| p.tenant_id == tenant && p.id == id)
            .map(|policy| {
                policy.details = details;
                policy.clone()
            }))
    }

    async fn delete(&self, tenant: TenantId, id: PolicyId) -> DbResult<Option<Policy>> {
        let mut rows = self.rows.lock().unwrap();
        let index = rows.iter().position(|p| p.tenant_id == tenant && p.id == id);
        Ok(index.map(|i| rows.remove(i)))
    }
}

#[derive(Default)]
pub struct MemoryInvestments {
    rows: Mutex<Vec<Investment>>,
}

#[async_trait]
impl InvestmentRepository for MemoryInvestments {
    async fn list(&self, tenant: TenantId) -> DbResult<Vec<Investment>> {
        let rows = self.rows.lock().unwrap();
        let mut listed: Vec<Investment> = rows
            .iter()
            .rev()
            .filter(|i| i.tenant_id == tenant)
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }

    async fn get(&self, tenant: TenantId, id: InvestmentId) -> DbResult<Option<Investment>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|i| i.tenant_id == tenant && i.id == id)
            .cloned())
    }

    async fn insert(&self, tenant: TenantId, details: InvestmentDetails) -> DbResult<Investment> {
        let now = Utc::now();
        let row = Investment {
            id: InvestmentId::new(),
            tenant_id: tenant,
            details,
            last_updated: now,
            created_at: now,
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        tenant: TenantId,
        id: InvestmentId,
        details: InvestmentDetails,
        now: DateTime<Utc>,
    ) -> DbResult<Option<Investment>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .iter_mut()
            .find(|i| i.tenant_id == tenant && i.id == id)
            .map(|investment| {
                investment.details = details;
                investment.last_updated = next_last_updated(investment.last_updated, now);
                investment.clone()
            }))
    }

    async fn delete(&self, tenant: TenantId, id: InvestmentId) -> DbResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|i| !(i.tenant_id == tenant && i.id == id));
        Ok(rows.len() != before)
    }
}

#[derive(Default)]
pub struct MemorySessions {
    rows: Mutex<Vec<SessionRecord>>,
}

impl MemorySessions {
    pub fn contains_digest(&self, digest: &str) -> bool {
        self.rows.lock().unwrap().iter().any(|s| s.token_digest == digest)
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl SessionRepository for MemorySessions {
    async fn insert(&self, session: &SessionRecord) -> DbResult<()> {
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|s| s.token_digest != session.token_digest);
        rows.push(session.clone());
        Ok(())
    }

    async fn find(&self, token_digest: &str, now: DateTime<Utc>) -> DbResult<Option<SessionRecord>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(index) = rows.iter().position(|s| s.token_digest == token_digest) else {
            return Ok(None);
        };
        if rows[index].is_expired(now) {
            rows.remove(index);
            return Ok(None);
        }
        Ok(Some(rows[index].clone()))
    }

    async fn delete(&self, token_digest: &str) -> DbResult<()> {
        self.rows.lock().unwrap().retain(|s| s.token_digest != token_digest);
        Ok(())
    }

    async fn delete_for_user(&self, user: UserId) -> DbResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| s.payload.user_id != user);
        Ok((before - rows.len()) as u64)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| !s.is_expired(now));
        Ok((before - rows.len()) as u64)
    }
}
