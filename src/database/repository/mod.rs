// Storage seams. Every record operation takes the owning TenantId explicitly so
// tenant scoping is part of the signature rather than ambient request state.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Account, Investment, InvestmentDetails, NewAccount, NewTenant, Policy, PolicyDetails,
    SessionRecord, Tenant,
};
use crate::types::{InvestmentId, PolicyId, Role, TenantId, UserId};

mod account;
mod investment;
mod policy;
mod session;
mod tenant;

pub use account::PgAccountRepository;
pub use investment::PgInvestmentRepository;
pub use policy::PgPolicyRepository;
pub use session::PgSessionRepository;
pub use tenant::PgTenantRepository;

pub type DbResult<T> = Result<T, DatabaseError>;

/// Tenant directory, keyed by domain
#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn find_by_domain(&self, domain: &str) -> DbResult<Option<Tenant>>;
    async fn get(&self, id: TenantId) -> DbResult<Option<Tenant>>;
    /// Fails with [`DatabaseError::Conflict`] when the domain or subdomain is taken
    async fn create(&self, tenant: NewTenant) -> DbResult<Tenant>;
    async fn list(&self) -> DbResult<Vec<Tenant>>;
    /// Round trip to the store, used by the health endpoint
    async fn ping(&self) -> DbResult<()>;
}

/// Credential store
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> DbResult<Option<Account>>;
    async fn get(&self, id: UserId) -> DbResult<Option<Account>>;
    /// Fails with [`DatabaseError::Conflict`] on a duplicate email. The first
    /// account of a tenant is made admin, atomically with respect to other
    /// inserts into the same tenant.
    async fn create(&self, account: NewAccount) -> DbResult<Account>;
    async fn list_for_tenant(&self, tenant: TenantId) -> DbResult<Vec<Account>>;
    async fn set_role(&self, tenant: TenantId, id: UserId, role: Role) -> DbResult<Option<Account>>;
    async fn set_password_hash(&self, id: UserId, hash: &str) -> DbResult<bool>;
    /// Detach the account from the tenant without deleting it
    async fn clear_tenant(&self, tenant: TenantId, id: UserId) -> DbResult<bool>;
}

#[async_trait]
pub trait PolicyRepository: Send + Sync {
    /// Newest first
    async fn list(&self, tenant: TenantId) -> DbResult<Vec<Policy>>;
    async fn get(&self, tenant: TenantId, id: PolicyId) -> DbResult<Option<Policy>>;
    async fn insert(&self, tenant: TenantId, details: PolicyDetails) -> DbResult<Policy>;
    async fn update(
        &self,
        tenant: TenantId,
        id: PolicyId,
        details: PolicyDetails,
    ) -> DbResult<Option<Policy>>;
    /// Returns the removed row so callers can clean up its document
    async fn delete(&self, tenant: TenantId, id: PolicyId) -> DbResult<Option<Policy>>;
}

#[async_trait]
pub trait InvestmentRepository: Send + Sync {
    /// Newest first
    async fn list(&self, tenant: TenantId) -> DbResult<Vec<Investment>>;
    async fn get(&self, tenant: TenantId, id: InvestmentId) -> DbResult<Option<Investment>>;
    async fn insert(&self, tenant: TenantId, details: InvestmentDetails) -> DbResult<Investment>;
    /// Stamps `last_updated` with `now`, or keeps the stored value if it is later
    async fn update(
        &self,
        tenant: TenantId,
        id: InvestmentId,
        details: InvestmentDetails,
        now: DateTime<Utc>,
    ) -> DbResult<Option<Investment>>;
    async fn delete(&self, tenant: TenantId, id: InvestmentId) -> DbResult<bool>;
}

/// Server-side session rows keyed by token digest
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn insert(&self, session: &SessionRecord) -> DbResult<()>;
    /// Expired rows are deleted on sight and reported as absent
    async fn find(&self, token_digest: &str, now: DateTime<Utc>) -> DbResult<Option<SessionRecord>>;
    async fn delete(&self, token_digest: &str) -> DbResult<()>;
    async fn delete_for_user(&self, user: UserId) -> DbResult<u64>;
    async fn purge_expired(&self, now: DateTime<Utc>) -> DbResult<u64>;
}

/// The full set of stores handed to services
#[derive(Clone)]
pub struct Repositories {
    pub tenants: Arc<dyn TenantRepository>,
    pub accounts: Arc<dyn AccountRepository>,
    pub policies: Arc<dyn PolicyRepository>,
    pub investments: Arc<dyn InvestmentRepository>,
    pub sessions: Arc<dyn SessionRepository>,
}
