use std::sync::Arc;

use tracing::{info, warn};

use super::auth_service::Principal;
use super::error::{ServiceError, ServiceResult};
use super::session_service::SessionManager;
use crate::auth::PasswordHasher;
use crate::database::models::{Account, AccountProfile};
use crate::database::repository::{AccountRepository, TenantRepository};
use crate::types::{Role, TenantId, UserId};
use crate::validation::account::{ResetPasswordPayload, RolePayload};

/// Member management for tenant admins. Callers are already known to be admins;
/// the rules here are the ones that depend on the target.
#[derive(Clone)]
pub struct AdminService {
    tenants: Arc<dyn TenantRepository>,
    accounts: Arc<dyn AccountRepository>,
    sessions: SessionManager,
    hasher: PasswordHasher,
    min_password: usize,
}

impl AdminService {
    pub fn new(
        tenants: Arc<dyn TenantRepository>,
        accounts: Arc<dyn AccountRepository>,
        sessions: SessionManager,
        hasher: PasswordHasher,
        min_password: usize,
    ) -> Self {
        Self {
            tenants,
            accounts,
            sessions,
            hasher,
            min_password,
        }
    }

    pub async fn list_members(&self, actor: &Principal) -> ServiceResult<Vec<AccountProfile>> {
        let tenant = actor.tenant()?;
        let domain = self.tenants.get(tenant).await?.and_then(|t| t.domain);
        let members = self.accounts.list_for_tenant(tenant).await?;
        Ok(members
            .iter()
            .map(|account| account.profile(domain.clone()))
            .collect())
    }

    pub async fn change_role(
        &self,
        actor: &Principal,
        target: UserId,
        payload: RolePayload,
    ) -> ServiceResult<AccountProfile> {
        let tenant = actor.tenant()?;
        let role = payload.validate()?;

        if target == actor.user_id && role != Role::Admin {
            warn!("Admin {} tried to demote themselves", actor.user_id);
            return Err(ServiceError::Forbidden("You cannot remove your own admin role".to_string()));
        }

        let account = self
            .accounts
            .set_role(tenant, target, role)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;

        info!("User {} set role of {} to {}", actor.user_id, target, role);
        let domain = self.tenants.get(tenant).await?.and_then(|t| t.domain);
        Ok(account.profile(domain))
    }

    /// Also signs the member out everywhere
    pub async fn reset_password(
        &self,
        actor: &Principal,
        target: UserId,
        payload: ResetPasswordPayload,
    ) -> ServiceResult<()> {
        let tenant = actor.tenant()?;
        let new_password = payload.validate(self.min_password)?;
        let account = self.member(tenant, target).await?;

        let hash = self.hasher.hash(&new_password).await?;
        self.accounts.set_password_hash(account.id, &hash).await?;
        if account.id != actor.user_id {
            self.sessions.close_all_for(account.id).await?;
        }

        info!("User {} reset the password of {}", actor.user_id, account.id);
        Ok(())
    }

    /// Detaches the member from the tenant; the account itself is kept
    pub async fn remove_member(&self, actor: &Principal, target: UserId) -> ServiceResult<()> {
        let tenant = actor.tenant()?;

        if target == actor.user_id {
            warn!("Admin {} tried to remove themselves", actor.user_id);
            return Err(ServiceError::Forbidden("You cannot remove yourself from the tenant".to_string()));
        }

        if !self.accounts.clear_tenant(tenant, target).await? {
            return Err(ServiceError::NotFound("User"));
        }
        let closed = self.sessions.close_all_for(target).await?;

        info!("User {} removed {} from tenant {} ({} sessions closed)", actor.user_id, target, tenant, closed);
        Ok(())
    }

    async fn member(&self, tenant: TenantId, id: UserId) -> ServiceResult<Account> {
        match self.accounts.get(id).await? {
            Some(account) if account.tenant_id == Some(tenant) => Ok(account),
            _ => Err(ServiceError::NotFound("User")),
        }
    }
}
