use std::sync::Arc;

use tracing::{info, warn};

use super::error::{ServiceError, ServiceResult};
use super::session_service::{IssuedSession, SessionManager};
use crate::auth::PasswordHasher;
use crate::database::models::{Account, AccountProfile, NewAccount, NewTenant, SessionPayload, Tenant};
use crate::database::repository::{AccountRepository, TenantRepository};
use crate::database::DatabaseError;
use crate::types::{Role, TenantId, UserId};
use crate::validation::account::{ChangePasswordPayload, LoginPayload, RegisterPayload};
use crate::validation::{Registration, ValidationError};

/// Who is calling, as resolved from a live session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub tenant_id: Option<TenantId>,
    /// Role as currently stored, not as it was at login
    pub role: Role,
}

impl Principal {
    /// Tenant-scoped routes need an affiliated account
    pub fn tenant(&self) -> ServiceResult<TenantId> {
        self.tenant_id
            .ok_or_else(|| ServiceError::Forbidden("Account is not a member of any tenant".to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub profile: AccountProfile,
    pub session: IssuedSession,
}

/// Registration, login and self-service account operations
#[derive(Clone)]
pub struct AuthService {
    tenants: Arc<dyn TenantRepository>,
    accounts: Arc<dyn AccountRepository>,
    sessions: SessionManager,
    hasher: PasswordHasher,
    min_password: usize,
}

impl AuthService {
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

    pub async fn register(&self, payload: RegisterPayload) -> ServiceResult<AuthOutcome> {
        let registration = payload.validate(self.min_password)?;

        if self.accounts.find_by_email(&registration.email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already registered".to_string()));
        }

        let tenant = self.tenant_for(&registration).await?;

        let password_hash = self.hasher.hash(&registration.password).await?;
        let account = self
            .accounts
            .create(NewAccount {
                email: registration.email,
                password_hash,
                profile: registration.profile,
                tenant_id: tenant.id,
            })
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict(_) => ServiceError::Conflict("Email already registered".to_string()),
                other => other.into(),
            })?;

        info!("Registered {} as {} of tenant {}", account.email, account.role, tenant.id);

        let session = self.open_session(&account).await?;
        Ok(AuthOutcome {
            profile: account.profile(tenant.domain),
            session,
        })
    }

    /// Existing tenant for the domain, or a new one. A lost creation race re-reads the directory.
    async fn tenant_for(&self, registration: &Registration) -> ServiceResult<Tenant> {
        if let Some(tenant) = self.tenants.find_by_domain(&registration.domain).await? {
            return Ok(tenant);
        }

        let created = self
            .tenants
            .create(NewTenant {
                name: registration.tenant_name.clone(),
                domain: Some(registration.domain.clone()),
                subdomain: registration.subdomain.clone(),
            })
            .await;

        match created {
            Ok(tenant) => {
                info!("Created tenant {} for domain {}", tenant.id, registration.domain);
                Ok(tenant)
            }
            Err(DatabaseError::Conflict(detail)) => {
                match self.tenants.find_by_domain(&registration.domain).await? {
                    Some(tenant) => Ok(tenant),
                    None => {
                        warn!("Tenant creation for {} rejected: {}", registration.domain, detail);
                        Err(ServiceError::Conflict("Registration failed".to_string()))
                    }
                }
            }
            Err(other) => Err(other.into()),
        }
    }

    pub async fn login(&self, payload: LoginPayload) -> ServiceResult<AuthOutcome> {
        let credentials = payload.validate()?;

        let Some(account) = self.accounts.find_by_email(&credentials.email).await? else {
            warn!("Login for unknown email");
            self.hasher.verify_decoy(&credentials.password).await?;
            return Err(ServiceError::invalid_credentials());
        };
        let Some(hash) = account.password_hash.as_deref() else {
            warn!("Login for account {} without credentials", account.id);
            self.hasher.verify_decoy(&credentials.password).await?;
            return Err(ServiceError::invalid_credentials());
        };
        if !self.hasher.verify(&credentials.password, hash).await? {
            warn!("Wrong password for account {}", account.id);
            return Err(ServiceError::invalid_credentials());
        }

        info!("User {} logged in", account.id);
        let session = self.open_session(&account).await?;
        let domain = self.domain_of(account.tenant_id).await?;
        Ok(AuthOutcome {
            profile: account.profile(domain),
            session,
        })
    }

    pub async fn logout(&self, token: Option<&str>) -> ServiceResult<()> {
        if let Some(token) = token {
            self.sessions.close(token).await?;
        }
        Ok(())
    }

    /// Session token to principal. Sessions whose account vanished or changed
    /// tenant since login are destroyed and rejected.
    pub async fn authenticate(&self, token: &str) -> ServiceResult<Principal> {
        let payload = self
            .sessions
            .resolve(token)
            .await?
            .ok_or_else(ServiceError::unauthorized)?;

        match self.accounts.get(payload.user_id).await? {
            Some(account) if account.tenant_id == payload.tenant_id => Ok(Principal {
                user_id: account.id,
                tenant_id: account.tenant_id,
                role: account.role,
            }),
            _ => {
                self.sessions.close(token).await?;
                Err(ServiceError::unauthorized())
            }
        }
    }

    pub async fn me(&self, principal: &Principal) -> ServiceResult<AccountProfile> {
        let account = self.account(principal.user_id).await?;
        let domain = self.domain_of(account.tenant_id).await?;
        Ok(account.profile(domain))
    }

    pub async fn change_password(
        &self,
        principal: &Principal,
        payload: ChangePasswordPayload,
    ) -> ServiceResult<()> {
        let change = payload.validate(self.min_password)?;
        let account = self.account(principal.user_id).await?;

        let current_ok = match account.password_hash.as_deref() {
            Some(hash) => self.hasher.verify(&change.current_password, hash).await?,
            None => false,
        };
        if !current_ok {
            warn!("Password change for {} with wrong current password", account.id);
            return Err(ValidationError::new("currentPassword", "Current password is incorrect").into());
        }

        let hash = self.hasher.hash(&change.new_password).await?;
        self.accounts.set_password_hash(account.id, &hash).await?;
        info!("User {} changed their password", account.id);
        Ok(())
    }

    async fn account(&self, id: UserId) -> ServiceResult<Account> {
        self.accounts
            .get(id)
            .await?
            .ok_or_else(ServiceError::unauthorized)
    }

    async fn domain_of(&self, tenant: Option<TenantId>) -> ServiceResult<Option<String>> {
        let Some(tenant) = tenant else {
            return Ok(None);
        };
        Ok(self.tenants.get(tenant).await?.and_then(|t| t.domain))
    }

    async fn open_session(&self, account: &Account) -> ServiceResult<IssuedSession> {
        self.sessions
            .open(SessionPayload {
                user_id: account.id,
                tenant_id: account.tenant_id,
            })
            .await
    }
}
