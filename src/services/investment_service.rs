use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::error::{ServiceError, ServiceResult};
use crate::database::models::Investment;
use crate::database::repository::InvestmentRepository;
use crate::filter::InvestmentFilter;
use crate::types::{InvestmentId, TenantId};
use crate::validation::InvestmentPayload;

#[derive(Clone)]
pub struct InvestmentService {
    investments: Arc<dyn InvestmentRepository>,
}

impl InvestmentService {
    pub fn new(investments: Arc<dyn InvestmentRepository>) -> Self {
        Self { investments }
    }

    pub async fn list(&self, tenant: TenantId, filter: &InvestmentFilter) -> ServiceResult<Vec<Investment>> {
        let investments = self.investments.list(tenant).await?;
        Ok(filter.apply(investments))
    }

    pub async fn get(&self, tenant: TenantId, id: InvestmentId) -> ServiceResult<Investment> {
        self.investments
            .get(tenant, id)
            .await?
            .ok_or(ServiceError::NotFound("Investment"))
    }

    pub async fn create(&self, tenant: TenantId, payload: InvestmentPayload) -> ServiceResult<Investment> {
        let details = payload.into_details()?;
        let investment = self.investments.insert(tenant, details).await?;
        info!("Created investment {} for tenant {}", investment.id, tenant);
        Ok(investment)
    }

    /// Every update moves `last_updated` forward, whatever changed
    pub async fn update(
        &self,
        tenant: TenantId,
        id: InvestmentId,
        payload: InvestmentPayload,
    ) -> ServiceResult<Investment> {
        let current = self.get(tenant, id).await?;
        let details = payload.apply_to(current.details)?;

        self.investments
            .update(tenant, id, details, Utc::now())
            .await?
            .ok_or(ServiceError::NotFound("Investment"))
    }

    pub async fn delete(&self, tenant: TenantId, id: InvestmentId) -> ServiceResult<()> {
        if !self.investments.delete(tenant, id).await? {
            return Err(ServiceError::NotFound("Investment"));
        }
        info!("Deleted investment {} for tenant {}", id, tenant);
        Ok(())
    }
}
