//! Dashboard figures, recomputed from the tenant's rows on every request.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::ServiceResult;
use crate::database::models::{Investment, Policy};
use crate::database::repository::{InvestmentRepository, PolicyRepository};
use crate::types::{AssetType, CurrencyCode, PolicyId, PremiumFrequency, TenantId};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrencyTotals {
    #[serde(rename = "SEK")]
    pub sek: Decimal,
    #[serde(rename = "INR")]
    pub inr: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_policies: usize,
    pub needs_renewal: usize,
    pub expiring_soon: usize,
    pub total_investments: usize,
    pub investments_by_currency: CurrencyTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeBreakdown {
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub value: Decimal,
    pub currency: CurrencyCode,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformBreakdown {
    pub platform: String,
    pub value: Decimal,
    pub currency: CurrencyCode,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumBreakdown {
    pub provider: String,
    pub policy_name: String,
    pub currency: CurrencyCode,
    pub monthly_premium: Decimal,
    pub yearly_premium: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingRenewal {
    pub id: PolicyId,
    pub provider: String,
    pub policy_name: String,
    pub next_renewal_date: NaiveDate,
    /// Negative when the renewal is already overdue
    pub days_until: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAnalytics {
    pub investments_by_type: Vec<TypeBreakdown>,
    pub investments_by_platform: Vec<PlatformBreakdown>,
    pub premiums_by_provider: Vec<PremiumBreakdown>,
    pub upcoming_renewals: Vec<UpcomingRenewal>,
}

pub fn compute_stats(policies: &[Policy], investments: &[Investment], today: NaiveDate) -> DashboardStats {
    let mut totals = CurrencyTotals::default();
    for investment in investments {
        let value = investment.details.current_value;
        match investment.details.currency.as_str() {
            CurrencyCode::SEK => totals.sek += value,
            CurrencyCode::INR => totals.inr += value,
            _ => {}
        }
    }

    DashboardStats {
        total_policies: policies.len(),
        needs_renewal: policies.iter().filter(|p| p.needs_renewal(today)).count(),
        expiring_soon: policies.iter().filter(|p| p.expiring_soon(today)).count(),
        total_investments: investments.len(),
        investments_by_currency: totals,
    }
}

/// Monthly and yearly amounts for one premium. Missing premiums count as zero.
pub fn premium_split(premium: Option<Decimal>, frequency: Option<PremiumFrequency>) -> (Decimal, Decimal) {
    let premium = premium.unwrap_or(Decimal::ZERO);
    let months = Decimal::from(12);
    let (monthly, yearly) = match frequency {
        Some(PremiumFrequency::Yearly) => (premium / months, premium),
        _ => (premium, premium * months),
    };
    (monthly.round_dp(2), yearly.round_dp(2))
}

pub fn compute_analytics(policies: &[Policy], investments: &[Investment], today: NaiveDate) -> DashboardAnalytics {
    // One row per investment, not grouped
    let investments_by_type = investments
        .iter()
        .map(|i| TypeBreakdown {
            asset_type: i.details.asset_type,
            value: i.details.current_value,
            currency: i.details.currency.clone(),
            count: 1,
        })
        .collect();

    let investments_by_platform = investments
        .iter()
        .map(|i| PlatformBreakdown {
            platform: i.details.platform.clone(),
            value: i.details.current_value,
            currency: i.details.currency.clone(),
            count: 1,
        })
        .collect();

    let premiums_by_provider = policies
        .iter()
        .map(|p| {
            let (monthly_premium, yearly_premium) =
                premium_split(p.details.premium, p.details.premium_frequency);
            PremiumBreakdown {
                provider: p.details.provider.clone(),
                policy_name: p.details.policy_name.clone(),
                currency: p.details.premium_currency.clone(),
                monthly_premium,
                yearly_premium,
            }
        })
        .collect();

    let mut upcoming_renewals: Vec<UpcomingRenewal> = policies
        .iter()
        .filter(|p| p.needs_renewal(today))
        .filter_map(|p| {
            let date = p.details.next_renewal_date?;
            Some(UpcomingRenewal {
                id: p.id,
                provider: p.details.provider.clone(),
                policy_name: p.details.policy_name.clone(),
                next_renewal_date: date,
                days_until: (date - today).num_days(),
            })
        })
        .collect();
    upcoming_renewals.sort_by_key(|r| r.next_renewal_date);

    DashboardAnalytics {
        investments_by_type,
        investments_by_platform,
        premiums_by_provider,
        upcoming_renewals,
    }
}

#[derive(Clone)]
pub struct DashboardService {
    policies: Arc<dyn PolicyRepository>,
    investments: Arc<dyn InvestmentRepository>,
}

impl DashboardService {
    pub fn new(policies: Arc<dyn PolicyRepository>, investments: Arc<dyn InvestmentRepository>) -> Self {
        Self { policies, investments }
    }

    async fn rows(&self, tenant: TenantId) -> ServiceResult<(Vec<Policy>, Vec<Investment>)> {
        let rows = futures::try_join!(self.policies.list(tenant), self.investments.list(tenant))?;
        Ok(rows)
    }

    pub async fn stats(&self, tenant: TenantId, today: NaiveDate) -> ServiceResult<DashboardStats> {
        let (policies, investments) = self.rows(tenant).await?;
        Ok(compute_stats(&policies, &investments, today))
    }

    pub async fn analytics(&self, tenant: TenantId, today: NaiveDate) -> ServiceResult<DashboardAnalytics> {
        let (policies, investments) = self.rows(tenant).await?;
        Ok(compute_analytics(&policies, &investments, today))
    }
}
