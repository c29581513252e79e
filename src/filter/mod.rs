//! List filters from the query string, applied in memory over a tenant's rows.

use serde::Deserialize;

use crate::database::models::{Investment, Policy};
use crate::types::{AssetType, CurrencyCode, PolicyType};
use crate::validation::{FormField, ValidationError};

/// `GET /api/policies?search=&type=`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PolicyQuery {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub policy_type: Option<String>,
}

/// `GET /api/investments?search=&type=&currency=`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InvestmentQuery {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub asset_type: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyFilter {
    search: Option<String>,
    policy_type: Option<PolicyType>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvestmentFilter {
    search: Option<String>,
    asset_type: Option<AssetType>,
    currency: Option<CurrencyCode>,
}

fn needle(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty())
}

fn field(raw: Option<String>) -> FormField {
    raw.map(|s| FormField::from_text(&s)).unwrap_or_default()
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl TryFrom<PolicyQuery> for PolicyFilter {
    type Error = ValidationError;

    fn try_from(query: PolicyQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            search: needle(query.search),
            policy_type: field(query.policy_type).optional("type")?,
        })
    }
}

impl TryFrom<InvestmentQuery> for InvestmentFilter {
    type Error = ValidationError;

    fn try_from(query: InvestmentQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            search: needle(query.search),
            asset_type: field(query.asset_type).optional("type")?,
            currency: field(query.currency).optional("currency")?,
        })
    }
}

impl PolicyFilter {
    /// Search covers name, provider, number and country, case-insensitively
    pub fn matches(&self, policy: &Policy) -> bool {
        let details = &policy.details;
        if self.policy_type.is_some_and(|t| t != details.policy_type) {
            return false;
        }
        match &self.search {
            None => true,
            Some(needle) => {
                contains(&details.policy_name, needle)
                    || contains(&details.provider, needle)
                    || details
                        .policy_number
                        .as_deref()
                        .is_some_and(|n| contains(n, needle))
                    || contains(&details.country, needle)
            }
        }
    }

    pub fn apply(&self, policies: Vec<Policy>) -> Vec<Policy> {
        policies.into_iter().filter(|p| self.matches(p)).collect()
    }
}

impl InvestmentFilter {
    pub fn matches(&self, investment: &Investment) -> bool {
        let details = &investment.details;
        if self.asset_type.is_some_and(|t| t != details.asset_type) {
            return false;
        }
        if self.currency.as_ref().is_some_and(|c| *c != details.currency) {
            return false;
        }
        match &self.search {
            None => true,
            Some(needle) => contains(&details.platform, needle) || contains(&details.country, needle),
        }
    }

    pub fn apply(&self, investments: Vec<Investment>) -> Vec<Investment> {
        investments.into_iter().filter(|i| self.matches(i)).collect()
    }
}
