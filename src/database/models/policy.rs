use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use sqlx::{postgres::PgRow, FromRow, Row};

use crate::types::{BeneficiaryType, CurrencyCode, PolicyId, PolicyType, PremiumFrequency, TenantId};

/// Days ahead that renewal and maturity dates are flagged
pub const ATTENTION_WINDOW_DAYS: i64 = 60;

pub const DEFAULT_RENEWAL_STATUS: &str = "active";

/// The client-editable part of a policy
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDetails {
    pub provider: String,
    pub policy_name: String,
    pub policy_number: Option<String>,
    pub policy_type: PolicyType,
    pub country: String,
    pub start_date: NaiveDate,
    pub maturity_date: Option<NaiveDate>,
    pub next_renewal_date: Option<NaiveDate>,
    pub last_premium_date: Option<NaiveDate>,
    pub premium: Option<Decimal>,
    pub premium_currency: CurrencyCode,
    pub premium_frequency: Option<PremiumFrequency>,
    pub nominee: Option<String>,
    pub beneficiary_type: Option<BeneficiaryType>,
    pub paid_to: Option<String>,
    pub renewal_status: String,
    pub notes: Option<String>,
    pub document: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: PolicyId,
    pub tenant_id: TenantId,
    #[serde(flatten)]
    pub details: PolicyDetails,
    pub created_at: DateTime<Utc>,
}

/// Status computed from the policy dates at read time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyStatus {
    Matured,
    ExpiringSoon,
    RenewalDue,
    Recorded(String),
}

impl PolicyStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PolicyStatus::Matured => "matured",
            PolicyStatus::ExpiringSoon => "expiring_soon",
            PolicyStatus::RenewalDue => "renewal_due",
            PolicyStatus::Recorded(status) => status,
        }
    }
}

impl Serialize for PolicyStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl Policy {
    /// Renewal date falls on or before the end of the attention window (overdue included)
    pub fn needs_renewal(&self, today: NaiveDate) -> bool {
        self.details
            .next_renewal_date
            .is_some_and(|date| date <= window_end(today))
    }

    /// Maturity strictly after today and no later than the end of the attention window
    pub fn expiring_soon(&self, today: NaiveDate) -> bool {
        self.details
            .maturity_date
            .is_some_and(|date| today < date && date <= window_end(today))
    }

    pub fn status(&self, today: NaiveDate) -> PolicyStatus {
        if self.details.maturity_date.is_some_and(|date| date <= today) {
            PolicyStatus::Matured
        } else if self.expiring_soon(today) {
            PolicyStatus::ExpiringSoon
        } else if self.needs_renewal(today) {
            PolicyStatus::RenewalDue
        } else {
            PolicyStatus::Recorded(self.details.renewal_status.clone())
        }
    }

    pub fn view(self, today: NaiveDate) -> PolicyView {
        let status = self.status(today);
        PolicyView { policy: self, status }
    }
}

fn window_end(today: NaiveDate) -> NaiveDate {
    today + Duration::days(ATTENTION_WINDOW_DAYS)
}

/// Policy as returned to clients, with its derived status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyView {
    #[serde(flatten)]
    pub policy: Policy,
    pub status: PolicyStatus,
}

fn decode<T, E>(column: &str, value: Result<T, E>) -> sqlx::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    value.map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for Policy {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let policy_type: String = row.try_get("policy_type")?;
        let currency: String = row.try_get("premium_currency")?;
        let frequency: Option<String> = row.try_get("premium_frequency")?;
        let beneficiary: Option<String> = row.try_get("beneficiary_type")?;

        Ok(Self {
            id: row.try_get("id")?,
            tenant_id: row.try_get("tenant_id")?,
            details: PolicyDetails {
                provider: row.try_get("provider")?,
                policy_name: row.try_get("policy_name")?,
                policy_number: row.try_get("policy_number")?,
                policy_type: decode("policy_type", policy_type.parse())?,
                country: row.try_get("country")?,
                start_date: row.try_get("start_date")?,
                maturity_date: row.try_get("maturity_date")?,
                next_renewal_date: row.try_get("next_renewal_date")?,
                last_premium_date: row.try_get("last_premium_date")?,
                premium: row.try_get("premium")?,
                premium_currency: decode("premium_currency", currency.parse())?,
                premium_frequency: decode(
                    "premium_frequency",
                    frequency.map(|f| f.parse()).transpose(),
                )?,
                nominee: row.try_get("nominee")?,
                beneficiary_type: decode(
                    "beneficiary_type",
                    beneficiary.map(|b| b.parse()).transpose(),
                )?,
                paid_to: row.try_get("paid_to")?,
                renewal_status: row.try_get("renewal_status")?,
                notes: row.try_get("notes")?,
                document: row.try_get("document")?,
            },
            created_at: row.try_get("created_at")?,
        })
    }
}

#[cfg(test)]
pub(crate) fn sample_details() -> PolicyDetails {
    PolicyDetails {
        provider: "Folksam".to_string(),
        policy_name: "Home".to_string(),
        policy_number: None,
        policy_type: PolicyType::Property,
        country: "Sweden".to_string(),
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        maturity_date: None,
        next_renewal_date: None,
        last_premium_date: None,
        premium: None,
        premium_currency: CurrencyCode::sek(),
        premium_frequency: None,
        nominee: None,
        beneficiary_type: None,
        paid_to: None,
        renewal_status: DEFAULT_RENEWAL_STATUS.to_string(),
        notes: None,
        document: None,
    }
}
