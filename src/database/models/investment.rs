use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, Row};

use crate::types::{AssetType, CurrencyCode, InvestmentId, TenantId};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentDetails {
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub platform: String,
    pub country: String,
    pub currency: CurrencyCode,
    pub initial_amount: Decimal,
    pub current_value: Decimal,
    pub shares: Option<Decimal>,
    pub purchase_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub id: InvestmentId,
    pub tenant_id: TenantId,
    #[serde(flatten)]
    pub details: InvestmentDetails,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// `last_updated` for a write at `now`; never earlier than what is already stored
pub fn next_last_updated(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    previous.max(now)
}

impl<'r> FromRow<'r, PgRow> for Investment {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let asset_type: String = row.try_get("asset_type")?;
        let currency: String = row.try_get("currency")?;

        Ok(Self {
            id: row.try_get("id")?,
            tenant_id: row.try_get("tenant_id")?,
            details: InvestmentDetails {
                asset_type: asset_type.parse().map_err(|e| sqlx::Error::ColumnDecode {
                    index: "asset_type".to_string(),
                    source: Box::new(e),
                })?,
                platform: row.try_get("platform")?,
                country: row.try_get("country")?,
                currency: currency.parse().map_err(|e| sqlx::Error::ColumnDecode {
                    index: "currency".to_string(),
                    source: Box::new(e),
                })?,
                initial_amount: row.try_get("initial_amount")?,
                current_value: row.try_get("current_value")?,
                shares: row.try_get("shares")?,
                purchase_date: row.try_get("purchase_date")?,
            },
            last_updated: row.try_get("last_updated")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
