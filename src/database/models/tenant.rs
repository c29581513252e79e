use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::TenantId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub domain: Option<String>,
    pub subdomain: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Tenant directory entry about to be created
#[derive(Debug, Clone, PartialEq)]
pub struct NewTenant {
    pub name: String,
    pub domain: Option<String>,
    pub subdomain: Option<String>,
}
