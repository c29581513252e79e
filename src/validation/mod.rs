//! Request payload validation.
//!
//! Payloads are whitelisted per entity: unknown keys (including any client
//! supplied `tenantId`) are dropped during deserialization. Every field arrives
//! as a [`FormField`] so JSON bodies and multipart forms share one code path,
//! and the first offending field is reported.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::types::{AssetType, BeneficiaryType, CurrencyCode, PolicyType, PremiumFrequency};

pub mod account;
pub mod investment;
pub mod policy;

pub use account::{Credentials, PasswordChange, Registration};
pub use investment::InvestmentPayload;
pub use policy::PolicyPayload;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// One raw input field. Empty strings and `null` collapse to `Blank`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormField {
    #[default]
    Missing,
    Blank,
    Text(String),
}

impl FormField {
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            FormField::Blank
        } else {
            FormField::Text(trimmed.to_string())
        }
    }

    pub fn required<T: FieldValue>(self, field: &'static str) -> Result<T, ValidationError> {
        match self {
            FormField::Text(raw) => T::parse_field(field, &raw),
            FormField::Missing | FormField::Blank => {
                Err(ValidationError::new(field, format!("{field} is required")))
            }
        }
    }

    pub fn optional<T: FieldValue>(self, field: &'static str) -> Result<Option<T>, ValidationError> {
        match self {
            FormField::Text(raw) => T::parse_field(field, &raw).map(Some),
            FormField::Missing | FormField::Blank => Ok(None),
        }
    }

    /// Update of a mandatory field: absent keeps `current`, blank is rejected
    pub fn patch<T: FieldValue>(self, field: &'static str, current: T) -> Result<T, ValidationError> {
        match self {
            FormField::Missing => Ok(current),
            FormField::Blank => Err(ValidationError::new(field, format!("{field} cannot be empty"))),
            FormField::Text(raw) => T::parse_field(field, &raw),
        }
    }

    /// Update of an optional field: absent keeps `current`, blank clears it
    pub fn patch_optional<T: FieldValue>(
        self,
        field: &'static str,
        current: Option<T>,
    ) -> Result<Option<T>, ValidationError> {
        match self {
            FormField::Missing => Ok(current),
            FormField::Blank => Ok(None),
            FormField::Text(raw) => T::parse_field(field, &raw).map(Some),
        }
    }
}

impl<'de> Deserialize<'de> for FormField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => FormField::Blank,
            Value::String(s) => FormField::from_text(&s),
            // the source literal, not an f64 rendering (serde_json `arbitrary_precision`)
            Value::Number(n) => FormField::Text(n.to_string()),
            Value::Bool(b) => FormField::Text(b.to_string()),
            other => FormField::Text(other.to_string()),
        })
    }
}

/// A value that can be parsed out of a [`FormField`]
pub trait FieldValue: Sized {
    fn parse_field(field: &'static str, raw: &str) -> Result<Self, ValidationError>;
}

impl FieldValue for String {
    fn parse_field(_field: &'static str, raw: &str) -> Result<Self, ValidationError> {
        Ok(raw.to_string())
    }
}

// Plain ISO dates, or a full timestamp from which the date part is taken
impl FieldValue for NaiveDate {
    fn parse_field(field: &'static str, raw: &str) -> Result<Self, ValidationError> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
            .map_err(|_| ValidationError::new(field, format!("{field} must be a date (YYYY-MM-DD)")))
    }
}

// Amounts are exact decimals and never negative
impl FieldValue for Decimal {
    fn parse_field(field: &'static str, raw: &str) -> Result<Self, ValidationError> {
        let value = Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .map_err(|_| ValidationError::new(field, format!("{field} must be a number")))?;
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ValidationError::new(field, format!("{field} cannot be negative")));
        }
        Ok(value)
    }
}

macro_rules! field_value_from_str {
    ($($ty:ty),+) => {
        $(
            impl FieldValue for $ty {
                fn parse_field(field: &'static str, raw: &str) -> Result<Self, ValidationError> {
                    raw.parse().map_err(|e: crate::types::ParseEnumError| ValidationError::new(field, e.to_string()))
                }
            }
        )+
    };
}

field_value_from_str!(PolicyType, PremiumFrequency, BeneficiaryType, AssetType, CurrencyCode);
