use serde::Deserialize;

use super::{FormField, ValidationError};
use crate::database::models::InvestmentDetails;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvestmentPayload {
    #[serde(rename = "type")]
    pub asset_type: FormField,
    pub platform: FormField,
    pub country: FormField,
    pub currency: FormField,
    pub initial_amount: FormField,
    pub current_value: FormField,
    pub shares: FormField,
    pub purchase_date: FormField,
}

impl InvestmentPayload {
    pub fn into_details(self) -> Result<InvestmentDetails, ValidationError> {
        Ok(InvestmentDetails {
            asset_type: self.asset_type.required("type")?,
            platform: self.platform.required("platform")?,
            country: self.country.required("country")?,
            currency: self.currency.required("currency")?,
            initial_amount: self.initial_amount.required("initialAmount")?,
            current_value: self.current_value.required("currentValue")?,
            shares: self.shares.optional("shares")?,
            purchase_date: self.purchase_date.optional("purchaseDate")?,
        })
    }

    pub fn apply_to(self, current: InvestmentDetails) -> Result<InvestmentDetails, ValidationError> {
        Ok(InvestmentDetails {
            asset_type: self.asset_type.patch("type", current.asset_type)?,
            platform: self.platform.patch("platform", current.platform)?,
            country: self.country.patch("country", current.country)?,
            currency: self.currency.patch("currency", current.currency)?,
            initial_amount: self.initial_amount.patch("initialAmount", current.initial_amount)?,
            current_value: self.current_value.patch("currentValue", current.current_value)?,
            shares: self.shares.patch_optional("shares", current.shares)?,
            purchase_date: self.purchase_date.patch_optional("purchaseDate", current.purchase_date)?,
        })
    }
}
