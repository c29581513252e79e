use serde::Deserialize;

use super::{FormField, ValidationError};
use crate::database::models::policy::DEFAULT_RENEWAL_STATUS;
use crate::database::models::PolicyDetails;

/// Whitelisted policy fields. The document reference is never taken from the
/// client; it is set from an uploaded file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolicyPayload {
    pub provider: FormField,
    pub policy_name: FormField,
    pub policy_number: FormField,
    pub policy_type: FormField,
    pub country: FormField,
    pub start_date: FormField,
    pub maturity_date: FormField,
    pub next_renewal_date: FormField,
    pub last_premium_date: FormField,
    pub premium: FormField,
    pub premium_currency: FormField,
    pub premium_frequency: FormField,
    pub nominee: FormField,
    pub beneficiary_type: FormField,
    pub paid_to: FormField,
    pub renewal_status: FormField,
    pub notes: FormField,
}

impl PolicyPayload {
    /// Validate a full payload for a new policy
    pub fn into_details(self) -> Result<PolicyDetails, ValidationError> {
        Ok(PolicyDetails {
            provider: self.provider.required("provider")?,
            policy_name: self.policy_name.required("policyName")?,
            policy_number: self.policy_number.optional("policyNumber")?,
            policy_type: self.policy_type.required("policyType")?,
            country: self.country.required("country")?,
            start_date: self.start_date.required("startDate")?,
            maturity_date: self.maturity_date.optional("maturityDate")?,
            next_renewal_date: self.next_renewal_date.optional("nextRenewalDate")?,
            last_premium_date: self.last_premium_date.optional("lastPremiumDate")?,
            premium: self.premium.optional("premium")?,
            premium_currency: self.premium_currency.optional("premiumCurrency")?.unwrap_or_default(),
            premium_frequency: self.premium_frequency.optional("premiumFrequency")?,
            nominee: self.nominee.optional("nominee")?,
            beneficiary_type: self.beneficiary_type.optional("beneficiaryType")?,
            paid_to: self.paid_to.optional("paidTo")?,
            renewal_status: self
                .renewal_status
                .optional("renewalStatus")?
                .unwrap_or_else(|| DEFAULT_RENEWAL_STATUS.to_string()),
            notes: self.notes.optional("notes")?,
            document: None,
        })
    }

    /// Merge a partial payload over the stored details
    pub fn apply_to(self, current: PolicyDetails) -> Result<PolicyDetails, ValidationError> {
        Ok(PolicyDetails {
            provider: self.provider.patch("provider", current.provider)?,
            policy_name: self.policy_name.patch("policyName", current.policy_name)?,
            policy_number: self.policy_number.patch_optional("policyNumber", current.policy_number)?,
            policy_type: self.policy_type.patch("policyType", current.policy_type)?,
            country: self.country.patch("country", current.country)?,
            start_date: self.start_date.patch("startDate", current.start_date)?,
            maturity_date: self.maturity_date.patch_optional("maturityDate", current.maturity_date)?,
            next_renewal_date: self
                .next_renewal_date
                .patch_optional("nextRenewalDate", current.next_renewal_date)?,
            last_premium_date: self
                .last_premium_date
                .patch_optional("lastPremiumDate", current.last_premium_date)?,
            premium: self.premium.patch_optional("premium", current.premium)?,
            premium_currency: self
                .premium_currency
                .patch_optional("premiumCurrency", Some(current.premium_currency))?
                .unwrap_or_default(),
            premium_frequency: self
                .premium_frequency
                .patch_optional("premiumFrequency", current.premium_frequency)?,
            nominee: self.nominee.patch_optional("nominee", current.nominee)?,
            beneficiary_type: self
                .beneficiary_type
                .patch_optional("beneficiaryType", current.beneficiary_type)?,
            paid_to: self.paid_to.patch_optional("paidTo", current.paid_to)?,
            renewal_status: self
                .renewal_status
                .patch_optional("renewalStatus", Some(current.renewal_status))?
                .unwrap_or_else(|| DEFAULT_RENEWAL_STATUS.to_string()),
            notes: self.notes.patch_optional("notes", current.notes)?,
            document: current.document,
        })
    }
}
