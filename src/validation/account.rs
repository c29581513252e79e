use serde::Deserialize;

use super::{FormField, ValidationError};
use crate::database::models::ProfileFields;
use crate::types::Role;

/// Raw body of `POST /api/auth/register`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterPayload {
    pub email: FormField,
    pub password: FormField,
    pub first_name: FormField,
    pub last_name: FormField,
    pub profile_image: FormField,
    pub domain: FormField,
    pub tenant_name: FormField,
    pub subdomain: FormField,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub profile: ProfileFields,
    pub domain: String,
    pub tenant_name: String,
    pub subdomain: Option<String>,
}

impl RegisterPayload {
    pub fn validate(self, min_password: usize) -> Result<Registration, ValidationError> {
        let email = normalize_email(self.email.required("email")?)?;
        let password = password_text(self.password, "password", min_password)?;
        let domain = normalize_domain("domain", self.domain.required("domain")?)?;
        let subdomain = self
            .subdomain
            .optional::<String>("subdomain")?
            .map(|s| normalize_domain("subdomain", s))
            .transpose()?;

        Ok(Registration {
            email,
            password,
            profile: ProfileFields {
                first_name: self.first_name.optional("firstName")?,
                last_name: self.last_name.optional("lastName")?,
                profile_image: self.profile_image.optional("profileImage")?,
            },
            tenant_name: self
                .tenant_name
                .optional("tenantName")?
                .unwrap_or_else(|| domain.clone()),
            domain,
            subdomain,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginPayload {
    pub email: FormField,
    pub password: FormField,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl LoginPayload {
    pub fn validate(self) -> Result<Credentials, ValidationError> {
        Ok(Credentials {
            email: normalize_email(self.email.required("email")?)?,
            password: self.password.required("password")?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    pub current_password: FormField,
    pub new_password: FormField,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

impl ChangePasswordPayload {
    pub fn validate(self, min_password: usize) -> Result<PasswordChange, ValidationError> {
        Ok(PasswordChange {
            current_password: self.current_password.required("currentPassword")?,
            new_password: password_text(self.new_password, "newPassword", min_password)?,
        })
    }
}

/// Body of the admin password reset
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResetPasswordPayload {
    pub new_password: FormField,
}

impl ResetPasswordPayload {
    pub fn validate(self, min_password: usize) -> Result<String, ValidationError> {
        password_text(self.new_password, "newPassword", min_password)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RolePayload {
    pub role: FormField,
}

impl RolePayload {
    pub fn validate(self) -> Result<Role, ValidationError> {
        let raw: String = self.role.required("role")?;
        raw.parse()
            .map_err(|_| ValidationError::new("role", "role must be 'admin' or 'user'"))
    }
}

// Passwords are taken verbatim apart from the surrounding whitespace FormField trims
fn password_text(field: FormField, name: &'static str, min: usize) -> Result<String, ValidationError> {
    let password: String = field.required(name)?;
    if password.chars().count() < min {
        return Err(ValidationError::new(
            name,
            format!("{name} must be at least {min} characters"),
        ));
    }
    Ok(password)
}

pub fn normalize_email(raw: String) -> Result<String, ValidationError> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, host)) => {
            !local.is_empty()
                && host.contains('.')
                && !host.starts_with('.')
                && !host.ends_with('.')
                && !host.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(ValidationError::new("email", "email must be a valid email address"))
    }
}

fn normalize_domain(field: &'static str, raw: String) -> Result<String, ValidationError> {
    let domain = raw.trim().to_lowercase();
    let valid = !domain.is_empty()
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if valid {
        Ok(domain)
    } else {
        Err(ValidationError::new(
            field,
            format!("{field} may only contain letters, digits, '.' and '-'"),
        ))
    }
}
