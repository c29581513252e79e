use anyhow::{anyhow, bail};
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::DatabaseManager;
use crate::types::Role;
use crate::validation::account::normalize_email;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Change an account's role within its tenant")]
    SetRole {
        #[arg(long, help = "Account email")]
        email: String,
        #[arg(long, help = "admin or user")]
        role: Role,
    },
}

pub async fn handle(
    cmd: UserCommands,
    database: &DatabaseManager,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let repos = database.repositories();

    match cmd {
        UserCommands::SetRole { email, role } => {
            let email = normalize_email(email)?;
            let account = repos
                .accounts
                .find_by_email(&email)
                .await?
                .ok_or_else(|| anyhow!("No account with email '{}'", email))?;

            let Some(tenant) = account.tenant_id else {
                bail!("Account '{}' is not a member of any tenant", email);
            };

            repos
                .accounts
                .set_role(tenant, account.id, role)
                .await?
                .ok_or_else(|| anyhow!("Account '{}' disappeared while updating", email))?;

            output_success(
                output_format,
                &format!("{} is now {}", email, role),
                Some(json!({ "email": email, "role": role })),
            )
        }
    }
}
