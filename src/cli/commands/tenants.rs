use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{or_dash, output_empty_collection};
use crate::cli::OutputFormat;
use crate::database::DatabaseManager;

#[derive(Subcommand)]
pub enum TenantCommands {
    #[command(about = "List all tenants")]
    List,
}

pub async fn handle(
    cmd: TenantCommands,
    database: &DatabaseManager,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let repos = database.repositories();

    match cmd {
        TenantCommands::List => {
            let tenants = repos.tenants.list().await?;

            if tenants.is_empty() {
                return output_empty_collection(output_format, "tenants", "No tenants registered");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "tenants": tenants }))?);
                }
                OutputFormat::Text => {
                    println!("{:<38} {:<25} {:<25} {:<15} {}", "ID", "NAME", "DOMAIN", "SUBDOMAIN", "CREATED");
                    println!("{}", "-".repeat(120));

                    for tenant in &tenants {
                        println!(
                            "{:<38} {:<25} {:<25} {:<15} {}",
                            tenant.id,
                            tenant.name,
                            or_dash(tenant.domain.as_deref()),
                            or_dash(tenant.subdomain.as_deref()),
                            tenant.created_at.format("%Y-%m-%d %H:%M"),
                        );
                    }
                }
            }

            Ok(())
        }
    }
}
