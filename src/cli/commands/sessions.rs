use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::database::DatabaseManager;
use crate::services::SessionManager;

#[derive(Subcommand)]
pub enum SessionCommands {
    #[command(about = "Delete every expired session row")]
    Purge,
}

pub async fn handle(
    cmd: SessionCommands,
    database: &DatabaseManager,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let repos = database.repositories();
    let sessions = SessionManager::new(repos.sessions, config::config().session.ttl_hours);

    match cmd {
        SessionCommands::Purge => {
            let purged = sessions.purge_expired().await?;
            output_success(
                output_format,
                &format!("Purged {} expired session(s)", purged),
                Some(json!({ "purged": purged })),
            )
        }
    }
}
