pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::database::DatabaseManager;

#[derive(Parser)]
#[command(name = "fintrack")]
#[command(about = "fintrack - operator tasks against the fintrack database")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Session maintenance")]
    Sessions {
        #[command(subcommand)]
        cmd: commands::sessions::SessionCommands,
    },

    #[command(about = "Tenant directory")]
    Tenants {
        #[command(subcommand)]
        cmd: commands::tenants::TenantCommands,
    },

    #[command(about = "Account administration")]
    Users {
        #[command(subcommand)]
        cmd: commands::users::UserCommands,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let database = DatabaseManager::connect(&config::config().database)?;

    let result = match cli.command {
        Commands::Migrate => commands::migrate::handle(&database, output_format).await,
        Commands::Sessions { cmd } => commands::sessions::handle(cmd, &database, output_format).await,
        Commands::Tenants { cmd } => commands::tenants::handle(cmd, &database, output_format).await,
        Commands::Users { cmd } => commands::users::handle(cmd, &database, output_format).await,
    };

    database.close().await;
    result
}
