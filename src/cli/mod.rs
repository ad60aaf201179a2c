pub mod commands;
pub mod utils;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::session::{FileSessionStore, SessionStore};

#[derive(Parser)]
#[command(name = "tenantctl")]
#[command(about = "tenantctl - Admin console for multi-tenant SaaS backends")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Initialize the local configuration directory")]
    Init,

    #[command(about = "Authentication and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Company (tenant) selection")]
    Company {
        #[command(subcommand)]
        cmd: commands::company::CompanyCommands,
    },

    #[command(about = "Generic CRUD operations on configured resources")]
    Resource {
        #[command(subcommand)]
        cmd: commands::resource::ResourceCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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

/// Build the file-backed session store the console runs against.
pub fn session_store() -> anyhow::Result<Arc<dyn SessionStore>> {
    Ok(Arc::new(FileSessionStore::new()?))
}

/// Build the API client for the configured backend, sharing `store`.
pub fn api_client(store: Arc<dyn SessionStore>) -> anyhow::Result<Arc<ApiClient>> {
    Ok(Arc::new(ApiClient::from_config(store)?))
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Init => commands::init::handle(output_format).await,
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Company { cmd } => commands::company::handle(cmd, output_format).await,
        Commands::Resource { cmd } => commands::resource::handle(cmd, output_format).await,
    }
}
