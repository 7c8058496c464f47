use clap::{Parser, Subcommand};

use crate::config::{self, AppConfig};
use crate::database::DatabaseManager;

#[derive(Parser)]
#[command(name = "markdown-editor-api")]
#[command(about = "REST backend for the markdown editor and its community feed")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Bind address, overrides SERVER_HOST")]
        host: Option<String>,
        #[arg(long, short, help = "Listen port, overrides SERVER_PORT")]
        port: Option<u16>,
    },

    #[command(about = "Create missing tables and indexes, then exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = config::config().clone();

    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => {
            apply_overrides(&mut config, host, port);
            crate::server::serve(config).await
        }
        Commands::Migrate => migrate(&config).await,
    }
}

fn apply_overrides(config: &mut AppConfig, host: Option<String>, port: Option<u16>) {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
}

async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let database = DatabaseManager::connect_lazy(&config.database)?;
    let result = database.migrate().await;
    database.close().await;
    result?;
    println!("Schema ready on {}", config.database_display());
    Ok(())
}
