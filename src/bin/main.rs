//! Datalens CLI - schema introspection and data-quality service
//!
//! Usage:
//!   datalens serve [--config <file>] [--database <path>] [--port <port>]
//!   datalens init [--database <path>]
//!
//! Examples:
//!   datalens serve --database ./database.db --port 8000
//!   datalens init --database ./database.db

use clap::{Parser, Subcommand};
use datalens::config::Settings;
use datalens::quality::Summarizer;
use datalens::store::Store;
use datalens::web::{self, AppState};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "datalens")]
#[command(about = "Datalens - schema introspection and data-quality service")]
#[command(version)]
struct Cli {
    /// Path to config file (defaults to the standard search locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Override the database path from the config
        #[arg(long)]
        database: Option<PathBuf>,

        /// Override the bind port from the config
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create the database schema and exit
    Init {
        /// Override the database path from the config
        #[arg(long)]
        database: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            error!("failed to load settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Serve { database, port } => cmd_serve(settings, database, port).await,
        Commands::Init { database } => cmd_init(settings, database),
    }
}

fn load_settings(config: Option<&std::path::Path>) -> Result<Settings, Box<dyn std::error::Error>> {
    match config {
        Some(path) => Ok(Settings::from_file(path)?),
        None => Ok(Settings::load()?),
    }
}

async fn cmd_serve(
    settings: Settings,
    database: Option<PathBuf>,
    port: Option<u16>,
) -> ExitCode {
    let database = database.unwrap_or_else(|| settings.database.path.clone());
    let port = port.unwrap_or(settings.server.port);

    let store = match Store::open(&database) {
        Ok(store) => store,
        Err(e) => {
            error!("failed to open database {}: {}", database.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let summarizer = match build_summarizer(&settings) {
        Ok(summarizer) => summarizer,
        Err(e) => {
            error!("invalid summarizer configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let state = AppState { store, summarizer };
    match web::serve(state, &settings.server.host, port).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_init(settings: Settings, database: Option<PathBuf>) -> ExitCode {
    let database = database.unwrap_or_else(|| settings.database.path.clone());

    match Store::open(&database) {
        Ok(_) => {
            println!("schema ready at {}", database.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("failed to initialize {}: {}", database.display(), e);
            ExitCode::FAILURE
        }
    }
}

fn build_summarizer(settings: &Settings) -> Result<Option<Summarizer>, Box<dyn std::error::Error>> {
    match &settings.summarizer {
        Some(summarizer) => {
            let resolved = summarizer.resolved()?;
            Ok(Some(Summarizer::new(&resolved)?))
        }
        None => Ok(None),
    }
}
