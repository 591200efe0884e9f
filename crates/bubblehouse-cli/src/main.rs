mod commands;

use std::path::PathBuf;

use bubblehouse_sync::{DEFAULT_EMBED_PAGE, DEFAULT_TOKEN_VALIDITY_SECS};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "bubblehouse-cli")]
#[command(about = "Bubblehouse catalog sync command line interface")]
struct Cli {
    /// YAML settings file; the `BUBBLEHOUSE_*` variables are used when omitted.
    #[arg(long, global = true, env = "BUBBLEHOUSE_SETTINGS_PATH")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one sync cycle now and exit non-zero unless it was delivered.
    Sync {
        /// Read the catalog from a JSON file instead of WooCommerce.
        #[arg(long)]
        catalog_file: Option<PathBuf>,
    },
    /// Print the payload a sync would deliver, without sending it.
    Preview {
        #[arg(long)]
        catalog_file: Option<PathBuf>,
        /// Single-line JSON.
        #[arg(long)]
        compact: bool,
    },
    /// Mint a bearer token from the configured key.
    Token {
        /// Defaults to the shop slug.
        #[arg(long)]
        subject: Option<String>,
        #[arg(long, default_value_t = DEFAULT_TOKEN_VALIDITY_SECS)]
        validity_secs: i64,
    },
    /// Print the widget embed URLs.
    Embed {
        #[arg(long, default_value = DEFAULT_EMBED_PAGE)]
        page: String,
        #[arg(long)]
        customer_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = bubblehouse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings_path = cli.settings.or_else(|| config.settings_path.clone());
    let settings = bubblehouse_core::SettingsSource::from_path(settings_path.as_deref());

    match cli.command {
        Commands::Sync { catalog_file } => {
            commands::run_sync(&config, settings, catalog_file.as_deref()).await
        }
        Commands::Preview {
            catalog_file,
            compact,
        } => commands::run_preview(&config, catalog_file.as_deref(), compact).await,
        Commands::Token {
            subject,
            validity_secs,
        } => commands::run_token(&settings, subject.as_deref(), validity_secs),
        Commands::Embed { page, customer_id } => {
            commands::run_embed(&config, &settings, &page, customer_id.as_deref())
        }
    }
}

#[cfg(test)]
mod tests;
