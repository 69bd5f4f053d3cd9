//! Customer preferences CLI - metafield provisioning tools.
//!
//! # Usage
//!
//! ```bash
//! # List the metafield definitions the app provisions
//! prefs-cli specs
//!
//! # Provision them on a shop (token from SHOPIFY_ADMIN_ACCESS_TOKEN)
//! prefs-cli provision --shop pistachio.myshopify.com
//!
//! # Same, printing the report as JSON
//! prefs-cli provision --shop pistachio.myshopify.com --json
//! ```
//!
//! # Commands
//!
//! - `specs` - Print the compiled-in metafield specs
//! - `provision` - Create any missing metafield definitions on a shop

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use preferences_app::config::DEFAULT_API_VERSION;
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "prefs-cli")]
#[command(author, version, about = "Customer preferences app CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the metafield definitions the app provisions
    Specs {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create any missing metafield definitions on a shop
    Provision {
        /// Shop domain (e.g., pistachio.myshopify.com)
        #[arg(short, long)]
        shop: String,

        /// Offline Admin API access token
        #[arg(long, env = "SHOPIFY_ADMIN_ACCESS_TOKEN", hide_env_values = true)]
        access_token: String,

        /// Admin API version
        #[arg(long, env = "SHOPIFY_API_VERSION", default_value = DEFAULT_API_VERSION)]
        api_version: String,

        /// Send requests to this GraphQL endpoint instead of the shop's
        #[arg(long)]
        endpoint: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    // Load .env before parsing so env-backed arguments pick it up
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Specs { json } => commands::specs::print(json)?,
        Commands::Provision {
            shop,
            access_token,
            api_version,
            endpoint,
            json,
        } => {
            commands::provision::run(commands::provision::ProvisionArgs {
                shop,
                access_token: SecretString::from(access_token),
                api_version,
                endpoint,
                json,
            })
            .await?;
        }
    }
    Ok(())
}
