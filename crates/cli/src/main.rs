//! Dragon Bundle CLI - Database migrations and development seeding.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! dragon-cli migrate
//!
//! # Seed a development shop (and a demo bundle)
//! dragon-cli seed --shop dev-shop.myshopify.com
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed a development shop and demo bundle

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "dragon-cli")]
#[command(author, version, about = "Dragon Bundle CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed a development shop and demo bundle
    Seed {
        /// Shop domain to seed (e.g., dev-shop.myshopify.com)
        #[arg(short, long)]
        shop: String,

        /// Access token to store for the shop (a placeholder by default)
        #[arg(short, long, default_value = "dev-token")]
        token: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { shop, token } => commands::seed::run(&shop, &token).await?,
    }
    Ok(())
}
