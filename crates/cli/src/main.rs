//! Kirana CLI - Database migrations, catalog seeding and settings.
//!
//! # Usage
//!
//! ```bash
//! # Apply document store migrations
//! kirana-cli migrate
//!
//! # Load products (and optional settings) from YAML
//! kirana-cli seed crates/cli/data/catalog.yaml
//!
//! # Show effective settings
//! kirana-cli settings show
//!
//! # Set one settings field (value is JSON)
//! kirana-cli settings set freeShippingThreshold '"999"'
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Upsert catalog products from a YAML file
//! - `settings` - Read or change the global settings document

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "kirana-cli")]
#[command(author, version, about = "Kirana CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Upsert products from a YAML catalog file
    Seed {
        /// Path to the YAML file
        file: String,

        /// Validate the file without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Read or change store settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the effective settings as JSON
    Show,
    /// Set one field, e.g. `currency '"USD"'`
    Set {
        /// Field name in camelCase
        key: String,

        /// JSON value
        value: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file, dry_run } => commands::seed::catalog(&file, dry_run).await?,
        Commands::Settings { action } => match action {
            SettingsAction::Show => commands::settings::show().await?,
            SettingsAction::Set { key, value } => commands::settings::set(&key, &value).await?,
        },
    }
    Ok(())
}
