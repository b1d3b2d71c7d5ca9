//! KnobsShop CLI - Database migrations and seeding.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! knobsshop-cli migrate
//!
//! # Seed the database with a demo catalog
//! knobsshop-cli seed
//! ```
//!
//! Both commands read `DATABASE_URL` from the environment (a `.env` file is
//! honored).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "knobsshop-cli")]
#[command(author, version, about = "KnobsShop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with demo data
    Seed,
}

#[tokio::main]
async fn main() {
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
        Commands::Seed => commands::seed::run().await?,
    }
    Ok(())
}
