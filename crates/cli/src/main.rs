//! Hello Laundry CLI - Database migrations and maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Run API database migrations
//! hl-cli migrate
//!
//! # Delete OTP rows past the validity window
//! hl-cli gc-otps
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `gc-otps` - Sweep expired one-time passcodes

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "hl-cli")]
#[command(author, version, about = "Hello Laundry CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Delete OTP rows past the validity window
    GcOtps,
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
        Commands::GcOtps => commands::gc_otps::run().await?,
    }
    Ok(())
}
