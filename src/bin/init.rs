//! paletted_init - One-time database initialization tool
//!
//! Creates a fresh palette database seeded with a sample palette.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use paletted::init::{init_database, AdminAccount};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// paletted database initialization tool
#[derive(Parser, Debug)]
#[command(
    name = "paletted_init",
    version,
    about = "Initialize a new paletted database"
)]
struct Args {
    /// Path to SQLite database file to create (must not exist)
    #[arg(short, long)]
    database: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paletted=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let args = Args::parse();

    // Admin credentials are optional but must come as a pair
    let email = std::env::var("PALETTED_ADMIN_EMAIL").ok();
    let password = std::env::var("PALETTED_ADMIN_PASSWORD").ok();
    let admin = match (email, password) {
        (Some(email), Some(password)) => Some(AdminAccount { email, password }),
        (None, None) => None,
        _ => bail!("PALETTED_ADMIN_EMAIL and PALETTED_ADMIN_PASSWORD must be set together"),
    };

    init_database(&args.database, admin.as_ref()).await?;

    Ok(())
}
