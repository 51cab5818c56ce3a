//! Verdant CLI - a terminal cart for the Verdant storefront.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! verdant products --category indoor
//!
//! # Fill the cart
//! verdant cart add monstera-deliciosa -q 2
//! verdant cart update monstera-deliciosa 1
//! verdant cart summary
//!
//! # Start over with a new session
//! verdant session reset
//! ```
//!
//! The session id is kept in `--state-dir`, so consecutive invocations from
//! the same shell share one cart.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use verdant_client::{CartClient, FileStorage, SessionProvider};

mod commands;

/// Default API location when neither `--base-url` nor `VERDANT_API_URL` is set.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

#[derive(Parser)]
#[command(name = "verdant")]
#[command(author, version, about = "Verdant storefront cart")]
struct Cli {
    /// Base URL of the storefront API
    #[arg(long, env = "VERDANT_API_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Directory holding the session id (defaults to ~/.verdant)
    #[arg(long, env = "VERDANT_STATE_DIR")]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// List the product catalog
    Products {
        /// Only show products in this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Manage the local session id
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart's line items
    Show,
    /// Add a product to the cart
    Add {
        /// Product id (see `verdant products`)
        product_id: String,

        /// Number of units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity (0 removes the line)
    Update {
        /// Product id
        product_id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product from the cart
    Remove {
        /// Product id
        product_id: String,
    },
    /// Empty the cart
    Clear,
    /// Show totals at current prices
    Summary,
}

#[derive(Subcommand)]
enum SessionAction {
    /// Print the current session id
    Show,
    /// Forget the session id and start a new cart
    Reset,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so command output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
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
    let state_dir = cli.state_dir.unwrap_or_else(default_state_dir);
    let sessions = SessionProvider::new(FileStorage::new(state_dir));

    match cli.command {
        Commands::Cart { action } => {
            let client = CartClient::new(&cli.base_url)?;
            let session = sessions.session_id()?;
            match action {
                CartAction::Show => commands::cart::show(&client, &session).await?,
                CartAction::Add {
                    product_id,
                    quantity,
                } => commands::cart::add(&client, &session, &product_id, quantity).await?,
                CartAction::Update {
                    product_id,
                    quantity,
                } => commands::cart::update(&client, &session, &product_id, quantity).await?,
                CartAction::Remove { product_id } => {
                    commands::cart::remove(&client, &session, &product_id).await?;
                }
                CartAction::Clear => commands::cart::clear(&client, &session).await?,
                CartAction::Summary => commands::cart::summary(&client, &session).await?,
            }
        }
        Commands::Products { category } => {
            let client = CartClient::new(&cli.base_url)?;
            commands::products::list(&client, category.as_deref()).await?;
        }
        Commands::Session { action } => match action {
            SessionAction::Show => commands::session::show(&sessions)?,
            SessionAction::Reset => commands::session::reset(&sessions)?,
        },
    }
    Ok(())
}

/// `~/.verdant`, or `.verdant` in the working directory without a home.
fn default_state_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map_or_else(|| PathBuf::from(".verdant"), |home| PathBuf::from(home).join(".verdant"))
}
