//! API Hub CLI - database migrations and ad-hoc API calls.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! hub-cli migrate
//!
//! # Fetch every page of a Shopify resource
//! hub-cli call \
//!     --url https://my-shop.myshopify.com/admin/api/2024-01/products.json \
//!     --header X-Shopify-Access-Token=shpat_... \
//!     --param limit=250
//!
//! # Print the Pinterest consent URL
//! hub-cli pinterest authorize-url --client-id 1484362 --redirect-uri https://hub.example.com/callback
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `call` - Proxy a call through the paginating client and print `{"data": [...]}`
//! - `pinterest authorize-url` - Build the Pinterest OAuth consent URL

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "hub-cli")]
#[command(author, version, about = "API Hub CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Call an API, following pagination, and print the merged records
    Call {
        /// Target URL
        #[arg(short, long)]
        url: String,

        /// HTTP method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request header as KEY=VALUE (repeatable)
        #[arg(short = 'H', long = "header", value_parser = commands::call::parse_pair)]
        headers: Vec<(String, String)>,

        /// Query parameter as KEY=VALUE (repeatable)
        #[arg(short, long = "param", value_parser = commands::call::parse_pair)]
        params: Vec<(String, String)>,
    },
    /// Pinterest OAuth helpers
    Pinterest {
        #[command(subcommand)]
        action: PinterestAction,
    },
}

#[derive(Subcommand)]
enum PinterestAction {
    /// Print the consent-page URL for an app
    AuthorizeUrl {
        /// Pinterest app ID
        #[arg(long)]
        client_id: String,

        /// Redirect URI registered with the app
        #[arg(long)]
        redirect_uri: String,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    // Logs go to stderr so `call` output stays pipeable
    tracing_subscriber::fmt()
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Call {
            url,
            method,
            headers,
            params,
        } => commands::call::run(url, &method, headers, params).await?,
        Commands::Pinterest { action } => match action {
            PinterestAction::AuthorizeUrl {
                client_id,
                redirect_uri,
            } => commands::pinterest::authorize_url(&client_id, &redirect_uri)?,
        },
    }
    Ok(())
}
