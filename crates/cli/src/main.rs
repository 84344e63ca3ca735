//! Greenmarket CLI - browse the catalog, manage the cart and check out.
//!
//! # Usage
//!
//! ```bash
//! # List carrots, cheapest first
//! gm-cli products --search carrot --sort price-asc
//!
//! # Show the cart with discounts applied
//! gm-cli cart
//!
//! # Voice transcript as typed text
//! gm-cli say "remove leeks from the cart"
//!
//! # Check out one product against the seeded in-memory store
//! gm-cli --offline checkout veg-carrot \
//!     --country "Sri Lanka" --street "12 Galle Road" --city Colombo \
//!     --postal-code 00300 --phone 0771234567 \
//!     --email shopper@example.lk --first-name Nimal --last-name Perera \
//!     --card 4111111111111111 --expiry 0128 --cvc 123 --zip 10115
//! ```
//!
//! # Commands
//!
//! - `products` - List and filter the catalog
//! - `cart` - Show cart lines, discounts and totals
//! - `add` / `change` / `remove` - Edit the cart
//! - `say` - Apply a voice command transcript
//! - `lookup` - Resolve a postal code to its area and district
//! - `checkout` - Run one product through the checkout stages

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use greenmarket_storefront::{StorefrontConfig, StorefrontError};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::checkout::CheckoutArgs;
use commands::session::Session;

#[derive(Parser)]
#[command(name = "gm-cli")]
#[command(author, version, about = "Greenmarket storefront CLI")]
struct Cli {
    /// Use a seeded in-memory store instead of the backend
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products
    Products {
        /// Case-insensitive name filter
        #[arg(short, long, default_value = "")]
        search: String,

        /// Category to show (`all` for every category)
        #[arg(short, long, default_value = "all")]
        category: String,

        /// `default`, `price-asc` or `price-desc`
        #[arg(long, default_value = "default")]
        sort: String,
    },
    /// Show the cart
    Cart,
    /// Add units of a product to the cart
    Add {
        /// Product id
        id: String,

        /// Units to add
        #[arg(short, long, default_value_t = 2)]
        qty: u32,
    },
    /// Change a cart line by a positive or negative amount
    Change {
        /// Product id
        id: String,

        /// Units to add (negative to take away)
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Remove a product from the cart
    Remove {
        /// Product id
        id: String,
    },
    /// Apply a voice command transcript
    Say {
        /// Recognized speech, e.g. "remove leeks from the cart"
        #[arg(required = true, num_args = 1..)]
        transcript: Vec<String>,
    },
    /// Resolve a postal code to its area and district
    Lookup {
        /// Postal code (3 to 5 digits)
        postal_code: String,
    },
    /// Check out a single cart product
    Checkout(Box<CheckoutArgs>),
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Offline runs tolerate a missing configuration; see Session::offline
    let config = StorefrontConfig::from_env();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "greenmarket_storefront=info,gm_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, config).await;

    if let Err(e) = result {
        if let Some(storefront_error) = e.downcast_ref::<StorefrontError>() {
            storefront_error.report();
        }
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(
    cli: Cli,
    config: Result<StorefrontConfig, greenmarket_storefront::config::ConfigError>,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = if cli.offline {
        Session::offline(config.ok())
    } else {
        Session::connect(&config?)
    };

    match cli.command {
        Commands::Products {
            search,
            category,
            sort,
        } => commands::catalog::products(&session, &search, &category, &sort).await?,
        Commands::Cart => commands::cart::show(&session).await?,
        Commands::Add { id, qty } => commands::cart::add(&session, &id, qty).await?,
        Commands::Change { id, delta } => commands::cart::change(&session, &id, delta).await?,
        Commands::Remove { id } => commands::cart::remove(&session, &id).await?,
        Commands::Say { transcript } => {
            commands::cart::say(&session, &transcript.join(" ")).await?;
        }
        Commands::Lookup { postal_code } => {
            commands::catalog::lookup(&session, &postal_code).await?;
        }
        Commands::Checkout(args) => commands::checkout::run(&session, &args).await?,
    }

    Ok(())
}
