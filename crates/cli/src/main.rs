//! Mithadi CLI - Drive the cart store against the configured backends.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! mithadi products
//! mithadi product kaju-katli
//!
//! # Edit the cart (persisted under CART_STORAGE_DIR)
//! mithadi cart add kaju-katli --quantity 2
//! mithadi cart update gid://shopify/ProductVariant/1 3
//! mithadi cart show
//!
//! # Pay with Razorpay
//! mithadi pay --name "Asha" --email asha@example.com
//! mithadi confirm order_Ox1 pay_Ox2 <signature>
//! ```
//!
//! # Commands
//!
//! - `products`, `product` - Read the catalog
//! - `cart` - Show and edit the persisted cart
//! - `pay` - Create a payment order and print the widget options
//! - `confirm` - Verify a payment callback and clear the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use mithadi_storefront::StorefrontConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{CliError, Session};

#[derive(Parser)]
#[command(name = "mithadi")]
#[command(author, version, about = "Mithadi Palace cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products from the catalog backend
    Products,
    /// Show one product and its variants
    Product {
        /// Product URL handle
        handle: String,
    },
    /// Show and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Create a payment order for the cart and print the widget options
    Pay {
        /// Customer name
        #[arg(short, long)]
        name: Option<String>,

        /// Customer email
        #[arg(short, long)]
        email: Option<String>,

        /// Customer phone number
        #[arg(short, long)]
        contact: Option<String>,
    },
    /// Verify a payment callback and clear the cart
    Confirm {
        /// Gateway order ID
        order_id: String,
        /// Gateway payment ID
        payment_id: String,
        /// Signature from the success callback
        signature: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show line items, totals and the checkout
    Show,
    /// Add a product to the cart
    Add {
        /// Product URL handle
        handle: String,

        /// Variant ID (defaults to the first variant for sale)
        #[arg(short, long)]
        variant: Option<String>,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity of a line (0 removes it)
    Update {
        /// Variant ID
        variant_id: String,
        /// New quantity
        quantity: u32,
    },
    /// Remove a line
    Remove {
        /// Variant ID
        variant_id: String,
    },
    /// Empty the cart
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
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
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Failed to load configuration: {e}");
            }
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mithadi_storefront=info,mithadi_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), CliError> {
    let mut session = Session::open(config)?;
    let result = dispatch(&session, cli.command).await;
    // Failures emit notices too
    session.print_notices();
    result
}

async fn dispatch(session: &Session, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Products => commands::catalog::list(session).await?,
        Commands::Product { handle } => commands::catalog::show(session, &handle).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(session)?,
            CartAction::Add {
                handle,
                variant,
                quantity,
            } => commands::cart::add(session, &handle, variant.as_deref(), quantity).await?,
            CartAction::Update {
                variant_id,
                quantity,
            } => commands::cart::update(session, &variant_id, quantity).await,
            CartAction::Remove { variant_id } => {
                commands::cart::remove(session, &variant_id).await;
            }
            CartAction::Clear => commands::cart::clear(session),
        },
        Commands::Pay {
            name,
            email,
            contact,
        } => {
            commands::payment::pay(
                session,
                name.as_deref(),
                email.as_deref(),
                contact.as_deref(),
            )
            .await?;
        }
        Commands::Confirm {
            order_id,
            payment_id,
            signature,
        } => commands::payment::confirm(session, order_id, payment_id, signature).await?,
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mithadi_storefront::config::{
        BackendConfig, BrandConfig, CartConfig, PetpoojaConfig, RazorpayConfig,
    };
    use mithadi_storefront::notice::{self, Notice};
    use secrecy::SecretString;

    use super::*;

    fn config(storage_dir: &std::path::Path) -> StorefrontConfig {
        StorefrontConfig {
            backend: BackendConfig::Petpooja(PetpoojaConfig {
                base_url: "http://127.0.0.1:9".to_string(),
                access_token: SecretString::from("k3Jd9sPq2LmX7vTz"),
                app_secret: SecretString::from("Qw8eRt5yUi2oPa7s"),
                app_key: "mithadi".to_string(),
            }),
            payment: Some(RazorpayConfig {
                key_id: "rzp_test_mithadi".to_string(),
                key_secret: SecretString::from("Zx4cVb7nMq1wEr9t"),
            }),
            brand: BrandConfig::default(),
            cart: CartConfig {
                storage_dir: storage_dir.to_path_buf(),
                ..CartConfig::default()
            },
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[tokio::test]
    async fn test_failed_command_keeps_notices() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(config(dir.path())).unwrap();

        let command = Commands::Pay {
            name: None,
            email: None,
            contact: None,
        };
        let result = dispatch(&session, command).await;

        assert!(matches!(result, Err(CliError::Cart(_))));
        assert_eq!(
            session.take_notices(),
            vec![Notice::error(notice::CART_EMPTY)]
        );
    }
}
