//! MegaCart CLI - browse the catalog, manage a cart and sign in from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # List products, optionally filtered
//! megacart products --search mat --category Sports --max 2000
//!
//! # Show categories and backend status
//! megacart categories
//! megacart status
//!
//! # Sign in (password is read from stdin when not given). The address is
//! # checked locally before anything is sent.
//! megacart login -e shopper@example.in
//! megacart whoami
//! megacart logout
//!
//! # Interactive browse-and-cart session
//! megacart shop
//! ```
//!
//! Configuration comes from the environment; see
//! [`megacart_storefront::config`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use megacart_core::Email;
use megacart_storefront::{StorefrontConfig, StorefrontError};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "megacart")]
#[command(author, version, about = "MegaCart terminal storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products matching a filter
    Products {
        /// Case-insensitive substring of the product name
        #[arg(short, long, default_value = "")]
        search: String,

        /// Category name, or "All"
        #[arg(short, long, default_value = "All")]
        category: String,

        /// Lowest price to include
        #[arg(long)]
        min: Option<Decimal>,

        /// Highest price to include
        #[arg(long)]
        max: Option<Decimal>,
    },
    /// List product categories
    Categories,
    /// Check whether the backend is reachable
    Status,
    /// Sign in and remember the session
    Login {
        /// Account email address
        #[arg(short, long)]
        email: Email,

        /// Password (prompted on stdin if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Account email address
        #[arg(short, long)]
        email: Email,

        /// Password (prompted on stdin if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the saved session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Interactive browse-and-cart session
    Shop,
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

    Some(guard)
}

/// Warnings and errors become Sentry events; info and debug become breadcrumbs.
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

    let config = match StorefrontConfig::from_env().map_err(StorefrontError::from) {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt().with_writer(std::io::stderr).init();
            tracing::error!(error = %e, "{}", e.user_message());
            std::process::exit(2);
        }
    };

    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output on stdout stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "megacart_storefront=info,megacart_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, &config).await {
        tracing::error!(error = %e, "{}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> megacart_storefront::Result<()> {
    match cli.command {
        Commands::Products {
            search,
            category,
            min,
            max,
        } => {
            let filter =
                megacart_core::FilterState::new(search, category).with_price_range(min, max);
            commands::catalog::products(config, filter).await;
        }
        Commands::Categories => commands::catalog::categories(config).await,
        Commands::Status => commands::catalog::status(config).await,
        Commands::Login { email, password } => {
            commands::auth::login(config, &email, password).await?;
        }
        Commands::Register {
            name,
            email,
            password,
        } => commands::auth::register(config, name, email, password).await?,
        Commands::Logout => commands::auth::logout(config),
        Commands::Whoami => commands::auth::whoami(config).await,
        Commands::Shop => commands::shop::run(config).await?,
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_email_is_validated() {
        let cli = Cli::try_parse_from(["megacart", "login", "-e", " Asha@Example.COM ", "-p", "x"])
            .unwrap();
        let Commands::Login { email, .. } = cli.command else {
            panic!("expected login");
        };
        assert_eq!(email.as_str(), "Asha@example.com");

        assert!(Cli::try_parse_from(["megacart", "login", "-e", "asha"]).is_err());
        assert!(
            Cli::try_parse_from(["megacart", "register", "-n", "Asha", "-e", "asha@localhost"])
                .is_err()
        );
    }
}
