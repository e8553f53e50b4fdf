//! Petalbox CLI
//!
//! Operator tool for the Petalbox storefront backend.
//!
//! # Commands
//!
//! ```bash
//! # Sessions
//! petal login -e staff@petalbox.shop
//! petal whoami
//! petal logout
//!
//! # Staff boards
//! petal deliveries --status in_progress --query "District 3"
//! petal set-status delivery 42 completed
//!
//! # Admin
//! petal dashboard --surface admin
//! petal report --period month --export ./reports
//!
//! # Shopping
//! petal cart add weekly-bloom -q 2
//! petal cart checkout --address "12 Le Loi, District 1"
//! ```
//!
//! # Environment Variables
//!
//! - `PETALBOX_API_URL` - Backend REST base URL
//! - `PETALBOX_SESSION_FILE` - Where the signed-in session is kept
//! - `PETALBOX_LOG_JSON` - Emit JSON log lines
//! - `SENTRY_DSN` - Report errors to Sentry

#![cfg_attr(not(test), forbid(unsafe_code))]

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use petalbox_core::ReportPeriod;
use secrecy::SecretString;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::{Context, ListArgs, Surface};

#[derive(Parser)]
#[command(name = "petal")]
#[command(author, version, about = "Petalbox storefront operator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "PETALBOX_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign in with a Google credential
    GoogleLogin {
        /// ID token returned by Google sign-in
        credential: String,
    },

    /// Create a customer account
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "PETALBOX_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        phone: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in identity and its menu
    Whoami {
        /// Confirm the token with the backend first
        #[arg(long)]
        verify: bool,
    },

    /// Show or edit the signed-in profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },

    /// Forgotten-password flow
    Password {
        #[command(subcommand)]
        action: PasswordAction,
    },

    /// Browse the package catalogue
    Packages {
        /// Show a single package
        #[arg(long)]
        id: Option<String>,

        /// Free-text search
        #[arg(short, long, default_value = "")]
        query: String,
    },

    /// Customer list with summary
    Customers(ListArgs),

    /// Order list with summary
    Orders(ListArgs),

    /// Delivery board with summary
    Deliveries(ListArgs),

    /// Change the status of an order, delivery or customer
    SetStatus {
        #[command(subcommand)]
        target: commands::manage::StatusTarget,
    },

    /// Record a contact with a customer
    Contact {
        /// Customer id
        id: String,

        /// phone, email, sms, visit
        #[arg(short, long, default_value = "phone")]
        method: String,

        #[arg(short, long)]
        notes: String,
    },

    /// Headline numbers
    Dashboard {
        #[arg(long, value_enum, default_value_t = Surface::Staff)]
        surface: Surface,
    },

    /// Delivery and revenue report for a period
    Report {
        /// day, week, month, quarter or year
        #[arg(short, long, default_value = "week")]
        period: ReportPeriod,

        #[arg(long, value_enum, default_value_t = Surface::Admin)]
        surface: Surface,

        /// Write the report as JSON into this directory
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Manage the local cart and check out
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },

    /// List the signed-in customer's subscriptions
    Subscriptions,

    /// Check a payment gateway return
    VerifyPayment {
        /// Gateway return parameters as key=value
        #[arg(required = true)]
        params: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Change profile fields
    Update {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        address: Option<String>,
    },

    /// Change the password of the signed-in account
    ChangePassword {
        #[arg(long, env = "PETALBOX_PASSWORD", hide_env_values = true)]
        current: String,

        #[arg(long, env = "PETALBOX_NEW_PASSWORD", hide_env_values = true)]
        new: String,
    },
}

#[derive(Subcommand)]
enum PasswordAction {
    /// Email a reset link
    Forgot {
        #[arg(short, long)]
        email: String,
    },

    /// Set a new password with the token from the reset link
    Reset {
        #[arg(short, long)]
        token: String,

        #[arg(long, env = "PETALBOX_NEW_PASSWORD", hide_env_values = true)]
        new: String,
    },
}

/// Initialize Sentry when `SENTRY_DSN` is set; the guard must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|v| !v.is_empty())?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: std::env::var("SENTRY_ENVIRONMENT")
                .ok()
                .map(std::borrow::Cow::Owned),
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

fn init_tracing(with_sentry: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "petalbox_cli=info,petalbox_client=info".into());

    let json = std::env::var("PETALBOX_LOG_JSON").is_ok();
    // Command output owns stdout; logs go to stderr
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    let sentry_layer =
        with_sentry.then(|| sentry_tracing::layer().event_filter(sentry_event_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_layer)
        .init();
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Sentry must be initialized before the subscriber
    let sentry_guard = init_sentry();
    init_tracing(sentry_guard.is_some());

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::from_env()?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::account::login(&ctx, &email, &SecretString::from(password)).await?;
        }
        Commands::GoogleLogin { credential } => {
            commands::account::google_login(&ctx, &credential).await?;
        }
        Commands::Register {
            name,
            email,
            password,
            phone,
        } => {
            let password = SecretString::from(password);
            commands::account::register(&ctx, name, &email, &password, phone).await?;
        }
        Commands::Logout => commands::account::logout(&ctx)?,
        Commands::Whoami { verify } => commands::account::whoami(&ctx, verify).await?,
        Commands::Profile { action } => match action {
            None => commands::account::show_profile(&ctx).await?,
            Some(ProfileAction::Update {
                name,
                phone,
                address,
            }) => {
                commands::account::update_profile(&ctx, name, phone, address).await?;
            }
            Some(ProfileAction::ChangePassword { current, new }) => {
                let (current, new) = (SecretString::from(current), SecretString::from(new));
                commands::account::change_password(&ctx, &current, &new).await?;
            }
        },
        Commands::Password { action } => match action {
            PasswordAction::Forgot { email } => {
                commands::account::forgot_password(&ctx, &email).await?;
            }
            PasswordAction::Reset { token, new } => {
                commands::account::reset_password(&ctx, &token, &SecretString::from(new)).await?;
            }
        },
        Commands::Packages { id, query } => match id {
            Some(id) => commands::catalog::show(&ctx, &id).await?,
            None => commands::catalog::list(&ctx, &query).await?,
        },
        Commands::Customers(args) => commands::manage::customers(&ctx, &args).await?,
        Commands::Orders(args) => commands::manage::orders(&ctx, &args).await?,
        Commands::Deliveries(args) => commands::manage::deliveries(&ctx, &args).await?,
        Commands::SetStatus { target } => commands::manage::set_status(&ctx, target).await?,
        Commands::Contact { id, method, notes } => {
            commands::manage::contact(&ctx, &id, method, notes).await?;
        }
        Commands::Dashboard { surface } => commands::reports::dashboard(&ctx, surface).await?,
        Commands::Report {
            period,
            surface,
            export,
        } => commands::reports::report(&ctx, period, surface, export.as_deref()).await?,
        Commands::Cart { action } => commands::cart::run(&ctx, action).await?,
        Commands::Subscriptions => commands::cart::subscriptions(&ctx).await?,
        Commands::VerifyPayment { params } => {
            commands::cart::verify_payment(&ctx, &params).await?;
        }
    }

    Ok(())
}
