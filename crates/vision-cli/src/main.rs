//! Vision CLI - listings browser and admin panel for Vision real-estate sites.
//!
//! Public commands (`home`, `search`, `show`, `interest`) work without an
//! account. Admin commands (`dashboard`, `properties`, `leads`, `users`) need
//! a session from `vision login`; the session is kept per backend origin.

mod app;
mod ui;

use std::io;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vision_core::models::{ListingStatus, Role};

use app::App;

/// Directory for an additional daily-rotated log file
const LOG_DIR_ENV: &str = "VISION_LOG_DIR";

const LOG_FILE_NAME: &str = "vision.log";

#[derive(Parser)]
#[command(name = "vision")]
#[command(about = "Vision Imóveis - listings browser and admin panel")]
#[command(version)]
struct Cli {
    /// Print JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in to the admin panel
    Login {
        /// Username (defaults to VISION_USERNAME or the last one used)
        username: Option<String>,

        /// Remember the password in the system keychain
        #[arg(long)]
        remember: bool,
    },

    /// Log out and forget the session
    Logout {
        /// Also remove the remembered password
        #[arg(long)]
        forget: bool,
    },

    /// Show the logged in user
    Whoami,

    /// Featured listings from the home page
    Home,

    /// Search listings
    Search {
        #[arg(short, long)]
        location: Option<String>,

        /// Listing type, e.g. venda or aluguel
        #[arg(short = 't', long = "type")]
        property_type: Option<String>,

        #[arg(short = 'p', long)]
        max_price: Option<String>,
    },

    /// Show a single listing
    Show { id: String },

    /// Register interest in a listing
    Interest {
        property_id: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        phone: String,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(short, long, default_value = "")]
        message: String,
    },

    /// Admin dashboard summary
    Dashboard,

    /// Manage listings
    Properties {
        #[command(subcommand)]
        action: PropertyCommands,
    },

    /// Manage leads
    Leads {
        #[command(subcommand)]
        action: LeadCommands,
    },

    /// Manage admin and broker accounts
    Users {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Show or change the stored configuration
    Config {
        /// Backend URL, origin plus /api
        #[arg(long)]
        api_url: Option<String>,

        /// Origin serving uploaded images
        #[arg(long)]
        asset_url: Option<String>,

        /// Request timeout in seconds, 0 to disable
        #[arg(long)]
        timeout: Option<u64>,
    },
}

#[derive(Subcommand)]
pub enum PropertyCommands {
    /// List every listing, including inactive ones
    List {
        /// Match title or location
        #[arg(short, long)]
        search: Option<String>,

        #[arg(short = 't', long = "type")]
        property_type: Option<String>,

        /// active or inactive
        #[arg(long)]
        status: Option<ListingStatus>,
    },

    /// Create a listing
    Create {
        #[command(flatten)]
        fields: PropertyFields,
    },

    /// Update a listing; only the given fields change
    Update {
        id: String,

        #[command(flatten)]
        fields: PropertyFields,
    },

    /// Show a listing on the public site
    Activate { id: String },

    /// Hide a listing from the public site
    Deactivate { id: String },

    Delete {
        id: String,

        /// Skip the confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args)]
pub struct PropertyFields {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(short = 't', long = "type")]
    pub property_type: Option<String>,

    #[arg(long)]
    pub price: Option<f64>,

    #[arg(long)]
    pub location: Option<String>,

    /// Area in square meters
    #[arg(long)]
    pub area: Option<f64>,

    #[arg(long)]
    pub bedrooms: Option<u32>,

    #[arg(long)]
    pub bathrooms: Option<u32>,

    #[arg(long)]
    pub garages: Option<u32>,

    /// Image file to upload; repeat for several
    #[arg(short, long = "image")]
    pub images: Vec<PathBuf>,
}

#[derive(Subcommand)]
pub enum LeadCommands {
    List {
        #[arg(long)]
        status: Option<String>,

        /// Only leads for this listing
        #[arg(long)]
        property: Option<String>,
    },

    Show { id: String },

    /// Set the follow-up status of a lead
    Status { id: String, status: String },

    Delete {
        id: String,

        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    List,

    /// Only broker accounts
    Brokers,

    Show { id: String },

    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        username: String,

        #[arg(long, default_value = "")]
        email: String,

        /// admin or broker
        #[arg(long, default_value = "broker")]
        role: Role,
    },

    Update {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        role: Option<Role>,

        /// Prompt for a new password
        #[arg(long)]
        password: bool,
    },

    Delete {
        id: String,

        #[arg(short, long)]
        yes: bool,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr, filtered by RUST_LOG (default `warn`). When
/// VISION_LOG_DIR is set a daily file log is written there as well; the
/// returned guard must live until exit so the file is flushed.
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = std::env::var(LOG_DIR_ENV)
        .ok()
        .filter(|dir| !dir.trim().is_empty());

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let log_guard = init_tracing();
    let cli = Cli::parse();
    info!("vision starting");

    let result = match App::new(cli.json) {
        Ok(mut app) => app.run(cli.command).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        drop(log_guard);
        std::process::exit(1);
    }
}
