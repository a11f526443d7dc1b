//! Ruta CLI - Command-line interface for Ruta
//!
//! Loads connection files, answers route queries from the shell and
//! starts the route server.

use clap::{Parser, Subcommand};
use colored::Colorize;
use ruta_ingest::DEFAULT_TENANT;
use ruta_server::DEFAULT_PORT;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "ruta")]
#[command(author = "Ruta Contributors")]
#[command(version)]
#[command(about = "Shortest routes over per-tenant connection graphs", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a connection file without loading it anywhere
    Check {
        /// Connection file (source,target,time per line)
        file: PathBuf,
    },

    /// List the locations defined by a connection file
    Locations {
        /// Connection file (source,target,time per line)
        file: PathBuf,
    },

    /// Find the shortest route between two locations
    Route {
        /// Connection file (source,target,time per line)
        file: PathBuf,

        /// Starting location
        #[arg(long)]
        from: String,

        /// Destination location
        #[arg(long)]
        to: String,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Start the Ruta server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Headless mode: bind to 0.0.0.0 for remote access
        #[arg(long)]
        headless: bool,

        /// Tenant used by requests that don't name one
        #[arg(short, long, default_value = DEFAULT_TENANT)]
        tenant: String,

        /// Connection file to preload into the default tenant
        #[arg(short, long)]
        load: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        Commands::Check { file } => commands::check(&file),
        Commands::Locations { file } => commands::locations(&file),
        Commands::Route {
            file,
            from,
            to,
            json,
        } => commands::route(&file, &from, &to, json),
        Commands::Serve {
            port,
            headless,
            tenant,
            load,
        } => commands::serve(port, headless, tenant, load.as_deref()).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
