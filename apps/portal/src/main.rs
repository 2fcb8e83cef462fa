//! Portal CLI.
//!
//! Signs in against the configured identity provider through browser
//! redirects and calls the portal web API with the resulting tokens.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod context;

#[derive(Parser)]
#[command(name = "portal")]
#[command(about = "Portal web API client with redirect-based sign-in")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Load .env from current directory
    #[arg(long = "dot-env", global = true)]
    dot_env: bool,

    /// Identity cache file (defaults to the user data directory)
    #[arg(long, global = true, env = "PORTAL_IDENTITY_CACHE")]
    cache: Option<PathBuf>,

    /// Print sign-in URLs instead of opening them in the browser
    #[arg(long, global = true)]
    no_browser: bool,

    /// Run the sign-in guard on every route, not only protected ones
    #[arg(long, global = true)]
    guard_all: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the effective settings and configuration warnings
    Settings,

    /// Navigate to a route, signing in first when it is protected
    Open {
        /// Route path, e.g. `/`
        #[arg(default_value = "/")]
        path: String,
    },

    /// Complete a sign-in with the URL the browser was redirected to
    Callback {
        /// Full callback URL including `code` and `state`
        url: url::Url,
    },

    /// Show the signed-in account
    Whoami,

    /// GET a web API resource and print the JSON response
    Get {
        /// Service path relative to the web API base URL
        service: String,

        /// Query parameter as key=value (repeatable)
        #[arg(long = "query", short = 'q', value_parser = commands::api::parse_query_pair)]
        query: Vec<(String, String)>,
    },

    /// Download a binary web API resource to a file
    Download {
        /// Service path relative to the web API base URL
        service: String,

        /// Destination file
        #[arg(long, short)]
        output: PathBuf,
    },

    /// Sign out and clear the cached accounts
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.dot_env {
        let _ = dotenvy::dotenv(); // missing .env is fine
    }

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();

    let settings = portal_settings::Settings::from_env();
    let options = context::Options {
        cache: cli.cache,
        open_browser: !cli.no_browser,
        guard_all: cli.guard_all,
    };

    match cli.command {
        Commands::Settings => {
            commands::settings::show(&settings);
            Ok(())
        }
        Commands::Open { path } => commands::navigation::open(settings, &options, &path).await,
        Commands::Callback { url } => {
            commands::navigation::callback(settings, &options, &url).await
        }
        Commands::Whoami => commands::navigation::whoami(settings, &options).await,
        Commands::Get { service, query } => {
            commands::api::get(settings, &options, &service, &query).await
        }
        Commands::Download { service, output } => {
            commands::api::download(settings, &options, &service, &output).await
        }
        Commands::Logout => commands::navigation::logout(settings, &options).await,
    }
}
