//! # cultivate CLI entry point
//!
//! Parses command-line arguments, opens the stored session, and dispatches
//! to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cultivate_cli::auth::{run_login, run_logout, run_whoami, LoginArgs};
use cultivate_cli::dashboard::{
    run_compliance, run_facilities, run_inventory, ComplianceArgs, InventoryArgs,
};
use cultivate_cli::request::{run_request, RequestArgs};
use cultivate_cli::{connect, default_store_path, exit_code, EXIT_SESSION_EXPIRED};

/// CultivateCo command-line client.
///
/// Signs in to the CultivateCo API and queries facilities, compliance, and
/// inventory. The session is kept in a local file between invocations.
#[derive(Parser, Debug)]
#[command(name = "cultivate", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// API base URL, e.g. `https://api.cultivateco.com/api`.
    #[arg(long, env = "CULTIVATE_API_URL", global = true)]
    api_url: Option<String>,

    /// Session file. Defaults to `~/.cultivate/session.json`.
    #[arg(long, env = "CULTIVATE_STORE", global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and store the session.
    Login(LoginArgs),

    /// End the session and clear stored credentials.
    Logout,

    /// Show the authenticated user.
    Whoami,

    /// Send a raw authenticated request.
    Request(RequestArgs),

    /// List facilities.
    Facilities,

    /// Show the compliance score, or open alerts with `--alerts`.
    Compliance(ComplianceArgs),

    /// List inventory items.
    Inventory(InventoryArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let store_path = cli.store.clone().unwrap_or_else(default_store_path);
    let client = match connect(cli.api_url.as_deref(), &store_path) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(exit_code(&e));
        }
    };

    let result = match &cli.command {
        Commands::Login(args) => run_login(args, &client).await,
        Commands::Logout => run_logout(&client).await,
        Commands::Whoami => run_whoami(&client).await,
        Commands::Request(args) => run_request(args, &client).await,
        Commands::Facilities => run_facilities(&client).await,
        Commands::Compliance(args) => run_compliance(args, &client).await,
        Commands::Inventory(args) => run_inventory(args, &client).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            let code = exit_code(&e);
            if code == EXIT_SESSION_EXPIRED {
                eprintln!("Session expired. Run `cultivate login` to sign in again.");
            } else {
                tracing::error!("{e:#}");
            }
            ExitCode::from(code)
        }
    }
}
