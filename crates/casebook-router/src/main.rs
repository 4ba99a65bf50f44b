//! Casebook Router CLI
//!
//! Serves the case API, or issues a development bearer token.

use casebook_router::{config::RouterConfig, issue_token, start_server, RouterError};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "casebook-router", version, about = "Case link graph and keyword API")]
struct Cli {
    /// Load configuration from a TOML file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,

    /// Print a signed bearer token for an investigator
    Token {
        /// Investigator email
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), RouterError> {
    let config = match &cli.config {
        Some(path) => RouterConfig::from_file(path)?,
        None => {
            eprintln!("Warning: No config file specified, using default test configuration");
            eprintln!("Usage: casebook-router --config <path-to-config.toml>");
            eprintln!();
            RouterConfig::default_test_config()
        }
    };

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => start_server(config).await,
        Command::Token { email } => {
            println!("{}", issue_token(&config, &email)?);
            Ok(())
        }
    }
}
