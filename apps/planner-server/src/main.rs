mod config;
mod logging;
mod server;
mod signals;

use std::path::PathBuf;

use aftersales_planner::AftersalesPlanner;
use anyhow::Result;
use clap::{Parser, Subcommand};
use planner_auth::Role;

use crate::config::AppConfig;

/// Aftersales Planner - workshop capacity planning server
#[derive(Parser)]
#[command(name = "planner-server")]
#[command(about = "Aftersales Planner - workshop capacity planning server")]
#[command(version)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for the HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (JSON, secret redacted) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
    /// Apply database migrations and exit
    Migrate,
    /// Create an account without going through first-run registration
    CreateUser {
        #[arg(long)]
        email: String,
        /// MASTER or USER
        #[arg(long, default_value = "USER", value_parser = parse_role)]
        role: Role,
        #[arg(long, env = "PLANNER_NEW_USER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        name: Option<String>,
    },
}

fn parse_role(raw: &str) -> Result<Role, String> {
    raw.to_ascii_uppercase()
        .parse()
        .map_err(|_| format!("unknown role '{raw}' (expected MASTER or USER)"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // defaults -> YAML (if provided) -> env (PLANNER__*) -> CLI overrides
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.apply_port_override(port);
    }
    if cli.mock {
        "sqlite::memory:".clone_into(&mut config.database.url);
    }

    logging::init(&config.logging, cli.verbose);
    tracing::info!("Aftersales Planner starting");

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_redacted_json()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            config.validate()?;
            server::run(config).await
        }
        Commands::Check => check(&config),
        Commands::Migrate => {
            let db = server::connect(&config.database).await?;
            AftersalesPlanner::migrate(&db).await
        }
        Commands::CreateUser {
            email,
            role,
            password,
            name,
        } => {
            config.validate()?;
            let (_db, planner) = server::bootstrap(&config).await?;
            let account = planner
                .accounts()
                .create_account(&email, &password, name, role)
                .await?;
            println!("Created {} account {} ({})", account.role, account.email, account.id);
            Ok(())
        }
    }
}

fn check(config: &AppConfig) -> Result<()> {
    config.validate()?;
    println!("Configuration is valid");
    println!("{}", config.to_redacted_json()?);
    Ok(())
}
