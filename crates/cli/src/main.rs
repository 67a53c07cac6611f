use clap::{Parser, Subcommand};
use fno_desk_core::{AppConfig, ConfigLoader};

mod commands;

use commands::{AtmPositionsArgs, ReconcileArgs, TokensArgs};

#[derive(Parser)]
#[command(name = "fno-desk")]
#[command(about = "F&O token selection and hedge-book reconciliation", long_about = None)]
struct Cli {
    /// Directory holding Config.toml and its profiles
    #[arg(long, global = true, default_value = "config")]
    config: String,

    /// Profile file layered over Config.toml (Config.<profile>.toml)
    #[arg(long, global = true, env = "FNO_PROFILE")]
    profile: Option<String>,

    /// Optional log file path (logs to file instead of stderr)
    #[arg(long, global = true)]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select option and futures tokens from a bhavcopy
    Tokens(TokensArgs),
    /// Reconcile a position ledger and localize mismatches
    Reconcile(ReconcileArgs),
    /// List in-the-money options close to their future's price
    AtmPositions(AtmPositionsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
                )
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
                )
                .with_writer(std::io::stderr)
                .init();
        }
    }

    let config = load_config(&cli.config, cli.profile.as_deref())?;

    match cli.command {
        Commands::Tokens(args) => commands::run_tokens(args, &config).await?,
        Commands::Reconcile(args) => commands::run_reconcile(args, &config).await?,
        Commands::AtmPositions(args) => commands::run_atm_positions(args, &config).await?,
    }

    Ok(())
}

fn load_config(dir: &str, profile: Option<&str>) -> anyhow::Result<AppConfig> {
    let config = match profile {
        Some(profile) => ConfigLoader::load_profile_from_dir(dir, profile)?,
        None => ConfigLoader::load_from_dir(dir)?,
    };
    tracing::debug!(dir, profile, "Loaded configuration");
    Ok(config)
}
