use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use ivault::core::log::init_logging;
use ivault::{AppCommand, TradeArgs};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the portfolio summary
    Summary {
        /// Display currency for this run (defaults to the configured primary)
        #[arg(long)]
        currency: Option<String>,
    },
    /// Record a buy
    Buy {
        symbol: String,
        quantity: f64,
        price: f64,
        /// Trade date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Record a sell
    Sell {
        symbol: String,
        quantity: f64,
        price: f64,
        /// Trade date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List recorded transactions, newest first
    History,
    /// Search for ticker symbols
    Search { query: String },
}

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::Summary { currency } => AppCommand::Summary { currency },
            Commands::Buy {
                symbol,
                quantity,
                price,
                date,
            } => AppCommand::Buy(TradeArgs {
                symbol,
                quantity,
                price,
                date,
            }),
            Commands::Sell {
                symbol,
                quantity,
                price,
                date,
            } => AppCommand::Sell(TradeArgs {
                symbol,
                quantity,
                price,
                date,
            }),
            Commands::History => AppCommand::History,
            Commands::Search { query } => AppCommand::Search { query },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => ivault::cli::setup::setup(),
        Some(cmd) => ivault::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
