//! ledgerd - account ledger daemon and operator CLI

use clap::{Parser, Subcommand};
use ledger_core::{AccountStatus, AccountType, Page};
use ledger_service::{commands, AppConfig, AppContext};
use rust_decimal::Decimal;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "ledgerd")]
#[command(about = "Account ledger - balances, transfers and saga participant", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the configured database URL
    #[arg(long)]
    database_url: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer transfer/payment requests read as JSON lines on stdin (default)
    Serve,

    /// Open an account
    Open {
        user: Uuid,
        /// checking or savings
        account_type: AccountType,
        /// ISO currency code
        #[arg(long)]
        currency: Option<String>,
    },

    /// Show an account by id or account number
    Show { account: String },

    /// List accounts, for one user or all
    List {
        #[arg(long)]
        user: Option<Uuid>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// Deposit into an account
    Deposit { account: Uuid, amount: Decimal },

    /// Withdraw from an account
    Withdraw { account: Uuid, amount: Decimal },

    /// Move funds between two accounts
    Transfer {
        from: Uuid,
        to: Uuid,
        amount: Decimal,
    },

    /// Set an account's status (active, frozen, closed)
    Status { account: Uuid, status: AccountStatus },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries results; logs go to stderr
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.database_url {
        config.store.database_url = url;
    }
    let ctx = AppContext::new(config).await?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            let processed = commands::serve(ctx.saga_consumer(), input, tokio::io::stdout()).await?;
            tracing::info!(processed, "input closed, shutting down");
        }
        Commands::Open {
            user,
            account_type,
            currency,
        } => commands::open(&ctx, user, account_type, currency.as_deref()).await?,
        Commands::Show { account } => commands::show(&ctx, &account).await?,
        Commands::List {
            user,
            limit,
            offset,
        } => commands::list(&ctx, user, Page::new(limit, offset)).await?,
        Commands::Deposit { account, amount } => commands::deposit(&ctx, account, amount).await?,
        Commands::Withdraw { account, amount } => {
            commands::withdraw(&ctx, account, amount).await?
        }
        Commands::Transfer { from, to, amount } => {
            commands::transfer(&ctx, from, to, amount).await?
        }
        Commands::Status { account, status } => {
            commands::set_status(&ctx, account, status).await?
        }
    }

    Ok(())
}
