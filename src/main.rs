//! Command-line entry point

use std::path::PathBuf;

use clap::Parser;

use client_switcher::runner;
use client_switcher::{Account, AppConfig};

/// Scripted login and switch-client UI regression runs
#[derive(Parser, Debug)]
#[command(name = "client-switcher", version, about)]
struct Cli {
    /// Number of switch rounds per account
    #[arg(default_value_t = 1)]
    rounds: u32,

    /// Account file with one username|password per line
    #[arg(long, default_value = "account.txt")]
    accounts: PathBuf,

    /// Login URL of the application under test
    #[arg(long, env = "CLIENT_SWITCHER_URL")]
    url: Option<String>,

    /// Run Chrome headless
    #[arg(long)]
    headless: bool,

    /// Explicit Chrome executable path
    #[arg(long)]
    chrome: Option<PathBuf>,

    /// Explicit config file instead of the platform default location
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before clap resolves env-backed arguments
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let _guard = client_switcher::init_logging();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };

    if let Some(url) = cli.url {
        config.base_url = url;
    }
    if cli.headless {
        config.headless = true;
    }
    if let Some(chrome) = cli.chrome {
        config.chrome_path = Some(chrome.display().to_string());
    }
    config.validate()?;

    // Environment credentials select single-account mode
    let accounts = match Account::from_env() {
        Some(account) => vec![account],
        None => Account::load_file(&cli.accounts)?,
    };
    if accounts.is_empty() {
        anyhow::bail!("No accounts to run: {} is empty", cli.accounts.display());
    }

    let summary = runner::run_all(&config, &accounts, cli.rounds).await;

    if !summary.all_passed() {
        anyhow::bail!("{} account(s) failed", summary.failed());
    }

    Ok(())
}
