use anyhow::Result;
use capcut_cookie_sync::api::AccountClient;
use capcut_cookie_sync::browser::ChromeLoginDriver;
use capcut_cookie_sync::config::Config;
use capcut_cookie_sync::sync::BatchProcessor;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "capcut-cookie-sync")]
#[command(about = "Refresh CapCut session cookies and sync them to the account inventory API")]
struct Cli {
    /// Show the browser window even when CI/HEADLESS selects headless mode
    #[arg(long)]
    headed: bool,

    /// Upload only the cookie with this name (e.g. sid_guard)
    #[arg(long, value_name = "NAME")]
    cookie: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if cli.headed {
        config.headless = false;
    }
    if cli.cookie.is_some() {
        config.cookie_filter = cli.cookie;
    }

    let client = AccountClient::new(&config.api_base_url)?;
    let driver = ChromeLoginDriver::new(&config);

    // A failed account fetch aborts with a non-zero exit; per-account
    // failures only show up in the summary.
    let summary = BatchProcessor::new(client, driver).run().await?;

    println!("\n{}", summary.report());

    Ok(())
}
