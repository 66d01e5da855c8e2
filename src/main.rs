use anyhow::{Context, Result};
use availability_tracker::browser::ChromeLauncher;
use availability_tracker::notifiers::{EmailNotifier, StaticRecipients};
use availability_tracker::{AppConfig, AvailabilityChecker};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "availability-tracker")]
#[command(author, version, about = "Check product pages for stock and email the ones that are available")]
struct Cli {
    /// Configuration file (JSON, TOML or YAML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Inventory file to check, overriding `inventory.path`
    #[arg(short, long, value_name = "FILE")]
    inventory: Option<PathBuf>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    headed: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("availability_tracker={}", level).parse()?),
        )
        .init();

    info!("Starting availability check...");

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(inventory) = cli.inventory {
        config.inventory.path = inventory;
    }
    if cli.headed {
        config.browser.headless = false;
    }

    let notifier = EmailNotifier::from_mail_config(&config.mail)?;
    let checker = AvailabilityChecker::from_config(
        &config,
        Box::new(ChromeLauncher::new(config.browser.clone())),
        Box::new(notifier),
        Box::new(StaticRecipients::new(config.mail.recipients.clone())),
    );

    match checker.run().await {
        Ok(report) => {
            if !report.failed_recipients.is_empty() {
                error!("Could not notify: {}", report.failed_recipients.join(", "));
            }
            Ok(())
        }
        Err(e) => {
            error!("Availability check aborted: {}", e);
            Err(e.into())
        }
    }
}
