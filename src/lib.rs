//! smseagle-notify - Check_MK SMS notification plugin.
//!
//! Builds the alert text from the NOTIFY_* environment, pushes it as an SMS
//! through an ordered list of SMSEagle gateways, and emails a failure report
//! to the operator when delivery breaks down.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod message;
pub mod notify;

use anyhow::Result;
use tracing::debug;

use crate::cli::{Cli, Commands, SendArgs};
use crate::context::NotifyContext;
use crate::error::{AppError, ContextError};
use crate::notify::{FailureReporter, FailureSink, SmsDispatcher};

/// Runs the notification plugin with the provided CLI arguments.
pub async fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.log_level())?;

    match cli.command.unwrap_or(Commands::Send(SendArgs::default())) {
        Commands::Send(args) => send(args, &cli.config).await.map_err(Into::into),
        Commands::ConfigValidate => validate_config(&cli.config).await,
        Commands::ConfigShow => show_config(&cli.config).await,
    }
}

/// Initializes the tracing subscriber.
fn setup_logging(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt().with_env_filter(filter).with_target(true).init();

    Ok(())
}

/// Runs one notification pass.
async fn send(args: SendArgs, config_path: &std::path::Path) -> Result<(), AppError> {
    let config = config::loader::load_and_validate(config_path)?;
    let reporter = FailureReporter::new(&config.mail)?;

    let context = match NotifyContext::from_env(config.on_incomplete_context) {
        Ok(context) => context,
        Err(e @ ContextError::MissingPager) => {
            reporter.report(&e.to_string()).await;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let message = message::format_message(&context.event);
    debug!(to = %context.pager, message = %message, "Notification prepared");

    if args.dry_run {
        println!("Would send SMS to {}: {}", context.pager, message);
        return Ok(());
    }

    let dispatcher = SmsDispatcher::new(&config.gateway);
    dispatcher
        .dispatch(&context.pager, &message, &reporter)
        .await;

    Ok(())
}

/// Validates the configuration file and reports any issues.
async fn validate_config(config_path: &std::path::Path) -> Result<()> {
    let config = config::loader::load_and_validate(config_path)?;

    println!("Configuration is valid.");
    println!("Found {} gateway(s):", config.gateway.hosts.len());
    for host in &config.gateway.hosts {
        println!("  - {}", host);
    }
    println!("Found {} mail relay(s):", config.mail.relays.len());
    for relay in &config.mail.relays {
        println!("  - {}", relay);
    }
    println!(
        "Failure reports: {} -> {}",
        config.mail.from, config.mail.to
    );

    Ok(())
}

/// Displays the parsed configuration.
async fn show_config(config_path: &std::path::Path) -> Result<()> {
    let config = config::loader::load_and_validate(config_path)?;
    let yaml = serde_yaml::to_string(&config)?;
    println!("{}", yaml);
    Ok(())
}
