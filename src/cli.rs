//! Command-line interface definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Check_MK SMS notification plugin for SMSEagle gateways.
#[derive(Parser, Debug)]
#[command(name = "smseagle-notify", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(
        short,
        long,
        default_value = "/etc/check_mk/smseagle.yaml",
        env = "CONFIG_PATH",
        global = true
    )]
    pub config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Defaults to `send` when omitted, which is how the monitoring core
    /// invokes notification plugins.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Returns the log level based on verbosity flags.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Available subcommands for the notification plugin.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send the notification described by the NOTIFY_* environment.
    Send(SendArgs),

    /// Validate the configuration file without sending anything.
    #[command(name = "config-validate")]
    ConfigValidate,

    /// Display the parsed configuration.
    #[command(name = "config-show")]
    ConfigShow,
}

/// Arguments for the send subcommand.
#[derive(Args, Debug, Default)]
pub struct SendArgs {
    /// Build and print the message without contacting any gateway.
    #[arg(long, default_value = "false")]
    pub dry_run: bool,
}
