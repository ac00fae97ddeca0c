//! Configuration data structures.

use lettre::message::Mailbox;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Root configuration structure containing all settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// SMS gateway settings.
    pub gateway: GatewayConfig,

    /// Failure email settings.
    pub mail: MailConfig,

    /// Behavior when a HOST/SERVICE notification arrives with a required
    /// variable missing.
    #[serde(default)]
    pub on_incomplete_context: IncompleteContextPolicy,
}

/// SMSEagle gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway addresses (IP or hostname), tried in listed order.
    pub hosts: Vec<String>,

    /// HTTP API login shared by all gateways.
    pub login: String,

    /// HTTP API password shared by all gateways.
    pub password: String,

    /// Optional per-request timeout in seconds; the client default applies
    /// when unset.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

/// Failure email settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// SMTP relays, tried in listed order.
    pub relays: Vec<String>,

    /// SMTP port shared by all relays.
    #[serde(default = "default_mail_port")]
    pub port: u16,

    /// Sender address for failure reports.
    pub from: String,

    /// Operator address receiving failure reports.
    pub to: String,
}

/// Behavior for notifications with missing branch variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IncompleteContextPolicy {
    /// Abort the invocation with an error.
    #[default]
    Fail,
    /// Deliver a diagnostic message naming the missing variable.
    Degrade,
}

impl AppConfig {
    /// Checks the semantic rules the type system cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.hosts.is_empty() {
            return Err(ConfigError::Invalid(
                "gateway.hosts must list at least one gateway".to_string(),
            ));
        }
        if self.gateway.login.is_empty() {
            return Err(ConfigError::Invalid(
                "gateway.login must not be empty".to_string(),
            ));
        }
        if self.mail.relays.is_empty() {
            return Err(ConfigError::Invalid(
                "mail.relays must list at least one relay".to_string(),
            ));
        }
        for address in [&self.mail.from, &self.mail.to] {
            if address.parse::<Mailbox>().is_err() {
                return Err(ConfigError::Invalid(format!(
                    "'{}' is not a valid mail address",
                    address
                )));
            }
        }
        Ok(())
    }
}

// Default value functions

fn default_mail_port() -> u16 {
    25
}
