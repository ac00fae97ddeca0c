//! SMS delivery through SMSEagle HTTP gateways.

use std::time::Duration;

use tracing::{debug, info};

use crate::config::GatewayConfig;
use crate::error::SmsError;
use crate::notify::FailureSink;

/// Dispatches one message through an ordered list of gateways.
pub struct SmsDispatcher {
    /// Gateway addresses in failover order.
    hosts: Vec<String>,
    /// HTTP API login.
    login: String,
    /// HTTP API password.
    password: String,
    /// Optional per-request timeout.
    timeout: Option<Duration>,
    /// HTTP client.
    client: reqwest::Client,
}

/// Result of one dispatch pass over the gateway list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A gateway accepted the message; later gateways were not contacted.
    Delivered { host: String },

    /// Every gateway failed; each failure was reported individually.
    Exhausted { attempts: usize },
}

impl SmsDispatcher {
    /// Creates a new dispatcher from config.
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            hosts: config.hosts.clone(),
            login: config.login.clone(),
            password: config.password.clone(),
            timeout: config.timeout_seconds.map(Duration::from_secs),
            client: reqwest::Client::new(),
        }
    }

    /// Tries each gateway in order until one accepts the message.
    ///
    /// A failed attempt never aborts the pass: it is handed to `reporter`
    /// and the next gateway is tried.
    pub async fn dispatch(
        &self,
        to: &str,
        message: &str,
        reporter: &dyn FailureSink,
    ) -> DispatchOutcome {
        for host in &self.hosts {
            match self.try_gateway(host, to, message).await {
                Ok(()) => {
                    info!(gateway = %host, to = %to, "SMS successfully sent");
                    return DispatchOutcome::Delivered { host: host.clone() };
                }
                Err(e) => {
                    reporter
                        .report(&format!("Sending SMS via SMSEagle {} failed: {}", host, e))
                        .await;
                }
            }
        }

        debug!(
            attempts = self.hosts.len(),
            "No gateway accepted the message"
        );
        DispatchOutcome::Exhausted {
            attempts: self.hosts.len(),
        }
    }

    /// One send attempt against one gateway.
    async fn try_gateway(&self, host: &str, to: &str, message: &str) -> Result<(), SmsError> {
        let url = format!("http://{}/http_api/send_sms", host);
        let mut request = self.client.get(&url).query(&[
            ("login", self.login.as_str()),
            ("pass", self.password.as_str()),
            ("to", to),
            ("message", message),
        ]);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(SmsError::Status(response.status().as_u16()));
        }

        // The gateway answers 200 even for rejected messages; the body
        // prefix is the real acknowledgement.
        let body = response.text().await?;
        if body.starts_with("OK;") {
            Ok(())
        } else {
            Err(SmsError::Rejected(body.trim_end().to_string()))
        }
    }
}
