//! Failure report emails over SMTP.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, error, warn};

use crate::config::MailConfig;
use crate::error::MailError;
use crate::notify::FailureSink;

/// Subject line of every failure report.
const SUBJECT: &str = "Check_MK: SMS Notification Error";

/// Emails delivery failures to the operator through an ordered list of
/// SMTP relays.
#[derive(Debug)]
pub struct FailureReporter {
    /// Relay addresses in failover order.
    relays: Vec<String>,
    /// SMTP port shared by all relays.
    port: u16,
    /// Sender mailbox.
    from: Mailbox,
    /// Operator mailbox.
    to: Mailbox,
}

/// Result of one delivery pass over the relay list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailOutcome {
    /// A relay accepted the report.
    Sent { relay: String, failed_relays: usize },

    /// Every relay failed; the report only reached the log.
    Exhausted { attempts: usize },
}

impl FailureReporter {
    /// Creates a new reporter from config, parsing both mailboxes once.
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        Ok(Self {
            relays: config.relays.clone(),
            port: config.port,
            from: parse_mailbox(&config.from)?,
            to: parse_mailbox(&config.to)?,
        })
    }

    /// Emails one report, trying each relay in order until one accepts it.
    pub async fn deliver(&self, error_text: &str) -> MailOutcome {
        let email = match self.compose(error_text) {
            Ok(email) => email,
            Err(e) => {
                error!(error = %e, "Failed to build failure email");
                return MailOutcome::Exhausted { attempts: 0 };
            }
        };

        let mut failed_relays = 0;
        for relay in &self.relays {
            match self.try_relay(relay, email.clone()).await {
                Ok(()) => {
                    debug!(relay = %relay, "Failure report emailed");
                    return MailOutcome::Sent {
                        relay: relay.clone(),
                        failed_relays,
                    };
                }
                Err(e) => {
                    failed_relays += 1;
                    log_relay_failure(relay, &e);
                }
            }
        }

        MailOutcome::Exhausted {
            attempts: failed_relays,
        }
    }

    /// Builds the plain-text report message around `error_text`.
    fn compose(&self, error_text: &str) -> Result<Message, MailError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(error_text.to_string())?;
        Ok(email)
    }

    /// One send attempt against one relay, plain and unauthenticated.
    async fn try_relay(&self, relay: &str, email: Message) -> Result<(), smtp::Error> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(relay)
            .port(self.port)
            .build();
        transport.send(email).await.map(|_| ())
    }
}

#[async_trait]
impl FailureSink for FailureReporter {
    /// Logs the failure unconditionally, then tries to email it. With
    /// every relay down the log entry is the report.
    async fn report(&self, error_text: &str) {
        error!("{}", error_text);
        if let MailOutcome::Exhausted { attempts } = self.deliver(error_text).await {
            warn!(attempts, "Failure report could not be emailed to any relay");
        }
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|e| MailError::Address {
        address: address.to_string(),
        source: e,
    })
}

fn log_relay_failure(relay: &str, error: &smtp::Error) {
    if error.is_permanent() || error.is_transient() {
        warn!(relay = %relay, error = %error, "Sending email failed");
    } else if error.is_timeout() {
        warn!(relay = %relay, error = %error, "Timed out talking to relay");
    } else {
        warn!(relay = %relay, error = %error, "Could not connect to relay");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    use super::*;

    /// Minimal scripted SMTP endpoint: accepts one session and records
    /// every client line.
    async fn fake_relay(listener: TcpListener, received: Arc<Mutex<Vec<String>>>) {
        let (stream, _) = listener.accept().await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        writer.write_all(b"220 fake.test ESMTP\r\n").await.unwrap();
        let mut in_data = false;
        while let Ok(Some(line)) = lines.next_line().await {
            received.lock().unwrap().push(line.clone());
            if in_data {
                if line == "." {
                    in_data = false;
                    writer.write_all(b"250 OK\r\n").await.unwrap();
                }
                continue;
            }
            let verb = line.to_ascii_uppercase();
            let reply: &[u8] = if verb.starts_with("EHLO") || verb.starts_with("HELO") {
                b"250 fake.test\r\n"
            } else if verb.starts_with("DATA") {
                in_data = true;
                b"354 go ahead\r\n"
            } else if verb.starts_with("QUIT") {
                b"221 bye\r\n"
            } else {
                b"250 OK\r\n"
            };
            writer.write_all(reply).await.unwrap();
            if verb.starts_with("QUIT") {
                break;
            }
        }
    }

    async fn start_relay() -> (u16, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let received = Arc::new(Mutex::new(Vec::new()));
        tokio::spawn(fake_relay(listener, Arc::clone(&received)));
        (port, received)
    }

    fn unused_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port
    }

    fn reporter(relays: Vec<&str>, port: u16) -> FailureReporter {
        FailureReporter::new(&MailConfig {
            relays: relays.into_iter().map(String::from).collect(),
            port,
            from: "monitoring@example.com".to_string(),
            to: "oncall@example.com".to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn first_healthy_relay_takes_the_report() {
        let (port, received) = start_relay().await;
        let reporter = reporter(vec!["127.0.0.1"], port);

        let outcome = reporter
            .deliver("Sending SMS via SMSEagle 10.1.1.30 failed: HTTP status 500")
            .await;

        assert_eq!(
            outcome,
            MailOutcome::Sent {
                relay: "127.0.0.1".to_string(),
                failed_relays: 0,
            }
        );
        let lines = received.lock().unwrap().clone();
        assert!(lines
            .iter()
            .any(|l| l.contains("Subject: Check_MK: SMS Notification Error")));
        assert!(lines
            .iter()
            .any(|l| l.contains("Sending SMS via SMSEagle 10.1.1.30 failed")));
        assert!(lines.iter().any(|l| l.contains("monitoring@example.com")));
    }

    #[tokio::test]
    async fn dead_relay_fails_over_to_the_next() {
        // 127.0.0.2 is loopback too, with nothing listening on the port.
        let (port, received) = start_relay().await;
        let reporter = reporter(vec!["127.0.0.2", "127.0.0.1"], port);

        let outcome = reporter.deliver("gateway down").await;

        assert_eq!(
            outcome,
            MailOutcome::Sent {
                relay: "127.0.0.1".to_string(),
                failed_relays: 1,
            }
        );
        assert!(received
            .lock()
            .unwrap()
            .iter()
            .any(|l| l.starts_with("MAIL FROM")));
    }

    #[tokio::test]
    async fn exhausted_relays_leave_only_the_log() {
        let port = unused_port();
        let reporter = reporter(vec!["127.0.0.2", "127.0.0.3"], port);

        let outcome = reporter.deliver("nothing works").await;

        assert_eq!(outcome, MailOutcome::Exhausted { attempts: 2 });
    }

    #[tokio::test]
    async fn report_survives_total_relay_failure() {
        let port = unused_port();
        let reporter = reporter(vec!["127.0.0.2"], port);

        // The contract is that this returns at all.
        reporter
            .report("Environment variable NOTIFY_CONTACTPAGER missing")
            .await;
    }

    #[test]
    fn rejects_unparseable_operator_address() {
        let err = FailureReporter::new(&MailConfig {
            relays: vec!["localhost".to_string()],
            port: 25,
            from: "monitoring@example.com".to_string(),
            to: "not an address".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, MailError::Address { .. }));
    }

    #[test]
    fn build_failures_surface_as_mail_errors() {
        // A builder without a sender is the one way to get a build error.
        let err = match Message::builder().body(String::from("report text")) {
            Err(e) => MailError::from(e),
            Ok(_) => panic!("senderless build must fail"),
        };
        assert!(err.to_string().starts_with("Failed to build failure email"));
    }
}
