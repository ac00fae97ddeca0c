//! Delivery channels: SMS gateways and the email failure fallback.

pub mod email;
pub mod sms;

pub use email::{FailureReporter, MailOutcome};
pub use sms::{DispatchOutcome, SmsDispatcher};

use async_trait::async_trait;

/// Sink for failure reports raised while dispatching a notification.
///
/// The dispatcher hands every failed gateway attempt here and moves on to
/// the next gateway. The production sink is [`FailureReporter`].
#[async_trait]
pub trait FailureSink: Send + Sync {
    /// Records one failure. Implementations absorb their own errors.
    async fn report(&self, error_text: &str);
}
