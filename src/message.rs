//! Alert message formatting.

use crate::context::AlertEvent;

/// Renders the SMS text for one alert event.
///
/// Unknown and unspecified notification methods format to a diagnostic
/// that is delivered like any other message, so a misconfigured rule
/// still pages someone.
pub fn format_message(event: &AlertEvent) -> String {
    match event {
        AlertEvent::Host(host) => format!(
            "{} {}: {} ({})",
            host.notification_type, host.hostname, host.host_output, host.short_datetime
        ),
        AlertEvent::Service(service) => format!(
            "{} {}: {} {} ({})",
            service.notification_type,
            service.hostname,
            service.service_desc,
            service.service_output,
            service.short_datetime
        ),
        AlertEvent::Unknown { what } => format!("Unknown notification method: {}", what),
        AlertEvent::Unspecified => "Environment variable NOTIFY_WHAT not defined.".to_string(),
        AlertEvent::Incomplete { what, variable } => {
            format!("Incomplete {} notification: {} not defined.", what, variable)
        }
    }
}
