//! Notification context handed over by the monitoring core.
//!
//! Check_MK exports one `NOTIFY_*` environment variable per notification
//! field. The context is read and validated once at startup; everything
//! downstream works on typed data.

use std::collections::HashMap;

use crate::config::IncompleteContextPolicy;
use crate::error::ContextError;

const ENV_CONTACT_PAGER: &str = "NOTIFY_CONTACTPAGER";
const ENV_WHAT: &str = "NOTIFY_WHAT";
const ENV_NOTIFICATION_TYPE: &str = "NOTIFY_NOTIFICATIONTYPE";
const ENV_HOSTNAME: &str = "NOTIFY_HOSTNAME";
const ENV_HOST_OUTPUT: &str = "NOTIFY_HOSTOUTPUT";
const ENV_SERVICE_DESC: &str = "NOTIFY_SERVICEDESC";
const ENV_SERVICE_OUTPUT: &str = "NOTIFY_SERVICEOUTPUT";
const ENV_SHORT_DATETIME: &str = "NOTIFY_SHORTDATETIME";

/// Variables a host notification requires, in lookup order.
const HOST_VARS: [&str; 4] = [
    ENV_NOTIFICATION_TYPE,
    ENV_HOSTNAME,
    ENV_HOST_OUTPUT,
    ENV_SHORT_DATETIME,
];

/// Variables a service notification requires, in lookup order.
const SERVICE_VARS: [&str; 5] = [
    ENV_NOTIFICATION_TYPE,
    ENV_HOSTNAME,
    ENV_SERVICE_DESC,
    ENV_SERVICE_OUTPUT,
    ENV_SHORT_DATETIME,
];

/// A host-scope alert event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEvent {
    pub notification_type: String,
    pub hostname: String,
    pub host_output: String,
    pub short_datetime: String,
}

/// A service-scope alert event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEvent {
    pub notification_type: String,
    pub hostname: String,
    pub service_desc: String,
    pub service_output: String,
    pub short_datetime: String,
}

/// Everything the core can hand us, as a typed discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertEvent {
    /// `NOTIFY_WHAT == "HOST"` with all host variables present.
    Host(HostEvent),

    /// `NOTIFY_WHAT == "SERVICE"` with all service variables present.
    Service(ServiceEvent),

    /// `NOTIFY_WHAT` carries a value outside HOST/SERVICE.
    Unknown { what: String },

    /// `NOTIFY_WHAT` is not set at all.
    Unspecified,

    /// A required branch variable is missing and the configured policy
    /// degrades instead of failing.
    Incomplete { what: String, variable: String },
}

/// Validated notification context for one invocation.
#[derive(Debug, Clone)]
pub struct NotifyContext {
    /// SMS destination from `NOTIFY_CONTACTPAGER`.
    pub pager: String,

    /// The event to format and deliver.
    pub event: AlertEvent,
}

impl NotifyContext {
    /// Builds the context from the process environment.
    ///
    /// Entries that are not valid UTF-8 are skipped; `std::env::vars()`
    /// would panic on them, and the core hands over its whole environment.
    pub fn from_env(policy: IncompleteContextPolicy) -> Result<Self, ContextError> {
        let vars = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));
        Self::from_vars(vars, policy)
    }

    /// Builds the context from an explicit variable set.
    ///
    /// The pager contact is checked before anything else: without it there
    /// is no SMS destination and the caller reports instead of dispatching.
    pub fn from_vars<I>(vars: I, policy: IncompleteContextPolicy) -> Result<Self, ContextError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars.into_iter().collect();

        let pager = vars
            .get(ENV_CONTACT_PAGER)
            .cloned()
            .ok_or(ContextError::MissingPager)?;

        let event = match vars.get(ENV_WHAT).map(String::as_str) {
            None => AlertEvent::Unspecified,
            Some("HOST") => host_event(&vars, policy)?,
            Some("SERVICE") => service_event(&vars, policy)?,
            Some(other) => AlertEvent::Unknown {
                what: other.to_string(),
            },
        };

        Ok(Self { pager, event })
    }
}

fn host_event(
    vars: &HashMap<String, String>,
    policy: IncompleteContextPolicy,
) -> Result<AlertEvent, ContextError> {
    if let Some(event) = incomplete("HOST", &HOST_VARS, vars, policy)? {
        return Ok(event);
    }

    // Presence of every indexed variable checked above.
    Ok(AlertEvent::Host(HostEvent {
        notification_type: vars[ENV_NOTIFICATION_TYPE].clone(),
        hostname: vars[ENV_HOSTNAME].clone(),
        host_output: vars[ENV_HOST_OUTPUT].clone(),
        short_datetime: vars[ENV_SHORT_DATETIME].clone(),
    }))
}

fn service_event(
    vars: &HashMap<String, String>,
    policy: IncompleteContextPolicy,
) -> Result<AlertEvent, ContextError> {
    if let Some(event) = incomplete("SERVICE", &SERVICE_VARS, vars, policy)? {
        return Ok(event);
    }

    // Presence of every indexed variable checked above.
    Ok(AlertEvent::Service(ServiceEvent {
        notification_type: vars[ENV_NOTIFICATION_TYPE].clone(),
        hostname: vars[ENV_HOSTNAME].clone(),
        service_desc: vars[ENV_SERVICE_DESC].clone(),
        service_output: vars[ENV_SERVICE_OUTPUT].clone(),
        short_datetime: vars[ENV_SHORT_DATETIME].clone(),
    }))
}

/// Handles the first missing branch variable per the configured policy.
/// Returns `None` when the branch is complete.
fn incomplete(
    what: &str,
    required: &[&str],
    vars: &HashMap<String, String>,
    policy: IncompleteContextPolicy,
) -> Result<Option<AlertEvent>, ContextError> {
    let missing = match required.iter().find(|v| !vars.contains_key(**v)) {
        Some(name) => *name,
        None => return Ok(None),
    };

    match policy {
        IncompleteContextPolicy::Fail => Err(ContextError::MissingField {
            what: what.to_string(),
            variable: missing.to_string(),
        }),
        IncompleteContextPolicy::Degrade => Ok(Some(AlertEvent::Incomplete {
            what: what.to_string(),
            variable: missing.to_string(),
        })),
    }
}
