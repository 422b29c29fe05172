//! Audit logging for gateway traffic.
//!
//! Every send produces structured events on the `audit` tracing target with a
//! per-send correlation id. Card numbers, security codes and credentials are
//! redacted before anything reaches a log.

use std::time::{Duration, SystemTime};

use serde::Serialize;
use uuid::Uuid;

use crate::fields::Field;

const REDACTED: &str = "***";

/// Types of auditable events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// Local validation rejected the request; nothing was sent.
    ValidationFailed,
    /// The form body was handed to the transport.
    RequestSent,
    /// The gateway answered and the reply was decoded.
    ResponseReceived,
    /// The transport failed or the gateway answered with a non-2xx status.
    TransportFailed,
}

/// Details for an audit log entry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditDetails {
    /// Operation name, e.g. `void`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Gateway endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Gateway transaction id, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_reference: Option<String>,
    /// Reply classification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    /// Error message (sensitive data automatically redacted).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Duration of the exchange in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Audit log entry.
///
/// # Examples
///
/// ```
/// use converge_gateway::audit::{AuditEvent, AuditEventType, audit_log};
/// use uuid::Uuid;
///
/// let event = AuditEvent::new(AuditEventType::RequestSent, "000000", Uuid::new_v4())
///     .with_operation("void")
///     .with_transaction_reference("SALE123");
///
/// audit_log(&event);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    /// When the event occurred.
    pub timestamp: SystemTime,
    /// What happened.
    pub event_type: AuditEventType,
    /// Merchant account the request was made for.
    pub merchant_id: String,
    /// Correlation id shared by all events of one send.
    pub request_id: Uuid,
    /// Event details.
    pub details: AuditDetails,
}

impl AuditEvent {
    /// Creates a new audit event.
    #[must_use]
    pub fn new(event_type: AuditEventType, merchant_id: impl Into<String>, request_id: Uuid) -> Self {
        Self {
            timestamp: SystemTime::now(),
            event_type,
            merchant_id: merchant_id.into(),
            request_id,
            details: AuditDetails::default(),
        }
    }

    /// Adds the operation name.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.details.operation = Some(operation.into());
        self
    }

    /// Adds the endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.details.endpoint = Some(endpoint.into());
        self
    }

    /// Adds the gateway transaction id.
    #[must_use]
    pub fn with_transaction_reference(mut self, reference: impl Into<String>) -> Self {
        self.details.transaction_reference = Some(reference.into());
        self
    }

    /// Adds the reply classification.
    #[must_use]
    pub fn with_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.details.outcome = Some(outcome.into());
        self
    }

    /// Adds an error message, redacting sensitive data.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.details.error = Some(redact_sensitive(&error.into()));
        self
    }

    /// Adds the exchange duration.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        reason = "duration in ms fits u64 for practical values"
    )]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.details.duration_ms = Some(duration.as_millis() as u64);
        self
    }
}

/// Logs an audit event to tracing with target `audit`.
pub fn audit_log(event: &AuditEvent) {
    tracing::info!(
        target: "audit",
        timestamp = ?event.timestamp,
        event_type = ?event.event_type,
        merchant_id = %event.merchant_id,
        request_id = %event.request_id,
        details = ?event.details,
        "AUDIT"
    );
}

/// Convenience macro for audit logging.
///
/// ```
/// use converge_gateway::{audit, audit::AuditEventType};
/// use uuid::Uuid;
///
/// audit!(AuditEventType::ValidationFailed, "000000", Uuid::new_v4(), with_operation("void"));
/// ```
#[macro_export]
macro_rules! audit {
    ($event_type:expr, $merchant_id:expr, $request_id:expr) => {
        $crate::audit::audit_log(
            &$crate::audit::AuditEvent::new($event_type, $merchant_id, $request_id)
        )
    };
    ($event_type:expr, $merchant_id:expr, $request_id:expr, $($method:ident($arg:expr)),+ $(,)?) => {
        $crate::audit::audit_log(
            &$crate::audit::AuditEvent::new($event_type, $merchant_id, $request_id)
                $(.$method($arg))+
        )
    };
}

/// Masks all but the last four characters of a card number.
///
/// # Examples
///
/// ```
/// use converge_gateway::audit::mask_card_number;
///
/// assert_eq!(mask_card_number("4111111111111111"), "************1111");
/// assert_eq!(mask_card_number("123"), "***");
/// ```
#[must_use]
pub fn mask_card_number(number: &str) -> String {
    let len = number.chars().count();
    if len <= 4 {
        return "*".repeat(len);
    }
    let visible: String = number.chars().skip(len - 4).collect();
    format!("{}{visible}", "*".repeat(len - 4))
}

/// Redacts sensitive data from free text before logging.
///
/// - values of sensitive form fields (`ssl_pin=...`, `ssl_card_number=...`)
/// - card-number-like digit runs (12-19 digits, optionally grouped by `-` or
///   spaces), keeping the last four digits
/// - 3-4 digit codes following `cvv`, `cvc` or `cid`
///
/// # Examples
///
/// ```
/// use converge_gateway::audit::redact_sensitive;
///
/// let redacted = redact_sensitive("declined card 4111-1111-1111-1111 cvv: 123");
/// assert_eq!(redacted, "declined card ************1111 cvv: XXX");
/// ```
#[must_use]
pub fn redact_sensitive(input: &str) -> String {
    let redacted = redact_form_secrets(input);
    let redacted = redact_card_numbers(&redacted);
    redact_security_codes(&redacted)
}

fn redact_form_secrets(input: &str) -> String {
    let mut out = input.to_owned();
    for field in Field::ALL.into_iter().filter(|field| field.is_sensitive()) {
        let key = format!("{}=", field.wire_name());
        let mut search_from = 0;
        while let Some(pos) = out[search_from..].find(&key) {
            let value_start = search_from + pos + key.len();
            let value_end = out[value_start..]
                .find(|c: char| matches!(c, '&' | '|' | '\n' | '\r' | ' ' | ',' | '"'))
                .map_or(out.len(), |end| value_start + end);
            out.replace_range(value_start..value_end, REDACTED);
            search_from = value_start + REDACTED.len();
        }
    }
    out
}

fn redact_card_numbers(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let start = i;
        let mut end = i;
        let mut digits = String::new();
        let mut j = i;
        while j < chars.len() {
            let c = chars[j];
            if c.is_ascii_digit() {
                digits.push(c);
                j += 1;
                end = j;
            } else if matches!(c, '-' | ' ') && chars.get(j + 1).is_some_and(char::is_ascii_digit) {
                j += 1;
            } else {
                break;
            }
        }

        if (12..=19).contains(&digits.len()) {
            out.push_str(&mask_card_number(&digits));
        } else {
            out.extend(&chars[start..end]);
        }
        i = end;
    }

    out
}

fn redact_security_codes(input: &str) -> String {
    const KEYWORDS: [&str; 3] = ["cvv", "cvc", "cid"];

    let lower = input.to_ascii_lowercase();
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0;
    let mut search = 0;

    while let Some(pos) =
        KEYWORDS.iter().filter_map(|kw| lower[search..].find(kw)).min().map(|p| search + p)
    {
        let mut idx = pos + 3;
        if bytes.get(idx) == Some(&b'2') {
            idx += 1;
        }
        while matches!(bytes.get(idx), Some(b':' | b'=' | b' ')) {
            idx += 1;
        }
        let digits = bytes[idx..].iter().take_while(|b| b.is_ascii_digit()).count();
        if (3..=4).contains(&digits) {
            out.push_str(&input[cursor..idx]);
            out.push_str("XXX");
            cursor = idx + digits;
        }
        search = (pos + 3).max(cursor);
    }

    out.push_str(&input[cursor..]);
    out
}
