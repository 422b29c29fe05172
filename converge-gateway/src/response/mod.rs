//! Gateway replies.
//!
//! Converge answers a direct post with flat `key=value` records. The decoder in
//! [`ResponseFormat`] is lenient: it never fails, preserves unknown fields and
//! classifies the reply as approved, declined or malformed.

mod format;

use serde::{Serialize, Serializer};

pub use self::format::{RecordDelimiter, ResponseFormat};
use crate::fields::{Field, to_logical_name};

/// Prefix of the message carried by a reply that could not be decoded.
pub const PARSE_FAILURE_MARKER: &str = "parse failure:";

/// Outcome of a gateway reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    /// The status field carries the approved value.
    Approved,
    /// The reply decoded but the transaction was not approved.
    Declined,
    /// The body could not be decoded as key/value records.
    Malformed,
}

impl ResponseStatus {
    /// Lowercase name, as used in logs and JSON output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Declined => "declined",
            Self::Malformed => "malformed",
        }
    }
}

/// A decoded gateway reply.
///
/// Fields are kept in reply order under their wire names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    status: ResponseStatus,
    #[serde(serialize_with = "serialize_ordered")]
    fields: Vec<(String, String)>,
    #[serde(skip)]
    status_field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_error: Option<String>,
}

fn serialize_ordered<S: Serializer>(
    fields: &[(String, String)],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_map(fields.iter().map(|(key, value)| (key, value)))
}

impl Response {
    pub(crate) const fn new(
        status: ResponseStatus,
        fields: Vec<(String, String)>,
        status_field: String,
        parse_error: Option<String>,
    ) -> Self {
        Self { status, fields, status_field, parse_error }
    }

    /// Returns true only when the gateway approved the transaction.
    #[must_use]
    pub const fn is_successful(&self) -> bool {
        matches!(self.status, ResponseStatus::Approved)
    }

    /// Reply classification.
    #[must_use]
    pub const fn status(&self) -> ResponseStatus {
        self.status
    }

    /// Returns true if the body could not be decoded.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self.status, ResponseStatus::Malformed)
    }

    /// Raw value of a field by wire name.
    ///
    /// Lookups are case-sensitive; when a key repeats, the first value wins.
    #[must_use]
    pub fn get(&self, wire_name: &str) -> Option<&str> {
        self.fields.iter().find(|(key, _)| key == wire_name).map(|(_, value)| value.as_str())
    }

    /// Raw value of a known field.
    #[must_use]
    pub fn field(&self, field: Field) -> Option<&str> {
        self.get(field.wire_name())
    }

    /// All fields in reply order under their wire names.
    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// All fields in reply order under their logical names.
    ///
    /// Unknown wire names are passed through unchanged.
    pub fn logical_fields(&self) -> impl Iterator<Item = (std::borrow::Cow<'_, str>, &str)> {
        self.fields.iter().map(|(key, value)| (to_logical_name(key), value.as_str()))
    }

    /// Gateway transaction id (`ssl_txn_id`).
    #[must_use]
    pub fn transaction_reference(&self) -> Option<&str> {
        self.field(Field::TransactionReference)
    }

    /// Human readable outcome.
    ///
    /// Prefers `ssl_result_message`, then the error block message. A malformed
    /// reply always carries a message starting with [`PARSE_FAILURE_MARKER`].
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        if let Some(marker) = self.parse_error.as_deref() {
            return Some(marker);
        }
        self.field(Field::ResultMessage).or_else(|| self.field(Field::ErrorMessage))
    }

    /// Status code: the status field, or `errorCode` for error replies.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.get(&self.status_field).or_else(|| self.error_code())
    }

    /// Issuer approval code.
    #[must_use]
    pub fn approval_code(&self) -> Option<&str> {
        self.field(Field::ApprovalCode)
    }

    /// Stored card token (`ssl_token`).
    #[must_use]
    pub fn card_reference(&self) -> Option<&str> {
        self.field(Field::CardReference)
    }

    /// `errorCode` of an error reply.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        self.field(Field::ErrorCode)
    }

    /// `errorName` of an error reply.
    #[must_use]
    pub fn error_name(&self) -> Option<&str> {
        self.field(Field::ErrorName)
    }

    /// `errorMessage` of an error reply.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.field(Field::ErrorMessage)
    }
}
