//! Reply format settings and the ASCII reply decoder.

use std::fmt;

use serde::Deserialize;

use super::{PARSE_FAILURE_MARKER, Response, ResponseStatus};
use crate::error::{GatewayError, Result};

/// How records are separated in a reply body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum RecordDelimiter {
    /// Newlines when the body contains one, `|` otherwise.
    #[default]
    Auto,
    /// One record per line (`\n` or `\r\n`).
    Newline,
    /// A single delimiter character.
    Char(char),
}

impl TryFrom<String> for RecordDelimiter {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "auto" => Ok(Self::Auto),
            "newline" | "\n" | "\r\n" => Ok(Self::Newline),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Self::Char(c)),
                    _ => Err(format!(
                        "delimiter must be \"auto\", \"newline\" or a single character, got {other:?}"
                    )),
                }
            }
        }
    }
}

impl fmt::Display for RecordDelimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Newline => f.write_str("newline"),
            Self::Char(c) => write!(f, "{c:?}"),
        }
    }
}

/// Reply decoding settings.
///
/// Converge documents its reply as flat `key=value` records; the delimiter and
/// the status convention are configurable so the decoder does not hardcode
/// them.
///
/// # Examples
///
/// ```
/// use converge_gateway::response::ResponseFormat;
///
/// let format = ResponseFormat::default();
/// let response = format.parse("ssl_result=0|ssl_txn_id=SALE123|ssl_result_message=APPROVAL");
///
/// assert!(response.is_successful());
/// assert_eq!(response.transaction_reference(), Some("SALE123"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResponseFormat {
    /// Record delimiter.
    pub delimiter: RecordDelimiter,

    /// Separator between key and value inside a record.
    pub separator: char,

    /// Wire name of the status field.
    pub status_field: String,

    /// Status value meaning "approved".
    pub approved_value: String,
}

impl Default for ResponseFormat {
    fn default() -> Self {
        Self {
            delimiter: RecordDelimiter::Auto,
            separator: '=',
            status_field: "ssl_result".to_owned(),
            approved_value: "0".to_owned(),
        }
    }
}

impl ResponseFormat {
    /// Replaces the record delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: RecordDelimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Validates that the settings can decode anything at all.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigError`] if the separator collides with the
    /// delimiter or the status convention is empty.
    pub fn validate(&self) -> Result<()> {
        let collides = match self.delimiter {
            RecordDelimiter::Char(c) => c == self.separator,
            RecordDelimiter::Newline => self.separator == '\n' || self.separator == '\r',
            RecordDelimiter::Auto => matches!(self.separator, '\n' | '\r' | '|'),
        };
        if collides {
            return Err(GatewayError::ConfigError(format!(
                "response separator {:?} collides with delimiter {}",
                self.separator, self.delimiter
            )));
        }
        if self.status_field.trim().is_empty() {
            return Err(GatewayError::ConfigError("response status_field cannot be empty".to_owned()));
        }
        if self.approved_value.is_empty() {
            return Err(GatewayError::ConfigError(
                "response approved_value cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// Decodes a raw reply body.
    ///
    /// Never fails: a body that cannot be decoded yields a
    /// [`ResponseStatus::Malformed`] response whose message starts with
    /// [`PARSE_FAILURE_MARKER`]. Unknown fields are preserved verbatim.
    #[must_use]
    pub fn parse(&self, raw: &str) -> Response {
        let body = raw.trim();
        if body.is_empty() {
            return self.malformed(Vec::new(), "empty response body");
        }

        let mut fields = Vec::new();
        let mut stray_records = 0_usize;

        for record in self.records(body) {
            let record = record.trim();
            if record.is_empty() {
                continue;
            }
            match record.split_once(self.separator) {
                Some((key, value)) if !key.trim().is_empty() => {
                    fields.push((key.trim().to_owned(), value.trim().to_owned()));
                }
                _ => stray_records += 1,
            }
        }

        if fields.is_empty() {
            return self.malformed(fields, "no key/value records found");
        }
        if stray_records > 0 {
            let reason =
                format!("{stray_records} record(s) without a {:?} separator", self.separator);
            return self.malformed(fields, &reason);
        }

        let approved = fields
            .iter()
            .find(|(key, _)| *key == self.status_field)
            .is_some_and(|(_, value)| *value == self.approved_value);
        let status = if approved { ResponseStatus::Approved } else { ResponseStatus::Declined };

        Response::new(status, fields, self.status_field.clone(), None)
    }

    /// Decodes a raw reply body given as bytes.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    #[must_use]
    pub fn parse_bytes(&self, raw: &[u8]) -> Response {
        self.parse(&String::from_utf8_lossy(raw))
    }

    fn records<'a>(&self, body: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        match self.delimiter {
            RecordDelimiter::Newline => Box::new(body.lines()),
            RecordDelimiter::Char(c) => Box::new(body.split(c)),
            RecordDelimiter::Auto if body.contains('\n') => Box::new(body.lines()),
            RecordDelimiter::Auto => Box::new(body.split('|')),
        }
    }

    fn malformed(&self, fields: Vec<(String, String)>, reason: &str) -> Response {
        Response::new(
            ResponseStatus::Malformed,
            fields,
            self.status_field.clone(),
            Some(format!("{PARSE_FAILURE_MARKER} {reason}")),
        )
    }
}
