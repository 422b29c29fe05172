//! Error types for the Converge gateway client.
//!
//! This module defines every error that can occur while building, sending or
//! configuring a gateway request. All errors implement the standard
//! [`std::error::Error`] trait via [`thiserror::Error`].
//!
//! # Error Categories
//!
//! - **Validation Errors** ([`GatewayError::MissingField`], [`GatewayError::InvalidField`],
//!   [`GatewayError::InvalidCard`]): raised locally before any network call
//! - **Transport Errors** ([`GatewayError::HttpError`], [`GatewayError::TransportError`],
//!   [`GatewayError::UnexpectedStatus`], [`GatewayError::InvalidEndpoint`]): the HTTP exchange
//!   itself failed
//! - **Configuration Errors** ([`GatewayError::ConfigError`]): credentials or settings are
//!   unusable
//!
//! A declined transaction is **not** an error. The gateway answered, so the
//! reply is returned as a [`Response`](crate::response::Response) whose
//! [`is_successful`](crate::response::Response::is_successful) is `false`.
//!
//! # Examples
//!
//! ```
//! use converge_gateway::error::{GatewayError, Result};
//!
//! fn require_reference(reference: Option<&str>) -> Result<&str> {
//!     reference.ok_or(GatewayError::MissingField { field: "transactionReference" })
//! }
//!
//! let err = require_reference(None).unwrap_err();
//! assert!(err.is_validation());
//! assert_eq!(err.to_string(), "The transactionReference parameter is required");
//! ```

use thiserror::Error;

/// Result type alias for gateway operations.
///
/// All fallible functions in this crate return this type.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors that can occur while talking to the Converge gateway.
///
/// # Error Recovery
///
/// - **Validation errors**: fix the request and build it again. No retry happens
///   automatically and nothing was sent.
/// - **Transport errors**: the send attempt is over. Whether to retry is the
///   caller's decision; use the original transaction reference to avoid double
///   charging.
/// - **Configuration errors**: correct the config file or environment.
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A field required by the operation is missing or empty.
    ///
    /// `field` is the logical parameter name, e.g. `transactionReference`.
    #[error("The {field} parameter is required")]
    MissingField {
        /// Logical name of the missing field.
        field: &'static str,
    },

    /// A field is present but its value is not acceptable.
    ///
    /// # Examples
    ///
    /// ```
    /// use converge_gateway::error::GatewayError;
    ///
    /// let err = GatewayError::InvalidField { field: "amount", reason: "must be positive".into() };
    /// assert_eq!(err.to_string(), "Invalid amount: must be positive");
    /// ```
    #[error("Invalid {field}: {reason}")]
    InvalidField {
        /// Logical name of the rejected field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Card data failed local validation (number, expiry or CVV).
    #[error("Invalid card: {0}")]
    InvalidCard(String),

    /// HTTP request failed.
    ///
    /// Wraps [`reqwest::Error`]. Common causes include timeouts, refused
    /// connections, DNS failures and TLS errors.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The transport refused to send the request.
    ///
    /// Raised for non-HTTPS endpoints, loopback hosts, unsafe paths or header
    /// values containing control characters.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The gateway answered with a non-success HTTP status.
    #[error("Gateway returned HTTP status {0}")]
    UnexpectedStatus(u16),

    /// The configured endpoint URL cannot be used.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Configuration could not be loaded or failed validation.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl GatewayError {
    /// Returns true for errors raised by local request validation.
    ///
    /// Validation errors are always raised before anything is sent.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::MissingField { .. } | Self::InvalidField { .. } | Self::InvalidCard(_))
    }

    /// Returns true for errors raised by the transport layer.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::HttpError(_)
                | Self::TransportError(_)
                | Self::UnexpectedStatus(_)
                | Self::InvalidEndpoint(_)
        )
    }

    /// Returns the logical name of the missing field, if this is a
    /// [`MissingField`](Self::MissingField) error.
    #[must_use]
    pub const fn missing_field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { field } => Some(*field),
            _ => None,
        }
    }
}
