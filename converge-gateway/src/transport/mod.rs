//! Transport abstraction layer.
//!
//! The gateway speaks one protocol: a single form-encoded HTTP POST per
//! operation. The [`Transport`] trait isolates that exchange so request
//! building and reply decoding never touch the network directly, and so tests
//! can substitute a recording transport.
//!
//! # Examples
//!
//! ```rust,no_run
//! use converge_gateway::transport::{HttpTransport, RequestContext, Transport};
//!
//! # async fn example() -> converge_gateway::error::Result<()> {
//! let transport = HttpTransport::new()?;
//!
//! let ctx = RequestContext {
//!     base_url: "https://api.demo.convergepay.com/VirtualMerchantDemo",
//!     path: "/process.do",
//!     headers: vec![],
//!     content_type: Some("application/x-www-form-urlencoded"),
//! };
//!
//! let response = transport.post(ctx, b"ssl_transaction_type=ccvoid").await?;
//! println!("Status: {}", response.status);
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::{borrow::Cow, future::Future};

use crate::error::Result;

pub mod config;
pub mod http;

pub use config::{HttpConfig, HttpVersion};
pub use http::HttpTransport;

/// Request context for transport operations.
#[derive(Debug, Clone)]
pub struct RequestContext<'a> {
    /// Gateway base URL, e.g. <https://api.convergepay.com/VirtualMerchant>.
    pub base_url: &'a str,
    /// Request path appended to the base URL, e.g. `/process.do`.
    pub path: &'a str,
    /// Additional HTTP headers to include.
    pub headers: Vec<(&'a str, &'a str)>,
    /// Content-Type header value (if applicable).
    pub content_type: Option<&'a str>,
}

impl RequestContext<'_> {
    /// Full request URL: base URL without trailing slash, followed by the path.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.path)
    }
}

/// Response from transport operations.
///
/// Contains the raw response body, HTTP status code, and response headers.
#[derive(Debug)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body bytes.
    pub body: Vec<u8>,
    /// Response headers.
    pub headers: Vec<(String, String)>,
}

impl TransportResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Transport protocol abstraction.
///
/// Implementations perform exactly one POST per call and return whatever the
/// server answered. Status handling and reply decoding happen in the caller.
///
/// # Security
///
/// [`HttpTransport`]:
/// - Validates gateway URLs (HTTPS only, no localhost)
/// - Rejects path traversal and header injection
/// - Supports request timeouts and connection pooling
pub trait Transport: Send + Sync {
    /// Executes a POST request with body.
    ///
    /// # Errors
    ///
    /// Returns error if the URL is rejected or the HTTP exchange fails.
    fn post<'a>(
        &'a self,
        ctx: RequestContext<'a>,
        body: &'a [u8],
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Returns the protocol name for logging.
    ///
    /// Examples: "http/1.1", "http/2"
    fn protocol_name(&self) -> &'static str;
}
