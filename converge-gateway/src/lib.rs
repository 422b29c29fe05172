//! Converge Gateway: a thin client for the Elavon Converge form-post API
//!
//! Converge processes card transactions through a single HTTPS endpoint that
//! accepts `application/x-www-form-urlencoded` posts of `ssl_*` fields and
//! answers with flat `key=value` records. This crate maps a generic payment
//! vocabulary (authorize, purchase, capture, refund, void, card tokenization)
//! onto that protocol.
//!
//! # Architecture
//!
//! ```text
//! GatewayConfig ──► Request (Operation + fields)
//!                     │ data(): validate + WireBody
//!                     ▼
//!                   Transport::post  ──►  POST {endpoint}/process.do
//!                     │
//!                     ▼
//!                   ResponseFormat::parse ──► Response (approved / declined / malformed)
//! ```
//!
//! - [`fields`]: logical name ↔ `ssl_*` wire name table
//! - [`config`]: credentials, test mode, endpoints, reply format, HTTP settings
//! - [`request`]: operations, requirement checks, card data and form bodies
//! - [`transport`]: the HTTP exchange, behind a trait
//! - [`response`]: lenient reply decoding
//! - [`audit`]: redacted audit events on the `audit` tracing target
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use converge_gateway::{ConvergeGateway, GatewayConfig};
//!
//! # async fn example() -> converge_gateway::Result<()> {
//! let config = GatewayConfig::new("000000", "USERNAME", "PASSWORD").with_test_mode(true);
//! let gateway = ConvergeGateway::new(config)?;
//!
//! let response = gateway.send(gateway.void("SALE123")).await?;
//!
//! if response.is_successful() {
//!     println!("Void approved: {:?}", response.transaction_reference());
//! } else {
//!     println!("Void declined: {:?}", response.message());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Validation, transport and configuration problems are [`GatewayError`]s. A
//! declined transaction is not an error: the gateway answered, so the reply is
//! returned as a [`Response`] and [`Response::is_successful`] decides.
//!
//! ```rust,no_run
//! use converge_gateway::{ConvergeGateway, GatewayConfig, GatewayError};
//!
//! # async fn example(gateway: ConvergeGateway) {
//! match gateway.send(gateway.void("")).await {
//!     Ok(response) => println!("approved: {}", response.is_successful()),
//!     Err(GatewayError::MissingField { field }) => eprintln!("missing {field}"),
//!     Err(e) if e.is_transport() => eprintln!("network problem: {e}"),
//!     Err(e) => eprintln!("other error: {e}"),
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest"
)]

pub mod audit;
pub mod config;
pub mod error;
pub mod fields;
pub mod gateway;
pub mod request;
pub mod response;
pub mod transport;

pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use gateway::ConvergeGateway;
pub use request::{CreditCard, Operation, Request};
pub use response::{Response, ResponseFormat, ResponseStatus};
