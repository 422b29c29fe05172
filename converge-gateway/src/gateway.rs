//! Gateway facade.

use rust_decimal::Decimal;

use crate::{
    config::GatewayConfig,
    error::Result,
    request::{CreditCard, Operation, Request},
    response::Response,
    transport::{HttpTransport, Transport},
};

/// Factory for requests bound to one configuration and one transport.
///
/// Each method returns a [`Request`] pre-filled with the operation's
/// mandatory arguments; optional fields are added with the request's
/// `with_*` setters before calling [`send`](Self::send).
///
/// # Examples
///
/// ```rust,no_run
/// use converge_gateway::{ConvergeGateway, GatewayConfig};
///
/// # async fn example() -> converge_gateway::Result<()> {
/// let config = GatewayConfig::new("000000", "USERNAME", "PASSWORD").with_test_mode(true);
/// let gateway = ConvergeGateway::new(config)?;
///
/// let response = gateway.send(gateway.void("SALE123")).await?;
/// if response.is_successful() {
///     println!("voided {}", response.transaction_reference().unwrap_or_default());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ConvergeGateway<T: Transport = HttpTransport> {
    config: GatewayConfig,
    transport: T,
}

impl ConvergeGateway<HttpTransport> {
    /// Creates a gateway using a reqwest transport built from `config.http`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let transport = HttpTransport::with_config(&config.http)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> ConvergeGateway<T> {
    /// Creates a gateway with a caller-supplied transport.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigError`](crate::GatewayError::ConfigError)
    /// if the configuration is invalid.
    pub fn with_transport(config: GatewayConfig, transport: T) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, transport })
    }

    /// Gateway configuration.
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Transport used by [`send`](Self::send).
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Creates an empty request for any operation.
    #[must_use]
    pub fn request(&self, operation: Operation) -> Request {
        Request::new(operation, &self.config)
    }

    /// Authorize `amount`; add a card or card reference before sending.
    #[must_use]
    pub fn authorize(&self, amount: Decimal) -> Request {
        self.request(Operation::Authorize).with_amount(amount)
    }

    /// Purchase `amount`; add a card or card reference before sending.
    #[must_use]
    pub fn purchase(&self, amount: Decimal) -> Request {
        self.request(Operation::Purchase).with_amount(amount)
    }

    /// Capture a prior authorization.
    #[must_use]
    pub fn capture(&self, transaction_reference: impl Into<String>) -> Request {
        self.request(Operation::Capture).with_transaction_reference(transaction_reference)
    }

    /// Refund `amount` of a settled transaction.
    #[must_use]
    pub fn refund(&self, transaction_reference: impl Into<String>, amount: Decimal) -> Request {
        self.request(Operation::Refund)
            .with_transaction_reference(transaction_reference)
            .with_amount(amount)
    }

    /// Void an unsettled transaction.
    #[must_use]
    pub fn void(&self, transaction_reference: impl Into<String>) -> Request {
        self.request(Operation::Void).with_transaction_reference(transaction_reference)
    }

    /// Store a card and obtain a token.
    #[must_use]
    pub fn create_card(&self, card: CreditCard) -> Request {
        self.request(Operation::CreateCard).with_card(card)
    }

    /// Delete a stored card token.
    #[must_use]
    pub fn delete_card(&self, card_reference: impl Into<String>) -> Request {
        self.request(Operation::DeleteCard).with_card_reference(card_reference)
    }

    /// Sends a request through this gateway's transport.
    ///
    /// # Errors
    ///
    /// See [`Request::send`].
    pub async fn send(&self, request: Request) -> Result<Response> {
        request.send(&self.transport).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use super::*;
    use crate::error::GatewayError;

    fn gateway() -> ConvergeGateway {
        let config = GatewayConfig::new("000000", "USERNAME", "PASSWORD").with_test_mode(true);
        ConvergeGateway::new(config).unwrap()
    }

    #[test]
    fn test_factories_prefill_required_fields() {
        let gateway = gateway();

        let void = gateway.void("SALE123");
        assert_eq!(void.operation(), Operation::Void);
        assert_eq!(void.transaction_reference(), Some("SALE123"));

        let refund = gateway.refund("SALE123", Decimal::new(1050, 2));
        assert_eq!(refund.amount(), Some(Decimal::new(1050, 2)));
        assert!(refund.data().is_ok());

        let delete = gateway.delete_card("TOKEN1");
        assert_eq!(delete.card_reference(), Some("TOKEN1"));

        assert_eq!(gateway.purchase(Decimal::ONE).operation(), Operation::Purchase);
        assert_eq!(gateway.authorize(Decimal::ONE).operation(), Operation::Authorize);
        assert_eq!(gateway.capture("A1").operation(), Operation::Capture);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let err = ConvergeGateway::new(GatewayConfig::new("", "USERNAME", "PASSWORD")).unwrap_err();
        assert!(matches!(err, GatewayError::ConfigError(_)));
    }

    #[test]
    fn test_requests_use_gateway_config() {
        let gateway = gateway();
        let data = gateway.void("SALE123").data().unwrap();
        assert_eq!(data.get("ssl_merchant_id"), Some("000000"));
        assert_eq!(data.get("ssl_test_mode"), Some("true"));
        assert_eq!(gateway.transport().protocol_name(), "http");
    }
}
