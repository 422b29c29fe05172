//! Gateway requests.
//!
//! A [`Request`] is one Converge transaction: an [`Operation`] plus the
//! fields it needs. Building and sending are split so the exact form body can
//! be inspected before anything leaves the process:
//!
//! 1. [`Request::data`] validates the required fields and produces a
//!    [`WireBody`]. It has no side effects and can be called repeatedly.
//! 2. [`Request::send_data`] posts a body through a [`Transport`] and decodes
//!    the reply.
//!
//! [`Request::send`] does both and consumes the request.
//!
//! # Examples
//!
//! ```
//! use converge_gateway::{
//!     config::GatewayConfig,
//!     request::{Operation, Request},
//! };
//!
//! let config = GatewayConfig::new("000000", "USERNAME", "PASSWORD").with_test_mode(true);
//! let request = Request::new(Operation::Void, &config).with_transaction_reference("SALE123");
//!
//! let data = request.data().unwrap();
//! assert_eq!(data.get("ssl_transaction_type"), Some("ccvoid"));
//! assert_eq!(data.get("ssl_txn_id"), Some("SALE123"));
//! ```

mod card;
mod operation;
mod wire;

use std::time::Instant;

use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

pub use self::{
    card::CreditCard,
    operation::{Operation, Requirement},
    wire::WireBody,
};
use crate::{
    audit,
    audit::AuditEventType,
    config::GatewayConfig,
    error::{GatewayError, Result},
    fields::Field,
    response::Response,
    transport::{RequestContext, Transport},
};

/// Path appended to the endpoint for every transaction.
pub const PROCESS_PATH: &str = "/process.do";

/// Content type of every request body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Value of `ssl_result_format` on every request.
const RESULT_FORMAT: &str = "ASCII";

/// A single gateway transaction.
///
/// Holds a snapshot of the [`GatewayConfig`] it was created with, so later
/// changes to the caller's configuration do not affect it.
#[derive(Debug, Clone)]
pub struct Request {
    operation: Operation,
    config: GatewayConfig,
    transaction_reference: Option<String>,
    amount: Option<Decimal>,
    sales_tax: Option<Decimal>,
    invoice_number: Option<String>,
    description: Option<String>,
    card: Option<CreditCard>,
    card_reference: Option<String>,
    customer_code: Option<String>,
    add_token: bool,
}

impl Request {
    /// Creates an empty request for an operation.
    #[must_use]
    pub fn new(operation: Operation, config: &GatewayConfig) -> Self {
        Self {
            operation,
            config: config.clone(),
            transaction_reference: None,
            amount: None,
            sales_tax: None,
            invoice_number: None,
            description: None,
            card: None,
            card_reference: None,
            customer_code: None,
            add_token: false,
        }
    }

    /// Sets the gateway transaction id of a prior transaction.
    #[must_use]
    pub fn with_transaction_reference(mut self, reference: impl Into<String>) -> Self {
        self.transaction_reference = Some(reference.into());
        self
    }

    /// Sets the transaction amount.
    #[must_use]
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Sets the sales tax amount.
    #[must_use]
    pub fn with_sales_tax(mut self, sales_tax: Decimal) -> Self {
        self.sales_tax = Some(sales_tax);
        self
    }

    /// Sets the merchant-side transaction id, sent as the invoice number.
    #[must_use]
    pub fn with_transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.invoice_number = Some(transaction_id.into());
        self
    }

    /// Sets a free-form description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the card.
    #[must_use]
    pub fn with_card(mut self, card: CreditCard) -> Self {
        self.card = Some(card);
        self
    }

    /// Sets a stored card token.
    #[must_use]
    pub fn with_card_reference(mut self, card_reference: impl Into<String>) -> Self {
        self.card_reference = Some(card_reference.into());
        self
    }

    /// Sets the merchant customer code.
    #[must_use]
    pub fn with_customer_code(mut self, customer_code: impl Into<String>) -> Self {
        self.customer_code = Some(customer_code.into());
        self
    }

    /// Asks the gateway to tokenize the card along with an authorize or
    /// purchase.
    #[must_use]
    pub fn with_add_token(mut self, add_token: bool) -> Self {
        self.add_token = add_token;
        self
    }

    /// Operation this request performs.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// Configuration snapshot.
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Gateway transaction id, if set.
    #[must_use]
    pub fn transaction_reference(&self) -> Option<&str> {
        self.transaction_reference.as_deref()
    }

    /// Transaction amount, if set.
    #[must_use]
    pub const fn amount(&self) -> Option<Decimal> {
        self.amount
    }

    /// Card, if set.
    #[must_use]
    pub const fn card(&self) -> Option<&CreditCard> {
        self.card.as_ref()
    }

    /// Stored card token, if set.
    #[must_use]
    pub fn card_reference(&self) -> Option<&str> {
        self.card_reference.as_deref()
    }

    /// Checks that every requirement is met.
    ///
    /// Empty and whitespace-only strings count as missing. Stops at the first
    /// unmet requirement.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MissingField`] naming the first missing field.
    pub fn validate(&self, requirements: &[Requirement]) -> Result<()> {
        for requirement in requirements {
            let present = match *requirement {
                Requirement::Field(field) => self.has(field),
                Requirement::Card => self.card.is_some(),
                Requirement::CardOrReference => {
                    self.card.is_some() || self.has(Field::CardReference)
                }
            };
            if !present {
                return Err(GatewayError::MissingField { field: requirement.name() });
            }
        }
        Ok(())
    }

    fn has(&self, field: Field) -> bool {
        let text = |value: Option<&str>| value.is_some_and(|v| !v.trim().is_empty());
        let card = self.card.as_ref();

        match field {
            Field::MerchantId => text(Some(self.config.merchant_id.as_str())),
            Field::Username => text(Some(self.config.username.as_str())),
            Field::Password => !self.config.password.is_empty(),
            Field::TestMode | Field::ShowForm | Field::ResultFormat | Field::TransactionType => {
                true
            }
            Field::TransactionReference => text(self.transaction_reference.as_deref()),
            Field::Amount => self.amount.is_some(),
            Field::SalesTax => self.sales_tax.is_some(),
            Field::InvoiceNumber => text(self.invoice_number.as_deref()),
            Field::Description => text(self.description.as_deref()),
            Field::CardReference => text(self.card_reference.as_deref()),
            Field::CustomerCode => text(self.customer_code.as_deref()),
            Field::AddToken => self.add_token,
            Field::CardNumber => card.is_some_and(|c| !c.number().is_empty()),
            Field::ExpiryDate => card.is_some_and(|c| (1..=12).contains(&c.expiry_month())),
            Field::Cvv | Field::CvvIndicator => text(card.and_then(CreditCard::cvv)),
            Field::FirstName
            | Field::LastName
            | Field::Company
            | Field::Address1
            | Field::Address2
            | Field::City
            | Field::State
            | Field::Postcode
            | Field::Country
            | Field::Phone
            | Field::Email => text(card.and_then(|c| c.billing_value(field))),
            Field::Result
            | Field::ResultMessage
            | Field::ApprovalCode
            | Field::TokenResponse
            | Field::ErrorCode
            | Field::ErrorName
            | Field::ErrorMessage => false,
        }
    }

    /// Credential and protocol fields sent with every operation.
    ///
    /// Order: `ssl_merchant_id`, `ssl_user_id`, `ssl_pin`, `ssl_test_mode`,
    /// `ssl_show_form`, `ssl_result_format`.
    #[must_use]
    pub fn base_data(&self) -> WireBody {
        let mut data = WireBody::new();
        data.insert(Field::MerchantId, self.config.merchant_id.as_str());
        data.insert(Field::Username, self.config.username.as_str());
        data.insert(Field::Password, self.config.password.expose());
        data.insert(Field::TestMode, if self.config.test_mode { "true" } else { "false" });
        data.insert(Field::ShowForm, "false");
        data.insert(Field::ResultFormat, RESULT_FORMAT);
        data
    }

    /// Validates the request and builds the full form body.
    ///
    /// Operation fields are merged over [`base_data`](Self::base_data).
    /// Calling this twice yields identical bodies.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a required field is missing, an amount is
    /// not a positive two-decimal value, or the card fails local checks.
    pub fn data(&self) -> Result<WireBody> {
        self.validate(self.operation.requirements())?;

        let mut data = WireBody::new();
        data.insert(Field::ResultFormat, RESULT_FORMAT);
        data.insert(Field::TransactionType, self.operation.transaction_type());

        match self.operation {
            Operation::Authorize | Operation::Purchase => self.write_payment(&mut data)?,
            Operation::Capture => {
                data.insert_opt(Field::TransactionReference, self.transaction_reference());
                if let Some(amount) = self.amount {
                    data.insert(Field::Amount, format_amount(Field::Amount, amount)?);
                }
            }
            Operation::Refund => {
                data.insert_opt(Field::TransactionReference, self.transaction_reference());
                self.write_amount(&mut data)?;
            }
            Operation::Void => {
                data.insert_opt(Field::TransactionReference, self.transaction_reference());
            }
            Operation::CreateCard => {
                if let Some(card) = &self.card {
                    card.validate()?;
                    card.write_to(&mut data);
                }
                data.insert_opt(Field::CustomerCode, self.customer_code.as_deref());
                data.insert(Field::AddToken, "Y");
            }
            Operation::DeleteCard => {
                data.insert_opt(Field::CardReference, self.card_reference());
            }
        }

        let mut body = self.base_data();
        body.merge(data);
        Ok(body)
    }

    fn write_amount(&self, data: &mut WireBody) -> Result<()> {
        let amount = self.amount.ok_or(GatewayError::MissingField { field: "amount" })?;
        data.insert(Field::Amount, format_amount(Field::Amount, amount)?);
        Ok(())
    }

    fn write_payment(&self, data: &mut WireBody) -> Result<()> {
        self.write_amount(data)?;
        if let Some(tax) = self.sales_tax {
            data.insert(Field::SalesTax, format_amount(Field::SalesTax, tax)?);
        }
        data.insert_opt(Field::InvoiceNumber, self.invoice_number.as_deref());
        data.insert_opt(Field::Description, self.description.as_deref());

        match (self.card_reference().filter(|r| !r.trim().is_empty()), &self.card) {
            (Some(reference), card) => {
                data.insert(Field::CardReference, reference);
                if let Some(card) = card {
                    card.write_billing_to(data);
                }
            }
            (None, Some(card)) => {
                card.validate()?;
                card.write_to(data);
            }
            (None, None) => return Err(GatewayError::MissingField { field: "card" }),
        }

        data.insert_opt(Field::CustomerCode, self.customer_code.as_deref());
        if self.add_token {
            data.insert(Field::AddToken, "Y");
        }
        Ok(())
    }

    /// Posts a form body to `<endpoint>/process.do` and decodes the reply.
    ///
    /// Does not judge the outcome: a declined or malformed reply is returned
    /// as a [`Response`].
    ///
    /// # Errors
    ///
    /// Returns a transport error if the body cannot be encoded, the transport
    /// fails, or the gateway answers with a non-2xx status.
    #[instrument(
        skip(self, transport, data),
        fields(
            operation = %self.operation,
            endpoint = self.config.endpoint(),
            protocol = transport.protocol_name(),
        )
    )]
    pub async fn send_data<T: Transport>(&self, transport: &T, data: &WireBody) -> Result<Response> {
        let request_id = Uuid::new_v4();
        let merchant_id = self.config.merchant_id.as_str();
        let endpoint = self.config.endpoint();
        let body = data.to_form_encoded()?;

        debug!(%request_id, ?data, "sending form body");
        audit!(
            AuditEventType::RequestSent,
            merchant_id,
            request_id,
            with_operation(self.operation.name()),
            with_endpoint(endpoint),
        );

        let ctx = RequestContext {
            base_url: endpoint,
            path: PROCESS_PATH,
            headers: vec![],
            content_type: Some(FORM_CONTENT_TYPE),
        };

        let started = Instant::now();
        let reply = match transport.post(ctx, body.as_bytes()).await {
            Ok(reply) if reply.is_success() => reply,
            Ok(reply) => {
                let error = GatewayError::UnexpectedStatus(reply.status);
                self.audit_failure(request_id, &error, started);
                return Err(error);
            }
            Err(error) => {
                self.audit_failure(request_id, &error, started);
                return Err(error);
            }
        };

        let response = self.config.response.parse_bytes(&reply.body);
        if response.is_malformed() {
            warn!(%request_id, message = response.message(), "gateway reply could not be decoded");
        }

        let mut event =
            audit::AuditEvent::new(AuditEventType::ResponseReceived, merchant_id, request_id)
                .with_operation(self.operation.name())
                .with_outcome(response.status().as_str())
                .with_duration(started.elapsed());
        if let Some(reference) = response.transaction_reference() {
            event = event.with_transaction_reference(reference);
        }
        audit::audit_log(&event);

        Ok(response)
    }

    fn audit_failure(&self, request_id: Uuid, error: &GatewayError, started: Instant) {
        audit!(
            AuditEventType::TransportFailed,
            self.config.merchant_id.as_str(),
            request_id,
            with_operation(self.operation.name()),
            with_error(error.to_string()),
            with_duration(started.elapsed()),
        );
    }

    /// Validates, builds and sends the request.
    ///
    /// # Errors
    ///
    /// Returns a validation error before anything is sent, or any error from
    /// [`send_data`](Self::send_data).
    pub async fn send<T: Transport>(self, transport: &T) -> Result<Response> {
        let data = match self.data() {
            Ok(data) => data,
            Err(error) => {
                audit!(
                    AuditEventType::ValidationFailed,
                    self.config.merchant_id.as_str(),
                    Uuid::new_v4(),
                    with_operation(self.operation.name()),
                    with_error(error.to_string()),
                );
                return Err(error);
            }
        };
        self.send_data(transport, &data).await
    }
}

/// Renders an amount with exactly two decimals.
fn format_amount(field: Field, amount: Decimal) -> Result<String> {
    if amount <= Decimal::ZERO {
        return Err(GatewayError::InvalidField {
            field: field.logical_name(),
            reason: format!("must be positive, got {amount}"),
        });
    }
    if amount.normalize().scale() > 2 {
        return Err(GatewayError::InvalidField {
            field: field.logical_name(),
            reason: format!("precision is too high: {amount}"),
        });
    }
    Ok(format!("{amount:.2}"))
}
