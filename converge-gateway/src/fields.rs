//! Field model for the Converge form-post protocol.
//!
//! Every parameter the client knows about has a logical name (the name used by
//! callers, e.g. `transactionReference`) and a wire name (the exact key the
//! gateway expects, e.g. `ssl_txn_id`). The mapping is a static, immutable
//! table shared by all requests and responses.
//!
//! # Examples
//!
//! ```
//! use converge_gateway::fields::Field;
//!
//! assert_eq!(Field::TransactionReference.wire_name(), "ssl_txn_id");
//! assert_eq!(Field::from_logical("merchantId"), Some(Field::MerchantId));
//! assert_eq!(Field::from_wire("ssl_pin"), Some(Field::Password));
//! ```

use std::{borrow::Cow, fmt};

/// Value kind of a field.
///
/// Descriptive only, except for [`FieldKind::Secret`], which keeps a field's
/// values out of logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Credential or card data; never logged.
    Secret,
    /// Boolean flag.
    Flag,
    /// Fixed protocol vocabulary (transaction type, result format).
    Enum,
    /// Decimal amount rendered with two fraction digits.
    Amount,
    /// Gateway-assigned identifier (transaction id, card token).
    Reference,
}

/// A parameter known to the Converge protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    /// Converge account id.
    MerchantId,
    /// Converge user id.
    Username,
    /// Converge PIN.
    Password,
    /// Test-mode flag.
    TestMode,
    /// Hosted form toggle; always `false` for direct posts.
    ShowForm,
    /// Reply encoding; always `ASCII`.
    ResultFormat,
    /// Operation tag.
    TransactionType,
    /// Gateway transaction id of a prior transaction.
    TransactionReference,
    /// Transaction amount.
    Amount,
    /// Sales tax amount.
    SalesTax,
    /// Merchant-side transaction id, sent as the invoice number.
    InvoiceNumber,
    /// Free-form description.
    Description,
    /// Primary account number.
    CardNumber,
    /// Card expiry as `MMYY`.
    ExpiryDate,
    /// Card security code.
    Cvv,
    /// Whether a security code is present (`1`).
    CvvIndicator,
    /// Cardholder first name.
    FirstName,
    /// Cardholder last name.
    LastName,
    /// Billing company.
    Company,
    /// Billing street address, checked by AVS.
    Address1,
    /// Billing address second line.
    Address2,
    /// Billing city.
    City,
    /// Billing state or region.
    State,
    /// Billing postal code, checked by AVS.
    Postcode,
    /// Billing country.
    Country,
    /// Billing phone number.
    Phone,
    /// Customer email.
    Email,
    /// Merchant customer code.
    CustomerCode,
    /// Stored card token.
    CardReference,
    /// Request a card token along with the transaction (`Y`/`N`).
    AddToken,
    /// Result status in replies.
    Result,
    /// Human readable result in replies.
    ResultMessage,
    /// Issuer approval code in replies.
    ApprovalCode,
    /// Tokenization outcome in replies.
    TokenResponse,
    /// Error code in error replies.
    ErrorCode,
    /// Error name in error replies.
    ErrorName,
    /// Error message in error replies.
    ErrorMessage,
}

impl Field {
    /// Every known field, in table order.
    pub const ALL: [Self; 37] = [
        Self::MerchantId,
        Self::Username,
        Self::Password,
        Self::TestMode,
        Self::ShowForm,
        Self::ResultFormat,
        Self::TransactionType,
        Self::TransactionReference,
        Self::Amount,
        Self::SalesTax,
        Self::InvoiceNumber,
        Self::Description,
        Self::CardNumber,
        Self::ExpiryDate,
        Self::Cvv,
        Self::CvvIndicator,
        Self::FirstName,
        Self::LastName,
        Self::Company,
        Self::Address1,
        Self::Address2,
        Self::City,
        Self::State,
        Self::Postcode,
        Self::Country,
        Self::Phone,
        Self::Email,
        Self::CustomerCode,
        Self::CardReference,
        Self::AddToken,
        Self::Result,
        Self::ResultMessage,
        Self::ApprovalCode,
        Self::TokenResponse,
        Self::ErrorCode,
        Self::ErrorName,
        Self::ErrorMessage,
    ];

    /// Returns `(logical name, wire name, kind)` for this field.
    const fn entry(self) -> (&'static str, &'static str, FieldKind) {
        use FieldKind::{Amount, Enum, Flag, Reference, Secret, Text};

        match self {
            Self::MerchantId => ("merchantId", "ssl_merchant_id", Text),
            Self::Username => ("username", "ssl_user_id", Text),
            Self::Password => ("password", "ssl_pin", Secret),
            Self::TestMode => ("testMode", "ssl_test_mode", Flag),
            Self::ShowForm => ("showForm", "ssl_show_form", Flag),
            Self::ResultFormat => ("resultFormat", "ssl_result_format", Enum),
            Self::TransactionType => ("transactionType", "ssl_transaction_type", Enum),
            Self::TransactionReference => ("transactionReference", "ssl_txn_id", Reference),
            Self::Amount => ("amount", "ssl_amount", Amount),
            Self::SalesTax => ("salesTax", "ssl_salestax", Amount),
            Self::InvoiceNumber => ("transactionId", "ssl_invoice_number", Text),
            Self::Description => ("description", "ssl_description", Text),
            Self::CardNumber => ("cardNumber", "ssl_card_number", Secret),
            Self::ExpiryDate => ("expiryDate", "ssl_exp_date", Text),
            Self::Cvv => ("cvv", "ssl_cvv2cvc2", Secret),
            Self::CvvIndicator => ("cvvIndicator", "ssl_cvv2cvc2_indicator", Enum),
            Self::FirstName => ("firstName", "ssl_first_name", Text),
            Self::LastName => ("lastName", "ssl_last_name", Text),
            Self::Company => ("company", "ssl_company", Text),
            Self::Address1 => ("address1", "ssl_avs_address", Text),
            Self::Address2 => ("address2", "ssl_address2", Text),
            Self::City => ("city", "ssl_city", Text),
            Self::State => ("state", "ssl_state", Text),
            Self::Postcode => ("postcode", "ssl_avs_zip", Text),
            Self::Country => ("country", "ssl_country", Text),
            Self::Phone => ("phone", "ssl_phone", Text),
            Self::Email => ("email", "ssl_email", Text),
            Self::CustomerCode => ("customerCode", "ssl_customer_code", Text),
            Self::CardReference => ("cardReference", "ssl_token", Reference),
            Self::AddToken => ("addToken", "ssl_add_token", Flag),
            Self::Result => ("result", "ssl_result", Enum),
            Self::ResultMessage => ("message", "ssl_result_message", Text),
            Self::ApprovalCode => ("approvalCode", "ssl_approval_code", Reference),
            Self::TokenResponse => ("tokenResponse", "ssl_token_response", Enum),
            Self::ErrorCode => ("errorCode", "errorCode", Text),
            Self::ErrorName => ("errorName", "errorName", Text),
            Self::ErrorMessage => ("errorMessage", "errorMessage", Text),
        }
    }

    /// Logical (caller-facing) name.
    #[must_use]
    pub const fn logical_name(self) -> &'static str {
        self.entry().0
    }

    /// Exact key used in the form body and in replies.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        self.entry().1
    }

    /// Value kind.
    #[must_use]
    pub const fn kind(self) -> FieldKind {
        self.entry().2
    }

    /// Returns true if values of this field must never be logged.
    #[must_use]
    pub const fn is_sensitive(self) -> bool {
        matches!(self.kind(), FieldKind::Secret)
    }

    /// Looks up a field by logical name.
    #[must_use]
    pub fn from_logical(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.logical_name() == name)
    }

    /// Looks up a field by wire name.
    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.wire_name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.logical_name())
    }
}

/// Maps a logical name to its wire name.
///
/// Unknown names are passed through unchanged.
#[must_use]
pub fn to_wire_name(logical_name: &str) -> Cow<'_, str> {
    Field::from_logical(logical_name)
        .map_or(Cow::Borrowed(logical_name), |field| Cow::Borrowed(field.wire_name()))
}

/// Maps a wire name from a reply to its logical name.
///
/// Unknown names are passed through unchanged so nothing the gateway sends is
/// lost.
#[must_use]
pub fn to_logical_name(wire_name: &str) -> Cow<'_, str> {
    Field::from_wire(wire_name)
        .map_or(Cow::Borrowed(wire_name), |field| Cow::Borrowed(field.logical_name()))
}

/// Returns true if the wire name belongs to a field that must never be logged.
#[must_use]
pub fn is_sensitive_wire_name(wire_name: &str) -> bool {
    Field::from_wire(wire_name).is_some_and(Field::is_sensitive)
}
