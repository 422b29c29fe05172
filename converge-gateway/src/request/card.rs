//! Card data and billing details.

use std::fmt;

use chrono::{Datelike, NaiveDate, Utc};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::wire::WireBody;
use crate::{
    audit::mask_card_number,
    error::{GatewayError, Result},
    fields::Field,
};

/// Billing fields in the order they are written to the form body.
const BILLING_FIELDS: [Field; 11] = [
    Field::FirstName,
    Field::LastName,
    Field::Company,
    Field::Address1,
    Field::Address2,
    Field::City,
    Field::State,
    Field::Postcode,
    Field::Country,
    Field::Phone,
    Field::Email,
];

/// A payment card with optional billing details.
///
/// Number and security code are wiped from memory on drop and never shown by
/// `Debug`.
///
/// # Examples
///
/// ```
/// use converge_gateway::request::CreditCard;
///
/// let card = CreditCard::new("4111 1111 1111 1111", 12, 2099)
///     .with_cvv("123")
///     .with_name("Ada", "Lovelace")
///     .with_postcode("94025");
///
/// assert_eq!(card.number(), "4111111111111111");
/// assert_eq!(card.expiry_date(), "1299");
/// assert!(card.validate().is_ok());
/// ```
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct CreditCard {
    number: String,
    expiry_month: u32,
    expiry_year: i32,
    cvv: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    company: Option<String>,
    address1: Option<String>,
    address2: Option<String>,
    city: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
    phone: Option<String>,
    email: Option<String>,
}

impl CreditCard {
    /// Creates a card.
    ///
    /// Non-digit characters are stripped from the number. Two-digit years are
    /// read as `20YY`.
    #[must_use]
    #[allow(
        clippy::field_reassign_with_default,
        reason = "zeroize-on-drop rules out struct update syntax"
    )]
    pub fn new(number: &str, expiry_month: u32, expiry_year: i32) -> Self {
        let mut card = Self::default();
        card.number = number.chars().filter(char::is_ascii_digit).collect();
        card.expiry_month = expiry_month;
        card.expiry_year =
            if (0..100).contains(&expiry_year) { 2000 + expiry_year } else { expiry_year };
        card
    }

    /// Sets the card security code.
    #[must_use]
    pub fn with_cvv(mut self, cvv: impl Into<String>) -> Self {
        self.cvv = Some(cvv.into());
        self
    }

    /// Sets the cardholder name.
    #[must_use]
    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    /// Sets the billing company.
    #[must_use]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Sets the billing street address (both lines).
    #[must_use]
    pub fn with_address(mut self, address1: impl Into<String>, address2: Option<String>) -> Self {
        self.address1 = Some(address1.into());
        self.address2 = address2;
        self
    }

    /// Sets the billing city.
    #[must_use]
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Sets the billing state or region.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Sets the billing postal code.
    #[must_use]
    pub fn with_postcode(mut self, postcode: impl Into<String>) -> Self {
        self.postcode = Some(postcode.into());
        self
    }

    /// Sets the billing country.
    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Sets the billing phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the customer email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Card number, digits only.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Card number with all but the last four digits masked.
    #[must_use]
    pub fn masked_number(&self) -> String {
        mask_card_number(&self.number)
    }

    /// Card security code.
    #[must_use]
    pub fn cvv(&self) -> Option<&str> {
        self.cvv.as_deref()
    }

    /// Expiry month, 1-12.
    #[must_use]
    pub const fn expiry_month(&self) -> u32 {
        self.expiry_month
    }

    /// Four-digit expiry year.
    #[must_use]
    pub const fn expiry_year(&self) -> i32 {
        self.expiry_year
    }

    /// Expiry as sent to the gateway: `MMYY`.
    #[must_use]
    pub fn expiry_date(&self) -> String {
        format!("{:02}{:02}", self.expiry_month, self.expiry_year.rem_euclid(100))
    }

    /// Validates the card against today's date.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidCard`] if the number, expiry or security
    /// code is unusable.
    pub fn validate(&self) -> Result<()> {
        self.validate_at(Utc::now().date_naive())
    }

    /// Validates the card against a given date.
    ///
    /// # Errors
    ///
    /// Same as [`validate`](Self::validate).
    pub fn validate_at(&self, today: NaiveDate) -> Result<()> {
        if self.number.is_empty() {
            return Err(GatewayError::InvalidCard("card number is required".to_owned()));
        }
        if !(12..=19).contains(&self.number.len()) {
            return Err(GatewayError::InvalidCard(
                "card number should have 12 to 19 digits".to_owned(),
            ));
        }
        if !luhn_valid(&self.number) {
            return Err(GatewayError::InvalidCard("card number is invalid".to_owned()));
        }
        if !(1..=12).contains(&self.expiry_month) {
            return Err(GatewayError::InvalidCard("expiry month must be between 1 and 12".to_owned()));
        }
        if (self.expiry_year, self.expiry_month) < (today.year(), today.month()) {
            return Err(GatewayError::InvalidCard("card has expired".to_owned()));
        }
        if let Some(cvv) = &self.cvv
            && !((3..=4).contains(&cvv.len()) && cvv.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(GatewayError::InvalidCard("cvv must be 3 or 4 digits".to_owned()));
        }
        Ok(())
    }

    /// Writes card and billing fields to a wire body.
    pub(crate) fn write_to(&self, body: &mut WireBody) {
        body.insert(Field::CardNumber, self.number.as_str());
        body.insert(Field::ExpiryDate, self.expiry_date());
        if let Some(cvv) = self.cvv.as_deref().filter(|cvv| !cvv.is_empty()) {
            body.insert(Field::Cvv, cvv);
            body.insert(Field::CvvIndicator, "1");
        }
        self.write_billing_to(body);
    }

    /// Writes billing fields only, for token-based transactions.
    pub(crate) fn write_billing_to(&self, body: &mut WireBody) {
        for field in BILLING_FIELDS {
            body.insert_opt(field, self.billing_value(field));
        }
    }

    /// Value of a billing field; `None` for fields that are not billing details.
    #[must_use]
    pub fn billing_value(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Company => &self.company,
            Field::Address1 => &self.address1,
            Field::Address2 => &self.address2,
            Field::City => &self.city,
            Field::State => &self.state,
            Field::Postcode => &self.postcode,
            Field::Country => &self.country,
            Field::Phone => &self.phone,
            Field::Email => &self.email,
            _ => return None,
        };
        value.as_deref()
    }
}

impl fmt::Debug for CreditCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreditCard")
            .field("number", &self.masked_number())
            .field("expiry", &self.expiry_date())
            .field("cvv", &self.cvv.as_ref().map(|_| "***"))
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("postcode", &self.postcode)
            .finish_non_exhaustive()
    }
}

/// Luhn checksum over an all-digit string.
fn luhn_valid(digits: &str) -> bool {
    let mut sum = 0;
    for (i, b) in digits.bytes().rev().enumerate() {
        if !b.is_ascii_digit() {
            return false;
        }
        let mut d = u32::from(b - b'0');
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}
