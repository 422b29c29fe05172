use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use converge_gateway::{ConvergeGateway, CreditCard, Operation, Request, transport::Transport};
use rust_decimal::Decimal;

use crate::observability::LogFormat;

/// Send a single transaction to the Converge gateway and print the reply as JSON.
///
/// Credentials come from `--config` or from the `CONVERGE_*` environment
/// variables. The exit status is 0 when the gateway approved the transaction,
/// 2 when it answered without approving, and 1 on any other error.
#[derive(Parser, Debug)]
#[command(name = "converge", version, arg_required_else_help = true)]
pub(crate) struct Cli {
    /// TOML configuration file. Without one, credentials come from `CONVERGE_*` variables.
    #[arg(short, long, value_name = "FILE", env = "CONVERGE_CONFIG", global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Force test mode and the demo endpoint.
    #[arg(long, global = true)]
    pub(crate) test_mode: bool,

    /// Post to this endpoint instead of the test or live default.
    #[arg(long, value_name = "URL", global = true)]
    pub(crate) endpoint: Option<String>,

    /// Log output format. Defaults to `LOG_FORMAT`, then pretty.
    #[arg(long, value_enum, global = true)]
    pub(crate) log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Authorize an amount without capturing it (`ccauthonly`).
    Authorize(PaymentArgs),
    /// Authorize and capture in one step (`ccsale`).
    Purchase(PaymentArgs),
    /// Capture a prior authorization (`cccomplete`).
    Capture {
        /// Gateway transaction id of the authorization.
        transaction_reference: String,
        /// Capture a partial amount.
        #[arg(long)]
        amount: Option<Decimal>,
    },
    /// Refund a settled transaction (`ccreturn`).
    Refund {
        /// Gateway transaction id to refund.
        transaction_reference: String,
        /// Amount to return.
        amount: Decimal,
    },
    /// Void an unsettled transaction (`ccvoid`).
    Void {
        /// Gateway transaction id to void.
        transaction_reference: String,
    },
    /// Store a card and print its token (`ccgettoken`).
    CreateCard {
        #[command(flatten)]
        card: CardArgs,
        /// Customer code to store with the token.
        #[arg(long)]
        customer_code: Option<String>,
    },
    /// Delete a stored card token (`ccdeletetoken`).
    DeleteCard {
        /// Token returned by `create-card`.
        card_reference: String,
    },
}

#[derive(Args, Debug)]
pub(crate) struct PaymentArgs {
    /// Amount with at most two decimal places.
    pub(crate) amount: Decimal,

    #[command(flatten)]
    pub(crate) card: CardArgs,

    /// Stored card token to charge instead of a card number.
    #[arg(long, conflicts_with = "number")]
    pub(crate) card_reference: Option<String>,

    /// Merchant invoice number.
    #[arg(long)]
    pub(crate) invoice: Option<String>,

    /// Free-form description.
    #[arg(long)]
    pub(crate) description: Option<String>,

    /// Customer code, for purchasing cards.
    #[arg(long)]
    pub(crate) customer_code: Option<String>,

    /// Also tokenize the card on approval.
    #[arg(long)]
    pub(crate) add_token: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CardArgs {
    /// Card number; spaces and dashes are ignored.
    #[arg(long = "card-number", id = "number", requires_all = ["exp_month", "exp_year"])]
    pub(crate) number: Option<String>,

    /// Expiry month, 1-12.
    #[arg(long)]
    pub(crate) exp_month: Option<u32>,

    /// Expiry year, two or four digits.
    #[arg(long)]
    pub(crate) exp_year: Option<i32>,

    /// Card verification value.
    #[arg(long)]
    pub(crate) cvv: Option<String>,

    /// Cardholder first and last name.
    #[arg(long, num_args = 2, value_names = ["FIRST", "LAST"])]
    pub(crate) name: Option<Vec<String>>,

    /// Billing street address.
    #[arg(long)]
    pub(crate) address: Option<String>,

    /// Billing postal code.
    #[arg(long)]
    pub(crate) postcode: Option<String>,
}

impl CardArgs {
    fn to_card(&self) -> Option<CreditCard> {
        let number = self.number.as_deref()?;
        let month = self.exp_month.unwrap_or_default();
        let year = self.exp_year.unwrap_or_default();
        let mut card = CreditCard::new(number, month, year);
        if let Some(cvv) = &self.cvv {
            card = card.with_cvv(cvv.clone());
        }
        if let Some([first, last]) = self.name.as_deref() {
            card = card.with_name(first.clone(), last.clone());
        }
        if let Some(address) = &self.address {
            card = card.with_address(address.clone(), None);
        }
        if let Some(postcode) = &self.postcode {
            card = card.with_postcode(postcode.clone());
        }
        Some(card)
    }
}

impl PaymentArgs {
    fn apply(&self, mut request: Request) -> Request {
        if let Some(card) = self.card.to_card() {
            request = request.with_card(card);
        }
        if let Some(reference) = &self.card_reference {
            request = request.with_card_reference(reference.clone());
        }
        if let Some(invoice) = &self.invoice {
            request = request.with_transaction_id(invoice.clone());
        }
        if let Some(description) = &self.description {
            request = request.with_description(description.clone());
        }
        if let Some(code) = &self.customer_code {
            request = request.with_customer_code(code.clone());
        }
        request.with_add_token(self.add_token)
    }
}

impl Command {
    /// Builds the gateway request for this subcommand.
    ///
    /// Field validation happens when the request is sent, so an incomplete
    /// card reports the same error the library would.
    pub(crate) fn to_request<T: Transport>(&self, gateway: &ConvergeGateway<T>) -> Request {
        match self {
            Self::Authorize(args) => args.apply(gateway.authorize(args.amount)),
            Self::Purchase(args) => args.apply(gateway.purchase(args.amount)),
            Self::Capture { transaction_reference, amount } => {
                let request = gateway.capture(transaction_reference.clone());
                match amount {
                    Some(amount) => request.with_amount(*amount),
                    None => request,
                }
            }
            Self::Refund { transaction_reference, amount } => {
                gateway.refund(transaction_reference.clone(), *amount)
            }
            Self::Void { transaction_reference } => gateway.void(transaction_reference.clone()),
            Self::CreateCard { card, customer_code } => {
                let mut request = gateway.request(Operation::CreateCard);
                if let Some(card) = card.to_card() {
                    request = request.with_card(card);
                }
                if let Some(code) = customer_code {
                    request = request.with_customer_code(code.clone());
                }
                request
            }
            Self::DeleteCard { card_reference } => gateway.delete_card(card_reference.clone()),
        }
    }
}
