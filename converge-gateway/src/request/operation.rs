//! Gateway operations and their field requirements.

use std::fmt;

use crate::fields::Field;

/// A field requirement checked before a request is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// The field must be present and non-empty.
    Field(Field),
    /// Card data must be present.
    Card,
    /// Either card data or a stored card reference must be present.
    CardOrReference,
}

impl Requirement {
    /// Logical name reported when the requirement is not met.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Field(field) => field.logical_name(),
            Self::Card | Self::CardOrReference => "card",
        }
    }
}

impl From<Field> for Requirement {
    fn from(field: Field) -> Self {
        Self::Field(field)
    }
}

/// Converge transaction types supported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Authorize an amount without capturing it.
    Authorize,
    /// Authorize and capture in one step.
    Purchase,
    /// Capture a prior authorization, optionally for a partial amount.
    Capture,
    /// Refund a settled transaction.
    Refund,
    /// Void an unsettled transaction.
    Void,
    /// Store a card and return a token.
    CreateCard,
    /// Delete a stored card token.
    DeleteCard,
}

impl Operation {
    /// Every operation.
    pub const ALL: [Self; 7] = [
        Self::Authorize,
        Self::Purchase,
        Self::Capture,
        Self::Refund,
        Self::Void,
        Self::CreateCard,
        Self::DeleteCard,
    ];

    /// Value of `ssl_transaction_type`.
    #[must_use]
    pub const fn transaction_type(self) -> &'static str {
        match self {
            Self::Authorize => "ccauthonly",
            Self::Purchase => "ccsale",
            Self::Capture => "cccomplete",
            Self::Refund => "ccreturn",
            Self::Void => "ccvoid",
            Self::CreateCard => "ccgettoken",
            Self::DeleteCard => "ccdeletetoken",
        }
    }

    /// Fields that must be set before the request can be serialized.
    #[must_use]
    pub const fn requirements(self) -> &'static [Requirement] {
        const REFERENCE: Requirement = Requirement::Field(Field::TransactionReference);
        const AMOUNT: Requirement = Requirement::Field(Field::Amount);

        match self {
            Self::Authorize | Self::Purchase => &[AMOUNT, Requirement::CardOrReference],
            Self::Capture | Self::Void => &[REFERENCE],
            Self::Refund => &[REFERENCE, AMOUNT],
            Self::CreateCard => &[Requirement::Card],
            Self::DeleteCard => &[Requirement::Field(Field::CardReference)],
        }
    }

    /// Short lowercase name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Authorize => "authorize",
            Self::Purchase => "purchase",
            Self::Capture => "capture",
            Self::Refund => "refund",
            Self::Void => "void",
            Self::CreateCard => "create_card",
            Self::DeleteCard => "delete_card",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_types() {
        let tags: Vec<_> = Operation::ALL.iter().map(|op| op.transaction_type()).collect();
        assert_eq!(
            tags,
            [
                "ccauthonly",
                "ccsale",
                "cccomplete",
                "ccreturn",
                "ccvoid",
                "ccgettoken",
                "ccdeletetoken"
            ]
        );
    }

    #[test]
    fn test_void_requires_reference_only() {
        assert_eq!(
            Operation::Void.requirements(),
            [Requirement::Field(Field::TransactionReference)]
        );
    }

    #[test]
    fn test_every_operation_has_requirements() {
        for op in Operation::ALL {
            assert!(!op.requirements().is_empty(), "{op} has no requirements");
        }
    }

    #[test]
    fn test_requirement_names() {
        assert_eq!(Requirement::from(Field::TransactionReference).name(), "transactionReference");
        assert_eq!(Requirement::Field(Field::Amount).name(), "amount");
        assert_eq!(Requirement::CardOrReference.name(), "card");
        assert_eq!(Requirement::Field(Field::CardReference).name(), "cardReference");
    }

    #[test]
    fn test_display() {
        assert_eq!(Operation::CreateCard.to_string(), "create_card");
    }
}
