use std::io;

use thiserror::Error;
use uuid::Uuid;

use crate::currency::Money;
use crate::domain::account::CurrentAccountId;

/// Error type that captures the ways an account operation can be refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(Money),
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Money, available: Money },
    #[error("Pendency not found: {0}")]
    PendencyNotFound(Uuid),
    #[error("Cannot transfer from account {0} to itself")]
    SameAccount(CurrentAccountId),
    #[error("Invalid amount format: `{0}`")]
    InvalidAmountFormat(String),
    #[error("Amount out of range: {0}")]
    AmountOverflow(Money),
}

impl AccountError {
    /// Message-catalog key the presentation layer translates for the user.
    pub fn message_key(&self) -> &'static str {
        match self {
            AccountError::InvalidAmount(_) | AccountError::InvalidAmountFormat(_) => {
                "exception.invalid.amount"
            }
            AccountError::InsufficientBalance { .. } => "exception.insufficient.balance",
            AccountError::PendencyNotFound(_) => "exception.pendency.not.found",
            AccountError::SameAccount(_) => "exception.same.account",
            AccountError::AmountOverflow(_) => "exception.amount.out.of.range",
        }
    }
}

/// Failures raised while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
