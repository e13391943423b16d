//! Immutable records of completed and pending monetary events.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::Money;
use crate::domain::account::CurrentAccountId;
use crate::domain::common::{Amounted, Displayable, Identifiable};
use crate::domain::location::OperationLocation;

/// Funds credited to an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Deposit {
    pub id: Uuid,
    pub location: OperationLocation,
    pub account: CurrentAccountId,
    pub amount: Money,
    pub date: DateTime<Utc>,
}

impl Deposit {
    pub fn new(location: OperationLocation, account: CurrentAccountId, amount: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            location,
            account,
            amount,
            date: Utc::now(),
        }
    }
}

/// Funds taken out of an account; `tax` is charged on top of `amount`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Withdrawal {
    pub id: Uuid,
    pub location: OperationLocation,
    pub account: CurrentAccountId,
    pub amount: Money,
    pub tax: Money,
    pub date: DateTime<Utc>,
}

impl Withdrawal {
    pub fn new(
        location: OperationLocation,
        account: CurrentAccountId,
        amount: Money,
        tax: Money,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            location,
            account,
            amount,
            tax,
            date: Utc::now(),
        }
    }

    /// `None` when the sum leaves the representable range.
    pub fn amount_plus_tax(&self) -> Option<Money> {
        self.amount.checked_add(self.tax)
    }
}

/// Movement between two accounts. The source pays `amount + tax`, the
/// destination receives `amount`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transfer {
    pub id: Uuid,
    pub location: OperationLocation,
    pub source: CurrentAccountId,
    pub destination: CurrentAccountId,
    pub amount: Money,
    pub tax: Money,
    pub date: DateTime<Utc>,
}

impl Transfer {
    pub fn new(
        location: OperationLocation,
        source: CurrentAccountId,
        destination: CurrentAccountId,
        amount: Money,
        tax: Money,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            location,
            source,
            destination,
            amount,
            tax,
            date: Utc::now(),
        }
    }

    pub fn amount_plus_tax(&self) -> Option<Money> {
        self.amount.checked_add(self.tax)
    }
}

/// Envelope dropped at a branch or ATM. The amount is the depositor's claim
/// and stays off the balance until the envelope is reconciled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnvelopeDeposit {
    pub id: Uuid,
    pub location: OperationLocation,
    pub account: CurrentAccountId,
    pub envelope: u64,
    pub amount: Money,
    pub date: DateTime<Utc>,
}

impl EnvelopeDeposit {
    pub fn new(
        location: OperationLocation,
        account: CurrentAccountId,
        envelope: u64,
        amount: Money,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            location,
            account,
            envelope,
            amount,
            date: Utc::now(),
        }
    }
}

/// Operation recorded on an account without a balance effect yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Pendency {
    Envelope(EnvelopeDeposit),
}

impl Pendency {
    pub fn id(&self) -> Uuid {
        match self {
            Pendency::Envelope(envelope) => envelope.id,
        }
    }

    pub fn amount(&self) -> Money {
        match self {
            Pendency::Envelope(envelope) => envelope.amount,
        }
    }

    pub fn location(&self) -> &OperationLocation {
        match self {
            Pendency::Envelope(envelope) => &envelope.location,
        }
    }

    pub fn date(&self) -> DateTime<Utc> {
        match self {
            Pendency::Envelope(envelope) => envelope.date,
        }
    }

    pub fn account(&self) -> CurrentAccountId {
        match self {
            Pendency::Envelope(envelope) => envelope.account,
        }
    }
}

impl From<EnvelopeDeposit> for Pendency {
    fn from(envelope: EnvelopeDeposit) -> Self {
        Pendency::Envelope(envelope)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Transfer,
    EnvelopeDeposit,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Withdrawal => "Withdrawal",
            TransactionKind::Transfer => "Transfer",
            TransactionKind::EnvelopeDeposit => "Envelope deposit",
        };
        f.write_str(label)
    }
}

/// Any record that can appear in an account's history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Transaction {
    Deposit(Deposit),
    Withdrawal(Withdrawal),
    Transfer(Transfer),
    Pending(Pendency),
}

impl Transaction {
    pub fn kind(&self) -> TransactionKind {
        match self {
            Transaction::Deposit(_) => TransactionKind::Deposit,
            Transaction::Withdrawal(_) => TransactionKind::Withdrawal,
            Transaction::Transfer(_) => TransactionKind::Transfer,
            Transaction::Pending(Pendency::Envelope(_)) => TransactionKind::EnvelopeDeposit,
        }
    }

    pub fn location(&self) -> &OperationLocation {
        match self {
            Transaction::Deposit(deposit) => &deposit.location,
            Transaction::Withdrawal(withdrawal) => &withdrawal.location,
            Transaction::Transfer(transfer) => &transfer.location,
            Transaction::Pending(pendency) => pendency.location(),
        }
    }

    pub fn date(&self) -> DateTime<Utc> {
        match self {
            Transaction::Deposit(deposit) => deposit.date,
            Transaction::Withdrawal(withdrawal) => withdrawal.date,
            Transaction::Transfer(transfer) => transfer.date,
            Transaction::Pending(pendency) => pendency.date(),
        }
    }

    /// Accounts touched by the record, source first for transfers.
    pub fn participants(&self) -> Vec<CurrentAccountId> {
        match self {
            Transaction::Deposit(deposit) => vec![deposit.account],
            Transaction::Withdrawal(withdrawal) => vec![withdrawal.account],
            Transaction::Transfer(transfer) => vec![transfer.source, transfer.destination],
            Transaction::Pending(pendency) => vec![pendency.account()],
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Transaction::Pending(_))
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> Uuid {
        match self {
            Transaction::Deposit(deposit) => deposit.id,
            Transaction::Withdrawal(withdrawal) => withdrawal.id,
            Transaction::Transfer(transfer) => transfer.id,
            Transaction::Pending(pendency) => pendency.id(),
        }
    }
}

impl Amounted for Transaction {
    fn amount(&self) -> Money {
        match self {
            Transaction::Deposit(deposit) => deposit.amount,
            Transaction::Withdrawal(withdrawal) => withdrawal.amount,
            Transaction::Transfer(transfer) => transfer.amount,
            Transaction::Pending(pendency) => pendency.amount(),
        }
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        format!("{} {} @ {}", self.kind(), self.amount(), self.location())
    }
}

impl From<Deposit> for Transaction {
    fn from(deposit: Deposit) -> Self {
        Transaction::Deposit(deposit)
    }
}

impl From<Withdrawal> for Transaction {
    fn from(withdrawal: Withdrawal) -> Self {
        Transaction::Withdrawal(withdrawal)
    }
}

impl From<Transfer> for Transaction {
    fn from(transfer: Transfer) -> Self {
        Transaction::Transfer(transfer)
    }
}

impl From<Pendency> for Transaction {
    fn from(pendency: Pendency) -> Self {
        Transaction::Pending(pendency)
    }
}
