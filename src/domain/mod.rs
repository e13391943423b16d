pub mod account;
pub mod client;
pub mod common;
pub mod location;
pub mod tax;
pub mod transaction;

pub use account::{CurrentAccount, CurrentAccountId};
pub use client::Client;
pub use common::{Amounted, Displayable, Identifiable, NamedEntity};
pub use location::OperationLocation;
pub use tax::{FlatFee, NoTax, RateTax, TaxPolicy, TaxSchedule};
pub use transaction::{
    Deposit, EnvelopeDeposit, Pendency, Transaction, TransactionKind, Transfer, Withdrawal,
};
