#![doc(test(attr(deny(warnings))))]

//! Bank Core models a retail current (checking) account: balance tracking,
//! deposits, withdrawals, transfers and envelope deposits awaiting
//! confirmation.
//!
//! ```
//! use bank_core::currency::Money;
//! use bank_core::domain::{CurrentAccount, CurrentAccountId, NoTax, OperationLocation};
//! use uuid::Uuid;
//!
//! let mut account = CurrentAccount::with_initial_balance(
//!     CurrentAccountId::new(1, 42),
//!     Uuid::new_v4(),
//!     Money::from_major(100),
//! );
//! account
//!     .withdrawal(OperationLocation::atm(3), Money::from_major(30), &NoTax)
//!     .unwrap();
//! assert_eq!(account.balance(), Money::from_major(70));
//! ```

pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod utils;

pub use crate::core::SharedAccount;
pub use currency::Money;
pub use domain::{CurrentAccount, CurrentAccountId};
pub use errors::{AccountError, ConfigError};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Bank Core tracing initialized.");
    });
}
