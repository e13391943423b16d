//! Runtime plumbing around the account aggregate.

pub mod shared_account;
pub mod utils;

pub use shared_account::SharedAccount;
