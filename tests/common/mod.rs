#![allow(dead_code)]

use bank_core::{
    currency::Money,
    domain::{Client, CurrentAccount, CurrentAccountId, OperationLocation},
};

/// Branch counter where the fixtures' operations originate.
pub fn branch() -> OperationLocation {
    OperationLocation::branch(1, "Centro")
}

pub fn atm() -> OperationLocation {
    OperationLocation::atm(7)
}

/// Opens an account on branch 1 with `balance` cents.
pub fn open_account(number: u64, balance: i64) -> CurrentAccount {
    CurrentAccount::with_initial_balance(
        CurrentAccountId::new(1, number),
        Client::new("Ana Souza").id,
        Money::from_cents(balance),
    )
}
