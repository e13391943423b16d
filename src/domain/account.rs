//! Current account aggregate: the only place a balance changes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::Money;
use crate::domain::location::OperationLocation;
use crate::domain::tax::TaxPolicy;
use crate::domain::transaction::{
    Deposit, EnvelopeDeposit, Pendency, Transaction, Transfer, Withdrawal,
};
use crate::errors::AccountError;

/// Branch and account number pair. Ordering is branch first, then number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CurrentAccountId {
    pub branch: u64,
    pub number: u64,
}

impl CurrentAccountId {
    pub const fn new(branch: u64, number: u64) -> Self {
        Self { branch, number }
    }
}

impl fmt::Display for CurrentAccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:06}", self.branch, self.number)
    }
}

/// Checking account owning its balance, its three histories and the list of
/// operations still waiting for settlement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentAccount {
    id: CurrentAccountId,
    owner: Uuid,
    balance: Money,
    #[serde(default)]
    deposits: Vec<Deposit>,
    #[serde(default)]
    withdrawals: Vec<Withdrawal>,
    #[serde(default)]
    transfers: Vec<Transfer>,
    #[serde(default)]
    pendencies: Vec<Pendency>,
}

impl CurrentAccount {
    /// Opens an account with a zero balance.
    pub fn new(id: CurrentAccountId, owner: Uuid) -> Self {
        Self::with_initial_balance(id, owner, Money::zero())
    }

    pub fn with_initial_balance(id: CurrentAccountId, owner: Uuid, balance: Money) -> Self {
        Self {
            id,
            owner,
            balance,
            deposits: Vec::new(),
            withdrawals: Vec::new(),
            transfers: Vec::new(),
            pendencies: Vec::new(),
        }
    }

    pub fn id(&self) -> CurrentAccountId {
        self.id
    }

    pub fn owner(&self) -> Uuid {
        self.owner
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn deposits(&self) -> &[Deposit] {
        &self.deposits
    }

    pub fn withdrawals(&self) -> &[Withdrawal] {
        &self.withdrawals
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn pendencies(&self) -> &[Pendency] {
        &self.pendencies
    }

    /// Credits `amount` and records the deposit.
    pub fn deposit(
        &mut self,
        location: OperationLocation,
        amount: Money,
    ) -> Result<Deposit, AccountError> {
        self.deposit_with(location, amount, true)
    }

    /// Credits `amount`; the record is appended to the deposit history only
    /// when `record_in_history` is set. The record is returned either way.
    pub fn deposit_with(
        &mut self,
        location: OperationLocation,
        amount: Money,
        record_in_history: bool,
    ) -> Result<Deposit, AccountError> {
        self.ensure_valid_amount(amount)?;
        let balance = self.balance_after_credit(amount)?;
        let deposit = Deposit::new(location, self.id, amount);
        self.balance = balance;
        if record_in_history {
            self.deposits.push(deposit.clone());
        }
        tracing::info!(account = %self.id, %amount, recorded = record_in_history, "deposit");
        Ok(deposit)
    }

    /// Records an envelope deposit as pending. The claimed amount is not
    /// validated and the balance is left untouched.
    pub fn deposit_envelope(
        &mut self,
        location: OperationLocation,
        envelope: u64,
        amount: Money,
    ) -> EnvelopeDeposit {
        let deposit = EnvelopeDeposit::new(location, self.id, envelope, amount);
        self.pendencies.push(Pendency::Envelope(deposit.clone()));
        tracing::info!(account = %self.id, envelope, %amount, "envelope deposit pending");
        deposit
    }

    /// Settles a pending envelope with the amount actually found in it.
    ///
    /// The pendency leaves the pending list and a recorded deposit of
    /// `confirmed_amount` is made. Nothing changes on failure.
    pub fn settle_pendency(
        &mut self,
        pendency_id: Uuid,
        location: OperationLocation,
        confirmed_amount: Money,
    ) -> Result<Deposit, AccountError> {
        let index = self.pendency_index(pendency_id)?;
        self.ensure_valid_amount(confirmed_amount)?;
        self.balance_after_credit(confirmed_amount)?;
        let pendency = self.pendencies.remove(index);
        if pendency.amount() != confirmed_amount {
            tracing::warn!(
                account = %self.id,
                claimed = %pendency.amount(),
                confirmed = %confirmed_amount,
                "envelope amount differs from claim"
            );
        }
        self.deposit(location, confirmed_amount)
    }

    /// Drops a pending operation without touching the balance.
    pub fn cancel_pendency(&mut self, pendency_id: Uuid) -> Result<Pendency, AccountError> {
        let index = self.pendency_index(pendency_id)?;
        let pendency = self.pendencies.remove(index);
        tracing::info!(account = %self.id, pendency = %pendency_id, "pendency cancelled");
        Ok(pendency)
    }

    /// Debits `amount` plus its tax and records the withdrawal.
    pub fn withdrawal(
        &mut self,
        location: OperationLocation,
        amount: Money,
        tax: &dyn TaxPolicy,
    ) -> Result<Withdrawal, AccountError> {
        let tax = tax.tax(amount);
        self.ensure_valid_amount(amount)?;
        let amount_plus_tax = self.tax_inclusive(amount, tax)?;
        self.ensure_can_debit(amount_plus_tax)?;
        let balance = self.balance_after_debit(amount_plus_tax)?;

        let withdrawal = Withdrawal::new(location, self.id, amount, tax);
        self.balance = balance;
        self.withdrawals.push(withdrawal.clone());
        tracing::info!(
            account = %self.id,
            amount = %withdrawal.amount,
            tax = %withdrawal.tax,
            "withdrawal"
        );
        Ok(withdrawal)
    }

    /// Moves `amount` to `destination`, charging the tax to this account.
    ///
    /// All checks, including the destination credit staying in range, run
    /// before either balance changes. The
    /// destination credit skips validation and is not added to its deposits;
    /// the transfer record is appended to both transfer histories.
    pub fn transfer(
        &mut self,
        location: OperationLocation,
        destination: &mut CurrentAccount,
        amount: Money,
        tax: &dyn TaxPolicy,
    ) -> Result<Transfer, AccountError> {
        let tax = tax.tax(amount);
        self.ensure_valid_amount(amount)?;
        let amount_plus_tax = self.tax_inclusive(amount, tax)?;
        self.ensure_can_debit(amount_plus_tax)?;
        let source_balance = self.balance_after_debit(amount_plus_tax)?;
        let destination_balance = destination.balance_after_credit(amount)?;

        let transfer = Transfer::new(location, self.id, destination.id, amount, tax);
        self.balance = source_balance;
        destination.balance = destination_balance;
        self.transfers.push(transfer.clone());
        destination.transfers.push(transfer.clone());
        tracing::info!(
            source = %self.id,
            destination = %destination.id,
            amount = %transfer.amount,
            tax = %transfer.tax,
            "transfer"
        );
        Ok(transfer)
    }

    /// Snapshot of every record: deposits, withdrawals, transfers, then
    /// pendencies, each in insertion order.
    pub fn transactions(&self) -> Vec<Transaction> {
        let mut transactions = Vec::with_capacity(
            self.deposits.len()
                + self.withdrawals.len()
                + self.transfers.len()
                + self.pendencies.len(),
        );
        transactions.extend(self.deposits.iter().cloned().map(Transaction::Deposit));
        transactions.extend(self.withdrawals.iter().cloned().map(Transaction::Withdrawal));
        transactions.extend(self.transfers.iter().cloned().map(Transaction::Transfer));
        transactions.extend(self.pendencies.iter().cloned().map(Transaction::Pending));
        transactions
    }

    /// Records dated within `[from, to]`, oldest first.
    pub fn statement(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<Transaction> {
        let mut statement: Vec<Transaction> = self
            .transactions()
            .into_iter()
            .filter(|txn| txn.date() >= from && txn.date() <= to)
            .collect();
        statement.sort_by_key(Transaction::date);
        statement
    }

    fn pendency_index(&self, pendency_id: Uuid) -> Result<usize, AccountError> {
        self.pendencies
            .iter()
            .position(|pendency| pendency.id() == pendency_id)
            .ok_or_else(|| {
                tracing::warn!(account = %self.id, pendency = %pendency_id, "pendency not found");
                AccountError::PendencyNotFound(pendency_id)
            })
    }

    fn ensure_valid_amount(&self, amount: Money) -> Result<(), AccountError> {
        if is_valid_amount(amount) {
            Ok(())
        } else {
            tracing::warn!(account = %self.id, %amount, "rejected invalid amount");
            Err(AccountError::InvalidAmount(amount))
        }
    }

    fn ensure_can_debit(&self, amount_plus_tax: Money) -> Result<(), AccountError> {
        self.ensure_valid_amount(amount_plus_tax)?;
        if self.has_enough_balance(amount_plus_tax) {
            Ok(())
        } else {
            tracing::warn!(
                account = %self.id,
                requested = %amount_plus_tax,
                available = %self.balance,
                "rejected for insufficient balance"
            );
            Err(AccountError::InsufficientBalance {
                requested: amount_plus_tax,
                available: self.balance,
            })
        }
    }

    fn has_enough_balance(&self, amount: Money) -> bool {
        amount <= self.balance
    }

    fn tax_inclusive(&self, amount: Money, tax: Money) -> Result<Money, AccountError> {
        amount
            .checked_add(tax)
            .ok_or_else(|| self.out_of_range(amount))
    }

    /// Balance a credit of `amount` would leave.
    fn balance_after_credit(&self, amount: Money) -> Result<Money, AccountError> {
        self.balance
            .checked_add(amount)
            .ok_or_else(|| self.out_of_range(amount))
    }

    /// Balance a debit of `amount` would leave.
    fn balance_after_debit(&self, amount: Money) -> Result<Money, AccountError> {
        self.balance
            .checked_sub(amount)
            .ok_or_else(|| self.out_of_range(amount))
    }

    fn out_of_range(&self, amount: Money) -> AccountError {
        tracing::warn!(account = %self.id, %amount, "rejected amount out of range");
        AccountError::AmountOverflow(amount)
    }
}

fn is_valid_amount(amount: Money) -> bool {
    amount.is_positive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tax::{FlatFee, NoTax, RateTax};

    fn location() -> OperationLocation {
        OperationLocation::branch(1, "Centro")
    }

    fn account(number: u64, balance: i64) -> CurrentAccount {
        CurrentAccount::with_initial_balance(
            CurrentAccountId::new(1, number),
            Uuid::new_v4(),
            Money::from_cents(balance),
        )
    }

    #[test]
    fn id_display_is_zero_padded() {
        assert_eq!(CurrentAccountId::new(12, 345).to_string(), "0012/000345");
    }

    #[test]
    fn ids_order_by_branch_then_number() {
        assert!(CurrentAccountId::new(1, 900) < CurrentAccountId::new(2, 1));
        assert!(CurrentAccountId::new(2, 1) < CurrentAccountId::new(2, 2));
    }

    #[test]
    fn deposit_without_recording_still_credits() {
        let mut acc = account(1, 0);
        let deposit = acc
            .deposit_with(location(), Money::from_cents(500), false)
            .unwrap();
        assert_eq!(deposit.amount, Money::from_cents(500));
        assert_eq!(acc.balance(), Money::from_cents(500));
        assert!(acc.deposits().is_empty());
    }

    #[test]
    fn withdrawal_debits_tax_inclusive_amount() {
        let mut acc = account(1, 10_000);
        let withdrawal = acc
            .withdrawal(location(), Money::from_cents(5_000), &RateTax::new(100))
            .unwrap();
        assert_eq!(withdrawal.tax, Money::from_cents(50));
        assert_eq!(acc.balance(), Money::from_cents(4_950));
        assert_eq!(acc.withdrawals(), &[withdrawal]);
    }

    #[test]
    fn tax_can_make_withdrawal_insufficient() {
        let mut acc = account(1, 1_000);
        let err = acc
            .withdrawal(location(), Money::from_cents(1_000), &FlatFee(Money::from_cents(1)))
            .unwrap_err();
        assert_eq!(
            err,
            AccountError::InsufficientBalance {
                requested: Money::from_cents(1_001),
                available: Money::from_cents(1_000),
            }
        );
        assert_eq!(acc.balance(), Money::from_cents(1_000));
        assert!(acc.withdrawals().is_empty());
    }

    #[test]
    fn invalid_amount_is_checked_before_balance() {
        let mut acc = account(1, 0);
        let err = acc
            .withdrawal(location(), Money::from_cents(-10), &NoTax)
            .unwrap_err();
        assert_eq!(err, AccountError::InvalidAmount(Money::from_cents(-10)));
    }

    #[test]
    fn negative_base_amount_is_rejected_even_when_tax_makes_it_positive() {
        let mut source = account(1, 10_000);
        let mut destination = account(2, 0);
        let err = source
            .transfer(
                location(),
                &mut destination,
                Money::from_cents(-100),
                &FlatFee(Money::from_cents(500)),
            )
            .unwrap_err();
        assert!(matches!(err, AccountError::InvalidAmount(_)));
        assert_eq!(source.balance(), Money::from_cents(10_000));
        assert_eq!(destination.balance(), Money::zero());
    }

    #[test]
    fn transfer_credits_destination_without_deposit_record() {
        let mut source = account(1, 10_000);
        let mut destination = account(2, 0);
        let transfer = source
            .transfer(location(), &mut destination, Money::from_cents(2_000), &NoTax)
            .unwrap();
        assert_eq!(destination.balance(), Money::from_cents(2_000));
        assert!(destination.deposits().is_empty());
        assert_eq!(source.transfers(), destination.transfers());
        assert_eq!(source.transfers()[0], transfer);
    }

    #[test]
    fn deposit_past_the_balance_limit_is_refused() {
        let mut acc = account(1, i64::MAX - 10);
        let err = acc
            .deposit(location(), Money::from_cents(100))
            .unwrap_err();
        assert_eq!(err, AccountError::AmountOverflow(Money::from_cents(100)));
        assert_eq!(acc.balance(), Money::from_cents(i64::MAX - 10));
        assert!(acc.deposits().is_empty());
    }

    #[test]
    fn withdrawal_whose_tax_overflows_is_refused() {
        let mut acc = account(1, i64::MAX);
        let err = acc
            .withdrawal(
                location(),
                Money::from_cents(i64::MAX),
                &FlatFee(Money::from_cents(1)),
            )
            .unwrap_err();
        assert_eq!(err, AccountError::AmountOverflow(Money::from_cents(i64::MAX)));
        assert_eq!(acc.balance(), Money::from_cents(i64::MAX));
        assert!(acc.withdrawals().is_empty());
    }

    #[test]
    fn transfer_whose_tax_overflows_is_refused() {
        let mut source = account(1, i64::MAX);
        let mut destination = account(2, 0);
        let err = source
            .transfer(
                location(),
                &mut destination,
                Money::from_cents(i64::MAX),
                &FlatFee(Money::from_cents(1)),
            )
            .unwrap_err();
        assert_eq!(err, AccountError::AmountOverflow(Money::from_cents(i64::MAX)));
        assert_eq!(source.balance(), Money::from_cents(i64::MAX));
        assert!(source.transfers().is_empty());
        assert!(destination.transfers().is_empty());
    }

    #[test]
    fn transfer_into_a_full_account_touches_neither_side() {
        let mut source = account(1, 1_000);
        let mut destination = account(2, i64::MAX);
        let err = source
            .transfer(location(), &mut destination, Money::from_cents(500), &NoTax)
            .unwrap_err();
        assert_eq!(err, AccountError::AmountOverflow(Money::from_cents(500)));
        assert_eq!(source.balance(), Money::from_cents(1_000));
        assert_eq!(destination.balance(), Money::from_cents(i64::MAX));
        assert!(source.transfers().is_empty());
    }

    #[test]
    fn huge_rate_tax_is_refused_not_truncated() {
        let mut acc = account(1, i64::MAX);
        let err = acc
            .withdrawal(location(), Money::from_cents(i64::MAX / 2), &RateTax::new(u32::MAX))
            .unwrap_err();
        assert!(matches!(err, AccountError::AmountOverflow(_)), "{err:?}");
        assert_eq!(acc.balance(), Money::from_cents(i64::MAX));
    }

    #[test]
    fn overflowing_settlement_keeps_the_envelope_pending() {
        let mut acc = account(1, i64::MAX - 10);
        let envelope = acc.deposit_envelope(location(), 7, Money::from_cents(100));
        let err = acc
            .settle_pendency(envelope.id, location(), Money::from_cents(100))
            .unwrap_err();
        assert_eq!(err, AccountError::AmountOverflow(Money::from_cents(100)));
        assert_eq!(acc.pendencies().len(), 1);
        assert_eq!(acc.balance(), Money::from_cents(i64::MAX - 10));
    }

    #[test]
    fn cancel_pendency_leaves_balance() {
        let mut acc = account(1, 300);
        let envelope = acc.deposit_envelope(location(), 11, Money::from_cents(900));
        let cancelled = acc.cancel_pendency(envelope.id).unwrap();
        assert_eq!(cancelled, Pendency::Envelope(envelope));
        assert!(acc.pendencies().is_empty());
        assert_eq!(acc.balance(), Money::from_cents(300));
    }

    #[test]
    fn statement_filters_by_date() {
        let mut acc = account(1, 0);
        let before = Utc::now();
        acc.deposit(location(), Money::from_cents(100)).unwrap();
        acc.deposit_envelope(location(), 3, Money::from_cents(5));
        let after = Utc::now();

        let statement = acc.statement(before, after);
        assert_eq!(statement.len(), 2);
        assert!(statement[0].date() <= statement[1].date());

        let past = before - chrono::Duration::days(1);
        assert!(acc.statement(past, past).is_empty());
    }
}
