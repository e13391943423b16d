//! Thread-safe handle over a [`CurrentAccount`].
//!
//! Every operation holds the account lock for its whole check-then-act
//! sequence. Transfers lock both accounts in ascending [`CurrentAccountId`]
//! order so opposite transfers running at the same time cannot deadlock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::currency::Money;
use crate::domain::account::{CurrentAccount, CurrentAccountId};
use crate::domain::location::OperationLocation;
use crate::domain::tax::TaxPolicy;
use crate::domain::transaction::{
    Deposit, EnvelopeDeposit, Pendency, Transaction, Transfer, Withdrawal,
};
use crate::errors::AccountError;

#[derive(Debug, Clone)]
pub struct SharedAccount {
    id: CurrentAccountId,
    inner: Arc<Mutex<CurrentAccount>>,
}

impl SharedAccount {
    pub fn new(account: CurrentAccount) -> Self {
        Self {
            id: account.id(),
            inner: Arc::new(Mutex::new(account)),
        }
    }

    pub fn id(&self) -> CurrentAccountId {
        self.id
    }

    pub fn balance(&self) -> Money {
        self.lock().balance()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.lock().transactions()
    }

    /// Runs `read` against the account while holding its lock.
    pub fn with<R>(&self, read: impl FnOnce(&CurrentAccount) -> R) -> R {
        read(&*self.lock())
    }

    pub fn deposit(
        &self,
        location: OperationLocation,
        amount: Money,
    ) -> Result<Deposit, AccountError> {
        self.lock().deposit(location, amount)
    }

    pub fn deposit_with(
        &self,
        location: OperationLocation,
        amount: Money,
        record_in_history: bool,
    ) -> Result<Deposit, AccountError> {
        self.lock().deposit_with(location, amount, record_in_history)
    }

    pub fn deposit_envelope(
        &self,
        location: OperationLocation,
        envelope: u64,
        amount: Money,
    ) -> EnvelopeDeposit {
        self.lock().deposit_envelope(location, envelope, amount)
    }

    pub fn settle_pendency(
        &self,
        pendency_id: Uuid,
        location: OperationLocation,
        confirmed_amount: Money,
    ) -> Result<Deposit, AccountError> {
        self.lock()
            .settle_pendency(pendency_id, location, confirmed_amount)
    }

    pub fn cancel_pendency(&self, pendency_id: Uuid) -> Result<Pendency, AccountError> {
        self.lock().cancel_pendency(pendency_id)
    }

    pub fn withdrawal(
        &self,
        location: OperationLocation,
        amount: Money,
        tax: &dyn TaxPolicy,
    ) -> Result<Withdrawal, AccountError> {
        self.lock().withdrawal(location, amount, tax)
    }

    /// Transfers from this account to `destination` with both locks held.
    pub fn transfer(
        &self,
        location: OperationLocation,
        destination: &SharedAccount,
        amount: Money,
        tax: &dyn TaxPolicy,
    ) -> Result<Transfer, AccountError> {
        if self.id == destination.id || Arc::ptr_eq(&self.inner, &destination.inner) {
            tracing::warn!(account = %self.id, "rejected transfer to same account");
            return Err(AccountError::SameAccount(self.id));
        }

        let (mut source, mut target) = if self.id < destination.id {
            let source = self.lock();
            let target = destination.lock();
            (source, target)
        } else {
            let target = destination.lock();
            let source = self.lock();
            (source, target)
        };
        source.transfer(location, &mut target, amount, tax)
    }

    fn lock(&self) -> MutexGuard<'_, CurrentAccount> {
        // operations validate before mutating, so a panicked holder leaves a
        // consistent account behind
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<CurrentAccount> for SharedAccount {
    fn from(account: CurrentAccount) -> Self {
        Self::new(account)
    }
}
