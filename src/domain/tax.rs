//! Tax collaborators applied to withdrawals and transfers.

use std::fmt;

use crate::currency::Money;

const BASIS_POINTS_PER_UNIT: i128 = 10_000;

/// Computes the tax added on top of a base amount.
pub trait TaxPolicy: Send + Sync {
    fn tax(&self, amount: Money) -> Money;
}

impl<T: TaxPolicy + ?Sized> TaxPolicy for Box<T> {
    fn tax(&self, amount: Money) -> Money {
        (**self).tax(amount)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoTax;

impl TaxPolicy for NoTax {
    fn tax(&self, _amount: Money) -> Money {
        Money::zero()
    }
}

/// Fixed fee charged on any positive amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatFee(pub Money);

impl TaxPolicy for FlatFee {
    fn tax(&self, amount: Money) -> Money {
        if amount.is_positive() {
            self.0
        } else {
            Money::zero()
        }
    }
}

/// Proportional tax expressed in basis points (1 bp = 0.01%).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateTax {
    pub basis_points: u32,
}

impl RateTax {
    pub fn new(basis_points: u32) -> Self {
        Self { basis_points }
    }
}

impl TaxPolicy for RateTax {
    fn tax(&self, amount: Money) -> Money {
        if !amount.is_positive() {
            return Money::zero();
        }
        let scaled = amount.cents() as i128 * self.basis_points as i128;
        // half away from zero; amount is positive here
        let rounded = (scaled + BASIS_POINTS_PER_UNIT / 2) / BASIS_POINTS_PER_UNIT;
        // saturate so the account sees the overflow when adding the tax
        Money::from_cents(i64::try_from(rounded).unwrap_or(i64::MAX))
    }
}

/// Pair of policies the service layer hands to withdrawal and transfer calls.
pub struct TaxSchedule {
    pub withdrawal: Box<dyn TaxPolicy>,
    pub transfer: Box<dyn TaxPolicy>,
}

impl TaxSchedule {
    pub fn new(withdrawal: Box<dyn TaxPolicy>, transfer: Box<dyn TaxPolicy>) -> Self {
        Self {
            withdrawal,
            transfer,
        }
    }

    pub fn exempt() -> Self {
        Self::new(Box::new(NoTax), Box::new(NoTax))
    }
}

impl Default for TaxSchedule {
    fn default() -> Self {
        Self::exempt()
    }
}

impl fmt::Debug for TaxSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaxSchedule").finish_non_exhaustive()
    }
}
