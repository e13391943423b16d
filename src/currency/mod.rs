use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::errors::AccountError;

const MINOR_UNITS: u32 = 2;
const MINOR_PER_MAJOR: i64 = 100;

/// Monetary amount stored as signed minor units (cents).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Builds an amount from whole currency units, saturating at the `i64`
    /// bounds.
    pub const fn from_major(units: i64) -> Self {
        Self(units.saturating_mul(MINOR_PER_MAJOR))
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn checked_add(self, rhs: Money) -> Option<Money> {
        match self.0.checked_add(rhs.0) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    pub const fn checked_sub(self, rhs: Money) -> Option<Money> {
        match self.0.checked_sub(rhs.0) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Parses user input such as `50`, `50.5`, `-3,10` into an amount.
    ///
    /// Accepts an optional sign and at most two fractional digits separated by
    /// `.` or `,`.
    pub fn parse(input: &str) -> Result<Self, AccountError> {
        let invalid = || AccountError::InvalidAmountFormat(input.to_string());
        let trimmed = input.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (major_part, minor_part) = match body.find(['.', ',']) {
            Some(pos) => (&body[..pos], &body[pos + 1..]),
            None => (body, ""),
        };
        if major_part.is_empty()
            || !major_part.chars().all(|ch| ch.is_ascii_digit())
            || minor_part.len() > MINOR_UNITS as usize
            || !minor_part.chars().all(|ch| ch.is_ascii_digit())
        {
            return Err(invalid());
        }
        let major: i64 = major_part.parse().map_err(|_| invalid())?;
        let minor: i64 = match minor_part.len() {
            0 => 0,
            1 => minor_part.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => minor_part.parse().map_err(|_| invalid())?,
        };
        let cents = major
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|value| value.checked_add(minor))
            .ok_or_else(invalid)?;
        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per_major = MINOR_PER_MAJOR as u64;
        write!(f, "{}{}.{:02}", sign, abs / per_major, abs % per_major)
    }
}

// Operators keep plain `i64` overflow semantics. Balance changes go through
// `checked_add`/`checked_sub`.
impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

/// Locale-aware formatting preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocaleConfig {
    pub language_tag: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            language_tag: "en-US".into(),
            decimal_separator: '.',
            grouping_separator: ',',
        }
    }
}

pub fn symbol_for(code: &str) -> String {
    match code {
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        "BRL" => "R$".into(),
        _ => format!("{} ", code),
    }
}

/// Renders `amount` with currency symbol, digit grouping and locale separators.
pub fn format_money(amount: Money, currency: &str, locale: &LocaleConfig) -> String {
    let abs = amount.cents().unsigned_abs();
    let per_major = MINOR_PER_MAJOR as u64;
    let major = group_digits(&(abs / per_major).to_string(), locale.grouping_separator);
    let body = format!(
        "{}{}{:02}",
        major,
        locale.decimal_separator,
        abs % per_major
    );
    let sign = if amount.is_negative() { "-" } else { "" };
    format!("{}{}{}", sign, symbol_for(currency), body)
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}
