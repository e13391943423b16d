//! Where an operation was originated. Recorded for audit only.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OperationLocation {
    Branch { number: u64, name: String },
    Atm { number: u64 },
}

impl OperationLocation {
    pub fn branch(number: u64, name: impl Into<String>) -> Self {
        OperationLocation::Branch {
            number,
            name: name.into(),
        }
    }

    pub fn atm(number: u64) -> Self {
        OperationLocation::Atm { number }
    }

    pub fn number(&self) -> u64 {
        match self {
            OperationLocation::Branch { number, .. } | OperationLocation::Atm { number } => *number,
        }
    }
}

impl fmt::Display for OperationLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationLocation::Branch { number, name } => write!(f, "Branch {} ({})", number, name),
            OperationLocation::Atm { number } => write!(f, "ATM {}", number),
        }
    }
}
