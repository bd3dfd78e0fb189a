//! Available contract of a chain position
//!
//! The available contract grows monotonically along a pipeline: each stage
//! adds its output contract, nothing is ever removed. Once a position is
//! incompatible the contract becomes [`AvailableContract::Invalid`] and every
//! later position inherits that marker.

use std::fmt;

use super::Contract;
use crate::error::Result;

/// Cumulative union of output contracts, or the invalid marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailableContract {
    /// Every field produced from the root up to this position
    Valid(Contract),
    /// Some position up to here was incompatible
    Invalid,
}

impl AvailableContract {
    /// Available contract at the start of a pipeline
    pub fn root(seed: Contract) -> Self {
        AvailableContract::Valid(seed)
    }

    /// Extend with a stage's output contract
    ///
    /// An invalid marker stays invalid; no union is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConflictingField`](crate::Error::ConflictingField)
    /// if `output` redefines an available field with another type.
    pub fn extend(&self, output: &Contract) -> Result<AvailableContract> {
        match self {
            AvailableContract::Valid(contract) => {
                Ok(AvailableContract::Valid(contract.union(output)?))
            }
            AvailableContract::Invalid => Ok(AvailableContract::Invalid),
        }
    }

    /// Whether `required` is satisfied; never true for the invalid marker
    pub fn satisfies(&self, required: &Contract) -> bool {
        match self {
            AvailableContract::Valid(contract) => required.is_compatible_with(contract),
            AvailableContract::Invalid => false,
        }
    }

    /// Whether this is a valid contract
    pub fn is_valid(&self) -> bool {
        matches!(self, AvailableContract::Valid(_))
    }

    /// The contract, if valid
    pub fn contract(&self) -> Option<&Contract> {
        match self {
            AvailableContract::Valid(contract) => Some(contract),
            AvailableContract::Invalid => None,
        }
    }
}

impl fmt::Display for AvailableContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvailableContract::Valid(contract) => write!(f, "{}", contract),
            AvailableContract::Invalid => write!(f, "<invalid>"),
        }
    }
}
