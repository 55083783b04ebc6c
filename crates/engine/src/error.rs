//! The module contains the error the ledger core can throw.

use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LedgerError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("owner already registered as \"{0}\"")]
    ExistingOwner(String),
    #[error("\"{0}\" is a reserved name")]
    ReservedName(String),
    #[error("unknown coin unit: {0}")]
    UnknownUnit(String),
    #[error("invalid transaction mode: {0}")]
    InvalidMode(String),
    #[error("transaction already resolved")]
    AlreadyResolved,
    #[error("pending index {0} out of range")]
    InvalidIndex(usize),
}
