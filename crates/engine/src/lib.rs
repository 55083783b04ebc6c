//! Domain core of the party-treasury ledger: coin units, purses, accounts,
//! transactions and the per-tenant campaign aggregate.

pub use accounts::{Account, WORLD_NAME};
pub use campaign::{Campaign, RESERVED_NAMES};
pub use coins::Coin;
pub use error::LedgerError;
pub use purse::Purse;
pub use transactions::{Mode, Transaction, TransactionState};

mod accounts;
mod campaign;
mod coins;
mod error;
mod purse;
mod transactions;

type ResultLedger<T> = Result<T, LedgerError>;
