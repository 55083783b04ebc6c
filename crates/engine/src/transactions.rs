//! Transaction primitives.
//!
//! A `Transaction` is a proposed balance change between an initiator and an
//! optional tracked participant. It sits in a campaign's pending queue until
//! it is approved (applied and archived) or denied (dropped).

use serde::{Deserialize, Serialize};

use crate::{LedgerError, Purse, ResultLedger, accounts::WORLD_NAME};

/// Direction of a transaction, seen from the initiator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Give,
    Take,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Give => "give",
            Self::Take => "take",
        }
    }

    /// Sign applied to the initiator's purse: give subtracts, take adds.
    #[must_use]
    pub const fn initiator_sign(self) -> i64 {
        match self {
            Self::Give => -1,
            Self::Take => 1,
        }
    }

    const fn arrow(self) -> &'static str {
        match self {
            Self::Give => "->",
            Self::Take => "<-",
        }
    }
}

impl TryFrom<&str> for Mode {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "give" => Ok(Self::Give),
            "take" => Ok(Self::Take),
            other => Err(LedgerError::InvalidMode(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionState {
    #[default]
    Pending,
    Applied,
    Denied,
}

/// Accounts are referenced by owner id so that a rename between proposal and
/// approval never dangles; `participant == None` is the World sentinel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub initiator: u64,
    pub mode: Mode,
    pub amounts: Purse,
    pub participant: Option<u64>,
    pub reason: Option<String>,
    pub state: TransactionState,
}

impl Transaction {
    pub fn new(
        initiator: u64,
        mode: Mode,
        amounts: Purse,
        participant: Option<u64>,
        reason: Option<String>,
    ) -> Self {
        Self {
            initiator,
            mode,
            amounts,
            participant,
            reason,
            state: TransactionState::Pending,
        }
    }

    /// Applies the balance change to the initiator and marks the
    /// transaction applied. Resolving twice is an internal-consistency
    /// error: the campaign removes a transaction from the queue in the same
    /// pass that completes it.
    ///
    /// Returns the mirrored delta for the caller to apply to the tracked
    /// participant; for the World sentinel the delta is discarded and the
    /// money is created or destroyed.
    pub fn complete(&mut self, initiator: &mut Purse) -> ResultLedger<Purse> {
        if self.state != TransactionState::Pending {
            return Err(LedgerError::AlreadyResolved);
        }

        let sign = self.mode.initiator_sign();
        initiator.add_scaled(&self.amounts, sign);
        self.state = TransactionState::Applied;

        Ok(self.amounts.scaled(-sign))
    }

    /// One-line rendering: initiator, direction arrow, nonzero amounts,
    /// participant and reason.
    #[must_use]
    pub fn describe(&self, initiator_name: &str, participant_name: Option<&str>) -> String {
        let arrow = self.mode.arrow();
        let participant = participant_name.unwrap_or(WORLD_NAME);
        let amounts = self.amounts.describe_amounts();
        let reason = self.reason.as_deref().unwrap_or("No reason given");

        format!("{initiator_name} {arrow} {participant}: {amounts} ({reason})")
    }
}
