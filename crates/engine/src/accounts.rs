use serde::{Deserialize, Serialize};

use crate::Purse;

/// Name of the untracked counterparty standing in for NPCs and the world at
/// large. Money given to or taken from it is effectively created or
/// destroyed, which is why the participant of a transaction is optional.
pub const WORLD_NAME: &str = "World";

/// A named account inside a campaign.
///
/// Identity is the `(id, name)` pair: the owner id is the stable chat-user
/// identity, the name is unique within the campaign and may change through
/// reregistration. The World sentinel is the only account without an id and
/// is never stored in a campaign.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Option<u64>,
    pub name: String,
    pub purse: Purse,
}

impl Account {
    pub fn new(id: u64, name: String) -> Self {
        Self {
            id: Some(id),
            name,
            purse: Purse::EMPTY,
        }
    }

    pub fn world() -> Self {
        Self {
            id: None,
            name: WORLD_NAME.to_string(),
            purse: Purse::EMPTY,
        }
    }

    /// Balance line: coin counts followed by the reference-unit total,
    /// e.g. `[0 CP | 5 SP | 24 GP | 0 PP] (24.50 EGP)`.
    #[must_use]
    pub fn balance(&self) -> String {
        format!("{} ({})", self.purse, self.purse.egp_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_starts_empty() {
        let account = Account::new(7, "Alice".to_string());
        assert_eq!(account.id, Some(7));
        assert!(account.purse.is_empty());
    }

    #[test]
    fn balance_line_shows_coins_and_egp() {
        let mut account = Account::new(7, "Alice".to_string());
        account.purse.gp = 24;
        account.purse.sp = 5;
        assert_eq!(account.balance(), "[0 CP | 5 SP | 24 GP | 0 PP] (24.50 EGP)");
    }

    #[test]
    fn world_has_no_id() {
        let world = Account::world();
        assert_eq!(world.id, None);
        assert_eq!(world.name, WORLD_NAME);
    }
}
