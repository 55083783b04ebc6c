//! The `Campaign` is the per-tenant aggregate: it owns the accounts, the GM
//! list, the pending queue and the archive.

use std::collections::BTreeMap;
use std::mem;

use serde::{Deserialize, Serialize};

use crate::{
    Account, LedgerError, ResultLedger, Transaction,
    accounts::WORLD_NAME,
};

/// Names that can never be registered: the World sentinel and the `all`
/// selection keyword.
pub const RESERVED_NAMES: [&str; 2] = [WORLD_NAME, "all"];

/// Per-tenant ledger state.
///
/// `accounts` (keyed by unique name) and `owners` (owner id to name) stay
/// bijective; all mutation goes through the methods below. `pending` keeps
/// insertion order; displayed ids are 1-based positions within the
/// viewer-visible sublist, so the order is load-bearing. `archive` is
/// append-only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: u64,
    pub gms: Vec<u64>,
    accounts: BTreeMap<String, Account>,
    owners: BTreeMap<u64, String>,
    pending: Vec<Transaction>,
    archive: Vec<Transaction>,
}

impl Campaign {
    /// Creates the campaign for a tenant; the creator is the first GM.
    pub fn new(id: u64, gm: u64) -> Self {
        Self {
            id,
            gms: vec![gm],
            accounts: BTreeMap::new(),
            owners: BTreeMap::new(),
            pending: Vec::new(),
            archive: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_gm(&self, id: u64) -> bool {
        self.gms.contains(&id)
    }

    /// Adds a GM; already-listed ids are left alone.
    pub fn add_gm(&mut self, id: u64) {
        if !self.gms.contains(&id) {
            self.gms.push(id);
        }
    }

    /// Registers a new account with an empty purse.
    pub fn register(&mut self, id: u64, name: &str) -> ResultLedger<()> {
        if let Some(existing) = self.owners.get(&id) {
            return Err(LedgerError::ExistingOwner(existing.clone()));
        }
        if self.accounts.contains_key(name) {
            return Err(LedgerError::ExistingKey(name.to_string()));
        }
        if RESERVED_NAMES.contains(&name) {
            return Err(LedgerError::ReservedName(name.to_string()));
        }

        self.accounts
            .insert(name.to_string(), Account::new(id, name.to_string()));
        self.owners.insert(id, name.to_string());
        Ok(())
    }

    /// Renames an existing account, keeping its purse.
    pub fn reregister(&mut self, id: u64, name: &str) -> ResultLedger<()> {
        let Some(old_name) = self.owners.get(&id).cloned() else {
            return Err(LedgerError::KeyNotFound(id.to_string()));
        };
        if self.accounts.contains_key(name) {
            return Err(LedgerError::ExistingKey(name.to_string()));
        }
        if RESERVED_NAMES.contains(&name) {
            return Err(LedgerError::ReservedName(name.to_string()));
        }

        let mut account = self
            .accounts
            .remove(&old_name)
            .ok_or_else(|| LedgerError::KeyNotFound(old_name.clone()))?;
        account.name = name.to_string();
        self.accounts.insert(name.to_string(), account);
        self.owners.insert(id, name.to_string());
        Ok(())
    }

    #[must_use]
    pub fn account_by_name(&self, name: &str) -> Option<&Account> {
        self.accounts.get(name)
    }

    #[must_use]
    pub fn account_by_owner(&self, id: u64) -> Option<&Account> {
        self.owners.get(&id).and_then(|name| self.accounts.get(name))
    }

    pub fn account_by_owner_mut(&mut self, id: u64) -> Option<&mut Account> {
        let name = self.owners.get(&id)?;
        self.accounts.get_mut(name)
    }

    /// Accounts in name order.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    #[must_use]
    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    #[must_use]
    pub fn archive(&self) -> &[Transaction] {
        &self.archive
    }

    /// Queues a proposed transaction.
    pub fn propose(&mut self, transaction: Transaction) {
        self.pending.push(transaction);
    }

    /// A pending item is visible to its participant and to every GM; the
    /// initiator gets no special access, and a World-participant item is
    /// visible to GMs only.
    #[must_use]
    pub fn is_visible_to(&self, transaction: &Transaction, viewer: u64) -> bool {
        transaction.participant == Some(viewer) || self.is_gm(viewer)
    }

    /// The viewer-visible pending items with their global queue indices, in
    /// queue order.
    pub fn visible_pending(&self, viewer: u64) -> Vec<(usize, &Transaction)> {
        self.pending
            .iter()
            .enumerate()
            .filter(|(_, tx)| self.is_visible_to(tx, viewer))
            .collect()
    }

    /// Completes the transactions at the given **global** pending indices
    /// and moves them to the archive in ascending index order; the relative
    /// order of the remaining queue is unchanged.
    ///
    /// Indices must be valid and deduplicated (the selection resolver
    /// guarantees this before they reach the campaign).
    pub fn approve(&mut self, indices: &[usize]) -> ResultLedger<()> {
        let Campaign {
            pending,
            accounts,
            owners,
            ..
        } = self;

        for &index in indices {
            let transaction = pending
                .get_mut(index)
                .ok_or(LedgerError::InvalidIndex(index))?;

            let initiator_name = owners
                .get(&transaction.initiator)
                .ok_or_else(|| LedgerError::KeyNotFound(transaction.initiator.to_string()))?;
            let initiator = accounts
                .get_mut(initiator_name)
                .ok_or_else(|| LedgerError::KeyNotFound(initiator_name.clone()))?;

            let mirror = transaction.complete(&mut initiator.purse)?;

            if let Some(participant_id) = transaction.participant
                && let Some(name) = owners.get(&participant_id)
                && let Some(participant) = accounts.get_mut(name)
            {
                participant.purse.add_scaled(&mirror, 1);
            }
        }

        for (index, transaction) in mem::take(&mut self.pending).into_iter().enumerate() {
            if indices.contains(&index) {
                self.archive.push(transaction);
            } else {
                self.pending.push(transaction);
            }
        }

        Ok(())
    }

    /// Drops the transactions at the given global pending indices without
    /// completing or archiving them.
    pub fn deny(&mut self, indices: &[usize]) {
        for (index, transaction) in mem::take(&mut self.pending).into_iter().enumerate() {
            if !indices.contains(&index) {
                self.pending.push(transaction);
            }
        }
    }

    /// Renders a transaction with account ids resolved to current names.
    #[must_use]
    pub fn describe(&self, transaction: &Transaction) -> String {
        let initiator = self
            .owners
            .get(&transaction.initiator)
            .map(String::as_str)
            .unwrap_or("unknown");
        let participant = transaction
            .participant
            .and_then(|id| self.owners.get(&id))
            .map(String::as_str);

        transaction.describe(initiator, participant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Coin, Mode, Purse, TransactionState};

    fn campaign() -> Campaign {
        let mut campaign = Campaign::new(100, 1);
        campaign.register(1, "Alice").unwrap();
        campaign.register(2, "Bob").unwrap();
        campaign
    }

    fn gold(amount: i64) -> Purse {
        let mut purse = Purse::EMPTY;
        purse.add(Coin::Gold, amount);
        purse
    }

    #[test]
    fn creator_is_first_gm() {
        let campaign = Campaign::new(100, 1);
        assert!(campaign.is_gm(1));
        assert!(!campaign.is_gm(2));
    }

    #[test]
    fn register_rejects_taken_owner_and_name() {
        let mut campaign = campaign();
        assert_eq!(
            campaign.register(1, "Someone"),
            Err(LedgerError::ExistingOwner("Alice".to_string()))
        );
        assert_eq!(
            campaign.register(3, "Alice"),
            Err(LedgerError::ExistingKey("Alice".to_string()))
        );
    }

    #[test]
    fn register_rejects_reserved_names() {
        let mut campaign = campaign();
        assert_eq!(
            campaign.register(3, "World"),
            Err(LedgerError::ReservedName("World".to_string()))
        );
        assert_eq!(
            campaign.register(3, "all"),
            Err(LedgerError::ReservedName("all".to_string()))
        );
    }

    #[test]
    fn reregister_keeps_the_purse() {
        let mut campaign = campaign();
        campaign.account_by_owner_mut(1).unwrap().purse.gp = 12;

        campaign.reregister(1, "Alicia").unwrap();

        assert!(campaign.account_by_name("Alice").is_none());
        assert_eq!(campaign.account_by_name("Alicia").unwrap().purse.gp, 12);
        assert_eq!(campaign.account_by_owner(1).unwrap().name, "Alicia");
    }

    #[test]
    fn reregister_requires_registration() {
        let mut campaign = campaign();
        assert_eq!(
            campaign.reregister(9, "Ghost"),
            Err(LedgerError::KeyNotFound("9".to_string()))
        );
    }

    #[test]
    fn approve_moves_items_to_archive_in_index_order() {
        let mut campaign = campaign();
        for amount in [1, 2, 3, 4] {
            campaign.propose(Transaction::new(1, Mode::Give, gold(amount), Some(2), None));
        }

        campaign.approve(&[1, 3]).unwrap();

        assert_eq!(campaign.pending().len(), 2);
        assert_eq!(campaign.pending()[0].amounts.gp, 1);
        assert_eq!(campaign.pending()[1].amounts.gp, 3);
        assert_eq!(campaign.archive().len(), 2);
        assert_eq!(campaign.archive()[0].amounts.gp, 2);
        assert_eq!(campaign.archive()[1].amounts.gp, 4);
        assert!(
            campaign
                .archive()
                .iter()
                .all(|tx| tx.state == TransactionState::Applied)
        );
    }

    #[test]
    fn approve_conserves_tracked_balances() {
        let mut campaign = campaign();
        campaign.account_by_owner_mut(1).unwrap().purse = gold(50);
        campaign.account_by_owner_mut(2).unwrap().purse = gold(5);
        campaign.propose(Transaction::new(1, Mode::Give, gold(36), Some(2), None));

        campaign.approve(&[0]).unwrap();

        assert_eq!(campaign.account_by_name("Alice").unwrap().purse.gp, 14);
        assert_eq!(campaign.account_by_name("Bob").unwrap().purse.gp, 41);
    }

    #[test]
    fn approve_against_world_creates_or_destroys() {
        let mut campaign = campaign();
        campaign.propose(Transaction::new(1, Mode::Take, gold(7), None, None));

        campaign.approve(&[0]).unwrap();

        assert_eq!(campaign.account_by_name("Alice").unwrap().purse.gp, 7);
        assert_eq!(campaign.account_by_name("Bob").unwrap().purse.gp, 0);
    }

    #[test]
    fn deny_drops_without_archiving() {
        let mut campaign = campaign();
        for amount in [1, 2, 3] {
            campaign.propose(Transaction::new(1, Mode::Give, gold(amount), Some(2), None));
        }

        campaign.deny(&[0, 2]);

        assert_eq!(campaign.pending().len(), 1);
        assert_eq!(campaign.pending()[0].amounts.gp, 2);
        assert!(campaign.archive().is_empty());
        assert_eq!(campaign.account_by_name("Alice").unwrap().purse.gp, 0);
    }

    #[test]
    fn visibility_is_participant_or_gm() {
        let mut campaign = campaign();
        campaign.register(3, "Carol").unwrap();
        campaign.propose(Transaction::new(1, Mode::Give, gold(1), Some(2), None));
        campaign.propose(Transaction::new(1, Mode::Take, gold(2), None, None));

        // GM sees everything, the participant only their item, the
        // initiator nothing.
        assert_eq!(campaign.visible_pending(1).len(), 2);
        assert_eq!(campaign.visible_pending(2).len(), 1);
        assert!(campaign.visible_pending(3).is_empty());
    }

    #[test]
    fn describe_follows_renames() {
        let mut campaign = campaign();
        campaign.propose(Transaction::new(1, Mode::Give, gold(2), Some(2), None));

        campaign.reregister(2, "Robert").unwrap();

        let line = campaign.describe(&campaign.pending()[0]);
        assert_eq!(line, "Alice -> Robert: 2 GP (No reason given)");
    }
}
