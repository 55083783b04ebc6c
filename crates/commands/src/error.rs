use engine::LedgerError;
use store::StoreError;
use thiserror::Error;

/// Command failures, one variant per user-visible outcome.
///
/// The `Display` string of a variant is the exact reply sent back to the
/// user, so handlers simply propagate with `?` and the dispatcher renders
/// whatever bubbles up. `Store`/`Ledger` wrap unexpected internal failures
/// behind a generic reply; the source is logged at the dispatch boundary.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error(":x: Invalid syntax. Use `help [command]` to view info.")]
    Syntax,
    #[error("You are not authorized to use \"{0}\".")]
    Unauthorized(&'static str),
    #[error("Only a GM may supply a user id.")]
    IdOverride,
    #[error("Only the GM can delete campaigns.")]
    DeleteUnauthorized,
    #[error("No campaign exists in this channel.")]
    NoCampaign,
    #[error("Campaign already exists in this channel.")]
    CampaignExists,
    #[error("You are not registered in this campaign.")]
    Unregistered,
    #[error("You are already registered as {0}.")]
    AlreadyRegistered(String),
    #[error("That name is already taken.")]
    NameTaken,
    #[error("That name is a reserved keyword.")]
    ReservedName,
    #[error("No player with name \"{0}\" exists in this campaign.")]
    UnknownPlayer(String),
    #[error("\"{0}\" is an invalid ID.")]
    InvalidId(String),
    #[error("Start ID must be lower than end ID in \"{0}\".")]
    UnorderedRange(String),
    #[error("Cannot convert {0}.")]
    Conversion(String),
    #[error("Invalid indices or no pending transactions.")]
    EmptySelection,
    #[error("Use your channel id `{0}`.")]
    DeleteConfirmation(u64),
    #[error("Error processing command. Use `help` to view help.")]
    Unknown,
    #[error("Error processing command. Use `help` to view help.")]
    Store(#[source] StoreError),
    #[error("Error processing command. Use `help` to view help.")]
    Ledger(#[source] LedgerError),
}

impl From<StoreError> for CommandError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => CommandError::NoCampaign,
            StoreError::Exists(_) => CommandError::CampaignExists,
            err => CommandError::Store(err),
        }
    }
}

impl From<LedgerError> for CommandError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::ExistingOwner(name) => CommandError::AlreadyRegistered(name),
            LedgerError::ExistingKey(_) => CommandError::NameTaken,
            LedgerError::ReservedName(_) => CommandError::ReservedName,
            LedgerError::KeyNotFound(_) => CommandError::Unregistered,
            err => CommandError::Ledger(err),
        }
    }
}
