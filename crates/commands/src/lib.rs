//! Command layer: turns one line of user text into exactly one reply.
//!
//! The chat transport is an external collaborator: whatever event loop
//! receives a message resolves the tenant and caller ids and hands the line
//! to [`dispatch`]. No failure escapes the dispatch boundary, so one bad
//! command never takes the process down for other tenants.

pub use error::CommandError;
pub use parser::{ConvertArgs, TransactArgs, parse_convert, parse_transact};

mod error;
mod handlers;
mod parser;
mod selection;

use store::Store;

/// Runs one command line against a tenant's campaign and returns the reply.
///
/// The verb is the first whitespace-separated token; the remainder is the
/// verb's argument text. Unknown verbs and internal failures are reported
/// with a generic reply and logged with the offending input.
pub async fn dispatch(store: &Store, tenant: u64, caller: u64, line: &str) -> String {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

    let result = match verb {
        "initialize" => handlers::initialize(store, tenant, caller).await,
        "register" => handlers::register(store, tenant, caller, rest).await,
        "reregister" => handlers::reregister(store, tenant, caller, rest).await,
        "convert" => handlers::convert(store, tenant, caller, rest).await,
        "transact" => handlers::transact(store, tenant, caller, rest).await,
        "pending" => handlers::pending(store, tenant, caller).await,
        "approve" => handlers::approve(store, tenant, caller, rest).await,
        "deny" => handlers::deny(store, tenant, caller, rest).await,
        "balance" => handlers::balance(store, tenant, caller, rest).await,
        "delete" => handlers::delete(store, tenant, caller, rest).await,
        _ => Err(CommandError::Unknown),
    };

    match result {
        Ok(reply) => reply,
        Err(err) => {
            match &err {
                CommandError::Store(source) => {
                    tracing::error!(tenant, input = line, error = %source, "command failed");
                }
                CommandError::Ledger(source) => {
                    tracing::error!(tenant, input = line, error = %source, "command failed");
                }
                _ => tracing::info!(tenant, input = line, reply = %err, "command rejected"),
            }
            err.to_string()
        }
    }
}
