//! One handler per command verb. Every handler returns the single reply
//! line for the user; failures bubble up as [`CommandError`] and are
//! rendered by the dispatcher.
//!
//! Write commands hold the tenant's write lock from validation through the
//! final save, so a failed validation releases the lock on the error path
//! without persisting anything.

use engine::{Campaign, Mode, Transaction};
use store::Store;

use crate::{CommandError, parser, selection};

pub(crate) async fn initialize(
    store: &Store,
    tenant: u64,
    caller: u64,
) -> Result<String, CommandError> {
    tracing::info!(tenant, "initializing new campaign");
    store.create(Campaign::new(tenant, caller)).await?;
    Ok("New campaign initialized. Register players with `register`.".to_string())
}

pub(crate) async fn register(
    store: &Store,
    tenant: u64,
    caller: u64,
    rest: &str,
) -> Result<String, CommandError> {
    let mut guard = store.write(tenant).await?;
    let (id, name) = registration_target(&guard, caller, rest)?;

    guard.register(id, &name)?;
    guard.save().await?;

    tracing::info!(tenant, %name, "player registered");
    Ok(format!("Successfully registered {name}."))
}

pub(crate) async fn reregister(
    store: &Store,
    tenant: u64,
    caller: u64,
    rest: &str,
) -> Result<String, CommandError> {
    let mut guard = store.write(tenant).await?;
    let (id, name) = registration_target(&guard, caller, rest)?;

    guard.reregister(id, &name)?;
    guard.save().await?;

    tracing::info!(tenant, %name, "player reregistered");
    Ok(format!("Successfully reregistered as {name}."))
}

/// `(id) as name`; only a GM may supply the id of another user.
fn registration_target(
    campaign: &Campaign,
    caller: u64,
    rest: &str,
) -> Result<(u64, String), CommandError> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    match tokens.as_slice() {
        ["as", name] => Ok((caller, (*name).to_string())),
        [id, "as", name] => {
            if !campaign.is_gm(caller) {
                return Err(CommandError::IdOverride);
            }
            let id = id.parse().map_err(|_| CommandError::Syntax)?;
            Ok((id, (*name).to_string()))
        }
        _ => Err(CommandError::Syntax),
    }
}

pub(crate) async fn convert(
    store: &Store,
    tenant: u64,
    caller: u64,
    rest: &str,
) -> Result<String, CommandError> {
    let args = parser::parse_convert(rest)?;

    let mut guard = store.write(tenant).await?;
    let initiator = resolve_initiator(&guard, caller, args.initiator.as_deref())?;

    // Conversions skip the approval queue: the signed delta is applied to
    // the initiator on the spot and leaves no archive record.
    let mut transaction =
        Transaction::new(initiator, Mode::Take, args.delta, None, Some("conversion".to_string()));
    let account = guard
        .account_by_owner_mut(initiator)
        .ok_or(CommandError::Unregistered)?;
    transaction.complete(&mut account.purse)?;
    guard.save().await?;

    tracing::info!(tenant, initiator, "currency converted");
    Ok("Successfully converted currency.".to_string())
}

pub(crate) async fn transact(
    store: &Store,
    tenant: u64,
    caller: u64,
    rest: &str,
) -> Result<String, CommandError> {
    let args = parser::parse_transact(rest)?;

    let mut guard = store.write(tenant).await?;
    let initiator = resolve_initiator(&guard, caller, args.initiator.as_deref())?;
    let participant = match args.participant {
        Some(name) => Some(
            guard
                .account_by_name(&name)
                .and_then(|account| account.id)
                .ok_or(CommandError::UnknownPlayer(name))?,
        ),
        None => None,
    };

    let amounts = match args.offset {
        Some(percent) => args.amounts.with_offset(percent),
        None => args.amounts,
    };

    guard.propose(Transaction::new(
        initiator,
        args.mode,
        amounts,
        participant,
        args.reason,
    ));
    guard.save().await?;

    tracing::info!(tenant, initiator, "transaction queued");
    Ok("Transaction recorded; waiting for approval.".to_string())
}

/// Resolves the acting account: the caller's own, or a named account when a
/// GM uses `as`.
fn resolve_initiator(
    campaign: &Campaign,
    caller: u64,
    name: Option<&str>,
) -> Result<u64, CommandError> {
    match name {
        Some(name) => {
            if !campaign.is_gm(caller) {
                return Err(CommandError::Unauthorized("as"));
            }
            campaign
                .account_by_name(name)
                .and_then(|account| account.id)
                .ok_or_else(|| CommandError::UnknownPlayer(name.to_string()))
        }
        None => campaign
            .account_by_owner(caller)
            .and_then(|account| account.id)
            .ok_or(CommandError::Unregistered),
    }
}

pub(crate) async fn pending(
    store: &Store,
    tenant: u64,
    caller: u64,
) -> Result<String, CommandError> {
    let campaign = store.read(tenant).await?;

    let visible = campaign.visible_pending(caller);
    if visible.is_empty() {
        return Ok("You have no pending transactions.".to_string());
    }

    let mut reply = String::from("Pending transactions:");
    for (position, (_, transaction)) in visible.iter().enumerate() {
        reply.push_str(&format!(
            "\n{}: `{}`",
            position + 1,
            campaign.describe(transaction)
        ));
    }
    Ok(reply)
}

pub(crate) async fn approve(
    store: &Store,
    tenant: u64,
    caller: u64,
    rest: &str,
) -> Result<String, CommandError> {
    if rest.trim().is_empty() {
        return Err(CommandError::Syntax);
    }

    let mut guard = store.write(tenant).await?;
    let indices = selection::resolve(&guard, caller, rest)?;
    if indices.is_empty() {
        return Err(CommandError::EmptySelection);
    }

    guard.approve(&indices)?;
    guard.save().await?;

    tracing::info!(tenant, count = indices.len(), "transactions approved");
    Ok("Transaction(s) successfully approved.".to_string())
}

pub(crate) async fn deny(
    store: &Store,
    tenant: u64,
    caller: u64,
    rest: &str,
) -> Result<String, CommandError> {
    if rest.trim().is_empty() {
        return Err(CommandError::Syntax);
    }

    let mut guard = store.write(tenant).await?;
    let indices = selection::resolve(&guard, caller, rest)?;
    if indices.is_empty() {
        return Err(CommandError::EmptySelection);
    }

    guard.deny(&indices);
    guard.save().await?;

    tracing::info!(tenant, count = indices.len(), "transactions denied");
    Ok("Transaction(s) denied.".to_string())
}

pub(crate) async fn balance(
    store: &Store,
    tenant: u64,
    caller: u64,
    rest: &str,
) -> Result<String, CommandError> {
    let campaign = store.read(tenant).await?;

    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let target = match tokens.as_slice() {
        [] => campaign
            .account_by_owner(caller)
            .map(|account| account.name.clone())
            .ok_or(CommandError::Unregistered)?,
        ["of", target] => {
            if !campaign.is_gm(caller) {
                return Err(CommandError::Unauthorized("of"));
            }
            (*target).to_string()
        }
        _ => return Err(CommandError::Syntax),
    };

    let body = if target == "all" {
        campaign
            .accounts()
            .map(|account| format!("`{}: {}`", account.name, account.balance()))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        let account = campaign
            .account_by_name(&target)
            .ok_or_else(|| CommandError::UnknownPlayer(target.clone()))?;
        format!("`{}`", account.balance())
    };

    Ok(format!("Account balance for {target}:\n{body}"))
}

pub(crate) async fn delete(
    store: &Store,
    tenant: u64,
    caller: u64,
    rest: &str,
) -> Result<String, CommandError> {
    let campaign = store.read(tenant).await?;
    if !campaign.is_gm(caller) {
        return Err(CommandError::DeleteUnauthorized);
    }

    // Deletion is irreversible, so it must be confirmed by retyping the
    // tenant id.
    let rest = rest.trim();
    if rest.is_empty() {
        return Ok(format!(
            "Warning: campaign deletion is permanent and irreversible. \
             All players, balances and transactions will be wiped.\n\n\
             If you are sure you want to do this, retype this command as \
             `delete {}` to delete it.",
            campaign.id
        ));
    }

    let confirmation: u64 = rest
        .parse()
        .map_err(|_| CommandError::DeleteConfirmation(campaign.id))?;
    if confirmation != campaign.id {
        return Err(CommandError::DeleteConfirmation(campaign.id));
    }

    store.delete(tenant).await?;
    Ok("Campaign has been deleted.".to_string())
}
