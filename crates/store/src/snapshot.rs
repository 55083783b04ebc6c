//! Snapshot encoding.
//!
//! One JSON record per tenant, fully overwritten on every save. Every record
//! carries a `version` tag; older versions are upgraded on load by an
//! explicit migration per version step, never by patching missing fields on
//! the fly.

use engine::Campaign;
use serde::Serialize;
use serde_json::Value;

use crate::StoreError;

pub(crate) const CURRENT_VERSION: &str = "2";

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: &'static str,
    campaign: &'a Campaign,
}

pub(crate) fn encode(campaign: &Campaign) -> Result<String, StoreError> {
    let snapshot = SnapshotRef {
        version: CURRENT_VERSION,
        campaign,
    };
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

pub(crate) fn decode(raw: &str) -> Result<Campaign, StoreError> {
    let mut value: Value = serde_json::from_str(raw)?;

    loop {
        let version = value
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(|| StoreError::Malformed("missing version tag".to_string()))?;

        match version {
            "1" => migrate_v1_to_v2(&mut value)?,
            CURRENT_VERSION => break,
            other => return Err(StoreError::UnsupportedVersion(other.to_string())),
        }
    }

    let campaign = value
        .get_mut("campaign")
        .ok_or_else(|| StoreError::Malformed("missing campaign record".to_string()))?
        .take();
    Ok(serde_json::from_value(campaign)?)
}

/// Version 1 records carried a single `gm` owner; version 2 holds a `gms`
/// list with the original GM as its first entry.
fn migrate_v1_to_v2(value: &mut Value) -> Result<(), StoreError> {
    let campaign = value
        .get_mut("campaign")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| StoreError::Malformed("missing campaign record".to_string()))?;

    let gm = campaign
        .remove("gm")
        .ok_or_else(|| StoreError::Malformed("version 1 record without gm".to_string()))?;
    campaign.insert("gms".to_string(), Value::Array(vec![gm]));

    value["version"] = Value::String("2".to_string());
    Ok(())
}
