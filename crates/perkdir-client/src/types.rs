//! Wire shape of the public perk collection endpoint.
//!
//! The endpoint returns a JSON array of perk objects. Some deployments wrap
//! it as `{"perks": [...]}`; both are accepted.
//!
//! Each element is deserialized on its own. Field-level problems never fail
//! an element, since [`PerkRecord`] reads `title`, `merchant` and ids
//! leniently. An element that still fails to deserialize (in practice one
//! that is not a JSON object) is dropped, and its index and serde error are
//! logged at `warn`. The rest of the payload is kept.

use perkdir_core::PerkRecord;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ClientError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PerksPayload {
    List(Vec<Value>),
    Envelope { perks: Vec<Value> },
}

impl PerksPayload {
    fn into_values(self) -> Vec<Value> {
        match self {
            Self::List(values) | Self::Envelope { perks: values } => values,
        }
    }
}

/// Parses a response body into perk records.
///
/// # Errors
///
/// Returns [`ClientError::Deserialize`] when the body is not JSON, or is
/// neither an array nor a `{"perks": [...]}` envelope.
pub fn parse_perks_body(body: &str, context: &str) -> Result<Vec<PerkRecord>, ClientError> {
    let payload =
        serde_json::from_str::<PerksPayload>(body).map_err(|e| ClientError::Deserialize {
            context: context.to_owned(),
            source: e,
        })?;

    let values = payload.into_values();
    let total = values.len();
    let records: Vec<PerkRecord> = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| parse_entry(index, value, context))
        .collect();

    let dropped = total - records.len();
    if dropped > 0 {
        tracing::warn!(dropped, total, context, "dropped unparseable perk entries");
    }

    Ok(records)
}

fn parse_entry(index: usize, value: Value, context: &str) -> Option<PerkRecord> {
    match serde_json::from_value::<PerkRecord>(value) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(error = %e, index, context, "dropping unparseable perk entry");
            None
        }
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
