//! Snapshot documents pushed by the bot
//!
//! A snapshot is a JSON object whose `Villages` member maps village ids to
//! village state. The payload is kept loosely typed and each village entry
//! is validated on its own, so one bad entry never hides the others.

mod action;
mod village;

pub use action::*;
pub use village::*;

use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};

/// One decoded state document. Each inbound message yields a fresh value.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    root: Value,
}

impl Snapshot {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map(Self::from_value)
            .map_err(|source| Error::Decode { source })
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map(Self::from_value)
            .map_err(|source| Error::Decode { source })
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Village entries in display order, or `None` when the document
    /// carries no village mapping at all.
    ///
    /// Ids that are canonical array indices come first in ascending numeric
    /// order; every other id follows in the order it arrived.
    pub fn villages(&self) -> Option<impl Iterator<Item = (&str, Result<VillageState>)> + '_> {
        let villages = match self.root.get("Villages") {
            None | Some(Value::Null) => return None,
            Some(Value::Object(map)) => map,
            Some(other) => {
                warn!(kind = json_kind(other), "Villages member is not an object, ignoring");
                return None;
            }
        };

        let mut entries: Vec<(&String, &Value)> = villages.iter().collect();
        // Stable sort keeps arrival order among the non-index ids
        entries.sort_by_key(|(id, _)| match array_index(id) {
            Some(index) => (0, index),
            None => (1, 0),
        });

        Some(
            entries
                .into_iter()
                .map(|(id, entry)| (id.as_str(), VillageState::from_value(id, entry))),
        )
    }
}

/// Largest value a key may hold and still count as an array index
const MAX_ARRAY_INDEX: u64 = u32::MAX as u64 - 1;

/// Numeric value of `key` when it is written as a canonical array index:
/// ASCII digits only, no leading zero unless it is "0", at most 2^32 - 2.
fn array_index(key: &str) -> Option<u64> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }

    key.parse::<u64>().ok().filter(|&n| n <= MAX_ARRAY_INDEX)
}

/// Short name of a JSON value's type, for diagnostics
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
