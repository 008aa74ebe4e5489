//! Per-village state decoded from a snapshot entry

use serde_json::{Number, Value};

use super::action::Action;
use super::json_kind;
use crate::error::{Error, Result};

/// Current stock of the three base resources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resources {
    pub wood: Number,
    pub stone: Number,
    pub iron: Number,
}

/// One pending construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildItem {
    pub building: String,
    pub level: String,
}

/// One pending recruitment batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TroopItem {
    pub unit: String,
    pub count: String,
}

/// Recruitment queue of one structure, e.g. the barracks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TroopQueue {
    pub building: String,
    pub items: Vec<TroopItem>,
}

/// Everything the monitor shows about one village
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VillageState {
    pub resources: Resources,
    pub last_action: Option<Action>,
    /// Front to back in execution order
    pub building_queue: Vec<BuildItem>,
    /// Structures in wire order; queues may be empty
    pub troop_queues: Vec<TroopQueue>,
}

impl VillageState {
    /// Validate one village entry.
    ///
    /// Resources are required; queues and the last action are optional and
    /// anything unexpected in them degrades to "empty" rather than failing.
    pub fn from_value(village_id: &str, value: &Value) -> Result<Self> {
        let entry = value.as_object().ok_or_else(|| {
            Error::malformed_village(village_id, format!("expected an object, got {}", json_kind(value)))
        })?;

        let actual = entry
            .get("Resources")
            .and_then(|r| r.get("Actual"))
            .ok_or_else(|| Error::malformed_village(village_id, "Resources.Actual is missing"))?;

        let amount = |name: &str| -> Result<Number> {
            match actual.get(name) {
                Some(Value::Number(n)) => Ok(n.clone()),
                _ => Err(Error::malformed_village(
                    village_id,
                    format!("Resources.Actual.{} is not a number", name),
                )),
            }
        };

        let resources = Resources {
            wood: amount("Wood")?,
            stone: amount("Stone")?,
            iron: amount("Iron")?,
        };

        let building_queue = match entry.get("BuildingQueue") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| BuildItem {
                    building: scalar_text(item.get("Building")),
                    level: scalar_text(item.get("Level")),
                })
                .collect(),
            _ => Vec::new(),
        };

        let troop_queues = match entry.get("TroopQueue") {
            Some(Value::Object(queues)) => queues
                .iter()
                .map(|(building, queue)| TroopQueue {
                    building: building.clone(),
                    items: queue
                        .as_array()
                        .map(|items| {
                            items
                                .iter()
                                .map(|item| TroopItem {
                                    unit: scalar_text(item.get("Unit")),
                                    count: scalar_text(item.get("Count")),
                                })
                                .collect()
                        })
                        .unwrap_or_default(),
                })
                .collect(),
            _ => Vec::new(),
        };

        Ok(Self {
            resources,
            last_action: Action::classify(entry.get("LastAction")),
            building_queue,
            troop_queues,
        })
    }
}

/// Render a leaf value as plain text; missing or null values print as "?"
pub fn scalar_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "?".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => number_text(n),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// 2^53 - 1, the largest integer an f64 holds exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Render a number the way the bot's web view does: a float with no
/// fractional part prints as an integer ("2.0" and "1e3" become "2" and
/// "1000"). Anything else keeps its JSON text.
pub fn number_text(n: &Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER {
                return (f as i64).to_string();
            }
        }
    }
    n.to_string()
}
