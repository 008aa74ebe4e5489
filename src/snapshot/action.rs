//! Last-action classification
//!
//! The bot reports a village's last action as an untagged object. The kind
//! is decided by which fields are populated, checked in a fixed order:
//! `Building`, then `Unit` + `Amount`, then `Unit` + `Level`, then `Target`.

use std::fmt;

use serde_json::Value;

use super::village::scalar_text;

/// The most recent task a village performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Build { building: String, level: String },
    Recruit { unit: String, amount: String },
    Research { unit: String, level: String },
    Farm { target: String },
    Unknown,
}

impl Action {
    /// Classify a `LastAction` value. `None` means no action was reported,
    /// which is distinct from an action of unknown kind.
    pub fn classify(value: Option<&Value>) -> Option<Action> {
        let value = value.filter(|v| is_populated(v))?;

        let field = |name: &str| value.get(name).filter(|v| is_populated(v));

        let action = if let Some(building) = field("Building") {
            Action::Build {
                building: scalar_text(Some(building)),
                level: scalar_text(value.get("Level")),
            }
        } else if let (Some(unit), Some(amount)) = (field("Unit"), field("Amount")) {
            Action::Recruit {
                unit: scalar_text(Some(unit)),
                amount: scalar_text(Some(amount)),
            }
        } else if let (Some(unit), Some(level)) = (field("Unit"), field("Level")) {
            Action::Research {
                unit: scalar_text(Some(unit)),
                level: scalar_text(Some(level)),
            }
        } else if let Some(target) = field("Target") {
            Action::Farm {
                target: scalar_text(target.get("ID")),
            }
        } else {
            Action::Unknown
        };

        Some(action)
    }

    /// Display text for an optional action, "None" when absent
    pub fn describe(action: Option<&Action>) -> String {
        action.map_or_else(|| "None".to_string(), Action::to_string)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Build { building, level } => write!(f, "Build {} ({})", building, level),
            Action::Recruit { unit, amount } => write!(f, "Recruit {} {}", amount, unit),
            Action::Research { unit, level } => write!(f, "Research {} ({})", unit, level),
            Action::Farm { target } => write!(f, "Farm {}", target),
            Action::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Whether a field counts as set: not null, false, zero or an empty string
pub fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
