//! Display model: a pure function of one snapshot

use std::fmt;

use serde::Serialize;

use crate::error::Error;
use crate::snapshot::{number_text, Action, BuildItem, Snapshot, TroopQueue, VillageState};

/// Everything shown for one snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayModel {
    pub villages: Vec<VillageSection>,
    /// Entries left out because they did not have the expected shape
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedVillage>,
}

/// Text lines for one village
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VillageSection {
    pub id: String,
    pub last_action: String,
    pub resources: String,
    pub building_queue: String,
    pub troop_queue: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedVillage {
    pub id: String,
    pub reason: String,
}

impl DisplayModel {
    /// Build the model for a snapshot. A snapshot without a village mapping
    /// yields an empty model.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut model = Self::default();

        let Some(villages) = snapshot.villages() else {
            return model;
        };

        for (id, state) in villages {
            match state {
                Ok(state) => model.villages.push(VillageSection::new(id, &state)),
                Err(Error::MalformedVillage { reason, .. }) => model.skipped.push(SkippedVillage {
                    id: id.to_string(),
                    reason,
                }),
                Err(e) => model.skipped.push(SkippedVillage {
                    id: id.to_string(),
                    reason: e.to_string(),
                }),
            }
        }

        model
    }

    pub fn is_empty(&self) -> bool {
        self.villages.is_empty() && self.skipped.is_empty()
    }
}

impl VillageSection {
    pub fn new(id: &str, state: &VillageState) -> Self {
        let r = &state.resources;
        Self {
            id: id.to_string(),
            last_action: Action::describe(state.last_action.as_ref()),
            resources: format!(
                "Wood: {}, Stone: {}, Iron: {}",
                number_text(&r.wood),
                number_text(&r.stone),
                number_text(&r.iron)
            ),
            building_queue: building_queue_text(&state.building_queue),
            troop_queue: troop_queue_text(&state.troop_queues),
        }
    }
}

/// "Farm (2), Barracks (1)" or "Empty"
pub fn building_queue_text(queue: &[BuildItem]) -> String {
    if queue.is_empty() {
        return "Empty".to_string();
    }

    queue
        .iter()
        .map(|item| format!("{} ({})", item.building, item.level))
        .collect::<Vec<_>>()
        .join(", ")
}

/// "Barracks: Spear (5), Axe (2) Stable: Scout (1)" or "Empty".
/// Structures with nothing queued are left out.
pub fn troop_queue_text(queues: &[TroopQueue]) -> String {
    let segments: Vec<String> = queues
        .iter()
        .filter(|queue| !queue.items.is_empty())
        .map(|queue| {
            let items = queue
                .items
                .iter()
                .map(|item| format!("{} ({})", item.unit, item.count))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}: {}", queue.building, items)
        })
        .collect();

    if segments.is_empty() {
        "Empty".to_string()
    } else {
        segments.join(" ")
    }
}

impl fmt::Display for VillageSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Village {}", self.id)?;
        writeln!(f, "  Last Action: {}", self.last_action)?;
        writeln!(f, "  Resources: {}", self.resources)?;
        writeln!(f, "  Building Queue: {}", self.building_queue)?;
        writeln!(f, "  Troop Queue: {}", self.troop_queue)
    }
}

impl fmt::Display for DisplayModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, section) in self.villages.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", section)?;
        }

        if !self.skipped.is_empty() {
            writeln!(f)?;
            for skipped in &self.skipped {
                writeln!(f, "Village {} could not be displayed: {}", skipped.id, skipped.reason)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model(value: serde_json::Value) -> DisplayModel {
        DisplayModel::from_snapshot(&Snapshot::from_value(value))
    }

    fn resources() -> serde_json::Value {
        json!({"Actual": {"Wood": 100, "Stone": 200, "Iron": 300}})
    }

    #[test]
    fn test_absent_villages_render_empty() {
        assert!(model(json!({})).is_empty());
        assert!(model(json!({"Villages": null})).is_empty());
        assert_eq!(model(json!({})).to_string(), "");
    }

    #[test]
    fn test_section_lines() {
        let m = model(json!({"Villages": {"101": {
            "Resources": resources(),
            "LastAction": {"Unit": "Spear", "Amount": 20},
            "BuildingQueue": [{"Building": "Farm", "Level": 2}, {"Building": "Barracks", "Level": 1}],
            "TroopQueue": {"Barracks": [{"Unit": "Spear", "Count": 5}], "Stable": []}
        }}}));

        let section = &m.villages[0];
        assert_eq!(section.id, "101");
        assert_eq!(section.last_action, "Recruit 20 Spear");
        assert_eq!(section.resources, "Wood: 100, Stone: 200, Iron: 300");
        assert_eq!(section.building_queue, "Farm (2), Barracks (1)");
        assert_eq!(section.troop_queue, "Barracks: Spear (5)");
    }

    #[test]
    fn test_whole_float_amounts_and_levels() {
        let snapshot = Snapshot::from_json(
            r#"{"Villages": {"8": {
                "Resources": {"Actual": {"Wood": 1e3, "Stone": 2.0, "Iron": 3}},
                "LastAction": {"Building": "Farm", "Level": 3.0},
                "BuildingQueue": [{"Building": "Farm", "Level": 4.0}],
                "TroopQueue": {"Barracks": [{"Unit": "Axe", "Count": 5.0}]}
            }}}"#,
        )
        .unwrap();
        let m = DisplayModel::from_snapshot(&snapshot);

        let section = &m.villages[0];
        assert_eq!(section.resources, "Wood: 1000, Stone: 2, Iron: 3");
        assert_eq!(section.last_action, "Build Farm (3)");
        assert_eq!(section.building_queue, "Farm (4)");
        assert_eq!(section.troop_queue, "Barracks: Axe (5)");
    }

    #[test]
    fn test_empty_queues() {
        let m = model(json!({"Villages": {
            "1": {"Resources": resources()},
            "2": {"Resources": resources(), "BuildingQueue": [], "TroopQueue": {"Barracks": [], "Stable": []}}
        }}));

        for section in &m.villages {
            assert_eq!(section.last_action, "None");
            assert_eq!(section.building_queue, "Empty");
            assert_eq!(section.troop_queue, "Empty");
        }
    }

    #[test]
    fn test_multiple_troop_segments_joined_by_space() {
        let m = model(json!({"Villages": {"7": {
            "Resources": resources(),
            "TroopQueue": {
                "Barracks": [{"Unit": "Spear", "Count": 5}, {"Unit": "Axe", "Count": 2}],
                "Garage": [],
                "Stable": [{"Unit": "Scout", "Count": 1}]
            }
        }}}));

        assert_eq!(m.villages[0].troop_queue, "Barracks: Spear (5), Axe (2) Stable: Scout (1)");
    }

    #[test]
    fn test_malformed_village_skipped() {
        let m = model(json!({"Villages": {
            "1": {"Resources": resources()},
            "2": {"BuildingQueue": []},
            "3": {"Resources": resources()}
        }}));

        let ids: Vec<&str> = m.villages.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(m.skipped.len(), 1);
        assert_eq!(m.skipped[0].id, "2");
        assert_eq!(m.skipped[0].reason, "Resources.Actual is missing");
        assert!(m.to_string().contains("Village 2 could not be displayed"));
    }

    #[test]
    fn test_text_rendering() {
        let m = model(json!({"Villages": {"101": {
            "Resources": resources(),
            "LastAction": {"Target": {"ID": 7}}
        }}}));

        assert_eq!(
            m.to_string(),
            "Village 101\n  Last Action: Farm 7\n  Resources: Wood: 100, Stone: 200, Iron: 300\n  Building Queue: Empty\n  Troop Queue: Empty\n"
        );
    }

    #[test]
    fn test_json_model_omits_empty_skipped() {
        let m = model(json!({"Villages": {"1": {"Resources": resources()}}}));
        let value = serde_json::to_value(&m).unwrap();
        assert!(value.get("skipped").is_none());
        assert_eq!(value["villages"][0]["building_queue"], "Empty");
    }
}
