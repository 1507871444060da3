//! Reference entities a request points at: equipment, work centers, teams
//! and categories.
//!
//! Requests hold lookup keys, never owned copies. The referenced rows can be
//! edited or deleted independently, so every lookup has to tolerate a miss.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::maintenance_request::Target;

/// Label shown for a key that no longer resolves.
pub const NOT_FOUND_LABEL: &str = "Not found";

/// Label shown when no reference is set.
pub const UNSET_LABEL: &str = "N/A";

/// Kinds of reference entity offered in pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Equipment,
    WorkCenter,
    Team,
    Category,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Equipment => "equipment",
            ReferenceKind::WorkCenter => "work_center",
            ReferenceKind::Team => "team",
            ReferenceKind::Category => "category",
        }
    }

    /// Backing table name.
    pub fn table(&self) -> &'static str {
        match self {
            ReferenceKind::Equipment => "equipment",
            ReferenceKind::WorkCenter => "work_centers",
            ReferenceKind::Team => "maintenance_teams",
            ReferenceKind::Category => "equipment_categories",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReferenceKind {
    type Err = String;

    /// Accepts singular snake case and the plural path segments used by the API.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "equipment" => Ok(ReferenceKind::Equipment),
            "work_center" | "work-centers" | "work_centers" => Ok(ReferenceKind::WorkCenter),
            "team" | "teams" => Ok(ReferenceKind::Team),
            "category" | "categories" => Ok(ReferenceKind::Category),
            other => Err(format!(
                "Invalid reference kind: {}. Must be one of: equipment, work-centers, teams, categories",
                other
            )),
        }
    }
}

/// Picker row for any reference kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReferenceEntity {
    pub id: Uuid,
    pub name: String,
}

/// Equipment with the defaults it hands down to new requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Equipment {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub serial_number: Option<String>,
    pub category_id: Option<Uuid>,
    pub maintenance_team_id: Option<Uuid>,
}

impl Equipment {
    /// Picker label, with the serial number appended when present.
    pub fn label(&self) -> String {
        match &self.serial_number {
            Some(serial) if !serial.is_empty() => format!("{} ({})", self.name, serial),
            _ => self.name.clone(),
        }
    }

    /// Picker row showing [`Equipment::label`].
    pub fn picker_row(&self) -> ReferenceEntity {
        ReferenceEntity {
            id: self.id,
            name: self.label(),
        }
    }
}

impl From<&Equipment> for ReferenceEntity {
    fn from(equipment: &Equipment) -> Self {
        Self {
            id: equipment.id,
            name: equipment.name.clone(),
        }
    }
}

/// All picker rows loaded for one owner, used to resolve request keys to names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ReferenceDirectory {
    pub equipment: Vec<ReferenceEntity>,
    pub work_centers: Vec<ReferenceEntity>,
    pub teams: Vec<ReferenceEntity>,
    pub categories: Vec<ReferenceEntity>,
}

impl ReferenceDirectory {
    pub fn entities(&self, kind: ReferenceKind) -> &[ReferenceEntity] {
        match kind {
            ReferenceKind::Equipment => &self.equipment,
            ReferenceKind::WorkCenter => &self.work_centers,
            ReferenceKind::Team => &self.teams,
            ReferenceKind::Category => &self.categories,
        }
    }

    pub fn set_entities(&mut self, kind: ReferenceKind, entities: Vec<ReferenceEntity>) {
        match kind {
            ReferenceKind::Equipment => self.equipment = entities,
            ReferenceKind::WorkCenter => self.work_centers = entities,
            ReferenceKind::Team => self.teams = entities,
            ReferenceKind::Category => self.categories = entities,
        }
    }

    pub fn find(&self, kind: ReferenceKind, id: Uuid) -> Option<&ReferenceEntity> {
        self.entities(kind).iter().find(|entity| entity.id == id)
    }

    /// Name for an optional key: unset keys read `N/A`, dangling keys read `Not found`.
    pub fn display_name(&self, kind: ReferenceKind, id: Option<Uuid>) -> &str {
        match id {
            None => UNSET_LABEL,
            Some(id) => self
                .find(kind, id)
                .map(|entity| entity.name.as_str())
                .unwrap_or(NOT_FOUND_LABEL),
        }
    }

    /// Name of a request's target.
    pub fn target_name(&self, target: &Target) -> &str {
        let kind = match target {
            Target::Equipment(_) => ReferenceKind::Equipment,
            Target::WorkCenter(_) => ReferenceKind::WorkCenter,
        };
        self.display_name(kind, Some(target.id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(name: &str) -> ReferenceEntity {
        ReferenceEntity {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_reference_kind_from_path_segment() {
        assert_eq!("work-centers".parse::<ReferenceKind>(), Ok(ReferenceKind::WorkCenter));
        assert_eq!("teams".parse::<ReferenceKind>(), Ok(ReferenceKind::Team));
        assert_eq!("category".parse::<ReferenceKind>(), Ok(ReferenceKind::Category));
        assert_eq!("equipment".parse::<ReferenceKind>(), Ok(ReferenceKind::Equipment));
        assert!("vehicles".parse::<ReferenceKind>().is_err());
    }

    #[test]
    fn test_equipment_label() {
        let mut equipment = Equipment {
            id: Uuid::new_v4(),
            owner_id: Uuid::nil(),
            name: "Pump-1".to_string(),
            serial_number: Some("SN-42".to_string()),
            category_id: None,
            maintenance_team_id: None,
        };
        assert_eq!(equipment.label(), "Pump-1 (SN-42)");
        equipment.serial_number = Some(String::new());
        assert_eq!(equipment.label(), "Pump-1");
    }

    #[test]
    fn test_directory_resolves_names() {
        let pump = entity("Pump-1");
        let line = entity("Assembly line");
        let mut directory = ReferenceDirectory::default();
        directory.set_entities(ReferenceKind::Equipment, vec![pump.clone()]);
        directory.set_entities(ReferenceKind::WorkCenter, vec![line.clone()]);

        assert_eq!(directory.target_name(&Target::Equipment(pump.id)), "Pump-1");
        assert_eq!(
            directory.target_name(&Target::WorkCenter(line.id)),
            "Assembly line"
        );
    }

    #[test]
    fn test_directory_degrades_on_dangling_keys() {
        let directory = ReferenceDirectory::default();
        assert_eq!(
            directory.target_name(&Target::Equipment(Uuid::new_v4())),
            NOT_FOUND_LABEL
        );
        assert_eq!(
            directory.display_name(ReferenceKind::Team, Some(Uuid::new_v4())),
            NOT_FOUND_LABEL
        );
        assert_eq!(directory.display_name(ReferenceKind::Team, None), UNSET_LABEL);
    }
}
