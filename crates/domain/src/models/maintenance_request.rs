//! Maintenance request domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::stage::Stage;

// ============================================================================
// Enums
// ============================================================================

/// Kind of maintenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestType {
    /// Reactive maintenance triggered by a breakdown.
    #[serde(alias = "corrective")]
    Corrective,
    /// Scheduled maintenance tied to a future date.
    #[serde(alias = "preventive")]
    Preventive,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Corrective => "Corrective",
            RequestType::Preventive => "Preventive",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RequestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Corrective" | "corrective" => Ok(RequestType::Corrective),
            "Preventive" | "preventive" => Ok(RequestType::Preventive),
            other => Err(format!(
                "Invalid request type: {}. Must be one of: Corrective, Preventive",
                other
            )),
        }
    }
}

/// Which kind of target a request is raised against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaintenanceFor {
    #[serde(alias = "equipment")]
    Equipment,
    #[serde(rename = "Work Center", alias = "WorkCenter", alias = "work_center")]
    WorkCenter,
}

impl MaintenanceFor {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceFor::Equipment => "Equipment",
            MaintenanceFor::WorkCenter => "Work Center",
        }
    }
}

impl fmt::Display for MaintenanceFor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Optional urgency of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    #[serde(alias = "low")]
    Low,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "high")]
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Low" | "low" => Ok(Priority::Low),
            "Medium" | "medium" => Ok(Priority::Medium),
            "High" | "high" => Ok(Priority::High),
            other => Err(format!(
                "Invalid priority: {}. Must be one of: Low, Medium, High",
                other
            )),
        }
    }
}

/// The single entity a request is raised against.
///
/// A request always has exactly one target; equipment and work center
/// references can never both be set or both be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Target {
    Equipment(Uuid),
    WorkCenter(Uuid),
}

impl Target {
    pub fn maintenance_for(&self) -> MaintenanceFor {
        match self {
            Target::Equipment(_) => MaintenanceFor::Equipment,
            Target::WorkCenter(_) => MaintenanceFor::WorkCenter,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Target::Equipment(id) | Target::WorkCenter(id) => *id,
        }
    }

    pub fn equipment_id(&self) -> Option<Uuid> {
        match self {
            Target::Equipment(id) => Some(*id),
            Target::WorkCenter(_) => None,
        }
    }

    pub fn work_center_id(&self) -> Option<Uuid> {
        match self {
            Target::WorkCenter(id) => Some(*id),
            Target::Equipment(_) => None,
        }
    }
}

// ============================================================================
// Core Model
// ============================================================================

/// A maintenance request as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MaintenanceRequest {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub subject: String,
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub target: Target,
    pub team_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub stage: Stage,
    /// Only set for preventive requests.
    pub scheduled_date: Option<NaiveDate>,
    pub duration_hours: Option<f64>,
    pub priority: Option<Priority>,
    pub description: Option<String>,
    pub corrective_action: Option<String>,
    pub preventive_action: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MaintenanceRequest {
    pub fn maintenance_for(&self) -> MaintenanceFor {
        self.target.maintenance_for()
    }

    /// A preventive request whose date has passed while work is still open.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.request_type == RequestType::Preventive
            && !self.stage.is_closed()
            && self.scheduled_date.is_some_and(|date| date < today)
    }
}

/// A normalized request ready for insertion. Stage always starts at `New`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NewMaintenanceRequest {
    pub owner_id: Uuid,
    pub subject: String,
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub target: Target,
    pub team_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub scheduled_date: Option<NaiveDate>,
    pub duration_hours: Option<f64>,
    pub priority: Option<Priority>,
    pub description: Option<String>,
    pub corrective_action: Option<String>,
    pub preventive_action: Option<String>,
}

impl NewMaintenanceRequest {
    /// Materializes the stored record.
    pub fn into_request(self, id: Uuid, created_at: DateTime<Utc>) -> MaintenanceRequest {
        MaintenanceRequest {
            id,
            owner_id: self.owner_id,
            subject: self.subject,
            request_type: self.request_type,
            target: self.target,
            team_id: self.team_id,
            category_id: self.category_id,
            stage: Stage::New,
            scheduled_date: self.scheduled_date,
            duration_hours: self.duration_hours,
            priority: self.priority,
            description: self.description,
            corrective_action: self.corrective_action,
            preventive_action: self.preventive_action,
            created_at,
        }
    }
}

/// Partial update. `None` leaves a field untouched; `Some(None)` clears a
/// nullable field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestPatch {
    pub subject: Option<String>,
    pub request_type: Option<RequestType>,
    pub target: Option<Target>,
    pub team_id: Option<Option<Uuid>>,
    pub category_id: Option<Option<Uuid>>,
    pub stage: Option<Stage>,
    pub scheduled_date: Option<Option<NaiveDate>>,
    pub duration_hours: Option<Option<f64>>,
    pub priority: Option<Option<Priority>>,
    pub description: Option<Option<String>>,
    pub corrective_action: Option<Option<String>>,
    pub preventive_action: Option<Option<String>>,
}

impl RequestPatch {
    /// A patch touching only the stage.
    pub fn stage(stage: Stage) -> Self {
        Self {
            stage: Some(stage),
            ..Self::default()
        }
    }

    /// Applies the patch in place.
    pub fn apply_to(self, request: &mut MaintenanceRequest) {
        if let Some(subject) = self.subject {
            request.subject = subject;
        }
        if let Some(request_type) = self.request_type {
            request.request_type = request_type;
        }
        if let Some(target) = self.target {
            request.target = target;
        }
        if let Some(team_id) = self.team_id {
            request.team_id = team_id;
        }
        if let Some(category_id) = self.category_id {
            request.category_id = category_id;
        }
        if let Some(stage) = self.stage {
            request.stage = stage;
        }
        if let Some(scheduled_date) = self.scheduled_date {
            request.scheduled_date = scheduled_date;
        }
        if let Some(duration_hours) = self.duration_hours {
            request.duration_hours = duration_hours;
        }
        if let Some(priority) = self.priority {
            request.priority = priority;
        }
        if let Some(description) = self.description {
            request.description = description;
        }
        if let Some(corrective_action) = self.corrective_action {
            request.corrective_action = corrective_action;
        }
        if let Some(preventive_action) = self.preventive_action {
            request.preventive_action = preventive_action;
        }
    }
}

/// Listing filter. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RequestFilter {
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    #[serde(default, rename = "type")]
    pub request_type: Option<RequestType>,
    #[serde(default)]
    pub stage: Option<Stage>,
    #[serde(default)]
    pub equipment_id: Option<Uuid>,
}

impl RequestFilter {
    pub fn for_owner(owner_id: Uuid) -> Self {
        Self {
            owner_id: Some(owner_id),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, request_type: RequestType) -> Self {
        self.request_type = Some(request_type);
        self
    }

    pub fn with_equipment(mut self, equipment_id: Uuid) -> Self {
        self.equipment_id = Some(equipment_id);
        self
    }

    pub fn matches(&self, request: &MaintenanceRequest) -> bool {
        self.owner_id.map_or(true, |id| request.owner_id == id)
            && self
                .request_type
                .map_or(true, |t| request.request_type == t)
            && self.stage.map_or(true, |s| request.stage == s)
            && self
                .equipment_id
                .map_or(true, |id| request.target.equipment_id() == Some(id))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A corrective equipment request in stage `New`.
    pub fn request(subject: &str) -> MaintenanceRequest {
        MaintenanceRequest {
            id: Uuid::new_v4(),
            owner_id: Uuid::nil(),
            subject: subject.to_string(),
            request_type: RequestType::Corrective,
            target: Target::Equipment(Uuid::new_v4()),
            team_id: None,
            category_id: None,
            stage: Stage::New,
            scheduled_date: None,
            duration_hours: None,
            priority: None,
            description: None,
            corrective_action: None,
            preventive_action: None,
            created_at: Utc::now(),
        }
    }

    pub fn in_stage(subject: &str, stage: Stage) -> MaintenanceRequest {
        MaintenanceRequest {
            stage,
            ..request(subject)
        }
    }

    pub fn preventive(subject: &str, date: NaiveDate) -> MaintenanceRequest {
        MaintenanceRequest {
            request_type: RequestType::Preventive,
            scheduled_date: Some(date),
            ..request(subject)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_target_exclusive_accessors() {
        let id = Uuid::new_v4();
        let equipment = Target::Equipment(id);
        assert_eq!(equipment.equipment_id(), Some(id));
        assert_eq!(equipment.work_center_id(), None);
        assert_eq!(equipment.maintenance_for(), MaintenanceFor::Equipment);

        let center = Target::WorkCenter(id);
        assert_eq!(center.equipment_id(), None);
        assert_eq!(center.work_center_id(), Some(id));
        assert_eq!(center.id(), id);
    }

    #[test]
    fn test_target_serde() {
        let id = Uuid::nil();
        let json = serde_json::to_value(Target::WorkCenter(id)).unwrap();
        assert_eq!(json["kind"], "work_center");
        assert_eq!(json["id"], id.to_string());
    }

    #[test]
    fn test_request_type_from_str() {
        assert_eq!("Preventive".parse::<RequestType>(), Ok(RequestType::Preventive));
        assert_eq!("corrective".parse::<RequestType>(), Ok(RequestType::Corrective));
        assert!("Predictive".parse::<RequestType>().is_err());
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
        assert_eq!("high".parse::<Priority>(), Ok(Priority::High));
    }

    #[test]
    fn test_overdue() {
        let today = day(2024, 3, 10);
        let mut req = preventive("Grease bearings", day(2024, 3, 9));
        assert!(req.is_overdue(today));

        req.stage = Stage::Repaired;
        assert!(!req.is_overdue(today));

        let due_today = preventive("Grease bearings", today);
        assert!(!due_today.is_overdue(today));

        assert!(!request("Pump leak").is_overdue(today));
    }

    #[test]
    fn test_patch_applies_only_set_fields() {
        let mut req = request("Pump leak");
        req.description = Some("drips".to_string());
        let before = req.clone();

        RequestPatch::stage(Stage::InProgress).apply_to(&mut req);
        assert_eq!(req.stage, Stage::InProgress);
        assert_eq!(req.subject, before.subject);
        assert_eq!(req.description, before.description);

        let clear = RequestPatch {
            description: Some(None),
            ..RequestPatch::default()
        };
        clear.apply_to(&mut req);
        assert_eq!(req.description, None);
    }

    #[test]
    fn test_filter_matches() {
        let owner = Uuid::new_v4();
        let mut req = preventive("Calibrate", day(2024, 5, 1));
        req.owner_id = owner;

        assert!(RequestFilter::default().matches(&req));
        assert!(RequestFilter::for_owner(owner).matches(&req));
        assert!(!RequestFilter::for_owner(Uuid::new_v4()).matches(&req));
        assert!(RequestFilter::for_owner(owner)
            .with_type(RequestType::Preventive)
            .matches(&req));
        assert!(!RequestFilter::default()
            .with_type(RequestType::Corrective)
            .matches(&req));

        let equipment_id = req.target.id();
        assert!(RequestFilter::default().with_equipment(equipment_id).matches(&req));
        assert!(!RequestFilter::default()
            .with_equipment(Uuid::new_v4())
            .matches(&req));
    }

    #[test]
    fn test_new_request_starts_in_new_stage() {
        let draft = NewMaintenanceRequest {
            owner_id: Uuid::nil(),
            subject: "Replace belt".to_string(),
            request_type: RequestType::Corrective,
            target: Target::WorkCenter(Uuid::new_v4()),
            team_id: None,
            category_id: None,
            scheduled_date: None,
            duration_hours: Some(2.0),
            priority: Some(Priority::High),
            description: None,
            corrective_action: None,
            preventive_action: None,
        };
        let id = Uuid::new_v4();
        let req = draft.into_request(id, Utc::now());
        assert_eq!(req.id, id);
        assert_eq!(req.stage, Stage::New);
        assert_eq!(req.maintenance_for(), MaintenanceFor::WorkCenter);
    }
}
