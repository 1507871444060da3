//! Request editor.
//!
//! Holds the form draft for a new or existing request, keeps its cross-field
//! invariants as the user edits, and produces a normalized record for the
//! repository.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use shared::validation::{parse_duration_hours, validate_duration_hours, validate_subject};

use crate::error::{DomainError, DomainResult, StageError};
use crate::models::{
    Equipment, MaintenanceFor, MaintenanceRequest, NewMaintenanceRequest, Priority, RequestPatch,
    RequestType, Stage, Target,
};
use crate::repository::RequestRepository;
use crate::services::stage_machine::StageMachine;

/// Raw form state. Both target fields exist here; only the one matching
/// `maintenance_for` survives normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RequestDraft {
    pub subject: String,
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub maintenance_for: MaintenanceFor,
    pub equipment_id: Option<Uuid>,
    pub work_center_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub stage: Stage,
    pub scheduled_date: Option<NaiveDate>,
    pub duration_hours: Option<f64>,
    pub priority: Option<Priority>,
    pub description: String,
    pub corrective_action: String,
    pub preventive_action: String,
}

impl Default for RequestDraft {
    fn default() -> Self {
        Self {
            subject: String::new(),
            request_type: RequestType::Corrective,
            maintenance_for: MaintenanceFor::Equipment,
            equipment_id: None,
            work_center_id: None,
            team_id: None,
            category_id: None,
            stage: Stage::New,
            scheduled_date: None,
            duration_hours: None,
            priority: None,
            description: String::new(),
            corrective_action: String::new(),
            preventive_action: String::new(),
        }
    }
}

impl From<&MaintenanceRequest> for RequestDraft {
    fn from(request: &MaintenanceRequest) -> Self {
        Self {
            subject: request.subject.clone(),
            request_type: request.request_type,
            maintenance_for: request.maintenance_for(),
            equipment_id: request.target.equipment_id(),
            work_center_id: request.target.work_center_id(),
            team_id: request.team_id,
            category_id: request.category_id,
            stage: request.stage,
            scheduled_date: request.scheduled_date,
            duration_hours: request.duration_hours,
            priority: request.priority,
            description: request.description.clone().unwrap_or_default(),
            corrective_action: request.corrective_action.clone().unwrap_or_default(),
            preventive_action: request.preventive_action.clone().unwrap_or_default(),
        }
    }
}

/// A validated draft with its invariants enforced by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequest {
    pub subject: String,
    pub request_type: RequestType,
    pub target: Target,
    pub team_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub stage: Stage,
    pub scheduled_date: Option<NaiveDate>,
    pub duration_hours: Option<f64>,
    pub priority: Option<Priority>,
    pub description: Option<String>,
    pub corrective_action: Option<String>,
    pub preventive_action: Option<String>,
}

impl NormalizedRequest {
    pub fn into_new(self, owner_id: Uuid) -> NewMaintenanceRequest {
        NewMaintenanceRequest {
            owner_id,
            subject: self.subject,
            request_type: self.request_type,
            target: self.target,
            team_id: self.team_id,
            category_id: self.category_id,
            scheduled_date: self.scheduled_date,
            duration_hours: self.duration_hours,
            priority: self.priority,
            description: self.description,
            corrective_action: self.corrective_action,
            preventive_action: self.preventive_action,
        }
    }

    /// Patch overwriting every editable field.
    pub fn into_patch(self) -> RequestPatch {
        RequestPatch {
            subject: Some(self.subject),
            request_type: Some(self.request_type),
            target: Some(self.target),
            team_id: Some(self.team_id),
            category_id: Some(self.category_id),
            stage: Some(self.stage),
            scheduled_date: Some(self.scheduled_date),
            duration_hours: Some(self.duration_hours),
            priority: Some(self.priority),
            description: Some(self.description),
            corrective_action: Some(self.corrective_action),
            preventive_action: Some(self.preventive_action),
        }
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn required(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validate a draft on its own.
pub fn validate(draft: &RequestDraft) -> Result<NormalizedRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Err(err) = validate_subject(&draft.subject) {
        errors.add("subject", err);
    }

    let target = match draft.maintenance_for {
        MaintenanceFor::Equipment => draft.equipment_id.map(Target::Equipment),
        MaintenanceFor::WorkCenter => draft.work_center_id.map(Target::WorkCenter),
    };
    if target.is_none() {
        match draft.maintenance_for {
            MaintenanceFor::Equipment => errors.add(
                "equipment_id",
                required("equipment_required", "Equipment is required"),
            ),
            MaintenanceFor::WorkCenter => errors.add(
                "work_center_id",
                required("work_center_required", "Work center is required"),
            ),
        }
    }

    let scheduled_date = match draft.request_type {
        RequestType::Preventive => {
            if draft.scheduled_date.is_none() {
                errors.add(
                    "scheduled_date",
                    required(
                        "scheduled_date_required",
                        "Scheduled date is required for preventive maintenance",
                    ),
                );
            }
            draft.scheduled_date
        }
        RequestType::Corrective => None,
    };

    if let Some(hours) = draft.duration_hours {
        if let Err(err) = validate_duration_hours(hours) {
            errors.add("duration_hours", err);
        }
    }

    let Some(target) = target else {
        return Err(errors);
    };
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NormalizedRequest {
        subject: draft.subject.trim().to_string(),
        request_type: draft.request_type,
        target,
        team_id: draft.team_id,
        category_id: draft.category_id,
        stage: draft.stage,
        scheduled_date,
        duration_hours: draft.duration_hours,
        priority: draft.priority,
        description: non_blank(&draft.description),
        corrective_action: non_blank(&draft.corrective_action),
        preventive_action: non_blank(&draft.preventive_action),
    })
}

/// Form controller for one request.
#[derive(Debug, Clone)]
pub struct RequestEditor {
    draft: RequestDraft,
    equipment: Vec<Equipment>,
    machine: StageMachine,
    /// Set when editing a stored request.
    request_id: Option<Uuid>,
    errors: Option<ValidationErrors>,
}

impl RequestEditor {
    /// Editor for a new request. `equipment` is the picker list used for auto-fill.
    pub fn new(equipment: Vec<Equipment>) -> Self {
        Self {
            draft: RequestDraft::default(),
            equipment,
            machine: StageMachine::default(),
            request_id: None,
            errors: None,
        }
    }

    /// Editor seeded from a stored request.
    pub fn from_request(request: &MaintenanceRequest, equipment: Vec<Equipment>) -> Self {
        Self {
            draft: RequestDraft::from(request),
            request_id: Some(request.id),
            ..Self::new(equipment)
        }
    }

    pub fn with_stage_machine(mut self, machine: StageMachine) -> Self {
        self.machine = machine;
        self
    }

    pub fn draft(&self) -> &RequestDraft {
        &self.draft
    }

    pub fn request_id(&self) -> Option<Uuid> {
        self.request_id
    }

    /// Errors from the last failed validation, if any.
    pub fn errors(&self) -> Option<&ValidationErrors> {
        self.errors.as_ref()
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.draft.subject = subject.into();
    }

    /// Switching away from preventive drops the scheduled date for good.
    pub fn set_request_type(&mut self, request_type: RequestType) {
        if self.draft.request_type == RequestType::Preventive
            && request_type != RequestType::Preventive
        {
            self.draft.scheduled_date = None;
        }
        self.draft.request_type = request_type;
    }

    /// Switching target kind clears the reference of the kind left behind.
    pub fn set_maintenance_for(&mut self, maintenance_for: MaintenanceFor) {
        if self.draft.maintenance_for == maintenance_for {
            return;
        }
        match self.draft.maintenance_for {
            MaintenanceFor::Equipment => self.draft.equipment_id = None,
            MaintenanceFor::WorkCenter => self.draft.work_center_id = None,
        }
        self.draft.maintenance_for = maintenance_for;
    }

    /// Select equipment and inherit its team and category.
    ///
    /// Ignored while the draft targets a work center. Unknown equipment is
    /// selected without touching team or category.
    pub fn select_equipment(&mut self, equipment_id: Uuid) {
        if self.draft.maintenance_for != MaintenanceFor::Equipment {
            debug!(equipment_id = %equipment_id, "Equipment selected while targeting a work center");
            return;
        }

        self.draft.equipment_id = Some(equipment_id);
        if let Some(equipment) = self.equipment.iter().find(|e| e.id == equipment_id) {
            self.draft.team_id = equipment.maintenance_team_id;
            self.draft.category_id = equipment.category_id;
        }
    }

    pub fn select_work_center(&mut self, work_center_id: Uuid) {
        if self.draft.maintenance_for != MaintenanceFor::WorkCenter {
            debug!(work_center_id = %work_center_id, "Work center selected while targeting equipment");
            return;
        }
        self.draft.work_center_id = Some(work_center_id);
    }

    pub fn set_team(&mut self, team_id: Option<Uuid>) {
        self.draft.team_id = team_id;
    }

    pub fn set_category(&mut self, category_id: Option<Uuid>) {
        self.draft.category_id = category_id;
    }

    /// Explicit stage edit, checked against the transition policy.
    pub fn set_stage(&mut self, stage: Stage) -> DomainResult<()> {
        if !self.machine.can_transition(self.draft.stage, stage) {
            return Err(StageError {
                from: self.draft.stage,
                to: stage,
            }
            .into());
        }
        self.draft.stage = stage;
        Ok(())
    }

    /// Ignored unless the draft is preventive.
    pub fn set_scheduled_date(&mut self, date: Option<NaiveDate>) {
        if self.draft.request_type == RequestType::Preventive {
            self.draft.scheduled_date = date;
        }
    }

    /// Permissive parse: anything that is not a non-negative number clears the field.
    pub fn set_duration_input(&mut self, input: &str) {
        self.draft.duration_hours = parse_duration_hours(input);
    }

    pub fn set_duration_hours(&mut self, hours: Option<f64>) {
        self.draft.duration_hours = hours.filter(|h| validate_duration_hours(*h).is_ok());
    }

    pub fn set_priority(&mut self, priority: Option<Priority>) {
        self.draft.priority = priority;
    }

    pub fn set_description(&mut self, text: impl Into<String>) {
        self.draft.description = text.into();
    }

    pub fn set_corrective_action(&mut self, text: impl Into<String>) {
        self.draft.corrective_action = text.into();
    }

    pub fn set_preventive_action(&mut self, text: impl Into<String>) {
        self.draft.preventive_action = text.into();
    }

    /// Validate the current draft and remember the outcome for the form.
    pub fn validate(&mut self) -> Result<NormalizedRequest, ValidationErrors> {
        match validate(&self.draft) {
            Ok(normalized) => {
                self.errors = None;
                Ok(normalized)
            }
            Err(errors) => {
                self.errors = Some(errors.clone());
                Err(errors)
            }
        }
    }

    /// Validate, then insert or update through the repository.
    ///
    /// Nothing is written when validation fails.
    pub async fn save(
        &mut self,
        repository: &dyn RequestRepository,
        owner_id: Uuid,
    ) -> DomainResult<MaintenanceRequest> {
        let normalized = self.validate().map_err(DomainError::Validation)?;

        let saved = match self.request_id {
            Some(id) => repository.update_request(id, normalized.into_patch()).await?,
            // Inserts always start in `New`, whatever the draft stage says.
            None => repository.insert_request(normalized.into_new(owner_id)).await?,
        };

        info!(
            request_id = %saved.id,
            stage = %saved.stage,
            created = self.request_id.is_none(),
            "Maintenance request saved"
        );
        self.request_id = Some(saved.id);
        self.draft = RequestDraft::from(&saved);
        Ok(saved)
    }
}
