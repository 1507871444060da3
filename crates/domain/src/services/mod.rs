//! Domain services for the Maintenance Tracker.
//!
//! Services contain the request lifecycle logic that operates on domain models.

pub mod board;
pub mod calendar;
pub mod editor;
pub mod stage_machine;

pub use board::{
    apply_drag, project, BoardCard, BoardProjection, BoardSession, DragOutcome, DragResult,
    PersistOp, StageCounts, ROLLBACK_NOTICE,
};

pub use calendar::{
    days_in_month, first_weekday_of_month, index_by_date, requests_on_date, requests_on_date_str,
    upcoming, CalendarError, DayCell, MonthCursor, MonthGrid, DEFAULT_UPCOMING_LIMIT,
};

pub use editor::{NormalizedRequest, RequestDraft, RequestEditor};

pub use stage_machine::{StageMachine, Transition, TransitionPolicy};
