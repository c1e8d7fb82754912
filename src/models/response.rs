use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{ConflictReport, DayOfWeek, ScheduleSlot, StaffConflict};

// Common response types
#[derive(Serialize, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

// Schedule responses
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlotData {
    pub id: i64,
    pub branch_id: String,
    pub title: String,
    pub day_of_week: DayOfWeek,
    #[schema(example = "09:00")]
    pub start_time: String,
    #[schema(example = "10:00")]
    pub end_time: String,
    pub classroom_id: Option<String>,
    pub teacher_profile_id: Option<String>,
    pub staff_user_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ScheduleSlot> for ScheduleSlotData {
    fn from(slot: &ScheduleSlot) -> Self {
        Self {
            id: slot.id,
            branch_id: slot.branch_id.clone(),
            title: slot.title.clone(),
            day_of_week: slot.time_slot.day_of_week,
            start_time: slot.time_slot.start_time.to_string(),
            end_time: slot.time_slot.end_time.to_string(),
            classroom_id: slot.classroom_id.clone(),
            teacher_profile_id: slot.teacher_profile_id.clone(),
            staff_user_ids: slot.staff_user_ids.iter().cloned().collect(),
            created_at: slot.created_at,
            updated_at: slot.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ScheduleResponse {
    pub success: bool,
    pub message: String,
    pub schedule: ScheduleSlotData,
}

#[derive(Serialize, ToSchema)]
pub struct ScheduleListResponse {
    pub success: bool,
    pub schedules: Vec<ScheduleSlotData>,
}

// Conflict responses
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlotSummary {
    pub id: i64,
    pub title: String,
    pub day_of_week: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
}

impl From<&ScheduleSlot> for ScheduleSlotSummary {
    fn from(slot: &ScheduleSlot) -> Self {
        Self {
            id: slot.id,
            title: slot.title.clone(),
            day_of_week: slot.time_slot.day_of_week,
            start_time: slot.time_slot.start_time.to_string(),
            end_time: slot.time_slot.end_time.to_string(),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffClashData {
    pub schedule: ScheduleSlotSummary,
    pub user_ids: Vec<String>,
}

impl From<&StaffConflict> for StaffClashData {
    fn from(conflict: &StaffConflict) -> Self {
        Self {
            schedule: ScheduleSlotSummary::from(&conflict.slot),
            user_ids: conflict.shared_staff_ids.iter().cloned().collect(),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClashSet {
    pub classroom: Vec<ScheduleSlotSummary>,
    pub teacher_profiles: Vec<ScheduleSlotSummary>,
    pub staff_assignments: Vec<StaffClashData>,
}

impl From<&ConflictReport> for ClashSet {
    fn from(report: &ConflictReport) -> Self {
        Self {
            classroom: report.classroom_conflicts.iter().map(ScheduleSlotSummary::from).collect(),
            teacher_profiles: report.teacher_conflicts.iter().map(ScheduleSlotSummary::from).collect(),
            staff_assignments: report.staff_conflicts.iter().map(StaffClashData::from).collect(),
        }
    }
}

/// Body of a 409 returned when a create or update would double-book.
#[derive(Serialize, ToSchema)]
pub struct ConflictResponse {
    pub success: bool,
    pub message: String,
    pub clashes: ClashSet,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConflictCheckResponse {
    pub success: bool,
    pub has_conflicts: bool,
    pub message: String,
    pub clashes: ClashSet,
}

impl From<&ConflictReport> for ConflictCheckResponse {
    fn from(report: &ConflictReport) -> Self {
        Self {
            success: true,
            has_conflicts: !report.is_empty(),
            message: report.summary(),
            clashes: ClashSet::from(report),
        }
    }
}

// System status responses
#[derive(Serialize, ToSchema)]
pub struct HealthStatus {
    pub database: String,
    pub timestamp: String,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub success: bool,
    pub status: HealthStatus,
}
