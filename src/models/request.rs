use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::models::{DayOfWeek, ScheduleSlotDraft, TimeOfDay, TimeSlot};

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlotForm {
    pub title: String,
    pub day_of_week: DayOfWeek,

    // Format: "HH:MM"
    #[schema(example = "09:00")]
    pub start_time: String,
    #[schema(example = "10:00")]
    pub end_time: String,

    pub classroom_id: Option<String>,
    pub teacher_profile_id: Option<String>,
    #[serde(default)]
    pub staff_user_ids: Vec<String>,
}

impl ScheduleSlotForm {
    /// Boundary validation: anything rejected here is a 400, never a 409.
    pub fn into_draft(self) -> Result<ScheduleSlotDraft, String> {
        let start: TimeOfDay = self.start_time.parse()?;
        let end: TimeOfDay = self.end_time.parse()?;
        if start == TimeOfDay::END_OF_DAY {
            return Err("Start time must be before 24:00".to_string());
        }
        let time_slot = TimeSlot::new(self.day_of_week, start, end)?;

        ScheduleSlotDraft::new(
            self.title,
            time_slot,
            self.classroom_id,
            self.teacher_profile_id,
            self.staff_user_ids,
        )
    }
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ConflictCheckQuery {
    /// Slot being edited; it is left out of the comparison.
    pub exclude_id: Option<i64>,
}
