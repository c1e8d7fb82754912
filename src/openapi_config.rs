use utoipa::OpenApi;

use crate::handlers;
use crate::models::{
    ApiResponse, ClashSet, ConflictCheckResponse, ConflictResponse, DayOfWeek, ErrorResponse,
    HealthResponse, HealthStatus, ScheduleListResponse, ScheduleResponse, ScheduleSlotData,
    ScheduleSlotForm, ScheduleSlotSummary, StaffClashData,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Class Schedule API",
        description = "Weekly class schedules per branch with classroom, teacher and staff double-booking protection"
    ),
    paths(
        handlers::system::health,
        handlers::schedule::list_branch_schedules,
        handlers::schedule::create_schedule,
        handlers::schedule::check_schedule_conflicts,
        handlers::schedule::get_schedule,
        handlers::schedule::update_schedule,
        handlers::schedule::delete_schedule,
    ),
    components(schemas(
        ApiResponse,
        ErrorResponse,
        DayOfWeek,
        ScheduleSlotForm,
        ScheduleSlotData,
        ScheduleResponse,
        ScheduleListResponse,
        ScheduleSlotSummary,
        StaffClashData,
        ClashSet,
        ConflictResponse,
        ConflictCheckResponse,
        HealthStatus,
        HealthResponse,
    )),
    tags(
        (name = "schedules", description = "Recurring weekly class slots")
    )
)]
pub struct ApiDoc;
