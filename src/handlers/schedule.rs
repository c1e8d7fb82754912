use actix_web::{web, HttpResponse, Result};

use crate::models::{
    ApiResponse, ConflictCheckQuery, ConflictCheckResponse, ConflictResponse, ErrorResponse,
    ScheduleListResponse, ScheduleResponse, ScheduleSlotData, ScheduleSlotForm, ServiceError,
    SlotId,
};
use crate::services::ScheduleService;

#[utoipa::path(
    get,
    path = "/api/branches/{branch_id}/schedules",
    params(
        ("branch_id" = String, Path, description = "Branch ID")
    ),
    responses(
        (status = 200, description = "Weekly schedule of the branch, in day and start time order", body = ScheduleListResponse)
    )
)]
pub async fn list_branch_schedules(
    schedule_service: web::Data<ScheduleService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let branch_id = path.into_inner();
    let slots = schedule_service.list_slots(&branch_id).await?;

    Ok(HttpResponse::Ok().json(ScheduleListResponse {
        success: true,
        schedules: slots.iter().map(ScheduleSlotData::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/branches/{branch_id}/schedules",
    params(
        ("branch_id" = String, Path, description = "Branch ID")
    ),
    request_body = ScheduleSlotForm,
    responses(
        (status = 201, description = "Schedule created", body = ScheduleResponse),
        (status = 400, description = "Invalid schedule values", body = ErrorResponse),
        (status = 409, description = "Classroom, teacher or staff already booked", body = ConflictResponse)
    )
)]
pub async fn create_schedule(
    schedule_service: web::Data<ScheduleService>,
    path: web::Path<String>,
    form: web::Json<ScheduleSlotForm>,
) -> Result<HttpResponse, ServiceError> {
    let branch_id = path.into_inner();
    let draft = form.into_inner().into_draft().map_err(ServiceError::ValidationError)?;

    let slot = schedule_service.create_slot(&branch_id, draft).await?;

    Ok(HttpResponse::Created().json(ScheduleResponse {
        success: true,
        message: "Schedule created successfully".to_string(),
        schedule: ScheduleSlotData::from(&slot),
    }))
}

#[utoipa::path(
    post,
    path = "/api/branches/{branch_id}/schedules/check",
    params(
        ("branch_id" = String, Path, description = "Branch ID"),
        ConflictCheckQuery
    ),
    request_body = ScheduleSlotForm,
    responses(
        (status = 200, description = "Conflict report for the proposed schedule; nothing is saved", body = ConflictCheckResponse),
        (status = 400, description = "Invalid schedule values", body = ErrorResponse)
    )
)]
pub async fn check_schedule_conflicts(
    schedule_service: web::Data<ScheduleService>,
    path: web::Path<String>,
    query: web::Query<ConflictCheckQuery>,
    form: web::Json<ScheduleSlotForm>,
) -> Result<HttpResponse, ServiceError> {
    let branch_id = path.into_inner();
    let draft = form.into_inner().into_draft().map_err(ServiceError::ValidationError)?;

    let report = schedule_service
        .check_slot(&branch_id, &draft, query.exclude_id)
        .await?;

    Ok(HttpResponse::Ok().json(ConflictCheckResponse::from(&report)))
}

#[utoipa::path(
    get,
    path = "/api/schedules/{id}",
    params(
        ("id" = i64, Path, description = "Schedule ID")
    ),
    responses(
        (status = 200, description = "Schedule retrieved", body = ScheduleResponse),
        (status = 404, description = "Schedule not found", body = ErrorResponse)
    )
)]
pub async fn get_schedule(
    schedule_service: web::Data<ScheduleService>,
    path: web::Path<SlotId>,
) -> Result<HttpResponse, ServiceError> {
    let slot = schedule_service.get_slot(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ScheduleResponse {
        success: true,
        message: "Schedule retrieved".to_string(),
        schedule: ScheduleSlotData::from(&slot),
    }))
}

#[utoipa::path(
    put,
    path = "/api/schedules/{id}",
    params(
        ("id" = i64, Path, description = "Schedule ID")
    ),
    request_body = ScheduleSlotForm,
    responses(
        (status = 200, description = "Schedule updated", body = ScheduleResponse),
        (status = 400, description = "Invalid schedule values", body = ErrorResponse),
        (status = 404, description = "Schedule not found", body = ErrorResponse),
        (status = 409, description = "Classroom, teacher or staff already booked", body = ConflictResponse)
    )
)]
pub async fn update_schedule(
    schedule_service: web::Data<ScheduleService>,
    path: web::Path<SlotId>,
    form: web::Json<ScheduleSlotForm>,
) -> Result<HttpResponse, ServiceError> {
    let draft = form.into_inner().into_draft().map_err(ServiceError::ValidationError)?;

    let slot = schedule_service.update_slot(path.into_inner(), draft).await?;

    Ok(HttpResponse::Ok().json(ScheduleResponse {
        success: true,
        message: "Schedule updated successfully".to_string(),
        schedule: ScheduleSlotData::from(&slot),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/schedules/{id}",
    params(
        ("id" = i64, Path, description = "Schedule ID")
    ),
    responses(
        (status = 200, description = "Schedule deleted", body = ApiResponse),
        (status = 404, description = "Schedule not found", body = ErrorResponse)
    )
)]
pub async fn delete_schedule(
    schedule_service: web::Data<ScheduleService>,
    path: web::Path<SlotId>,
) -> Result<HttpResponse, ServiceError> {
    let message = schedule_service.delete_slot(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse {
        success: true,
        message,
    }))
}
