pub mod schedule;
pub mod system;

use actix_web::web;

use crate::models::ServiceError;

// Re-export all handler functions for easy importing
pub use schedule::*;
pub use system::*;

/// Registers every API route. Shared by the server and the integration tests.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/health", web::get().to(health))
        .route(
            "/api/branches/{branch_id}/schedules/check",
            web::post().to(check_schedule_conflicts),
        )
        .route("/api/branches/{branch_id}/schedules", web::get().to(list_branch_schedules))
        .route("/api/branches/{branch_id}/schedules", web::post().to(create_schedule))
        .route("/api/schedules/{id}", web::get().to(get_schedule))
        .route("/api/schedules/{id}", web::put().to(update_schedule))
        .route("/api/schedules/{id}", web::delete().to(delete_schedule));
}

/// Malformed bodies get the same `{success, message}` shape as other 400s.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ServiceError::ValidationError(err.to_string()).into())
}
