use actix_web::{http::StatusCode, test, web, App};
use class_schedule_api::{
    database::initialize_database,
    handlers,
    models::{DayOfWeek, ScheduleSlotDraft, TimeSlot},
    repositories::schedule_repository::SqliteScheduleSlotRepository,
    services::schedule_service::ScheduleService,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;

pub struct TestApp {
    pub pool: SqlitePool,
    pub schedule_service: web::Data<ScheduleService>,
    #[allow(dead_code)]
    pub temp_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        // Create temporary database
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let database_url = format!("sqlite://{}", db_path.display());

        let pool = initialize_database(&database_url, 2)
            .await
            .expect("Failed to initialize database");

        let repository = Arc::new(SqliteScheduleSlotRepository::new(pool.clone()));
        let schedule_service = web::Data::new(ScheduleService::new(repository));

        Self {
            pool,
            schedule_service,
            temp_dir,
        }
    }

    pub fn create_app(&self) -> actix_web::App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.pool.clone()))
            .app_data(self.schedule_service.clone())
            .app_data(handlers::json_config())
            .configure(handlers::configure_routes)
    }

    /// Posts a new schedule to `branch_id` and returns the status and JSON body.
    #[allow(dead_code)]
    pub async fn post_schedule(&self, branch_id: &str, body: Value) -> (StatusCode, Value) {
        let app = test::init_service(self.create_app()).await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/branches/{}/schedules", branch_id))
            .set_json(body)
            .to_request();

        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }

    /// Creates a schedule that is expected to succeed and returns its id.
    #[allow(dead_code)]
    pub async fn add_schedule(&self, branch_id: &str, body: Value) -> i64 {
        let (status, body) = self.post_schedule(branch_id, body).await;
        assert_eq!(status, StatusCode::CREATED, "unexpected response: {}", body);
        body["schedule"]["id"].as_i64().expect("created schedule has an id")
    }
}

#[allow(dead_code)]
pub fn schedule_form(title: &str, day: &str, start: &str, end: &str) -> Value {
    json!({
        "title": title,
        "dayOfWeek": day,
        "startTime": start,
        "endTime": end
    })
}

#[allow(dead_code)]
pub fn draft(title: &str, day: DayOfWeek, start: &str, end: &str) -> ScheduleSlotDraft {
    let time_slot = TimeSlot::new(day, start.parse().unwrap(), end.parse().unwrap()).unwrap();
    ScheduleSlotDraft::new(title.to_string(), time_slot, None, None, Vec::new()).unwrap()
}
