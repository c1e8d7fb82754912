use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;

use class_schedule_api::config::AppConfig;
use class_schedule_api::database::initialize_database;
use class_schedule_api::handlers;
use class_schedule_api::openapi_config::ApiDoc;
use class_schedule_api::repositories::SqliteScheduleSlotRepository;
use class_schedule_api::services::ScheduleService;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;

    // Initialize database
    let pool = initialize_database(&config.database_url, config.database_max_connections).await?;

    // Initialize repositories and services
    let schedule_repository = Arc::new(SqliteScheduleSlotRepository::new(pool.clone()));
    let schedule_service = web::Data::new(ScheduleService::new(schedule_repository));

    let openapi_spec = ApiDoc::openapi();

    tracing::info!("Class Schedule API listening on http://{}", config.bind_address);
    tracing::info!("API Documentation: http://{}/swagger-ui/", config.bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(schedule_service.clone())
            .app_data(handlers::json_config())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .wrap(Logger::default())
            // Swagger UI for API documentation
            .service(
                utoipa_swagger_ui::SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi_spec.clone()),
            )
            .configure(handlers::configure_routes)
    })
    .bind(config.bind_address)?
    .run()
    .await?;

    Ok(())
}
