use axum::{
    extract::Extension, middleware, response::IntoResponse, routing::get, Json, Router,
};
use notices::{config, middleware::security_headers_middleware, migration, routes, utils};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use std::env;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        // Auth routes
        notices::handlers::register,
        notices::handlers::login,
        notices::handlers::get_current_user,
        // Notice routes
        notices::handlers::notice::list_notices,
        notices::handlers::notice::unseen_count,
        notices::handlers::notice::get_notice,
        notices::handlers::notice::archive_notice,
        notices::handlers::notice::delete_notice,
        notices::handlers::notice::mark_all_seen,
        notices::handlers::notice::dispatch_notice,
        // Settings routes
        notices::handlers::settings::get_settings,
        notices::handlers::settings::update_settings,
        // Notice type routes
        notices::handlers::notice_type::list_notice_types,
        notices::handlers::notice_type::create_notice_type,
        // Feeds
        notices::handlers::feed::notices_feed,
    ),
    components(
        schemas(
            notices::response::ApiResponse<serde_json::Value>,
            notices::response::PaginatedResponse<serde_json::Value>,
            notices::error::AppError,
            notices::models::Medium,
            // Auth
            notices::handlers::auth::RegisterRequest,
            notices::handlers::auth::LoginRequest,
            notices::handlers::auth::AuthResponse,
            notices::handlers::auth::UserResponse,
            // Notices
            notices::handlers::notice::NoticeResponse,
            notices::handlers::notice::UnseenCountResponse,
            notices::handlers::notice::DispatchRequest,
            notices::handlers::notice::DispatchedResponse,
            // Settings
            notices::handlers::settings::SettingsForm,
            notices::handlers::settings::SettingsPageResponse,
            notices::handlers::settings::SettingsUpdateResponse,
            notices::handlers::settings::SettingsRowResponse,
            notices::handlers::settings::MediumChoice,
            notices::services::notice_setting::SettingsRowInput,
            // Notice types
            notices::handlers::notice_type::NoticeTypeResponse,
            notices::handlers::notice_type::CreateNoticeTypeRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication operations"),
        (name = "notices", description = "Notice inbox operations"),
        (name = "settings", description = "Delivery preference operations"),
        (name = "notice-types", description = "Notice type operations"),
        (name = "feeds", description = "Syndication feeds"),
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notices=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration before doing anything else
    let jwt_config = validate_config()?;
    utils::jwt::init_jwt_config(jwt_config)?;

    tracing::info!("Starting Notices API v{}...", env!("CARGO_PKG_VERSION"));

    let db = config::database::get_database().await?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let feed_config = config::feed::FeedConfig::from_env();
    tracing::info!(base_url = %feed_config.base_url, "Feed configured");

    let app = create_app()
        .layer(Extension(db))
        .layer(Extension(feed_config));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Validate all required configuration at startup (fail-fast).
fn validate_config() -> anyhow::Result<config::jwt::JwtConfig> {
    let jwt_config = config::jwt::JwtConfig::from_env()?;

    // DATABASE_URL: checked here for early error; actual connection happens later
    if env::var("DATABASE_URL").is_err() {
        return Err(anyhow::anyhow!(
            "DATABASE_URL environment variable must be set"
        ));
    }

    Ok(jwt_config)
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins_str == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

fn create_app() -> Router {
    Router::new()
        .route("/", get(health_check))
        .merge(routes::create_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Health check successful", body = serde_json::Value)
    )
)]
async fn health_check(Extension(db): Extension<DatabaseConnection>) -> impl IntoResponse {
    let db_ok = db
        .query_one(Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT 1".to_string(),
        ))
        .await
        .is_ok();

    let status = if db_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": "Notices API",
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_ok,
    }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
