use crate::handlers;
use crate::middleware::auth::auth_middleware;
use axum::{middleware, routing, Router};

pub fn create_routes() -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        // Basic auth is checked by the handler's extractor
        .route("/feeds/notices", routing::get(handlers::feed::notices_feed))
}

fn api_routes() -> Router {
    let protected = protected_routes().layer(middleware::from_fn(auth_middleware));
    auth_routes().merge(protected)
}

/// Public auth routes: register, login.
fn auth_routes() -> Router {
    Router::new()
        .route("/auth/register", routing::post(handlers::register))
        .route("/auth/login", routing::post(handlers::login))
}

/// Routes requiring a bearer token or access cookie.
fn protected_routes() -> Router {
    Router::new()
        .route("/auth/me", routing::get(handlers::get_current_user))
        // Notices
        .route("/notices", routing::get(handlers::notice::list_notices))
        .route(
            "/notices/unseen-count",
            routing::get(handlers::notice::unseen_count),
        )
        .route(
            "/notices/mark-all-seen",
            routing::post(handlers::notice::mark_all_seen),
        )
        .route(
            "/notices/settings",
            routing::get(handlers::settings::get_settings)
                .post(handlers::settings::update_settings),
        )
        .route("/notices/{id}", routing::get(handlers::notice::get_notice))
        .route(
            "/notices/{id}/archive",
            routing::post(handlers::notice::archive_notice),
        )
        .route(
            "/notices/{id}/delete",
            routing::post(handlers::notice::delete_notice),
        )
        // Notice types
        .route(
            "/notice-types",
            routing::get(handlers::notice_type::list_notice_types),
        )
        // Admin
        .route(
            "/admin/notice-types",
            routing::post(handlers::notice_type::create_notice_type),
        )
        .route(
            "/admin/notices",
            routing::post(handlers::notice::dispatch_notice),
        )
}
