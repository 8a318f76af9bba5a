use crate::config::feed::FeedConfig;
use crate::error::AppResult;
use crate::middleware::BasicAuthUser;
use crate::services::feed::{build_user_feed, ATOM_CONTENT_TYPE};
use crate::services::notice::NoticeService;
use axum::{http::header, response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;

#[utoipa::path(
    get,
    path = "/feeds/notices",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "Atom feed of the user's notices", content_type = "application/atom+xml", body = String),
        (status = 401, description = "Missing or wrong Basic credentials", body = crate::error::AppError),
    ),
    tag = "feeds"
)]
pub async fn notices_feed(
    BasicAuthUser(user): BasicAuthUser,
    Extension(db): Extension<DatabaseConnection>,
    Extension(config): Extension<FeedConfig>,
) -> AppResult<impl IntoResponse> {
    let items = NoticeService::new(db)
        .recent_for_feed(user.id, config.max_items)
        .await?;
    let now = chrono::Utc::now().naive_utc();
    let feed = build_user_feed(&config, &user, &items, now);

    Ok(([(header::CONTENT_TYPE, ATOM_CONTENT_TYPE)], feed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode, routing::get, Router};
    use tower::ServiceExt;

    #[tokio::test]
    async fn feed_without_credentials_is_challenged() {
        let app = Router::new().route("/feeds/notices", get(notices_feed));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/feeds/notices")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"Notices Feed\""
        );
    }

    #[tokio::test]
    async fn bearer_credentials_are_not_accepted() {
        let app = Router::new().route("/feeds/notices", get(notices_feed));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/feeds/notices")
                    .header(header::AUTHORIZATION, "Bearer some.jwt.token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
