use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::Medium;
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::notice::{
    Dispatched, NoticeFilter, NoticeMutation, NoticeService, NoticeWithType,
};
use crate::utils::{redirect::NOTICES_PATH, safe_next};
use axum::{
    extract::{Path, Query},
    response::{IntoResponse, Redirect},
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct NoticeResponse {
    pub id: i32,
    pub notice_type: Option<String>,
    pub notice_type_display: Option<String>,
    pub message: String,
    pub added: String,
    pub unseen: bool,
    pub archived: bool,
    pub on_site: bool,
}

impl From<NoticeWithType> for NoticeResponse {
    fn from((n, notice_type): NoticeWithType) -> Self {
        let (label, display) = match notice_type {
            Some(t) => (Some(t.label), Some(t.display)),
            None => (None, None),
        };
        Self {
            id: n.id,
            notice_type: label,
            notice_type_display: display,
            message: n.message,
            added: n.added.to_string(),
            unseen: n.unseen,
            archived: n.archived,
            on_site: n.on_site,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NoticeListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// List archived notices instead of the inbox
    pub archived: Option<bool>,
    pub unseen: Option<bool>,
    pub on_site: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NextQuery {
    /// Local path to redirect to afterwards
    pub next: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UnseenCountResponse {
    pub count: u64,
}

#[utoipa::path(
    get,
    path = "/api/v1/notices",
    security(("jwt_token" = [])),
    params(NoticeListQuery),
    responses(
        (status = 200, description = "The current user's notices", body = PaginatedResponse<NoticeResponse>),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "notices"
)]
pub async fn list_notices(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<NoticeListQuery>,
) -> AppResult<impl IntoResponse> {
    let (page, per_page) = PaginationQuery {
        page: params.page,
        per_page: params.per_page,
    }
    .resolve();
    let filter = NoticeFilter {
        archived: params.archived.unwrap_or(false),
        unseen: params.unseen,
        on_site: params.on_site,
    };

    let service = NoticeService::new(db);
    let (notices, total) = service
        .list_for_user(auth_user.user_id, filter, page, per_page)
        .await?;
    let items = notices.into_iter().map(NoticeResponse::from).collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/notices/unseen-count",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Unseen notice count", body = UnseenCountResponse),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "notices"
)]
pub async fn unseen_count(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let count = NoticeService::new(db)
        .unseen_count(auth_user.user_id)
        .await?;
    Ok(ApiResponse::ok(UnseenCountResponse { count }))
}

#[utoipa::path(
    get,
    path = "/api/v1/notices/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Notice ID")),
    responses(
        (status = 200, description = "The notice", body = NoticeResponse),
        (status = 404, description = "No such notice for this user", body = AppError),
    ),
    tag = "notices"
)]
pub async fn get_notice(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let notice = NoticeService::new(db)
        .get_for_user(id, auth_user.user_id)
        .await?;
    Ok(ApiResponse::ok(NoticeResponse::from(notice)))
}

#[utoipa::path(
    post,
    path = "/api/v1/notices/{id}/archive",
    security(("jwt_token" = [])),
    params(
        ("id" = i32, Path, description = "Notice ID"),
        NextQuery,
    ),
    responses(
        (status = 303, description = "Redirect to `next`, whether or not the notice was archived"),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "notices"
)]
pub async fn archive_notice(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Query(query): Query<NextQuery>,
) -> AppResult<Redirect> {
    let outcome = NoticeService::new(db).archive(id, &auth_user).await?;
    log_mutation("archive", id, &auth_user, outcome);
    Ok(Redirect::to(safe_next(query.next.as_deref())))
}

#[utoipa::path(
    post,
    path = "/api/v1/notices/{id}/delete",
    security(("jwt_token" = [])),
    params(
        ("id" = i32, Path, description = "Notice ID"),
        NextQuery,
    ),
    responses(
        (status = 303, description = "Redirect to `next`, whether or not the notice was deleted"),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "notices"
)]
pub async fn delete_notice(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Query(query): Query<NextQuery>,
) -> AppResult<Redirect> {
    let outcome = NoticeService::new(db).delete(id, &auth_user).await?;
    log_mutation("delete", id, &auth_user, outcome);
    Ok(Redirect::to(safe_next(query.next.as_deref())))
}

fn log_mutation(action: &str, id: i32, actor: &AuthUser, outcome: NoticeMutation) {
    match outcome {
        NoticeMutation::Applied => {
            tracing::info!(action, notice_id = id, user_id = actor.user_id, "notice mutated")
        }
        NoticeMutation::Denied => tracing::warn!(
            action,
            notice_id = id,
            user_id = actor.user_id,
            "refused to mutate another user's notice"
        ),
        NoticeMutation::Missing => {
            tracing::debug!(action, notice_id = id, "notice not found")
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/notices/mark-all-seen",
    security(("jwt_token" = [])),
    responses(
        (status = 303, description = "Redirect to the notice list"),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "notices"
)]
pub async fn mark_all_seen(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<Redirect> {
    let marked = NoticeService::new(db)
        .mark_all_seen(auth_user.user_id)
        .await?;
    tracing::debug!(user_id = auth_user.user_id, marked, "marked notices seen");
    Ok(Redirect::to(NOTICES_PATH))
}

fn default_on_site() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DispatchRequest {
    /// Recipient user ids
    #[validate(length(min = 1, max = 1000))]
    pub users: Vec<i32>,
    /// Notice type label
    #[validate(length(min = 1, max = 40))]
    pub label: String,
    #[validate(length(min = 1))]
    pub message: String,
    #[serde(default = "default_on_site")]
    pub on_site: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DispatchedResponse {
    pub user_id: i32,
    pub notice_id: i32,
    /// Media the recipient's preferences ask to deliver on
    pub media: Vec<Medium>,
}

impl From<Dispatched> for DispatchedResponse {
    fn from(d: Dispatched) -> Self {
        Self {
            user_id: d.user_id,
            notice_id: d.notice_id,
            media: d.media,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/notices",
    security(("jwt_token" = [])),
    request_body = DispatchRequest,
    responses(
        (status = 200, description = "Notices created", body = Vec<DispatchedResponse>),
        (status = 403, description = "Superuser required", body = AppError),
        (status = 404, description = "Unknown notice type", body = AppError),
    ),
    tag = "notices"
)]
pub async fn dispatch_notice(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<DispatchRequest>,
) -> AppResult<impl IntoResponse> {
    auth_user.require_superuser()?;
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let dispatched = NoticeService::new(db)
        .dispatch(
            &payload.users,
            &payload.label,
            &payload.message,
            payload.on_site,
        )
        .await?;
    let items: Vec<DispatchedResponse> = dispatched.into_iter().map(Into::into).collect();
    Ok(ApiResponse::ok(items))
}
