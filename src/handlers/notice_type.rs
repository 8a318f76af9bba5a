use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::NoticeTypeModel;
use crate::response::ApiResponse;
use crate::services::notice_type::NoticeTypeService;
use axum::{response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NoticeTypeResponse {
    pub id: i32,
    pub label: String,
    pub display: String,
    pub description: String,
    pub default_level: i32,
}

impl From<NoticeTypeModel> for NoticeTypeResponse {
    fn from(t: NoticeTypeModel) -> Self {
        Self {
            id: t.id,
            label: t.label,
            display: t.display,
            description: t.description,
            default_level: t.default_level,
        }
    }
}

fn default_level() -> i32 {
    2
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateNoticeTypeRequest {
    /// Machine label, e.g. `comment_posted`
    #[validate(length(min = 1, max = 40))]
    pub label: String,
    #[validate(length(min = 1, max = 50))]
    pub display: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0))]
    #[serde(default = "default_level")]
    pub default_level: i32,
}

#[utoipa::path(
    get,
    path = "/api/v1/notice-types",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "All notice types", body = Vec<NoticeTypeResponse>),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "notice-types"
)]
pub async fn list_notice_types(
    Extension(db): Extension<DatabaseConnection>,
    _auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let types = NoticeTypeService::new(db).list().await?;
    let items: Vec<NoticeTypeResponse> = types.into_iter().map(Into::into).collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/notice-types",
    security(("jwt_token" = [])),
    request_body = CreateNoticeTypeRequest,
    responses(
        (status = 200, description = "Notice type created", body = NoticeTypeResponse),
        (status = 403, description = "Superuser required", body = AppError),
        (status = 409, description = "Label already taken", body = AppError),
    ),
    tag = "notice-types"
)]
pub async fn create_notice_type(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<CreateNoticeTypeRequest>,
) -> AppResult<impl IntoResponse> {
    auth_user.require_superuser()?;
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let created = NoticeTypeService::new(db)
        .create(
            &payload.label,
            &payload.display,
            &payload.description,
            payload.default_level,
        )
        .await?;
    Ok(ApiResponse::ok(NoticeTypeResponse::from(created)))
}
