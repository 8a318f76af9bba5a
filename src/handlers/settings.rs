use crate::error::{AppError, AppResult};
use crate::handlers::notice_type::NoticeTypeResponse;
use crate::middleware::AuthUser;
use crate::models::{Medium, NoticeTypeModel};
use crate::response::ApiResponse;
use crate::services::notice_setting::{NoticeSettingService, SettingsRowInput};
use axum::{response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct MediumChoice {
    pub medium: Medium,
    pub label: String,
    pub send: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SettingsRowResponse {
    pub notice_type: NoticeTypeResponse,
    pub media: Vec<MediumChoice>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SettingsPageResponse {
    pub rows: Vec<SettingsRowResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SettingsForm {
    #[serde(default)]
    pub rows: Vec<SettingsRowInput>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SettingsUpdateResponse {
    pub rows: Vec<SettingsRowResponse>,
    pub created: u64,
    pub updated: u64,
}

fn render_rows(page: Vec<(NoticeTypeModel, Vec<(Medium, bool)>)>) -> Vec<SettingsRowResponse> {
    page.into_iter()
        .map(|(notice_type, choices)| SettingsRowResponse {
            notice_type: notice_type.into(),
            media: choices
                .into_iter()
                .map(|(medium, send)| MediumChoice {
                    medium,
                    label: medium.label().to_string(),
                    send,
                })
                .collect(),
        })
        .collect()
}

#[utoipa::path(
    get,
    path = "/api/v1/notices/settings",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Delivery preferences per notice type", body = SettingsPageResponse),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "settings"
)]
pub async fn get_settings(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let page = NoticeSettingService::new(db)
        .settings_page(auth_user.user_id)
        .await?;
    Ok(ApiResponse::ok(SettingsPageResponse {
        rows: render_rows(page),
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/notices/settings",
    security(("jwt_token" = [])),
    request_body = SettingsForm,
    responses(
        (status = 200, description = "Preferences saved; the updated page", body = SettingsUpdateResponse),
        (status = 400, description = "Invalid form, nothing saved", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "settings"
)]
pub async fn update_settings(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(form): Json<SettingsForm>,
) -> AppResult<impl IntoResponse> {
    let service = NoticeSettingService::new(db);
    let outcome = service.reconcile(auth_user.user_id, &form.rows).await?;
    let page = service.settings_page(auth_user.user_id).await?;

    Ok(ApiResponse::with_message(
        SettingsUpdateResponse {
            rows: render_rows(page),
            created: outcome.created,
            updated: outcome.updated,
        },
        format!("{} setting(s) saved", outcome.writes()),
    ))
}
