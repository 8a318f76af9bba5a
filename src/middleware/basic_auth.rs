use crate::{
    config::feed::FEED_REALM,
    error::AppError,
    models::UserModel,
    services::auth::AuthService,
    utils::parse_basic_credentials,
};
use axum::{extract::FromRequestParts, http::header};
use sea_orm::DatabaseConnection;

/// A user authenticated with HTTP Basic credentials.
///
/// Used by the feed, whose readers (feed aggregators) cannot carry bearer
/// tokens. Rejects with a `WWW-Authenticate` challenge.
#[derive(Debug, Clone)]
pub struct BasicAuthUser(pub UserModel);

impl<S> FromRequestParts<S> for BasicAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let (username, password) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(parse_basic_credentials)
            .ok_or(AppError::Challenge(FEED_REALM))?;

        let db = parts
            .extensions
            .get::<DatabaseConnection>()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("database connection missing from extensions"))?;

        match AuthService::new(db).authenticate(&username, &password).await {
            Ok(user) => Ok(BasicAuthUser(user)),
            Err(AppError::Unauthorized) => {
                tracing::debug!(%username, "rejected basic credentials for feed");
                Err(AppError::Challenge(FEED_REALM))
            }
            Err(e) => Err(e),
        }
    }
}
