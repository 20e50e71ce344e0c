use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::{auth::repo_types::User, error::AppError, state::AppState};

/// Reads the `Authorization: Bearer <token>` header, if any.
pub(crate) fn bearer_token(parts: &Parts) -> Option<&str> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Validates the bearer token and loads the user it names. Rejects the
/// request before the handler runs when either step fails.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::MissingToken)?;

        let user_id = state.keys.validate(token).map_err(|e| {
            warn!(reason = %e, "bearer token rejected");
            AppError::Token(e)
        })?;

        let user = state
            .credentials
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %user_id, "token for unknown user");
                AppError::UserNotFound
            })?;

        Ok(CurrentUser(user))
    }
}
