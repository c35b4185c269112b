use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::models::User;
use crate::repositories;

/// Caller resolved from the bearer token. Handlers pass it on explicitly.
pub(crate) struct CurrentUser(pub(crate) User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let claims = security::verify_token(token, app_state.settings())
            .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

        let user = repositories::users::find_by_id(app_state.db(), &claims.sub)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load user"))?;

        let Some(user) = user else {
            return Err(ApiError::Unauthorized("User not found"));
        };

        Ok(CurrentUser(user))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Capability {
    /// Reading data that belongs to `owner`.
    ReadOwn,
    /// Changing authored content owned by `owner`; requires an authoring role.
    WriteOwn,
    /// Creating new authored content.
    Author,
    /// Platform-wide administration.
    AdminOverride,
}

/// Single authorization gate. Admins hold every capability.
pub(crate) fn authorize(
    user: &User,
    capability: Capability,
    owner_id: Option<&str>,
) -> Result<(), ApiError> {
    if user.role.is_admin() {
        return Ok(());
    }

    let is_owner = owner_id.is_some_and(|owner| owner == user.id);
    let allowed = match capability {
        Capability::ReadOwn => is_owner,
        Capability::WriteOwn => is_owner && user.role.can_author(),
        Capability::Author => user.role.can_author(),
        Capability::AdminOverride => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(ApiError::Forbidden(match capability {
            Capability::AdminOverride => "Admin access required",
            Capability::Author => "Teacher or admin role required",
            Capability::ReadOwn | Capability::WriteOwn => "Not enough permissions",
        }))
    }
}
