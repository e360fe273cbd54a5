use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;

/// Header the session layer in front of the API sets for authenticated requests.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller. The id is opaque to this service.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: String,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                tracing::warn!("missing session user id, authentication denied");
                AppError::Unauthorized
            })?;

        Ok(AuthUser { id: id.to_string() })
    }
}
