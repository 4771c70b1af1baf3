use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::{error, warn};

use crate::auth::jwt::{JwtKeys, TokenError};
use crate::auth::repo::UserStore;
use crate::error::ApiError;
use crate::state::AppState;

/// Identity attached to a request once its access token checks out.
/// Re-resolved from the store on every request; the embedded email and
/// name in the token are display data only.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub name: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::NoToken)?;

        let token = header.strip_prefix("Bearer ").ok_or(ApiError::InvalidToken)?;

        let keys = JwtKeys::from_ref(&state);
        let claims = keys.verify_access(token).map_err(|e| match e {
            TokenError::Expired => {
                warn!("access token expired");
                ApiError::TokenExpired
            }
            TokenError::Invalid => {
                warn!("access token rejected");
                ApiError::InvalidToken
            }
        })?;

        // Lookup failures stay behind the auth boundary as a 401
        let user = match state.users.find_by_id(claims.id).await {
            Ok(user) => user,
            Err(e) => {
                error!(error = %e, user_id = %claims.id, "user lookup failed during auth");
                return Err(ApiError::InvalidToken);
            }
        };
        let user = user.ok_or(ApiError::UserNotFound)?;

        Ok(CurrentUser {
            id: user.id,
            email: user.email,
            name: user.name,
        })
    }
}
