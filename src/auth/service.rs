use tracing::{info, warn};

use crate::auth::dto::{AuthResponse, TokenPair};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::{CreateUserError, User, UserStore};
use crate::error::{ApiError, CredentialField};
use crate::settings::repo::{NewSetting, SettingStore};
use crate::state::AppState;

fn issue_pair(keys: &JwtKeys, user: &User) -> anyhow::Result<(String, String)> {
    let access = keys.sign_access(user)?;
    let refresh = keys.sign_refresh(user.id)?;
    Ok((access, refresh))
}

/// Creates the account, its default settings row, and a first token pair.
pub async fn register(
    state: &AppState,
    email: String,
    password: String,
    name: String,
) -> Result<AuthResponse, ApiError> {
    match state.users.find_by_email(&email).await {
        Ok(Some(_)) => {
            warn!(email = %email, "registration rejected: email already registered");
            return Err(ApiError::UserExists);
        }
        Ok(None) => {}
        Err(e) => return Err(ApiError::internal("error.registering_user", e, &state.config)),
    }

    // Argon2 is CPU-bound, keep it off the async scheduler
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::internal("error.registering_user", e.into(), &state.config))?
        .map_err(|e| ApiError::internal("error.registering_user", e, &state.config))?;

    let user = match state.users.create(&email, &hash, &name).await {
        Ok(user) => user,
        Err(CreateUserError::EmailTaken) => {
            // The pre-check can lose against a concurrent insert; the
            // unique index is what actually decides.
            warn!(email = %email, "registration lost the unique-email race");
            return Err(ApiError::UserExists);
        }
        Err(CreateUserError::Store(e)) => {
            return Err(ApiError::internal("error.registering_user", e, &state.config));
        }
    };

    if let Err(e) = state.settings.create(user.id, NewSetting::default()).await {
        return Err(ApiError::internal("error.registering_user", e, &state.config));
    }

    let keys = JwtKeys::from_config(&state.config.jwt);
    let (access_token, refresh_token) = issue_pair(&keys, &user)
        .map_err(|e| ApiError::internal("error.registering_user", e, &state.config))?;

    info!(user_id = %user.id, "user registered");
    Ok(AuthResponse {
        user,
        access_token,
        refresh_token,
    })
}

/// Verifies credentials and returns the user with a fresh token pair.
pub async fn login(
    state: &AppState,
    email: String,
    password: String,
) -> Result<AuthResponse, ApiError> {
    let user = match state.users.find_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!(email = %email, "login rejected: unknown email");
            return Err(ApiError::InvalidCredentials(CredentialField::Email));
        }
        Err(e) => return Err(ApiError::internal("error.logging_in", e, &state.config)),
    };

    let hash = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::internal("error.logging_in", e.into(), &state.config))?;
    if !matches {
        warn!(email = %email, "login rejected: wrong password");
        return Err(ApiError::InvalidCredentials(CredentialField::Password));
    }

    let keys = JwtKeys::from_config(&state.config.jwt);
    let (access_token, refresh_token) = issue_pair(&keys, &user)
        .map_err(|e| ApiError::internal("error.logging_in", e, &state.config))?;

    info!(user_id = %user.id, "user logged in");
    Ok(AuthResponse {
        user,
        access_token,
        refresh_token,
    })
}

/// Exchanges a valid refresh token for a new pair. The user is looked up
/// again so tokens for deleted accounts stop working.
pub async fn refresh(
    state: &AppState,
    refresh_token: Option<String>,
) -> Result<TokenPair, ApiError> {
    let token = match refresh_token.as_deref() {
        Some(token) if !token.is_empty() => token,
        _ => return Err(ApiError::RefreshTokenRequired),
    };

    let keys = JwtKeys::from_config(&state.config.jwt);
    let claims = keys.verify_refresh(token).map_err(|err| {
        warn!(?err, "refresh rejected: token failed verification");
        ApiError::InvalidRefreshToken
    })?;

    let user = match state.users.find_by_id(claims.id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!(user_id = %claims.id, "refresh rejected: user no longer exists");
            return Err(ApiError::InvalidRefreshToken);
        }
        Err(e) => return Err(ApiError::internal("error.refreshing_token", e, &state.config)),
    };

    let (access_token, refresh_token) = issue_pair(&keys, &user)
        .map_err(|e| ApiError::internal("error.refreshing_token", e, &state.config))?;

    info!(user_id = %user.id, "session tokens refreshed");
    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}
