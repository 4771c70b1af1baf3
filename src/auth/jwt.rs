use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::auth::repo::User;
use crate::config::JwtConfig;
use crate::state::AppState;

/// Claims carried by an access token. Email and name are display data;
/// authorization always re-resolves the user by id.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub iat: usize,
    pub exp: usize,
}

/// Claims carried by a refresh token: just enough to mint a new pair.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    pub id: i64,
    pub iat: usize,
    pub exp: usize,
}

/// Why a token failed verification. Expiry is reported apart from every
/// other failure so the client can tell a stale session from a forgery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Invalid,
}

/// Signing and verification keys for both token classes. The secrets are
/// distinct so a leaked token of one class cannot forge the other.
#[derive(Clone)]
pub struct JwtKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn from_config(jwt: &JwtConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(jwt.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(jwt.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(jwt.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(jwt.refresh_secret.as_bytes()),
            access_ttl: Duration::from_secs((jwt.access_ttl_minutes as u64) * 60),
            refresh_ttl: Duration::from_secs((jwt.refresh_ttl_days as u64) * 60 * 60 * 24),
        }
    }

    fn stamps(ttl: Duration) -> (usize, usize) {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        (now.unix_timestamp() as usize, exp.unix_timestamp() as usize)
    }

    pub fn sign_access(&self, user: &User) -> anyhow::Result<String> {
        let (iat, exp) = Self::stamps(self.access_ttl);
        let claims = AccessClaims {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            iat,
            exp,
        };
        let token = encode(&Header::default(), &claims, &self.access_encoding)?;
        debug!(user_id = %user.id, "access token signed");
        Ok(token)
    }

    pub fn sign_refresh(&self, user_id: i64) -> anyhow::Result<String> {
        let (iat, exp) = Self::stamps(self.refresh_ttl);
        let claims = RefreshClaims {
            id: user_id,
            iat,
            exp,
        };
        let token = encode(&Header::default(), &claims, &self.refresh_encoding)?;
        debug!(user_id = %user_id, "refresh token signed");
        Ok(token)
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let data = decode::<AccessClaims>(token, &self.access_decoding, &Validation::default())
            .map_err(classify)?;
        Ok(data.claims)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let data = decode::<RefreshClaims>(token, &self.refresh_decoding, &Validation::default())
            .map_err(classify)?;
        Ok(data.claims)
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    }
}
