#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt; // for `oneshot`

use calendario::app::build_app;
use calendario::config::{AppConfig, AppEnv, JwtConfig};
use calendario::state::AppState;

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: None,
        env: AppEnv::Development,
        jwt: JwtConfig {
            access_secret: "test-access-secret".into(),
            refresh_secret: "test-refresh-secret".into(),
            access_ttl_minutes: 15,
            refresh_ttl_days: 7,
        },
    }
}

pub fn test_app() -> Router {
    build_app(AppState::in_memory(test_config()))
}

/// Drives one request through the router and decodes the JSON body.
/// Non-JSON bodies come back as a plain string value.
pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

/// Registers a user and returns the full auth response body.
pub async fn register_user(app: &Router, email: &str, password: &str, name: &str) -> Value {
    let (status, body) = send_json(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(serde_json::json!({ "email": email, "password": password, "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body
}

/// Registers a throwaway user and returns just its access token.
pub async fn access_token_for(app: &Router, email: &str) -> String {
    let body = register_user(app, email, "Secret123!", "Test User").await;
    body["accessToken"]
        .as_str()
        .expect("accessToken in response")
        .to_string()
}
