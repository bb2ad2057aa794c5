//! HTTP Basic authentication module.
//!
//! Implements constant-time comparison to mitigate timing attacks.

use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use subtle::ConstantTimeEq;

use crate::errors::AppError;

/// Realm advertised in the `WWW-Authenticate` challenge.
pub const REALM: &str = "dpl";

/// Expected basic auth credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// Basic auth layer function that takes the expected credentials as a parameter.
pub async fn basic_auth_layer(
    expected: Option<Credentials>,
    request: Request,
    next: Next,
) -> Response {
    // If no password is configured, allow all requests (dev mode)
    let Some(expected) = expected else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_basic);

    match provided {
        Some((user, password)) if credentials_match(&user, &password, &expected) => {
            next.run(request).await
        }
        Some((user, _)) => {
            tracing::warn!("Rejected credentials for user {:?}", user);
            unauthorized_response("Invalid credentials")
        }
        None => unauthorized_response("Missing or malformed basic auth credentials"),
    }
}

/// Decode an `Authorization: Basic ...` header value into user and password.
fn parse_basic(value: &str) -> Option<(String, String)> {
    let encoded = value.strip_prefix("Basic ")?.trim();
    let decoded = STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

fn credentials_match(user: &str, password: &str, expected: &Credentials) -> bool {
    // Evaluate both so a wrong user costs the same as a wrong password
    let user_ok = constant_time_compare(user, &expected.user);
    let password_ok = constant_time_compare(password, &expected.password);
    user_ok & password_ok
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Create an unauthorized response with a basic auth challenge.
fn unauthorized_response(message: &str) -> Response {
    let mut response = AppError::Unauthorized(message.to_string()).into_response();
    let challenge = format!("Basic realm=\"{}\"", REALM);
    if let Ok(value) = HeaderValue::from_str(&challenge) {
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, value);
    }
    response
}
