//! Session endpoints: projection, logout, and the sign-in entry redirect.

use axum::{
    extract::Extension,
    http::{
        header::{InvalidHeaderValue, AUTHORIZATION, COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Redirect},
    Json,
};

use crate::auth::token::{self, SESSION_TTL_SECONDS};
use crate::auth::{project, SessionView};
use crate::cli::globals::GlobalArgs;

const SESSION_COOKIE_NAME: &str = "ensaluto_session";

#[utoipa::path(
    get,
    path = "/auth/session",
    responses(
        (status = 200, description = "Session is active", body = SessionView),
        (status = 204, description = "No active session")
    ),
    tag = "auth"
)]
pub async fn session(headers: HeaderMap, globals: Extension<GlobalArgs>) -> impl IntoResponse {
    // A missing cookie is simply "no session"; never distinguish why.
    let Some(raw) = extract_session_token(&headers) else {
        return StatusCode::NO_CONTENT.into_response();
    };

    match token::decode(&raw, &globals.secret) {
        Some(claims) => (StatusCode::OK, Json(project(&claims))).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tag = "auth"
)]
pub async fn logout(globals: Extension<GlobalArgs>) -> impl IntoResponse {
    // The token is the only session state, so clearing the cookie is enough.
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(&globals) {
        response_headers.insert(SET_COOKIE, cookie);
    }
    (StatusCode::NO_CONTENT, response_headers).into_response()
}

#[utoipa::path(
    get,
    path = "/auth/signin",
    responses(
        (status = 307, description = "Redirect to the sign-in page")
    ),
    tag = "auth"
)]
pub async fn signin(globals: Extension<GlobalArgs>) -> impl IntoResponse {
    Redirect::temporary(&globals.signin_path)
}

/// Build a secure `HttpOnly` cookie carrying the session token.
pub(super) fn session_cookie(
    globals: &GlobalArgs,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    // Only mark cookies secure when the application is served over HTTPS.
    let secure = globals.app_url.starts_with("https://");
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_TTL_SECONDS}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie(globals: &GlobalArgs) -> Result<HeaderValue, InvalidHeaderValue> {
    let secure = globals.app_url.starts_with("https://");
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE_NAME {
            return Some(val.to_string());
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
