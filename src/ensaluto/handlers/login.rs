//! Credentials sign-in endpoint.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

use super::{session::session_cookie, AuthRedirect};
use crate::auth::callbacks::{on_sign_in, redirect};
use crate::auth::store::DynUserStore;
use crate::auth::token::{enrich, sign, SignInEvent, TokenClaims};
use crate::auth::validator::authenticate;
use crate::cli::globals::GlobalArgs;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Sign-in successful", body = AuthRedirect),
        (status = 401, description = "Sign-in failed"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    store: Extension<DynUserStore>,
    globals: Extension<GlobalArgs>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    debug!("login attempt for {}", request.email);

    // Malformed input and invalid credentials are indistinguishable here.
    let Some(user) = authenticate(store.as_ref(), &request.email, &request.password).await else {
        return (StatusCode::UNAUTHORIZED, "Sign-in failed".to_string()).into_response();
    };

    let event = SignInEvent::Credentials { user };

    if !on_sign_in(store.as_ref(), &event).await {
        return (StatusCode::UNAUTHORIZED, "Sign-in failed".to_string()).into_response();
    }

    // The credentials path mints a token without a durable id claim.
    let claims = enrich(TokenClaims::for_event(&event), Some(&event), store.as_ref()).await;

    finish_sign_in(&claims, &globals)
}

/// Sign the claims, set the session cookie, and hand back the redirect target.
pub(super) fn finish_sign_in(
    claims: &TokenClaims,
    globals: &GlobalArgs,
) -> axum::response::Response {
    let token = match sign(claims, &globals.secret) {
        Ok(token) => token,
        Err(err) => {
            error!("Error creating session token: {err:?}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error creating session".to_string(),
            )
                .into_response();
        }
    };

    let mut headers = HeaderMap::new();
    match session_cookie(globals, &token) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Error building session cookie: {err:?}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error creating session".to_string(),
            )
                .into_response();
        }
    }

    (
        StatusCode::OK,
        headers,
        Json(AuthRedirect {
            redirect: redirect(&globals.app_url),
        }),
    )
        .into_response()
}
