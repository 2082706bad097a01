//! Google OAuth callback endpoint.
//!
//! The client finishes the OAuth flow against Google and posts the resulting
//! ID token here. The token is verified against Google's tokeninfo endpoint
//! and checked for our client id before the asserted identity is accepted.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

use super::{login::finish_sign_in, AuthRedirect};
use crate::auth::callbacks::on_sign_in;
use crate::auth::store::DynUserStore;
use crate::auth::token::{enrich, SignInEvent, TokenClaims};
use crate::cli::globals::GlobalArgs;
use crate::ensaluto::APP_USER_AGENT;

const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct GoogleCallbackRequest {
    id_token: String,
}

/// Claims returned by Google's tokeninfo endpoint; only the fields consumed
/// here are modeled.
#[derive(Deserialize, Debug)]
struct TokenInfo {
    aud: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

#[utoipa::path(
    post,
    path = "/auth/callback/google",
    request_body = GoogleCallbackRequest,
    responses(
        (status = 200, description = "Sign-in successful", body = AuthRedirect),
        (status = 401, description = "Sign-in failed"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn google_callback(
    store: Extension<DynUserStore>,
    globals: Extension<GlobalArgs>,
    payload: Option<Json<GoogleCallbackRequest>>,
) -> impl IntoResponse {
    let request: GoogleCallbackRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let Some(event) = verify_id_token(&globals.google_client_id, &request.id_token).await else {
        return (StatusCode::UNAUTHORIZED, "Sign-in failed".to_string()).into_response();
    };

    // The gate never rejects a provider-authenticated user; it only makes
    // sure a backing user record exists.
    if !on_sign_in(store.as_ref(), &event).await {
        return (StatusCode::UNAUTHORIZED, "Sign-in failed".to_string()).into_response();
    }

    let claims = enrich(TokenClaims::for_event(&event), Some(&event), store.as_ref()).await;

    finish_sign_in(&claims, &globals)
}

/// Verify a Google ID token and turn it into a sign-in event.
///
/// Any verification failure, malformed token, wrong audience, or an
/// unreachable endpoint, yields `None` and therefore a rejected sign-in.
async fn verify_id_token(client_id: &str, id_token: &str) -> Option<SignInEvent> {
    // Operators can point this at a stub during development.
    let token_url = std::env::var("ENSALUTO_GOOGLE_TOKENINFO_URL")
        .unwrap_or_else(|_| GOOGLE_TOKENINFO_URL.to_string());

    let client = match Client::builder().user_agent(APP_USER_AGENT).build() {
        Ok(client) => client,
        Err(err) => {
            error!("Error creating reqwest client: {err:?}");
            return None;
        }
    };

    let response = match client
        .get(&token_url)
        .query(&[("id_token", id_token)])
        .send()
        .await
    {
        Ok(response) => response,
        Err(err) => {
            error!("Error verifying Google id token: {err:?}");
            return None;
        }
    };

    if response.status() != reqwest::StatusCode::OK {
        error!("Google id token rejected: {}", response.status());
        return None;
    }

    let info: TokenInfo = match response.json().await {
        Ok(info) => info,
        Err(err) => {
            error!("Error parsing tokeninfo response: {err:?}");
            return None;
        }
    };

    into_event(client_id, info)
}

fn into_event(client_id: &str, info: TokenInfo) -> Option<SignInEvent> {
    if info.aud != client_id {
        error!("Google id token audience mismatch");
        return None;
    }

    let email = info.email.filter(|email| !email.is_empty())?;

    debug!("google sign-in for {email}");

    Some(SignInEvent::OAuth {
        provider: "google".to_string(),
        email,
        name: info.name,
        picture: info.picture,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokeninfo(aud: &str, email: Option<&str>) -> TokenInfo {
        TokenInfo {
            aud: aud.to_string(),
            email: email.map(str::to_string),
            name: Some("A".to_string()),
            picture: Some("https://example.com/a.png".to_string()),
        }
    }

    #[test]
    fn into_event_accepts_matching_audience() {
        let event = into_event("client-id", tokeninfo("client-id", Some("a@x.com")));
        let Some(SignInEvent::OAuth {
            provider,
            email,
            name,
            picture,
        }) = event
        else {
            panic!("expected oauth event");
        };
        assert_eq!(provider, "google");
        assert_eq!(email, "a@x.com");
        assert_eq!(name.as_deref(), Some("A"));
        assert_eq!(picture.as_deref(), Some("https://example.com/a.png"));
    }

    #[test]
    fn into_event_rejects_wrong_audience() {
        assert!(into_event("client-id", tokeninfo("other-client", Some("a@x.com"))).is_none());
    }

    #[test]
    fn into_event_rejects_missing_email() {
        assert!(into_event("client-id", tokeninfo("client-id", None)).is_none());
        assert!(into_event("client-id", tokeninfo("client-id", Some(""))).is_none());
    }
}
