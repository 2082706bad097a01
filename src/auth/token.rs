//! Session token claims: mint, enrichment, signing.
//!
//! The token is the only session state the server keeps. Claims are stamped
//! at mint time and re-read on every session projection; nothing outside this
//! module and the HTTP handlers ever touches the signed form.

use anyhow::{Context, Result};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::error;

use super::reconcile;
use super::store::{UserRecord, UserStore};

/// Token lifetime. Rotation happens implicitly at sign-in; there is no
/// server-side refresh endpoint.
pub const SESSION_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;

/// Signed claim set underlying a session.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TokenClaims {
    /// Durable user id, stamped only on Google sign-ins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub iat: u64,
    pub exp: u64,
}

/// A verified sign-in, carrying only the fields each path guarantees.
#[derive(Clone, Debug)]
pub enum SignInEvent {
    /// Local email/password sign-in; the validator already resolved the record.
    Credentials { user: UserRecord },
    /// Federated sign-in asserted by the OAuth provider.
    OAuth {
        provider: String,
        email: String,
        name: Option<String>,
        picture: Option<String>,
    },
}

impl TokenClaims {
    /// Seed fresh claims from a sign-in event.
    #[must_use]
    pub fn for_event(event: &SignInEvent) -> Self {
        let (email, name, picture) = match event {
            SignInEvent::Credentials { user } => (
                Some(user.email.clone()),
                user.name.clone(),
                user.image.clone(),
            ),
            SignInEvent::OAuth {
                email,
                name,
                picture,
                ..
            } => (Some(email.clone()), name.clone(), picture.clone()),
        };

        let now = unix_now();
        Self {
            id: None,
            email,
            name,
            picture,
            iat: now,
            exp: now + SESSION_TTL_SECONDS,
        }
    }
}

/// Stamp durable-identity claims into the token.
///
/// Only a fresh Google sign-in carrying both email and name triggers
/// reconciliation; everything else, including the credentials path, leaves
/// the claims untouched. A reconciliation fault is logged and leaves `id`
/// unset so a store outage degrades identity linkage instead of blocking
/// session issuance.
pub async fn enrich(
    mut claims: TokenClaims,
    event: Option<&SignInEvent>,
    store: &dyn UserStore,
) -> TokenClaims {
    if let Some(SignInEvent::OAuth {
        provider,
        email,
        name: Some(name),
        ..
    }) = event
    {
        if provider == "google" && !email.is_empty() && !name.is_empty() {
            match reconcile::ensure_user_for_token(store, email, name).await {
                Ok(user) => claims.id = Some(user.id.to_string()),
                Err(err) => error!("Error handling Google user: {err:?}"),
            }
        }
    }

    claims
}

/// Sign claims into the compact token form.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn sign(claims: &TokenClaims, secret: &SecretString) -> Result<String> {
    jsonwebtoken::encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .context("failed to sign session token")
}

/// Decode and validate a signed token. Expired or tampered tokens are simply
/// not a session.
#[must_use]
pub fn decode(token: &str, secret: &SecretString) -> Option<TokenClaims> {
    let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());
    jsonwebtoken::decode::<TokenClaims>(token, &key, &Validation::default())
        .map(|data| data.claims)
        .ok()
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::{test_user, MemoryUserStore};

    fn google_event(email: &str, name: Option<&str>) -> SignInEvent {
        SignInEvent::OAuth {
            provider: "google".to_string(),
            email: email.to_string(),
            name: name.map(str::to_string),
            picture: Some("https://example.com/a.png".to_string()),
        }
    }

    #[tokio::test]
    async fn google_sign_in_creates_user_and_stamps_id() {
        let store = MemoryUserStore::new();
        let event = google_event("a@x.com", Some("A"));

        let claims = TokenClaims::for_event(&event);
        let claims = enrich(claims, Some(&event), &store).await;

        let user = store
            .find_by_email("a@x.com")
            .await
            .ok()
            .flatten()
            .expect("user created");
        assert_eq!(user.provider, "google");
        assert_eq!(claims.id, Some(user.id.to_string()));
        assert_eq!(claims.email.as_deref(), Some("a@x.com"));
        assert_eq!(claims.name.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn repeat_google_sign_in_reuses_existing_id() {
        let store = MemoryUserStore::new();
        let event = google_event("a@x.com", Some("A"));

        let first = enrich(TokenClaims::for_event(&event), Some(&event), &store).await;
        let second = enrich(TokenClaims::for_event(&event), Some(&event), &store).await;

        assert_eq!(first.id, second.id);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn credentials_sign_in_never_stamps_id() {
        let store = MemoryUserStore::new();
        let event = SignInEvent::Credentials {
            user: test_user("a@x.com"),
        };

        let claims = enrich(TokenClaims::for_event(&event), Some(&event), &store).await;

        assert!(claims.id.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn refresh_without_event_leaves_claims_untouched() {
        let store = MemoryUserStore::new();
        let event = google_event("a@x.com", Some("A"));
        let minted = enrich(TokenClaims::for_event(&event), Some(&event), &store).await;

        let refreshed = enrich(minted.clone(), None, &store).await;

        assert_eq!(refreshed, minted);
    }

    #[tokio::test]
    async fn missing_name_skips_reconciliation() {
        let store = MemoryUserStore::new();
        let event = google_event("a@x.com", None);

        let claims = enrich(TokenClaims::for_event(&event), Some(&event), &store).await;

        assert!(claims.id.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn non_google_provider_skips_reconciliation() {
        let store = MemoryUserStore::new();
        let event = SignInEvent::OAuth {
            provider: "github".to_string(),
            email: "a@x.com".to_string(),
            name: Some("A".to_string()),
            picture: None,
        };

        let claims = enrich(TokenClaims::for_event(&event), Some(&event), &store).await;

        assert!(claims.id.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn reconciliation_fault_degrades_instead_of_failing() {
        let store = MemoryUserStore::new();
        store.set_failing(true);
        let event = google_event("a@x.com", Some("A"));

        // Token issuance proceeds; only the id claim is missing.
        let claims = enrich(TokenClaims::for_event(&event), Some(&event), &store).await;

        assert!(claims.id.is_none());
        assert_eq!(claims.email.as_deref(), Some("a@x.com"));
    }

    #[test]
    fn sign_then_decode_round_trip() -> anyhow::Result<()> {
        let secret = SecretString::from("sekreto");
        let event = google_event("a@x.com", Some("A"));
        let claims = TokenClaims::for_event(&event);

        let token = sign(&claims, &secret)?;
        assert_eq!(decode(&token, &secret), Some(claims));

        Ok(())
    }

    #[test]
    fn decode_rejects_wrong_secret_and_garbage() -> anyhow::Result<()> {
        let secret = SecretString::from("sekreto");
        let event = google_event("a@x.com", Some("A"));
        let token = sign(&TokenClaims::for_event(&event), &secret)?;

        assert!(decode(&token, &SecretString::from("alia")).is_none());
        assert!(decode("not-a-token", &secret).is_none());

        Ok(())
    }
}
