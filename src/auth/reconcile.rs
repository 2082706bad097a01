//! Identity reconciliation: find-or-create of a user record for a verified
//! external identity.
//!
//! The two call sites intentionally use different provider defaults. The
//! sign-in gate tags first-time users with the account's provider, falling
//! back to "Google"; token enrichment always tags them "google". Both are
//! kept as distinct entry points so neither policy drifts.

use anyhow::Result;

use super::store::{NewUser, UserRecord, UserStore};

/// Reconcile at the sign-in gate: return the existing record for the email,
/// or create one tagged with the account's provider (default "Google").
///
/// An existing record is returned unchanged. A Google login never overwrites
/// a locally-registered name or image, and vice versa.
///
/// # Errors
///
/// Returns an error if the store lookup or create fails.
pub async fn ensure_user_at_gate(
    store: &dyn UserStore,
    email: &str,
    name: Option<&str>,
    provider: Option<&str>,
) -> Result<UserRecord> {
    if let Some(existing) = store.find_by_email(email).await? {
        return Ok(existing);
    }

    store
        .create(NewUser {
            email: email.to_string(),
            name: name.map(str::to_string),
            image: None,
            password_digest: None,
            provider: provider.unwrap_or("Google").to_string(),
        })
        .await
}

/// Reconcile during token enrichment: return the existing record for the
/// email, or create one tagged "google".
///
/// # Errors
///
/// Returns an error if the store lookup or create fails.
pub async fn ensure_user_for_token(
    store: &dyn UserStore,
    email: &str,
    name: &str,
) -> Result<UserRecord> {
    if let Some(existing) = store.find_by_email(email).await? {
        return Ok(existing);
    }

    store
        .create(NewUser {
            email: email.to_string(),
            name: Some(name.to_string()),
            image: None,
            password_digest: None,
            provider: "google".to_string(),
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::{test_user, MemoryUserStore};

    #[tokio::test]
    async fn gate_creates_with_account_provider() -> Result<()> {
        let store = MemoryUserStore::new();

        let user = ensure_user_at_gate(&store, "a@x.com", Some("A"), Some("github")).await?;
        assert_eq!(user.provider, "github");
        assert_eq!(user.name.as_deref(), Some("A"));
        assert!(user.password_digest.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn gate_defaults_provider_when_absent() -> Result<()> {
        let store = MemoryUserStore::new();

        let user = ensure_user_at_gate(&store, "a@x.com", Some("A"), None).await?;
        assert_eq!(user.provider, "Google");

        Ok(())
    }

    #[tokio::test]
    async fn token_path_hardcodes_google() -> Result<()> {
        let store = MemoryUserStore::new();

        let user = ensure_user_for_token(&store, "a@x.com", "A").await?;
        assert_eq!(user.provider, "google");

        Ok(())
    }

    #[tokio::test]
    async fn existing_record_returned_unchanged() -> Result<()> {
        let mut existing = test_user("a@x.com");
        existing.name = Some("Local Name".to_string());
        let store = MemoryUserStore::new().with_user(existing.clone()).await;

        let from_gate = ensure_user_at_gate(&store, "a@x.com", Some("OAuth Name"), None).await?;
        assert_eq!(from_gate, existing);

        let from_token = ensure_user_for_token(&store, "a@x.com", "OAuth Name").await?;
        assert_eq!(from_token, existing);

        // No create, no field sync.
        assert_eq!(store.len().await, 1);

        Ok(())
    }

    #[tokio::test]
    async fn repeated_reconciliation_is_idempotent() -> Result<()> {
        let store = MemoryUserStore::new();

        let first = ensure_user_for_token(&store, "a@x.com", "A").await?;
        let second = ensure_user_for_token(&store, "a@x.com", "A").await?;
        assert_eq!(first.id, second.id);
        assert_eq!(store.len().await, 1);

        Ok(())
    }
}
