//! Sign-in gate and redirect policy.

use tracing::error;

use super::reconcile;
use super::store::UserStore;
use super::token::SignInEvent;

/// Sign-in gate, invoked after a provider has already authenticated the user.
///
/// Its sole job is to guarantee a backing user record exists; it never
/// rejects a sign-in, so the returned allow decision is always `true`. A
/// store fault is logged and the sign-in proceeds without the guarantee.
pub async fn on_sign_in(store: &dyn UserStore, event: &SignInEvent) -> bool {
    let (email, name, provider) = match event {
        SignInEvent::Credentials { user } => {
            (user.email.as_str(), user.name.as_deref(), Some("credentials"))
        }
        SignInEvent::OAuth {
            provider,
            email,
            name,
            ..
        } => (email.as_str(), name.as_deref(), Some(provider.as_str())),
    };

    if let Err(err) = reconcile::ensure_user_at_gate(store, email, name, provider).await {
        error!("Sign-in gate failed to ensure user record: {err:?}");
    }

    true
}

/// Redirect policy: always route to the application root after any sign-in,
/// ignoring whatever deep link was originally requested.
#[must_use]
pub fn redirect(base_url: &str) -> String {
    format!("{base_url}/")
}
