//! Credential validation for the email/password path.

use tracing::error;

use super::password;
use super::store::{UserRecord, UserStore};

/// Validate a local email/password pair against the user store.
///
/// Returns the matching [`UserRecord`] on a positive digest match and `None`
/// otherwise. Malformed input (either field empty) short-circuits before any
/// store access, and infrastructure faults are logged and converted to `None`
/// so authentication fails closed. Callers cannot distinguish the cases; a
/// failed sign-in looks the same regardless of the reason.
pub async fn authenticate(
    store: &dyn UserStore,
    email: &str,
    password: &str,
) -> Option<UserRecord> {
    if email.is_empty() || password.is_empty() {
        return None;
    }

    match store.find_by_email(email).await {
        Ok(Some(user)) => {
            // Accounts registered through OAuth carry no digest; the
            // comparison fails rather than erroring.
            let digest = user.password_digest.as_deref()?;
            if password::verify(password, digest) {
                Some(user)
            } else {
                None
            }
        }
        Ok(None) => None,
        Err(err) => {
            error!("Internal error while signing in: {err:?}");
            None
        }
    }
}
