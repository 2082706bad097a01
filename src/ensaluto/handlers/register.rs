//! Local account registration for the credentials path.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

use super::valid_email;
use crate::auth::password;
use crate::auth::store::{DynUserStore, NewUser};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    email: String,
    name: Option<String>,
    password: String,
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful"),
        (status = 400, description = "Invalid email or password"),
        (status = 409, description = "User with the specified email already exists"),
    ),
    tag = "register"
)]
#[instrument(skip_all)]
pub async fn register(
    store: Extension<DynUserStore>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let request: RegisterRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()),
    };

    if !valid_email(&request.email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string());
    }

    if request.password.is_empty() {
        return (StatusCode::BAD_REQUEST, "Invalid password".to_string());
    }

    debug!("registration for {}", request.email);

    // Best-effort uniqueness; a concurrent create for the same email is left
    // to the store's unique index.
    match store.find_by_email(&request.email).await {
        Ok(Some(_)) => {
            return (StatusCode::CONFLICT, "User already exists".to_string());
        }
        Ok(None) => {}
        Err(err) => {
            error!("Error checking existing user: {err:?}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error creating user".to_string(),
            );
        }
    }

    let digest = match password::hash(&request.password) {
        Ok(digest) => digest,
        Err(err) => {
            error!("Error hashing password: {err:?}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error creating user".to_string(),
            );
        }
    };

    match store
        .create(NewUser {
            email: request.email,
            name: request.name,
            image: None,
            password_digest: Some(digest),
            provider: "credentials".to_string(),
        })
        .await
    {
        Ok(_) => (StatusCode::CREATED, "Registration successful".to_string()),
        Err(err) => {
            error!("Error creating user: {err:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error creating user".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::{test_user, MemoryUserStore, UserStore};
    use std::sync::Arc;

    fn request(email: &str, password: &str) -> Option<Json<RegisterRequest>> {
        Some(Json(RegisterRequest {
            email: email.to_string(),
            name: Some("A".to_string()),
            password: password.to_string(),
        }))
    }

    #[tokio::test]
    async fn register_creates_credentials_user() {
        let store = Arc::new(MemoryUserStore::new());
        let dyn_store: DynUserStore = store.clone();

        let response = register(Extension(dyn_store), request("a@x.com", "pa55word"))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);

        let user = store
            .find_by_email("a@x.com")
            .await
            .ok()
            .flatten()
            .expect("user created");
        assert_eq!(user.provider, "credentials");
        let digest = user.password_digest.expect("digest stored");
        assert!(password::verify("pa55word", &digest));
    }

    #[tokio::test]
    async fn register_existing_email_conflicts() {
        let store = Arc::new(
            MemoryUserStore::new()
                .with_user(test_user("a@x.com"))
                .await,
        );
        let dyn_store: DynUserStore = store.clone();

        let response = register(Extension(dyn_store), request("a@x.com", "pa55word"))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn register_rejects_invalid_input() {
        let store: DynUserStore = Arc::new(MemoryUserStore::new());

        let response = register(Extension(store.clone()), request("not-an-email", "pa55word"))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = register(Extension(store), request("a@x.com", ""))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
