//! Session projection: the outward-facing, read-only view of a token.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::token::TokenClaims;

/// Per-request projection of a token, recreated on every session read.
/// Consumers treat it as read-only; the durable id claim is never exposed.
#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SessionView {
    pub email: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Project token claims onto a session view. Pure; no store access.
#[must_use]
pub fn project(claims: &TokenClaims) -> SessionView {
    SessionView {
        email: claims.email.clone(),
        image: claims.picture.clone(),
        name: claims.name.clone(),
    }
}
