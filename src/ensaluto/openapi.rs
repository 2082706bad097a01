use utoipa::OpenApi;

use crate::auth::SessionView;
use crate::ensaluto::handlers::{
    google::GoogleCallbackRequest, login::LoginRequest, register::RegisterRequest, AuthRedirect,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::ensaluto::handlers::health::health,
        crate::ensaluto::handlers::register::register,
        crate::ensaluto::handlers::login::login,
        crate::ensaluto::handlers::google::google_callback,
        crate::ensaluto::handlers::session::session,
        crate::ensaluto::handlers::session::logout,
        crate::ensaluto::handlers::session::signin,
    ),
    components(schemas(
        AuthRedirect,
        LoginRequest,
        GoogleCallbackRequest,
        RegisterRequest,
        SessionView,
    )),
    tags(
        (name = "auth", description = "Sign-in, session, and sign-out"),
        (name = "register", description = "Local account registration"),
        (name = "health", description = "Service health"),
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
