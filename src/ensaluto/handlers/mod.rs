pub mod health;
pub use self::health::health;

pub mod register;
pub use self::register::register;

pub mod login;
pub use self::login::login;

pub mod google;
pub use self::google::google_callback;

pub mod session;
pub use self::session::{logout, session, signin};

// common functions for the handlers
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body returned by every successful sign-in, carrying the post-login target.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AuthRedirect {
    pub redirect: String,
}

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}
