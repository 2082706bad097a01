use secrecy::SecretString;

/// Immutable configuration shared by every sign-in and session request.
/// Built once at startup from the CLI matches, then passed by reference.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub secret: SecretString,
    pub google_client_id: String,
    pub google_client_secret: SecretString,
    pub app_url: String,
    pub signin_path: String,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(
        secret: SecretString,
        google_client_id: String,
        google_client_secret: SecretString,
        app_url: String,
        signin_path: String,
    ) -> Self {
        Self {
            secret,
            google_client_id,
            google_client_secret,
            app_url,
            signin_path,
        }
    }
}
