use std::time::Duration;

use reqwest::Client;
use secrecy::ExposeSecret;
use secrecy::Secret;

use crate::domain::SignupRecord;

/// Greenlight is where sign-ups actually get recorded (and where the session
/// seat is reserved); nothing else happens unless it accepts the record.
pub struct GreenlightClient {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
}

impl GreenlightClient {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
            api_key,
        })
    }

    /// `POST /api/signups` with the record as JSON (same camelCase keys it was
    /// submitted with). Any non-2xx response is an error.
    #[tracing::instrument(
        name = "Registering sign-up with Greenlight",
        skip(self, signup),
        fields(session_id = %signup.session_id)
    )]
    pub async fn register(
        &self,
        signup: &SignupRecord,
    ) -> Result<(), reqwest::Error> {
        let url = format!("{}/api/signups", self.base_url);
        self.http_client
            .post(&url)
            .header("X-Greenlight-Signup-Api-Key", self.api_key.expose_secret())
            .json(signup)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
