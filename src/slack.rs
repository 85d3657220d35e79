use std::time::Duration;

use reqwest::Client;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Serialize;

use crate::domain::SignupRecord;

/// Incoming-webhook payload; Slack renders `text` as-is
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Message {
    pub text: String,
}

impl From<&SignupRecord> for Message {
    fn from(signup: &SignupRecord) -> Self {
        Self {
            text: signup.summary(),
        }
    }
}

/// Posts to a single webhook, fixed at startup
pub struct SlackClient {
    http_client: Client,
    webhook_url: Secret<String>,
}

impl SlackClient {
    pub fn new(
        webhook_url: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            webhook_url,
        })
    }

    #[tracing::instrument(name = "Sending Slack notification", skip_all)]
    pub async fn send(
        &self,
        msg: &Message,
    ) -> Result<(), reqwest::Error> {
        self.http_client
            .post(self.webhook_url.expose_secret())
            .json(msg)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
