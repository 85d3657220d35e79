use std::time::Duration;

use reqwest::Client;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Serialize;

use crate::domain::EmailAddress;

pub const WELCOME_SUBJECT: &str = "Welcome from Operation Spark!";

/// Client for a Postmark-compatible transactional email API.
// establishing a HTTP connection is expensive; one `Client` (which pools
// connections internally) is built at startup and shared via `web::Data`
pub struct EmailClient {
    http_client: Client,
    base_url: String,
    sender: EmailAddress,
    authorization_token: Secret<String>,
}

/// Field names are dictated by the API (PascalCase)
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: EmailAddress,
        authorization_token: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
            sender,
            authorization_token,
        })
    }

    /// `recipient` is whatever the signer typed; it is not validated here, the
    /// API will reject it if it is unusable.
    #[tracing::instrument(name = "Sending welcome email", skip(self, html_content, text_content))]
    pub async fn send_welcome(
        &self,
        recipient: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<(), reqwest::Error> {
        self.send_email(recipient, WELCOME_SUBJECT, html_content, text_content)
            .await
    }

    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<(), reqwest::Error> {
        let url = format!("{}/email", self.base_url);
        let body = SendEmailRequest {
            from: self.sender.as_ref(),
            to: recipient,
            subject,
            html_body: html_content,
            text_body: text_content,
        };
        self.http_client
            .post(&url)
            .header(
                "X-Postmark-Server-Token",
                self.authorization_token.expose_secret(),
            )
            .json(&body)
            .send()
            .await?
            // non-2xx is not an error as far as `send` is concerned
            .error_for_status()?;
        Ok(())
    }
}
