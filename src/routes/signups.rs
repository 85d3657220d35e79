use std::fmt::Debug;

use actix_web::http::header;
use actix_web::http::StatusCode;
use actix_web::web;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use anyhow::Context;

use crate::decoder::decode;
use crate::decoder::DecodeError;
use crate::domain::SignupRecord;
use crate::email_client::EmailClient;
use crate::greenlight::GreenlightClient;
use crate::slack::Message;
use crate::slack::SlackClient;
use crate::utils::error_chain_fmt;
use crate::utils::log_best_effort;
use crate::welcome_email::WelcomeTemplate;

/// Every way a sign-up can fail -visibly-. Welcome email failures are not in
/// here; see `WelcomeEmailStatus`.
#[derive(thiserror::Error)]
pub enum SignupError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    // the caller sees Greenlight's error as-is
    #[error("{0}")]
    Registration(#[source] reqwest::Error),
    // the webhook url is a credential, and may appear in reqwest's message
    #[error("error sending webhook notification")]
    Notification(#[source] reqwest::Error),
}

impl Debug for SignupError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)?;
        Ok(())
    }
}

// the default `error_response` writes `Display` as a text/plain body with this
// status, which is exactly what callers get
impl ResponseError for SignupError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Decode(DecodeError::UnsupportedMediaType(_)) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::Registration(_) | Self::Notification(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Outcome of the last, best-effort step. A failure here has already been
/// logged and never changes the response.
#[derive(Debug)]
pub enum WelcomeEmailStatus {
    Sent,
    Failed(anyhow::Error),
}

/// Info session sign-up, from the operationspark.org website. Any method is
/// accepted (the website POSTs).
///
/// Success requires, in order:
///     1. body decoded (415 on unknown content type, 400 on bad body)
///     2. sign-up accepted by Greenlight (500 otherwise)
///     3. #signups Slack notification sent (500 otherwise)
///
/// then a welcome email is attempted, and 200 is returned regardless of how
/// that goes.
///
/// # Request example
///
/// ```sh
///     curl -v -H 'Content-Type: application/json' \
///         --data '{"nameFirst":"Henri","nameLast":"Testaroni","email":"henri@email.com"}' \
///         http://127.0.0.1:8000/
///     curl -v --data 'nameFirst=Henri&nameLast=Testaroni&email=henri%40email.com' \
///         http://127.0.0.1:8000/
/// ```
#[tracing::instrument(
    name = "Handling info session sign-up",
    skip_all,
    fields(
        content_type=tracing::field::Empty,
        signup_email=tracing::field::Empty,
        cohort=tracing::field::Empty,
    )
)]
pub async fn sign_up(
    request: HttpRequest,
    body: web::Bytes,
    // all subsequent args are inherited via App.app_data; thus arg types must be unique
    greenlight: web::Data<GreenlightClient>,
    slack: web::Data<SlackClient>,
    email_client: web::Data<EmailClient>,
    welcome_template: web::Data<WelcomeTemplate>,
) -> Result<HttpResponse, SignupError> {
    // a header that is not visible ASCII can't match either media type anyway
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    if let Some(content_type) = content_type {
        tracing::Span::current().record("content_type", content_type);
    }

    let signup = decode(content_type, &body).map_err(|e| {
        tracing::warn!(error.cause_chain=?e, "rejecting sign-up");
        e
    })?;

    tracing::Span::current()
        .record("signup_email", tracing::field::display(&signup.email))
        .record("cohort", tracing::field::display(&signup.cohort));

    process_signup(&signup, &greenlight, &slack, &email_client, &welcome_template).await?;

    Ok(HttpResponse::Ok().finish())
}

/// Everything after decoding; independent of actix.
///
/// Steps run strictly one after another, and the first failure of register or
/// notify ends the pipeline. Nothing is retried.
pub async fn process_signup(
    signup: &SignupRecord,
    greenlight: &GreenlightClient,
    slack: &SlackClient,
    email_client: &EmailClient,
    welcome_template: &WelcomeTemplate,
) -> Result<WelcomeEmailStatus, SignupError> {
    greenlight
        .register(signup)
        .await
        .map_err(SignupError::Registration)?;

    slack
        .send(&Message::from(signup))
        .await
        .map_err(SignupError::Notification)?;

    match send_welcome_email(signup, email_client, welcome_template).await {
        Ok(()) => Ok(WelcomeEmailStatus::Sent),
        Err(e) => {
            log_best_effort("welcome email", &e);
            Ok(WelcomeEmailStatus::Failed(e))
        }
    }
}

async fn send_welcome_email(
    signup: &SignupRecord,
    email_client: &EmailClient,
    welcome_template: &WelcomeTemplate,
) -> Result<(), anyhow::Error> {
    let body = welcome_template
        .render(&signup.welcome_values())
        .context("could not render welcome email")?;
    email_client
        .send_welcome(&signup.email, &body.html, &body.text)
        .await
        // `with_context` is lazy, and is preferred when the context is not static
        .with_context(|| format!("could not send welcome email to {}", signup.email))?;
    Ok(())
}
