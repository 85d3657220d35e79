use actix_web::HttpResponse;

/// `GET /health_check`
///
/// Liveness only; does not touch Greenlight, Slack or the email API.
///
/// Note: viewing http response requires `curl -v`
pub async fn health_check() -> HttpResponse { HttpResponse::Ok().finish() }
