use session_signups::configuration::get_configuration;
use session_signups::startup::Application;
use session_signups::telemetry::get_subscriber;
use session_signups::telemetry::init_subscriber;

/// Initialise telemetry, load config, and start the server
#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("session-signups", "info", std::io::stdout);
    init_subscriber(subscriber)?;

    let cfg = get_configuration()?;
    let app = Application::build(cfg)?;
    tracing::info!(port = app.get_port(), "accepting sign-ups");

    match app.run_until_stopped().await {
        Ok(()) => {
            tracing::info!("API exited gracefully");
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                error.cause_chain=?e,
                error.message=%e,
                "API failed"
            );
            Err(e.into())
        }
    }
}
