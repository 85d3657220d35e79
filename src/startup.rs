use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::web;
use actix_web::App;
use actix_web::HttpServer;
use tracing_actix_web::TracingLogger;

use crate::configuration::Settings;
use crate::email_client::EmailClient;
use crate::greenlight::GreenlightClient;
use crate::routes::health_check;
use crate::routes::sign_up;
use crate::slack::SlackClient;
use crate::welcome_email::WelcomeTemplate;

/// Wrapper for actix's `Server` with access to the bound port. Not to be
/// confused with actix's `App`!
pub struct Application {
    /// Left private; use `get_port` to access
    port: u16,
    server: Server,
}

impl Application {
    /// Bind the listener and build every collaborator client. Anything that
    /// can be wrong with the configuration (bad sender address, template that
    /// does not compile) fails here, before the first request.
    pub fn build(cfg: Settings) -> Result<Self, anyhow::Error> {
        let addr = format!("{}:{}", cfg.application.host, cfg.application.port);
        let listener = TcpListener::bind(addr)?;

        // with port 0, the OS picks one; this is what tests connect to
        let port = listener.local_addr()?.port();

        let greenlight = cfg.greenlight.client()?;
        let slack = cfg.slack.client()?;
        let email_client = cfg.email_client.client()?;
        let welcome_template = WelcomeTemplate::new()?;

        let server = run(listener, greenlight, slack, email_client, welcome_template)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 { self.port }

    /// Because this consumes `self`, this should be the final function call (or
    /// passed to `tokio::spawn`)
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> { self.server.await }
}

/// The server is not responsible for binding to an address, it only listens to
/// an already bound address.
///
/// Declares all API endpoints.
pub fn run(
    listener: TcpListener,
    greenlight: GreenlightClient,
    slack: SlackClient,
    email_client: EmailClient,
    welcome_template: WelcomeTemplate,
) -> Result<Server, std::io::Error> {
    // `Data` is externally an `Arc` (for sharing/cloning); everything in here is
    // read-only for the lifetime of the process
    let greenlight = web::Data::new(greenlight);
    let slack = web::Data::new(slack);
    let email_client = web::Data::new(email_client);
    let welcome_template = web::Data::new(welcome_template);

    // actix-web spins up one worker per core, each running its own copy of the
    // `App` built by this closure, hence the clones
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            // the website has always posted to the root; any method is accepted
            .route("/", web::route().to(sign_up))
            .app_data(greenlight.clone())
            .app_data(slack.clone())
            .app_data(email_client.clone())
            .app_data(welcome_template.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
