use once_cell::sync::Lazy;
use secrecy::Secret;
use session_signups::configuration::get_configuration;
use session_signups::startup::Application;
use session_signups::telemetry::get_subscriber;
use session_signups::telemetry::init_subscriber;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

/// Init the tracing subscriber once only; every test shares the process.
///
/// To opt in to verbose logging, use the env var `TEST_LOG`:
///
/// ```sh
///      TEST_LOG=true cargo test [test_name] | bunyan
/// ```
static TRACING: Lazy<()> = Lazy::new(|| {
    // the two sinks are different closure types, hence the two arms
    match std::env::var("TEST_LOG") {
        Ok(_) => {
            let subscriber = get_subscriber("test", "debug", std::io::stdout);
            init_subscriber(subscriber).expect("init subscriber");
        }
        Err(_) => {
            let subscriber = get_subscriber("test", "debug", std::io::sink);
            init_subscriber(subscriber).expect("init subscriber");
        }
    };
});

pub const SLACK_WEBHOOK_PATH: &str = "/services/T000/B000/XXXX";

pub struct TestApp {
    pub addr: String,
    pub port: u16,
    /// simulates Greenlight
    pub greenlight_server: MockServer,
    /// simulates the Slack incoming webhook
    pub slack_server: MockServer,
    /// simulates the Postmark API
    pub email_server: MockServer,
}

impl TestApp {
    /// `POST /` with an explicit `Content-Type`
    pub async fn post_signup(
        &self,
        content_type: &str,
        body: impl Into<reqwest::Body>,
    ) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/", self.addr))
            .header("Content-Type", content_type)
            .body(body)
            .send()
            .await
            .expect("execute request")
    }

    pub async fn post_json(
        &self,
        body: &serde_json::Value,
    ) -> reqwest::Response {
        self.post_signup("application/json", body.to_string()).await
    }

    pub async fn post_form(
        &self,
        body: &str,
    ) -> reqwest::Response {
        self.post_signup("application/x-www-form-urlencoded", body.to_owned())
            .await
    }

    /// Mount "happy" mocks on all three collaborators, each expected `times`
    /// times. Mocks are verified when the `TestApp` is dropped.
    pub async fn mock_collaborators(
        &self,
        times: u64,
    ) {
        self.mock_greenlight(200, times).await;
        self.mock_slack(200, times).await;
        self.mock_email(200, times).await;
    }

    pub async fn mock_greenlight(
        &self,
        status: u16,
        times: u64,
    ) {
        Mock::given(path("/api/signups"))
            .and(method("POST"))
            .respond_with(ResponseTemplate::new(status))
            .expect(times)
            .named("Greenlight")
            .mount(&self.greenlight_server)
            .await;
    }

    pub async fn mock_slack(
        &self,
        status: u16,
        times: u64,
    ) {
        Mock::given(path(SLACK_WEBHOOK_PATH))
            .and(method("POST"))
            .respond_with(ResponseTemplate::new(status))
            .expect(times)
            .named("Slack")
            .mount(&self.slack_server)
            .await;
    }

    pub async fn mock_email(
        &self,
        status: u16,
        times: u64,
    ) {
        Mock::given(path("/email"))
            .and(method("POST"))
            .respond_with(ResponseTemplate::new(status))
            .expect(times)
            .named("Welcome email")
            .mount(&self.email_server)
            .await;
    }
}

/// Spawn the app on a random port, with every collaborator pointed at its own
/// `MockServer`.
///
/// `addr` is in the form `http://127.0.0.1:{port}`; the `http://` prefix is
/// what clients send requests to.
pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let greenlight_server = MockServer::start().await;
    let slack_server = MockServer::start().await;
    let email_server = MockServer::start().await;

    let cfg = {
        let mut cfg = get_configuration().expect("read configuration");

        // port 0 is reserved by the OS; the server will be spawned on a random
        // available port, retrieved later with `get_port`
        cfg.application.port = 0;

        cfg.greenlight.base_url = greenlight_server.uri();
        cfg.slack.webhook_url = Secret::new(format!("{}{SLACK_WEBHOOK_PATH}", slack_server.uri()));
        cfg.email_client.base_url = email_server.uri();
        cfg
    };

    let app = Application::build(cfg).expect("build app");
    let port = app.get_port();
    let addr = format!("http://127.0.0.1:{port}");
    tokio::spawn(app.run_until_stopped());

    TestApp {
        addr,
        port,
        greenlight_server,
        slack_server,
        email_server,
    }
}
