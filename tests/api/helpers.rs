use once_cell::sync::Lazy;
use secrecy::Secret;
use serde_json::Value;
use signup_relay::{
    configuration::{get_configuration, Settings},
    domain::ListIds,
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};
use wiremock::MockServer;

pub const API_KEY: &str = "xkeysib-test-key";

// Ensure that we only initialize our subscriber once by wrapping in Lazy
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "debug".into();
    let subscriber_name = "test".into();

    // We use an environment variable to decide whether to swallow logs.
    // Need two separate blocks because the generic types on get_subscriber differ
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

/// Description of a relay spun up for integration testing
pub struct TestApp {
    /// Address to send requests to the relay
    pub address: String,
    /// Stand in for the Brevo contacts API
    pub brevo_server: MockServer,
}

impl TestApp {
    /// Send a POST with a raw `body` to the signup endpoint
    pub async fn post_subscribe(&self, body: String) -> Result<reqwest::Response, reqwest::Error> {
        reqwest::Client::new()
            .post(&format!("{}/api/subscribe", self.address))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
    }

    /// Send a POST with `body` serialized as JSON to the signup endpoint
    pub async fn post_subscribe_json(
        &self,
        body: &Value,
    ) -> Result<reqwest::Response, reqwest::Error> {
        reqwest::Client::new()
            .post(&format!("{}/api/subscribe", self.address))
            .json(body)
            .send()
            .await
    }

    /// Send a bodiless request with an arbitrary method to the signup endpoint
    pub async fn request_subscribe(
        &self,
        method: reqwest::Method,
    ) -> Result<reqwest::Response, reqwest::Error> {
        reqwest::Client::new()
            .request(method, &format!("{}/api/subscribe", self.address))
            .send()
            .await
    }

    /// Send a GET to the health_check API of our app
    pub async fn get_health_check(&self) -> Result<reqwest::Response, reqwest::Error> {
        reqwest::Client::new()
            .get(&format!("{}/health_check", &self.address))
            .send()
            .await
    }

    /// The JSON bodies Brevo received, in order
    pub async fn brevo_requests(&self) -> Vec<Value> {
        self.brevo_server
            .received_requests()
            .await
            .expect("Request recording is disabled")
            .iter()
            .map(|request| serde_json::from_slice(&request.body).expect("Body was not JSON"))
            .collect()
    }
}

/// Spins up the relay with an API key and no list ids configured.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Spins up the relay, letting `configure` adjust the settings first.
pub async fn spawn_app_with(configure: impl FnOnce(&mut Settings)) -> TestApp {
    // TRACING will only run the first time this function is called.
    Lazy::force(&TRACING);

    let brevo_server = MockServer::start().await;

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration");
        // Ask the OS for a random port
        c.application.port = 0;
        c.brevo.base_url = brevo_server.uri();
        c.brevo.timeout_milliseconds = None;
        // Whatever the environment says, start every test from the same account
        c.brevo.api_key = Some(Secret::new(API_KEY.to_string()));
        c.brevo.list_ids = ListIds::default();
        configure(&mut c);
        c
    };

    let app = Application::build(configuration)
        .await
        .expect("Failed to build application");
    let address = format!("http://127.0.0.1:{}", app.port());
    let _ = tokio::spawn(app.run_until_stopped());

    TestApp {
        address,
        brevo_server,
    }
}

/// List ids for every audience: default 1, seller 2, consumer 3.
pub fn all_list_ids() -> ListIds {
    ListIds {
        default: Some("1".into()),
        seller: Some("2".into()),
        consumer: Some("3".into()),
    }
}
