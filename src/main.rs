use signup_relay::configuration::get_configuration;
use signup_relay::startup::Application;
use signup_relay::telemetry::{get_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber("signup_relay".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration().expect("Failed to read configuration");

    let application = Application::build(configuration).await?;
    tracing::info!(port = application.port(), "Relaying signups");
    application.run_until_stopped().await
}
