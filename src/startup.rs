use std::net::TcpListener;

use actix_web::http::Method;
use actix_web::middleware::DefaultHeaders;
use actix_web::{dev::Server, web, App, HttpServer};
use tracing_actix_web::TracingLogger;

use crate::{
    configuration::{BrevoSettings, Settings},
    contacts_client::ContactsClient,
    routes::{health_check, method_not_allowed, preflight, subscribe},
};

/// A running application
pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    /// Build an HTTP server running our app. The behavior of the app is configured
    /// through the `settings` argument.
    ///
    /// Fails if the contacts client can't be built from `settings.brevo`, or if the
    /// configured address can't be bound.
    pub async fn build(settings: Settings) -> std::io::Result<Self> {
        let contacts_client = get_contacts_client(&settings.brevo)?;

        if settings.brevo.api_key().is_none() {
            tracing::warn!("BREVO_API_KEY is not set, every signup will be refused");
        }

        let app_config = settings.application;
        let app_address = format!("{}:{}", &app_config.host, app_config.port);
        let listener = TcpListener::bind(app_address)?;
        let port = listener.local_addr()?.port();

        let server = run(listener, settings.brevo, contacts_client)?;
        Ok(Self { port, server })
    }

    /// The port that the app is listening on
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Listen and handle requests until we receive a stop signal
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

/// Get a client for the Brevo contacts API. Gets connection info from the `settings` parameter.
pub fn get_contacts_client(settings: &BrevoSettings) -> std::io::Result<ContactsClient> {
    ContactsClient::new(&settings.base_url, settings.timeout())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
}

/// Starts a server, listening on `listener`, running in the background and returns it
fn run(
    listener: TcpListener,
    brevo: BrevoSettings,
    contacts_client: ContactsClient,
) -> std::io::Result<Server> {
    let brevo = web::Data::new(brevo);
    let contacts_client = web::Data::new(contacts_client);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .service(health_check)
            .service(
                web::resource("/api/subscribe")
                    // Sent on every answer, errors included.
                    .wrap(
                        DefaultHeaders::new()
                            .add(("Access-Control-Allow-Methods", "POST, OPTIONS"))
                            .add(("Access-Control-Allow-Headers", "Content-Type")),
                    )
                    .route(web::post().to(subscribe))
                    .route(web::method(Method::OPTIONS).to(preflight))
                    .default_service(web::to(method_not_allowed)),
            )
            .app_data(brevo.clone())
            .app_data(contacts_client.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
