use std::time::Duration;

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::domain::ListIds;

/// App-wide configuration
#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub brevo: BrevoSettings,
}

#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

/// Settings needed for talking to the Brevo contacts API.
#[derive(Deserialize, Clone)]
pub struct BrevoSettings {
    pub base_url: String,
    /// Sent along with every contact as the `SIGNUP_PAGE` attribute.
    pub signup_page: String,
    /// No timeout is applied to upstream calls when this is unset.
    pub timeout_milliseconds: Option<u64>,
    #[serde(default)]
    pub api_key: Option<Secret<String>>,
    #[serde(default)]
    pub list_ids: ListIds,
}

impl BrevoSettings {
    /// The API key, if one is configured. An empty key counts as missing.
    pub fn api_key(&self) -> Option<&Secret<String>> {
        self.api_key
            .as_ref()
            .filter(|key| !key.expose_secret().is_empty())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_milliseconds.map(Duration::from_millis)
    }

    fn merge(&mut self, account: BrevoAccount) {
        if account.api_key.is_some() {
            self.api_key = account.api_key;
        }
        if account.list_id_default.is_some() {
            self.list_ids.default = account.list_id_default;
        }
        if account.list_id_seller.is_some() {
            self.list_ids.seller = account.list_id_seller;
        }
        if account.list_id_consumer.is_some() {
            self.list_ids.consumer = account.list_id_consumer;
        }
    }
}

/// The `BREVO_*` environment variables the deployment platform hands us.
#[derive(Deserialize, Default)]
struct BrevoAccount {
    api_key: Option<Secret<String>>,
    list_id_default: Option<String>,
    list_id_seller: Option<String>,
    list_id_consumer: Option<String>,
}

/// Reads app configuration.
///
/// Sources are layered, later ones winning:
/// * built-in defaults
/// * an optional `configuration` file in the working directory
/// * `APP_` prefixed environment variables, using `__` to reach nested keys
///   (e.g. `APP_APPLICATION__PORT=5001`)
/// * `BREVO_API_KEY`, `BREVO_LIST_ID_DEFAULT`, `BREVO_LIST_ID_SELLER` and
///   `BREVO_LIST_ID_CONSUMER`
///
/// Returns an error if a source can't be read or the result doesn't fit `Settings`.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let mut settings: Settings = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8000)?
        .set_default("brevo.base_url", "https://api.brevo.com/v3/")?
        .set_default("brevo.signup_page", "findnext.co")?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    let account: BrevoAccount = config::Config::builder()
        .add_source(config::Environment::with_prefix("BREVO"))
        .build()?
        .try_deserialize()?;
    settings.brevo.merge(account);

    Ok(settings)
}
