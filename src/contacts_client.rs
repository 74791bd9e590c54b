use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::ACCEPT;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Serialize, Serializer};
use serde_json::Value;
use url::Url;

use crate::domain::{ListId, NewContact};

/// A client for the Brevo contacts API, which keeps our mailing lists.
#[derive(Debug)]
pub struct ContactsClient {
    http_client: Client,
    contacts_url: Url,
}

#[derive(Debug, thiserror::Error)]
pub enum ContactsClientError {
    #[error("invalid contacts API base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("failed to build the HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Why an upsert didn't go through.
#[derive(Debug, thiserror::Error)]
pub enum UpsertError {
    #[error("the contacts API answered with status {status}")]
    Rejected {
        status: u16,
        details: UpstreamDetails,
    },
    #[error("failed to reach the contacts API: {0}")]
    Network(#[from] reqwest::Error),
}

impl ContactsClient {
    /// Creates a contacts client. Requests go to the `contacts` resource under
    /// `base_url`, e.g. `https://api.brevo.com/v3/contacts`.
    ///
    /// Requests are abandoned after `timeout` if one is given, otherwise they wait as
    /// long as the upstream takes.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ContactsClientError> {
        let mut base_url = Url::parse(base_url)?;
        // Without the trailing slash `join` would replace the last path segment.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let contacts_url = base_url.join("contacts")?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http_client: builder.build()?,
            contacts_url,
        })
    }

    /// Creates `request.email` as a contact, or updates it if it already exists.
    ///
    /// Returns `Err` if the request never completes, or if the API answers with
    /// anything but a success status. The API's own explanation is kept in the latter
    /// case, as far as it can be read.
    #[tracing::instrument(name = "Upserting contact with Brevo", skip_all)]
    pub async fn upsert_contact(
        &self,
        api_key: &Secret<String>,
        request: &ContactUpsertRequest<'_>,
    ) -> Result<(), UpsertError> {
        let response = self
            .http_client
            .post(self.contacts_url.clone())
            .header(ACCEPT, "application/json")
            .header("api-key", api_key.expose_secret())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        // Read as text first, the error body isn't always JSON.
        let body = response.text().await?;

        if status.is_success() {
            Ok(())
        } else {
            Err(UpsertError::Rejected {
                status: status.as_u16(),
                details: UpstreamDetails::from_body(&body),
            })
        }
    }
}

/// The body of a create-or-update contact request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactUpsertRequest<'a> {
    pub email: &'a str,
    pub update_enabled: bool,
    pub attributes: ContactAttributes<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_ids: Option<Vec<ListId>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ContactAttributes<'a> {
    pub signup_source: &'a str,
    pub signup_persona: &'a str,
    pub signup_ts: String,
    pub signup_page: &'a str,
}

impl<'a> ContactUpsertRequest<'a> {
    pub fn new(
        contact: &'a NewContact,
        list_id: Option<ListId>,
        signup_page: &'a str,
        signed_up_at: DateTime<Utc>,
    ) -> Self {
        Self {
            email: contact.email.as_ref(),
            update_enabled: true,
            attributes: ContactAttributes {
                signup_source: contact.source.or_unknown(),
                signup_persona: contact.persona.or_unknown(),
                signup_ts: signed_up_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                signup_page,
            },
            list_ids: list_id.map(|id| vec![id]),
        }
    }
}

/// Whatever we could make of an upstream error body.
///
/// Serializes to the parsed JSON, the raw text, or `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamDetails {
    Parsed(Value),
    Raw(String),
    Empty,
}

impl UpstreamDetails {
    /// Best-effort read of a response body. JSON that carries nothing (`null`, `false`,
    /// `0` or `""`) is reported as the text it came from.
    pub fn from_body(body: &str) -> Self {
        if body.is_empty() {
            return UpstreamDetails::Empty;
        }

        match serde_json::from_str::<Value>(body) {
            Ok(value) if carries_something(&value) => UpstreamDetails::Parsed(value),
            _ => UpstreamDetails::Raw(body.to_owned()),
        }
    }
}

fn carries_something(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl Serialize for UpstreamDetails {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            UpstreamDetails::Parsed(value) => value.serialize(serializer),
            UpstreamDetails::Raw(text) => serializer.serialize_str(text),
            UpstreamDetails::Empty => serializer.serialize_none(),
        }
    }
}
