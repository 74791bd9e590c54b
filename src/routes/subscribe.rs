use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::configuration::BrevoSettings;
use crate::contacts_client::{
    ContactUpsertRequest, ContactsClient, UpsertError, UpstreamDetails,
};
use crate::domain::{ListId, NewContact, SignupTag, SubscriberEmail};

/// The data being submitted from the signup form, coerced to text.
#[derive(Debug, Default)]
pub struct SignupForm {
    email: String,
    source: String,
    persona: String,
}

impl SignupForm {
    /// Reads the form out of a request body.
    ///
    /// An empty body counts as `{}`. A body that is itself a JSON string is read a
    /// second time, for clients that send their payload double-encoded.
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.is_empty() {
            return Ok(Self::default());
        }

        let value = match serde_json::from_slice::<Value>(body)? {
            Value::String(inner) => serde_json::from_str::<Value>(&inner)?,
            value => value,
        };

        Ok(Self {
            email: text_field(&value, "email"),
            source: text_field(&value, "source"),
            persona: text_field(&value, "persona"),
        })
    }
}

/// Coerces a form field to text. Fields that are missing or carry nothing read as empty.
fn text_field(body: &Value, key: &str) -> String {
    match body.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
        Some(Value::Bool(true)) => "true".to_string(),
        _ => String::new(),
    }
}

impl TryFrom<SignupForm> for NewContact {
    type Error = String;

    fn try_from(form: SignupForm) -> Result<Self, Self::Error> {
        Ok(NewContact {
            email: SubscriberEmail::parse(form.email)?,
            source: SignupTag::parse(&form.source),
            persona: SignupTag::parse(&form.persona),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("no Brevo API key is configured")]
    MissingApiKey,
    #[error("request body is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("{0}")]
    InvalidEmail(String),
    #[error("Brevo rejected the contact with status {status}")]
    Brevo {
        status: u16,
        details: UpstreamDetails,
    },
    #[error("failed to reach Brevo: {0}")]
    Network(#[source] reqwest::Error),
}

impl SubscribeError {
    /// The stable error code reported to callers.
    pub fn code(&self) -> &'static str {
        match self {
            SubscribeError::MethodNotAllowed => "method_not_allowed",
            SubscribeError::MissingApiKey => "missing_brevo_api_key",
            SubscribeError::InvalidJson(_) => "invalid_json",
            SubscribeError::InvalidEmail(_) => "invalid_email",
            SubscribeError::Brevo { .. } => "brevo_error",
            SubscribeError::Network(_) => "network_error",
        }
    }
}

impl From<UpsertError> for SubscribeError {
    fn from(e: UpsertError) -> Self {
        match e {
            UpsertError::Rejected { status, details } => SubscribeError::Brevo { status, details },
            UpsertError::Network(e) => SubscribeError::Network(e),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    ok: bool,
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a UpstreamDetails>,
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscribeError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            SubscribeError::InvalidJson(_) | SubscribeError::InvalidEmail(_) => {
                StatusCode::BAD_REQUEST
            }
            SubscribeError::MissingApiKey | SubscribeError::Network(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            // Brevo's own status goes back to the caller untouched.
            SubscribeError::Brevo { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (status, details) = match self {
            SubscribeError::Brevo { status, details } => (Some(*status), Some(details)),
            _ => (None, None),
        };

        HttpResponse::build(self.status_code()).json(ErrorBody {
            ok: false,
            error: self.code(),
            status,
            details,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscribeResponse<'a> {
    ok: bool,
    email: &'a str,
    persona: &'a str,
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    list_id: Option<ListId>,
}

/// Relays a signup to Brevo, creating the contact or updating it if it exists.
#[tracing::instrument(
    name = "Relaying a signup",
    skip(body, brevo, contacts_client),
    fields(
        signup_source = tracing::field::Empty,
        signup_persona = tracing::field::Empty,
        list_id = tracing::field::Empty
    )
)]
pub async fn subscribe(
    body: web::Bytes,
    brevo: web::Data<BrevoSettings>,
    contacts_client: web::Data<ContactsClient>,
) -> Result<HttpResponse, SubscribeError> {
    let api_key = brevo.api_key().ok_or_else(|| {
        tracing::error!("BREVO_API_KEY is not set, refusing to relay signups");
        SubscribeError::MissingApiKey
    })?;

    let form = SignupForm::parse(&body).map_err(|e| {
        tracing::warn!("Rejecting a body that isn't JSON: {}", e);
        SubscribeError::InvalidJson(e)
    })?;
    let contact: NewContact = form.try_into().map_err(|e: String| {
        tracing::warn!("{}", e);
        SubscribeError::InvalidEmail(e)
    })?;

    let list_id = brevo.list_ids.resolve(contact.audience());

    let span = tracing::Span::current();
    span.record("signup_source", &contact.source.as_ref());
    span.record("signup_persona", &contact.persona.as_ref());
    if let Some(list_id) = list_id {
        span.record("list_id", &list_id.get());
    }

    let request = ContactUpsertRequest::new(&contact, list_id, &brevo.signup_page, Utc::now());
    contacts_client
        .upsert_contact(api_key, &request)
        .await
        .map_err(|e| {
            match &e {
                UpsertError::Rejected { status, details } => {
                    tracing::warn!(status, ?details, "Brevo rejected the contact")
                }
                UpsertError::Network(e) => tracing::error!("Failed to reach Brevo: {:?}", e),
            }
            SubscribeError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(SubscribeResponse {
        ok: true,
        email: contact.email.as_ref(),
        persona: contact.persona.or_unknown(),
        source: contact.source.or_unknown(),
        list_id,
    }))
}

/// Answers CORS preflight requests. No configuration is needed for this.
pub async fn preflight() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

pub async fn method_not_allowed() -> Result<HttpResponse, SubscribeError> {
    Err(SubscribeError::MethodNotAllowed)
}
