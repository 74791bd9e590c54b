use actix_web::{get, HttpResponse};

/// Liveness probe. Always answers 200 with an empty body, Brevo is not consulted.
#[get("/health_check")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}
