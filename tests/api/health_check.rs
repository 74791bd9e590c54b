use crate::helpers::{spawn_app, spawn_app_with};

#[actix_web::test]
async fn health_check_works() {
    let app = spawn_app().await;

    let response = app
        .get_health_check()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length());
}

#[actix_web::test]
async fn health_check_works_without_an_api_key() {
    let app = spawn_app_with(|c| c.brevo.api_key = None).await;

    let response = app
        .get_health_check()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
}
