mod common;

use common::TestApp;
use reqwest::Client;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "clinical-service");
}

#[tokio::test]
async fn connectivity_test_returns_legacy_plain_text() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/test", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body = response.text().await.expect("Failed to read body");
    assert_eq!(body, "Conexão bem-sucedida!");
}

#[tokio::test]
async fn page_routes_are_served() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    for path in [
        "/",
        "/cadastrar_paciente",
        "/consultar_paciente",
        "/criar_exame",
        "/consultar_exame",
    ] {
        let response = client
            .get(format!("{}{}", app.address, path))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 200, "route {} not served", path);
    }
}
