use clinical_service::config::{ClinicalConfig, StoreBackend};
use clinical_service::services::DocumentStore;
use clinical_service::startup::Application;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub store: Arc<dyn DocumentStore>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let mut config = ClinicalConfig::load().expect("Failed to load configuration");
        config.common.port = 0; // Random port for testing
        config.store.backend = StoreBackend::Memory;

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let store = app.store();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("http://127.0.0.1:{}/health", port);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, store }
    }

    /// Registers a patient through the HTTP surface.
    pub async fn register_patient(&self, client: &reqwest::Client, cpf: &str, nome: &str) {
        let response = client
            .post(format!("{}/cadastrar-paciente", self.address))
            .json(&serde_json::json!({"cpf": cpf, "nome": nome}))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 201);
    }
}
