mod common;

use clinical_service::services::{rename_legacy_ecg_fields, DocumentStore, MemoryStore};
use common::TestApp;
use reqwest::Client;
use serde_json::json;

async fn seed_ecg_exam(store: &dyn DocumentStore, paciente_id: &str, data: &str, detalhes: serde_json::Value) {
    store
        .insert(
            &format!("exame::{}::Eletrocardiograma::{}", paciente_id, data),
            json!({
                "type": "exame",
                "tipo": "Eletrocardiograma",
                "data": data,
                "detalhes": detalhes,
                "pacienteId": paciente_id
            }),
        )
        .await
        .expect("Failed to seed exam");
}

#[tokio::test]
async fn migration_renames_every_legacy_document() {
    let store = MemoryStore::new();
    seed_ecg_exam(&store, "paciente::111", "2024-01-01", json!({"frequencia": 72})).await;
    seed_ecg_exam(&store, "paciente::222", "2024-01-02", json!({"frequencia": 65, "ritmo": "sinusal"})).await;
    seed_ecg_exam(&store, "paciente::333", "2024-01-03", json!({"frequenciaCardiaca": 80})).await;

    let renamed = rename_legacy_ecg_fields(&store).await.expect("Migration failed");
    assert_eq!(renamed, 2);

    for (id, detalhes) in store.list_ecg_exams().await.expect("Failed to list exams") {
        assert!(
            detalhes.contains_key("frequenciaCardiaca"),
            "exam {} still lacks the canonical field",
            id
        );
        assert!(
            !detalhes.contains_key("frequencia"),
            "exam {} still carries the legacy field",
            id
        );
    }
}

#[tokio::test]
async fn migration_is_idempotent() {
    let store = MemoryStore::new();
    seed_ecg_exam(&store, "paciente::111", "2024-01-01", json!({"frequencia": 72})).await;

    assert_eq!(rename_legacy_ecg_fields(&store).await.unwrap(), 1);
    assert_eq!(rename_legacy_ecg_fields(&store).await.unwrap(), 0);

    let body = store
        .get("exame::paciente::111::Eletrocardiograma::2024-01-01")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(body["detalhes"], json!({"frequenciaCardiaca": 72}));
}

// The application runs the migration during build; records seeded afterwards
// must go through the normalizer instead, so a freshly built app never
// serves the legacy field name.
#[tokio::test]
async fn served_exams_never_expose_the_legacy_field() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    app.register_patient(&client, "111", "Ana").await;

    let response = client
        .post(format!("{}/criar-exame", app.address))
        .json(&json!({
            "pacienteId": "paciente::111",
            "tipoExame": "Eletrocardiograma",
            "data": "2024-01-01",
            "detalhes": {"frequencia": 72}
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);

    let rows: Vec<serde_json::Value> = client
        .get(format!("{}/api/consultar-exames/111", app.address))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert!(rows[0]["detalhes"].get("frequencia").is_none());
    assert_eq!(rows[0]["detalhes"]["frequenciaCardiaca"], json!(72));
}
