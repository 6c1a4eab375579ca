use crate::models::{ExamRow, PatientRef, PatientSummary, EXAM_RECORD_TYPE, PATIENT_RECORD_TYPE};
use crate::services::MongoDb;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneOptions, FindOptions};
use serde_json::{Map, Value};
use service_core::error::AppError;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Key/value and query surface of the record store. Absence is a value
/// (`Ok(None)`), not an error; only duplicate inserts and backend failures
/// surface as `AppError`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Verifies the backend is reachable; backs the health endpoint.
    async fn health_check(&self) -> Result<(), AppError>;

    /// Fetches a document body by key. The body never embeds the key itself.
    async fn get(&self, key: &str) -> Result<Option<Value>, AppError>;

    /// Inserts a new document. Fails with `Conflict` if the key exists.
    async fn insert(&self, key: &str, body: Value) -> Result<(), AppError>;

    /// Removes a document. Returns `false` when nothing was stored under the
    /// key.
    async fn remove(&self, key: &str) -> Result<bool, AppError>;

    /// Bodies of all patient records.
    async fn list_patients(&self) -> Result<Vec<Value>, AppError>;

    /// Document id and name of the patient with the given CPF.
    async fn find_patient_by_cpf(&self, cpf: &str) -> Result<Option<PatientRef>, AppError>;

    /// Exam rows referencing the given patient document id, newest `data`
    /// first.
    async fn list_exams_for_patient(&self, paciente_id: &str) -> Result<Vec<ExamRow>, AppError>;

    /// `(id, nome, cpf)` projection of all patient records.
    async fn list_patient_directory(&self) -> Result<Vec<PatientSummary>, AppError>;

    /// `(id, detalhes)` of every electrocardiogram exam.
    async fn list_ecg_exams(&self) -> Result<Vec<(String, Map<String, Value>)>, AppError>;

    /// Partial update: replaces only the `detalhes` field of a document.
    async fn set_exam_details(
        &self,
        key: &str,
        detalhes: &Map<String, Value>,
    ) -> Result<(), AppError>;
}

/// Production backend: one Mongo collection, document key as `_id`.
#[derive(Clone)]
pub struct MongoStore {
    db: MongoDb,
}

impl MongoStore {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}

fn document_to_value(mut document: Document) -> Value {
    document.remove("_id");
    Bson::Document(document).into_relaxed_extjson()
}

fn details_field(document: &Document) -> Map<String, Value> {
    document
        .get_document("detalhes")
        .map(|details| match Bson::Document(details.clone()).into_relaxed_extjson() {
            Value::Object(map) => map,
            _ => Map::new(),
        })
        .unwrap_or_default()
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn health_check(&self) -> Result<(), AppError> {
        self.db.health_check().await
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, AppError> {
        let found = self
            .db
            .records()
            .find_one(doc! { "_id": key }, None)
            .await?;
        Ok(found.map(document_to_value))
    }

    async fn insert(&self, key: &str, body: Value) -> Result<(), AppError> {
        let mut document = bson::to_document(&body).map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to encode document {}: {}", key, e))
        })?;
        document.insert("_id", key);

        self.db
            .records()
            .insert_one(&document, None)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    AppError::Conflict(anyhow::anyhow!("Document already exists: {}", key))
                } else {
                    AppError::from(e)
                }
            })?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, AppError> {
        let result = self
            .db
            .records()
            .delete_one(doc! { "_id": key }, None)
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_patients(&self) -> Result<Vec<Value>, AppError> {
        let mut cursor = self
            .db
            .records()
            .find(doc! { "type": PATIENT_RECORD_TYPE }, None)
            .await?;

        let mut patients = Vec::new();
        while let Some(document) = cursor.try_next().await.map_err(AppError::from)? {
            patients.push(document_to_value(document));
        }
        Ok(patients)
    }

    async fn find_patient_by_cpf(&self, cpf: &str) -> Result<Option<PatientRef>, AppError> {
        let options = FindOneOptions::builder()
            .projection(doc! { "nome": 1 })
            .build();
        let found = self
            .db
            .records()
            .find_one(doc! { "type": PATIENT_RECORD_TYPE, "cpf": cpf }, options)
            .await?;

        Ok(found.map(|document| PatientRef {
            id: document.get_str("_id").unwrap_or_default().to_string(),
            nome: document.get_str("nome").ok().map(str::to_string),
        }))
    }

    async fn list_exams_for_patient(&self, paciente_id: &str) -> Result<Vec<ExamRow>, AppError> {
        let options = FindOptions::builder()
            .sort(doc! { "data": -1 })
            .projection(doc! { "tipo": 1, "data": 1, "detalhes": 1 })
            .build();
        let mut cursor = self
            .db
            .records()
            .find(
                doc! { "type": EXAM_RECORD_TYPE, "pacienteId": paciente_id },
                options,
            )
            .await?;

        let mut exams = Vec::new();
        while let Some(document) = cursor.try_next().await.map_err(AppError::from)? {
            exams.push(ExamRow {
                id: document.get_str("_id").unwrap_or_default().to_string(),
                tipo: document.get_str("tipo").unwrap_or_default().to_string(),
                data: document.get_str("data").unwrap_or_default().to_string(),
                detalhes: details_field(&document),
            });
        }
        Ok(exams)
    }

    async fn list_patient_directory(&self) -> Result<Vec<PatientSummary>, AppError> {
        let options = FindOptions::builder()
            .projection(doc! { "nome": 1, "cpf": 1 })
            .build();
        let mut cursor = self
            .db
            .records()
            .find(doc! { "type": PATIENT_RECORD_TYPE }, options)
            .await?;

        let mut patients = Vec::new();
        while let Some(document) = cursor.try_next().await.map_err(AppError::from)? {
            patients.push(PatientSummary {
                id: document.get_str("_id").unwrap_or_default().to_string(),
                nome: document.get_str("nome").ok().map(str::to_string),
                cpf: document.get_str("cpf").ok().map(str::to_string),
            });
        }
        Ok(patients)
    }

    async fn list_ecg_exams(&self) -> Result<Vec<(String, Map<String, Value>)>, AppError> {
        let options = FindOptions::builder()
            .projection(doc! { "detalhes": 1 })
            .build();
        let mut cursor = self
            .db
            .records()
            .find(
                doc! { "type": EXAM_RECORD_TYPE, "tipo": "Eletrocardiograma" },
                options,
            )
            .await?;

        let mut exams = Vec::new();
        while let Some(document) = cursor.try_next().await.map_err(AppError::from)? {
            exams.push((
                document.get_str("_id").unwrap_or_default().to_string(),
                details_field(&document),
            ));
        }
        Ok(exams)
    }

    async fn set_exam_details(
        &self,
        key: &str,
        detalhes: &Map<String, Value>,
    ) -> Result<(), AppError> {
        let detalhes = bson::to_bson(detalhes).map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to encode detalhes: {}", e))
        })?;
        self.db
            .records()
            .update_one(doc! { "_id": key }, doc! { "$set": { "detalhes": detalhes } }, None)
            .await?;
        Ok(())
    }
}

/// In-process backend used by the test harness and the ephemeral dev mode.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn has_record_type(body: &Value, record_type: &str) -> bool {
    body.get("type").and_then(Value::as_str) == Some(record_type)
}

fn string_field(body: &Value, field: &str) -> Option<String> {
    body.get(field).and_then(Value::as_str).map(str::to_string)
}

fn map_field(body: &Value, field: &str) -> Map<String, Value> {
    body.get(field)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, AppError> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn insert(&self, key: &str, body: Value) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        if records.contains_key(key) {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Document already exists: {}",
                key
            )));
        }
        records.insert(key.to_string(), body);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, AppError> {
        Ok(self.records.write().await.remove(key).is_some())
    }

    async fn list_patients(&self) -> Result<Vec<Value>, AppError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|body| has_record_type(body, PATIENT_RECORD_TYPE))
            .cloned()
            .collect())
    }

    async fn find_patient_by_cpf(&self, cpf: &str) -> Result<Option<PatientRef>, AppError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|(_, body)| {
                has_record_type(body, PATIENT_RECORD_TYPE)
                    && string_field(body, "cpf").as_deref() == Some(cpf)
            })
            .map(|(key, body)| PatientRef {
                id: key.clone(),
                nome: string_field(body, "nome"),
            }))
    }

    async fn list_exams_for_patient(&self, paciente_id: &str) -> Result<Vec<ExamRow>, AppError> {
        let mut exams: Vec<ExamRow> = self
            .records
            .read()
            .await
            .iter()
            .filter(|(_, body)| {
                has_record_type(body, EXAM_RECORD_TYPE)
                    && string_field(body, "pacienteId").as_deref() == Some(paciente_id)
            })
            .map(|(key, body)| ExamRow {
                id: key.clone(),
                tipo: string_field(body, "tipo").unwrap_or_default(),
                data: string_field(body, "data").unwrap_or_default(),
                detalhes: map_field(body, "detalhes"),
            })
            .collect();
        exams.sort_by(|a, b| b.data.cmp(&a.data));
        Ok(exams)
    }

    async fn list_patient_directory(&self) -> Result<Vec<PatientSummary>, AppError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|(_, body)| has_record_type(body, PATIENT_RECORD_TYPE))
            .map(|(key, body)| PatientSummary {
                id: key.clone(),
                nome: string_field(body, "nome"),
                cpf: string_field(body, "cpf"),
            })
            .collect())
    }

    async fn list_ecg_exams(&self) -> Result<Vec<(String, Map<String, Value>)>, AppError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|(_, body)| {
                has_record_type(body, EXAM_RECORD_TYPE)
                    && string_field(body, "tipo").as_deref() == Some("Eletrocardiograma")
            })
            .map(|(key, body)| (key.clone(), map_field(body, "detalhes")))
            .collect())
    }

    async fn set_exam_details(
        &self,
        key: &str,
        detalhes: &Map<String, Value>,
    ) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        if let Some(Value::Object(body)) = records.get_mut(key) {
            body.insert("detalhes".to_string(), Value::Object(detalhes.clone()));
        }
        Ok(())
    }
}
