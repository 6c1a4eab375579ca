use mongodb::{
    bson::{doc, Document},
    options::IndexOptions,
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

/// All records live in a single collection keyed by the derived document id
/// (`_id`), with a `type` field discriminating patients from exams.
const RECORDS_COLLECTION: &str = "records";

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for clinical-service");

        let records = self.records();

        // Index on the discriminator for the list queries
        let type_index = IndexModel::builder()
            .keys(doc! { "type": 1 })
            .options(
                IndexOptions::builder()
                    .name("record_type_lookup".to_string())
                    .build(),
            )
            .build();

        records.create_index(type_index, None).await.map_err(|e| {
            tracing::error!("Failed to create type index on records collection: {}", e);
            AppError::from(e)
        })?;
        tracing::info!("Created index on records.type");

        // Compound index on (type, cpf) for the patient-by-CPF lookup
        let cpf_index = IndexModel::builder()
            .keys(doc! { "type": 1, "cpf": 1 })
            .options(
                IndexOptions::builder()
                    .name("patient_cpf_lookup".to_string())
                    .build(),
            )
            .build();

        records.create_index(cpf_index, None).await.map_err(|e| {
            tracing::error!("Failed to create cpf index on records collection: {}", e);
            AppError::from(e)
        })?;
        tracing::info!("Created index on records.(type, cpf)");

        // Compound index on (type, pacienteId) for the exam join
        let patient_id_index = IndexModel::builder()
            .keys(doc! { "type": 1, "pacienteId": 1 })
            .options(
                IndexOptions::builder()
                    .name("exam_patient_lookup".to_string())
                    .build(),
            )
            .build();

        records
            .create_index(patient_id_index, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create pacienteId index on records collection: {}",
                    e
                );
                AppError::from(e)
            })?;
        tracing::info!("Created index on records.(type, pacienteId)");

        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    pub fn records(&self) -> Collection<Document> {
        self.db.collection(RECORDS_COLLECTION)
    }
}
