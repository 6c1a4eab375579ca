use crate::config::{ClinicalConfig, StoreBackend};
use crate::handlers;
use crate::services::{migration, DocumentStore, MemoryStore, MongoDb, MongoStore};
use axum::{
    routing::{delete, get, post},
    Router,
};
use service_core::error::AppError;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: ClinicalConfig,
    pub store: Arc<dyn DocumentStore>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/test", get(handlers::connectivity_test))
        .route("/health", get(handlers::health_check))
        .route("/", get(handlers::pages::home))
        .route("/cadastrar_paciente", get(handlers::pages::register_patient_page))
        .route("/consultar_paciente", get(handlers::pages::consult_patient_page))
        .route("/criar_exame", get(handlers::pages::create_exam_page))
        .route("/consultar_exame", get(handlers::pages::consult_exam_page))
        .route("/cadastrar-paciente", post(handlers::register_patient))
        .route("/consultar-pacientes", get(handlers::list_patients))
        .route("/consultar-paciente/:cpf", get(handlers::get_patient))
        .route("/criar-exame", post(handlers::create_exam))
        .route("/api/consultar-exames/:cpf", get(handlers::list_exams_by_cpf))
        .route("/api/remover-exame/:cpf/:data", delete(handlers::remove_exam))
        .route("/obter-pacientes", get(handlers::patient_directory))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    pub async fn build(config: ClinicalConfig) -> Result<Self, AppError> {
        let store: Arc<dyn DocumentStore> = match config.store.backend {
            StoreBackend::Mongodb => {
                let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to connect to MongoDB: {}", e);
                        e
                    })?;
                db.initialize_indexes().await.map_err(|e| {
                    tracing::error!("Failed to initialize database indexes: {}", e);
                    e
                })?;
                Arc::new(MongoStore::new(db))
            }
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
        };

        // Run-once bootstrap step, before the listener starts serving.
        let renamed = migration::rename_legacy_ecg_fields(store.as_ref())
            .await
            .map_err(|e| {
                tracing::error!("Legacy ECG field migration failed: {}", e);
                e
            })?;
        tracing::info!(renamed, "Legacy ECG field migration finished");

        let state = AppState {
            config: config.clone(),
            store,
        };

        let app = build_router(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn store(&self) -> Arc<dyn DocumentStore> {
        self.state.store.clone()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
