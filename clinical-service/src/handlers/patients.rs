use crate::dtos::RegisterPatientRequest;
use crate::models::{keys, Patient};
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use service_core::error::AppError;
use validator::Validate;

pub async fn register_patient(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPatientRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let patient = Patient::new(payload.cpf, payload.nome, payload.extra);
    let key = patient.document_key();

    if state.store.get(&key).await?.is_some() {
        tracing::warn!(cpf = %patient.cpf, "Patient already registered");
        return Err(AppError::Conflict(anyhow::anyhow!("Paciente já cadastrado")));
    }

    let body = serde_json::to_value(&patient).map_err(|e| {
        AppError::InternalError(anyhow::anyhow!("Failed to encode patient record: {}", e))
    })?;
    state.store.insert(&key, body).await?;

    tracing::info!(cpf = %patient.cpf, "Patient registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Paciente cadastrado com sucesso!"})),
    ))
}

pub async fn list_patients(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let patients = state.store.list_patients().await?;
    tracing::info!(count = patients.len(), "Patients listed");
    Ok(Json(patients))
}

pub async fn get_patient(
    State(state): State<AppState>,
    Path(cpf): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let key = keys::patient_key(&cpf);

    match state.store.get(&key).await? {
        Some(patient) => {
            tracing::info!(cpf = %cpf, "Patient found");
            Ok(Json(patient))
        }
        None => {
            tracing::warn!(cpf = %cpf, "Patient not found");
            Err(AppError::NotFound(anyhow::anyhow!("Paciente não encontrado")))
        }
    }
}

pub async fn patient_directory(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let patients = state.store.list_patient_directory().await?;
    tracing::info!(count = patients.len(), "Patient directory listed");
    Ok(Json(patients))
}
