use crate::dtos::{CreateExamRequest, ExamWithPatientResponse};
use crate::models::{keys, Exam};
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

pub async fn create_exam(
    State(state): State<AppState>,
    Json(payload): Json<CreateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    tracing::info!(
        paciente_id = %payload.paciente_id,
        tipo = %payload.tipo_exame,
        data = %payload.data,
        "Exam submission received"
    );

    // The referenced patient is not verified to exist; the record carries
    // whatever id the caller submitted.
    let exam = Exam::new(
        payload.paciente_id,
        payload.tipo_exame,
        payload.data,
        &payload.detalhes,
    );
    let key = exam.document_key();

    if state.store.get(&key).await?.is_some() {
        tracing::warn!(exam_id = %key, "Exam already exists");
        return Err(AppError::Conflict(anyhow::anyhow!("Exame já existe")));
    }

    let body = serde_json::to_value(&exam).map_err(|e| {
        AppError::InternalError(anyhow::anyhow!("Failed to encode exam record: {}", e))
    })?;
    state.store.insert(&key, body).await?;

    tracing::info!(paciente_id = %exam.paciente_id, "Exam created");
    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Exame criado com sucesso!"})),
    ))
}

/// Join-read: resolves the patient document id by CPF, then lists that
/// patient's exams (newest first), annotating each row with the patient's
/// name. An empty list is still a 200.
pub async fn list_exams_by_cpf(
    State(state): State<AppState>,
    Path(cpf): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(cpf = %cpf, "Listing exams for patient");

    let Some(patient) = state.store.find_patient_by_cpf(&cpf).await? else {
        tracing::warn!(cpf = %cpf, "Patient not found");
        return Err(AppError::NotFound(anyhow::anyhow!("Paciente não encontrado")));
    };

    let exams = state.store.list_exams_for_patient(&patient.id).await?;
    if exams.is_empty() {
        tracing::warn!(cpf = %cpf, paciente_id = %patient.id, "No exams found for patient");
    }

    let rows: Vec<ExamWithPatientResponse> = exams
        .into_iter()
        .map(|exam| ExamWithPatientResponse {
            exam,
            paciente_nome: patient.nome.clone(),
        })
        .collect();

    tracing::info!(cpf = %cpf, count = rows.len(), "Exams listed for patient");
    Ok(Json(rows))
}

pub async fn remove_exam(
    State(state): State<AppState>,
    Path((cpf, data)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    // Two-segment key; see `keys::exam_removal_key` for the keyspace caveat.
    let key = keys::exam_removal_key(&cpf, &data);

    if state.store.get(&key).await?.is_none() {
        tracing::warn!(exam_id = %key, "Exam not found for removal");
        return Err(AppError::NotFound(anyhow::anyhow!("Exame não encontrado")));
    }

    state.store.remove(&key).await?;
    tracing::info!(exam_id = %key, "Exam removed");
    Ok(Json(json!({"message": "Exame removido com sucesso"})))
}
