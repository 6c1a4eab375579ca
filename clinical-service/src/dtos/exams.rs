use crate::models::{ExamRow, ExamType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// Body of `POST /criar-exame`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExamRequest {
    #[serde(rename = "pacienteId")]
    #[validate(length(min = 1, message = "pacienteId must not be empty"))]
    pub paciente_id: String,
    #[serde(rename = "tipoExame")]
    pub tipo_exame: ExamType,
    #[validate(length(min = 1, message = "data must not be empty"))]
    pub data: String,
    pub detalhes: Map<String, Value>,
}

/// Row of `GET /api/consultar-exames/{cpf}`: the exam projection annotated
/// with the owning patient's name.
#[derive(Debug, Serialize)]
pub struct ExamWithPatientResponse {
    #[serde(flatten)]
    pub exam: ExamRow,
    #[serde(rename = "pacienteNome")]
    pub paciente_nome: Option<String>,
}
