use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

/// Body of `POST /cadastrar-paciente`. Only the CPF is required; any other
/// submitted fields are carried through to the stored record.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterPatientRequest {
    #[validate(length(min = 1, message = "cpf must not be empty"))]
    pub cpf: String,
    pub nome: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
