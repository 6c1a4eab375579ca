use super::{keys, PATIENT_RECORD_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A patient record as persisted in the document store. The submitted payload
/// may carry arbitrary extra fields; they are preserved verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub cpf: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Patient {
    pub fn new(cpf: String, nome: Option<String>, mut extra: Map<String, Value>) -> Self {
        // The discriminator belongs to this layer; a "type" key in the
        // submitted payload must not survive into the stored record.
        extra.remove("type");
        Self {
            cpf,
            nome,
            record_type: PATIENT_RECORD_TYPE.to_string(),
            extra,
        }
    }

    pub fn document_key(&self) -> String {
        keys::patient_key(&self.cpf)
    }
}

/// Projection of a patient's document id and name, used to join exams
/// against their patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRef {
    pub id: String,
    pub nome: Option<String>,
}

/// Directory projection row: document id, name and CPF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_type_discriminator_and_extra_fields() {
        let mut extra = Map::new();
        extra.insert("idade".to_string(), json!(42));
        let patient = Patient::new("111".to_string(), Some("Ana".to_string()), extra);

        let value = serde_json::to_value(&patient).unwrap();
        assert_eq!(
            value,
            json!({"cpf": "111", "nome": "Ana", "type": "paciente", "idade": 42})
        );
    }

    #[test]
    fn submitted_type_field_cannot_override_discriminator() {
        let mut extra = Map::new();
        extra.insert("type".to_string(), json!("exame"));
        let patient = Patient::new("111".to_string(), Some("Ana".to_string()), extra);

        let value = serde_json::to_value(&patient).unwrap();
        assert_eq!(value["type"], json!("paciente"));
        assert_eq!(value, json!({"cpf": "111", "nome": "Ana", "type": "paciente"}));
    }

    #[test]
    fn document_key_derives_from_cpf() {
        let patient = Patient::new("111".to_string(), None, Map::new());
        assert_eq!(patient.document_key(), "paciente::111");
    }
}
