use super::{keys, EXAM_RECORD_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Canonical and legacy names of the ECG heart-rate field inside `detalhes`.
pub const HEART_RATE_FIELD: &str = "frequenciaCardiaca";
pub const LEGACY_HEART_RATE_FIELD: &str = "frequencia";

/// Exam type as it appears on the wire and inside stored records. Unknown
/// values round-trip untouched through `Outro`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExamType {
    Sangue,
    Urina,
    Eletrocardiograma,
    #[serde(rename = "Raio-X")]
    RaioX,
    Ultrassom,
    #[serde(untagged)]
    Outro(String),
}

impl ExamType {
    pub fn as_str(&self) -> &str {
        match self {
            ExamType::Sangue => "Sangue",
            ExamType::Urina => "Urina",
            ExamType::Eletrocardiograma => "Eletrocardiograma",
            ExamType::RaioX => "Raio-X",
            ExamType::Ultrassom => "Ultrassom",
            ExamType::Outro(other) => other,
        }
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Restricts a free-form details payload to the fixed field set of the exam
/// type. Missing source fields become explicit nulls, never omitted keys.
/// Unrecognized exam types pass the payload through unchanged.
pub fn normalize_details(tipo: &ExamType, detalhes: &Map<String, Value>) -> Map<String, Value> {
    match tipo {
        ExamType::Sangue => pick(detalhes, &["hemoglobina", "leucocitos"]),
        ExamType::Urina => pick(detalhes, &["ph", "densidade"]),
        ExamType::Eletrocardiograma => {
            let mut out = Map::new();
            // The canonical field wins; the legacy name is only consulted
            // when the canonical one is absent or null.
            let heart_rate = detalhes
                .get(HEART_RATE_FIELD)
                .filter(|v| !v.is_null())
                .or_else(|| detalhes.get(LEGACY_HEART_RATE_FIELD))
                .cloned()
                .unwrap_or(Value::Null);
            out.insert(HEART_RATE_FIELD.to_string(), heart_rate);
            out.insert(
                "ritmo".to_string(),
                detalhes.get("ritmo").cloned().unwrap_or(Value::Null),
            );
            out
        }
        ExamType::RaioX | ExamType::Ultrassom => pick(detalhes, &["observacoes", "regiao"]),
        ExamType::Outro(_) => detalhes.clone(),
    }
}

fn pick(detalhes: &Map<String, Value>, fields: &[&str]) -> Map<String, Value> {
    fields
        .iter()
        .map(|field| {
            (
                field.to_string(),
                detalhes.get(*field).cloned().unwrap_or(Value::Null),
            )
        })
        .collect()
}

/// An exam record as persisted in the document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    pub tipo: ExamType,
    pub data: String,
    pub detalhes: Map<String, Value>,
    #[serde(rename = "pacienteId")]
    pub paciente_id: String,
    #[serde(rename = "type")]
    pub record_type: String,
}

impl Exam {
    /// Assembles a record from a submitted payload, normalizing the details
    /// for the exam type.
    pub fn new(
        paciente_id: String,
        tipo: ExamType,
        data: String,
        detalhes: &Map<String, Value>,
    ) -> Self {
        let detalhes = normalize_details(&tipo, detalhes);
        Self {
            tipo,
            data,
            detalhes,
            paciente_id,
            record_type: EXAM_RECORD_TYPE.to_string(),
        }
    }

    pub fn document_key(&self) -> String {
        keys::exam_key(&self.paciente_id, self.tipo.as_str(), &self.data)
    }
}

/// Row shape returned by the exam queries: document id plus the fields the
/// join endpoint exposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamRow {
    pub id: String,
    pub tipo: String,
    pub data: String,
    pub detalhes: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn details(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn exam_type_round_trips_known_wire_names() {
        for (tipo, wire) in [
            (ExamType::Sangue, "Sangue"),
            (ExamType::Urina, "Urina"),
            (ExamType::Eletrocardiograma, "Eletrocardiograma"),
            (ExamType::RaioX, "Raio-X"),
            (ExamType::Ultrassom, "Ultrassom"),
        ] {
            assert_eq!(serde_json::to_value(&tipo).unwrap(), json!(wire));
            assert_eq!(serde_json::from_value::<ExamType>(json!(wire)).unwrap(), tipo);
        }
    }

    #[test]
    fn unknown_exam_type_round_trips_untouched() {
        let tipo: ExamType = serde_json::from_value(json!("Tomografia")).unwrap();
        assert_eq!(tipo, ExamType::Outro("Tomografia".to_string()));
        assert_eq!(serde_json::to_value(&tipo).unwrap(), json!("Tomografia"));
    }

    #[test]
    fn blood_exam_keeps_only_its_fields() {
        let input = details(json!({"hemoglobina": 14, "leucocitos": 7000, "ruido": true}));
        let out = normalize_details(&ExamType::Sangue, &input);
        assert_eq!(
            Value::Object(out),
            json!({"hemoglobina": 14, "leucocitos": 7000})
        );
    }

    #[test]
    fn missing_fields_become_explicit_nulls() {
        let out = normalize_details(&ExamType::Urina, &details(json!({"ph": 6.5})));
        assert_eq!(Value::Object(out), json!({"ph": 6.5, "densidade": null}));
    }

    #[test]
    fn ecg_falls_back_to_legacy_heart_rate_field() {
        let out = normalize_details(
            &ExamType::Eletrocardiograma,
            &details(json!({"frequencia": 72})),
        );
        assert_eq!(
            Value::Object(out),
            json!({"frequenciaCardiaca": 72, "ritmo": null})
        );
    }

    #[test]
    fn ecg_prefers_canonical_heart_rate_field() {
        let out = normalize_details(
            &ExamType::Eletrocardiograma,
            &details(json!({"frequenciaCardiaca": 80, "frequencia": 72, "ritmo": "sinusal"})),
        );
        assert_eq!(
            Value::Object(out),
            json!({"frequenciaCardiaca": 80, "ritmo": "sinusal"})
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        for tipo in [
            ExamType::Sangue,
            ExamType::Urina,
            ExamType::Eletrocardiograma,
            ExamType::RaioX,
            ExamType::Outro("Tomografia".to_string()),
        ] {
            let input = details(json!({
                "hemoglobina": 14, "leucocitos": 7000, "ph": 6.5, "densidade": 1.01,
                "frequenciaCardiaca": 80, "ritmo": "sinusal",
                "observacoes": "ok", "regiao": "torax"
            }));
            let once = normalize_details(&tipo, &input);
            let twice = normalize_details(&tipo, &once);
            assert_eq!(once, twice, "normalization not idempotent for {}", tipo);
        }
    }

    #[test]
    fn unknown_type_passes_details_through() {
        let input = details(json!({"qualquer": 1, "coisa": [2, 3]}));
        let out = normalize_details(&ExamType::Outro("Tomografia".to_string()), &input);
        assert_eq!(out, input);
    }

    #[test]
    fn new_exam_stamps_discriminator_and_normalizes() {
        let exam = Exam::new(
            "paciente::111".to_string(),
            ExamType::Sangue,
            "2024-01-01".to_string(),
            &details(json!({"hemoglobina": 14})),
        );
        assert_eq!(exam.record_type, "exame");
        assert_eq!(
            exam.document_key(),
            "exame::paciente::111::Sangue::2024-01-01"
        );
        let value = serde_json::to_value(&exam).unwrap();
        assert_eq!(
            value,
            json!({
                "tipo": "Sangue",
                "data": "2024-01-01",
                "detalhes": {"hemoglobina": 14, "leucocitos": null},
                "pacienteId": "paciente::111",
                "type": "exame"
            })
        );
    }
}
