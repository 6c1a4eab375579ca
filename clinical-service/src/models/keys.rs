//! Document key derivation from business fields.
//!
//! Keys concatenate raw field values with a `::` separator. Values are not
//! escaped; a field containing the separator corrupts key parsing.

pub fn patient_key(cpf: &str) -> String {
    format!("paciente::{}", cpf)
}

pub fn exam_key(paciente_id: &str, tipo: &str, data: &str) -> String {
    format!("exame::{}::{}::{}", paciente_id, tipo, data)
}

/// Key used by the exam removal route: `exame::<cpf>::<data>`.
///
/// This is a different keyspace from [`exam_key`], which embeds the patient
/// document id and the exam type. A document written by the create route is
/// not addressable through this key, so removal only finds documents stored
/// under the two-segment form. Kept as-is for wire compatibility with the
/// existing clients of this route.
pub fn exam_removal_key(cpf: &str, data: &str) -> String {
    format!("exame::{}::{}", cpf, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patient_key_prefixes_cpf() {
        assert_eq!(patient_key("12345678900"), "paciente::12345678900");
    }

    #[test]
    fn exam_key_uses_three_business_segments() {
        assert_eq!(
            exam_key("paciente::111", "Sangue", "2024-01-01"),
            "exame::paciente::111::Sangue::2024-01-01"
        );
    }

    #[test]
    fn removal_key_differs_from_creation_key() {
        let created = exam_key("paciente::111", "Sangue", "2024-01-01");
        let removed = exam_removal_key("111", "2024-01-01");
        assert_ne!(created, removed);
        assert_eq!(removed, "exame::111::2024-01-01");
    }
}
