pub mod exam;
pub mod keys;
pub mod patient;

pub use exam::{normalize_details, Exam, ExamRow, ExamType, HEART_RATE_FIELD, LEGACY_HEART_RATE_FIELD};
pub use patient::{Patient, PatientRef, PatientSummary};

/// Discriminator values for the shared record collection.
pub const PATIENT_RECORD_TYPE: &str = "paciente";
pub const EXAM_RECORD_TYPE: &str = "exame";
